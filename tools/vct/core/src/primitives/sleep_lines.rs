use crate::asm::{Assembler, Condition, Op, Operand};
use crate::registers::WSYNC;

/// Burns `lines` whole scan lines, ending at the start of a line.
///
/// ```text
///         ldy #lines
/// .Line   sty WSYNC
///         dey
///         bne .Line
/// ```
///
/// Each `WSYNC` write halts the CPU to the end of the current line, so the
/// time is exact in lines whatever the starting position in the first one.
/// `lines` must not be 0 (that would be 256 lines).
///
/// Clobbers Y and N/Z. Y is 0 afterwards.
pub fn sleep_lines(asm: &mut Assembler, lines: u8) {
    debug_assert!(lines != 0, "sleep_lines(0) would sleep 256 lines");
    asm.emit(Op::Ldy(Operand::Immediate(lines)));
    let line = asm.new_label(".Line");
    asm.bind(line);
    asm.emit(Op::Sty(Operand::address(WSYNC)));
    asm.emit(Op::Dey);
    asm.branch(Condition::Ne, line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_to_seven_bytes() {
        let mut asm = Assembler::new(0xF000);
        sleep_lines(&mut asm, 3);
        let program = asm.finish().unwrap();
        assert_eq!(program.bytes(), [0xA0, 0x03, 0x84, 0x02, 0x88, 0xD0, 0xFB]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "256 lines")]
    fn zero_lines_is_rejected() {
        let mut asm = Assembler::new(0xF000);
        sleep_lines(&mut asm, 0);
    }
}
