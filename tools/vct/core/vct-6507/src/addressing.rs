use super::*;

pub(crate) trait AddressingMode {
    type Result;
    fn get_operand<S: System>(system: &mut S, cpu: &mut M6507) -> Self::Result;
}

pub(crate) trait Readable {
    fn read<S: System>(&mut self, system: &mut S, cpu: &mut M6507) -> u8;
}

pub(crate) trait Writable {
    fn write<S: System>(&mut self, system: &mut S, cpu: &mut M6507, data: u8);
}

pub(crate) trait HasEA {
    fn get_effective_address(&self) -> u16;
}

pub(crate) trait Branchable {
    fn get_branch_target<S: System>(&mut self, system: &mut S, cpu: &mut M6507) -> u16;
}

pub(crate) struct Immediate;
pub(crate) struct ImmediateResult(u8);

impl AddressingMode for Immediate {
    type Result = ImmediateResult;
    #[inline(always)]
    fn get_operand<S: System>(system: &mut S, cpu: &mut M6507) -> ImmediateResult {
        ImmediateResult(cpu.read_pc_postincrement(system))
    }
}

impl Readable for ImmediateResult {
    #[inline(always)]
    fn read<S: System>(&mut self, _: &mut S, _: &mut M6507) -> u8 {
        self.0
    }
}

pub(crate) struct ZeroPage;
pub(crate) struct Absolute;
pub(crate) struct EffectiveAddress(u16);

impl AddressingMode for ZeroPage {
    type Result = EffectiveAddress;
    #[inline(always)]
    fn get_operand<S: System>(system: &mut S, cpu: &mut M6507) -> EffectiveAddress {
        EffectiveAddress(cpu.read_pc_postincrement(system) as u16)
    }
}

impl AddressingMode for Absolute {
    type Result = EffectiveAddress;
    #[inline(always)]
    fn get_operand<S: System>(system: &mut S, cpu: &mut M6507) -> EffectiveAddress {
        let lo = cpu.read_pc_postincrement(system) as u16;
        let hi = cpu.read_pc_postincrement(system) as u16;
        EffectiveAddress(hi << 8 | lo)
    }
}

impl Readable for EffectiveAddress {
    #[inline(always)]
    fn read<S: System>(&mut self, system: &mut S, cpu: &mut M6507) -> u8 {
        cpu.read(system, self.0)
    }
}

impl Writable for EffectiveAddress {
    #[inline(always)]
    fn write<S: System>(&mut self, system: &mut S, cpu: &mut M6507, data: u8) {
        cpu.write(system, self.0, data)
    }
}

impl HasEA for EffectiveAddress {
    #[inline(always)]
    fn get_effective_address(&self) -> u16 {
        self.0
    }
}

pub(crate) struct Relative;
pub(crate) struct RelativeResult(i8);

impl AddressingMode for Relative {
    type Result = RelativeResult;
    #[inline(always)]
    fn get_operand<S: System>(system: &mut S, cpu: &mut M6507) -> RelativeResult {
        RelativeResult(cpu.read_pc_postincrement(system) as i8)
    }
}

impl Branchable for RelativeResult {
    // Only called for taken branches: one extra cycle, plus one more when the
    // target is on another page (PCH gets fixed up a cycle late).
    #[inline(always)]
    fn get_branch_target<S: System>(&mut self, system: &mut S, cpu: &mut M6507) -> u16 {
        let pc = cpu.pc;
        cpu.spurious_read(system, pc);
        let target = pc.wrapping_add(self.0 as i16 as u16);
        if target & 0xFF00 != pc & 0xFF00 {
            cpu.spurious_read(system, (pc & 0xFF00) | (target & 0x00FF));
        }
        target
    }
}
