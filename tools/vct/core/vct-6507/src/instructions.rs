use super::*;

impl M6507 {
    #[inline(always)]
    fn implied<S: System>(&mut self, system: &mut S) {
        let pc = self.pc;
        self.spurious_read(system, pc);
    }

    #[inline(always)]
    pub(crate) fn jsr<S: System>(&mut self, system: &mut S) {
        let target_lo = self.read_pc_postincrement(system);
        self.spurious_stack_read(system);
        let pc = self.pc;
        self.push(system, (pc >> 8) as u8);
        self.push(system, pc as u8);
        let target_hi = self.read_pc_postincrement(system);
        self.pc = (target_hi as u16) << 8 | (target_lo as u16);
    }
    #[inline(always)]
    pub(crate) fn rts<S: System>(&mut self, system: &mut S) {
        self.implied(system);
        self.spurious_stack_read(system);
        self.pc = (self.pc & 0xFF00) | self.pop(system) as u16;
        self.pc = (self.pc & 0x00FF) | (self.pop(system) as u16) << 8;
        let pc = self.pc;
        self.spurious_read(system, pc);
        self.pc = self.pc.wrapping_add(1);
    }
    #[inline(always)]
    pub(crate) fn jmp<R: HasEA, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let am = AM::get_operand(system, self);
        self.pc = am.get_effective_address();
    }
    #[inline(always)]
    pub(crate) fn branch<R: Branchable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S, should_branch: bool) {
        let mut am = AM::get_operand(system, self);
        if should_branch {
            self.pc = am.get_branch_target(system, self);
        }
    }
    #[inline(always)]
    pub(crate) fn sta<R: Writable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let mut am = AM::get_operand(system, self);
        let data = self.a;
        am.write(system, self, data)
    }
    #[inline(always)]
    pub(crate) fn stx<R: Writable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let mut am = AM::get_operand(system, self);
        let data = self.x;
        am.write(system, self, data)
    }
    #[inline(always)]
    pub(crate) fn sty<R: Writable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let mut am = AM::get_operand(system, self);
        let data = self.y;
        am.write(system, self, data)
    }
    #[inline(always)]
    pub(crate) fn lda<R: Readable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let mut am = AM::get_operand(system, self);
        self.a = am.read(system, self);
        self.nz_p(self.a);
    }
    #[inline(always)]
    pub(crate) fn ldx<R: Readable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let mut am = AM::get_operand(system, self);
        self.x = am.read(system, self);
        self.nz_p(self.x);
    }
    #[inline(always)]
    pub(crate) fn ldy<R: Readable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let mut am = AM::get_operand(system, self);
        self.y = am.read(system, self);
        self.nz_p(self.y);
    }
    #[inline(always)]
    pub(crate) fn bit<R: Readable, AM: AddressingMode<Result = R>, S: System>(&mut self, system: &mut S) {
        let data = AM::get_operand(system, self).read(system, self);
        if data & self.a == 0 { self.p |= P_Z }
        else { self.p &= !P_Z }
        self.p = (self.p & 0x3F) | (data & 0xC0);
    }
    #[inline(always)]
    pub(crate) fn nop<S: System>(&mut self, system: &mut S) {
        self.implied(system);
    }
    #[inline(always)]
    pub(crate) fn dex<S: System>(&mut self, system: &mut S) {
        self.implied(system);
        self.x = self.x.wrapping_sub(1);
        self.nz_p(self.x);
    }
    #[inline(always)]
    pub(crate) fn dey<S: System>(&mut self, system: &mut S) {
        self.implied(system);
        self.y = self.y.wrapping_sub(1);
        self.nz_p(self.y);
    }
    #[inline(always)]
    pub(crate) fn inx<S: System>(&mut self, system: &mut S) {
        self.implied(system);
        self.x = self.x.wrapping_add(1);
        self.nz_p(self.x);
    }
    #[inline(always)]
    pub(crate) fn iny<S: System>(&mut self, system: &mut S) {
        self.implied(system);
        self.y = self.y.wrapping_add(1);
        self.nz_p(self.y);
    }
}
