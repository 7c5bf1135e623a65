//! Low-level emission helpers shared by the instruction handlers.

use super::cpu::{
    syn_uncategorized, xreg_offset, ARM_VFP_FPSCR, EXCP_UDEF, FPCR_AHP_SHIFT,
    FP_STATUS_F16_OFFSET, FP_STATUS_OFFSET,
};
use super::helper::Helper;
use super::regs::{neon_element_offset, offset_of, FpRounding, Precision};
use super::ArmDisasContext;
use crate::DisasJumpType;
use tcg_core::{Context, MemOp, TempIdx, Type};

impl ArmDisasContext {
    // -- Core registers ------------------------------------

    /// Value the PC reads as from the current instruction.
    pub(crate) fn read_pc(&self) -> u64 {
        self.pc_curr + if self.thumb { 4 } else { 8 }
    }

    pub(crate) fn gen_set_pc_im(&self, ir: &mut Context, pc: u64) {
        ir.gen_movi(Type::I32, self.regs[15], pc & 0xffff_ffff);
    }

    /// Copy core register `rn` into a new temp; r15 reads as the
    /// architectural PC value.
    pub(crate) fn load_reg(&self, ir: &mut Context, rn: u32) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        if rn == 15 {
            ir.gen_movi(Type::I32, t, self.read_pc() & 0xffff_ffff)
        } else {
            ir.gen_mov(Type::I32, t, self.regs[rn as usize])
        }
    }

    /// Write core register `rd`. A write to r15 is a branch.
    pub(crate) fn store_reg(&mut self, ir: &mut Context, rd: u32, val: TempIdx) {
        if rd == 15 {
            let mask = if self.thumb { !1u32 } else { !3u32 };
            ir.gen_andi(Type::I32, val, val, mask as u64);
            self.base.is_jmp = DisasJumpType::Jump;
        }
        ir.gen_mov(Type::I32, self.regs[rd as usize], val);
    }

    /// `rn + ofs` as a fresh temp; a PC base is word-aligned first.
    pub(crate) fn add_reg_for_lit(&self, ir: &mut Context, rn: u32, ofs: i64) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        if rn == 15 {
            let addr = ((self.read_pc() & !3) as i64).wrapping_add(ofs);
            ir.gen_movi(Type::I32, t, addr as u64 & 0xffff_ffff)
        } else {
            ir.gen_addi(Type::I32, t, self.regs[rn as usize], ofs)
        }
    }

    pub(crate) fn load_cpu_field(&self, ir: &mut Context, offset: i64) -> TempIdx {
        let t = ir.new_temp(Type::I32);
        ir.gen_ld(Type::I32, t, self.env, offset);
        t
    }

    pub(crate) fn store_cpu_field(&self, ir: &mut Context, val: TempIdx, offset: i64) {
        ir.gen_st(Type::I32, val, self.env, offset);
    }

    /// Set the CPSR NZCV flags from bits [31:28] of `val`.
    pub(crate) fn gen_set_nzcv(&self, ir: &mut Context, val: TempIdx) {
        ir.gen_mov(Type::I32, self.nf, val);
        ir.gen_andi(Type::I32, self.zf, val, 1 << 30);
        ir.gen_xori(Type::I32, self.zf, self.zf, 1 << 30);
        ir.gen_shri(Type::I32, self.cf, val, 29);
        ir.gen_andi(Type::I32, self.cf, self.cf, 1);
        ir.gen_shli(Type::I32, self.vf, val, 3);
    }

    // -- FP registers --------------------------------------

    pub(crate) fn vfp_load_reg(&self, ir: &mut Context, reg: u32, p: Precision) -> TempIdx {
        let t = ir.new_temp(p.ir_type());
        self.vfp_load_reg_into(ir, t, reg, p);
        t
    }

    pub(crate) fn vfp_load_reg_into(&self, ir: &mut Context, dst: TempIdx, reg: u32, p: Precision) {
        ir.gen_ld(p.ir_type(), dst, self.env, offset_of(reg, p));
    }

    pub(crate) fn vfp_store_reg(&self, ir: &mut Context, val: TempIdx, reg: u32, p: Precision) {
        ir.gen_st(p.ir_type(), val, self.env, offset_of(reg, p));
    }

    /// Load one Neon element (`memop` gives size and sign) into an
    /// I32 temp.
    pub(crate) fn read_neon_element32(
        &self,
        ir: &mut Context,
        dst: TempIdx,
        reg: u32,
        ele: u32,
        memop: MemOp,
    ) {
        let size = memop.size() as u32;
        let off = neon_element_offset(reg, ele, size);
        match (size, memop.is_signed()) {
            (0, false) => ir.gen_ld8u(Type::I32, dst, self.env, off),
            (0, true) => ir.gen_ld8s(Type::I32, dst, self.env, off),
            (1, false) => ir.gen_ld16u(Type::I32, dst, self.env, off),
            (1, true) => ir.gen_ld16s(Type::I32, dst, self.env, off),
            _ => ir.gen_ld(Type::I32, dst, self.env, off),
        };
    }

    pub(crate) fn write_neon_element32(
        &self,
        ir: &mut Context,
        src: TempIdx,
        reg: u32,
        ele: u32,
        size: u32,
    ) {
        let off = neon_element_offset(reg, ele, size);
        match size {
            0 => ir.gen_st8(Type::I32, src, self.env, off),
            1 => ir.gen_st16(Type::I32, src, self.env, off),
            _ => ir.gen_st32(Type::I32, src, self.env, off),
        }
    }

    pub(crate) fn write_neon_element64(
        &self,
        ir: &mut Context,
        src: TempIdx,
        reg: u32,
        ele: u32,
        size: u32,
    ) {
        let off = neon_element_offset(reg, ele, size);
        if size == 2 {
            ir.gen_st32(Type::I64, src, self.env, off);
        } else {
            ir.gen_st(Type::I64, src, self.env, off);
        }
    }

    // -- FP status -----------------------------------------

    /// Pointer to the float status block: the FP16 one for
    /// half-precision operations.
    pub(crate) fn fpstatus_ptr(&self, ir: &mut Context, f16: bool) -> TempIdx {
        let offset = if f16 { FP_STATUS_F16_OFFSET } else { FP_STATUS_OFFSET };
        let t = ir.new_temp(Type::I64);
        ir.gen_addi(Type::I64, t, self.env, offset)
    }

    pub(crate) fn fpstatus_for(&self, ir: &mut Context, p: Precision) -> TempIdx {
        self.fpstatus_ptr(ir, p == Precision::Half)
    }

    /// FPSCR.AHP as 0/1.
    pub(crate) fn get_ahp_flag(&self, ir: &mut Context) -> TempIdx {
        let t = self.load_cpu_field(ir, xreg_offset(ARM_VFP_FPSCR));
        ir.gen_extract(Type::I32, t, t, FPCR_AHP_SHIFT, 1)
    }

    /// Run `body` with the rounding mode of `fpst` forced to `mode`,
    /// restoring the previous mode afterwards.
    pub(crate) fn with_rounding<R>(
        &self,
        ir: &mut Context,
        mode: FpRounding,
        fpst: TempIdx,
        body: impl FnOnce(&mut Context) -> R,
    ) -> R {
        let rmode = ir.new_const(Type::I32, mode.to_softfloat() as u64);
        let saved = ir.new_temp(Type::I32);
        Helper::SetRmode.call(ir, saved, &[rmode, fpst]);
        let ret = body(ir);
        let discard = ir.new_temp(Type::I32);
        Helper::SetRmode.call(ir, discard, &[saved, fpst]);
        ret
    }

    // -- Guest memory --------------------------------------

    pub(crate) fn gen_aa32_ld(&self, ir: &mut Context, p: Precision, dst: TempIdx, addr: TempIdx) {
        ir.gen_qemu_ld(p.ir_type(), dst, addr, u32::from(p.memop()));
    }

    pub(crate) fn gen_aa32_st(&self, ir: &mut Context, p: Precision, val: TempIdx, addr: TempIdx) {
        ir.gen_qemu_st(p.ir_type(), val, addr, u32::from(p.memop()));
    }

    /// v8-M stack limit check for an SP-based access.
    pub(crate) fn gen_stackcheck(&self, ir: &mut Context, addr: TempIdx) {
        Helper::V8mStackcheck.call_void(ir, &[self.env, addr]);
    }

    // -- Control flow and exceptions -----------------------

    /// End the block with a TB lookup at the current pc value.
    pub(crate) fn gen_goto_lookup(&self, ir: &mut Context) {
        let ptr = ir.new_temp(Type::I64);
        Helper::LookupTbPtr.call(ir, ptr, &[self.env]);
        ir.gen_goto_ptr(ptr);
    }

    /// End the block after this instruction without chaining, since
    /// state the block was translated under may have changed.
    pub(crate) fn gen_lookup_tb(&mut self) {
        self.base.is_jmp = DisasJumpType::UpdateNoChain;
    }

    pub(crate) fn gen_exception_insn(&mut self, ir: &mut Context, excp: u32, syn: u32, target_el: u32) {
        self.gen_set_pc_im(ir, self.pc_curr);
        let excp = ir.new_const(Type::I32, excp as u64);
        let syn = ir.new_const(Type::I32, syn as u64);
        let el = ir.new_const(Type::I32, target_el as u64);
        Helper::ExceptionWithSyndrome.call_void(ir, &[self.env, excp, syn, el]);
        self.base.is_jmp = DisasJumpType::NoReturn;
    }

    pub(crate) fn default_exception_el(&self) -> u32 {
        self.current_el.max(1)
    }

    /// Raise UNDEFINED for the current instruction.
    pub(crate) fn unallocated_encoding(&mut self, ir: &mut Context) {
        let el = self.default_exception_el();
        self.gen_exception_insn(ir, EXCP_UDEF, syn_uncategorized(), el);
    }

    /// Allocate the label the current instruction may branch to in
    /// order to skip its own remaining effect.
    pub(crate) fn gen_condlabel(&mut self, ir: &mut Context) -> u32 {
        match self.condlabel {
            Some(l) => l,
            None => {
                let l = ir.new_label();
                self.condlabel = Some(l);
                l
            }
        }
    }
}
