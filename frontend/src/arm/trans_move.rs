//! Moves between core registers and FP/SIMD registers, and the
//! half-precision lane moves VINS/VMOVX.

use super::features::IsarFeatures;
use super::insn::{ArgsVdup, ArgsVfp2, ArgsVmov64, ArgsVmovFromGp, ArgsVmovSingle, ArgsVmovToGp};
use super::regs::{offset_of, Precision};
use super::ArmDisasContext;
use crate::TranslateError;
use tcg_core::{Context, MemOp, Type};

type TransResult = Result<bool, TranslateError>;

const S: Precision = Precision::Single;

impl ArmDisasContext {
    /// A 32-bit scalar move is VFP; narrower element moves are Neon.
    fn scalar_move_ok(&self, size: u32, vn: u32) -> bool {
        let feature = if size == MemOp::SIZE_32 as u32 {
            IsarFeatures::FPSP_V2
        } else {
            IsarFeatures::NEON
        };
        self.has(feature) && self.dregs_ok(vn)
    }

    pub(crate) fn trans_vmov_to_gp(&mut self, ir: &mut Context, a: &ArgsVmovToGp) -> TransResult {
        if !self.scalar_move_ok(a.size, a.vn) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let sign = if a.u { 0 } else { MemOp::SIGN };
        let memop = MemOp::new(a.size as u16 | sign);
        let tmp = ir.new_temp(Type::I32);
        self.read_neon_element32(ir, tmp, a.vn, a.index, memop);
        self.store_reg(ir, a.rt, tmp);
        Ok(true)
    }

    pub(crate) fn trans_vmov_from_gp(&mut self, ir: &mut Context, a: &ArgsVmovFromGp) -> TransResult {
        if !self.scalar_move_ok(a.size, a.vn) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let tmp = self.load_reg(ir, a.rt);
        self.write_neon_element32(ir, tmp, a.vn, a.index, a.size);
        Ok(true)
    }

    /// VDUP (general-purpose register): replicate rt across D<vn>
    /// or the Q register starting there.
    pub(crate) fn trans_vdup(&mut self, ir: &mut Context, a: &ArgsVdup) -> TransResult {
        if !self.has(IsarFeatures::NEON) || !self.dregs_ok(a.vn) {
            return Ok(false);
        }
        if a.b && a.e {
            return Ok(false);
        }
        if a.q && a.vn & 1 != 0 {
            return Ok(false);
        }
        let (ty, vece) = (
            if a.q { Type::V128 } else { Type::V64 },
            match (a.b, a.e) {
                (true, _) => 0,
                (_, true) => 1,
                _ => 2,
            },
        );
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let tmp = self.load_reg(ir, a.rt);
        let vec = ir.new_temp(ty);
        ir.gen_dup_vec(ty, vece, vec, tmp);
        ir.gen_st_vec(ty, vec, self.env, offset_of(a.vn, Precision::Double));
        Ok(true)
    }

    /// VMOV between a core register and the low half of S<vn>. The
    /// upper half of the destination is zeroed in both directions.
    pub(crate) fn trans_vmov_half(&mut self, ir: &mut Context, a: &ArgsVmovSingle) -> TransResult {
        if !self.has(IsarFeatures::FP16_ARITH) {
            return Ok(false);
        }
        // UNPREDICTABLE; UNDEF.
        if a.rt == 15 {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        if a.l {
            let tmp = self.vfp_load_reg(ir, a.vn, S);
            ir.gen_andi(Type::I32, tmp, tmp, 0xffff);
            self.store_reg(ir, a.rt, tmp);
        } else {
            let tmp = self.load_reg(ir, a.rt);
            ir.gen_andi(Type::I32, tmp, tmp, 0xffff);
            self.vfp_store_reg(ir, tmp, a.vn, S);
        }
        Ok(true)
    }

    pub(crate) fn trans_vmov_single(&mut self, ir: &mut Context, a: &ArgsVmovSingle) -> TransResult {
        if !self.has(IsarFeatures::FPSP_V2) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        if a.l {
            let tmp = self.vfp_load_reg(ir, a.vn, S);
            if a.rt == 15 {
                // Bits [31:28] go to the CPSR flags.
                self.gen_set_nzcv(ir, tmp);
            } else {
                self.store_reg(ir, a.rt, tmp);
            }
        } else {
            let tmp = self.load_reg(ir, a.rt);
            self.vfp_store_reg(ir, tmp, a.vn, S);
        }
        Ok(true)
    }

    /// Move a pair of S registers starting at `sreg` to or from
    /// rt/rt2.
    fn vmov_pair(&mut self, ir: &mut Context, sreg: u32, a: &ArgsVmov64) {
        if a.op {
            let lo = self.vfp_load_reg(ir, sreg, S);
            self.store_reg(ir, a.rt, lo);
            let hi = self.vfp_load_reg(ir, sreg + 1, S);
            self.store_reg(ir, a.rt2, hi);
        } else {
            let lo = self.load_reg(ir, a.rt);
            self.vfp_store_reg(ir, lo, sreg, S);
            let hi = self.load_reg(ir, a.rt2);
            self.vfp_store_reg(ir, hi, sreg + 1, S);
        }
    }

    pub(crate) fn trans_vmov_64_sp(&mut self, ir: &mut Context, a: &ArgsVmov64) -> TransResult {
        if !self.has(IsarFeatures::FPSP_V2) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        self.vmov_pair(ir, a.vm, a);
        Ok(true)
    }

    /// Two core registers to or from D<vm>. Needs no DP arithmetic.
    pub(crate) fn trans_vmov_64_dp(&mut self, ir: &mut Context, a: &ArgsVmov64) -> TransResult {
        if !self.has(IsarFeatures::FPSP_V2) || !self.dregs_ok(a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        self.vmov_pair(ir, a.vm * 2, a);
        Ok(true)
    }

    /// Insert the low half of S<vm> into the high half of S<vd>.
    pub(crate) fn trans_vins(&mut self, ir: &mut Context, a: &ArgsVfp2) -> TransResult {
        if !self.has(IsarFeatures::FP16_ARITH) || !self.short_vector_ok(Precision::Half) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let rm = self.vfp_load_reg(ir, a.vm, S);
        let rd = self.vfp_load_reg(ir, a.vd, S);
        ir.gen_deposit(Type::I32, rd, rd, rm, 16, 16);
        self.vfp_store_reg(ir, rd, a.vd, S);
        Ok(true)
    }

    /// S<vd> = high half of S<vm>.
    pub(crate) fn trans_vmovx(&mut self, ir: &mut Context, a: &ArgsVfp2) -> TransResult {
        if !self.has(IsarFeatures::FP16_ARITH) || !self.short_vector_ok(Precision::Half) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let rm = self.vfp_load_reg(ir, a.vm, S);
        ir.gen_shri(Type::I32, rm, rm, 16);
        self.vfp_store_reg(ir, rm, a.vd, S);
        Ok(true)
    }
}
