//! Rounding and conversion instructions.

use super::features::IsarFeatures;
use super::helper::Helper;
use super::insn::{ArgsVcvt, ArgsVcvtF16, ArgsVcvtFix, ArgsVcvtInt, ArgsVcvtToInt, ArgsVfp2, ArgsVrint};
use super::regs::{f16_offset, FpRounding, Precision};
use super::ArmDisasContext;
use crate::TranslateError;
use tcg_core::{Context, Type};

type TransResult = Result<bool, TranslateError>;

impl ArmDisasContext {
    /// Gate shared by the VRINT family: half precision needs FP16
    /// arithmetic, the others need VRINT (and DP for double).
    fn vrint_ok(&self, p: Precision, regs: u32) -> bool {
        match p {
            Precision::Half => self.has(IsarFeatures::FP16_ARITH),
            Precision::Single => self.has(IsarFeatures::VRINT),
            Precision::Double => {
                self.has(IsarFeatures::FPDP_V2)
                    && self.has(IsarFeatures::VRINT)
                    && self.dregs_ok(regs)
            }
        }
    }

    /// VRINT{A,N,P,M}: round to integral with a mode taken from the
    /// instruction.
    pub(crate) fn trans_vrint(&mut self, ir: &mut Context, p: Precision, a: &ArgsVrint) -> TransResult {
        if a.rm > 3 {
            return Err(TranslateError::InvalidField {
                insn: "VRINT",
                field: "rm",
                value: a.rm as i64,
            });
        }
        if !self.has(IsarFeatures::VRINT) || !self.vrint_ok(p, a.vd | a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let fpst = self.fpstatus_for(ir, p);
        let op = self.vfp_load_reg(ir, a.vm, p);
        let res = ir.new_temp(p.ir_type());
        self.with_rounding(ir, FpRounding::decode_rm(a.rm), fpst, |ir| {
            Helper::rint(p).call(ir, res, &[op, fpst]);
        });
        self.vfp_store_reg(ir, res, a.vd, p);
        Ok(true)
    }

    /// VCVT{A,N,P,M}: float to 32-bit integer with directed rounding.
    /// The result always lands in an S register.
    pub(crate) fn trans_vcvt(&mut self, ir: &mut Context, p: Precision, a: &ArgsVcvt) -> TransResult {
        if a.rm > 3 {
            return Err(TranslateError::InvalidField {
                insn: "VCVT",
                field: "rm",
                value: a.rm as i64,
            });
        }
        if !self.has(IsarFeatures::VCVT_DR) {
            return Ok(false);
        }
        let ok = match p {
            Precision::Half => self.has(IsarFeatures::FP16_ARITH),
            Precision::Single => true,
            Precision::Double => self.has(IsarFeatures::FPDP_V2) && self.dregs_ok(a.vm),
        };
        if !ok {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let fpst = self.fpstatus_for(ir, p);
        let shift = ir.new_const(Type::I32, 0);
        let op = self.vfp_load_reg(ir, a.vm, p);
        let res = ir.new_temp(p.ir_type());
        let helper = Helper::fp_to_fixed32(p, a.op);
        self.with_rounding(ir, FpRounding::decode_rm(a.rm), fpst, |ir| {
            helper.call(ir, res, &[op, shift, fpst]);
        });
        let out = if p == Precision::Double {
            let t = ir.new_temp(Type::I32);
            ir.gen_extrl_i64_i32(t, res)
        } else {
            res
        };
        self.vfp_store_reg(ir, out, a.vd, Precision::Single);
        Ok(true)
    }

    /// VRINTR: round to integral using FPSCR.RMode.
    pub(crate) fn trans_vrintr(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        if !self.vrint_ok(p, a.vd | a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let tmp = self.vfp_load_reg(ir, a.vm, p);
        let fpst = self.fpstatus_for(ir, p);
        Helper::rint(p).call(ir, tmp, &[tmp, fpst]);
        self.vfp_store_reg(ir, tmp, a.vd, p);
        Ok(true)
    }

    /// VRINTZ: round towards zero regardless of FPSCR.RMode.
    pub(crate) fn trans_vrintz(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        if !self.vrint_ok(p, a.vd | a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let tmp = self.vfp_load_reg(ir, a.vm, p);
        let fpst = self.fpstatus_for(ir, p);
        self.with_rounding(ir, FpRounding::Zero, fpst, |ir| {
            Helper::rint(p).call(ir, tmp, &[tmp, fpst]);
        });
        self.vfp_store_reg(ir, tmp, a.vd, p);
        Ok(true)
    }

    /// VRINTX: as VRINTR, but signals Inexact.
    pub(crate) fn trans_vrintx(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        if !self.vrint_ok(p, a.vd | a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let tmp = self.vfp_load_reg(ir, a.vm, p);
        let fpst = self.fpstatus_for(ir, p);
        Helper::rint_exact(p).call(ir, tmp, &[tmp, fpst]);
        self.vfp_store_reg(ir, tmp, a.vd, p);
        Ok(true)
    }

    // -- Half-precision conversions ------------------------
    //
    // The `t` bit picks the top or bottom half of the S register
    // holding the f16 value; the other half is left untouched.

    pub(crate) fn trans_vcvt_f32_f16(&mut self, ir: &mut Context, a: &ArgsVcvtF16) -> TransResult {
        if !self.has(IsarFeatures::FP16_SPCONV) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let fpst = self.fpstatus_ptr(ir, false);
        let ahp = self.get_ahp_flag(ir);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_ld16u(Type::I32, tmp, self.env, f16_offset(a.vm, a.t));
        Helper::VfpFcvtF16ToF32.call(ir, tmp, &[tmp, fpst, ahp]);
        self.vfp_store_reg(ir, tmp, a.vd, Precision::Single);
        Ok(true)
    }

    pub(crate) fn trans_vcvt_f64_f16(&mut self, ir: &mut Context, a: &ArgsVcvtF16) -> TransResult {
        if !self.has(IsarFeatures::FPDP_V2)
            || !self.has(IsarFeatures::FP16_DPCONV)
            || !self.dregs_ok(a.vd)
        {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let fpst = self.fpstatus_ptr(ir, false);
        let ahp = self.get_ahp_flag(ir);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_ld16u(Type::I32, tmp, self.env, f16_offset(a.vm, a.t));
        let vd = ir.new_temp(Type::I64);
        Helper::VfpFcvtF16ToF64.call(ir, vd, &[tmp, fpst, ahp]);
        self.vfp_store_reg(ir, vd, a.vd, Precision::Double);
        Ok(true)
    }

    pub(crate) fn trans_vcvt_f16_f32(&mut self, ir: &mut Context, a: &ArgsVcvtF16) -> TransResult {
        if !self.has(IsarFeatures::FP16_SPCONV) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let fpst = self.fpstatus_ptr(ir, false);
        let ahp = self.get_ahp_flag(ir);
        let tmp = self.vfp_load_reg(ir, a.vm, Precision::Single);
        Helper::VfpFcvtF32ToF16.call(ir, tmp, &[tmp, fpst, ahp]);
        ir.gen_st16(Type::I32, tmp, self.env, f16_offset(a.vd, a.t));
        Ok(true)
    }

    pub(crate) fn trans_vcvt_f16_f64(&mut self, ir: &mut Context, a: &ArgsVcvtF16) -> TransResult {
        if !self.has(IsarFeatures::FPDP_V2)
            || !self.has(IsarFeatures::FP16_DPCONV)
            || !self.dregs_ok(a.vm)
        {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let fpst = self.fpstatus_ptr(ir, false);
        let ahp = self.get_ahp_flag(ir);
        let vm = self.vfp_load_reg(ir, a.vm, Precision::Double);
        let tmp = ir.new_temp(Type::I32);
        Helper::VfpFcvtF64ToF16.call(ir, tmp, &[vm, fpst, ahp]);
        ir.gen_st16(Type::I32, tmp, self.env, f16_offset(a.vd, a.t));
        Ok(true)
    }

    // -- Single <-> double ---------------------------------

    pub(crate) fn trans_vcvt_sp(&mut self, ir: &mut Context, a: &ArgsVfp2) -> TransResult {
        if !self.has(IsarFeatures::FPDP_V2) || !self.dregs_ok(a.vd) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let vm = self.vfp_load_reg(ir, a.vm, Precision::Single);
        let vd = ir.new_temp(Type::I64);
        Helper::VfpFcvtds.call(ir, vd, &[vm, self.env]);
        self.vfp_store_reg(ir, vd, a.vd, Precision::Double);
        Ok(true)
    }

    pub(crate) fn trans_vcvt_dp(&mut self, ir: &mut Context, a: &ArgsVfp2) -> TransResult {
        if !self.has(IsarFeatures::FPDP_V2) || !self.dregs_ok(a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let vm = self.vfp_load_reg(ir, a.vm, Precision::Double);
        let vd = ir.new_temp(Type::I32);
        Helper::VfpFcvtsd.call(ir, vd, &[vm, self.env]);
        self.vfp_store_reg(ir, vd, a.vd, Precision::Single);
        Ok(true)
    }

    // -- Integer conversions -------------------------------

    /// 32-bit integer in S<vm> to float of precision `p`.
    pub(crate) fn trans_vcvt_int(&mut self, ir: &mut Context, p: Precision, a: &ArgsVcvtInt) -> TransResult {
        if !self.vfp_precision_ok(p, a.vd) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let vm = self.vfp_load_reg(ir, a.vm, Precision::Single);
        let fpst = self.fpstatus_for(ir, p);
        let vd = match p {
            Precision::Double => ir.new_temp(Type::I64),
            _ => vm,
        };
        Helper::int_to_fp(p, a.s).call(ir, vd, &[vm, fpst]);
        self.vfp_store_reg(ir, vd, a.vd, p);
        Ok(true)
    }

    /// VJCVT: double to int32 with JavaScript wrap-around semantics.
    pub(crate) fn trans_vjcvt(&mut self, ir: &mut Context, a: &ArgsVfp2) -> TransResult {
        if !self.has(IsarFeatures::FPDP_V2)
            || !self.has(IsarFeatures::JSCVT)
            || !self.dregs_ok(a.vm)
        {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let vm = self.vfp_load_reg(ir, a.vm, Precision::Double);
        let vd = ir.new_temp(Type::I32);
        Helper::Vjcvt.call(ir, vd, &[vm, self.env]);
        self.vfp_store_reg(ir, vd, a.vd, Precision::Single);
        Ok(true)
    }

    /// Fixed-point conversion in place on `vd`. Conversions to float
    /// round to nearest; conversions to fixed round towards zero.
    pub(crate) fn trans_vcvt_fix(&mut self, ir: &mut Context, p: Precision, a: &ArgsVcvtFix) -> TransResult {
        let helper = Helper::fixed_conv(p, a.opc).ok_or(TranslateError::InvalidField {
            insn: "VCVT_fix",
            field: "opc",
            value: a.opc as i64,
        })?;
        let size = if a.opc & 1 != 0 { 32 } else { 16 };
        let frac_bits = size - a.imm as i64;
        if frac_bits < 0 {
            return Err(TranslateError::InvalidField {
                insn: "VCVT_fix",
                field: "imm",
                value: a.imm as i64,
            });
        }

        let ok = match p {
            Precision::Half => self.has(IsarFeatures::FP16_ARITH),
            Precision::Single => self.has(IsarFeatures::FPSP_V3),
            Precision::Double => self.has(IsarFeatures::FPDP_V3) && self.dregs_ok(a.vd),
        };
        if !ok {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let vd = self.vfp_load_reg(ir, a.vd, p);
        let fpst = self.fpstatus_for(ir, p);
        let shift = ir.new_const(Type::I32, frac_bits as u64);
        let mode = if a.opc < 4 {
            FpRounding::TieEven
        } else {
            FpRounding::Zero
        };
        self.with_rounding(ir, mode, fpst, |ir| {
            helper.call(ir, vd, &[vd, shift, fpst]);
        });
        self.vfp_store_reg(ir, vd, a.vd, p);
        Ok(true)
    }

    /// Float of precision `p` to a 32-bit integer in S<vd>.
    pub(crate) fn trans_vcvt_to_int(&mut self, ir: &mut Context, p: Precision, a: &ArgsVcvtToInt) -> TransResult {
        if !self.vfp_precision_ok(p, a.vm) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }
        let fpst = self.fpstatus_for(ir, p);
        let vm = self.vfp_load_reg(ir, a.vm, p);
        let vd = match p {
            Precision::Double => ir.new_temp(Type::I32),
            _ => vm,
        };
        Helper::fp_to_int(p, a.s, a.rz).call(ir, vd, &[vm, fpst]);
        self.vfp_store_reg(ir, vd, a.vd, Precision::Single);
        Ok(true)
    }
}
