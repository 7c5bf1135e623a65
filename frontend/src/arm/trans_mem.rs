//! FP loads and stores: VLDR/VSTR and VLDM/VSTM.

use super::features::IsarFeatures;
use super::insn::{ArgsVldmVstm, ArgsVldrVstr};
use super::regs::Precision;
use super::ArmDisasContext;
use crate::TranslateError;
use tcg_core::{Context, Type};

type TransResult = Result<bool, TranslateError>;

impl ArmDisasContext {
    /// VLDR/VSTR of a single register. `imm` counts halfwords for
    /// half precision and words otherwise.
    pub(crate) fn trans_vldr_vstr(&mut self, ir: &mut Context, p: Precision, a: &ArgsVldrVstr) -> TransResult {
        if !self.vfp_precision_ok(p, a.vd) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let scale = if p == Precision::Half { 1 } else { 2 };
        let offset = (a.imm as i64) << scale;
        let offset = if a.u { offset } else { -offset };

        let addr = self.add_reg_for_lit(ir, a.rn, offset);
        let tmp = ir.new_temp(p.ir_type());
        if a.l {
            self.gen_aa32_ld(ir, p, tmp, addr);
            self.vfp_store_reg(ir, tmp, a.vd, p);
        } else {
            self.vfp_load_reg_into(ir, tmp, a.vd, p);
            self.gen_aa32_st(ir, p, tmp, addr);
        }
        Ok(true)
    }

    /// VLDM/VSTM (and VPUSH/VPOP). Only the single-precision FP
    /// feature is needed, even for D registers.
    pub(crate) fn trans_vldm_vstm(&mut self, ir: &mut Context, p: Precision, a: &ArgsVldmVstm) -> TransResult {
        if p == Precision::Half || !self.has(IsarFeatures::FPSP_V2) {
            return Ok(false);
        }

        let n = match p {
            Precision::Double => a.imm >> 1,
            _ => a.imm,
        };
        // Bad counts are UNPREDICTABLE; UNDEF rather than emit a huge
        // number of ops.
        if n == 0 || a.vd + n > 32 || (p == Precision::Double && n > 16) {
            return Ok(false);
        }
        // Writeback to PC is UNPREDICTABLE.
        if a.rn == 15 && a.w {
            return Ok(false);
        }
        if p == Precision::Double && !self.has(IsarFeatures::SIMD_R32) && a.vd + n > 16 {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let addr = self.add_reg_for_lit(ir, a.rn, 0);
        if a.p {
            // Pre-decrement.
            ir.gen_addi(Type::I32, addr, addr, -((a.imm as i64) << 2));
        }

        if self.v8m_stackcheck && a.rn == 13 && a.w {
            // `addr` is the lowest address touched: the old SP for
            // increment-after, the new SP for decrement-before.
            self.gen_stackcheck(ir, addr);
        }

        let unit = p.bytes() as i64;
        let tmp = ir.new_temp(p.ir_type());
        for i in 0..n {
            if a.l {
                self.gen_aa32_ld(ir, p, tmp, addr);
                self.vfp_store_reg(ir, tmp, a.vd + i, p);
            } else {
                self.vfp_load_reg_into(ir, tmp, a.vd + i, p);
                self.gen_aa32_st(ir, p, tmp, addr);
            }
            ir.gen_addi(Type::I32, addr, addr, unit);
        }

        if a.w {
            let adjust = if a.p {
                -unit * n as i64
            } else if p == Precision::Double && a.imm & 1 != 0 {
                // FLDMX/FSTMX: the odd word is skipped over.
                4
            } else {
                0
            };
            if adjust != 0 {
                ir.gen_addi(Type::I32, addr, addr, adjust);
            }
            self.store_reg(ir, a.rn, addr);
        }
        Ok(true)
    }
}
