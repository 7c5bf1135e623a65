//! M-profile only instructions: lazy FP state load/store, secure
//! register clearing, and the disabled-coprocessor check.
//!
//! These do not go through the usual access check first: each one
//! has its own precedence between UNDEF, NOCP and NOP.

use super::cpu::{
    syn_uncategorized, v7m_control_offset, v7m_fpccr_offset, EXCP_NOCP, M_REG_S,
    V7M_CONTROL_SFPA_MASK, V7M_FPCCR_ASPEN_MASK,
};
use super::features::IsarFeatures;
use super::helper::Helper;
use super::insn::{ArgsNocp, ArgsVlldmVlstm, ArgsVscclrm};
use super::ArmDisasContext;
use crate::{DisasJumpType, TranslateError};
use tcg_core::{Cond, Context, Type};

type TransResult = Result<bool, TranslateError>;

impl ArmDisasContext {
    pub(crate) fn trans_vlldm_vlstm(&mut self, ir: &mut Context, a: &ArgsVlldmVlstm) -> TransResult {
        if !self.has(IsarFeatures::M) || !self.has(IsarFeatures::V8) {
            return Ok(false);
        }
        if a.op {
            // T2 ({D0-D31}) behaves exactly like T1 here.
            if !self.has(IsarFeatures::V8_1M) {
                return Ok(false);
            }
        } else if self.has(IsarFeatures::SIMD_R32) {
            // T1 with 32 D registers; the UNDEF must win over NOCP.
            self.unallocated_encoding(ir);
            return Ok(true);
        }

        if !self.v8m_secure {
            self.unallocated_encoding(ir);
            return Ok(true);
        }
        // No FPU: NOP.
        if !self.features.has_vfp() {
            return Ok(true);
        }

        let fptr = self.load_reg(ir, a.rn);
        let helper = if a.l {
            Helper::V7mVlldm
        } else {
            Helper::V7mVlstm
        };
        helper.call_void(ir, &[self.env, fptr]);
        // FP control bits changed.
        self.base.is_jmp = DisasJumpType::UpdateExit;
        Ok(true)
    }

    /// VSCCLRM: zero a range of FP registers on exit from Secure
    /// state.
    pub(crate) fn trans_vscclrm(&mut self, ir: &mut Context, a: &ArgsVscclrm) -> TransResult {
        if !self.has(IsarFeatures::M_SEC_STATE) {
            // Falls through to the NOCP check.
            return Ok(false);
        }
        if !self.has(IsarFeatures::M_MAIN) || !self.v8m_secure {
            self.unallocated_encoding(ir);
            return Ok(true);
        }
        if !self.features.has_vfp() {
            return Ok(true);
        }

        // With FPCCR.ASPEN set and CONTROL_S.SFPA clear there is no
        // active FP context: skip everything, including the lazy
        // state preservation and the NOCP check.
        let aspen = self.load_cpu_field(ir, v7m_fpccr_offset(M_REG_S));
        let sfpa = self.load_cpu_field(ir, v7m_control_offset(M_REG_S));
        ir.gen_andi(Type::I32, aspen, aspen, V7M_FPCCR_ASPEN_MASK as u64);
        ir.gen_xori(Type::I32, aspen, aspen, V7M_FPCCR_ASPEN_MASK as u64);
        ir.gen_andi(Type::I32, sfpa, sfpa, V7M_CONTROL_SFPA_MASK as u64);
        ir.gen_or(Type::I32, sfpa, sfpa, aspen);
        let skip = self.gen_condlabel(ir);
        ir.gen_brcondi(Type::I32, sfpa, 0, Cond::Eq, skip);

        if self.fp_excp_el != 0 {
            let el = self.fp_excp_el;
            self.gen_exception_insn(ir, EXCP_NOCP, syn_uncategorized(), el);
            return Ok(true);
        }

        let mut btmreg = a.vd;
        let mut topreg = a.vd + a.imm;
        if a.size == 3 {
            // D register list: convert to S register numbers.
            topreg *= 2;
            btmreg *= 2;
        }
        // Inclusive from here on. An empty list is UNPREDICTABLE and
        // we choose UNDEF for it rather than a NOP.
        if topreg == btmreg {
            self.unallocated_encoding(ir);
            return Ok(true);
        }
        topreg -= 1;
        if topreg > 63 || (topreg > 31 && topreg & 1 == 0) {
            // UNPREDICTABLE; UNDEF.
            self.unallocated_encoding(ir);
            return Ok(true);
        }
        // D16-D31 silently ignored when absent.
        if topreg > 31 && !self.has(IsarFeatures::SIMD_R32) {
            topreg = 31;
        }

        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let zero = ir.new_const(Type::I64, 0);
        if btmreg & 1 != 0 {
            self.write_neon_element64(ir, zero, btmreg >> 1, 1, 2);
            btmreg += 1;
        }
        while btmreg + 1 <= topreg {
            self.write_neon_element64(ir, zero, btmreg >> 1, 0, 3);
            btmreg += 2;
        }
        if btmreg == topreg {
            self.write_neon_element64(ir, zero, btmreg >> 1, 0, 2);
        }
        Ok(true)
    }

    /// Early check for a disabled coprocessor. Returns `false` when
    /// the coprocessor is enabled so that normal decode proceeds.
    pub(crate) fn trans_nocp(&mut self, ir: &mut Context, a: &ArgsNocp) -> TransResult {
        if !self.has(IsarFeatures::M) {
            return Ok(false);
        }
        let mut cp = a.cp;
        if cp == 11 {
            cp = 10;
        }
        // v8.1-M: cp8, cp9, cp14 and cp15 follow the cp10 enable.
        if self.has(IsarFeatures::V8_1M) && matches!(cp, 8 | 9 | 14 | 15) {
            cp = 10;
        }

        if cp != 10 {
            tracing::debug!(pc = self.pc_curr, cp, "no such coprocessor");
            let el = self.default_exception_el();
            self.gen_exception_insn(ir, EXCP_NOCP, syn_uncategorized(), el);
            return Ok(true);
        }
        if self.fp_excp_el != 0 {
            let el = self.fp_excp_el;
            self.gen_exception_insn(ir, EXCP_NOCP, syn_uncategorized(), el);
            return Ok(true);
        }
        Ok(false)
    }

    /// The coprocessor ranges that only v8.1-M checks.
    pub(crate) fn trans_nocp_8_1(&mut self, ir: &mut Context, a: &ArgsNocp) -> TransResult {
        if !self.has(IsarFeatures::V8_1M) {
            return Ok(false);
        }
        self.trans_nocp(ir, a)
    }
}
