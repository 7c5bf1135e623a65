//! FPU access checks, including the M-profile lazy FP context
//! protocol.

use super::cpu::{
    syn_fp_access_trap, v7m_control_offset, v7m_fpccr_offset, v7m_fpdscr_offset,
    EXCP_UDEF, M_REG_NS, M_REG_S, V7M_CONTROL_FPCA_MASK, V7M_CONTROL_SFPA_MASK,
    V7M_FPCCR_S_MASK,
};
use super::features::IsarFeatures;
use super::helper::Helper;
use super::ArmDisasContext;
use crate::DisasJumpType;
use tcg_core::{Context, Type};

/// Outcome of an FPU access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpAccess {
    /// An FP access trap to `fp_excp_el` was emitted.
    Trapped,
    /// FP is disabled; an undefined-instruction exception was emitted.
    Disabled,
    /// M-profile context bookkeeping was emitted; the access proceeds.
    ContextManaged,
    Enabled,
}

impl FpAccess {
    /// Whether the instruction body should be emitted.
    pub const fn allowed(self) -> bool {
        matches!(self, FpAccess::ContextManaged | FpAccess::Enabled)
    }
}

impl ArmDisasContext {
    /// Lazy state preservation: if LSPACT is set, push the saved FP
    /// context out to the stack frame reserved for it.
    pub(crate) fn gen_preserve_fp_state(&mut self, ir: &mut Context) {
        if self.v7m_lspact {
            // The helper may raise an exception on the stacking
            // access, so under icount the block must end here.
            if self.use_icount {
                self.base.is_jmp = DisasJumpType::UpdateExit;
            }
            Helper::V7mPreserveFpState.call_void(ir, &[self.env]);
            self.v7m_lspact = false;
        }
    }

    /// Check that FP access is permitted, emitting whatever faults or
    /// M-profile context updates that requires.
    ///
    /// `ignore_vfp_enabled` is set only for the ID and control
    /// registers that stay reachable while FPEXC.EN is clear.
    pub(crate) fn full_vfp_access_check(
        &mut self,
        ir: &mut Context,
        ignore_vfp_enabled: bool,
    ) -> FpAccess {
        if self.fp_excp_el != 0 {
            tracing::debug!(pc = self.pc_curr, el = self.fp_excp_el, "FP access trapped");
            let el = self.fp_excp_el;
            self.gen_exception_insn(ir, EXCP_UDEF, syn_fp_access_trap(1, 0xe, false), el);
            return FpAccess::Trapped;
        }

        if !self.vfp_enabled && !ignore_vfp_enabled {
            tracing::debug!(pc = self.pc_curr, "FP disabled");
            self.unallocated_encoding(ir);
            return FpAccess::Disabled;
        }

        if !self.has(IsarFeatures::M) {
            return FpAccess::Enabled;
        }

        self.gen_preserve_fp_state(ir);

        if self.v8m_fpccr_s_wrong {
            let ofs = v7m_fpccr_offset(M_REG_S);
            let fpccr = self.load_cpu_field(ir, ofs);
            if self.v8m_secure {
                ir.gen_ori(Type::I32, fpccr, fpccr, V7M_FPCCR_S_MASK as u64);
            } else {
                ir.gen_andi(Type::I32, fpccr, fpccr, !V7M_FPCCR_S_MASK as u64);
            }
            self.store_cpu_field(ir, fpccr, ofs);
            self.v8m_fpccr_s_wrong = false;
        }

        if self.v7m_new_fp_ctxt_needed {
            let bank = if self.v8m_secure { M_REG_S } else { M_REG_NS };
            let fpscr = self.load_cpu_field(ir, v7m_fpdscr_offset(bank));
            Helper::VfpSetFpscr.call_void(ir, &[self.env, fpscr]);

            let mut bits = V7M_CONTROL_FPCA_MASK;
            if self.v8m_secure {
                bits |= V7M_CONTROL_SFPA_MASK;
            }
            let ofs = v7m_control_offset(M_REG_S);
            let control = self.load_cpu_field(ir, ofs);
            ir.gen_ori(Type::I32, control, control, bits as u64);
            self.store_cpu_field(ir, control, ofs);
            self.v7m_new_fp_ctxt_needed = false;
        }

        FpAccess::ContextManaged
    }

    /// Standard check used by ordinary FP instructions.
    pub(crate) fn vfp_access_check(&mut self, ir: &mut Context) -> bool {
        self.full_vfp_access_check(ir, false).allowed()
    }
}
