//! AArch32 frontend: VFP (scalar and legacy short-vector FP)
//! instruction translation.

mod access;
pub mod cpu;
mod emit;
pub mod features;
pub mod helper;
pub mod insn;
pub mod regs;
mod sysreg;
mod templates;
mod trans_arith;
mod trans_convert;
mod trans_mem;
mod trans_move;
mod trans_mprofile;

pub use access::FpAccess;

use std::collections::VecDeque;

use crate::{DisasContextBase, DisasJumpType, TranslateError, TranslatorOps};
use cpu::{reg_offset, CF_OFFSET, NF_OFFSET, NUM_REGS, VF_OFFSET, ZF_OFFSET};
use features::{ArmCfg, ArmTbFlags, IsarFeatures};
use helper::Helper;
use insn::VfpInsn;
use tcg_core::{Context, TempIdx, TranslationBlock, Type};

const REG_NAMES: [&str; NUM_REGS] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11",
    "r12", "sp", "lr", "pc",
];

// ---------------------------------------------------------------
// Disassembly context
// ---------------------------------------------------------------

/// AArch32 disassembly context (extends `DisasContextBase`).
pub struct ArmDisasContext {
    /// Generic base fields (pc, is_jmp, counters).
    pub base: DisasContextBase,
    /// IR temp for the env pointer (fixed host register).
    pub env: TempIdx,
    /// Core registers r0-r15 (globals).
    pub regs: [TempIdx; NUM_REGS],
    pub nf: TempIdx,
    pub zf: TempIdx,
    pub cf: TempIdx,
    pub vf: TempIdx,

    pub cfg: ArmCfg,
    pub features: IsarFeatures,

    // -- Mode snapshot (from the TB flags) --
    pub thumb: bool,
    pub is_user: bool,
    pub current_el: u32,
    /// Nonzero: FP instructions trap to this EL.
    pub fp_excp_el: u32,
    pub vfp_enabled: bool,
    pub vec_len: u32,
    pub vec_stride: u32,
    /// Lazy FP state preservation pending; cleared once done.
    pub v7m_lspact: bool,
    /// FPCCR.S disagrees with the security state; cleared on resync.
    pub v8m_fpccr_s_wrong: bool,
    /// A fresh FP context must be created; cleared once created.
    pub v7m_new_fp_ctxt_needed: bool,
    pub v8m_secure: bool,
    pub v8m_stackcheck: bool,
    pub use_icount: bool,

    /// Address of the instruction being translated.
    pub pc_curr: u64,
    /// Label the current instruction may skip to; bound once the
    /// instruction is done.
    condlabel: Option<u32>,
    /// Pre-decoded instruction stream, one word per 4 bytes of pc.
    insns: VecDeque<VfpInsn>,
}

/// Result of handing one instruction to the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransOutcome {
    /// Not a legal encoding in this context; nothing was emitted.
    Illegal,
    /// Legal, but architecturally a no-op here.
    HandledNoEmission,
    HandledWithEmission,
}

impl ArmDisasContext {
    /// Create a context for translating `tb` on a CPU configured as
    /// `cfg`, fed by `insns` starting at `tb.pc`.
    pub fn new(
        tb: &TranslationBlock,
        cfg: ArmCfg,
        insns: impl IntoIterator<Item = VfpInsn>,
    ) -> Self {
        let flags = ArmTbFlags::unpack(tb.flags);
        let insns: VecDeque<VfpInsn> = insns.into_iter().collect();
        let max_insns =
            TranslationBlock::max_insns(tb.cflags).min(insns.len().max(1) as u32);
        Self {
            base: DisasContextBase {
                pc_first: tb.pc,
                pc_next: tb.pc,
                is_jmp: DisasJumpType::Next,
                num_insns: 0,
                max_insns,
            },
            env: TempIdx(0),
            regs: [TempIdx(0); NUM_REGS],
            nf: TempIdx(0),
            zf: TempIdx(0),
            cf: TempIdx(0),
            vf: TempIdx(0),
            cfg,
            features: cfg.features,
            thumb: flags.thumb,
            is_user: flags.is_user,
            current_el: flags.current_el,
            fp_excp_el: flags.fp_excp_el,
            vfp_enabled: flags.vfp_enabled,
            vec_len: flags.vec_len,
            vec_stride: flags.vec_stride,
            v7m_lspact: flags.v7m_lspact,
            v8m_fpccr_s_wrong: flags.v8m_fpccr_s_wrong,
            v7m_new_fp_ctxt_needed: flags.v7m_new_fp_ctxt_needed,
            v8m_secure: flags.v8m_secure,
            v8m_stackcheck: flags.v8m_stackcheck,
            use_icount: tb.use_icount(),
            pc_curr: tb.pc,
            condlabel: None,
            insns,
        }
    }

    #[inline]
    pub(crate) fn has(&self, f: IsarFeatures) -> bool {
        self.features.contains(f)
    }

    /// Translate one decoded instruction.
    ///
    /// An `Illegal` outcome guarantees that no IR was appended; the
    /// caller decides how to raise the undefined-instruction
    /// exception.
    pub fn dispatch(
        &mut self,
        ir: &mut Context,
        insn: &VfpInsn,
    ) -> Result<TransOutcome, TranslateError> {
        if let Some((field, value)) = insn.core_regs().into_iter().find(|&(_, r)| r > 15) {
            return Err(TranslateError::InvalidField {
                insn: insn.name(),
                field,
                value: value.into(),
            });
        }

        let before = ir.num_ops();
        let handled = ir.scope(|ir| self.trans(ir, insn))?;
        let emitted = ir.num_ops() != before;

        let outcome = match (handled, emitted) {
            (false, true) => {
                return Err(TranslateError::PartialEmission { insn: insn.name() });
            }
            (false, false) => {
                tracing::debug!(pc = self.pc_curr, insn = insn.name(), "illegal encoding");
                TransOutcome::Illegal
            }
            (true, false) => TransOutcome::HandledNoEmission,
            (true, true) => TransOutcome::HandledWithEmission,
        };

        if self.base.is_jmp == DisasJumpType::Next {
            if let Some(label) = self.condlabel.take() {
                ir.gen_set_label(label);
            }
        }
        tracing::trace!(pc = self.pc_curr, insn = insn.name(), ?outcome, "translated");
        Ok(outcome)
    }

    fn trans(&mut self, ir: &mut Context, insn: &VfpInsn) -> Result<bool, TranslateError> {
        use VfpInsn::*;
        match *insn {
            VmovToGp(a) => self.trans_vmov_to_gp(ir, &a),
            VmovFromGp(a) => self.trans_vmov_from_gp(ir, &a),
            Vdup(a) => self.trans_vdup(ir, &a),
            VmsrVmrs(a) => self.trans_vmsr_vmrs(ir, &a),
            VldrSysreg(a) => self.trans_vldr_sysreg(ir, &a),
            VstrSysreg(a) => self.trans_vstr_sysreg(ir, &a),
            VmovHalf(a) => self.trans_vmov_half(ir, &a),
            VmovSingle(a) => self.trans_vmov_single(ir, &a),
            Vmov64Sp(a) => self.trans_vmov_64_sp(ir, &a),
            Vmov64Dp(a) => self.trans_vmov_64_dp(ir, &a),
            VldrVstr(p, a) => self.trans_vldr_vstr(ir, p, &a),
            VldmVstm(p, a) => self.trans_vldm_vstm(ir, p, &a),

            Vmla(p, a) => self.trans_vmla(ir, p, &a),
            Vmls(p, a) => self.trans_vmls(ir, p, &a),
            Vnmls(p, a) => self.trans_vnmls(ir, p, &a),
            Vnmla(p, a) => self.trans_vnmla(ir, p, &a),
            Vmul(p, a) => self.trans_vmul(ir, p, &a),
            Vnmul(p, a) => self.trans_vnmul(ir, p, &a),
            Vadd(p, a) => self.trans_vadd(ir, p, &a),
            Vsub(p, a) => self.trans_vsub(ir, p, &a),
            Vdiv(p, a) => self.trans_vdiv(ir, p, &a),
            Vminnm(p, a) => self.trans_vminnm(ir, p, &a),
            Vmaxnm(p, a) => self.trans_vmaxnm(ir, p, &a),
            Vfm(kind, p, a) => self.trans_vfm(ir, kind, p, &a),
            VmovImm(p, a) => self.trans_vmov_imm(ir, p, &a),
            VmovReg(p, a) => self.trans_vmov_reg(ir, p, &a),
            Vabs(p, a) => self.trans_vabs(ir, p, &a),
            Vneg(p, a) => self.trans_vneg(ir, p, &a),
            Vsqrt(p, a) => self.trans_vsqrt(ir, p, &a),
            Vcmp(p, a) => self.trans_vcmp(ir, p, &a),
            Vsel(p, a) => self.trans_vsel(ir, p, &a),
            Vins(a) => self.trans_vins(ir, &a),
            Vmovx(a) => self.trans_vmovx(ir, &a),

            Vrint(p, a) => self.trans_vrint(ir, p, &a),
            Vcvt(p, a) => self.trans_vcvt(ir, p, &a),
            Vrintr(p, a) => self.trans_vrintr(ir, p, &a),
            Vrintz(p, a) => self.trans_vrintz(ir, p, &a),
            Vrintx(p, a) => self.trans_vrintx(ir, p, &a),
            VcvtF32F16(a) => self.trans_vcvt_f32_f16(ir, &a),
            VcvtF64F16(a) => self.trans_vcvt_f64_f16(ir, &a),
            VcvtF16F32(a) => self.trans_vcvt_f16_f32(ir, &a),
            VcvtF16F64(a) => self.trans_vcvt_f16_f64(ir, &a),
            VcvtSp(a) => self.trans_vcvt_sp(ir, &a),
            VcvtDp(a) => self.trans_vcvt_dp(ir, &a),
            VcvtInt(p, a) => self.trans_vcvt_int(ir, p, &a),
            Vjcvt(a) => self.trans_vjcvt(ir, &a),
            VcvtFix(p, a) => self.trans_vcvt_fix(ir, p, &a),
            VcvtToInt(p, a) => self.trans_vcvt_to_int(ir, p, &a),

            VlldmVlstm(a) => self.trans_vlldm_vlstm(ir, &a),
            Vscclrm(a) => self.trans_vscclrm(ir, &a),
            // A NOCP check that does not fire reports `Ok(false)`. The
            // coprocessor space it covers has no other handler here, so
            // that becomes an UNDEF in `translate_insn`.
            Nocp(a) => self.trans_nocp(ir, &a),
            Nocp81(a) => self.trans_nocp_8_1(ir, &a),
        }
    }
}

// ---------------------------------------------------------------
// TranslatorOps implementation
// ---------------------------------------------------------------

/// Marker type for the AArch32 VFP translator.
pub struct ArmTranslator;

impl TranslatorOps for ArmTranslator {
    type DisasContext = ArmDisasContext;

    fn init_disas_context(ctx: &mut ArmDisasContext, ir: &mut Context) {
        // env lives in a fixed host register.
        ctx.env = ir.new_fixed(Type::I64, 5, "env");

        for (i, name) in REG_NAMES.iter().enumerate() {
            ctx.regs[i] = ir.new_global(Type::I32, ctx.env, reg_offset(i), name);
        }
        ctx.nf = ir.new_global(Type::I32, ctx.env, NF_OFFSET, "NF");
        ctx.zf = ir.new_global(Type::I32, ctx.env, ZF_OFFSET, "ZF");
        ctx.cf = ir.new_global(Type::I32, ctx.env, CF_OFFSET, "CF");
        ctx.vf = ir.new_global(Type::I32, ctx.env, VF_OFFSET, "VF");
    }

    fn tb_start(_ctx: &mut ArmDisasContext, _ir: &mut Context) {}

    fn insn_start(ctx: &mut ArmDisasContext, ir: &mut Context) {
        ir.gen_insn_start(ctx.base.pc_next);
        ctx.base.num_insns += 1;
    }

    fn translate_insn(
        ctx: &mut ArmDisasContext,
        ir: &mut Context,
    ) -> Result<(), TranslateError> {
        let insn = ctx.insns.pop_front().ok_or(TranslateError::EndOfInput)?;
        ctx.pc_curr = ctx.base.pc_next;

        if ctx.dispatch(ir, &insn)? == TransOutcome::Illegal {
            ir.scope(|ir| ctx.unallocated_encoding(ir));
        }

        ctx.base.pc_next += 4;
        Ok(())
    }

    fn tb_stop(ctx: &mut ArmDisasContext, ir: &mut Context) {
        ir.scope(|ir| {
            match ctx.base.is_jmp {
                DisasJumpType::NoReturn => {
                    // TB already terminated by the instruction.
                }
                DisasJumpType::Next
                | DisasJumpType::TooMany
                | DisasJumpType::UpdateExit => {
                    ctx.gen_set_pc_im(ir, ctx.base.pc_next);
                    ir.gen_exit_tb(0);
                }
                DisasJumpType::UpdateNoChain => {
                    ctx.gen_set_pc_im(ir, ctx.base.pc_next);
                    ctx.gen_goto_lookup(ir);
                }
                DisasJumpType::Jump => ctx.gen_goto_lookup(ir),
            }

            // An instruction that skipped ahead and also ended the
            // block falls through to the next one here.
            if let Some(label) = ctx.condlabel.take() {
                ir.gen_set_label(label);
                ctx.gen_set_pc_im(ir, ctx.base.pc_next);
                ir.gen_exit_tb(0);
            }
        });

        if tracing::enabled!(tracing::Level::TRACE) {
            let mut out = Vec::new();
            if tcg_core::dump::dump_ops_with(ir, &mut out, Helper::name_of).is_ok() {
                tracing::trace!(
                    pc = ctx.base.pc_first,
                    insns = ctx.base.num_insns,
                    "IR:\n{}",
                    String::from_utf8_lossy(&out)
                );
            }
        }
    }

    fn base(ctx: &ArmDisasContext) -> &DisasContextBase {
        &ctx.base
    }

    fn base_mut(ctx: &mut ArmDisasContext) -> &mut DisasContextBase {
        &mut ctx.base
    }
}
