//! TCG frontend: guest instruction translation and IR generation.
//!
//! Provides the generic translation framework (`TranslatorOps` trait
//! and `translator_loop`) plus the AArch32 VFP translator.

pub mod arm;

use tcg_core::Context;
use thiserror::Error;

// ---------------------------------------------------------------
// Errors
// ---------------------------------------------------------------

/// Internal invariant violation detected during translation.
///
/// Architectural faults (undefined instructions, FP access traps) are
/// not errors: they are translated into exception-raising IR.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("{insn}: field `{field}` has impossible value {value}")]
    InvalidField {
        insn: &'static str,
        field: &'static str,
        value: i64,
    },
    #[error("{insn}: rejected after emitting IR")]
    PartialEmission { insn: &'static str },
    #[error("{live} temporaries still live at end of block")]
    TempLeak { live: usize },
    #[error("label L{id} bound {binds} times")]
    UnboundLabel { id: u32, binds: u32 },
    #[error("instruction stream ended before the block did")]
    EndOfInput,
}

// ---------------------------------------------------------------
// Generic translation framework
// ---------------------------------------------------------------

/// TB termination reason set by `translate_insn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisasJumpType {
    /// Continue to the next sequential instruction.
    Next,
    /// Reached the maximum number of instructions per TB.
    TooMany,
    /// Unconditional branch / exit, no fall-through.
    NoReturn,
    /// Write back the PC and return to the main loop.
    UpdateExit,
    /// Write back the PC and look up the next TB without chaining,
    /// because CPU state the TB flags depend on may have changed.
    UpdateNoChain,
    /// PC already written; look up the next TB.
    Jump,
}

/// Base context shared by all guest architectures.
pub struct DisasContextBase {
    /// PC of the first instruction in this TB.
    pub pc_first: u64,
    /// PC of the *next* instruction to decode.
    pub pc_next: u64,
    /// How the current instruction terminates.
    pub is_jmp: DisasJumpType,
    /// Number of guest instructions translated so far.
    pub num_insns: u32,
    /// Maximum instructions allowed in one TB.
    pub max_insns: u32,
}

/// Per-architecture translation operations.
pub trait TranslatorOps {
    /// Architecture-specific disassembly context.
    type DisasContext;

    /// One-time setup before the translation loop.
    fn init_disas_context(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Called once at the start of the TB (after init).
    fn tb_start(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Emit `insn_start` marker for the current guest PC.
    fn insn_start(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Translate one guest instruction.
    ///
    /// Must advance `base().pc_next` and set `base().is_jmp`
    /// when the instruction terminates the TB.
    fn translate_insn(
        ctx: &mut Self::DisasContext,
        ir: &mut Context,
    ) -> Result<(), TranslateError>;

    /// Emit TB epilogue (exit / goto_ptr for fall-through).
    fn tb_stop(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Access the base context embedded in the arch context.
    fn base(ctx: &Self::DisasContext) -> &DisasContextBase;

    /// Mutable access to the base context.
    fn base_mut(ctx: &mut Self::DisasContext) -> &mut DisasContextBase;
}

/// Drives the insn_start/translate cycle until the block ends, then
/// checks the finished block for dangling labels and leaked
/// temporaries.
pub fn translator_loop<T: TranslatorOps>(
    ctx: &mut T::DisasContext,
    ir: &mut Context,
) -> Result<(), TranslateError> {
    T::init_disas_context(ctx, ir);
    T::tb_start(ctx, ir);

    loop {
        T::insn_start(ctx, ir);
        T::translate_insn(ctx, ir)?;

        let base = T::base(ctx);
        if base.is_jmp != DisasJumpType::Next {
            break;
        }
        if base.num_insns >= base.max_insns {
            T::base_mut(ctx).is_jmp = DisasJumpType::TooMany;
            break;
        }
    }

    T::tb_stop(ctx, ir);

    if let Some(l) = ir.unbound_labels().next() {
        return Err(TranslateError::UnboundLabel {
            id: l.id,
            binds: l.binds,
        });
    }
    match ir.live_temps() {
        0 => Ok(()),
        live => Err(TranslateError::TempLeak { live }),
    }
}
