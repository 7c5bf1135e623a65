use std::ops::Range;

use crate::opcode::Opcode;
use crate::temp::TempIdx;
use crate::types::Type;

/// Widest argument list of any opcode (`call`: 1 + 6 + 2).
pub const MAX_OP_ARGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpIdx(pub u32);

/// One emitted IR operation.
///
/// Constant arguments (offsets, label ids, conditions, memops) share
/// the argument array with temps and hold the raw value in the
/// `TempIdx`; `carg()` reads them back.
#[derive(Debug, Clone)]
pub struct Op {
    pub idx: OpIdx,
    pub opc: Opcode,
    /// Width for `int` opcodes; ignored otherwise.
    pub op_type: Type,
    pub args: [TempIdx; MAX_OP_ARGS],
    pub nargs: u8,
}

impl Op {
    /// Build an op from its arguments in output, input, constant
    /// order. Arguments past `MAX_OP_ARGS` are dropped.
    pub fn with_args(idx: OpIdx, opc: Opcode, op_type: Type, args: &[TempIdx]) -> Self {
        let n = args.len().min(MAX_OP_ARGS);
        let mut buf = [TempIdx(0); MAX_OP_ARGS];
        buf[..n].copy_from_slice(&args[..n]);
        Self {
            idx,
            opc,
            op_type,
            args: buf,
            nargs: n as u8,
        }
    }

    fn section(&self, which: usize) -> Range<usize> {
        let d = self.opc.def();
        let o = d.nb_oargs as usize;
        let i = o + d.nb_iargs as usize;
        let c = i + d.nb_cargs as usize;
        [0..o, o..i, i..c][which].clone()
    }

    pub fn oargs(&self) -> &[TempIdx] {
        &self.args[self.section(0)]
    }

    pub fn iargs(&self) -> &[TempIdx] {
        &self.args[self.section(1)]
    }

    pub fn cargs(&self) -> &[TempIdx] {
        &self.args[self.section(2)]
    }

    /// Constant argument `n` as its raw value.
    pub fn carg(&self, n: usize) -> u32 {
        self.cargs()[n].0
    }
}
