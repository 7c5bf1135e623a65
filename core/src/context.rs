use std::collections::HashMap;

use crate::label::Label;
use crate::op::{Op, OpIdx};
use crate::temp::{Temp, TempIdx, TempKind};
use crate::types::{Type, TYPE_COUNT};

/// Maximum number of EBB temps live at once.
///
/// Globals and interned constants do not count: they are never
/// released, and a long block may intern one constant per pc.
pub const MAX_TEMPS: usize = 512;
/// Maximum number of guest instructions per TB.
pub const MAX_INSNS: usize = 512;

/// Per-thread TCG translation context.
///
/// Maps to QEMU's `TCGContext`. Holds all state needed during
/// translation of a single translation block: temporaries, IR ops
/// and labels.
///
/// EBB temporaries are owned by the innermost open [`Context::scope`]
/// and go back to a per-type free list when that scope closes, so a
/// handler cannot leak one on an early return.
pub struct Context {
    temps: Vec<Temp>,
    ops: Vec<Op>,
    labels: Vec<Label>,

    /// Number of global temps (always at the front of `temps`).
    nb_globals: u32,

    /// Per-type hash map from constant value to TempIdx,
    /// avoiding duplicate const temps.
    const_table: [HashMap<u64, TempIdx>; TYPE_COUNT],

    // -- Scoped temporaries --
    /// EBB temps currently allocated, in allocation order.
    live: Vec<TempIdx>,
    /// Released EBB temps available for reuse, per type.
    free: [Vec<TempIdx>; TYPE_COUNT],
}

impl Context {
    pub fn new() -> Self {
        Self {
            temps: Vec::with_capacity(256),
            ops: Vec::with_capacity(512),
            labels: Vec::with_capacity(32),
            nb_globals: 0,
            const_table: Default::default(),
            live: Vec::with_capacity(64),
            free: Default::default(),
        }
    }

    /// Reset context for translating a new TB. Preserves globals.
    pub fn reset(&mut self) {
        self.temps.truncate(self.nb_globals as usize);
        self.ops.clear();
        self.labels.clear();
        for table in &mut self.const_table {
            table.clear();
        }
        self.live.clear();
        for list in &mut self.free {
            list.clear();
        }
    }

    // -- Temp allocation --

    pub fn nb_globals(&self) -> u32 {
        self.nb_globals
    }

    pub fn nb_temps(&self) -> u32 {
        self.temps.len() as u32
    }

    fn push_temp(&mut self, make: impl FnOnce(TempIdx) -> Temp) -> TempIdx {
        let idx = TempIdx(self.temps.len() as u32);
        self.temps.push(make(idx));
        idx
    }

    /// Allocate a new EBB-scoped temporary, reusing a released
    /// one of the same type when available.
    ///
    /// Panics if `MAX_TEMPS` are already live: some handler is
    /// allocating outside a scope.
    pub fn new_temp(&mut self, ty: Type) -> TempIdx {
        assert!(self.live.len() < MAX_TEMPS, "temp pool exhausted");
        let idx = match self.free[ty as usize].pop() {
            Some(idx) => idx,
            None => self.push_temp(|idx| Temp::new_ebb(idx, ty)),
        };
        self.live.push(idx);
        idx
    }

    /// Get or create a constant temp (deduplicated per type).
    pub fn new_const(&mut self, ty: Type, val: u64) -> TempIdx {
        let type_idx = ty as usize;
        if let Some(&existing) = self.const_table[type_idx].get(&val) {
            return existing;
        }
        let idx = self.push_temp(|idx| Temp::new_const(idx, ty, val));
        self.const_table[type_idx].insert(val, idx);
        idx
    }

    /// Register a global temp (must be called before any
    /// non-global allocation).
    /// The `base` is the TempIdx of the env pointer (a fixed temp).
    pub fn new_global(
        &mut self,
        ty: Type,
        base: TempIdx,
        offset: i64,
        name: &'static str,
    ) -> TempIdx {
        assert_eq!(
            self.temps.len() as u32,
            self.nb_globals,
            "globals must be registered before locals"
        );
        let idx = self.push_temp(|idx| Temp::new_global(idx, ty, base, offset, name));
        self.nb_globals += 1;
        idx
    }

    /// Register a fixed-register temp (must be called
    /// before any non-global allocation).
    pub fn new_fixed(
        &mut self,
        ty: Type,
        reg: u8,
        name: &'static str,
    ) -> TempIdx {
        assert_eq!(
            self.temps.len() as u32,
            self.nb_globals,
            "fixed temps must be registered before locals"
        );
        let idx = self.push_temp(|idx| Temp::new_fixed(idx, ty, reg, name));
        self.nb_globals += 1;
        idx
    }

    pub fn temp(&self, idx: TempIdx) -> &Temp {
        &self.temps[idx.0 as usize]
    }

    pub fn temps(&self) -> &[Temp] {
        &self.temps
    }

    /// Iterate over global temps only.
    pub fn globals(&self) -> &[Temp] {
        &self.temps[..self.nb_globals as usize]
    }

    // -- Scopes --

    /// Run `f` with a fresh temp scope: every EBB temp allocated
    /// inside is released when `f` returns, whichever path it took.
    pub fn scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.live.len();
        let ret = f(self);
        self.release_from(mark);
        ret
    }

    fn release_from(&mut self, mark: usize) {
        for idx in self.live.drain(mark..) {
            let t = &self.temps[idx.0 as usize];
            debug_assert_eq!(t.kind, TempKind::Ebb);
            self.free[t.ty as usize].push(idx);
        }
    }

    /// Number of EBB temps currently allocated and not yet released.
    pub fn live_temps(&self) -> usize {
        self.live.len()
    }

    // -- Op emission --

    pub fn emit_op(&mut self, op: Op) -> OpIdx {
        let idx = op.idx;
        self.ops.push(op);
        idx
    }

    pub fn next_op_idx(&self) -> OpIdx {
        OpIdx(self.ops.len() as u32)
    }

    pub fn op(&self, idx: OpIdx) -> &Op {
        &self.ops[idx.0 as usize]
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    // -- Labels --

    pub fn new_label(&mut self) -> u32 {
        let id = self.labels.len() as u32;
        self.labels.push(Label::new(id));
        id
    }

    pub fn label(&self, id: u32) -> &Label {
        &self.labels[id as usize]
    }

    pub fn label_mut(&mut self, id: u32) -> &mut Label {
        &mut self.labels[id as usize]
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Labels not placed exactly once.
    pub fn unbound_labels(&self) -> impl Iterator<Item = &Label> + '_ {
        self.labels.iter().filter(|l| !l.is_well_formed())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
