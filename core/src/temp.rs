use crate::types::Type;

/// Where a temp's value lives and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TempKind {
    /// Scratch value owned by the innermost open `Context::scope`.
    Ebb,
    /// CPU state field at `mem_base + mem_offset`, live across blocks.
    Global,
    /// Pinned host register; only the env pointer uses this.
    Fixed,
    /// Interned immediate.
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempIdx(pub u32);

/// An IR value slot.
///
/// Only the fields that match `kind` are meaningful: `val` for
/// constants, `mem_base`/`mem_offset` for globals, `reg` for fixed
/// temps.
#[derive(Debug, Clone)]
pub struct Temp {
    pub idx: TempIdx,
    pub ty: Type,
    pub kind: TempKind,
    pub val: u64,
    pub mem_base: Option<TempIdx>,
    pub mem_offset: i64,
    pub reg: Option<u8>,
    /// Name shown in IR dumps.
    pub name: Option<&'static str>,
}

impl Temp {
    fn blank(idx: TempIdx, ty: Type, kind: TempKind) -> Self {
        Self {
            idx,
            ty,
            kind,
            val: 0,
            mem_base: None,
            mem_offset: 0,
            reg: None,
            name: None,
        }
    }

    pub fn new_ebb(idx: TempIdx, ty: Type) -> Self {
        Self::blank(idx, ty, TempKind::Ebb)
    }

    pub fn new_const(idx: TempIdx, ty: Type, val: u64) -> Self {
        Self {
            val,
            ..Self::blank(idx, ty, TempKind::Const)
        }
    }

    pub fn new_global(idx: TempIdx, ty: Type, base: TempIdx, offset: i64, name: &'static str) -> Self {
        Self {
            mem_base: Some(base),
            mem_offset: offset,
            name: Some(name),
            ..Self::blank(idx, ty, TempKind::Global)
        }
    }

    pub fn new_fixed(idx: TempIdx, ty: Type, reg: u8, name: &'static str) -> Self {
        Self {
            reg: Some(reg),
            name: Some(name),
            ..Self::blank(idx, ty, TempKind::Fixed)
        }
    }

    pub fn is_const(&self) -> bool {
        self.kind == TempKind::Const
    }

    pub fn is_global(&self) -> bool {
        self.kind == TempKind::Global
    }

    pub fn is_fixed(&self) -> bool {
        self.kind == TempKind::Fixed
    }

    /// Outlives every scope.
    pub fn is_global_or_fixed(&self) -> bool {
        matches!(self.kind, TempKind::Global | TempKind::Fixed)
    }
}
