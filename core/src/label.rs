/// A branch target label within a translation block.
///
/// Maps to QEMU's `TCGLabel`. Labels support forward references:
/// a branch may name a label before `set_label` places it, but every
/// label must be placed exactly once before the block is finalized.
#[derive(Debug, Clone)]
pub struct Label {
    pub id: u32,
    /// Number of `set_label` ops emitted for this label.
    pub binds: u32,
    /// Number of branches referencing this label.
    pub refs: u32,
}

impl Label {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            binds: 0,
            refs: 0,
        }
    }

    /// Whether this label has been placed.
    pub fn is_present(&self) -> bool {
        self.binds > 0
    }

    /// Placed exactly once.
    pub fn is_well_formed(&self) -> bool {
        self.binds == 1
    }

    /// Record a branch to this label.
    pub fn add_ref(&mut self) {
        self.refs += 1;
    }

    /// Record a placement of this label.
    pub fn bind(&mut self) {
        self.binds += 1;
    }
}
