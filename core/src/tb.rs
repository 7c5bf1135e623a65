/// A guest code block being translated.
///
/// Maps to the translation-time part of QEMU's `TranslationBlock`:
/// the lookup key (pc, flags), the compile flags, and the guest
/// extent filled in once translation finishes.
#[derive(Debug, Clone)]
pub struct TranslationBlock {
    /// Guest virtual PC where this TB starts.
    pub pc: u64,
    /// CPU state flags that affect translation (mode, FP state).
    pub flags: u32,
    /// Compile flags (instruction count limit, icount).
    pub cflags: u32,
    /// Size of guest code covered by this TB, in bytes.
    pub size: u32,
    /// Number of guest instructions in this TB.
    pub icount: u16,
}

/// Compile flags for TranslationBlock.cflags.
pub mod cflags {
    /// Mask for the instruction count limit (0 = no limit).
    pub const CF_COUNT_MASK: u32 = 0x0000_FFFF;
    /// Use icount (deterministic execution).
    pub const CF_USE_ICOUNT: u32 = 0x0004_0000;
}

impl TranslationBlock {
    pub fn new(pc: u64, flags: u32, cflags: u32) -> Self {
        Self {
            pc,
            flags,
            cflags,
            size: 0,
            icount: 0,
        }
    }

    /// Whether instructions with I/O-visible side effects must end
    /// the block.
    pub fn use_icount(&self) -> bool {
        self.cflags & cflags::CF_USE_ICOUNT != 0
    }

    /// Maximum number of guest instructions per TB.
    pub fn max_insns(cflags: u32) -> u32 {
        let count = cflags & cflags::CF_COUNT_MASK;
        if count == 0 {
            crate::context::MAX_INSNS as u32
        } else {
            count
        }
    }
}
