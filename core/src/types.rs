/// Width of an IR value.
///
/// The vector types only ever hold whole D/Q register images written
/// by `dup_vec` and `st_vec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Type {
    I32 = 0,
    I64 = 1,
    V64 = 2,
    V128 = 3,
}

pub const TYPE_COUNT: usize = 4;

impl Type {
    pub const fn size_bytes(self) -> u32 {
        match self {
            Type::I32 => 4,
            Type::I64 | Type::V64 => 8,
            Type::V128 => 16,
        }
    }

    pub const fn size_bits(self) -> u32 {
        self.size_bytes() * 8
    }
}

/// Comparison for `brcond` and `movcond`.
///
/// The discriminant is what the op's constant argument stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cond {
    Never = 0,
    Always = 1,
    Eq = 8,
    Ne = 9,
    Lt = 10,
    Ge = 11,
    Le = 12,
    Gt = 13,
    Ltu = 14,
    Geu = 15,
    Leu = 16,
    Gtu = 17,
}

impl Cond {
    const ALL: [Cond; 12] = [
        Cond::Never,
        Cond::Always,
        Cond::Eq,
        Cond::Ne,
        Cond::Lt,
        Cond::Ge,
        Cond::Le,
        Cond::Gt,
        Cond::Ltu,
        Cond::Geu,
        Cond::Leu,
        Cond::Gtu,
    ];

    /// The condition that holds exactly when `self` does not.
    pub const fn invert(self) -> Cond {
        match self {
            Cond::Never => Cond::Always,
            Cond::Always => Cond::Never,
            // Eq/Ne, Lt/Ge, Le/Gt and the unsigned pairs sit at
            // adjacent even/odd codes.
            c => match Cond::from_raw(c as u32 ^ 1) {
                Some(inv) => inv,
                None => c,
            },
        }
    }

    pub const fn from_raw(raw: u32) -> Option<Cond> {
        let mut i = 0;
        while i < Cond::ALL.len() {
            if Cond::ALL[i] as u32 == raw {
                return Some(Cond::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// Short name used in IR dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Cond::Never => "never",
            Cond::Always => "always",
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Ge => "ge",
            Cond::Le => "le",
            Cond::Gt => "gt",
            Cond::Ltu => "ltu",
            Cond::Geu => "geu",
            Cond::Leu => "leu",
            Cond::Gtu => "gtu",
        }
    }
}

/// Guest memory access descriptor carried by `qemu_ld`/`qemu_st`:
/// log2 size in bits 0-1, then sign and alignment flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemOp(u16);

impl MemOp {
    pub const SIZE_8: u16 = 0;
    pub const SIZE_16: u16 = 1;
    pub const SIZE_32: u16 = 2;
    pub const SIZE_64: u16 = 3;
    pub const SIGN: u16 = 1 << 2;
    pub const ALIGN: u16 = 1 << 4;

    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn uw() -> Self {
        Self(Self::SIZE_16)
    }

    pub const fn ul() -> Self {
        Self(Self::SIZE_32)
    }

    pub const fn uq() -> Self {
        Self(Self::SIZE_64)
    }

    pub const fn aligned(self) -> Self {
        Self(self.0 | Self::ALIGN)
    }

    pub const fn size(self) -> u16 {
        self.0 & 0x3
    }

    pub const fn size_bytes(self) -> u32 {
        1 << self.size()
    }

    pub const fn is_signed(self) -> bool {
        self.0 & Self::SIGN != 0
    }

    pub const fn is_aligned(self) -> bool {
        self.0 & Self::ALIGN != 0
    }
}

impl From<MemOp> for u32 {
    fn from(m: MemOp) -> u32 {
        m.0 as u32
    }
}
