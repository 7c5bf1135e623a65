//! VFP register addressing.
//!
//! All FP registers live in `ArmCpu::zregs`. D<n> is slot `n`; S<2n>
//! and S<2n+1> are the two 32-bit halves of slot `n`; half-precision
//! values occupy one 16-bit half of an S register.

use super::cpu::ZREGS_OFFSET;
use tcg_core::{MemOp, Type};

/// Operand precision of a VFP instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Half,
    Single,
    Double,
}

impl Precision {
    /// IR type holding one register of this precision.
    pub const fn ir_type(self) -> Type {
        match self {
            Precision::Half | Precision::Single => Type::I32,
            Precision::Double => Type::I64,
        }
    }

    /// Guest memory access size of one register.
    pub const fn memop(self) -> MemOp {
        match self {
            Precision::Half => MemOp::uw(),
            Precision::Single => MemOp::ul(),
            Precision::Double => MemOp::uq(),
        }
    }

    /// Register width in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Precision::Half => 2,
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }

    /// Select a per-precision item, in (half, single, double) order.
    pub fn pick<T>(self, h: T, s: T, d: T) -> T {
        match self {
            Precision::Half => h,
            Precision::Single => s,
            Precision::Double => d,
        }
    }

    /// Decode the two-bit `sz` field used by VSEL/VRINT/VCVT
    /// (1 = half, 2 = single, 3 = double).
    pub const fn from_sz(sz: u32) -> Option<Self> {
        match sz {
            1 => Some(Precision::Half),
            2 => Some(Precision::Single),
            3 => Some(Precision::Double),
            _ => None,
        }
    }
}

/// Byte offset of the low/high S half within a D slot.
const fn sreg_half_offset(high: bool) -> i64 {
    if cfg!(target_endian = "big") {
        if high {
            0
        } else {
            4
        }
    } else if high {
        4
    } else {
        0
    }
}

/// Byte offset of register `reg` of precision `p` within `ArmCpu`.
///
/// Half-precision registers are addressed as their containing S
/// register; the value sits in the low 16 bits of the loaded word.
pub const fn offset_of(reg: u32, p: Precision) -> i64 {
    match p {
        Precision::Double => ZREGS_OFFSET + reg as i64 * 8,
        Precision::Single | Precision::Half => {
            ZREGS_OFFSET + (reg >> 1) as i64 * 8 + sreg_half_offset(reg & 1 != 0)
        }
    }
}

/// Byte offset of the top or bottom 16 bits of S<reg>.
pub const fn f16_offset(reg: u32, top: bool) -> i64 {
    let offs = offset_of(reg, Precision::Single);
    let upper = if cfg!(target_endian = "big") { !top } else { top };
    if upper {
        offs + 2
    } else {
        offs
    }
}

/// Byte offset of element `ele` of size `1 << size` bytes within
/// Neon register D<reg>.
pub const fn neon_element_offset(reg: u32, ele: u32, size: u32) -> i64 {
    let ofs = (ele << size) as i64;
    let ofs = if cfg!(target_endian = "big") {
        ofs ^ (8 - (1i64 << size))
    } else {
        ofs
    };
    ZREGS_OFFSET + reg as i64 * 8 + ofs
}

/// Whether `reg` sits in the scalar bank under short-vector
/// addressing: s0-s7, or d0-d3 and d16-d19.
pub const fn is_scalar_bank(reg: u32, p: Precision) -> bool {
    match p {
        Precision::Double => reg & 0xc == 0,
        Precision::Single | Precision::Half => reg & 0x18 == 0,
    }
}

/// Step `reg` by `delta` positions, wrapping within its bank.
pub const fn advance(reg: u32, p: Precision, delta: i32) -> u32 {
    let mask: u32 = match p {
        Precision::Double => 3,
        Precision::Single | Precision::Half => 7,
    };
    (reg.wrapping_add(delta as u32) & mask) | (reg & !mask)
}

/// Expand an 8-bit VFP modified immediate to a bit pattern of
/// precision `p` (VFPExpandImm).
pub const fn vfp_expand_imm(p: Precision, imm8: u8) -> u64 {
    let sign = imm8 & 0x80 != 0;
    let b6 = imm8 & 0x40 != 0;
    let low = (imm8 & 0x3f) as u64;
    match p {
        Precision::Double => {
            let imm = (if sign { 0x8000 } else { 0 })
                | (if b6 { 0x3fc0 } else { 0x4000 })
                | low;
            imm << 48
        }
        Precision::Single => {
            let imm = (if sign { 0x8000 } else { 0 })
                | (if b6 { 0x3e00 } else { 0x4000 })
                | (low << 3);
            imm << 16
        }
        Precision::Half => {
            (if sign { 0x8000 } else { 0 }) | (if b6 { 0x3000 } else { 0x4000 }) | (low << 6)
        }
    }
}

/// FP rounding modes, in AArch64 FPCR.RMode order plus the two
/// extra modes used by VRINTA/VCVTA and round-to-odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpRounding {
    TieEven,
    PosInf,
    NegInf,
    Zero,
    TieAway,
    Odd,
}

impl FpRounding {
    /// The soft-float library's encoding of this mode.
    pub const fn to_softfloat(self) -> u32 {
        match self {
            FpRounding::TieEven => 0,
            FpRounding::NegInf => 1,
            FpRounding::PosInf => 2,
            FpRounding::Zero => 3,
            FpRounding::TieAway => 4,
            FpRounding::Odd => 5,
        }
    }

    /// Decode the `rm` field of VRINT{A,N,P,M} and VCVT{A,N,P,M}.
    pub const fn decode_rm(rm: u32) -> FpRounding {
        const FP_DECODE_RM: [FpRounding; 4] = [
            FpRounding::TieAway,
            FpRounding::TieEven,
            FpRounding::PosInf,
            FpRounding::NegInf,
        ];
        FP_DECODE_RM[(rm & 3) as usize]
    }
}
