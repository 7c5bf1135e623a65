//! AArch32 FP/SIMD feature configuration.
//!
//! `IsarFeatures` folds together the ID-register derived ISA
//! features (`isar_feature_aa32_*`) and the coarse architecture
//! features (`ARM_FEATURE_*`) that gate VFP decode. `ArmCfg`
//! pairs a feature set with a CPU model name.

/// Bitmask of VFP-relevant CPU features.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsarFeatures(u32);

impl IsarFeatures {
    pub const EMPTY: Self = Self(0);
    /// Single-precision VFPv2 instructions.
    pub const FPSP_V2: Self = Self(1 << 0);
    /// Single-precision VFPv3 additions (VMOV imm, fixed-point VCVT).
    pub const FPSP_V3: Self = Self(1 << 1);
    /// Double-precision VFPv2 instructions.
    pub const FPDP_V2: Self = Self(1 << 2);
    /// Double-precision VFPv3 additions.
    pub const FPDP_V3: Self = Self(1 << 3);
    /// Half-precision arithmetic.
    pub const FP16_ARITH: Self = Self(1 << 4);
    /// D16-D31 present.
    pub const SIMD_R32: Self = Self(1 << 5);
    /// Legacy short vectors (FPSCR.LEN/STRIDE).
    pub const FPSHVEC: Self = Self(1 << 6);
    pub const VSEL: Self = Self(1 << 7);
    pub const VRINT: Self = Self(1 << 8);
    /// VCVTA/N/P/M with directed rounding.
    pub const VCVT_DR: Self = Self(1 << 9);
    pub const VMINMAXNM: Self = Self(1 << 10);
    /// Fused multiply-add.
    pub const SIMDFMAC: Self = Self(1 << 11);
    /// Half <-> single conversion.
    pub const FP16_SPCONV: Self = Self(1 << 12);
    /// Half <-> double conversion.
    pub const FP16_DPCONV: Self = Self(1 << 13);
    /// VJCVT.
    pub const JSCVT: Self = Self(1 << 14);
    /// Advanced SIMD.
    pub const NEON: Self = Self(1 << 15);
    /// MVFR0/1 visible to VMRS.
    pub const MVFR: Self = Self(1 << 16);
    /// M-profile.
    pub const M: Self = Self(1 << 17);
    /// M-profile Main Extension.
    pub const M_MAIN: Self = Self(1 << 18);
    /// M-profile v8.1 security state extensions (VSCCLRM).
    pub const M_SEC_STATE: Self = Self(1 << 19);
    pub const V8: Self = Self(1 << 20);
    pub const V8_1M: Self = Self(1 << 21);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Any VFP at all (`isar_feature_aa32_vfp`).
    #[inline]
    pub const fn has_vfp(self) -> bool {
        self.contains(Self::FPSP_V2) || self.contains(Self::FPDP_V2)
    }
}

impl std::ops::BitOr for IsarFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Per-CPU FP configuration.
#[derive(Clone, Copy, Debug)]
pub struct ArmCfg {
    pub name: &'static str,
    pub features: IsarFeatures,
}

// ── Predefined profiles ──────────────────────────────────────────

const VFPV3_D32: IsarFeatures = IsarFeatures(
    IsarFeatures::FPSP_V2.0
        | IsarFeatures::FPSP_V3.0
        | IsarFeatures::FPDP_V2.0
        | IsarFeatures::FPDP_V3.0
        | IsarFeatures::SIMD_R32.0
        | IsarFeatures::MVFR.0,
);

const V8_FP: IsarFeatures = IsarFeatures(
    VFPV3_D32.0
        | IsarFeatures::VSEL.0
        | IsarFeatures::VRINT.0
        | IsarFeatures::VCVT_DR.0
        | IsarFeatures::VMINMAXNM.0
        | IsarFeatures::SIMDFMAC.0
        | IsarFeatures::FP16_SPCONV.0
        | IsarFeatures::FP16_DPCONV.0
        | IsarFeatures::NEON.0
        | IsarFeatures::V8.0,
);

const FPV4_SP: IsarFeatures = IsarFeatures(
    IsarFeatures::FPSP_V2.0
        | IsarFeatures::FPSP_V3.0
        | IsarFeatures::SIMDFMAC.0
        | IsarFeatures::FP16_SPCONV.0
        | IsarFeatures::MVFR.0
        | IsarFeatures::M.0
        | IsarFeatures::M_MAIN.0,
);

impl ArmCfg {
    /// ARMv7-A, VFPv4-D32 with short vectors and Neon.
    pub const CORTEX_A15: Self = Self {
        name: "cortex-a15",
        features: IsarFeatures(
            VFPV3_D32.0
                | IsarFeatures::FPSHVEC.0
                | IsarFeatures::SIMDFMAC.0
                | IsarFeatures::FP16_SPCONV.0
                | IsarFeatures::NEON.0,
        ),
    };

    /// ARMv8.0-A AArch32.
    pub const CORTEX_A72: Self = Self {
        name: "cortex-a72",
        features: V8_FP,
    };

    /// ARMv8.2-A+ AArch32 with FP16 arithmetic and JSCVT.
    pub const MAX: Self = Self {
        name: "max",
        features: IsarFeatures(
            V8_FP.0 | IsarFeatures::FP16_ARITH.0 | IsarFeatures::JSCVT.0,
        ),
    };

    /// ARMv7E-M with FPv4-SP.
    pub const CORTEX_M4: Self = Self {
        name: "cortex-m4",
        features: FPV4_SP,
    };

    /// ARMv8-M Mainline with FPv5-SP and the Security Extension.
    pub const CORTEX_M33: Self = Self {
        name: "cortex-m33",
        features: IsarFeatures(
            FPV4_SP.0
                | IsarFeatures::VSEL.0
                | IsarFeatures::VRINT.0
                | IsarFeatures::VCVT_DR.0
                | IsarFeatures::VMINMAXNM.0
                | IsarFeatures::V8.0,
        ),
    };

    /// ARMv8.1-M Mainline with double precision and FP16.
    pub const CORTEX_M55: Self = Self {
        name: "cortex-m55",
        features: IsarFeatures(
            Self::CORTEX_M33.features.0
                | IsarFeatures::FPDP_V2.0
                | IsarFeatures::FPDP_V3.0
                | IsarFeatures::FP16_ARITH.0
                | IsarFeatures::FP16_DPCONV.0
                | IsarFeatures::M_SEC_STATE.0
                | IsarFeatures::V8_1M.0,
        ),
    };

    /// Look up a profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        [
            Self::CORTEX_A15,
            Self::CORTEX_A72,
            Self::MAX,
            Self::CORTEX_M4,
            Self::CORTEX_M33,
            Self::CORTEX_M55,
        ]
        .into_iter()
        .find(|cfg| cfg.name == name)
    }

    pub fn has(&self, f: IsarFeatures) -> bool {
        self.features.contains(f)
    }
}

impl Default for ArmCfg {
    fn default() -> Self {
        Self::MAX
    }
}

/// Per-block mode snapshot packed into `TranslationBlock::flags`.
///
/// | bits  | field                  |
/// |-------|------------------------|
/// | 0     | thumb                  |
/// | 1     | user                   |
/// | 2-3   | current EL             |
/// | 4-5   | FP exception EL        |
/// | 6     | VFP enabled            |
/// | 7-9   | FPSCR.LEN              |
/// | 10-11 | FPSCR.STRIDE           |
/// | 12    | LSPACT                 |
/// | 13    | FPCCR.S out of sync    |
/// | 14    | new FP context needed  |
/// | 15    | secure                 |
/// | 16    | stack limit checking   |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArmTbFlags {
    pub thumb: bool,
    pub is_user: bool,
    pub current_el: u32,
    pub fp_excp_el: u32,
    pub vfp_enabled: bool,
    pub vec_len: u32,
    pub vec_stride: u32,
    pub v7m_lspact: bool,
    pub v8m_fpccr_s_wrong: bool,
    pub v7m_new_fp_ctxt_needed: bool,
    pub v8m_secure: bool,
    pub v8m_stackcheck: bool,
}

impl ArmTbFlags {
    pub const fn pack(&self) -> u32 {
        (self.thumb as u32)
            | (self.is_user as u32) << 1
            | (self.current_el & 3) << 2
            | (self.fp_excp_el & 3) << 4
            | (self.vfp_enabled as u32) << 6
            | (self.vec_len & 7) << 7
            | (self.vec_stride & 3) << 10
            | (self.v7m_lspact as u32) << 12
            | (self.v8m_fpccr_s_wrong as u32) << 13
            | (self.v7m_new_fp_ctxt_needed as u32) << 14
            | (self.v8m_secure as u32) << 15
            | (self.v8m_stackcheck as u32) << 16
    }

    pub fn unpack(flags: u32) -> Self {
        let bit = |n: u32| flags & (1 << n) != 0;
        Self {
            thumb: bit(0),
            is_user: bit(1),
            current_el: (flags >> 2) & 3,
            fp_excp_el: (flags >> 4) & 3,
            vfp_enabled: bit(6),
            vec_len: (flags >> 7) & 7,
            vec_stride: (flags >> 10) & 3,
            v7m_lspact: bit(12),
            v8m_fpccr_s_wrong: bit(13),
            v7m_new_fp_ctxt_needed: bit(14),
            v8m_secure: bit(15),
            v8m_stackcheck: bit(16),
        }
    }
}
