//! Runtime helpers reachable from translated code.
//!
//! A `call` op names its target by `Helper::addr()`; the runtime (or
//! the test interpreter) resolves that back with `Helper::from_addr`.
//! Soft-float arithmetic, FPSCR access and exception raising all live
//! on the far side of this table.

use super::regs::Precision;
use tcg_core::{Context, TempIdx};

macro_rules! define_helpers {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Symbolic call target.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum Helper {
            $($variant),*
        }

        impl Helper {
            /// Every helper, indexed by its id.
            pub const ALL: &'static [Helper] = &[$(Helper::$variant),*];

            /// Helper name, used in IR dumps.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Helper::$variant => $name),*
                }
            }
        }
    };
}

define_helpers! {
    // System and exception helpers.
    ExceptionWithSyndrome => "exception_with_syndrome",
    V7mPreserveFpState => "v7m_preserve_fp_state",
    VfpGetFpscr => "vfp_get_fpscr",
    VfpSetFpscr => "vfp_set_fpscr",
    LookupTbPtr => "lookup_tb_ptr",
    V8mStackcheck => "v8m_stackcheck",
    CheckHcrEl2Trap => "check_hcr_el2_trap",
    V7mVlldm => "v7m_vlldm",
    V7mVlstm => "v7m_vlstm",
    SetRmode => "set_rmode",

    // Arithmetic: (a, b, fpst) -> r
    VfpAddh => "vfp_addh",
    VfpAdds => "vfp_adds",
    VfpAddd => "vfp_addd",
    VfpSubh => "vfp_subh",
    VfpSubs => "vfp_subs",
    VfpSubd => "vfp_subd",
    VfpMulh => "vfp_mulh",
    VfpMuls => "vfp_muls",
    VfpMuld => "vfp_muld",
    VfpDivh => "vfp_divh",
    VfpDivs => "vfp_divs",
    VfpDivd => "vfp_divd",
    VfpMinnumh => "vfp_minnumh",
    VfpMinnums => "vfp_minnums",
    VfpMinnumd => "vfp_minnumd",
    VfpMaxnumh => "vfp_maxnumh",
    VfpMaxnums => "vfp_maxnums",
    VfpMaxnumd => "vfp_maxnumd",
    // (a, b, c, fpst) -> a * b + c, single rounding
    VfpMuladdh => "vfp_muladdh",
    VfpMuladds => "vfp_muladds",
    VfpMuladdd => "vfp_muladdd",
    // (a) -> r, sign-bit only
    VfpNegh => "vfp_negh",
    VfpNegs => "vfp_negs",
    VfpNegd => "vfp_negd",
    VfpAbsh => "vfp_absh",
    VfpAbss => "vfp_abss",
    VfpAbsd => "vfp_absd",
    // (a, env) -> r
    VfpSqrth => "vfp_sqrth",
    VfpSqrts => "vfp_sqrts",
    VfpSqrtd => "vfp_sqrtd",
    // (a, b, env), sets FPSCR.NZCV
    VfpCmph => "vfp_cmph_a32",
    VfpCmps => "vfp_cmps",
    VfpCmpd => "vfp_cmpd",
    VfpCmpeh => "vfp_cmpeh_a32",
    VfpCmpes => "vfp_cmpes",
    VfpCmped => "vfp_cmped",
    // (a, fpst) -> r
    Rinth => "rinth",
    Rints => "rints",
    Rintd => "rintd",
    RinthExact => "rinth_exact",
    RintsExact => "rints_exact",
    RintdExact => "rintd_exact",

    // Integer conversions: (a, fpst) -> r
    VfpSitoh => "vfp_sitoh",
    VfpSitos => "vfp_sitos",
    VfpSitod => "vfp_sitod",
    VfpUitoh => "vfp_uitoh",
    VfpUitos => "vfp_uitos",
    VfpUitod => "vfp_uitod",
    VfpTosih => "vfp_tosih",
    VfpTosis => "vfp_tosis",
    VfpTosid => "vfp_tosid",
    VfpTouih => "vfp_touih",
    VfpTouis => "vfp_touis",
    VfpTouid => "vfp_touid",
    VfpTosizh => "vfp_tosizh",
    VfpTosizs => "vfp_tosizs",
    VfpTosizd => "vfp_tosizd",
    VfpTouizh => "vfp_touizh",
    VfpTouizs => "vfp_touizs",
    VfpTouizd => "vfp_touizd",
    // Precision conversions.
    VfpFcvtds => "vfp_fcvtds",
    VfpFcvtsd => "vfp_fcvtsd",
    // (a, fpst, ahp) -> r
    VfpFcvtF16ToF32 => "vfp_fcvt_f16_to_f32",
    VfpFcvtF32ToF16 => "vfp_fcvt_f32_to_f16",
    VfpFcvtF16ToF64 => "vfp_fcvt_f16_to_f64",
    VfpFcvtF64ToF16 => "vfp_fcvt_f64_to_f16",
    Vjcvt => "vjcvt",

    // Fixed-point conversions: (a, shift, fpst) -> r
    VfpShtoh => "vfp_shtoh",
    VfpShtos => "vfp_shtos",
    VfpShtod => "vfp_shtod",
    VfpSltoh => "vfp_sltoh",
    VfpSltos => "vfp_sltos",
    VfpSltod => "vfp_sltod",
    VfpUhtoh => "vfp_uhtoh",
    VfpUhtos => "vfp_uhtos",
    VfpUhtod => "vfp_uhtod",
    VfpUltoh => "vfp_ultoh",
    VfpUltos => "vfp_ultos",
    VfpUltod => "vfp_ultod",
    VfpToshh => "vfp_toshh",
    VfpToshs => "vfp_toshs",
    VfpToshd => "vfp_toshd",
    VfpToslh => "vfp_toslh",
    VfpTosls => "vfp_tosls",
    VfpTosld => "vfp_tosld",
    VfpTouhh => "vfp_touhh",
    VfpTouhs => "vfp_touhs",
    VfpTouhd => "vfp_touhd",
    VfpToulh => "vfp_toulh",
    VfpTouls => "vfp_touls",
    VfpTould => "vfp_tould",
}

impl Helper {
    /// Value carried in the `call` op's target constant.
    pub const fn addr(self) -> u64 {
        self as u32 as u64
    }

    pub fn from_addr(addr: u64) -> Option<Helper> {
        usize::try_from(addr)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Name lookup suitable for `tcg_core::dump::dump_ops_with`.
    pub fn name_of(addr: u64) -> Option<&'static str> {
        Self::from_addr(addr).map(Helper::name)
    }

    /// Emit `dst = helper(args)`.
    pub fn call(self, ir: &mut Context, dst: TempIdx, args: &[TempIdx]) -> TempIdx {
        ir.gen_call(dst, self.addr(), args)
    }

    /// Emit a call whose result is unused.
    pub fn call_void(self, ir: &mut Context, args: &[TempIdx]) {
        ir.gen_call_void(self.addr(), args);
    }

    // -- Per-precision selection --

    pub fn add(p: Precision) -> Helper {
        p.pick(Helper::VfpAddh, Helper::VfpAdds, Helper::VfpAddd)
    }

    pub fn sub(p: Precision) -> Helper {
        p.pick(Helper::VfpSubh, Helper::VfpSubs, Helper::VfpSubd)
    }

    pub fn mul(p: Precision) -> Helper {
        p.pick(Helper::VfpMulh, Helper::VfpMuls, Helper::VfpMuld)
    }

    pub fn div(p: Precision) -> Helper {
        p.pick(Helper::VfpDivh, Helper::VfpDivs, Helper::VfpDivd)
    }

    pub fn minnum(p: Precision) -> Helper {
        p.pick(Helper::VfpMinnumh, Helper::VfpMinnums, Helper::VfpMinnumd)
    }

    pub fn maxnum(p: Precision) -> Helper {
        p.pick(Helper::VfpMaxnumh, Helper::VfpMaxnums, Helper::VfpMaxnumd)
    }

    pub fn muladd(p: Precision) -> Helper {
        p.pick(Helper::VfpMuladdh, Helper::VfpMuladds, Helper::VfpMuladdd)
    }

    pub fn neg(p: Precision) -> Helper {
        p.pick(Helper::VfpNegh, Helper::VfpNegs, Helper::VfpNegd)
    }

    pub fn abs(p: Precision) -> Helper {
        p.pick(Helper::VfpAbsh, Helper::VfpAbss, Helper::VfpAbsd)
    }

    pub fn sqrt(p: Precision) -> Helper {
        p.pick(Helper::VfpSqrth, Helper::VfpSqrts, Helper::VfpSqrtd)
    }

    /// Compare; `signaling` selects the VCMPE form.
    pub fn cmp(p: Precision, signaling: bool) -> Helper {
        if signaling {
            p.pick(Helper::VfpCmpeh, Helper::VfpCmpes, Helper::VfpCmped)
        } else {
            p.pick(Helper::VfpCmph, Helper::VfpCmps, Helper::VfpCmpd)
        }
    }

    pub fn rint(p: Precision) -> Helper {
        p.pick(Helper::Rinth, Helper::Rints, Helper::Rintd)
    }

    pub fn rint_exact(p: Precision) -> Helper {
        p.pick(Helper::RinthExact, Helper::RintsExact, Helper::RintdExact)
    }

    /// Integer to float.
    pub fn int_to_fp(p: Precision, signed: bool) -> Helper {
        if signed {
            p.pick(Helper::VfpSitoh, Helper::VfpSitos, Helper::VfpSitod)
        } else {
            p.pick(Helper::VfpUitoh, Helper::VfpUitos, Helper::VfpUitod)
        }
    }

    /// Float to integer; `round_zero` ignores FPSCR.RMode.
    pub fn fp_to_int(p: Precision, signed: bool, round_zero: bool) -> Helper {
        match (signed, round_zero) {
            (true, true) => p.pick(Helper::VfpTosizh, Helper::VfpTosizs, Helper::VfpTosizd),
            (true, false) => p.pick(Helper::VfpTosih, Helper::VfpTosis, Helper::VfpTosid),
            (false, true) => p.pick(Helper::VfpTouizh, Helper::VfpTouizs, Helper::VfpTouizd),
            (false, false) => p.pick(Helper::VfpTouih, Helper::VfpTouis, Helper::VfpTouid),
        }
    }

    /// Float to 32-bit fixed point with an explicit shift.
    pub fn fp_to_fixed32(p: Precision, signed: bool) -> Helper {
        if signed {
            p.pick(Helper::VfpToslh, Helper::VfpTosls, Helper::VfpTosld)
        } else {
            p.pick(Helper::VfpToulh, Helper::VfpTouls, Helper::VfpTould)
        }
    }

    /// Fixed-point conversion selected by the `op:U:sx` field.
    ///
    /// 0-3 convert fixed to float (sh, sl, uh, ul); 4-7 convert
    /// float to fixed in the same order.
    pub fn fixed_conv(p: Precision, opc: u32) -> Option<Helper> {
        Some(match opc {
            0 => p.pick(Helper::VfpShtoh, Helper::VfpShtos, Helper::VfpShtod),
            1 => p.pick(Helper::VfpSltoh, Helper::VfpSltos, Helper::VfpSltod),
            2 => p.pick(Helper::VfpUhtoh, Helper::VfpUhtos, Helper::VfpUhtod),
            3 => p.pick(Helper::VfpUltoh, Helper::VfpUltos, Helper::VfpUltod),
            4 => p.pick(Helper::VfpToshh, Helper::VfpToshs, Helper::VfpToshd),
            5 => p.pick(Helper::VfpToslh, Helper::VfpTosls, Helper::VfpTosld),
            6 => p.pick(Helper::VfpTouhh, Helper::VfpTouhs, Helper::VfpTouhd),
            7 => p.pick(Helper::VfpToulh, Helper::VfpTouls, Helper::VfpTould),
            _ => return None,
        })
    }
}
