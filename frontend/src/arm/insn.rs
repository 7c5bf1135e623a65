//! Decoded VFP instruction records.
//!
//! The bitstream decoder lives elsewhere; it hands the translator one
//! `VfpInsn` per guest instruction, with every field already
//! extracted and register numbers already assembled (`Vd:D` etc.).

use super::regs::Precision;

// ── Argument records ───────────────────────────────────────────

/// VMOV scalar to general-purpose register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVmovToGp {
    pub vn: u32,
    pub index: u32,
    /// log2 of the element size in bytes.
    pub size: u32,
    /// Zero-extend (true) or sign-extend sub-word elements.
    pub u: bool,
    pub rt: u32,
}

/// VMOV general-purpose register to scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVmovFromGp {
    pub vn: u32,
    pub index: u32,
    pub size: u32,
    pub rt: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVdup {
    pub vn: u32,
    pub rt: u32,
    pub b: bool,
    pub e: bool,
    pub q: bool,
}

/// VMSR (`l == false`) / VMRS (`l == true`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVmsrVmrs {
    pub reg: u32,
    pub rt: u32,
    pub l: bool,
}

/// VMOV between a core register and S<vn> (or its low half).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVmovSingle {
    pub vn: u32,
    pub rt: u32,
    pub l: bool,
}

/// VMOV between two core registers and S<vm>,S<vm+1> or D<vm>.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVmov64 {
    pub vm: u32,
    pub rt: u32,
    pub rt2: u32,
    /// To core registers.
    pub op: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVldrVstr {
    pub vd: u32,
    pub rn: u32,
    /// imm8, scaled by the access size.
    pub imm: u32,
    pub u: bool,
    pub l: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVldmVstm {
    pub vd: u32,
    pub rn: u32,
    /// Word count; a D transfer moves `imm >> 1` registers.
    pub imm: u32,
    pub p: bool,
    pub u: bool,
    pub w: bool,
    pub l: bool,
}

/// VLDR/VSTR of an FP system register (v8.1-M).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVldrSysreg {
    pub rn: u32,
    pub reg: u32,
    /// Byte offset.
    pub imm: u32,
    /// Add (true) or subtract the offset.
    pub a: bool,
    pub w: bool,
    pub p: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVfp3 {
    pub vd: u32,
    pub vn: u32,
    pub vm: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVfp2 {
    pub vd: u32,
    pub vm: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVmovImm {
    pub vd: u32,
    pub imm: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVcmp {
    pub vd: u32,
    pub vm: u32,
    /// VCMPE: signal on quiet NaN.
    pub e: bool,
    /// Compare against zero.
    pub z: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVsel {
    pub vd: u32,
    pub vn: u32,
    pub vm: u32,
    /// 0 EQ, 1 VS, 2 GE, 3 GT.
    pub cc: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVrint {
    pub vd: u32,
    pub vm: u32,
    pub rm: u32,
}

/// VCVT{A,N,P,M} float to integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVcvt {
    pub vd: u32,
    pub vm: u32,
    pub rm: u32,
    /// Signed result.
    pub op: bool,
}

/// Half-precision conversions; `t` selects the top half of the S
/// register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVcvtF16 {
    pub vd: u32,
    pub vm: u32,
    pub t: bool,
}

/// Integer to float.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVcvtInt {
    pub vd: u32,
    pub vm: u32,
    /// Source is signed.
    pub s: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVcvtFix {
    pub vd: u32,
    pub imm: u32,
    /// `op:U:sx`
    pub opc: u32,
}

/// Float to integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVcvtToInt {
    pub vd: u32,
    pub vm: u32,
    pub s: bool,
    /// Round towards zero instead of using FPSCR.RMode.
    pub rz: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVlldmVlstm {
    pub rn: u32,
    /// VLLDM (true) or VLSTM.
    pub l: bool,
    /// T2 encoding (v8.1-M).
    pub op: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsVscclrm {
    pub vd: u32,
    pub imm: u32,
    /// 3 for a D register list, otherwise S.
    pub size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgsNocp {
    pub cp: u32,
}

// ── Fused multiply-add family ──────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FmaKind {
    Vfma,
    Vfms,
    Vfnma,
    Vfnms,
}

impl FmaKind {
    /// Negations applied before the fused call: `(neg_n, neg_d)`.
    pub const fn negations(self) -> (bool, bool) {
        const TABLE: [(bool, bool); 4] = [
            (false, false), // VFMA:  vd = vd + vn * vm
            (true, false),  // VFMS:  vd = vd - vn * vm
            (false, true),  // VFNMA: vd = -vd + vn * vm
            (true, true),   // VFNMS: vd = -vd - vn * vm
        ];
        TABLE[self as usize]
    }
}

// ── Instruction ────────────────────────────────────────────────

/// One decoded VFP instruction together with its handler selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VfpInsn {
    VmovToGp(ArgsVmovToGp),
    VmovFromGp(ArgsVmovFromGp),
    Vdup(ArgsVdup),
    VmsrVmrs(ArgsVmsrVmrs),
    VldrSysreg(ArgsVldrSysreg),
    VstrSysreg(ArgsVldrSysreg),
    VmovHalf(ArgsVmovSingle),
    VmovSingle(ArgsVmovSingle),
    Vmov64Sp(ArgsVmov64),
    Vmov64Dp(ArgsVmov64),
    VldrVstr(Precision, ArgsVldrVstr),
    VldmVstm(Precision, ArgsVldmVstm),

    Vmla(Precision, ArgsVfp3),
    Vmls(Precision, ArgsVfp3),
    Vnmls(Precision, ArgsVfp3),
    Vnmla(Precision, ArgsVfp3),
    Vmul(Precision, ArgsVfp3),
    Vnmul(Precision, ArgsVfp3),
    Vadd(Precision, ArgsVfp3),
    Vsub(Precision, ArgsVfp3),
    Vdiv(Precision, ArgsVfp3),
    Vminnm(Precision, ArgsVfp3),
    Vmaxnm(Precision, ArgsVfp3),
    Vfm(FmaKind, Precision, ArgsVfp3),
    VmovImm(Precision, ArgsVmovImm),
    VmovReg(Precision, ArgsVfp2),
    Vabs(Precision, ArgsVfp2),
    Vneg(Precision, ArgsVfp2),
    Vsqrt(Precision, ArgsVfp2),
    Vcmp(Precision, ArgsVcmp),
    Vsel(Precision, ArgsVsel),
    Vins(ArgsVfp2),
    Vmovx(ArgsVfp2),

    Vrint(Precision, ArgsVrint),
    Vcvt(Precision, ArgsVcvt),
    Vrintr(Precision, ArgsVfp2),
    Vrintz(Precision, ArgsVfp2),
    Vrintx(Precision, ArgsVfp2),
    VcvtF32F16(ArgsVcvtF16),
    VcvtF64F16(ArgsVcvtF16),
    VcvtF16F32(ArgsVcvtF16),
    VcvtF16F64(ArgsVcvtF16),
    /// Single to double.
    VcvtSp(ArgsVfp2),
    /// Double to single.
    VcvtDp(ArgsVfp2),
    VcvtInt(Precision, ArgsVcvtInt),
    Vjcvt(ArgsVfp2),
    VcvtFix(Precision, ArgsVcvtFix),
    VcvtToInt(Precision, ArgsVcvtToInt),

    VlldmVlstm(ArgsVlldmVlstm),
    Vscclrm(ArgsVscclrm),
    Nocp(ArgsNocp),
    Nocp81(ArgsNocp),
}

impl VfpInsn {
    /// Mnemonic, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            VfpInsn::VmovToGp(_) => "VMOV_to_gp",
            VfpInsn::VmovFromGp(_) => "VMOV_from_gp",
            VfpInsn::Vdup(_) => "VDUP",
            VfpInsn::VmsrVmrs(_) => "VMSR_VMRS",
            VfpInsn::VldrSysreg(_) => "VLDR_sysreg",
            VfpInsn::VstrSysreg(_) => "VSTR_sysreg",
            VfpInsn::VmovHalf(_) => "VMOV_half",
            VfpInsn::VmovSingle(_) => "VMOV_single",
            VfpInsn::Vmov64Sp(_) => "VMOV_64_sp",
            VfpInsn::Vmov64Dp(_) => "VMOV_64_dp",
            VfpInsn::VldrVstr(..) => "VLDR_VSTR",
            VfpInsn::VldmVstm(..) => "VLDM_VSTM",
            VfpInsn::Vmla(..) => "VMLA",
            VfpInsn::Vmls(..) => "VMLS",
            VfpInsn::Vnmls(..) => "VNMLS",
            VfpInsn::Vnmla(..) => "VNMLA",
            VfpInsn::Vmul(..) => "VMUL",
            VfpInsn::Vnmul(..) => "VNMUL",
            VfpInsn::Vadd(..) => "VADD",
            VfpInsn::Vsub(..) => "VSUB",
            VfpInsn::Vdiv(..) => "VDIV",
            VfpInsn::Vminnm(..) => "VMINNM",
            VfpInsn::Vmaxnm(..) => "VMAXNM",
            VfpInsn::Vfm(FmaKind::Vfma, ..) => "VFMA",
            VfpInsn::Vfm(FmaKind::Vfms, ..) => "VFMS",
            VfpInsn::Vfm(FmaKind::Vfnma, ..) => "VFNMA",
            VfpInsn::Vfm(FmaKind::Vfnms, ..) => "VFNMS",
            VfpInsn::VmovImm(..) => "VMOV_imm",
            VfpInsn::VmovReg(..) => "VMOV_reg",
            VfpInsn::Vabs(..) => "VABS",
            VfpInsn::Vneg(..) => "VNEG",
            VfpInsn::Vsqrt(..) => "VSQRT",
            VfpInsn::Vcmp(..) => "VCMP",
            VfpInsn::Vsel(..) => "VSEL",
            VfpInsn::Vins(_) => "VINS",
            VfpInsn::Vmovx(_) => "VMOVX",
            VfpInsn::Vrint(..) => "VRINT",
            VfpInsn::Vcvt(..) => "VCVT",
            VfpInsn::Vrintr(..) => "VRINTR",
            VfpInsn::Vrintz(..) => "VRINTZ",
            VfpInsn::Vrintx(..) => "VRINTX",
            VfpInsn::VcvtF32F16(_) => "VCVT_f32_f16",
            VfpInsn::VcvtF64F16(_) => "VCVT_f64_f16",
            VfpInsn::VcvtF16F32(_) => "VCVT_f16_f32",
            VfpInsn::VcvtF16F64(_) => "VCVT_f16_f64",
            VfpInsn::VcvtSp(_) => "VCVT_sp",
            VfpInsn::VcvtDp(_) => "VCVT_dp",
            VfpInsn::VcvtInt(..) => "VCVT_int",
            VfpInsn::Vjcvt(_) => "VJCVT",
            VfpInsn::VcvtFix(..) => "VCVT_fix",
            VfpInsn::VcvtToInt(..) => "VCVT_toint",
            VfpInsn::VlldmVlstm(_) => "VLLDM_VLSTM",
            VfpInsn::Vscclrm(_) => "VSCCLRM",
            VfpInsn::Nocp(_) => "NOCP",
            VfpInsn::Nocp81(_) => "NOCP_8_1",
        }
    }

    /// Core register number fields, as `(field, value)`.
    pub fn core_regs(&self) -> Vec<(&'static str, u32)> {
        use VfpInsn::*;
        match *self {
            VmovToGp(ArgsVmovToGp { rt, .. })
            | VmovFromGp(ArgsVmovFromGp { rt, .. })
            | Vdup(ArgsVdup { rt, .. })
            | VmsrVmrs(ArgsVmsrVmrs { rt, .. })
            | VmovHalf(ArgsVmovSingle { rt, .. })
            | VmovSingle(ArgsVmovSingle { rt, .. }) => vec![("rt", rt)],
            Vmov64Sp(a) | Vmov64Dp(a) => vec![("rt", a.rt), ("rt2", a.rt2)],
            VldrSysreg(ArgsVldrSysreg { rn, .. })
            | VstrSysreg(ArgsVldrSysreg { rn, .. })
            | VldrVstr(_, ArgsVldrVstr { rn, .. })
            | VldmVstm(_, ArgsVldmVstm { rn, .. })
            | VlldmVlstm(ArgsVlldmVlstm { rn, .. }) => vec![("rn", rn)],
            _ => Vec::new(),
        }
    }
}
