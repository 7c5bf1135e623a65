//! AArch32 CPU state touched by VFP translation.

/// Number of core registers (r0-r15).
pub const NUM_REGS: usize = 16;
/// Number of 64-bit slots in the FP/vector register bank.
pub const NUM_ZREGS: usize = 64;
/// Number of VFP system registers (`vfp.xregs`).
pub const NUM_XREGS: usize = 16;

/// Soft-float status block owned by the external FP library.
///
/// The translator never looks inside; it only passes the address
/// of one of these to arithmetic helpers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatStatus {
    pub rounding_mode: u32,
    pub exception_flags: u32,
    pub flush_to_zero: u32,
    pub default_nan: u32,
}

/// AArch32 architectural state (VFP view).
///
/// Layout must be `#[repr(C)]` so that TCG global temps and direct
/// loads/stores can reference fields at fixed offsets from the env
/// pointer.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct ArmCpu {
    /// Core registers; `regs[15]` is the PC.
    pub regs: [u32; NUM_REGS],
    /// Flag storage: N is bit 31 of `nf`, Z is set when
    /// `zf == 0`, C is `cf` (0/1), V is bit 31 of `vf`.
    pub nf: u32,
    pub zf: u32,
    pub cf: u32,
    pub vf: u32,
    /// FP/vector register bank: D<n> is `zregs[n]`, S<2n> and S<2n+1>
    /// are the low and high words of `zregs[n]`.
    pub zregs: [u64; NUM_ZREGS],
    /// VFP system registers, indexed by `ARM_VFP_*`.
    pub xregs: [u32; NUM_XREGS],
    /// v7-M CONTROL, banked by security state (`M_REG_NS`/`M_REG_S`).
    pub v7m_control: [u32; 2],
    /// v7-M FPCCR, banked.
    pub v7m_fpccr: [u32; 2],
    /// v7-M FPDSCR, banked.
    pub v7m_fpdscr: [u32; 2],
    /// Float status for A32 FP operations (FPSCR-controlled).
    pub fp_status: FloatStatus,
    /// Float status for half-precision operations.
    pub fp_status_f16: FloatStatus,
}

// Field offsets (bytes) from the start of ArmCpu.

/// Byte offset of `regs[i]`.
pub const fn reg_offset(i: usize) -> i64 {
    (i * 4) as i64
}

pub const NF_OFFSET: i64 = (NUM_REGS * 4) as i64; // 64
pub const ZF_OFFSET: i64 = NF_OFFSET + 4; // 68
pub const CF_OFFSET: i64 = ZF_OFFSET + 4; // 72
pub const VF_OFFSET: i64 = CF_OFFSET + 4; // 76

/// Byte offset of `zregs[0]`.
pub const ZREGS_OFFSET: i64 = VF_OFFSET + 4; // 80

/// Byte offset of `xregs[0]`.
pub const XREGS_OFFSET: i64 = ZREGS_OFFSET + (NUM_ZREGS * 8) as i64; // 592

pub const V7M_CONTROL_OFFSET: i64 = XREGS_OFFSET + (NUM_XREGS * 4) as i64; // 656
pub const V7M_FPCCR_OFFSET: i64 = V7M_CONTROL_OFFSET + 8; // 664
pub const V7M_FPDSCR_OFFSET: i64 = V7M_FPCCR_OFFSET + 8; // 672
pub const FP_STATUS_OFFSET: i64 = V7M_FPDSCR_OFFSET + 8; // 680
pub const FP_STATUS_F16_OFFSET: i64 = FP_STATUS_OFFSET + 16; // 696

/// Byte offset of `xregs[reg]`.
pub const fn xreg_offset(reg: usize) -> i64 {
    XREGS_OFFSET + (reg * 4) as i64
}

/// Byte offset of `v7m_control[bank]`.
pub const fn v7m_control_offset(bank: usize) -> i64 {
    V7M_CONTROL_OFFSET + (bank * 4) as i64
}

/// Byte offset of `v7m_fpccr[bank]`.
pub const fn v7m_fpccr_offset(bank: usize) -> i64 {
    V7M_FPCCR_OFFSET + (bank * 4) as i64
}

/// Byte offset of `v7m_fpdscr[bank]`.
pub const fn v7m_fpdscr_offset(bank: usize) -> i64 {
    V7M_FPDSCR_OFFSET + (bank * 4) as i64
}

// VFP system register numbers (index into `xregs`, and the `reg`
// field of VMSR/VMRS).
pub const ARM_VFP_FPSID: usize = 0;
pub const ARM_VFP_FPSCR: usize = 1;
pub const ARM_VFP_MVFR2: usize = 5;
pub const ARM_VFP_MVFR1: usize = 6;
pub const ARM_VFP_MVFR0: usize = 7;
pub const ARM_VFP_FPEXC: usize = 8;
pub const ARM_VFP_FPINST: usize = 9;
pub const ARM_VFP_FPINST2: usize = 10;
// M-profile only.
pub const ARM_VFP_FPSCR_NZCVQC: usize = 2;
pub const ARM_VFP_FPCXT_NS: usize = 14;
pub const ARM_VFP_FPCXT_S: usize = 15;

/// FPSCR/FPCR condition flag bits.
pub const FPCR_NZCV_MASK: u32 = 0xf000_0000;
/// FPSCR alternative half-precision bit.
pub const FPCR_AHP_SHIFT: u32 = 26;
/// FPEXC enable bit; the only writable FPEXC bit here.
pub const FPEXC_EN: u32 = 1 << 30;

/// Security banks for v7-M banked registers.
pub const M_REG_NS: usize = 0;
pub const M_REG_S: usize = 1;

pub const V7M_CONTROL_FPCA_MASK: u32 = 1 << 2;
pub const V7M_CONTROL_SFPA_SHIFT: u32 = 3;
pub const V7M_CONTROL_SFPA_MASK: u32 = 1 << V7M_CONTROL_SFPA_SHIFT;
pub const V7M_FPCCR_S_MASK: u32 = 1 << 2;
pub const V7M_FPCCR_ASPEN_MASK: u32 = 1 << 31;

// Exception numbers and syndrome encodings.
pub const EXCP_UDEF: u32 = 1;
pub const EXCP_NOCP: u32 = 17;

const ARM_EL_EC_SHIFT: u32 = 26;
const ARM_EL_IL: u32 = 1 << 25;
const EC_UNCATEGORIZED: u32 = 0x00;
const EC_ADVSIMDFPACCESSTRAP: u32 = 0x07;

/// Syndrome for an undefined/uncategorized exception.
pub const fn syn_uncategorized() -> u32 {
    (EC_UNCATEGORIZED << ARM_EL_EC_SHIFT) | ARM_EL_IL
}

/// Syndrome for a trapped FP/SIMD access.
pub const fn syn_fp_access_trap(cv: u32, cond: u32, is_16bit: bool) -> u32 {
    (EC_ADVSIMDFPACCESSTRAP << ARM_EL_EC_SHIFT)
        | if is_16bit { 0 } else { ARM_EL_IL }
        | (cv << 24)
        | (cond << 20)
}

impl ArmCpu {
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_REGS],
            nf: 0,
            // Z clear
            zf: 1,
            cf: 0,
            vf: 0,
            zregs: [0; NUM_ZREGS],
            xregs: [0; NUM_XREGS],
            v7m_control: [0; 2],
            v7m_fpccr: [0; 2],
            v7m_fpdscr: [0; 2],
            fp_status: FloatStatus::default(),
            fp_status_f16: FloatStatus::default(),
        }
    }

    /// Read S<reg>.
    pub fn sreg(&self, reg: usize) -> u32 {
        let d = self.zregs[reg >> 1];
        if reg & 1 == 0 {
            d as u32
        } else {
            (d >> 32) as u32
        }
    }

    /// Write S<reg>, leaving the other half of the D slot intact.
    pub fn set_sreg(&mut self, reg: usize, val: u32) {
        let d = &mut self.zregs[reg >> 1];
        if reg & 1 == 0 {
            *d = (*d & !0xffff_ffff) | val as u64;
        } else {
            *d = (*d & 0xffff_ffff) | ((val as u64) << 32);
        }
    }

    /// Read D<reg>.
    pub fn dreg(&self, reg: usize) -> u64 {
        self.zregs[reg]
    }

    pub fn set_dreg(&mut self, reg: usize, val: u64) {
        self.zregs[reg] = val;
    }

    /// NZCV packed into bits [31:28], CPSR layout.
    pub fn nzcv(&self) -> u32 {
        let n = self.nf >> 31;
        let z = (self.zf == 0) as u32;
        let c = self.cf & 1;
        let v = self.vf >> 31;
        (n << 31) | (z << 30) | (c << 29) | (v << 28)
    }
}

impl Default for ArmCpu {
    fn default() -> Self {
        Self::new()
    }
}
