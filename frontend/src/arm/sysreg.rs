//! FP system register access: VMSR/VMRS and the v8.1-M
//! VLDR/VSTR (system register) forms.
//!
//! M-profile reads and writes share one engine each; only where the
//! value comes from or goes to differs, and that is described by
//! `SysregSource` / `SysregDest`.

use super::cpu::{
    v7m_control_offset, v7m_fpccr_offset, v7m_fpdscr_offset, xreg_offset, ARM_VFP_FPCXT_NS,
    ARM_VFP_FPCXT_S, ARM_VFP_FPEXC, ARM_VFP_FPINST, ARM_VFP_FPINST2, ARM_VFP_FPSCR,
    ARM_VFP_FPSCR_NZCVQC, ARM_VFP_FPSID, ARM_VFP_MVFR0, ARM_VFP_MVFR1, ARM_VFP_MVFR2,
    FPCR_NZCV_MASK, FPEXC_EN, M_REG_NS, M_REG_S, V7M_CONTROL_FPCA_MASK,
    V7M_CONTROL_SFPA_MASK, V7M_CONTROL_SFPA_SHIFT, V7M_FPCCR_ASPEN_MASK,
};
use super::features::IsarFeatures;
use super::helper::Helper;
use super::insn::{ArgsVldrSysreg, ArgsVmsrVmrs};
use super::ArmDisasContext;
use crate::TranslateError;
use tcg_core::{Cond, Context, MemOp, TempIdx, Type};

/// Internal selector for "FPSCR, NZCV bits only": VMRS to APSR_nzcv
/// reads just the flags and skips the helper call.
const FPSCR_NZCV_ONLY: usize = 0xffff;

/// Where a system register write takes its value from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum SysregSource {
    GeneralRegister { rt: u32 },
    Memory(ArgsVldrSysreg),
}

/// Where a system register read delivers its value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum SysregDest {
    GeneralRegister { rt: u32 },
    Memory(ArgsVldrSysreg),
}

enum SysregCheck {
    /// Not a legal encoding.
    Failed,
    /// Handled by the access check (an exception was raised).
    Done,
    Continue,
}

impl ArmDisasContext {
    fn fp_sysreg_checks(&mut self, ir: &mut Context, regno: usize) -> SysregCheck {
        if !self.has(IsarFeatures::FPSP_V2) {
            return SysregCheck::Failed;
        }

        match regno {
            ARM_VFP_FPSCR | FPSCR_NZCV_ONLY => {}
            ARM_VFP_FPSCR_NZCVQC => {
                if !self.has(IsarFeatures::V8_1M) {
                    return SysregCheck::Failed;
                }
            }
            ARM_VFP_FPCXT_S | ARM_VFP_FPCXT_NS => {
                if !self.has(IsarFeatures::V8_1M) || !self.v8m_secure {
                    return SysregCheck::Failed;
                }
            }
            _ => return SysregCheck::Failed,
        }

        // FPCXT_NS does its own lazy preservation and must not run
        // the rest of the access check.
        if regno != ARM_VFP_FPCXT_NS && !self.vfp_access_check(ir) {
            return SysregCheck::Done;
        }
        SysregCheck::Continue
    }

    /// Branch to `label` on the NS FP context state:
    /// `Cond::Ne` branches when inactive, `Cond::Eq` when active.
    ///
    /// fpInactive = FPCCR_NS.ASPEN == 1 && CONTROL.FPCA == 0
    fn gen_branch_fp_inactive(&self, ir: &mut Context, cond: Cond, label: u32) {
        let aspen = self.load_cpu_field(ir, v7m_fpccr_offset(M_REG_NS));
        let fpca = self.load_cpu_field(ir, v7m_control_offset(M_REG_S));
        ir.gen_andi(Type::I32, aspen, aspen, V7M_FPCCR_ASPEN_MASK as u64);
        ir.gen_xori(Type::I32, aspen, aspen, V7M_FPCCR_ASPEN_MASK as u64);
        ir.gen_andi(Type::I32, fpca, fpca, V7M_CONTROL_FPCA_MASK as u64);
        ir.gen_or(Type::I32, fpca, fpca, aspen);
        ir.gen_brcondi(Type::I32, fpca, 0, cond.invert(), label);
    }

    // -- Value sources and sinks ---------------------------

    /// Effective address of a sysreg memory access and the signed
    /// offset to apply on writeback.
    fn sysreg_mem_addr(&self, ir: &mut Context, a: &ArgsVldrSysreg) -> (TempIdx, i64) {
        let offset = if a.a { a.imm as i64 } else { -(a.imm as i64) };
        let addr = self.load_reg(ir, a.rn);
        if a.p {
            ir.gen_addi(Type::I32, addr, addr, offset);
        }
        if self.v8m_stackcheck && a.rn == 13 && a.w {
            self.gen_stackcheck(ir, addr);
        }
        (addr, offset)
    }

    fn sysreg_mem_writeback(
        &mut self,
        ir: &mut Context,
        a: &ArgsVldrSysreg,
        addr: TempIdx,
        offset: i64,
    ) {
        if a.w {
            if !a.p {
                ir.gen_addi(Type::I32, addr, addr, offset);
            }
            self.store_reg(ir, a.rn, addr);
        }
    }

    fn sysreg_load(&mut self, ir: &mut Context, src: &SysregSource) -> TempIdx {
        match *src {
            SysregSource::GeneralRegister { rt } => self.load_reg(ir, rt),
            SysregSource::Memory(a) => {
                let (addr, offset) = self.sysreg_mem_addr(ir, &a);
                let value = ir.new_temp(Type::I32);
                ir.gen_qemu_ld(Type::I32, value, addr, u32::from(MemOp::ul().aligned()));
                self.sysreg_mem_writeback(ir, &a, addr, offset);
                value
            }
        }
    }

    fn sysreg_store(&mut self, ir: &mut Context, dst: &SysregDest, value: TempIdx) {
        match *dst {
            SysregDest::GeneralRegister { rt: 15 } => self.gen_set_nzcv(ir, value),
            SysregDest::GeneralRegister { rt } => self.store_reg(ir, rt, value),
            SysregDest::Memory(a) => {
                let (addr, offset) = self.sysreg_mem_addr(ir, &a);
                ir.gen_qemu_st(Type::I32, value, addr, u32::from(MemOp::ul().aligned()));
                self.sysreg_mem_writeback(ir, &a, addr, offset);
            }
        }
    }

    // -- M-profile engines ---------------------------------

    /// FPCXT write: CONTROL_S.SFPA from bit 31, FPSCR from the rest
    /// with NZCV cleared.
    fn gen_write_fpcxt(&mut self, ir: &mut Context, src: &SysregSource) {
        let tmp = self.sysreg_load(ir, src);
        let sfpa = ir.new_temp(Type::I32);
        ir.gen_shri(Type::I32, sfpa, tmp, 31);
        let ofs = v7m_control_offset(M_REG_S);
        let control = self.load_cpu_field(ir, ofs);
        ir.gen_deposit(Type::I32, control, control, sfpa, V7M_CONTROL_SFPA_SHIFT, 1);
        self.store_cpu_field(ir, control, ofs);
        ir.gen_andi(Type::I32, tmp, tmp, !FPCR_NZCV_MASK as u64);
        Helper::VfpSetFpscr.call_void(ir, &[self.env, tmp]);
    }

    /// FPSCR bits [27:0] with CONTROL_S.SFPA in bit 31. Returns the
    /// value, the raw FPSCR, the isolated SFPA bit and CONTROL_S.
    fn gen_read_fpcxt(&self, ir: &mut Context) -> (TempIdx, TempIdx, TempIdx, TempIdx) {
        let fpscr = ir.new_temp(Type::I32);
        Helper::VfpGetFpscr.call(ir, fpscr, &[self.env]);
        let tmp = ir.new_temp(Type::I32);
        ir.gen_andi(Type::I32, tmp, fpscr, !FPCR_NZCV_MASK as u64);
        let control = self.load_cpu_field(ir, v7m_control_offset(M_REG_S));
        let sfpa = ir.new_temp(Type::I32);
        ir.gen_andi(Type::I32, sfpa, control, V7M_CONTROL_SFPA_MASK as u64);
        ir.gen_shli(Type::I32, sfpa, sfpa, 31 - V7M_CONTROL_SFPA_SHIFT);
        ir.gen_or(Type::I32, tmp, tmp, sfpa);
        (tmp, fpscr, sfpa, control)
    }

    fn gen_m_fp_sysreg_write(
        &mut self,
        ir: &mut Context,
        regno: usize,
        src: &SysregSource,
    ) -> bool {
        match self.fp_sysreg_checks(ir, regno) {
            SysregCheck::Failed => return false,
            SysregCheck::Done => return true,
            SysregCheck::Continue => {}
        }

        match regno {
            ARM_VFP_FPSCR => {
                let tmp = self.sysreg_load(ir, src);
                Helper::VfpSetFpscr.call_void(ir, &[self.env, tmp]);
                self.gen_lookup_tb();
            }
            ARM_VFP_FPSCR_NZCVQC => {
                // QC is RES0 without MVE.
                let tmp = self.sysreg_load(ir, src);
                ir.gen_andi(Type::I32, tmp, tmp, FPCR_NZCV_MASK as u64);
                let ofs = xreg_offset(ARM_VFP_FPSCR);
                let fpscr = self.load_cpu_field(ir, ofs);
                ir.gen_andi(Type::I32, fpscr, fpscr, !FPCR_NZCV_MASK as u64);
                ir.gen_or(Type::I32, fpscr, fpscr, tmp);
                self.store_cpu_field(ir, fpscr, ofs);
            }
            ARM_VFP_FPCXT_NS => {
                // Inactive: the write is a no-op.
                let lab_end = ir.new_label();
                self.gen_branch_fp_inactive(ir, Cond::Ne, lab_end);
                self.gen_preserve_fp_state(ir);
                self.gen_write_fpcxt(ir, src);
                ir.gen_set_label(lab_end);
            }
            ARM_VFP_FPCXT_S => self.gen_write_fpcxt(ir, src),
            // fp_sysreg_checks rejected everything else.
            _ => return false,
        }
        true
    }

    fn gen_m_fp_sysreg_read(&mut self, ir: &mut Context, regno: usize, dst: &SysregDest) -> bool {
        match self.fp_sysreg_checks(ir, regno) {
            SysregCheck::Failed => return false,
            SysregCheck::Done => return true,
            SysregCheck::Continue => {}
        }

        match regno {
            ARM_VFP_FPSCR => {
                let tmp = ir.new_temp(Type::I32);
                Helper::VfpGetFpscr.call(ir, tmp, &[self.env]);
                self.sysreg_store(ir, dst, tmp);
            }
            // QC is RES0 without MVE, so NZCVQC reads as NZCV.
            ARM_VFP_FPSCR_NZCVQC | FPSCR_NZCV_ONLY => {
                let tmp = self.load_cpu_field(ir, xreg_offset(ARM_VFP_FPSCR));
                ir.gen_andi(Type::I32, tmp, tmp, FPCR_NZCV_MASK as u64);
                self.sysreg_store(ir, dst, tmp);
            }
            ARM_VFP_FPCXT_S => {
                let (tmp, _, _, control) = self.gen_read_fpcxt(ir);
                // Store before touching FPSCR, in case the store faults.
                self.sysreg_store(ir, dst, tmp);
                ir.gen_andi(Type::I32, control, control, !V7M_CONTROL_SFPA_MASK as u64);
                self.store_cpu_field(ir, control, v7m_control_offset(M_REG_S));
                let fpscr = self.load_cpu_field(ir, v7m_fpdscr_offset(M_REG_NS));
                Helper::VfpSetFpscr.call_void(ir, &[self.env, fpscr]);
                self.gen_lookup_tb();
            }
            ARM_VFP_FPCXT_NS => {
                let lab_active = ir.new_label();
                let lab_end = ir.new_label();

                self.gen_branch_fp_inactive(ir, Cond::Eq, lab_active);
                // Inactive: reads as FPDSCR_NS.
                let tmp = self.load_cpu_field(ir, v7m_fpdscr_offset(M_REG_NS));
                self.sysreg_store(ir, dst, tmp);
                ir.gen_br(lab_end);

                ir.gen_set_label(lab_active);
                self.gen_preserve_fp_state(ir);
                let (tmp, fpscr, sfpa, _) = self.gen_read_fpcxt(ir);
                self.sysreg_store(ir, dst, tmp);
                // SFPA clear: FPSCR resets from FPDSCR_NS.
                let fpdscr = self.load_cpu_field(ir, v7m_fpdscr_offset(M_REG_NS));
                let zero = ir.new_const(Type::I32, 0);
                ir.gen_movcond(Type::I32, fpscr, sfpa, zero, fpdscr, fpscr, Cond::Eq);
                Helper::VfpSetFpscr.call_void(ir, &[self.env, fpscr]);

                ir.gen_set_label(lab_end);
                self.gen_lookup_tb();
            }
            _ => return false,
        }
        true
    }

    fn gen_m_vmsr_vmrs(&mut self, ir: &mut Context, a: &ArgsVmsrVmrs) -> bool {
        // r15 is only meaningful for VMRS APSR_nzcv, FPSCR; other
        // uses are UNPREDICTABLE and we UNDEF.
        let mut reg = a.reg as usize;
        if a.rt == 15 {
            if a.l && reg == ARM_VFP_FPSCR {
                reg = FPSCR_NZCV_ONLY;
            } else {
                return false;
            }
        }

        if a.l {
            self.gen_m_fp_sysreg_read(ir, reg, &SysregDest::GeneralRegister { rt: a.rt })
        } else {
            self.gen_m_fp_sysreg_write(ir, reg, &SysregSource::GeneralRegister { rt: a.rt })
        }
    }

    // -- Handlers ------------------------------------------

    pub(crate) fn trans_vmsr_vmrs(
        &mut self,
        ir: &mut Context,
        a: &ArgsVmsrVmrs,
    ) -> Result<bool, TranslateError> {
        if self.has(IsarFeatures::M) {
            return Ok(self.gen_m_vmsr_vmrs(ir, a));
        }

        if !self.has(IsarFeatures::FPSP_V2) {
            return Ok(false);
        }

        let reg = a.reg as usize;
        let ignore_vfp_enabled = match reg {
            // VFPv3 restricts the ID registers to privileged access.
            ARM_VFP_FPSID => {
                if self.is_user && self.has(IsarFeatures::FPSP_V3) {
                    return Ok(false);
                }
                true
            }
            ARM_VFP_MVFR0 | ARM_VFP_MVFR1 => {
                if self.is_user || !self.has(IsarFeatures::MVFR) {
                    return Ok(false);
                }
                true
            }
            ARM_VFP_MVFR2 => {
                if self.is_user || !self.has(IsarFeatures::V8) {
                    return Ok(false);
                }
                true
            }
            ARM_VFP_FPSCR => false,
            ARM_VFP_FPEXC => {
                if self.is_user {
                    return Ok(false);
                }
                true
            }
            // Gone in VFPv3.
            ARM_VFP_FPINST | ARM_VFP_FPINST2 => {
                if self.is_user || self.has(IsarFeatures::FPSP_V3) {
                    return Ok(false);
                }
                false
            }
            _ => return Ok(false),
        };

        if !self.full_vfp_access_check(ir, ignore_vfp_enabled).allowed() {
            return Ok(true);
        }

        if a.l {
            let tmp = match reg {
                ARM_VFP_FPSCR if a.rt == 15 => {
                    let t = self.load_cpu_field(ir, xreg_offset(ARM_VFP_FPSCR));
                    ir.gen_andi(Type::I32, t, t, FPCR_NZCV_MASK as u64)
                }
                ARM_VFP_FPSCR => {
                    let t = ir.new_temp(Type::I32);
                    Helper::VfpGetFpscr.call(ir, t, &[self.env])
                }
                _ => {
                    if matches!(reg, ARM_VFP_MVFR0 | ARM_VFP_MVFR1 | ARM_VFP_MVFR2)
                        && self.current_el == 1
                    {
                        // EL2 may trap ID register reads.
                        self.gen_set_pc_im(ir, self.pc_curr);
                        let rt = ir.new_const(Type::I32, a.rt as u64);
                        let r = ir.new_const(Type::I32, a.reg as u64);
                        Helper::CheckHcrEl2Trap.call_void(ir, &[self.env, rt, r]);
                    }
                    self.load_cpu_field(ir, xreg_offset(reg))
                }
            };
            self.sysreg_store(ir, &SysregDest::GeneralRegister { rt: a.rt }, tmp);
        } else {
            match reg {
                // Writes to ID registers are ignored.
                ARM_VFP_FPSID | ARM_VFP_MVFR0 | ARM_VFP_MVFR1 | ARM_VFP_MVFR2 => {}
                ARM_VFP_FPSCR => {
                    let tmp = self.load_reg(ir, a.rt);
                    Helper::VfpSetFpscr.call_void(ir, &[self.env, tmp]);
                    self.gen_lookup_tb();
                }
                ARM_VFP_FPEXC => {
                    // Only the EN bit is implemented.
                    let tmp = self.load_reg(ir, a.rt);
                    ir.gen_andi(Type::I32, tmp, tmp, FPEXC_EN as u64);
                    self.store_cpu_field(ir, tmp, xreg_offset(reg));
                    self.gen_lookup_tb();
                }
                _ => {
                    let tmp = self.load_reg(ir, a.rt);
                    self.store_cpu_field(ir, tmp, xreg_offset(reg));
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn trans_vldr_sysreg(
        &mut self,
        ir: &mut Context,
        a: &ArgsVldrSysreg,
    ) -> Result<bool, TranslateError> {
        if !self.has(IsarFeatures::V8_1M) || a.rn == 15 {
            return Ok(false);
        }
        Ok(self.gen_m_fp_sysreg_write(ir, a.reg as usize, &SysregSource::Memory(*a)))
    }

    pub(crate) fn trans_vstr_sysreg(
        &mut self,
        ir: &mut Context,
        a: &ArgsVldrSysreg,
    ) -> Result<bool, TranslateError> {
        if !self.has(IsarFeatures::V8_1M) || a.rn == 15 {
            return Ok(false);
        }
        Ok(self.gen_m_fp_sysreg_read(ir, a.reg as usize, &SysregDest::Memory(*a)))
    }
}
