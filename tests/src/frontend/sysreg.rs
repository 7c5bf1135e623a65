//! A-profile VMSR/VMRS.

use pretty_assertions::assert_eq;
use tcg_frontend::arm::cpu::{
    ArmCpu, ARM_VFP_FPEXC, ARM_VFP_FPINST, ARM_VFP_FPSCR, ARM_VFP_FPSID, ARM_VFP_MVFR0,
    ARM_VFP_MVFR2, FPEXC_EN,
};
use tcg_frontend::arm::features::{ArmCfg, IsarFeatures};
use tcg_frontend::arm::helper::Helper;
use tcg_frontend::arm::insn::{ArgsVmovSingle, ArgsVmsrVmrs, VfpInsn};
use tcg_frontend::arm::TransOutcome;

use super::interp::Exit;
use super::{fell_through, udef, Setup};

fn max() -> Setup {
    Setup::a_profile(ArmCfg::MAX)
}

fn vmrs(reg: usize, rt: u32) -> VfpInsn {
    VfpInsn::VmsrVmrs(ArgsVmsrVmrs {
        reg: reg as u32,
        rt,
        l: true,
    })
}

fn vmsr(reg: usize, rt: u32) -> VfpInsn {
    VfpInsn::VmsrVmrs(ArgsVmsrVmrs {
        reg: reg as u32,
        rt,
        l: false,
    })
}

/// VFPv2 only: FPINST/FPINST2 still exist.
const VFPV2: ArmCfg = ArmCfg {
    name: "vfpv2",
    features: IsarFeatures::FPSP_V2.union(IsarFeatures::FPDP_V2),
};

#[test]
fn read_fpscr_calls_helper() {
    let mut cpu = ArmCpu::new();
    cpu.xregs[ARM_VFP_FPSCR] = 0x0340_0000;
    let (m, exit) = max().run(cpu, &[vmrs(ARM_VFP_FPSCR, 2)]);
    assert_eq!(exit, Exit::Tb(0));
    assert_eq!(m.cpu.regs[2], 0x0340_0000);
    assert_eq!(m.calls, vec![Helper::VfpGetFpscr]);
}

#[test]
fn write_fpscr_ends_block() {
    let mut cpu = ArmCpu::new();
    // RMode = RZ
    cpu.regs[3] = 0x00c0_0000;
    cpu.regs[4] = 0x1234;
    let follow = VfpInsn::VmovSingle(ArgsVmovSingle {
        vn: 0,
        rt: 4,
        l: false,
    });
    let (m, exit) = max().run(cpu, &[vmsr(ARM_VFP_FPSCR, 3), follow]);
    assert_eq!(exit, Exit::Lookup);
    assert!(fell_through(&m, 1));
    assert_eq!(m.cpu.xregs[ARM_VFP_FPSCR], 0x00c0_0000);
    assert_eq!(m.cpu.fp_status.rounding_mode, 3);
    assert_eq!(m.calls, vec![Helper::VfpSetFpscr, Helper::LookupTbPtr]);
    // The second instruction belongs to the next block.
    assert_eq!(m.cpu.sreg(0), 0);
}

#[test]
fn id_registers_are_privileged() {
    let user = max().with_flags(|f| {
        f.is_user = true;
        f.current_el = 0;
    });
    for reg in [ARM_VFP_FPSID, ARM_VFP_MVFR0, ARM_VFP_MVFR2, ARM_VFP_FPEXC] {
        let (ir, res) = user.dispatch(vmrs(reg, 0));
        assert_eq!(res, Ok(TransOutcome::Illegal), "reg {reg}");
        assert_eq!(ir.num_ops(), 0);
    }
    // FPSCR is fine from user mode.
    let (_, res) = user.dispatch(vmrs(ARM_VFP_FPSCR, 0));
    assert_eq!(res, Ok(TransOutcome::HandledWithEmission));
}

#[test]
fn mvfr_reads_check_el2_trap_at_el1() {
    let mut cpu = ArmCpu::new();
    cpu.xregs[ARM_VFP_MVFR0] = 0x1011_0222;
    let (m, _) = max().run(cpu.clone(), &[vmrs(ARM_VFP_MVFR0, 1)]);
    assert_eq!(m.cpu.regs[1], 0x1011_0222);
    assert_eq!(m.calls, vec![Helper::CheckHcrEl2Trap]);

    let (m, _) = max().with_flags(|f| f.current_el = 2).run(cpu, &[vmrs(ARM_VFP_MVFR0, 1)]);
    assert_eq!(m.cpu.regs[1], 0x1011_0222);
    assert!(m.calls.is_empty());

    // MVFR2 arrived with v8.
    let (_, res) = Setup::a_profile(ArmCfg::CORTEX_A15).dispatch(vmrs(ARM_VFP_MVFR2, 1));
    assert_eq!(res, Ok(TransOutcome::Illegal));
}

#[test]
fn fpexc_accessible_while_disabled() {
    let disabled = max().with_flags(|f| f.vfp_enabled = false);
    let mut cpu = ArmCpu::new();
    cpu.xregs[ARM_VFP_FPEXC] = 0x4000_0700;

    let (m, exit) = disabled.run(cpu.clone(), &[vmrs(ARM_VFP_FPEXC, 0)]);
    assert_eq!(exit, Exit::Tb(0));
    assert_eq!(m.cpu.regs[0], 0x4000_0700);

    let (m, exit) = disabled.run(cpu, &[vmrs(ARM_VFP_FPSCR, 0)]);
    assert_eq!(exit, udef(1));
    assert_eq!(m.cpu.regs[0], 0);
}

#[test]
fn fpexc_write_keeps_enable_only() {
    let mut cpu = ArmCpu::new();
    cpu.regs[0] = 0xffff_ffff;
    let (m, exit) = max().run(cpu, &[vmsr(ARM_VFP_FPEXC, 0)]);
    assert_eq!(exit, Exit::Lookup);
    assert_eq!(m.cpu.xregs[ARM_VFP_FPEXC], FPEXC_EN);
}

#[test]
fn id_register_writes_are_ignored() {
    let mut cpu = ArmCpu::new();
    cpu.regs[0] = 0xffff_ffff;
    cpu.xregs[ARM_VFP_FPSID] = 0x4103_0000;
    let (m, exit) = max().run(cpu, &[vmsr(ARM_VFP_FPSID, 0)]);
    assert_eq!(exit, Exit::Tb(0));
    assert_eq!(m.cpu.xregs[ARM_VFP_FPSID], 0x4103_0000);
}

#[test]
fn fpinst_only_before_vfpv3() {
    let (_, res) = max().dispatch(vmrs(ARM_VFP_FPINST, 0));
    assert_eq!(res, Ok(TransOutcome::Illegal));

    let mut cpu = ArmCpu::new();
    cpu.regs[2] = 0xe000_0000;
    let old = Setup::a_profile(VFPV2);
    let (m, _) = old.run(cpu, &[vmsr(ARM_VFP_FPINST, 2), vmrs(ARM_VFP_FPINST, 5)]);
    assert_eq!(m.cpu.xregs[ARM_VFP_FPINST], 0xe000_0000);
    assert_eq!(m.cpu.regs[5], 0xe000_0000);

    // Unlike FPEXC, FPINST honours the enable.
    let (_, exit) = old
        .with_flags(|f| f.vfp_enabled = false)
        .run(ArmCpu::new(), &[vmrs(ARM_VFP_FPINST, 5)]);
    assert_eq!(exit, udef(1));
}

#[test]
fn unknown_register_is_undefined() {
    for reg in [3, 4, 11] {
        let (ir, res) = max().dispatch(vmrs(reg, 0));
        assert_eq!(res, Ok(TransOutcome::Illegal), "reg {reg}");
        assert_eq!(ir.num_ops(), 0);
    }
}
