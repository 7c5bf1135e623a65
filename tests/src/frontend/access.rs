//! FPU access checks and the M-profile lazy FP context protocol.

use pretty_assertions::assert_eq;
use tcg_core::tb::cflags::CF_USE_ICOUNT;
use tcg_frontend::arm::cpu::{
    syn_fp_access_trap, ArmCpu, ARM_VFP_FPSCR, EXCP_UDEF, M_REG_NS, M_REG_S,
    V7M_CONTROL_FPCA_MASK, V7M_CONTROL_SFPA_MASK, V7M_FPCCR_S_MASK,
};
use tcg_frontend::arm::features::ArmCfg;
use tcg_frontend::arm::helper::Helper;
use tcg_frontend::arm::insn::VfpInsn;
use tcg_frontend::arm::regs::Precision::Single;

use super::interp::{Exception, Exit};
use super::{cpu_with_s, fell_through, sf, udef, vfp3, Setup, PC};

fn vadd(vd: u32) -> VfpInsn {
    VfpInsn::Vadd(Single, vfp3(vd, 1, 2))
}

#[test]
fn trapped_to_higher_el() {
    let setup = Setup::a_profile(ArmCfg::MAX).with_flags(|f| f.fp_excp_el = 2);
    let (m, exit) = setup.run(cpu_with_s(&[0.0, 1.0, 2.0]), &[vadd(0)]);
    assert_eq!(
        exit,
        Exit::Exception(Exception {
            excp: EXCP_UDEF,
            syndrome: syn_fp_access_trap(1, 0xe, false),
            target_el: 2,
        })
    );
    assert_eq!(m.cpu.regs[15] as u64, PC);
    assert_eq!(m.calls, vec![Helper::ExceptionWithSyndrome]);
    assert_eq!(sf(&m.cpu, 0), 0.0);
}

#[test]
fn trap_wins_over_disabled() {
    let setup = Setup::a_profile(ArmCfg::MAX).with_flags(|f| {
        f.fp_excp_el = 3;
        f.vfp_enabled = false;
    });
    let (_, exit) = setup.run(ArmCpu::new(), &[vadd(0)]);
    match exit {
        Exit::Exception(e) => assert_eq!(e.target_el, 3),
        other => panic!("expected a trap, got {other:?}"),
    }
}

#[test]
fn disabled_is_undefined() {
    let disabled = Setup::a_profile(ArmCfg::MAX).with_flags(|f| f.vfp_enabled = false);
    let (m, exit) = disabled.run(cpu_with_s(&[0.0, 1.0, 2.0]), &[vadd(0)]);
    assert_eq!(exit, udef(1));
    assert_eq!(sf(&m.cpu, 0), 0.0);

    // EL0 UNDEFs go to EL1.
    let (_, exit) = disabled
        .with_flags(|f| {
            f.current_el = 0;
            f.is_user = true;
        })
        .run(ArmCpu::new(), &[vadd(0)]);
    assert_eq!(exit, udef(1));
}

#[test]
fn a_profile_ignores_m_state() {
    let setup = Setup::a_profile(ArmCfg::MAX).with_flags(|f| {
        f.v7m_lspact = true;
        f.v7m_new_fp_ctxt_needed = true;
    });
    let (m, _) = setup.run(cpu_with_s(&[0.0, 1.0, 2.0]), &[vadd(0)]);
    assert_eq!(m.calls, vec![Helper::VfpAdds]);
}

#[test]
fn lazy_state_preserved_once() {
    let lazy = Setup::m_profile(ArmCfg::CORTEX_M4).with_flags(|f| f.v7m_lspact = true);
    let (m, exit) = lazy.run(cpu_with_s(&[0.0, 1.0, 2.0]), &[vadd(0), vadd(3)]);
    assert_eq!(exit, Exit::Tb(0));
    assert!(fell_through(&m, 2));
    assert_eq!(
        m.calls,
        vec![Helper::V7mPreserveFpState, Helper::VfpAdds, Helper::VfpAdds]
    );
    assert_eq!(sf(&m.cpu, 3), 3.0);
}

#[test]
fn lazy_state_ends_block_under_icount() {
    let mut lazy = Setup::m_profile(ArmCfg::CORTEX_M4).with_flags(|f| f.v7m_lspact = true);
    lazy.cflags = CF_USE_ICOUNT;
    let (m, exit) = lazy.run(cpu_with_s(&[0.0, 1.0, 2.0]), &[vadd(0), vadd(3)]);
    assert_eq!(exit, Exit::Tb(0));
    assert!(fell_through(&m, 1));
    assert_eq!(sf(&m.cpu, 0), 3.0);
    assert_eq!(m.cpu.sreg(3), 0);
}

#[test]
fn fpccr_s_follows_security_state() {
    let wrong = |secure: bool| {
        Setup::m_profile(ArmCfg::CORTEX_M33).with_flags(|f| {
            f.v8m_fpccr_s_wrong = true;
            f.v8m_secure = secure;
        })
    };

    let (m, _) = wrong(true).run(ArmCpu::new(), &[vadd(0), vadd(3)]);
    assert_eq!(m.cpu.v7m_fpccr[M_REG_S], V7M_FPCCR_S_MASK);

    let mut cpu = ArmCpu::new();
    cpu.v7m_fpccr[M_REG_S] = 0xff;
    let (m, _) = wrong(false).run(cpu, &[vadd(0)]);
    assert_eq!(m.cpu.v7m_fpccr[M_REG_S], 0xff & !V7M_FPCCR_S_MASK);
    assert_eq!(m.cpu.v7m_fpccr[M_REG_NS], 0);
}

#[test]
fn new_fp_context_from_default() {
    let setup = Setup::m_profile(ArmCfg::CORTEX_M33).with_flags(|f| f.v7m_new_fp_ctxt_needed = true);
    let mut cpu = cpu_with_s(&[0.0, 1.0, 2.0]);
    cpu.v7m_fpdscr[M_REG_S] = 0x00c0_0000;
    cpu.v7m_fpdscr[M_REG_NS] = 0x0040_0000;

    let (m, _) = setup.run(cpu.clone(), &[vadd(0), vadd(3)]);
    assert_eq!(m.cpu.xregs[ARM_VFP_FPSCR], 0x00c0_0000);
    assert_eq!(m.cpu.fp_status.rounding_mode, 3);
    assert_eq!(
        m.cpu.v7m_control[M_REG_S],
        V7M_CONTROL_FPCA_MASK | V7M_CONTROL_SFPA_MASK
    );
    assert_eq!(m.count(Helper::VfpSetFpscr), 1);

    // Non-secure: the NS default, and SFPA untouched.
    let (m, _) = setup
        .with_flags(|f| f.v8m_secure = false)
        .run(cpu, &[vadd(0)]);
    assert_eq!(m.cpu.xregs[ARM_VFP_FPSCR], 0x0040_0000);
    assert_eq!(m.cpu.v7m_control[M_REG_S], V7M_CONTROL_FPCA_MASK);
}

#[test]
fn context_set_up_before_the_operation() {
    let setup = Setup::m_profile(ArmCfg::CORTEX_M33).with_flags(|f| {
        f.v7m_lspact = true;
        f.v8m_fpccr_s_wrong = true;
        f.v7m_new_fp_ctxt_needed = true;
    });
    let (m, _) = setup.run(cpu_with_s(&[0.0, 1.0, 2.0]), &[vadd(0)]);
    assert_eq!(
        m.calls,
        vec![Helper::V7mPreserveFpState, Helper::VfpSetFpscr, Helper::VfpAdds]
    );
}
