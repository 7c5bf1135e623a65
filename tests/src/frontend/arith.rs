//! Data-processing instructions, short vectors, compares and VSEL.

use pretty_assertions::assert_eq;
use tcg_frontend::arm::cpu::{ArmCpu, ARM_VFP_FPSCR};
use tcg_frontend::arm::features::ArmCfg;
use tcg_frontend::arm::helper::Helper;
use tcg_frontend::arm::insn::{
    ArgsVcmp, ArgsVmovImm, ArgsVmsrVmrs, ArgsVsel, FmaKind, VfpInsn,
};
use tcg_frontend::arm::regs::Precision::{Double, Half, Single};
use tcg_frontend::arm::TransOutcome;
use tcg_frontend::TranslateError;

use super::interp::Exit;
use super::{cpu_with_s, df, f32b, f64b, fell_through, sf, udef, vfp2, vfp3, Setup, PC};

fn max() -> Setup {
    Setup::a_profile(ArmCfg::MAX)
}

/// A15 with FPSCR.LEN = `len` - 1 and FPSCR.STRIDE = `stride`.
fn a15_vector(len: u32, stride: u32) -> Setup {
    Setup::a_profile(ArmCfg::CORTEX_A15).with_flags(|f| {
        f.vec_len = len - 1;
        f.vec_stride = stride;
    })
}

#[test]
fn single_precision_binary_ops() {
    let insns = [
        VfpInsn::Vadd(Single, vfp3(3, 1, 2)),
        VfpInsn::Vsub(Single, vfp3(4, 1, 2)),
        VfpInsn::Vmul(Single, vfp3(5, 1, 2)),
        VfpInsn::Vdiv(Single, vfp3(6, 1, 2)),
    ];
    let (m, exit) = max().run(cpu_with_s(&[0.0, 6.0, 1.5]), &insns);
    assert_eq!(exit, Exit::Tb(0));
    assert!(fell_through(&m, 4));
    assert_eq!(sf(&m.cpu, 3), 7.5);
    assert_eq!(sf(&m.cpu, 4), 4.5);
    assert_eq!(sf(&m.cpu, 5), 9.0);
    assert_eq!(sf(&m.cpu, 6), 4.0);
    assert_eq!(
        m.calls,
        vec![Helper::VfpAdds, Helper::VfpSubs, Helper::VfpMuls, Helper::VfpDivs]
    );
}

#[test]
fn double_precision_binary_ops() {
    let mut cpu = ArmCpu::new();
    cpu.set_dreg(1, f64b(2.5));
    cpu.set_dreg(2, f64b(4.0));
    let insns = [
        VfpInsn::Vadd(Double, vfp3(0, 1, 2)),
        VfpInsn::Vmul(Double, vfp3(3, 1, 2)),
        VfpInsn::Vmaxnm(Double, vfp3(4, 1, 2)),
    ];
    let (m, _) = max().run(cpu, &insns);
    assert_eq!(df(&m.cpu, 0), 6.5);
    assert_eq!(df(&m.cpu, 3), 10.0);
    assert_eq!(df(&m.cpu, 4), 4.0);
}

#[test]
fn multiply_accumulate_family() {
    // vd = 1.0, vn = 2.0, vm = 3.0
    let cases = [
        (VfpInsn::Vmla(Single, vfp3(0, 1, 2)), 7.0),
        (VfpInsn::Vmls(Single, vfp3(0, 1, 2)), -5.0),
        (VfpInsn::Vnmls(Single, vfp3(0, 1, 2)), 5.0),
        (VfpInsn::Vnmla(Single, vfp3(0, 1, 2)), -7.0),
        (VfpInsn::Vnmul(Single, vfp3(0, 1, 2)), -6.0),
    ];
    for (insn, want) in cases {
        let (m, _) = max().run(cpu_with_s(&[1.0, 2.0, 3.0]), &[insn]);
        assert_eq!(sf(&m.cpu, 0), want, "{}", insn.name());
        // Sources untouched.
        assert_eq!(sf(&m.cpu, 1), 2.0);
        assert_eq!(sf(&m.cpu, 2), 3.0);
    }
}

#[test]
fn multiply_accumulate_rounds_twice() {
    let (m, _) = max().run(
        cpu_with_s(&[1.0, 2.0, 3.0]),
        &[VfpInsn::Vmla(Single, vfp3(0, 1, 2))],
    );
    assert_eq!(m.calls, vec![Helper::VfpMuls, Helper::VfpAdds]);

    let (m, _) = max().run(
        cpu_with_s(&[1.0, 2.0, 3.0]),
        &[VfpInsn::Vnmla(Single, vfp3(0, 1, 2))],
    );
    assert_eq!(
        m.calls,
        vec![Helper::VfpMuls, Helper::VfpNegs, Helper::VfpNegs, Helper::VfpAdds]
    );
}

#[test]
fn fused_multiply_add_family() {
    let cases = [
        (FmaKind::Vfma, 7.0, vec![Helper::VfpMuladds]),
        (FmaKind::Vfms, -5.0, vec![Helper::VfpNegs, Helper::VfpMuladds]),
        (FmaKind::Vfnma, 5.0, vec![Helper::VfpNegs, Helper::VfpMuladds]),
        (
            FmaKind::Vfnms,
            -7.0,
            vec![Helper::VfpNegs, Helper::VfpNegs, Helper::VfpMuladds],
        ),
    ];
    for (kind, want, calls) in cases {
        let insn = VfpInsn::Vfm(kind, Single, vfp3(0, 1, 2));
        let (m, _) = max().run(cpu_with_s(&[1.0, 2.0, 3.0]), &[insn]);
        assert_eq!(sf(&m.cpu, 0), want, "{kind:?}");
        assert_eq!(m.calls, calls, "{kind:?}");
    }
}

#[test]
fn fused_negation_flips_nan_sign() {
    let mut cpu = cpu_with_s(&[0.0, 2.0, 3.0]);
    cpu.set_sreg(0, 0x7fc0_0001);
    let (m, _) = max().run(cpu, &[VfpInsn::Vfm(FmaKind::Vfnma, Single, vfp3(0, 1, 2))]);
    assert_eq!(m.cpu.sreg(0), 0xffc0_0001);
}

#[test]
fn fused_double() {
    let mut cpu = ArmCpu::new();
    cpu.set_dreg(0, f64b(0.5));
    cpu.set_dreg(1, f64b(4.0));
    cpu.set_dreg(2, f64b(0.25));
    let (m, _) = max().run(cpu, &[VfpInsn::Vfm(FmaKind::Vfms, Double, vfp3(0, 1, 2))]);
    assert_eq!(df(&m.cpu, 0), -0.5);
    assert_eq!(m.calls, vec![Helper::VfpNegd, Helper::VfpMuladdd]);
}

#[test]
fn unary_ops() {
    let insns = [
        VfpInsn::Vabs(Single, vfp2(0, 1)),
        VfpInsn::Vneg(Single, vfp2(3, 1)),
        VfpInsn::Vsqrt(Single, vfp2(4, 2)),
        VfpInsn::VmovReg(Single, vfp2(5, 2)),
    ];
    let (m, _) = max().run(cpu_with_s(&[0.0, -9.0, 16.0]), &insns);
    assert_eq!(sf(&m.cpu, 0), 9.0);
    assert_eq!(sf(&m.cpu, 3), 9.0);
    assert_eq!(sf(&m.cpu, 4), 4.0);
    assert_eq!(sf(&m.cpu, 5), 16.0);
    assert_eq!(
        m.calls,
        vec![Helper::VfpAbss, Helper::VfpNegs, Helper::VfpSqrts]
    );
}

#[test]
fn move_immediate() {
    let insns = [
        VfpInsn::VmovImm(Double, ArgsVmovImm { vd: 3, imm: 0x70 }),
        VfpInsn::VmovImm(Single, ArgsVmovImm { vd: 1, imm: 0x80 }),
        VfpInsn::VmovImm(Half, ArgsVmovImm { vd: 2, imm: 0x70 }),
    ];
    let mut cpu = ArmCpu::new();
    cpu.set_sreg(2, 0xffff_ffff);
    let (m, _) = max().run(cpu, &insns);
    assert_eq!(df(&m.cpu, 3), 1.0);
    assert_eq!(sf(&m.cpu, 1), -2.0);
    assert_eq!(m.cpu.sreg(2), 0x3c00);
    assert!(m.calls.is_empty());
}

#[test]
fn minmaxnm_needs_v8() {
    let insn = VfpInsn::Vminnm(Single, vfp3(0, 1, 2));
    let (m, exit) = Setup::a_profile(ArmCfg::CORTEX_A15).run(cpu_with_s(&[5.0, 2.0, 3.0]), &[insn]);
    assert_eq!(exit, udef(1));
    assert_eq!(m.cpu.regs[15] as u64, PC);
    assert_eq!(sf(&m.cpu, 0), 5.0);

    let (m, _) = max().run(cpu_with_s(&[5.0, 2.0, 3.0]), &[insn]);
    assert_eq!(sf(&m.cpu, 0), 2.0);
}

// -- Short vectors ---------------------------------------------

#[test]
fn vector_add() {
    let mut cpu = ArmCpu::new();
    for (reg, v) in [(16, 1.0), (17, 2.0), (24, 10.0), (25, 20.0)] {
        cpu.set_sreg(reg, f32b(v));
    }
    let (m, exit) = a15_vector(2, 0).run(cpu, &[VfpInsn::Vadd(Single, vfp3(8, 16, 24))]);
    assert_eq!(exit, Exit::Tb(0));
    assert_eq!(sf(&m.cpu, 8), 11.0);
    assert_eq!(sf(&m.cpu, 9), 22.0);
    assert_eq!(m.cpu.sreg(10), 0);
    assert_eq!(m.count(Helper::VfpAdds), 2);
}

#[test]
fn vector_stride() {
    let mut cpu = ArmCpu::new();
    for (reg, v) in [(16, 1.0), (18, 2.0), (24, 10.0), (26, 20.0)] {
        cpu.set_sreg(reg, f32b(v));
    }
    let (m, _) = a15_vector(2, 1).run(cpu, &[VfpInsn::Vadd(Single, vfp3(8, 16, 24))]);
    assert_eq!(sf(&m.cpu, 8), 11.0);
    assert_eq!(m.cpu.sreg(9), 0);
    assert_eq!(sf(&m.cpu, 10), 22.0);
}

#[test]
fn vector_with_scalar_operand() {
    let mut cpu = ArmCpu::new();
    for (reg, v) in [(0, 100.0), (16, 1.0), (17, 2.0)] {
        cpu.set_sreg(reg, f32b(v));
    }
    let (m, _) = a15_vector(2, 0).run(cpu, &[VfpInsn::Vadd(Single, vfp3(8, 16, 0))]);
    assert_eq!(sf(&m.cpu, 8), 101.0);
    assert_eq!(sf(&m.cpu, 9), 102.0);
}

#[test]
fn scalar_destination_runs_once() {
    let mut cpu = ArmCpu::new();
    for (reg, v) in [(16, 1.0), (17, 2.0), (24, 10.0), (25, 20.0)] {
        cpu.set_sreg(reg, f32b(v));
    }
    let (m, _) = a15_vector(2, 0).run(cpu, &[VfpInsn::Vadd(Single, vfp3(0, 16, 24))]);
    assert_eq!(sf(&m.cpu, 0), 11.0);
    assert_eq!(m.cpu.sreg(1), 0);
    assert_eq!(m.count(Helper::VfpAdds), 1);
}

#[test]
fn vector_registers_wrap_in_bank() {
    let insn = VfpInsn::VmovImm(Single, ArgsVmovImm { vd: 14, imm: 0x70 });
    let (m, _) = a15_vector(4, 0).run(ArmCpu::new(), &[insn]);
    for reg in [14, 15, 8, 9] {
        assert_eq!(sf(&m.cpu, reg), 1.0, "s{reg}");
    }
    for reg in [10, 11, 12, 13, 16] {
        assert_eq!(m.cpu.sreg(reg), 0, "s{reg}");
    }
}

#[test]
fn vector_unary_scalar_source_broadcasts() {
    let (m, _) = a15_vector(2, 0).run(cpu_with_s(&[3.0]), &[VfpInsn::Vneg(Single, vfp2(8, 0))]);
    assert_eq!(sf(&m.cpu, 8), -3.0);
    assert_eq!(sf(&m.cpu, 9), -3.0);
    assert_eq!(m.calls, vec![Helper::VfpNegs]);
}

#[test]
fn vector_unary_steps_source() {
    let mut cpu = ArmCpu::new();
    cpu.set_dreg(8, f64b(1.5));
    cpu.set_dreg(9, f64b(-2.5));
    let (m, _) = a15_vector(2, 0).run(cpu, &[VfpInsn::VmovReg(Double, vfp2(4, 8))]);
    assert_eq!(df(&m.cpu, 4), 1.5);
    assert_eq!(df(&m.cpu, 5), -2.5);
}

#[test]
fn vectors_undefined_without_fpshvec() {
    let setup = max().with_flags(|f| f.vec_len = 1);
    let (m, exit) = setup.run(ArmCpu::new(), &[VfpInsn::Vadd(Single, vfp3(8, 16, 24))]);
    assert_eq!(exit, udef(1));
    assert!(m.calls.iter().all(|&h| h == Helper::ExceptionWithSyndrome));
}

#[test]
fn fused_ops_never_vector() {
    let (ir, res) = a15_vector(2, 0).dispatch(VfpInsn::Vfm(FmaKind::Vfma, Single, vfp3(8, 16, 24)));
    assert_eq!(res, Ok(TransOutcome::Illegal));
    assert_eq!(ir.num_ops(), 0);
}

// -- Compare and select ----------------------------------------

fn vmrs_apsr_nzcv() -> VfpInsn {
    VfpInsn::VmsrVmrs(ArgsVmsrVmrs {
        reg: ARM_VFP_FPSCR as u32,
        rt: 15,
        l: true,
    })
}

#[test]
fn compare_sets_fpscr_and_flags() {
    let cases = [
        (1.0, 2.0, 0x8000_0000),
        (2.0, 2.0, 0x6000_0000),
        (3.0, 2.0, 0x2000_0000),
        (f32::NAN, 2.0, 0x3000_0000),
    ];
    for (a, b, nzcv) in cases {
        let cmp = VfpInsn::Vcmp(
            Single,
            ArgsVcmp {
                vd: 0,
                vm: 1,
                e: false,
                z: false,
            },
        );
        let (m, exit) = max().run(cpu_with_s(&[a, b]), &[cmp, vmrs_apsr_nzcv()]);
        assert_eq!(exit, Exit::Tb(0));
        assert_eq!(m.cpu.xregs[ARM_VFP_FPSCR] & 0xf000_0000, nzcv, "{a} vs {b}");
        assert_eq!(m.cpu.nzcv(), nzcv, "{a} vs {b}");
    }
}

#[test]
fn compare_with_zero() {
    let cmpe = VfpInsn::Vcmp(
        Double,
        ArgsVcmp {
            vd: 2,
            vm: 0,
            e: true,
            z: true,
        },
    );
    let mut cpu = ArmCpu::new();
    cpu.set_dreg(0, f64b(-1.0));
    cpu.set_dreg(2, f64b(-0.0));
    let (m, _) = max().run(cpu, &[cmpe, vmrs_apsr_nzcv()]);
    assert_eq!(m.cpu.nzcv(), 0x6000_0000);
    assert_eq!(m.calls, vec![Helper::VfpCmped]);
}

#[test]
fn compare_with_zero_requires_vm_zero() {
    let insn = VfpInsn::Vcmp(
        Single,
        ArgsVcmp {
            vd: 0,
            vm: 1,
            e: false,
            z: true,
        },
    );
    let (ir, res) = max().dispatch(insn);
    assert_eq!(res, Ok(TransOutcome::Illegal));
    assert_eq!(ir.num_ops(), 0);
}

fn vsel(cc: u32) -> VfpInsn {
    VfpInsn::Vsel(Single, ArgsVsel { vd: 0, vn: 1, vm: 2, cc })
}

/// Run VSEL with the given CPSR flag storage; true if vn was chosen.
fn vsel_picks_vn(cc: u32, nf: u32, zf: u32, vf: u32) -> bool {
    let mut cpu = cpu_with_s(&[0.0, 1.0, 2.0]);
    cpu.nf = nf;
    cpu.zf = zf;
    cpu.vf = vf;
    let (m, exit) = max().run(cpu, &[vsel(cc)]);
    assert_eq!(exit, Exit::Tb(0));
    assert!(m.calls.is_empty());
    match sf(&m.cpu, 0) {
        x if x == 1.0 => true,
        x if x == 2.0 => false,
        x => panic!("VSEL produced {x}"),
    }
}

#[test]
fn select_conditions() {
    const NEG: u32 = 0x8000_0000;
    // EQ
    assert!(vsel_picks_vn(0, 0, 0, 0));
    assert!(!vsel_picks_vn(0, 0, 1, 0));
    // VS
    assert!(vsel_picks_vn(1, 0, 1, NEG));
    assert!(!vsel_picks_vn(1, NEG, 1, 0));
    // GE
    assert!(vsel_picks_vn(2, NEG, 1, NEG));
    assert!(vsel_picks_vn(2, 0, 1, 0));
    assert!(!vsel_picks_vn(2, NEG, 1, 0));
    // GT
    assert!(vsel_picks_vn(3, 0, 1, 0));
    assert!(!vsel_picks_vn(3, 0, 0, 0));
    assert!(!vsel_picks_vn(3, 0, 1, NEG));
}

#[test]
fn select_double_uses_flag_signs() {
    let run = |nf: u32, vf: u32| {
        let mut cpu = ArmCpu::new();
        cpu.set_dreg(1, f64b(1.0));
        cpu.set_dreg(2, f64b(2.0));
        cpu.nf = nf;
        cpu.vf = vf;
        let insn = VfpInsn::Vsel(Double, ArgsVsel { vd: 0, vn: 1, vm: 2, cc: 2 });
        let (m, _) = max().run(cpu, &[insn]);
        df(&m.cpu, 0)
    };
    assert_eq!(run(0x8000_0000, 0x8000_0000), 1.0);
    assert_eq!(run(0x8000_0000, 0), 2.0);
    assert_eq!(run(0, 0x8000_0000), 2.0);
}

#[test]
fn select_rejects_bad_condition() {
    let err = max().translate(&[vsel(4)]).err().expect("cc 4 accepted");
    assert_eq!(
        err,
        TranslateError::InvalidField {
            insn: "VSEL",
            field: "cc",
            value: 4,
        }
    );
}
