//! VFP data processing: arithmetic, fused multiply-add, immediate
//! moves, compares and VSEL.

use super::features::IsarFeatures;
use super::helper::Helper;
use super::insn::{ArgsVcmp, ArgsVfp2, ArgsVfp3, ArgsVmovImm, ArgsVsel, FmaKind};
use super::regs::{advance, vfp_expand_imm, Precision};
use super::templates::VecPlan;
use super::ArmDisasContext;
use crate::TranslateError;
use tcg_core::{Cond, Context, TempIdx, Type};

type TransResult = Result<bool, TranslateError>;

/// `fd = fd + tmp` for the multiply-accumulate family.
fn accumulate(ir: &mut Context, p: Precision, fd: TempIdx, tmp: TempIdx, fpst: TempIdx) {
    Helper::add(p).call(ir, fd, &[fd, tmp, fpst]);
}

fn product(ir: &mut Context, p: Precision, f0: TempIdx, f1: TempIdx, fpst: TempIdx) -> TempIdx {
    let tmp = ir.new_temp(p.ir_type());
    Helper::mul(p).call(ir, tmp, &[f0, f1, fpst])
}

fn negate(ir: &mut Context, p: Precision, val: TempIdx) {
    Helper::neg(p).call(ir, val, &[val]);
}

impl ArmDisasContext {
    // -- Multiply-accumulate (non-fused) -------------------

    pub(crate) fn trans_vmla(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        // vd = vd + (vn * vm)
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                let tmp = product(ir, p, f0, f1, fpst);
                accumulate(ir, p, fd, tmp, fpst);
            },
            p,
            (a.vd, a.vn, a.vm),
            true,
        ))
    }

    pub(crate) fn trans_vmls(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        // vd = vd + -(vn * vm)
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                let tmp = product(ir, p, f0, f1, fpst);
                negate(ir, p, tmp);
                accumulate(ir, p, fd, tmp, fpst);
            },
            p,
            (a.vd, a.vn, a.vm),
            true,
        ))
    }

    pub(crate) fn trans_vnmls(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        // vd = -vd + (vn * vm)
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                let tmp = product(ir, p, f0, f1, fpst);
                negate(ir, p, fd);
                accumulate(ir, p, fd, tmp, fpst);
            },
            p,
            (a.vd, a.vn, a.vm),
            true,
        ))
    }

    pub(crate) fn trans_vnmla(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        // vd = -vd + -(vn * vm)
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                let tmp = product(ir, p, f0, f1, fpst);
                negate(ir, p, tmp);
                negate(ir, p, fd);
                accumulate(ir, p, fd, tmp, fpst);
            },
            p,
            (a.vd, a.vn, a.vm),
            true,
        ))
    }

    // -- Plain binary ops ----------------------------------

    pub(crate) fn trans_vmul(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::mul(p).call(ir, fd, &[f0, f1, fpst]);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    pub(crate) fn trans_vnmul(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::mul(p).call(ir, fd, &[f0, f1, fpst]);
                negate(ir, p, fd);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    pub(crate) fn trans_vadd(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::add(p).call(ir, fd, &[f0, f1, fpst]);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    pub(crate) fn trans_vsub(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::sub(p).call(ir, fd, &[f0, f1, fpst]);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    pub(crate) fn trans_vdiv(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::div(p).call(ir, fd, &[f0, f1, fpst]);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    pub(crate) fn trans_vminnm(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        if !self.has(IsarFeatures::VMINMAXNM) {
            return Ok(false);
        }
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::minnum(p).call(ir, fd, &[f0, f1, fpst]);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    pub(crate) fn trans_vmaxnm(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp3) -> TransResult {
        if !self.has(IsarFeatures::VMINMAXNM) {
            return Ok(false);
        }
        Ok(self.do_vfp_3op(
            ir,
            |ir, p, fd, f0, f1, fpst| {
                Helper::maxnum(p).call(ir, fd, &[f0, f1, fpst]);
            },
            p,
            (a.vd, a.vn, a.vm),
            false,
        ))
    }

    // -- Fused multiply-add --------------------------------

    /// VFMA/VFMS/VFNMA/VFNMS: `vd = muladd(±vn, vm, ±vd)` with a
    /// single rounding. The negations are plain sign flips, so a NaN
    /// operand keeps its payload with the sign inverted.
    pub(crate) fn trans_vfm(
        &mut self,
        ir: &mut Context,
        kind: FmaKind,
        p: Precision,
        a: &ArgsVfp3,
    ) -> TransResult {
        let ok = self.has(IsarFeatures::SIMDFMAC)
            && match p {
                Precision::Half => {
                    self.has(IsarFeatures::FP16_ARITH) && self.has(IsarFeatures::FPSP_V2)
                }
                Precision::Single => self.has(IsarFeatures::FPSP_V2),
                Precision::Double => {
                    self.has(IsarFeatures::FPDP_V2) && self.dregs_ok(a.vd | a.vn | a.vm)
                }
            };
        if !ok {
            return Ok(false);
        }
        // Fused ops are never short-vector.
        if self.vec_len != 0 || self.vec_stride != 0 {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let (neg_n, neg_d) = kind.negations();
        let vn = self.vfp_load_reg(ir, a.vn, p);
        let vm = self.vfp_load_reg(ir, a.vm, p);
        if neg_n {
            negate(ir, p, vn);
        }
        let vd = self.vfp_load_reg(ir, a.vd, p);
        if neg_d {
            negate(ir, p, vd);
        }
        let fpst = self.fpstatus_for(ir, p);
        Helper::muladd(p).call(ir, vd, &[vn, vm, vd, fpst]);
        self.vfp_store_reg(ir, vd, a.vd, p);
        Ok(true)
    }

    // -- Moves ---------------------------------------------

    pub(crate) fn trans_vmov_imm(
        &mut self,
        ir: &mut Context,
        p: Precision,
        a: &ArgsVmovImm,
    ) -> TransResult {
        let ok = match p {
            Precision::Half => self.has(IsarFeatures::FP16_ARITH),
            Precision::Single => self.has(IsarFeatures::FPSP_V3),
            Precision::Double => self.has(IsarFeatures::FPDP_V3) && self.dregs_ok(a.vd),
        };
        if !ok || !self.short_vector_ok(p) {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let VecPlan { veclen, delta_d, .. } = self.vec_plan(p, a.vd, a.vd);
        let fd = ir.new_const(p.ir_type(), vfp_expand_imm(p, a.imm));
        let mut vd = a.vd;
        for i in 0..=veclen {
            if i != 0 {
                vd = advance(vd, p, delta_d);
            }
            self.vfp_store_reg(ir, fd, vd, p);
        }
        Ok(true)
    }

    pub(crate) fn trans_vmov_reg(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        if p == Precision::Half {
            return Ok(false);
        }
        Ok(self.do_vfp_2op(
            ir,
            |ir, p, fd, f0, _env| {
                ir.gen_mov(p.ir_type(), fd, f0);
            },
            p,
            a.vd,
            a.vm,
        ))
    }

    pub(crate) fn trans_vabs(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        Ok(self.do_vfp_2op(
            ir,
            |ir, p, fd, f0, _env| {
                Helper::abs(p).call(ir, fd, &[f0]);
            },
            p,
            a.vd,
            a.vm,
        ))
    }

    pub(crate) fn trans_vneg(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        Ok(self.do_vfp_2op(
            ir,
            |ir, p, fd, f0, _env| {
                Helper::neg(p).call(ir, fd, &[f0]);
            },
            p,
            a.vd,
            a.vm,
        ))
    }

    pub(crate) fn trans_vsqrt(&mut self, ir: &mut Context, p: Precision, a: &ArgsVfp2) -> TransResult {
        Ok(self.do_vfp_2op(
            ir,
            |ir, p, fd, f0, env| {
                Helper::sqrt(p).call(ir, fd, &[f0, env]);
            },
            p,
            a.vd,
            a.vm,
        ))
    }

    // -- Compare and select --------------------------------

    /// VCMP/VCMPE. The result lands in FPSCR.NZCV via the helper.
    pub(crate) fn trans_vcmp(&mut self, ir: &mut Context, p: Precision, a: &ArgsVcmp) -> TransResult {
        if !self.vfp_precision_ok(p, a.vd | a.vm) {
            return Ok(false);
        }
        // Vm must be zero for the compare-with-zero form.
        if a.z && a.vm != 0 {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let vd = self.vfp_load_reg(ir, a.vd, p);
        let vm = if a.z {
            ir.new_const(p.ir_type(), 0)
        } else {
            self.vfp_load_reg(ir, a.vm, p)
        };
        Helper::cmp(p, a.e).call_void(ir, &[vd, vm, self.env]);
        Ok(true)
    }

    /// VSEL: choose vn or vm on the CPSR flags, without branching.
    pub(crate) fn trans_vsel(&mut self, ir: &mut Context, p: Precision, a: &ArgsVsel) -> TransResult {
        if a.cc > 3 {
            return Err(TranslateError::InvalidField {
                insn: "VSEL",
                field: "cc",
                value: a.cc as i64,
            });
        }
        if !self.has(IsarFeatures::VSEL) {
            return Ok(false);
        }
        let ok = match p {
            Precision::Half => self.has(IsarFeatures::FP16_ARITH),
            Precision::Single => true,
            Precision::Double => {
                self.has(IsarFeatures::FPDP_V2) && self.dregs_ok(a.vd | a.vn | a.vm)
            }
        };
        if !ok {
            return Ok(false);
        }
        if !self.vfp_access_check(ir) {
            return Ok(true);
        }

        let ty = p.ir_type();
        let (zf, nf, vf) = if ty == Type::I64 {
            // Only the sign matters for N and V; Z is "zero iff set".
            let zf = ir.new_temp(Type::I64);
            let nf = ir.new_temp(Type::I64);
            let vf = ir.new_temp(Type::I64);
            ir.gen_ext_u32_i64(zf, self.zf);
            ir.gen_ext_i32_i64(nf, self.nf);
            ir.gen_ext_i32_i64(vf, self.vf);
            (zf, nf, vf)
        } else {
            (self.zf, self.nf, self.vf)
        };

        let frn = self.vfp_load_reg(ir, a.vn, p);
        let frm = self.vfp_load_reg(ir, a.vm, p);
        let dest = ir.new_temp(ty);
        let zero = ir.new_const(ty, 0);

        match a.cc {
            // EQ
            0 => {
                ir.gen_movcond(ty, dest, zf, zero, frn, frm, Cond::Eq);
            }
            // VS
            1 => {
                ir.gen_movcond(ty, dest, vf, zero, frn, frm, Cond::Lt);
            }
            // GE: N == V
            2 => {
                let tmp = ir.new_temp(ty);
                ir.gen_xor(ty, tmp, vf, nf);
                ir.gen_movcond(ty, dest, tmp, zero, frn, frm, Cond::Ge);
            }
            // GT: !Z && N == V
            _ => {
                ir.gen_movcond(ty, dest, zf, zero, frn, frm, Cond::Ne);
                let tmp = ir.new_temp(ty);
                ir.gen_xor(ty, tmp, vf, nf);
                ir.gen_movcond(ty, dest, tmp, zero, dest, frm, Cond::Ge);
            }
        }

        if p == Precision::Half {
            ir.gen_andi(Type::I32, dest, dest, 0xffff);
        }
        self.vfp_store_reg(ir, dest, a.vd, p);
        Ok(true)
    }
}
