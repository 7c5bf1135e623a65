//! Generic 2- and 3-operand VFP emission with legacy short-vector
//! iteration.
//!
//! With FPSCR.LEN nonzero and a destination outside the scalar bank,
//! an instruction repeats LEN+1 times, stepping the registers by
//! STRIDE+1 within their bank. A scalar-bank `vm` stays fixed.

use super::features::IsarFeatures;
use super::regs::{advance, is_scalar_bank, Precision};
use super::ArmDisasContext;
use tcg_core::{Context, TempIdx};

/// `fd = op(f0, f1)` under float status `fpst`.
pub(crate) type Vfp3OpFn = fn(&mut Context, Precision, TempIdx, TempIdx, TempIdx, TempIdx);

/// `fd = op(f0)`; the last argument is the env pointer.
pub(crate) type Vfp2OpFn = fn(&mut Context, Precision, TempIdx, TempIdx, TempIdx);

/// Iteration plan for one short-vector instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VecPlan {
    /// Extra iterations after the first.
    pub veclen: u32,
    pub delta_d: i32,
    /// Zero when `vm` is a scalar operand.
    pub delta_m: i32,
}

impl ArmDisasContext {
    /// Feature gate for an FP data-processing instruction on the
    /// registers whose numbers are OR-ed together in `regs`.
    pub(crate) fn vfp_precision_ok(&self, p: Precision, regs: u32) -> bool {
        match p {
            Precision::Half => self.has(IsarFeatures::FP16_ARITH),
            Precision::Single => self.has(IsarFeatures::FPSP_V2),
            Precision::Double => self.has(IsarFeatures::FPDP_V2) && self.dregs_ok(regs),
        }
    }

    /// UNDEF on D16-D31 when they don't exist.
    pub(crate) fn dregs_ok(&self, regs: u32) -> bool {
        self.has(IsarFeatures::SIMD_R32) || regs & 0x10 == 0
    }

    /// Whether the current LEN/STRIDE is acceptable. Half precision
    /// is v8-only, where short vectors don't exist.
    pub(crate) fn short_vector_ok(&self, p: Precision) -> bool {
        let vector = self.vec_len != 0 || self.vec_stride != 0;
        match p {
            Precision::Half => !vector,
            _ => !vector || self.has(IsarFeatures::FPSHVEC),
        }
    }

    pub(crate) fn vec_plan(&self, p: Precision, vd: u32, vm: u32) -> VecPlan {
        let scalar = VecPlan {
            veclen: 0,
            delta_d: 0,
            delta_m: 0,
        };
        if p == Precision::Half || self.vec_len == 0 || is_scalar_bank(vd, p) {
            return scalar;
        }
        let delta_d = match p {
            Precision::Double => (self.vec_stride >> 1) + 1,
            _ => self.vec_stride + 1,
        } as i32;
        VecPlan {
            veclen: self.vec_len,
            delta_d,
            delta_m: if is_scalar_bank(vm, p) { 0 } else { delta_d },
        }
    }

    pub(crate) fn do_vfp_3op(
        &mut self,
        ir: &mut Context,
        op: Vfp3OpFn,
        p: Precision,
        (mut vd, mut vn, mut vm): (u32, u32, u32),
        reads_vd: bool,
    ) -> bool {
        if !self.vfp_precision_ok(p, vd | vn | vm) || !self.short_vector_ok(p) {
            return false;
        }
        if !self.vfp_access_check(ir) {
            return true;
        }

        let VecPlan {
            mut veclen,
            delta_d,
            delta_m,
        } = self.vec_plan(p, vd, vm);

        let f0 = self.vfp_load_reg(ir, vn, p);
        let f1 = self.vfp_load_reg(ir, vm, p);
        let fd = ir.new_temp(p.ir_type());
        let fpst = self.fpstatus_for(ir, p);

        loop {
            if reads_vd {
                self.vfp_load_reg_into(ir, fd, vd, p);
            }
            op(ir, p, fd, f0, f1, fpst);
            self.vfp_store_reg(ir, fd, vd, p);

            if veclen == 0 {
                break;
            }
            veclen -= 1;
            vd = advance(vd, p, delta_d);
            vn = advance(vn, p, delta_d);
            self.vfp_load_reg_into(ir, f0, vn, p);
            if delta_m != 0 {
                vm = advance(vm, p, delta_m);
                self.vfp_load_reg_into(ir, f1, vm, p);
            }
        }
        true
    }

    pub(crate) fn do_vfp_2op(
        &mut self,
        ir: &mut Context,
        op: Vfp2OpFn,
        p: Precision,
        mut vd: u32,
        mut vm: u32,
    ) -> bool {
        if !self.vfp_precision_ok(p, vd | vm) || !self.short_vector_ok(p) {
            return false;
        }
        if !self.vfp_access_check(ir) {
            return true;
        }

        let VecPlan {
            mut veclen,
            delta_d,
            delta_m,
        } = self.vec_plan(p, vd, vm);

        let f0 = self.vfp_load_reg(ir, vm, p);
        let fd = ir.new_temp(p.ir_type());

        loop {
            op(ir, p, fd, f0, self.env);
            self.vfp_store_reg(ir, fd, vd, p);

            if veclen == 0 {
                break;
            }
            if delta_m == 0 {
                // Scalar source: one result, many destinations.
                for _ in 0..veclen {
                    vd = advance(vd, p, delta_d);
                    self.vfp_store_reg(ir, fd, vd, p);
                }
                break;
            }
            veclen -= 1;
            vd = advance(vd, p, delta_d);
            vm = advance(vm, p, delta_m);
            self.vfp_load_reg_into(ir, f0, vm, p);
        }
        true
    }
}
