//! `gen_*` emitters, one per opcode, mirroring QEMU's `tcg_gen_*`.
//!
//! Constant arguments (offsets, conditions, label ids, memops) are
//! stored in the argument array as raw `TempIdx` values.

use crate::context::Context;
use crate::op::Op;
use crate::opcode::Opcode;
use crate::temp::TempIdx;
use crate::types::{Cond, Type};

fn carg(val: u32) -> TempIdx {
    TempIdx(val)
}

/// `d = a <op> b`, plus the `*i` form taking an immediate.
macro_rules! binary {
    ($($name:ident, $namei:ident, $imm:ty => $opc:ident;)*) => {
        $(
            pub fn $name(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) -> TempIdx {
                self.emit(Opcode::$opc, ty, &[d, a, b]);
                d
            }

            pub fn $namei(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: $imm) -> TempIdx {
                let c = self.new_const(ty, imm as u64);
                self.$name(ty, d, a, c)
            }
        )*
    };
}

/// Loads from and stores to the CPU state at `base + offset`.
macro_rules! env_access {
    (load $($name:ident => $opc:ident;)*) => {
        $(
            pub fn $name(&mut self, ty: Type, dst: TempIdx, base: TempIdx, offset: i64) -> TempIdx {
                self.emit(Opcode::$opc, ty, &[dst, base, carg(offset as u32)]);
                dst
            }
        )*
    };
    (store $($name:ident => $opc:ident;)*) => {
        $(
            pub fn $name(&mut self, ty: Type, src: TempIdx, base: TempIdx, offset: i64) {
                self.emit(Opcode::$opc, ty, &[src, base, carg(offset as u32)]);
            }
        )*
    };
}

impl Context {
    fn emit(&mut self, opc: Opcode, ty: Type, args: &[TempIdx]) {
        let idx = self.next_op_idx();
        self.emit_op(Op::with_args(idx, opc, ty, args));
    }

    binary! {
        gen_add, gen_addi, i64 => Add;
        gen_and, gen_andi, u64 => And;
        gen_or, gen_ori, u64 => Or;
        gen_xor, gen_xori, u64 => Xor;
        gen_shl, gen_shli, u32 => Shl;
        gen_shr, gen_shri, u32 => Shr;
    }

    pub fn gen_mov(&mut self, ty: Type, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit(Opcode::Mov, ty, &[d, s]);
        d
    }

    pub fn gen_movi(&mut self, ty: Type, d: TempIdx, val: u64) -> TempIdx {
        let c = self.new_const(ty, val);
        self.gen_mov(ty, d, c)
    }

    /// `d = (src >> ofs) & ((1 << len) - 1)`
    pub fn gen_extract(&mut self, ty: Type, d: TempIdx, src: TempIdx, ofs: u32, len: u32) -> TempIdx {
        self.emit(Opcode::Extract, ty, &[d, src, carg(ofs), carg(len)]);
        d
    }

    /// `d = a` with bits `[ofs, ofs + len)` taken from `b`.
    #[allow(clippy::too_many_arguments)]
    pub fn gen_deposit(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
        ofs: u32,
        len: u32,
    ) -> TempIdx {
        self.emit(Opcode::Deposit, ty, &[d, a, b, carg(ofs), carg(len)]);
        d
    }

    /// `d = (c1 <cond> c2) ? v1 : v2`
    #[allow(clippy::too_many_arguments)]
    pub fn gen_movcond(
        &mut self,
        ty: Type,
        d: TempIdx,
        c1: TempIdx,
        c2: TempIdx,
        v1: TempIdx,
        v2: TempIdx,
        cond: Cond,
    ) -> TempIdx {
        self.emit(Opcode::MovCond, ty, &[d, c1, c2, v1, v2, carg(cond as u32)]);
        d
    }

    // -- Width changes --

    pub fn gen_ext_i32_i64(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit(Opcode::ExtI32I64, Type::I64, &[d, s]);
        d
    }

    pub fn gen_ext_u32_i64(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit(Opcode::ExtUI32I64, Type::I64, &[d, s]);
        d
    }

    pub fn gen_extrl_i64_i32(&mut self, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit(Opcode::ExtrlI64I32, Type::I32, &[d, s]);
        d
    }

    // -- CPU state --

    env_access! { load
        gen_ld => Ld;
        gen_ld8u => Ld8U;
        gen_ld8s => Ld8S;
        gen_ld16u => Ld16U;
        gen_ld16s => Ld16S;
    }

    env_access! { store
        gen_st => St;
        gen_st8 => St8;
        gen_st16 => St16;
        gen_st32 => St32;
        gen_st_vec => StVec;
    }

    /// Replicate the low `8 << vece` bits of `s` across the vector `d`.
    pub fn gen_dup_vec(&mut self, ty: Type, vece: u32, d: TempIdx, s: TempIdx) -> TempIdx {
        self.emit(Opcode::DupVec, ty, &[d, s, carg(vece)]);
        d
    }

    // -- Guest memory --

    pub fn gen_qemu_ld(&mut self, ty: Type, dst: TempIdx, addr: TempIdx, memop: u32) -> TempIdx {
        self.emit(Opcode::QemuLd, ty, &[dst, addr, carg(memop)]);
        dst
    }

    pub fn gen_qemu_st(&mut self, ty: Type, val: TempIdx, addr: TempIdx, memop: u32) {
        self.emit(Opcode::QemuSt, ty, &[val, addr, carg(memop)]);
    }

    // -- Control flow --

    pub fn gen_br(&mut self, label_id: u32) {
        self.label_mut(label_id).add_ref();
        self.emit(Opcode::Br, Type::I64, &[carg(label_id)]);
    }

    pub fn gen_brcond(&mut self, ty: Type, a: TempIdx, b: TempIdx, cond: Cond, label_id: u32) {
        self.label_mut(label_id).add_ref();
        self.emit(Opcode::BrCond, ty, &[a, b, carg(cond as u32), carg(label_id)]);
    }

    pub fn gen_brcondi(&mut self, ty: Type, a: TempIdx, imm: u64, cond: Cond, label_id: u32) {
        let c = self.new_const(ty, imm);
        self.gen_brcond(ty, a, c, cond, label_id);
    }

    pub fn gen_set_label(&mut self, label_id: u32) {
        self.label_mut(label_id).bind();
        self.emit(Opcode::SetLabel, Type::I64, &[carg(label_id)]);
    }

    pub fn gen_exit_tb(&mut self, val: u64) {
        self.emit(Opcode::ExitTb, Type::I64, &[carg(val as u32)]);
    }

    pub fn gen_goto_ptr(&mut self, ptr: TempIdx) {
        self.emit(Opcode::GotoPtr, Type::I64, &[ptr]);
    }

    pub fn gen_insn_start(&mut self, pc: u64) {
        self.emit(Opcode::InsnStart, Type::I64, &[carg(pc as u32), carg((pc >> 32) as u32)]);
    }

    // -- Helper calls --

    /// `dst = helper(args...)`. Unused argument slots are padded
    /// with a zero constant.
    pub fn gen_call(&mut self, dst: TempIdx, helper: u64, args: &[TempIdx]) -> TempIdx {
        let zero = self.new_const(Type::I64, 0);
        let mut full = [zero; 9];
        full[0] = dst;
        for (slot, &arg) in full[1..7].iter_mut().zip(args) {
            *slot = arg;
        }
        full[7] = carg(helper as u32);
        full[8] = carg((helper >> 32) as u32);
        self.emit(Opcode::Call, Type::I64, &full);
        dst
    }

    /// Call a helper whose return value is unused.
    pub fn gen_call_void(&mut self, helper: u64, args: &[TempIdx]) {
        let discard = self.new_temp(Type::I64);
        self.gen_call(discard, helper, args);
    }
}
