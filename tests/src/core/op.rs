use tcg_core::op::*;
use tcg_core::opcode::Opcode;
use tcg_core::temp::TempIdx;
use tcg_core::types::Type;

#[test]
fn op_arg_slices() {
    // add: 1 oarg, 2 iargs
    let args = [TempIdx(10), TempIdx(20), TempIdx(30)];
    let op = Op::with_args(OpIdx(0), Opcode::Add, Type::I32, &args);

    assert_eq!(op.nargs, 3);
    assert_eq!(op.oargs(), &[TempIdx(10)]);
    assert_eq!(op.iargs(), &[TempIdx(20), TempIdx(30)]);
    assert!(op.cargs().is_empty());
}

#[test]
fn op_arg_slices_with_cargs() {
    // brcond: 2 iargs, then (cond, label)
    let args = [TempIdx(1), TempIdx(2), TempIdx(3), TempIdx(4)];
    let op = Op::with_args(OpIdx(0), Opcode::BrCond, Type::I32, &args);

    assert!(op.oargs().is_empty());
    assert_eq!(op.iargs(), &[TempIdx(1), TempIdx(2)]);
    assert_eq!(op.carg(0), 3);
    assert_eq!(op.carg(1), 4);
}

#[test]
fn op_call_layout() {
    let args: Vec<TempIdx> = (0..9).map(TempIdx).collect();
    let op = Op::with_args(OpIdx(7), Opcode::Call, Type::I64, &args);
    assert_eq!(op.idx, OpIdx(7));
    assert_eq!(op.oargs(), &[TempIdx(0)]);
    assert_eq!(op.iargs().len(), 6);
    assert_eq!(op.carg(0), 7);
    assert_eq!(op.carg(1), 8);
}

#[test]
fn op_with_args_truncates() {
    let args: Vec<TempIdx> = (0..12).map(TempIdx).collect();
    let op = Op::with_args(OpIdx(0), Opcode::Call, Type::I64, &args);
    assert_eq!(op.nargs as usize, MAX_OP_ARGS);
}
