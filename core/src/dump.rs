//! Text dump of a block's IR, in the layout of QEMU's `tcg_dump_ops()`.

use std::fmt::Write as _;
use std::io::Write;

use crate::context::Context;
use crate::op::Op;
use crate::opcode::Opcode;
use crate::temp::{TempIdx, TempKind};
use crate::types::{Cond, Type};

fn cond_name(raw: u32) -> &'static str {
    Cond::from_raw(raw).map_or("???", Cond::name)
}

fn push_temp(ctx: &Context, idx: TempIdx, buf: &mut String) {
    let i = idx.0;
    if i >= ctx.nb_temps() {
        let _ = write!(buf, "$0x{i:x}");
        return;
    }
    let t = ctx.temp(idx);
    let _ = match (t.kind, t.name) {
        (TempKind::Const, _) => write!(buf, "$0x{:x}", t.val),
        (TempKind::Global | TempKind::Fixed, Some(name)) => write!(buf, "{name}"),
        (TempKind::Global, None) => write!(buf, "g{i}"),
        (TempKind::Fixed, None) => write!(buf, "fixed({})", t.reg.unwrap_or(0)),
        (TempKind::Ebb, _) => write!(buf, "tmp{}", i - ctx.nb_globals()),
    };
}

/// Opcode name, with a width suffix for the `int` opcodes.
fn op_name(op: &Op) -> String {
    let name = op.opc.def().name;
    match (op.opc.is_int_polymorphic(), op.op_type) {
        (true, Type::I32) => format!("{name}_i32"),
        (true, Type::I64) => format!("{name}_i64"),
        _ => name.to_string(),
    }
}

fn format_op(
    ctx: &Context,
    op: &Op,
    helper_name: &impl Fn(u64) -> Option<&'static str>,
) -> String {
    let mut line = format!(" {}", op_name(op));
    let temps = op.oargs().iter().chain(op.iargs());
    for (n, &t) in temps.enumerate() {
        line.push_str(if n == 0 { " " } else { ", " });
        push_temp(ctx, t, &mut line);
    }

    let has_temps = !(op.oargs().is_empty() && op.iargs().is_empty());
    let cargs = op.cargs();
    let _ = match op.opc {
        Opcode::BrCond => write!(line, ", {}, L{}", cond_name(cargs[0].0), cargs[1].0),
        Opcode::MovCond => write!(line, ", {}", cond_name(cargs[0].0)),
        Opcode::Br => write!(line, " L{}", cargs[0].0),
        Opcode::Call => {
            let addr = (cargs[1].0 as u64) << 32 | cargs[0].0 as u64;
            match helper_name(addr) {
                Some(name) => write!(line, ", {name}"),
                None => write!(line, ", $0x{addr:x}"),
            }
        }
        _ => {
            for (n, c) in cargs.iter().enumerate() {
                line.push_str(if has_temps || n > 0 { ", " } else { " " });
                let _ = write!(line, "$0x{:x}", c.0);
            }
            Ok(())
        }
    };
    line
}

/// Dump all IR ops in `ctx` to `w`.
pub fn dump_ops(ctx: &Context, w: &mut impl Write) -> std::io::Result<()> {
    dump_ops_with(ctx, w, |_| None)
}

/// Dump IR ops, naming call targets through `helper_name`.
///
/// Calls whose target `helper_name` does not recognise are printed
/// as a raw address.
pub fn dump_ops_with(
    ctx: &Context,
    w: &mut impl Write,
    helper_name: impl Fn(u64) -> Option<&'static str>,
) -> std::io::Result<()> {
    for op in ctx.ops() {
        match op.opc {
            Opcode::InsnStart => {
                let pc = (op.carg(1) as u64) << 32 | op.carg(0) as u64;
                writeln!(w, " ---- 0x{pc:016x}")?;
                writeln!(w, " insn_start $0x{pc:x}")?;
            }
            Opcode::SetLabel => writeln!(w, " L{}:", op.carg(0))?,
            _ => writeln!(w, "{}", format_op(ctx, op, &helper_name))?,
        }
    }
    Ok(())
}
