use crate::types::Type;

/// Argument layout of an opcode.
///
/// Every op stores its outputs first, then its inputs, then its
/// constant arguments; these counts tell `Op` where each run starts.
#[derive(Debug, Clone, Copy)]
pub struct OpDef {
    pub name: &'static str,
    pub nb_oargs: u8,
    pub nb_iargs: u8,
    pub nb_cargs: u8,
}

impl OpDef {
    pub const fn nb_args(&self) -> u8 {
        self.nb_oargs + self.nb_iargs + self.nb_cargs
    }
}

macro_rules! opcodes {
    (@int int) => { true };
    (@int fixed) => { false };
    ($($(#[$doc:meta])* $variant:ident = $name:literal ($o:literal, $i:literal, $c:literal) $width:ident;)*) => {
        /// IR opcodes emitted by the VFP translator.
        ///
        /// Ops tagged `int` work on either integer width; the width
        /// is carried in `Op::op_type`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $($(#[$doc])* $variant,)*
        }

        /// Argument layout table, indexed by `Opcode as usize`.
        pub static OPCODE_DEFS: &[OpDef] = &[
            $(OpDef { name: $name, nb_oargs: $o, nb_iargs: $i, nb_cargs: $c },)*
        ];

        impl Opcode {
            /// Every opcode, in table order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant),*];

            /// Whether the op works on I32 or I64 alike.
            pub const fn is_int_polymorphic(self) -> bool {
                match self {
                    $(Opcode::$variant => opcodes!(@int $width),)*
                }
            }
        }
    };
}

opcodes! {
    Mov = "mov" (1, 1, 0) int;
    /// `d = c1 <cond> c2 ? v1 : v2`
    MovCond = "movcond" (1, 4, 1) int;
    Add = "add" (1, 2, 0) int;
    And = "and" (1, 2, 0) int;
    Or = "or" (1, 2, 0) int;
    Xor = "xor" (1, 2, 0) int;
    Shl = "shl" (1, 2, 0) int;
    Shr = "shr" (1, 2, 0) int;
    /// Unsigned bit-field extract; cargs are (ofs, len).
    Extract = "extract" (1, 1, 2) int;
    /// Bit-field insert; cargs are (ofs, len).
    Deposit = "deposit" (1, 2, 2) int;
    ExtI32I64 = "ext_i32_i64" (1, 1, 0) fixed;
    ExtUI32I64 = "extu_i32_i64" (1, 1, 0) fixed;
    ExtrlI64I32 = "extrl_i64_i32" (1, 1, 0) fixed;
    // CPU state loads and stores; the carg is the env offset.
    Ld8U = "ld8u" (1, 1, 1) int;
    Ld8S = "ld8s" (1, 1, 1) int;
    Ld16U = "ld16u" (1, 1, 1) int;
    Ld16S = "ld16s" (1, 1, 1) int;
    Ld = "ld" (1, 1, 1) int;
    St8 = "st8" (0, 2, 1) int;
    St16 = "st16" (0, 2, 1) int;
    St32 = "st32" (0, 2, 1) int;
    St = "st" (0, 2, 1) int;
    /// Guest memory load; the carg is a `MemOp`.
    QemuLd = "qemu_ld" (1, 1, 1) int;
    QemuSt = "qemu_st" (0, 2, 1) int;
    Br = "br" (0, 0, 1) fixed;
    /// cargs are (cond, label).
    BrCond = "brcond" (0, 2, 2) int;
    SetLabel = "set_label" (0, 0, 1) fixed;
    ExitTb = "exit_tb" (0, 0, 1) fixed;
    GotoPtr = "goto_ptr" (0, 1, 0) fixed;
    /// Helper call: one result, six argument slots, and the helper
    /// address split into two cargs.
    Call = "call" (1, 6, 2) fixed;
    /// Guest instruction boundary; cargs are the pc halves.
    InsnStart = "insn_start" (0, 0, 2) fixed;
    /// Replicate the low `8 << vece` bits into every lane.
    DupVec = "dup_vec" (1, 1, 1) fixed;
    StVec = "st_vec" (0, 2, 1) fixed;
}

impl Opcode {
    pub fn def(self) -> &'static OpDef {
        &OPCODE_DEFS[self as usize]
    }

    /// The width an op always works at, when it is not polymorphic.
    pub fn fixed_type(self) -> Option<Type> {
        match self {
            Opcode::ExtI32I64 | Opcode::ExtUI32I64 => Some(Type::I64),
            Opcode::ExtrlI64I32 => Some(Type::I32),
            _ => None,
        }
    }
}
