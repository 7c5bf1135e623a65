use tcg_core::types::*;

#[test]
fn type_sizes() {
    assert_eq!(Type::I32.size_bits(), 32);
    assert_eq!(Type::I64.size_bits(), 64);
    assert_eq!(Type::V64.size_bits(), 64);
    assert_eq!(Type::V128.size_bits(), 128);

    assert_eq!(Type::I32.size_bytes(), 4);
    assert_eq!(Type::V128.size_bytes(), 16);
}

const ALL_CONDS: [Cond; 12] = [
    Cond::Never,
    Cond::Always,
    Cond::Eq,
    Cond::Ne,
    Cond::Lt,
    Cond::Ge,
    Cond::Le,
    Cond::Gt,
    Cond::Ltu,
    Cond::Geu,
    Cond::Leu,
    Cond::Gtu,
];

#[test]
fn cond_invert() {
    assert_eq!(Cond::Eq.invert(), Cond::Ne);
    assert_eq!(Cond::Ge.invert(), Cond::Lt);
    assert_eq!(Cond::Gt.invert(), Cond::Le);
    assert_eq!(Cond::Ltu.invert(), Cond::Geu);
    assert_eq!(Cond::Never.invert(), Cond::Always);
}

#[test]
fn cond_invert_is_involution() {
    for c in ALL_CONDS {
        assert_eq!(c.invert().invert(), c, "{c:?}");
        assert_ne!(c.invert(), c, "{c:?}");
    }
}

#[test]
fn cond_raw_encoding() {
    for c in ALL_CONDS {
        assert_eq!(Cond::from_raw(c as u32), Some(c));
    }
    assert_eq!(Cond::from_raw(2), None);
    assert_eq!(Cond::from_raw(18), None);
    assert_eq!(Cond::Geu.name(), "geu");
}

#[test]
fn memop_sizes() {
    assert_eq!(MemOp::uw().size_bytes(), 2);
    assert_eq!(MemOp::ul().size_bytes(), 4);
    assert_eq!(MemOp::uq().size_bytes(), 8);
    assert!(!MemOp::ul().is_signed());
    assert!(MemOp::new(MemOp::SIZE_16 | MemOp::SIGN).is_signed());
}

#[test]
fn memop_aligned() {
    let op = MemOp::ul().aligned();
    assert!(op.is_aligned());
    assert!(!MemOp::ul().is_aligned());
    assert_eq!(op.size(), MemOp::SIZE_32);
    assert_eq!(u32::from(op), (MemOp::SIZE_32 | MemOp::ALIGN) as u32);
}
