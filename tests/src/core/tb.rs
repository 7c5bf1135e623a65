use tcg_core::tb::cflags::*;
use tcg_core::tb::*;

#[test]
fn tb_new() {
    let tb = TranslationBlock::new(0x1000, 0x40, 0);
    assert_eq!(tb.pc, 0x1000);
    assert_eq!(tb.flags, 0x40);
    assert_eq!(tb.size, 0);
    assert_eq!(tb.icount, 0);
    assert!(!tb.use_icount());
}

#[test]
fn tb_use_icount() {
    let tb = TranslationBlock::new(0, 0, CF_USE_ICOUNT);
    assert!(tb.use_icount());
}

#[test]
fn tb_max_insns_default() {
    assert_eq!(
        TranslationBlock::max_insns(0),
        tcg_core::context::MAX_INSNS as u32
    );
    assert_eq!(
        TranslationBlock::max_insns(CF_USE_ICOUNT),
        tcg_core::context::MAX_INSNS as u32
    );
}

#[test]
fn tb_max_insns_from_cflags() {
    assert_eq!(TranslationBlock::max_insns(1), 1);
    assert_eq!(TranslationBlock::max_insns(CF_USE_ICOUNT | 3), 3);
    assert_eq!(TranslationBlock::max_insns(CF_COUNT_MASK), 0xffff);
}
