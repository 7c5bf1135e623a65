use tcg_core::label::*;

#[test]
fn label_new() {
    let l = Label::new(0);
    assert_eq!(l.id, 0);
    assert!(!l.is_present());
    assert!(!l.is_well_formed());
    assert_eq!(l.refs, 0);
}

#[test]
fn label_forward_reference() {
    let mut l = Label::new(1);
    l.add_ref();
    l.add_ref();
    assert_eq!(l.refs, 2);
    assert!(!l.is_present());

    l.bind();
    assert!(l.is_present());
    assert!(l.is_well_formed());
}

#[test]
fn label_bound_twice_is_malformed() {
    let mut l = Label::new(2);
    l.bind();
    l.bind();
    assert!(l.is_present());
    assert!(!l.is_well_formed());
    assert_eq!(l.binds, 2);
}

#[test]
fn label_without_refs_is_fine() {
    let mut l = Label::new(3);
    l.bind();
    assert!(l.is_well_formed());
    assert_eq!(l.refs, 0);
}
