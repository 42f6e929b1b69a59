use innerc_ir::{TermId, VarId};

use crate::Substitution;

#[test]
fn test_grows_on_demand() {
    let mut s = Substitution::new();
    assert!(s.is_empty());
    s.set(VarId(7), TermId(3));
    assert_eq!(s.get(VarId(7)), Some(TermId(3)));
    assert_eq!(s.get(VarId(6)), None);
    assert_eq!(s.get(VarId(100)), None);
    assert_eq!(s.len(), 1);
}

#[test]
fn test_clear() {
    let mut s = Substitution::new();
    s.set(VarId(0), TermId(1));
    s.set(VarId(1), TermId(2));
    s.clear(VarId(0));
    s.clear(VarId(42));
    assert_eq!(s.get(VarId(0)), None);
    assert_eq!(s.get(VarId(1)), Some(TermId(2)));

    s.clear_all();
    assert!(s.is_empty());
}
