use test_case::test_case;

use crate::Sort;

fn nat() -> Sort {
    Sort::basic("Nat")
}

fn endo() -> Sort {
    Sort::arrow(vec![nat()], nat())
}

#[test_case(nat(), 0 ; "basic")]
#[test_case(endo(), 1 ; "unary")]
#[test_case(Sort::arrow(vec![nat(), nat()], Sort::bool()), 2 ; "binary")]
#[test_case(Sort::arrow(vec![nat()], endo()), 2 ; "curried")]
#[test_case(Sort::arrow(vec![endo(), nat()], nat()), 2 ; "higher order argument counts once")]
fn test_arity(sort: Sort, expected: usize) {
    assert_eq!(sort.arity(), expected);
}

#[test]
fn test_arrow_with_empty_domain_is_codomain() {
    assert_eq!(Sort::arrow(vec![], nat()), nat());
}

#[test]
fn test_applied_partially() {
    let binary = Sort::arrow(vec![nat(), Sort::bool()], nat());
    assert_eq!(binary.applied(0), Some(binary.clone()));
    assert_eq!(binary.applied(1), Some(Sort::arrow(vec![Sort::bool()], nat())));
    assert_eq!(binary.applied(2), Some(nat()));
    assert_eq!(binary.applied(3), None);
}

#[test]
fn test_applied_through_nested_arrows() {
    let curried = Sort::arrow(vec![nat()], endo());
    assert_eq!(curried.applied(1), Some(endo()));
    assert_eq!(curried.applied(2), Some(nat()));
    assert_eq!(curried.argument_sorts(), vec![&nat(), &nat()]);
    assert_eq!(curried.target(), &nat());
}

#[test]
fn test_display() {
    let sort = Sort::arrow(vec![endo(), nat()], Sort::bool());
    assert_eq!(sort.to_string(), "(Nat -> Nat) # Nat -> Bool");
}
