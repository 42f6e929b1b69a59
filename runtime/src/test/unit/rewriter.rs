//! Behavior shared by both backends.

use test_case::test_case;

use innerc_ir::test::fixtures::{Bag, Curried, HigherOrder, Nat};
use innerc_ir::{DataEquation, FunctionSymbol, Sort, Variable};

use crate::test::helpers::{rewriter, with_equations};
use crate::{Backend, Stage};

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_factorial(backend: Backend) {
    let n = Nat::new();
    let mut r = rewriter(&n.spec(), backend);
    assert_eq!(r.rewrite(&n.fact(n.num(3))).unwrap(), n.num(6));
    assert_eq!(r.rewrite(&n.fact(n.zero())).unwrap(), n.num(1));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_arithmetic(backend: Backend) {
    let n = Nat::new();
    let mut r = rewriter(&n.spec(), backend);
    assert_eq!(r.rewrite(&n.plus(n.num(2), n.num(3))).unwrap(), n.num(5));
    assert_eq!(r.rewrite(&n.times(n.num(2), n.num(3))).unwrap(), n.num(6));
    assert_eq!(r.rewrite(&n.pred(n.zero())).unwrap(), n.zero());
    assert_eq!(r.rewrite(&n.if_(n.gt(n.num(1), n.num(2)), n.num(1), n.num(2))).unwrap(), n.num(2));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_bag_membership(backend: Backend) {
    let bag = Bag::new();
    let mut r = rewriter(&bag.spec(), backend);
    let items = bag.of(&[&bag.a, &bag.b, &bag.a]);

    assert_eq!(r.rewrite(&bag.count(bag.elem(&bag.a), items.clone())).unwrap(), bag.nat.num(2));
    assert_eq!(r.rewrite(&bag.in_(bag.elem(&bag.a), items.clone())).unwrap(), bag.nat.tt());
    assert_eq!(r.rewrite(&bag.in_(bag.elem(&bag.c), items)).unwrap(), bag.nat.ff());
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_first_declared_rule_wins(backend: Backend) {
    let n = Nat::new();
    let vars = vec![n.x.clone()];
    let general = DataEquation::new(vars.clone(), n.pred(n.vx()), n.zero());
    let specific = DataEquation::new(vars, n.pred(n.s(n.vx())), n.vx());
    let term = n.pred(n.num(2));

    let mut r = rewriter(&with_equations(&n.signature(), vec![general.clone(), specific.clone()]), backend);
    assert_eq!(r.rewrite(&term).unwrap(), n.zero());

    let mut r = rewriter(&with_equations(&n.signature(), vec![specific, general]), backend);
    assert_eq!(r.rewrite(&term).unwrap(), n.num(1));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_shorter_rule_applies_to_remaining_arguments(backend: Backend) {
    let c = Curried::new();
    let (a, b) = (c.constant(&c.a), c.constant(&c.b));
    let applied = c.f2(a.clone(), b.clone());

    let mut r = rewriter(&c.spec(vec![c.short_rule(), c.long_rule()]), backend);
    assert_eq!(r.rewrite(&applied).unwrap(), c.g(b.clone()));
    assert_eq!(r.rewrite(&c.f(a.clone())).unwrap(), c.constant(&c.g));

    let mut r = rewriter(&c.spec(vec![c.long_rule(), c.short_rule()]), backend);
    assert_eq!(r.rewrite(&applied).unwrap(), c.constant(&c.c));
    assert_eq!(r.rewrite(&c.f(a.clone())).unwrap(), c.constant(&c.g));

    let mut r = rewriter(&c.spec(vec![c.short_rule()]), backend);
    assert_eq!(r.rewrite(&applied).unwrap(), c.g(b.clone()));

    // the applied result is rewritten again: g(b) -> b
    let mut r = rewriter(&c.spec(vec![c.short_rule(), c.identity_rule()]), backend);
    assert_eq!(r.rewrite(&applied).unwrap(), b.clone());
    assert_eq!(r.rewrite(&c.f2(a, c.g(b.clone()))).unwrap(), b);
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_invalid_equation_is_dropped(backend: Backend) {
    let n = Nat::new();
    let r = rewriter(&n.spec(), backend);
    assert_eq!(r.compiled_rule_count(&n.pred), 2);

    let mut equations = n.equations();
    // pred(x) = y: y does not occur in the left-hand side
    equations.insert(2, DataEquation::new(vec![n.x.clone(), n.y.clone()], n.pred(n.vx()), n.vy()));
    let mut r = rewriter(&with_equations(&n.signature(), equations), backend);
    assert_eq!(r.compiled_rule_count(&n.pred), 2);
    assert_eq!(r.rewrite(&n.pred(n.num(2))).unwrap(), n.num(1));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_substitution_scoping(backend: Backend) {
    let n = Nat::new();
    let mut r = rewriter(&n.spec(), backend);
    let term = n.plus(n.vx(), n.num(1));

    r.set_substitution(&n.x, &n.num(2)).unwrap();
    assert_eq!(r.get_substitution(&n.x).unwrap(), Some(n.num(2)));
    assert_eq!(r.rewrite(&term).unwrap(), n.num(3));

    r.clear_substitution(&n.x);
    assert_eq!(r.get_substitution(&n.x).unwrap(), None);
    assert_eq!(r.rewrite(&term).unwrap(), n.s(n.vx()));

    r.set_substitution(&n.x, &n.num(1)).unwrap();
    r.set_substitution(&n.y, &n.num(1)).unwrap();
    r.clear_substitutions();
    assert_eq!(r.rewrite(&n.plus(n.vx(), n.vy())).unwrap(), n.plus(n.vx(), n.vy()));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_applied_variable(backend: Backend) {
    let h = HigherOrder::new();
    let n = &h.nat;
    let mut r = rewriter(&h.spec(), backend);
    assert_eq!(r.rewrite(&h.twice(h.add(n.num(1)), n.num(2))).unwrap(), n.num(4));

    r.set_substitution(&h.g, &h.add(n.num(2))).unwrap();
    let applied = innerc_ir::DataExpr::apply(innerc_ir::DataExpr::var(&h.g), vec![n.num(1)]);
    assert_eq!(r.rewrite(&applied).unwrap(), n.num(3));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_over_application_fails(backend: Backend) {
    let h = HigherOrder::new();
    let n = &h.nat;
    let mut r = rewriter(&h.spec(), backend);
    // g := s(s(0)) is not a partial application, so g(x) has too many arguments
    let err = r.rewrite(&h.twice(n.plus(n.num(1), n.num(1)), n.zero())).unwrap_err();
    assert_eq!(err.stage(), Stage::Rewriting, "{err}");

    // the rewriter stays usable
    assert_eq!(r.rewrite(&n.plus(n.num(1), n.num(1))).unwrap(), n.num(2));
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_declaration_order_of_disjoint_rules(backend: Backend) {
    let n = Nat::new();
    let mut reversed = n.equations();
    reversed.reverse();
    let mut forward = rewriter(&n.spec(), backend);
    let mut backward = rewriter(&with_equations(&n.signature(), reversed), backend);

    for term in [n.fact(n.num(3)), n.times(n.num(2), n.pred(n.num(3))), n.gt(n.num(2), n.num(2))] {
        assert_eq!(forward.rewrite(&term).unwrap(), backward.rewrite(&term).unwrap(), "{term}");
    }
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_rewrite_list(backend: Backend) {
    let n = Nat::new();
    let mut r = rewriter(&n.spec(), backend);
    let out = r.rewrite_list(&[n.plus(n.num(1), n.num(1)), n.vx(), n.fact(n.num(2))]).unwrap();
    assert_eq!(out, vec![n.num(2), n.vx(), n.num(2)]);
    assert_eq!(r.strategy(), backend);
}

#[test_case(Backend::Compiling ; "compiling")]
#[test_case(Backend::Interpreter ; "interpreter")]
fn test_internal_format(backend: Backend) {
    let n = Nat::new();
    let mut r = rewriter(&n.spec(), backend);
    let t = r.to_internal(&n.plus(n.num(1), n.num(2))).unwrap();
    let normal = r.rewrite_internal(t).unwrap();
    assert_eq!(r.from_internal(normal).unwrap(), n.num(3));
    assert_eq!(r.rewrite_internal(normal).unwrap(), normal);
    assert!(r.rewrite_internal(innerc_ir::TermId(u32::MAX - 1)).is_err());
}

#[test]
fn test_target_sort_ambiguity_is_fatal() {
    let n = Nat::new();
    let mut spec = n.spec();
    let unary = |target| FunctionSymbol::new("f", Sort::arrow(vec![n.nat.clone()], target));
    spec.add_mapping(unary(n.nat.clone())).add_mapping(unary(Sort::bool()));

    let err = crate::Rewriter::new(&spec, Backend::Interpreter).err().expect("ambiguous overload accepted");
    assert_eq!(err.stage(), Stage::SortInference, "{err}");
}

#[test]
fn test_unbound_condition_variable_uses_substitution() {
    let n = Nat::new();
    let z = Variable::new("z", n.nat.clone());
    // pred(x) = x if gt(z, 0); z is declared but never bound by the pattern
    let eq = DataEquation::with_condition(
        vec![n.x.clone(), z.clone()],
        n.gt(innerc_ir::DataExpr::var(&z), n.zero()),
        n.pred(n.vx()),
        n.vx(),
    );
    let mut equations = vec![eq];
    equations.extend(n.equations());
    let spec = with_equations(&n.signature(), equations);
    for backend in [Backend::Compiling, Backend::Interpreter] {
        let mut r = rewriter(&spec, backend);
        assert_eq!(r.rewrite(&n.pred(n.num(2))).unwrap(), n.num(1), "{backend}");
        r.set_substitution(&z, &n.num(1)).unwrap();
        assert_eq!(r.rewrite(&n.pred(n.num(2))).unwrap(), n.num(2), "{backend}");
    }
}
