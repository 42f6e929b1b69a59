use proptest::prelude::*;

use innerc_ir::test::fixtures::{Bag, Nat};
use innerc_ir::{DataEquation, FunctionSymbol, Sort};

use crate::test::helpers::{Scheduled, decide, with_equations};
use crate::{MatchTree, Resolution, Sequence, StrategyStep, TreeBuilder, TreeView};

fn tree_for(s: &Scheduled, op: innerc_ir::OpId, arity: usize, group: usize) -> MatchTree {
    let strategy = s.table.get(op).unwrap().for_arity(arity).unwrap();
    strategy
        .steps()
        .iter()
        .filter_map(|step| match step {
            StrategyStep::Tree(tree) => Some(tree.clone()),
            StrategyStep::Normalize(_) => None,
        })
        .nth(group)
        .unwrap()
}

/// `p: Nat -> Nat` with the given equations over the Nat signature.
fn with_p(n: &Nat, build: impl Fn(&FunctionSymbol) -> Vec<DataEquation>) -> (Scheduled, FunctionSymbol) {
    let p = FunctionSymbol::new("p", Sort::arrow(vec![n.nat.clone()], n.nat.clone()));
    let mut base = n.signature();
    base.add_mapping(p.clone());
    (Scheduled::new(&with_equations(&base, build(&p))), p)
}

#[test]
fn test_single_rule() {
    let n = Nat::new();
    let s = Scheduled::new(&n.spec());
    let pred = s.op(&n.pred);
    let succ = s.op(&n.succ);
    let zero = s.op(&n.zero);
    let x = s.pool.symbols().lookup_var(&n.x).unwrap();

    // pred(0) = 0 and pred(s(x)) = x share one tree once argument 0 is normal.
    let tree = tree_for(&s, pred, 1, 0);
    let expected = MatchTree::Function {
        op: zero,
        arity: 0,
        then: Box::new(MatchTree::Return(Resolution { rule: 0, bindings: vec![] })),
        otherwise: Box::new(MatchTree::Function {
            op: succ,
            arity: 1,
            then: Box::new(MatchTree::Store {
                slot: 0,
                then: Box::new(MatchTree::Return(Resolution { rule: 1, bindings: vec![(x, 0)] })),
            }),
            otherwise: Box::new(MatchTree::Fail),
        }),
    };
    assert_eq!(tree, expected, "\n{}", TreeView::new(&tree, s.pool.symbols()).render());
}

#[test]
fn test_specific_rule_declared_first_wins() {
    let n = Nat::new();
    let (s, p) = with_p(&n, |p| {
        let p_of = |e| innerc_ir::DataExpr::call(p, vec![e]);
        vec![
            DataEquation::new(vec![n.x.clone()], p_of(n.s(n.vx())), n.num(1)),
            DataEquation::new(vec![n.x.clone()], p_of(n.vx()), n.zero()),
        ]
    });
    let succ = s.op(&n.succ);
    let tree = tree_for(&s, s.op(&p), 1, 0);
    let expected = MatchTree::Function {
        op: succ,
        arity: 1,
        then: Box::new(MatchTree::Return(Resolution { rule: 0, bindings: vec![] })),
        otherwise: Box::new(MatchTree::Return(Resolution { rule: 1, bindings: vec![] })),
    };
    assert_eq!(tree, expected, "\n{}", TreeView::new(&tree, s.pool.symbols()).render());
}

#[test]
fn test_general_rule_declared_first_wins() {
    let n = Nat::new();
    let (s, p) = with_p(&n, |p| {
        let p_of = |e| innerc_ir::DataExpr::call(p, vec![e]);
        vec![
            DataEquation::new(vec![n.x.clone()], p_of(n.vx()), n.zero()),
            DataEquation::new(vec![n.x.clone()], p_of(n.s(n.vx())), n.num(1)),
        ]
    });
    let strategy = s.table.get(s.op(&p)).unwrap().for_arity(1).unwrap();
    assert_eq!(strategy.steps()[0], StrategyStep::Tree(MatchTree::Return(Resolution { rule: 0, bindings: vec![] })));
}

#[test]
fn test_nonlinear_match_keeps_priority() {
    let bag = Bag::new();
    let s = Scheduled::new(&bag.spec());
    let count = s.op(&bag.count);
    let insert = s.op(&bag.insert);
    let rules = s.rules.for_op(count);
    let (r_same, r_other) = (rules[1].priority(), rules[2].priority());

    let tree = tree_for(&s, count, 2, 1);
    // store e; next; insert test; match against e decides between the two rules
    let MatchTree::Store { slot: 0, then } = &tree else { panic!("{tree:?}") };
    let MatchTree::Next(then) = then.as_ref() else { panic!("{then:?}") };
    let MatchTree::Function { op, arity: 2, then, otherwise } = then.as_ref() else { panic!("{then:?}") };
    assert_eq!(*op, insert);
    assert_eq!(**otherwise, MatchTree::Fail);
    let MatchTree::Match { slot: 0, then, otherwise } = then.as_ref() else { panic!("{then:?}") };
    assert_eq!(then.rules(), vec![r_same]);
    assert_eq!(otherwise.rules(), vec![r_other]);
}

#[test]
fn test_conditional_rule_falls_through() {
    let n = Nat::new();
    let s = Scheduled::new(&n.spec());
    let fact = s.op(&n.fact);
    let x = s.pool.symbols().lookup_var(&n.x).unwrap();
    let rules = s.rules.for_op(fact);

    let tree = tree_for(&s, fact, 1, 0);
    // x is stored before the test on 0 because the conditional rule needs it
    let MatchTree::Store { slot: 0, then } = &tree else { panic!("{tree:?}") };
    let MatchTree::Function { then, otherwise, .. } = then.as_ref() else { panic!("{then:?}") };
    assert_eq!(**then, MatchTree::Return(Resolution { rule: rules[0].priority(), bindings: vec![] }));
    let expected = MatchTree::Check {
        resolution: Resolution { rule: rules[1].priority(), bindings: vec![(x, 0)] },
        otherwise: Box::new(MatchTree::Fail),
    };
    assert_eq!(**otherwise, expected);
}

#[test]
fn test_merge_order_does_not_change_rules() {
    let bag = Bag::new();
    let s = Scheduled::new(&bag.spec());
    let count = s.op(&bag.count);
    let rules = s.rules.for_op(count);
    let sequences: Vec<Sequence> = rules[1..].iter().map(|r| Sequence::new(&s.pool, r)).collect();
    let reversed: Vec<Sequence> = sequences.iter().rev().cloned().collect();

    let forward = TreeBuilder::new(&sequences, vec![false; 2]).build();
    let backward = TreeBuilder::new(&reversed, vec![false; 2]).build();
    assert_eq!(forward, backward);
}

/// `gt(x, x) = false` declared before the three structural `gt` rules.
fn overlapping_gt(n: &Nat) -> Scheduled {
    let mut equations = vec![DataEquation::new(vec![n.x.clone()], n.gt(n.vx(), n.vx()), n.ff())];
    equations.extend(n.equations().into_iter().filter(|eq| eq.lhs().spine().0 == &innerc_ir::DataExpr::func(&n.gt)));
    Scheduled::new(&with_equations(&n.signature(), equations))
}

proptest! {
    #[test]
    fn test_merge_order_does_not_change_decisions(
        order in Just((0..4).collect::<Vec<usize>>()).prop_shuffle(),
        left in 0usize..3,
        right in 0usize..3,
    ) {
        let n = Nat::new();
        let mut s = overlapping_gt(&n);
        let rules = s.rules.for_op(s.op(&n.gt)).to_vec();
        prop_assert_eq!(rules.len(), 4);

        let sequences: Vec<Sequence> = rules.iter().map(|r| Sequence::new(&s.pool, r)).collect();
        let shuffled: Vec<Sequence> = order.iter().map(|&i| sequences[i].clone()).collect();
        let declared = TreeBuilder::new(&sequences, vec![false; 4]).build();
        let merged = TreeBuilder::new(&shuffled, vec![false; 4]).build();

        let args = [s.pool.to_internal(&n.num(left)).unwrap(), s.pool.to_internal(&n.num(right)).unwrap()];
        let expected = if left == right { 0 } else if left == 0 { 1 } else if right == 0 { 2 } else { 3 };
        prop_assert_eq!(decide(&s.pool, &declared, &args), Some(rules[expected].priority()));
        prop_assert_eq!(decide(&s.pool, &merged, &args), Some(rules[expected].priority()));
    }
}

#[test]
fn test_slots() {
    let bag = Bag::new();
    let s = Scheduled::new(&bag.spec());
    let tree = tree_for(&s, s.op(&bag.count), 2, 1);
    // e and rest; the slot of d is never consulted but keeps its number
    assert_eq!(tree.slots(), 3);
}

#[test]
fn test_render() {
    let n = Nat::new();
    let s = Scheduled::new(&n.spec());
    let tree = tree_for(&s, s.op(&n.pred), 1, 0);
    let rendered = TreeView::new(&tree, s.pool.symbols()).render();
    assert!(rendered.starts_with("function 0/0"), "{rendered}");
    assert!(rendered.contains("then: return rule 0 []"), "{rendered}");
    assert!(rendered.contains("else: function s/1"), "{rendered}");
    assert!(rendered.contains("return rule 1 [x=#0]"), "{rendered}");
}
