//! Property-based checks over small, randomly generated three-valued
//! Boolean expressions, covering the invariants the reduced `Apply` family
//! and the `Reduce` operators are supposed to uphold for *any* input, not
//! just the handful of diagrams the unit tests build by hand.

use std::collections::HashSet;

use proptest::prelude::*;

use ternary_robdd::apply;
use ternary_robdd::edge::Edge;
use ternary_robdd::heuristic::{OneStepGreedy, RandomHeuristic, TwoStepGreedy};
use ternary_robdd::manager::Manager;
use ternary_robdd::reduce::reduce_by_valuation;
use ternary_robdd::{classical, driver};

const NUM_VARS: u32 = 3;

#[derive(Debug, Clone)]
enum Expr {
    One,
    Zero,
    Unknown,
    Var(u32),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        Just(Expr::One),
        Just(Expr::Zero),
        Just(Expr::Unknown),
        (0..NUM_VARS).prop_map(Expr::Var),
    ];
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::And(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Or(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::Xor(Box::new(a), Box::new(b))),
        ]
    })
}

/// Same shape as [`arb_expr`] but without the `Unknown` leaf: `MergeInterval`
/// is only meaningful over ordinary (two-valued) under/over-approximation
/// pairs, so the property test below builds its operands from this strategy.
fn arb_two_valued_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        Just(Expr::One),
        Just(Expr::Zero),
        (0..NUM_VARS).prop_map(Expr::Var),
    ];
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::And(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Or(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::Xor(Box::new(a), Box::new(b))),
        ]
    })
}

fn build(manager: &mut Manager, expr: &Expr) -> Edge {
    match expr {
        Expr::One => manager.one(),
        Expr::Zero => manager.zero(),
        Expr::Unknown => manager.unknown(),
        Expr::Var(v) => manager.variable(*v),
        Expr::Not(a) => classical::not(build(manager, a)),
        Expr::And(a, b) => {
            let av = build(manager, a);
            let bv = build(manager, b);
            classical::and(manager, av, bv)
        }
        Expr::Or(a, b) => {
            let av = build(manager, a);
            let bv = build(manager, b);
            classical::or(manager, av, bv)
        }
        Expr::Xor(a, b) => {
            let av = build(manager, a);
            let bv = build(manager, b);
            classical::xor(manager, av, bv)
        }
    }
}

/// The diagram for a single total point assignment, built as a conjunction
/// of literals so it can drive `reduce_by_valuation` to a terminal.
fn point_valuation(manager: &mut Manager, assignment: &[bool]) -> Edge {
    let mut v = manager.one();
    for (i, &bit) in assignment.iter().enumerate() {
        let lit = manager.variable(i as u32);
        let lit = if bit { lit } else { lit.not() };
        v = classical::and(manager, v, lit);
    }
    v
}

fn all_assignments(num_vars: usize) -> Vec<Vec<bool>> {
    (0..(1usize << num_vars)).map(|mask| (0..num_vars).map(|i| (mask >> i) & 1 == 1).collect()).collect()
}

/// True if `unknown` is reachable from `e`, including `e` itself. Memoizes
/// on regular nodes already explored, which is sound since the diagram is a
/// DAG with no cycles.
fn contains_unknown(manager: &Manager, e: Edge, visited: &mut HashSet<Edge>) -> bool {
    let r = e.regular();
    if r.is_unknown() {
        return true;
    }
    if r.is_one() || !visited.insert(r) {
        return false;
    }
    contains_unknown(manager, manager.raw_then(r), visited) || contains_unknown(manager, manager.raw_else(r), visited)
}

/// Walks every node reachable from `e` and asserts the canonical-form
/// invariant: a stored `then` edge is never complemented, and an `else`
/// edge is never complemented when `then` is `unknown`.
fn assert_canonical_form(manager: &Manager, e: Edge, visited: &mut HashSet<Edge>) {
    let r = e.regular();
    if r.is_constant() || !visited.insert(r) {
        return;
    }
    let t = manager.raw_then(r);
    let el = manager.raw_else(r);
    assert!(!t.is_complemented(), "then edge carries a complement bit");
    assert!(!(t.is_unknown() && el.is_complemented()), "unknown-then node has a complemented else edge");
    assert_canonical_form(manager, t, visited);
    assert_canonical_form(manager, el, visited);
}

/// Walks every node reachable from `e` and asserts the maxref flag is clear,
/// the state every reduced driver call is supposed to restore before
/// returning.
fn assert_flags_clear(manager: &Manager, e: Edge, visited: &mut HashSet<Edge>) {
    let r = e.regular();
    if r.is_constant() || !visited.insert(r) {
        return;
    }
    assert!(!manager.flag_is_set(r), "maxref flag left set after the driver call returned");
    assert_flags_clear(manager, manager.raw_then(r), visited);
    assert_flags_clear(manager, manager.raw_else(r), visited);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every diagram built through the exact classical operators already
    /// satisfies the canonical-form invariant (no negated `then`, no
    /// complemented `else` under an `unknown` `then`), since `canonical_node`
    /// is the sole node-construction path.
    #[test]
    fn canonical_form_holds_for_arbitrary_expressions(expr in arb_expr()) {
        let mut m = Manager::with_seed(NUM_VARS, 1);
        let r = build(&mut m, &expr);
        let mut visited = HashSet::new();
        assert_canonical_form(&m, r, &mut visited);
    }

    /// `AndReduced`/`OrReduced`/`XorReduced` never disagree with the exact
    /// classical result on a concrete, fully-assigned point: either they
    /// match it exactly, or they answer `unknown` there.
    #[test]
    fn reduced_binary_ops_are_sound_against_classical(
        lhs in arb_expr(), rhs in arb_expr(), limit in 0u32..24,
    ) {
        let mut m = Manager::with_seed(NUM_VARS, 7);
        let f = build(&mut m, &lhs);
        let g = build(&mut m, &rhs);

        let exact_and = classical::and(&mut m, f, g);
        let exact_or = classical::or(&mut m, f, g);
        let exact_xor = classical::xor(&mut m, f, g);

        let heu = OneStepGreedy;
        let reduced_and = driver::and_reduced(&mut m, f, g, &heu, limit).unwrap();
        let reduced_or = driver::or_reduced(&mut m, f, g, &heu, limit).unwrap();
        let reduced_xor = driver::xor_reduced(&mut m, f, g, &heu, limit).unwrap();

        for assignment in all_assignments(NUM_VARS as usize) {
            let point = point_valuation(&mut m, &assignment);
            for (exact, reduced) in [(exact_and, reduced_and), (exact_or, reduced_or), (exact_xor, reduced_xor)] {
                let exact_at_point = reduce_by_valuation(&mut m, exact, point);
                let reduced_at_point = reduce_by_valuation(&mut m, reduced, point);
                prop_assert!(
                    reduced_at_point == exact_at_point || reduced_at_point.is_unknown(),
                    "reduced result disagreed with classical result at a concrete point"
                );
            }
        }
    }

    /// Same soundness check for `IteReduced`, which has its own terminal
    /// cases distinct from the `And`/`Xor` core.
    #[test]
    fn reduced_ite_is_sound_against_classical(
        fe in arb_expr(), ge in arb_expr(), he in arb_expr(), limit in 0u32..24,
    ) {
        let mut m = Manager::with_seed(NUM_VARS, 9);
        let f = build(&mut m, &fe);
        let g = build(&mut m, &ge);
        let h = build(&mut m, &he);

        let exact = classical::ite(&mut m, f, g, h);
        let reduced = driver::ite_reduced(&mut m, f, g, h, &OneStepGreedy, limit).unwrap();

        for assignment in all_assignments(NUM_VARS as usize) {
            let point = point_valuation(&mut m, &assignment);
            let exact_at_point = reduce_by_valuation(&mut m, exact, point);
            let reduced_at_point = reduce_by_valuation(&mut m, reduced, point);
            prop_assert!(reduced_at_point == exact_at_point || reduced_at_point.is_unknown());
        }
    }

    /// `AndR`'s `consumed` count never exceeds the budget it was handed,
    /// for any traversal heuristic.
    #[test]
    fn and_r_never_overspends_its_budget(
        lhs in arb_expr(), rhs in arb_expr(), limit in 0u32..32, heuristic_pick in 0u8..3,
    ) {
        let mut m = Manager::with_seed(NUM_VARS, 5);
        let f = build(&mut m, &lhs);
        let g = build(&mut m, &rhs);
        let mut consumed = 0;
        let mut reduced = false;
        let result = match heuristic_pick {
            0 => apply::and_r(&mut m, f, g, &RandomHeuristic, limit, &mut consumed, &mut reduced),
            1 => apply::and_r(&mut m, f, g, &OneStepGreedy, limit, &mut consumed, &mut reduced),
            _ => apply::and_r(&mut m, f, g, &TwoStepGreedy, limit, &mut consumed, &mut reduced),
        };
        prop_assume!(result.is_some());
        prop_assert!(consumed <= limit, "and_r consumed {consumed} nodes against a budget of {limit}");
    }

    /// Whenever `and_r` reports that it had to collapse some subtree to
    /// `unknown` to stay inside its budget, that `unknown` is actually
    /// reachable from the edge it returned.
    #[test]
    fn and_r_reduced_flag_implies_unknown_is_reachable(
        lhs in arb_expr(), rhs in arb_expr(), limit in 0u32..16,
    ) {
        let mut m = Manager::with_seed(NUM_VARS, 5);
        let f = build(&mut m, &lhs);
        let g = build(&mut m, &rhs);
        let mut consumed = 0;
        let mut reduced = false;
        let Some(result) = apply::and_r(&mut m, f, g, &OneStepGreedy, limit, &mut consumed, &mut reduced) else {
            return Ok(());
        };
        if reduced {
            let mut visited = HashSet::new();
            prop_assert!(contains_unknown(&m, result, &mut visited));
        }
    }

    /// `ReduceByNodeLimit` at a limit well above any diagram this test
    /// builds is the identity: it neither drops precision nor rebuilds a
    /// structurally different (if semantically equal) diagram.
    #[test]
    fn reduce_by_node_limit_is_identity_at_generous_budget(expr in arb_expr()) {
        let mut m = Manager::with_seed(NUM_VARS, 3);
        let f = build(&mut m, &expr);
        let r = driver::reduce_by_node_limit(&mut m, f, &OneStepGreedy, 10_000);
        prop_assert_eq!(r, f);
    }

    /// Every reduced driver call restores the pre-call invariant that no
    /// node anywhere in the manager is left with its maxref flag set.
    #[test]
    fn driver_calls_leave_no_flags_set(lhs in arb_expr(), rhs in arb_expr(), limit in 0u32..24) {
        let mut m = Manager::with_seed(NUM_VARS, 11);
        let f = build(&mut m, &lhs);
        let g = build(&mut m, &rhs);
        let result = driver::and_reduced(&mut m, f, g, &OneStepGreedy, limit).unwrap();
        let mut visited = HashSet::new();
        assert_flags_clear(&m, result, &mut visited);
    }

    /// `MergeInterval(under, over)` agrees pointwise with the textbook
    /// definition: `true` wherever `under` is true, `false` wherever `over`
    /// is false, `unknown` on the remainder. This only holds for a genuine
    /// interval, i.e. `under` implies `over`, so `over` is built as
    /// `under OR extra` rather than sampled independently — two unrelated
    /// random diagrams have no reason to agree on that containment.
    #[test]
    fn merge_interval_matches_pointwise_definition(
        under_e in arb_two_valued_expr(), extra_e in arb_two_valued_expr(),
    ) {
        let mut m = Manager::with_seed(NUM_VARS, 13);
        let under = build(&mut m, &under_e);
        let extra = build(&mut m, &extra_e);
        let over = classical::or(&mut m, under, extra);
        let merged = driver::merge_interval(&mut m, under, over);

        for assignment in all_assignments(NUM_VARS as usize) {
            let point = point_valuation(&mut m, &assignment);
            let under_val = reduce_by_valuation(&mut m, under, point);
            let over_val = reduce_by_valuation(&mut m, over, point);
            let merged_val = reduce_by_valuation(&mut m, merged, point);

            let expected = if under_val.is_one() {
                m.one()
            } else if over_val.is_zero() {
                m.zero()
            } else {
                m.unknown()
            };
            prop_assert_eq!(merged_val, expected);
        }
    }

    /// A balanced reference then dereference of a freshly built diagram's
    /// root always accounts for exactly one dead node per `ref`/`deref`
    /// pair that actually reaches zero, regardless of the diagram's shape.
    #[test]
    fn ref_then_deref_balances_dead_node_count(expr in arb_expr(), extra_refs in 0u32..4) {
        let mut m = Manager::with_seed(NUM_VARS, 17);
        let f = build(&mut m, &expr);
        if f.is_constant() {
            return Ok(());
        }
        let before = m.dead_nodes();
        for _ in 0..=extra_refs {
            m.ref_edge(f);
        }
        for _ in 0..=extra_refs {
            m.deref_edge(f);
        }
        prop_assert_eq!(m.dead_nodes() - before, 1);
    }
}
