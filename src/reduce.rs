//! Exact restriction ([`reduce_by_valuation`], C4) and budget-bounded
//! identity traversal ([`reduce_by_node_limit`], C5).
//!
//! Neither of these two ever unwinds for reorder/timeout in the reference
//! implementation — only the three mutually recursive `Apply` routines in
//! [`crate::apply`] poll the cancellation probe — so both return a plain
//! [`Edge`] rather than the `Option<Edge>` that propagates abort signals
//! elsewhere in this crate.

use crate::edge::Edge;
use crate::heuristic::TraversalHeuristic;
use crate::manager::Manager;

/// `a == Not(b)`, except `b == unknown` can never equal any valid complement
/// (a validly constructed edge never carries a complement bit on `unknown`),
/// so the comparison is unconditionally false in that case rather than
/// collapsing to `a == unknown`.
fn negated_eq(a: Edge, b: Edge) -> bool {
    !b.is_unknown() && a == b.not()
}

/// `ReduceByValuation(f, v)` (C4): specializes `f` under the partial,
/// possibly-unknown-valued assignment `v`, including the "forgetting on the
/// run" fusion to `unknown` when `v` is a bare variable literal.
pub fn reduce_by_valuation(manager: &mut Manager, f: Edge, v: Edge) -> Edge {
    if f.is_constant() {
        return f;
    }
    if v.is_one() {
        return f;
    }
    if v.is_zero() {
        return manager.unknown();
    }

    let topb = manager.top(f);
    let topv = manager.top(v);

    if topb > topv && manager.is_var(v) {
        return f;
    }

    let (bt, be) = if topb <= topv { manager.cofactors(f) } else { (f, f) };
    let (vt, ve) = if topb >= topv { manager.cofactors(v) } else { (v, v) };
    let mut var = if topb <= topv {
        manager.var_of(f.regular())
    } else {
        manager.var_of(v.regular())
    };

    let t0 = reduce_by_valuation(manager, bt, vt);
    let e0 = reduce_by_valuation(manager, be, ve);

    if t0 == e0 {
        return t0;
    }

    let mut t = t0;
    let mut e = e0;

    if topb < topv && manager.is_var(v) {
        let v_var = manager.var_of(v.regular());
        if !v.is_complemented() {
            if !t.is_constant() && manager.var_of(t.regular()) == v_var {
                let tr = t.regular();
                let tr_then = manager.raw_then(tr);
                if (t == tr && tr_then == e) || (t != tr && negated_eq(tr_then, e)) {
                    t = e;
                    e = manager.unknown();
                    var = v_var;
                }
            } else if !e.is_constant() && manager.var_of(e.regular()) == v_var {
                let er = e.regular();
                let er_then = manager.raw_then(er);
                if (e == er && er_then == t) || (e != er && negated_eq(er_then, t)) {
                    e = manager.unknown();
                    var = v_var;
                }
            }
        } else {
            if !t.is_constant() && manager.var_of(t.regular()) == v_var {
                let tr = t.regular();
                let tr_else = manager.raw_else(tr);
                if (t == tr && tr_else == e) || (t != tr && negated_eq(tr_else, e)) {
                    t = manager.unknown();
                    var = v_var;
                }
            } else if !e.is_constant() && manager.var_of(e.regular()) == v_var {
                let er = e.regular();
                let er_else = manager.raw_else(er);
                if (e == er && er_else == t) || (e != er && negated_eq(er_else, t)) {
                    e = t;
                    t = manager.unknown();
                    var = v_var;
                }
            }
        }
    }

    manager.canonical_node(var, t, e)
}

/// `ReduceByNodeLimit(f, heu, limit)` (C5): a budget-bounded identity
/// traversal. `consumed` and `reduced` are threaded by the caller the same
/// way they are threaded through [`crate::apply`]'s recursions.
pub fn reduce_by_node_limit_recur(
    manager: &mut Manager,
    f: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Edge {
    if f.is_constant() {
        return f;
    }
    if manager.flag_is_set(f) {
        return f;
    }
    if limit == 0 {
        *reduced = true;
        return manager.unknown();
    }

    let (bt, be) = manager.cofactors(f);
    let decision = heu.choose(manager, f, None, None);

    let (t, e) = if decision < 0 {
        let mut c1 = 0;
        let mut r1 = false;
        let t = reduce_by_node_limit_recur(manager, bt, heu, limit - 1, &mut c1, &mut r1);
        *consumed += c1;
        let mut c2 = 0;
        let mut r2 = false;
        let budget2 = (limit - 1).saturating_sub(*consumed);
        let e = reduce_by_node_limit_recur(manager, be, heu, budget2, &mut c2, &mut r2);
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    } else {
        let mut c1 = 0;
        let mut r1 = false;
        let e = reduce_by_node_limit_recur(manager, be, heu, limit - 1, &mut c1, &mut r1);
        *consumed += c1;
        let mut c2 = 0;
        let mut r2 = false;
        let budget2 = (limit - 1).saturating_sub(*consumed);
        let t = reduce_by_node_limit_recur(manager, bt, heu, budget2, &mut c2, &mut r2);
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    };

    if t == e {
        return t;
    }

    let var = manager.var_of(f.regular());
    let r = manager.canonical_node(var, t, e);
    if !manager.flag_is_set(r) {
        manager.flag_set(r);
        *consumed += 1;
    }
    r
}
