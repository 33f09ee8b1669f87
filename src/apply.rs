//! Reduced Apply core (C6): the three mutually recursive budget-bounded
//! primitives `AndR`, `XorR`, `IteR`, plus the thin wrappers that express
//! every other Boolean connective in terms of them.
//!
//! Each routine threads `consumed` (new nodes charged against the caller's
//! budget) and `reduced` (set once any subtree collapsed to `unknown`)
//! exactly the way [`crate::reduce::reduce_by_node_limit_recur`] does, and
//! returns `None` when the cooperative cancellation probe
//! ([`Manager::checkpoint`]) asks the recursion to unwind — the only two
//! conditions that can trigger this are an expired timeout or a requested
//! reorder, both handled by the retry loop in [`crate::driver`].
//!
//! `AndR` and `XorR` deliberately share their computed-table entries with
//! [`crate::classical`]'s exact `And`/`Xor` (see [`CacheOp`]): a cache hit
//! here is always re-submitted to `ReduceByNodeLimit` to re-bound it under
//! *this* call's budget, and a result is only ever inserted when the whole
//! call completed without truncation — caching a budget-truncated result
//! would poison a later call that has enough budget to compute it exactly.

use crate::edge::Edge;
use crate::heuristic::TraversalHeuristic;
use crate::manager::{CacheOp, Manager};
use crate::reduce::reduce_by_node_limit_recur;

/// `x == unknown ? unknown : Not(x)` is exactly [`Edge::not`]; this alias
/// exists only so call sites can read `not_safe` where the spec does.
#[inline]
fn not_safe(x: Edge) -> Edge {
    x.not()
}

/// `limit < 1 ? 0 : limit - 1`, used to derive each sibling recursion's
/// budget from its parent's.
#[inline]
fn saturating_budget_step(limit: u32) -> u32 {
    limit.saturating_sub(1)
}

/// Canonicalizes an `(f, g, h)` triple for `Ite` so that `f` and `g` are
/// both regular, tracking the polarity flip (`comple`) needed to recover
/// the true result. Two identities do the work: `ITE(!F,G,H) = ITE(F,H,G)`
/// eliminates `F`'s complement by swapping `g`/`h`; `ITE(F,G,H) =
/// !ITE(F,!G,!H)` then eliminates `G`'s.
fn bdd_var_to_canonical_simple(
    manager: &Manager,
    f: Edge,
    g: Edge,
    h: Edge,
) -> (Edge, Edge, Edge, bool, usize, usize, usize) {
    let (mut f, mut g, mut h) = (f, g, h);
    let mut comple = false;

    if f.is_complemented() {
        f = f.not();
        std::mem::swap(&mut g, &mut h);
    }
    if g.is_complemented() {
        g = g.not();
        h = h.not();
        comple = !comple;
    }

    let topf = manager.top(f);
    let topg = manager.top(g);
    let toph = manager.top(h);
    (f, g, h, comple, topf, topg, toph)
}

/// Budget-bounded three-valued conjunction.
pub fn and_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    let fr = f.regular();
    let gr = g.regular();
    if fr == gr {
        if f == g {
            return Some(reduce_by_node_limit_recur(manager, f, heu, limit, consumed, reduced));
        } else if fr.is_unknown() {
            return Some(manager.unknown());
        }
    }
    if fr.is_one() {
        return Some(if f.is_one() {
            reduce_by_node_limit_recur(manager, g, heu, limit, consumed, reduced)
        } else {
            f
        });
    }
    if gr.is_one() {
        return Some(if g.is_one() {
            reduce_by_node_limit_recur(manager, f, heu, limit, consumed, reduced)
        } else {
            g
        });
    }

    let (f, g) = if f > g { (g, f) } else { (f, g) };

    if let Some(cached) = manager.cache_lookup2(CacheOp::And, f, g) {
        return Some(reduce_by_node_limit_recur(manager, cached, heu, limit, consumed, reduced));
    }

    if !manager.checkpoint() {
        return None;
    }

    let topf = manager.top(f);
    let topg = manager.top(g);
    let (fv, fnv) = if topf <= topg { manager.cofactors(f) } else { (f, f) };
    let (gv, gnv) = if topg <= topf { manager.cofactors(g) } else { (g, g) };
    let var = if topf <= topg {
        manager.var_of(f.regular())
    } else {
        manager.var_of(g.regular())
    };

    let decision = heu.choose(manager, f, Some(g), None);
    let (t, e) = if decision < 0 {
        let (mut c1, mut r1) = (0, false);
        let t = and_r(manager, fv, gv, heu, saturating_budget_step(limit), &mut c1, &mut r1)?;
        *consumed += c1;
        let (mut c2, mut r2) = (0, false);
        let budget2 = saturating_budget_step(limit.saturating_sub(*consumed));
        let e = and_r(manager, fnv, gnv, heu, budget2, &mut c2, &mut r2)?;
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    } else {
        let (mut c1, mut r1) = (0, false);
        let e = and_r(manager, fnv, gnv, heu, saturating_budget_step(limit), &mut c1, &mut r1)?;
        *consumed += c1;
        let (mut c2, mut r2) = (0, false);
        let budget2 = saturating_budget_step(limit.saturating_sub(*consumed));
        let t = and_r(manager, fv, gv, heu, budget2, &mut c2, &mut r2)?;
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    };

    if t == e {
        return Some(t);
    }
    let r = manager.canonical_node(var, t, e);
    if !manager.flag_is_set(r) {
        if limit == 0 {
            *reduced = true;
            return Some(manager.unknown());
        }
        manager.flag_set(r);
        *consumed += 1;
    }
    if !*reduced {
        manager.cache_insert2(CacheOp::And, f, g, r);
    }
    Some(r)
}

/// Budget-bounded three-valued exclusive-or.
pub fn xor_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    if f.is_unknown() || g.is_unknown() {
        return Some(manager.unknown());
    }
    let (mut f, mut g) = if f > g { (g, f) } else { (f, g) };
    if g.is_zero() {
        return Some(reduce_by_node_limit_recur(manager, f, heu, limit, consumed, reduced));
    }
    if g.is_one() {
        return Some(reduce_by_node_limit_recur(manager, f.not(), heu, limit, consumed, reduced));
    }
    if f.is_complemented() {
        f = f.not();
        g = g.not();
    }
    if f.is_one() {
        return Some(reduce_by_node_limit_recur(manager, g.not(), heu, limit, consumed, reduced));
    }

    if let Some(cached) = manager.cache_lookup2(CacheOp::Xor, f, g) {
        return Some(reduce_by_node_limit_recur(manager, cached, heu, limit, consumed, reduced));
    }

    if !manager.checkpoint() {
        return None;
    }

    let topf = manager.top(f);
    let topg = manager.top(g);
    let (fv, fnv) = if topf <= topg { manager.cofactors(f) } else { (f, f) };
    let (gv, gnv) = if topg <= topf { manager.cofactors(g) } else { (g, g) };
    let var = if topf <= topg {
        manager.var_of(f.regular())
    } else {
        manager.var_of(g.regular())
    };

    let decision = heu.choose(manager, f, Some(g), None);
    let (t, e) = if decision < 0 {
        let (mut c1, mut r1) = (0, false);
        let t = xor_r(manager, fv, gv, heu, saturating_budget_step(limit), &mut c1, &mut r1)?;
        *consumed += c1;
        let (mut c2, mut r2) = (0, false);
        let budget2 = saturating_budget_step(limit.saturating_sub(*consumed));
        let e = xor_r(manager, fnv, gnv, heu, budget2, &mut c2, &mut r2)?;
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    } else {
        let (mut c1, mut r1) = (0, false);
        let e = xor_r(manager, fnv, gnv, heu, saturating_budget_step(limit), &mut c1, &mut r1)?;
        *consumed += c1;
        let (mut c2, mut r2) = (0, false);
        let budget2 = saturating_budget_step(limit.saturating_sub(*consumed));
        let t = xor_r(manager, fv, gv, heu, budget2, &mut c2, &mut r2)?;
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    };

    if t == e {
        return Some(t);
    }
    let r = manager.canonical_node(var, t, e);
    if !manager.flag_is_set(r) {
        if limit == 0 {
            *reduced = true;
            return Some(manager.unknown());
        }
        manager.flag_set(r);
        *consumed += 1;
    }
    if !*reduced {
        manager.cache_insert2(CacheOp::Xor, f, g, r);
    }
    Some(r)
}

/// Budget-bounded three-valued if-then-else.
pub fn ite_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    h: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    if f.is_one() || g == h {
        return Some(reduce_by_node_limit_recur(manager, g, heu, limit, consumed, reduced));
    }
    if f.is_zero() {
        return Some(reduce_by_node_limit_recur(manager, h, heu, limit, consumed, reduced));
    }
    let unknown_count = f.is_unknown() as u8 + g.is_unknown() as u8 + h.is_unknown() as u8;
    if unknown_count >= 2 || (f.is_unknown() && g == h.not_cond(!h.is_unknown())) {
        return Some(manager.unknown());
    }
    if f.is_unknown() {
        return Some(manager.unknown());
    }

    if g.is_one() || f == g {
        if h.is_zero() {
            return Some(f);
        }
        let r = and_r(manager, not_safe(f), not_safe(h), heu, limit, consumed, reduced)?;
        return Some(not_safe(r));
    } else if g.is_zero() {
        if h.is_one() {
            return Some(f.not());
        }
        return and_r(manager, not_safe(f), h, heu, limit, consumed, reduced);
    }
    if h.is_zero() {
        return and_r(manager, f, g, heu, limit, consumed, reduced);
    } else if h.is_one() {
        let r = and_r(manager, f, not_safe(g), heu, limit, consumed, reduced)?;
        return Some(not_safe(r));
    }
    if g == h.not_cond(!h.is_unknown()) {
        return xor_r(manager, f, h, heu, limit, consumed, reduced);
    } else if g.is_unknown() || h.is_unknown() {
        return Some(manager.unknown());
    }

    let (f, g, h, comple, topf, topg, toph) = bdd_var_to_canonical_simple(manager, f, g, h);
    let v = topg.min(toph);

    if topf < v && manager.is_var(f) {
        let var = manager.var_of(f.regular());
        let r = manager.canonical_node(var, g, h);
        if !manager.flag_is_set(r) {
            if limit == 0 {
                *reduced = true;
                return Some(manager.unknown());
            }
            manager.flag_set(r);
            *consumed += 1;
        }
        return Some(r.not_cond(comple));
    }

    if let Some(cached) = manager.cache_lookup_ite(f, g, h) {
        let r = reduce_by_node_limit_recur(manager, cached, heu, limit, consumed, reduced);
        return Some(r.not_cond(comple));
    }

    if !manager.checkpoint() {
        return None;
    }

    let index_level = topf.min(v);
    let (fv, fnv) = if topf <= v { manager.cofactors(f) } else { (f, f) };
    let (gv, gnv) = if topg == index_level { manager.cofactors(g) } else { (g, g) };
    let (hv, hnv) = if toph == index_level { manager.cofactors(h) } else { (h, h) };
    let var = if topf <= v {
        manager.var_of(f.regular())
    } else if topg == index_level {
        manager.var_of(g.regular())
    } else {
        manager.var_of(h.regular())
    };

    let decision = heu.choose(manager, f, Some(g), Some(h));
    let (t, e) = if decision < 0 {
        let (mut c1, mut r1) = (0, false);
        let t = ite_r(manager, fv, gv, hv, heu, saturating_budget_step(limit), &mut c1, &mut r1)?;
        *consumed += c1;
        let (mut c2, mut r2) = (0, false);
        let budget2 = saturating_budget_step(limit.saturating_sub(*consumed));
        let e = ite_r(manager, fnv, gnv, hnv, heu, budget2, &mut c2, &mut r2)?;
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    } else {
        let (mut c1, mut r1) = (0, false);
        let e = ite_r(manager, fnv, gnv, hnv, heu, saturating_budget_step(limit), &mut c1, &mut r1)?;
        *consumed += c1;
        let (mut c2, mut r2) = (0, false);
        let budget2 = saturating_budget_step(limit.saturating_sub(*consumed));
        let t = ite_r(manager, fv, gv, hv, heu, budget2, &mut c2, &mut r2)?;
        *consumed += c2;
        *reduced |= r1 || r2;
        (t, e)
    };

    let r = if t == e {
        t
    } else {
        let r = manager.canonical_node(var, t, e);
        if !manager.flag_is_set(r) {
            if limit == 0 {
                *reduced = true;
                return Some(manager.unknown());
            }
            manager.flag_set(r);
            *consumed += 1;
        }
        r
    };

    if !*reduced {
        manager.cache_insert_ite(f, g, h, r);
    }
    Some(r.not_cond(comple))
}

/// `OrR(f,g) = NotSafe(AndR(NotSafe(f), NotSafe(g)))`.
pub fn or_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    let r = and_r(manager, not_safe(f), not_safe(g), heu, limit, consumed, reduced)?;
    Some(not_safe(r))
}

/// `NandR(f,g) = NotSafe(AndR(f,g))`.
pub fn nand_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    let r = and_r(manager, f, g, heu, limit, consumed, reduced)?;
    Some(not_safe(r))
}

/// `NorR(f,g) = AndR(NotSafe(f), NotSafe(g))`.
pub fn nor_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    and_r(manager, not_safe(f), not_safe(g), heu, limit, consumed, reduced)
}

/// `XnorR(f,g) = NotSafe(XorR(f,g))`.
pub fn xnor_r(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
    consumed: &mut u32,
    reduced: &mut bool,
) -> Option<Edge> {
    let r = xor_r(manager, f, g, heu, limit, consumed, reduced)?;
    Some(not_safe(r))
}
