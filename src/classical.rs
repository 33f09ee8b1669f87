//! Unbounded three-valued `And`/`Or`/`Xor`/`Ite` over this crate's ROBDDs.
//!
//! §1 lists classical `bddAnd`/`bddOr`/`bddXor`/`bddIte` as external
//! collaborators the core merely consumes. There is no real CUDD in this
//! workspace to provide them, so this module supplies exact (not
//! budget-bounded) versions with the same recursive cofactor-and-rebuild
//! shape as [`crate::apply`], extended with the `unknown` absorbing rules
//! `And`/`Or`/`Xor`/`Ite` need under three-valued (Kleene) semantics. They
//! share their computed-table entries with the reduced apply core (see
//! [`crate::manager::CacheOp`]), exactly as `ForgetZeros`, `ForgetOnes` and
//! `MergeInterval` in [`crate::driver`] need.

use crate::edge::Edge;
use crate::manager::{CacheOp, Manager};

/// Exact three-valued conjunction.
pub fn and(manager: &mut Manager, f: Edge, g: Edge) -> Edge {
    if f == g {
        return f;
    }
    if f.is_one() {
        return g;
    }
    if f.is_zero() {
        return f;
    }
    if g.is_one() {
        return f;
    }
    if g.is_zero() {
        return g;
    }

    let (f, g) = if f > g { (g, f) } else { (f, g) };

    if let Some(r) = manager.cache_lookup2(CacheOp::And, f, g) {
        return r;
    }

    let topf = manager.top(f);
    let topg = manager.top(g);
    let index = topf.min(topg);
    let (fv, fnv) = if topf <= topg {
        manager.cofactors(f)
    } else {
        (f, f)
    };
    let (gv, gnv) = if topg <= topf {
        manager.cofactors(g)
    } else {
        (g, g)
    };
    let var = if topf <= topg {
        manager.var_of(f.regular())
    } else {
        manager.var_of(g.regular())
    };
    debug_assert_eq!(manager.perm(var), index);

    let t = and(manager, fv, gv);
    let e = and(manager, fnv, gnv);
    let r = manager.canonical_node(var, t, e);
    manager.cache_insert2(CacheOp::And, f, g, r);
    r
}

/// Exact three-valued disjunction, via De Morgan over [`and`].
pub fn or(manager: &mut Manager, f: Edge, g: Edge) -> Edge {
    and(manager, f.not(), g.not()).not()
}

/// Exact three-valued negation. `unknown` is a fixed point, per [`Edge::not`].
pub fn not(f: Edge) -> Edge {
    f.not()
}

/// Exact three-valued exclusive-or.
pub fn xor(manager: &mut Manager, f: Edge, g: Edge) -> Edge {
    if f.is_unknown() || g.is_unknown() {
        return manager.unknown();
    }
    let (mut f, mut g) = if f > g { (g, f) } else { (f, g) };
    if g.is_zero() {
        return f;
    }
    if g.is_one() {
        return f.not();
    }
    if f.is_complemented() {
        f = f.not();
        g = g.not();
    }
    if f.is_one() {
        return g.not();
    }

    if let Some(r) = manager.cache_lookup2(CacheOp::Xor, f, g) {
        return r;
    }

    let topf = manager.top(f);
    let topg = manager.top(g);
    let index = topf.min(topg);
    let (fv, fnv) = if topf <= topg {
        manager.cofactors(f)
    } else {
        (f, f)
    };
    let (gv, gnv) = if topg <= topf {
        manager.cofactors(g)
    } else {
        (g, g)
    };
    let var = if topf <= topg {
        manager.var_of(f.regular())
    } else {
        manager.var_of(g.regular())
    };
    debug_assert_eq!(manager.perm(var), index);

    let t = xor(manager, fv, gv);
    let e = xor(manager, fnv, gnv);
    let r = manager.canonical_node(var, t, e);
    manager.cache_insert2(CacheOp::Xor, f, g, r);
    r
}

/// Exact three-valued if-then-else.
pub fn ite(manager: &mut Manager, f: Edge, g: Edge, h: Edge) -> Edge {
    if f.is_one() || g == h {
        return g;
    }
    if f.is_zero() {
        return h;
    }
    let unknown_count =
        f.is_unknown() as u8 + g.is_unknown() as u8 + h.is_unknown() as u8;
    if unknown_count >= 2 || (f.is_unknown() && g == h.not_cond(!h.is_unknown())) {
        return manager.unknown();
    }
    if f.is_unknown() {
        return manager.unknown();
    }
    if g.is_one() {
        return or(manager, f, h);
    }
    if g.is_zero() {
        return and(manager, f.not(), h);
    }
    if h.is_zero() {
        return and(manager, f, g);
    }
    if h.is_one() {
        return and(manager, f, g.not()).not();
    }
    if g == h.not_cond(!h.is_unknown()) {
        return xor(manager, f, h);
    }
    if g.is_unknown() || h.is_unknown() {
        return manager.unknown();
    }

    if let Some(r) = manager.cache_lookup_ite(f, g, h) {
        return r;
    }

    let index = manager.top(f).min(manager.top(g)).min(manager.top(h));
    let (fv, fnv) = if manager.top(f) == index {
        manager.cofactors(f)
    } else {
        (f, f)
    };
    let (gv, gnv) = if manager.top(g) == index {
        manager.cofactors(g)
    } else {
        (g, g)
    };
    let (hv, hnv) = if manager.top(h) == index {
        manager.cofactors(h)
    } else {
        (h, h)
    };
    let var = [f, g, h]
        .into_iter()
        .find(|e| manager.top(*e) == index)
        .map(|e| manager.var_of(e.regular()))
        .unwrap();

    let t = ite(manager, fv, gv, hv);
    let e = ite(manager, fnv, gnv, hnv);
    let r = manager.canonical_node(var, t, e);
    manager.cache_insert_ite(f, g, h, r);
    r
}
