//! Traversal heuristics (C2): pure functions choosing which child of a
//! `(f, g, h)` triple to recurse into first.
//!
//! A negative return selects the `then` branch first; non-negative selects
//! `else` first. Only the sign is observable — callers never inspect the
//! magnitude. Heuristics read the manager (for variable order and, for
//! [`RandomHeuristic`], its PRNG) but never mutate the unique table or
//! caches.

use crate::edge::Edge;
use crate::manager::Manager;

/// Chooses a traversal order over an operand triple. `g` and `h` are absent
/// for unary/binary call sites ([`crate::reduce::reduce_by_node_limit`] and
/// the `And`/`Xor` family only ever pass `f`/`f,g`; only `Ite` passes all three).
pub trait TraversalHeuristic {
    fn choose(&self, manager: &mut Manager, f: Edge, g: Option<Edge>, h: Option<Edge>) -> i32;
}

/// Uniform coin flip via the manager's PRNG.
#[derive(Clone, Copy, Default, Debug)]
pub struct RandomHeuristic;

impl TraversalHeuristic for RandomHeuristic {
    fn choose(&self, manager: &mut Manager, _f: Edge, _g: Option<Edge>, _h: Option<Edge>) -> i32 {
        if manager.random_bool() {
            -1
        } else {
            1
        }
    }
}

/// Regularizes `f` and tallies its immediate `then`/`else` children into the
/// running constant-count and score accumulators.
fn accumulate_one_step(
    manager: &Manager,
    f: Edge,
    tconst: &mut u32,
    tscore: &mut u32,
    econst: &mut u32,
    escore: &mut u32,
) {
    let f = f.regular();
    let t = manager.raw_then(f);
    let e = manager.raw_else(f).regular();
    if t.is_constant() {
        *tconst += 1;
    } else {
        *tscore += manager.top(t) as u32;
    }
    if e.is_constant() {
        *econst += 1;
    } else {
        *escore += manager.top(e) as u32;
    }
}

fn count_node_score(manager: &Manager, f: Edge, con: &mut u32, score: &mut u32) {
    let f = f.regular();
    if f.is_constant() {
        *con += 1;
    } else {
        *score += manager.top(f) as u32;
    }
}

/// Same shape as [`accumulate_one_step`] but descends one further level: a
/// terminal child contributes a flat weight of 8 (chosen so a terminal
/// grandchild always outweighs two non-terminal grandchildren), otherwise
/// each of the child's own two children is tallied via [`count_node_score`].
fn accumulate_two_step(
    manager: &Manager,
    f: Edge,
    tconst: &mut u32,
    tscore: &mut u32,
    econst: &mut u32,
    escore: &mut u32,
) {
    let f = f.regular();
    let t = manager.raw_then(f);
    let e = manager.raw_else(f).regular();
    if t.is_constant() {
        *tconst += 8;
    } else {
        let t = t.regular();
        count_node_score(manager, manager.raw_then(t), tconst, tscore);
        count_node_score(manager, manager.raw_else(t), tconst, tscore);
    }
    if e.is_constant() {
        *econst += 8;
    } else {
        count_node_score(manager, manager.raw_then(e), econst, escore);
        count_node_score(manager, manager.raw_else(e), econst, escore);
    }
}

fn decide(manager: &mut Manager, tconst: u32, tscore: u32, econst: u32, escore: u32) -> i32 {
    if tconst > econst || (tconst == econst && tscore > escore) {
        -1
    } else if tconst < econst || (tconst == econst && tscore < escore) {
        1
    } else if manager.random_bool() {
        -1
    } else {
        1
    }
}

fn greedy_choose(
    manager: &mut Manager,
    f: Edge,
    g: Option<Edge>,
    h: Option<Edge>,
    accumulate: fn(&Manager, Edge, &mut u32, &mut u32, &mut u32, &mut u32),
) -> i32 {
    let findex = manager.top(f);
    let gindex = g.map(|g| manager.top(g));
    let hindex = h.map(|h| manager.top(h));
    let index = [Some(findex), gindex, hindex]
        .into_iter()
        .flatten()
        .min()
        .unwrap();

    let (mut tconst, mut tscore, mut econst, mut escore) = (0u32, 0u32, 0u32, 0u32);
    if findex == index {
        accumulate(manager, f, &mut tconst, &mut tscore, &mut econst, &mut escore);
    }
    if let (Some(g), Some(gi)) = (g, gindex) {
        if gi == index {
            accumulate(manager, g, &mut tconst, &mut tscore, &mut econst, &mut escore);
        }
    }
    if let (Some(h), Some(hi)) = (h, hindex) {
        if hi == index {
            accumulate(manager, h, &mut tconst, &mut tscore, &mut econst, &mut escore);
        }
    }
    decide(manager, tconst, tscore, econst, escore)
}

/// For each operand at the splitting variable, scores its immediate
/// children by constant-count then by position (deeper wins); ties go to
/// the PRNG.
#[derive(Clone, Copy, Default, Debug)]
pub struct OneStepGreedy;

impl TraversalHeuristic for OneStepGreedy {
    fn choose(&self, manager: &mut Manager, f: Edge, g: Option<Edge>, h: Option<Edge>) -> i32 {
        greedy_choose(manager, f, g, h, accumulate_one_step)
    }
}

/// Same scoring as [`OneStepGreedy`] but looking one level deeper.
#[derive(Clone, Copy, Default, Debug)]
pub struct TwoStepGreedy;

impl TraversalHeuristic for TwoStepGreedy {
    fn choose(&self, manager: &mut Manager, f: Edge, g: Option<Edge>, h: Option<Edge>) -> i32 {
        greedy_choose(manager, f, g, h, accumulate_two_step)
    }
}
