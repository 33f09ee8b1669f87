//! The ROBDD manager (C3 plus the external interface of §6): node arena,
//! unique table, computed-table caches, maxref-flag bookkeeping, PRNG,
//! variable order, and the cooperative cancellation/reorder hooks the
//! drivers in [`crate::driver`] poll.
//!
//! This crate has no real CUDD to link against, so unlike the core
//! algorithms in [`crate::reduce`] and [`crate::apply`] — which are
//! translations of a specific C source — this module is original plumbing
//! built to the shape §6 describes. Dynamic reordering is intentionally an
//! honest stand-in: [`Manager::request_reorder_check`] trips the same
//! retry-loop signal a real reordering pass would, and invalidates the
//! computed tables the way a reorder must, but it never actually permutes
//! variables. Implementing a sifting algorithm is out of this crate's scope.

use std::time::{Duration, Instant};

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::edge::{Edge, NodeId, FIRST_INTERIOR_NODE, ONE_NODE, UNKNOWN_NODE};

const FLAG_BIT: u32 = 1 << 31;
const COUNT_MASK: u32 = FLAG_BIT - 1;

/// An interior `(var, then, else)` node, hash-consed by the unique table.
struct InteriorNode {
    var: u32,
    then_edge: Edge,
    else_edge: Edge,
    /// Packed refcount (low 31 bits) and maxref flag (high bit), per §3/§4.3.
    rc_flag: std::cell::Cell<u32>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorCode {
    Ok,
    TimeoutExpired,
}

/// Which computed table an `And`/`Xor` result is filed under.
///
/// The reduced (budget-bounded) and classical (exact) variants of each op
/// deliberately share one cache per the design in §4.6 step 3: a budget-
/// reduced call may reuse an exact result computed earlier (re-bounding it
/// through `ReduceByNodeLimit`), but never *inserts* a result it had to
/// truncate, so the table is never polluted with approximations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum CacheOp {
    And,
    Xor,
}

pub struct Manager {
    nodes: Vec<InteriorNode>,
    unique_table: FxHashMap<(u32, Edge, Edge), NodeId>,
    cache2: FxHashMap<(CacheOp, Edge, Edge), Edge>,
    cache_ite: FxHashMap<(Edge, Edge, Edge), Edge>,
    perm: Vec<usize>,
    rng: SmallRng,
    pub(crate) reordered: bool,
    pub(crate) error_code: ErrorCode,
    timeout_deadline: Option<Instant>,
    timeout_handler: Option<Box<dyn FnMut()>>,
    dead_nodes: u64,
    reorder_growth_threshold: usize,
    last_reorder_check: usize,
}

impl Manager {
    /// Creates a manager with `num_vars` variables in identity order.
    pub fn new(num_vars: u32) -> Self {
        Manager::with_seed(num_vars, rand::random())
    }

    /// Creates a manager with a fixed PRNG seed, for reproducible heuristics.
    pub fn with_seed(num_vars: u32, seed: u64) -> Self {
        Manager {
            nodes: Vec::new(),
            unique_table: FxHashMap::default(),
            cache2: FxHashMap::default(),
            cache_ite: FxHashMap::default(),
            perm: (0..num_vars as usize).collect(),
            rng: SmallRng::seed_from_u64(seed),
            reordered: false,
            error_code: ErrorCode::Ok,
            timeout_deadline: None,
            timeout_handler: None,
            dead_nodes: 0,
            reorder_growth_threshold: 4096,
            last_reorder_check: 0,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.perm.len()
    }

    pub fn one(&self) -> Edge {
        Edge::one()
    }

    pub fn zero(&self) -> Edge {
        Edge::zero()
    }

    pub fn unknown(&self) -> Edge {
        Edge::unknown()
    }

    /// A fresh variable's positive literal: `(var, one, zero)`.
    pub fn variable(&mut self, var: u32) -> Edge {
        assert!((var as usize) < self.perm.len(), "variable index out of range");
        self.canonical_node(var, Edge::one(), Edge::zero())
    }

    /// `perm[unknown] = +infinity` per §3; constants have no position.
    pub fn top(&self, e: Edge) -> usize {
        if e.is_constant() {
            usize::MAX
        } else {
            self.perm[self.var_of(e) as usize]
        }
    }

    pub fn perm(&self, var: u32) -> usize {
        self.perm[var as usize]
    }

    fn slot(&self, e: Edge) -> &InteriorNode {
        debug_assert!(!e.is_constant(), "constants have no arena slot");
        &self.nodes[(e.node() - FIRST_INTERIOR_NODE) as usize]
    }

    pub fn var_of(&self, e: Edge) -> u32 {
        self.slot(e).var
    }

    /// Raw `then` field of the regular node behind `e`, with no complement
    /// push-down applied (the `cuddT(B)` idiom).
    pub fn raw_then(&self, e: Edge) -> Edge {
        self.slot(e.regular()).then_edge
    }

    /// Raw `else` field of the regular node behind `e` (the `cuddE(B)` idiom).
    pub fn raw_else(&self, e: Edge) -> Edge {
        self.slot(e.regular()).else_edge
    }

    /// Cofactors `e` into its `then`/`else` children, pushing `e`'s
    /// complement bit down through each child (never through `unknown`).
    pub fn cofactors(&self, e: Edge) -> (Edge, Edge) {
        if e.is_constant() {
            return (e, e);
        }
        let t = self.raw_then(e);
        let el = self.raw_else(e);
        let c = e.is_complemented();
        (t.not_cond(c), el.not_cond(c))
    }

    /// True when `e`'s regular form is a bare variable literal `(v, 1, 0)`.
    pub fn is_var(&self, e: Edge) -> bool {
        if e.is_constant() {
            return false;
        }
        let r = e.regular();
        self.raw_then(r).is_one() && self.raw_else(r).is_zero()
    }

    /// Unique-table insert-or-find. Assumes `(var, t, e)` is already in
    /// canonical form; callers go through [`Manager::canonical_node`] unless
    /// they can prove the triple is canonical already.
    fn make_node_raw(&mut self, var: u32, t: Edge, e: Edge) -> Edge {
        debug_assert!(!t.is_complemented(), "then edge must never be complemented");
        debug_assert!(
            !(t.is_unknown() && e.is_complemented()),
            "else edge must never be complemented when then is unknown"
        );
        if let Some(&id) = self.unique_table.get(&(var, t, e)) {
            return Edge::new(id, false);
        }
        let id = FIRST_INTERIOR_NODE + self.nodes.len() as NodeId;
        self.nodes.push(InteriorNode {
            var,
            then_edge: t,
            else_edge: e,
            rc_flag: std::cell::Cell::new(0),
        });
        self.unique_table.insert((var, t, e), id);
        Edge::new(id, false)
    }

    /// Canonical node construction shared by §4.4, §4.5 and §4.6: collapses
    /// `t == e`, otherwise applies the complement-normalization rules so the
    /// stored node's `then` edge (and `else`, when `then == unknown`) is
    /// never complemented.
    pub fn canonical_node(&mut self, var: u32, t: Edge, e: Edge) -> Edge {
        if t == e {
            return t;
        }
        if t.is_complemented() {
            let inner = self.make_node_raw(var, t.not(), e.not_cond(!e.is_unknown()));
            inner.not()
        } else if t.is_unknown() && e.is_complemented() {
            let inner = self.make_node_raw(var, t, e.not());
            inner.not()
        } else {
            self.make_node_raw(var, t, e)
        }
    }

    fn rc(&self, e: Edge) -> u32 {
        self.slot(e).rc_flag.get() & COUNT_MASK
    }

    fn set_rc(&self, e: Edge, count: u32) {
        let s = self.slot(e);
        let flag = s.rc_flag.get() & FLAG_BIT;
        s.rc_flag.set(flag | (count & COUNT_MASK));
    }

    pub fn flag_is_set(&self, e: Edge) -> bool {
        !e.is_constant() && (self.slot(e).rc_flag.get() & FLAG_BIT) != 0
    }

    pub fn flag_set(&self, e: Edge) {
        if e.is_constant() {
            return;
        }
        let s = self.slot(e);
        s.rc_flag.set(s.rc_flag.get() | FLAG_BIT);
    }

    pub fn flag_clear(&self, e: Edge) {
        if e.is_constant() {
            return;
        }
        let s = self.slot(e);
        s.rc_flag.set(s.rc_flag.get() & COUNT_MASK);
    }

    /// Recursively clears the maxref flag across everything reachable from
    /// `root`, restoring the pre-call invariant that every flag is clear.
    /// Stops at already-clear nodes; a DAG has no cycles so this terminates.
    pub fn clear_maxref_flag_recur(&mut self, root: Edge) {
        if root.is_constant() || !self.flag_is_set(root) {
            return;
        }
        self.flag_clear(root);
        let t = self.raw_then(root.regular());
        let e = self.raw_else(root.regular());
        self.clear_maxref_flag_recur(t);
        self.clear_maxref_flag_recur(e);
    }

    pub fn ref_edge(&self, e: Edge) {
        if e.is_constant() {
            return;
        }
        self.set_rc(e, self.rc(e) + 1);
    }

    /// Recursive dereference: decrements `e`'s count, and if it reaches
    /// zero, recursively dereferences both children and counts the node as
    /// dead. Arena slots are not reclaimed — the manager is an external
    /// collaborator this crate stands in for (§1), and a production
    /// implementation would free-list the slot; this one only needs the
    /// dead-node count to stay correct for the refcount-balance property.
    pub fn deref_edge(&mut self, e: Edge) {
        if e.is_constant() {
            return;
        }
        let count = self.rc(e);
        debug_assert!(count > 0, "refcount underflow");
        self.set_rc(e, count - 1);
        if count == 1 {
            self.dead_nodes += 1;
            let t = self.raw_then(e.regular());
            let el = self.raw_else(e.regular());
            self.deref_edge(t);
            self.deref_edge(el);
        }
    }

    pub fn dead_nodes(&self) -> u64 {
        self.dead_nodes
    }

    pub fn live_node_count(&self) -> usize {
        self.nodes.len()
    }

    // -- PRNG (heuristic C2 collaborator) -----------------------------------

    pub fn random_bool(&mut self) -> bool {
        self.rng.gen()
    }

    // -- reorder hook / cancellation (C7 collaborator) ----------------------

    /// Honest stand-in for dynamic reordering: past a growth threshold since
    /// the last check, trips the retry-loop signal and invalidates the
    /// computed tables, exactly as a real reorder would, without actually
    /// reordering anything.
    pub fn request_reorder_check(&mut self) -> bool {
        if self.nodes.len() - self.last_reorder_check >= self.reorder_growth_threshold {
            self.last_reorder_check = self.nodes.len();
            self.reordered = true;
            self.cache2.clear();
            self.cache_ite.clear();
            debug!(
                "reorder threshold crossed at {} nodes; computed tables invalidated",
                self.nodes.len()
            );
            true
        } else {
            false
        }
    }

    pub fn set_reorder_growth_threshold(&mut self, threshold: usize) {
        self.reorder_growth_threshold = threshold;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout_deadline = Some(Instant::now() + timeout);
    }

    pub fn clear_timeout(&mut self) {
        self.timeout_deadline = None;
    }

    pub fn set_timeout_handler(&mut self, handler: impl FnMut() + 'static) {
        self.timeout_handler = Some(Box::new(handler));
    }

    pub(crate) fn invoke_timeout_handler(&mut self) {
        if self.error_code == ErrorCode::TimeoutExpired {
            if let Some(handler) = self.timeout_handler.as_mut() {
                handler();
            }
        }
    }

    /// Cooperative cancellation probe (`checkWhetherToGiveUp`): returns
    /// `false` when the current top-level call should unwind, either because
    /// the deadline passed or because a reorder was requested.
    pub(crate) fn checkpoint(&mut self) -> bool {
        if let Some(deadline) = self.timeout_deadline {
            if Instant::now() >= deadline {
                self.error_code = ErrorCode::TimeoutExpired;
                trace!("checkpoint: deadline expired, unwinding");
                return false;
            }
        }
        if self.request_reorder_check() {
            trace!("checkpoint: reorder requested, unwinding");
            return false;
        }
        true
    }

    // -- computed tables ------------------------------------------------

    pub(crate) fn cache_lookup2(&self, op: CacheOp, f: Edge, g: Edge) -> Option<Edge> {
        self.cache2.get(&(op, f, g)).copied()
    }

    pub(crate) fn cache_insert2(&mut self, op: CacheOp, f: Edge, g: Edge, r: Edge) {
        self.cache2.insert((op, f, g), r);
    }

    pub(crate) fn cache_lookup_ite(&self, f: Edge, g: Edge, h: Edge) -> Option<Edge> {
        self.cache_ite.get(&(f, g, h)).copied()
    }

    pub(crate) fn cache_insert_ite(&mut self, f: Edge, g: Edge, h: Edge, r: Edge) {
        self.cache_ite.insert((f, g, h), r);
    }
}
