//! Top-level drivers (C7): the retry-on-reorder loop, timeout handler
//! dispatch, maxref-flag cleanup and final complement fix-ups that wrap
//! every reduced Boolean operation, plus `ForgetZeros`/`ForgetOnes`/
//! `MergeInterval` and the single-shot `ReduceByNodeLimit` entry point.
//!
//! `ReduceByValuation` gets no wrapper here — the reference implementation
//! never retries it (it has no cancellation probe at all, see
//! [`crate::reduce`]), so it is called directly.

use log::{debug, warn};

use crate::apply;
use crate::edge::Edge;
use crate::error::{CoreError, CoreResult};
use crate::heuristic::TraversalHeuristic;
use crate::manager::{ErrorCode, Manager};
use crate::reduce::reduce_by_node_limit_recur;

/// Drives one reduced apply to completion: loops `inner` until a call
/// completes without a reorder request, sweeping the maxref flag off the
/// returned subgraph after every attempt (including aborted ones, since a
/// partial subgraph built before a reorder may still carry flags) and
/// dispatching the timeout handler once the loop exits with an expired
/// deadline.
///
/// Per §7, only budget exhaustion is recovered locally as `unknown`; a
/// timeout is a real failure and is surfaced as `Err`, never silently
/// papered over with `unknown`.
fn run_reduced<F>(manager: &mut Manager, mut inner: F) -> CoreResult<Edge>
where
    F: FnMut(&mut Manager) -> Option<Edge>,
{
    loop {
        manager.reordered = false;
        match inner(manager) {
            Some(result) => {
                manager.clear_maxref_flag_recur(result);
                manager.invoke_timeout_handler();
                return Ok(result);
            }
            None => {
                if !manager.reordered {
                    // Timeout, not a reorder: nothing further to retry.
                    warn!("reduced operation aborted, error_code={:?}", manager.error_code);
                    manager.invoke_timeout_handler();
                    return Err(match manager.error_code {
                        ErrorCode::TimeoutExpired => CoreError::Timeout,
                        ErrorCode::Ok => CoreError::TooManyNodes,
                    });
                }
                // Reordered: loop and retry under (conceptually) the new order.
                debug!("reorder requested mid-call, restarting the reduced operation");
            }
        }
    }
}

/// `AndReduced(f, g, heu, limit)`.
pub fn and_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::and_r(m, f, g, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `OrReduced(f, g, heu, limit)`.
pub fn or_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::or_r(m, f, g, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `NandReduced(f, g, heu, limit)`.
pub fn nand_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::nand_r(m, f, g, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `NorReduced(f, g, heu, limit)`.
pub fn nor_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::nor_r(m, f, g, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `XorReduced(f, g, heu, limit)`.
pub fn xor_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::xor_r(m, f, g, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `XnorReduced(f, g, heu, limit)`.
pub fn xnor_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::xnor_r(m, f, g, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `IteReduced(f, g, h, heu, limit)`.
pub fn ite_reduced(
    manager: &mut Manager,
    f: Edge,
    g: Edge,
    h: Edge,
    heu: &impl TraversalHeuristic,
    limit: u32,
) -> CoreResult<Edge> {
    run_reduced(manager, |m| {
        let mut consumed = 0;
        let mut reduced = false;
        apply::ite_r(m, f, g, h, heu, limit, &mut consumed, &mut reduced)
    })
}

/// `ReduceByNodeLimit(f, heu, limit)`: no retry loop in the reference
/// implementation — it never consults the cancellation probe — but the
/// driver still owns the final maxref sweep.
pub fn reduce_by_node_limit(manager: &mut Manager, f: Edge, heu: &impl TraversalHeuristic, limit: u32) -> Edge {
    let mut consumed = 0;
    let mut reduced = false;
    let r = reduce_by_node_limit_recur(manager, f, heu, limit, &mut consumed, &mut reduced);
    manager.clear_maxref_flag_recur(r);
    r
}

/// `ForgetZeros(f) = Or(f, unknown)`: positions where `f` is false become
/// `unknown`.
pub fn forget_zeros(manager: &mut Manager, f: Edge) -> Edge {
    let unknown = manager.unknown();
    crate::classical::or(manager, f, unknown)
}

/// `ForgetOnes(f) = And(f, unknown)`: positions where `f` is true become
/// `unknown`.
pub fn forget_ones(manager: &mut Manager, f: Edge) -> Edge {
    let unknown = manager.unknown();
    crate::classical::and(manager, f, unknown)
}

/// `MergeInterval(under, over) = And(Or(under, unknown), over)`: `true`
/// wherever `under` is true, `false` wherever `over` is false, `unknown`
/// strictly between.
pub fn merge_interval(manager: &mut Manager, under: Edge, over: Edge) -> Edge {
    let unknown = manager.unknown();
    let widened = crate::classical::or(manager, under, unknown);
    crate::classical::and(manager, widened, over)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::{OneStepGreedy, RandomHeuristic};
    use crate::manager::Manager;

    #[test]
    fn and_reduced_matches_classical_at_large_budget() {
        let mut m = Manager::with_seed(3, 1);
        let a = m.variable(0);
        let b = m.variable(1);
        let exact = crate::classical::and(&mut m, a, b);
        let r = and_reduced(&mut m, a, b, &RandomHeuristic, 1000).unwrap();
        assert_eq!(r, exact);
    }

    #[test]
    fn and_reduced_collapses_at_zero_budget() {
        let mut m = Manager::with_seed(2, 1);
        let a = m.variable(0);
        let b = m.variable(1);
        let r = and_reduced(&mut m, a, b, &RandomHeuristic, 0).unwrap();
        assert!(r.is_unknown());
    }

    #[test]
    fn or_reduced_matches_classical_or() {
        let mut m = Manager::with_seed(3, 2);
        let a = m.variable(0);
        let b = m.variable(1);
        let exact = crate::classical::or(&mut m, a, b);
        let r = or_reduced(&mut m, a, b, &OneStepGreedy, 1000).unwrap();
        assert_eq!(r, exact);
    }

    #[test]
    fn xor_reduced_matches_classical_xor() {
        let mut m = Manager::with_seed(3, 3);
        let a = m.variable(0);
        let b = m.variable(1);
        let exact = crate::classical::xor(&mut m, a, b);
        let r = xor_reduced(&mut m, a, b, &OneStepGreedy, 1000).unwrap();
        assert_eq!(r, exact);
    }

    #[test]
    fn ite_reduced_matches_classical_ite() {
        let mut m = Manager::with_seed(3, 4);
        let a = m.variable(0);
        let b = m.variable(1);
        let c = m.variable(2);
        let exact = crate::classical::ite(&mut m, a, b, c);
        let r = ite_reduced(&mut m, a, b, c, &OneStepGreedy, 1000).unwrap();
        assert_eq!(r, exact);
    }

    #[test]
    fn forget_zeros_matches_spec_example() {
        let mut m = Manager::with_seed(1, 1);
        let x0 = m.variable(0);
        let r = forget_zeros(&mut m, x0);
        let (t, e) = m.cofactors(r);
        assert!(t.is_one());
        assert!(e.is_unknown());
    }

    #[test]
    fn forget_ones_matches_spec_example() {
        let mut m = Manager::with_seed(1, 1);
        let x0 = m.variable(0);
        let r = forget_ones(&mut m, x0);
        let (t, e) = m.cofactors(r);
        assert!(t.is_unknown());
        assert!(e.is_zero());
    }

    #[test]
    fn merge_interval_matches_spec_example() {
        // MergeInterval(x0*x1, x0+x1): true only when x0=x1=1, false only
        // when both are 0, unknown on the two mixed assignments.
        let mut m = Manager::with_seed(2, 1);
        let x0 = m.variable(0);
        let x1 = m.variable(1);
        let under = crate::classical::and(&mut m, x0, x1);
        let over = crate::classical::or(&mut m, x0, x1);
        let r = merge_interval(&mut m, under, over);
        let (t, e) = m.cofactors(r);
        let (tt, te) = m.cofactors(t);
        let (et, ee) = m.cofactors(e);
        assert!(tt.is_one());
        assert!(te.is_unknown());
        assert!(et.is_unknown());
        assert!(ee.is_zero());
    }
}
