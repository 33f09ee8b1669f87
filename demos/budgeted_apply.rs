//! Budget-bounded reduced `And`/`Ite` example
//!
//! Shows the node-budget knob on the reduced apply family: a generous
//! budget reproduces the exact classical result, while a budget of zero
//! collapses the whole call to `unknown` rather than failing.

use ternary_robdd::heuristic::OneStepGreedy;
use ternary_robdd::manager::Manager;
use ternary_robdd::{classical, driver};

fn main() {
    println!("Budgeted Apply Example\n");

    let mut manager = Manager::new(2);
    let x0 = manager.variable(0);
    let x1 = manager.variable(1);

    let heu = OneStepGreedy;

    let exact = classical::and(&mut manager, x0, x1);
    println!("Exact And(x0, x1) built {} node(s) so far", manager.live_node_count());

    let generous = driver::and_reduced(&mut manager, x0, x1, &heu, 1_000)
        .expect("plenty of budget, no timeout configured");
    assert_eq!(generous, exact);
    println!("AndReduced(x0, x1, limit=1000) matches the exact result.");

    let starved = driver::and_reduced(&mut manager, x0, x1, &heu, 0)
        .expect("zero budget is not a timeout, it collapses to unknown");
    assert!(starved.is_unknown());
    println!("AndReduced(x0, x1, limit=0) = unknown (spec scenario #5).");

    // IteReduced(x0, x1, !x1, ...) takes the fast path to Xor(x0, !x1)
    // when f is a positive literal ahead of both g and h in the order.
    let not_x1 = x1.not();
    let ite_result = driver::ite_reduced(&mut manager, x0, x1, not_x1, &heu, 1_000)
        .expect("plenty of budget");
    let xor_result = classical::xor(&mut manager, x0, not_x1);
    assert_eq!(ite_result, xor_result);
    println!("IteReduced(x0, x1, !x1) takes the fast path to Xor(x0, !x1) (spec scenario #6).");
}
