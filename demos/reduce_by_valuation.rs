//! `ReduceByValuation` example
//!
//! Specializes a diagram under a partial, 3-valued assignment. Here `f` and
//! `v` split on the same top variable, so the ordinary recursion applies
//! directly (no "forgetting on the run" shortcut is needed): the `x0=true`
//! branch agrees with `f` exactly, and the `x0=false` branch — where the
//! valuation no longer constrains anything — widens to `unknown`.

use ternary_robdd::manager::Manager;
use ternary_robdd::reduce::reduce_by_valuation;

fn main() {
    println!("ReduceByValuation Example\n");
    println!("f = x0 OR x1, restricted by the valuation v = x0\n");

    let mut manager = Manager::new(2);
    let x0 = manager.variable(0);
    let x1 = manager.variable(1);
    let f = ternary_robdd::classical::or(&mut manager, x0, x1);

    let restricted = reduce_by_valuation(&mut manager, f, x0);
    let (then_branch, else_branch) = manager.cofactors(restricted);

    println!("ReduceByValuation(x0+x1, x0): x0=1 -> {then_branch:?}, x0=0 -> {else_branch:?}");
    assert!(then_branch.is_one());
    assert!(else_branch.is_unknown());

    println!("\nMatches spec scenario #4's reasoning: under x0=true, x0+x1 is");
    println!("always true; under x0=false the valuation no longer constrains");
    println!("anything, so that branch widens to unknown.");
}
