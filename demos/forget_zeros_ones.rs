//! `ForgetZeros`/`ForgetOnes` example
//!
//! Shows how widening a diagram toward `unknown` on one polarity of its
//! truth table turns a total function into a partial, one-sided one.

use ternary_robdd::manager::Manager;
use ternary_robdd::{driver, Edge};

fn describe(manager: &Manager, label: &str, f: Edge) {
    let (t, e) = manager.cofactors(f);
    println!("{label}: x0=1 -> {t:?}, x0=0 -> {e:?}");
}

fn main() {
    println!("ForgetZeros/ForgetOnes Example\n");
    println!("Starting from a single variable x0, both operators widen one");
    println!("side of the truth table to `unknown` while leaving the other intact.\n");

    let mut manager = Manager::new(1);
    let x0 = manager.variable(0);

    // ForgetZeros(x0) = Or(x0, unknown): false positions become unknown.
    let forgotten_zeros = driver::forget_zeros(&mut manager, x0);
    describe(&manager, "ForgetZeros(x0)", forgotten_zeros);
    assert!(manager.cofactors(forgotten_zeros).0.is_one());
    assert!(manager.cofactors(forgotten_zeros).1.is_unknown());

    // ForgetOnes(x0) = And(x0, unknown): true positions become unknown.
    let forgotten_ones = driver::forget_ones(&mut manager, x0);
    describe(&manager, "ForgetOnes(x0)", forgotten_ones);
    assert!(manager.cofactors(forgotten_ones).0.is_unknown());
    assert!(manager.cofactors(forgotten_ones).1.is_zero());

    println!("\nBoth match spec scenario #1/#2: ForgetZeros(x0) = (x0 ? 1 : U),");
    println!("ForgetOnes(x0) = (x0 ? U : 0).");
}
