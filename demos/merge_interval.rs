//! `MergeInterval` example
//!
//! Combines an under-approximation and an over-approximation of the same
//! Boolean function into one three-valued diagram that is exact wherever
//! the two approximations agree and `unknown` wherever they don't.

use ternary_robdd::driver;
use ternary_robdd::manager::Manager;

fn main() {
    println!("MergeInterval Example\n");
    println!("under = x0 AND x1 (true only on 11)");
    println!("over  = x0 OR x1  (false only on 00)\n");

    let mut manager = Manager::new(2);
    let x0 = manager.variable(0);
    let x1 = manager.variable(1);

    let under = ternary_robdd::classical::and(&mut manager, x0, x1);
    let over = ternary_robdd::classical::or(&mut manager, x0, x1);

    let merged = driver::merge_interval(&mut manager, under, over);

    for (x0_val, x1_val) in [(true, true), (true, false), (false, true), (false, false)] {
        let restriction = if x0_val { x0 } else { x0.not() };
        let restriction = ternary_robdd::classical::and(&mut manager, restriction, if x1_val { x1 } else { x1.not() });
        let r = ternary_robdd::reduce::reduce_by_valuation(&mut manager, merged, restriction);
        println!("x0={x0_val}, x1={x1_val} -> {r:?}");
    }

    println!("\nMatches spec scenario #3: true on 11, false on 00, unknown on 01/10.");
}
