//! Ternary ROBDD command-line tool
//!
//! Builds three-valued ROBDDs from Boolean expression strings over
//! variables named `x0`, `x1`, ... and either dumps the resulting diagram
//! as Graphviz DOT or runs a budget-bounded reduced operation and prints
//! the result.

use clap::{Parser, ValueEnum};
use std::process;

use ternary_robdd::edge::Edge;
use ternary_robdd::heuristic::{OneStepGreedy, RandomHeuristic, TwoStepGreedy};
use ternary_robdd::manager::Manager;
use ternary_robdd::{classical, driver, dot};

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Op {
    And,
    Or,
    Xor,
    Xnor,
    Nand,
    Nor,
    Ite,
    Not,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicArg {
    Random,
    OneStep,
    TwoStep,
}

#[derive(Parser, Debug)]
#[command(name = "ternary-robdd")]
#[command(about = "Budget-bounded reduced three-valued ROBDD operations", long_about = None)]
struct Args {
    /// Boolean expression for the first operand, e.g. "x0 & !x1 | x2"
    expr_f: String,

    /// Boolean expression for the second operand (unused by `not`)
    #[arg(short = 'g', long)]
    expr_g: Option<String>,

    /// Boolean expression for the else-branch of `ite`
    #[arg(short = 'H', long = "else")]
    expr_h: Option<String>,

    /// Which reduced operation to run
    #[arg(short = 'o', long, value_enum, default_value = "and")]
    op: Op,

    /// Node-production budget for the reduced operation
    #[arg(short = 'l', long, default_value_t = 1000)]
    limit: u32,

    /// Traversal heuristic
    #[arg(long, value_enum, default_value = "one-step")]
    heuristic: HeuristicArg,

    /// Number of variables available to the expressions
    #[arg(short = 'n', long = "num-vars", default_value_t = 8)]
    num_vars: u32,

    /// Dump the result as Graphviz DOT instead of a cofactor summary
    #[arg(long)]
    dot: bool,

    /// Print a summary to stderr before the result
    #[arg(short = 's', long)]
    summary: bool,
}

/// Hand-rolled recursive-descent parser for `!`, `&`, `^`, `|` and
/// parenthesized sub-expressions over variables `x<N>`. Precedence, loosest
/// to tightest: `|`, `^`, `&`, `!`.
struct Parser2<'a> {
    manager: &'a mut Manager,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser2<'a> {
    fn new(manager: &'a mut Manager, src: &'a str) -> Self {
        Parser2 { manager, bytes: src.as_bytes(), pos: 0 }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        self.skip_ws();
        let b = self.bytes.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn parse(&mut self) -> Result<Edge, String> {
        let e = self.parse_or()?;
        self.skip_ws();
        if self.pos != self.bytes.len() {
            return Err(format!("unexpected trailing input at byte {}", self.pos));
        }
        Ok(e)
    }

    fn parse_or(&mut self) -> Result<Edge, String> {
        let mut lhs = self.parse_xor()?;
        while self.peek() == Some(b'|') {
            self.bump();
            let rhs = self.parse_xor()?;
            lhs = classical::or(self.manager, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_xor(&mut self) -> Result<Edge, String> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(b'^') {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = classical::xor(self.manager, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Edge, String> {
        let mut lhs = self.parse_unary()?;
        while self.peek() == Some(b'&') {
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = classical::and(self.manager, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Edge, String> {
        if self.peek() == Some(b'!') {
            self.bump();
            let inner = self.parse_unary()?;
            return Ok(classical::not(inner));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Edge, String> {
        match self.peek() {
            Some(b'(') => {
                self.bump();
                let e = self.parse_or()?;
                if self.bump() != Some(b')') {
                    return Err("expected closing ')'".to_string());
                }
                Ok(e)
            }
            Some(b'x') => self.parse_variable(),
            Some(b'1') => {
                self.bump();
                Ok(self.manager.one())
            }
            Some(b'0') => {
                self.bump();
                Ok(self.manager.zero())
            }
            Some(b'U') => {
                self.bump();
                Ok(self.manager.unknown())
            }
            other => Err(format!("unexpected character {other:?} at byte {}", self.pos)),
        }
    }

    fn parse_variable(&mut self) -> Result<Edge, String> {
        self.skip_ws();
        let start = self.pos;
        self.bump(); // consume 'x'
        let digits_start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(format!("expected a variable index after 'x' at byte {start}"));
        }
        let idx: u32 = std::str::from_utf8(&self.bytes[digits_start..self.pos])
            .unwrap()
            .parse()
            .map_err(|e| format!("invalid variable index: {e}"))?;
        if idx as usize >= self.manager.num_vars() {
            return Err(format!(
                "variable x{idx} out of range (manager has {} variables, raise --num-vars)",
                self.manager.num_vars()
            ));
        }
        Ok(self.manager.variable(idx))
    }
}

fn parse_expr(manager: &mut Manager, src: &str) -> Result<Edge, String> {
    Parser2::new(manager, src).parse()
}

fn run_reduced(
    manager: &mut Manager,
    op: Op,
    f: Edge,
    g: Option<Edge>,
    h: Option<Edge>,
    heuristic: HeuristicArg,
    limit: u32,
) -> Result<Edge, ternary_robdd::CoreError> {
    macro_rules! dispatch {
        ($heu:expr) => {{
            let heu = $heu;
            match op {
                Op::And => driver::and_reduced(manager, f, g.unwrap(), &heu, limit),
                Op::Or => driver::or_reduced(manager, f, g.unwrap(), &heu, limit),
                Op::Xor => driver::xor_reduced(manager, f, g.unwrap(), &heu, limit),
                Op::Xnor => driver::xnor_reduced(manager, f, g.unwrap(), &heu, limit),
                Op::Nand => driver::nand_reduced(manager, f, g.unwrap(), &heu, limit),
                Op::Nor => driver::nor_reduced(manager, f, g.unwrap(), &heu, limit),
                Op::Ite => driver::ite_reduced(manager, f, g.unwrap(), h.unwrap(), &heu, limit),
                Op::Not => Ok(classical::not(f)),
            }
        }};
    }
    match heuristic {
        HeuristicArg::Random => dispatch!(RandomHeuristic),
        HeuristicArg::OneStep => dispatch!(OneStepGreedy),
        HeuristicArg::TwoStep => dispatch!(TwoStepGreedy),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if matches!(args.op, Op::And | Op::Or | Op::Xor | Op::Xnor | Op::Nand | Op::Nor) && args.expr_g.is_none() {
        eprintln!("operation {:?} requires --expr-g", args.op);
        process::exit(1);
    }
    if args.op == Op::Ite && (args.expr_g.is_none() || args.expr_h.is_none()) {
        eprintln!("ite requires both --expr-g and --else");
        process::exit(1);
    }

    let mut manager = Manager::new(args.num_vars);

    let f = match parse_expr(&mut manager, &args.expr_f) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error parsing first expression: {e}");
            process::exit(1);
        }
    };
    let g = match args.expr_g.as_deref().map(|s| parse_expr(&mut manager, s)) {
        Some(Ok(e)) => Some(e),
        Some(Err(e)) => {
            eprintln!("error parsing second expression: {e}");
            process::exit(1);
        }
        None => None,
    };
    let h = match args.expr_h.as_deref().map(|s| parse_expr(&mut manager, s)) {
        Some(Ok(e)) => Some(e),
        Some(Err(e)) => {
            eprintln!("error parsing else expression: {e}");
            process::exit(1);
        }
        None => None,
    };

    if args.summary {
        eprintln!("ternary-robdd: op={:?} limit={} vars={}", args.op, args.limit, args.num_vars);
    }

    let result = match run_reduced(&mut manager, args.op, f, g, h, args.heuristic, args.limit) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("operation failed: {e}");
            process::exit(1);
        }
    };

    if args.dot {
        println!("{}", dot::dump_dot(&manager, &[("result", result)]));
    } else if result.is_one() {
        println!("1");
    } else if result.is_zero() {
        println!("0");
    } else if result.is_unknown() {
        println!("U");
    } else {
        let (t, e) = manager.cofactors(result);
        println!("interior node on x{}: then={t:?}, else={e:?}", manager.var_of(result.regular()));
    }
}
