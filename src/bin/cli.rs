use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use algwalk::algebra::{AggFunc, Expr, ExprList, Op, SortCondition, VarExprList};
use algwalk::common::Var;
use algwalk::walker::{self, Transformer, WalkError, Walker, WalkerConfig};

#[derive(Parser)]
#[command(author, version, about = "algwalk - walk and rewrite sample query algebra plans")]
struct Cli {
    /// Sample plan to operate on (see `list`)
    #[arg(short, long, default_value = "filter-project")]
    sample: String,

    /// Maximum nesting depth before the walk is aborted
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available sample plans
    List,

    /// Print a sample plan
    Show,

    /// Print every variable referenced by an expression, in visiting order
    Vars,

    /// Print node counts and nesting depth
    Stats,

    /// Print composite operators as nested scopes
    Scopes,

    /// Replace scans of one table with scans of another
    Retarget {
        /// Table to replace
        #[arg(long)]
        from: String,

        /// Replacement table
        #[arg(long)]
        to: String,
    },
}

const SAMPLES: &[(&str, &str)] = &[
    ("filter-project", "filter over a projection of a single scan"),
    ("exists", "filter whose condition tests a nested subquery"),
    ("grouped-join", "grouped, extended and ordered join of two tables"),
    ("union", "union of filtered scans under a slice"),
];

fn sample(name: &str) -> Result<Op> {
    let plan = match name {
        "filter-project" => Op::filter(
            Expr::gt(Expr::var("x"), Expr::int(5)),
            Op::project(vec![Var::new("x")], Op::scan("T")),
        ),
        "exists" => Op::filter(
            Expr::and(
                Expr::exists(Op::filter(
                    Expr::equals(Expr::var("o"), Expr::var("id")),
                    Op::scan("S"),
                )),
                Expr::lt(Expr::var("age"), Expr::int(30)),
            ),
            Op::scan("T"),
        ),
        "grouped-join" => {
            let keys = VarExprList::from_pairs(vec![(Var::new("dept"), Expr::var("dept"))])?;
            let aggregates = VarExprList::from_pairs(vec![
                (Var::new("n"), Expr::count_all()),
                (Var::new("total"), Expr::aggregate(AggFunc::Sum, Expr::var("salary"))),
            ])?;
            let bindings = VarExprList::from_pairs(vec![(
                Var::new("avg"),
                Expr::binary(
                    algwalk::algebra::Func::Divide,
                    Expr::var("total"),
                    Expr::var("n"),
                ),
            )])?;
            Op::order(
                vec![SortCondition::desc(Expr::var("avg"))],
                Op::extend(
                    bindings,
                    Op::group(
                        keys,
                        aggregates,
                        Op::join(Op::scan_as("employees", "e"), Op::scan_as("departments", "d")),
                    ),
                ),
            )
        }
        "union" => Op::slice(
            None,
            Some(10),
            Op::union(
                Op::filter(Expr::gt(Expr::var("x"), Expr::int(1)), Op::scan("A")),
                Op::left_join(
                    Op::scan("B"),
                    Op::scan("C"),
                    ExprList::from(vec![Expr::equals(Expr::var("b"), Expr::var("c"))]),
                ),
            ),
        ),
        other => return Err(anyhow!("Unknown sample '{}', try `algwalk list`", other)),
    };
    Ok(plan)
}

fn collect_vars(plan: &Op, config: WalkerConfig) -> Result<Vec<Var>> {
    let mut vars = Vec::new();
    let mut on_expr = |expr: &Expr| -> walker::Result<()> {
        if let Some(var) = expr.as_var() {
            vars.push(var.clone());
        }
        Ok(())
    };
    Walker::new().config(config).expr_visitor(&mut on_expr).walk_op(plan)?;
    Ok(vars)
}

fn print_scopes(plan: &Op, config: WalkerConfig) -> Result<()> {
    let depth = std::cell::Cell::new(0usize);
    let mut before = |op: &Op| -> walker::Result<()> {
        println!("{}{} {{", "  ".repeat(depth.get()), op.name());
        depth.set(depth.get() + 1);
        Ok(())
    };
    let mut after = |_: &Op| -> walker::Result<()> {
        depth.set(depth.get() - 1);
        println!("{}}}", "  ".repeat(depth.get()));
        Ok(())
    };
    let mut on_op = |op: &Op| -> walker::Result<()> {
        if !op.is_composite() {
            println!("{}{}", "  ".repeat(depth.get()), op);
        }
        Ok(())
    };
    Walker::new()
        .config(config)
        .op_visitor(&mut on_op)
        .before(&mut before)
        .after(&mut after)
        .walk_op(plan)?;
    Ok(())
}

fn retarget(plan: &Op, from: &str, to: &str, config: WalkerConfig) -> Result<Op> {
    let mut replace = |_: &Op, rebuilt: Op| -> walker::Result<Op> {
        Ok(match rebuilt {
            Op::Scan { table, alias } if table == from => Op::Scan { table: to.to_string(), alias },
            other => other,
        })
    };
    let rewritten = Transformer::new()
        .config(config)
        .op_transform(&mut replace)
        .transform_op(plan)?;
    Ok(rewritten)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.max_depth {
        Some(depth) => WalkerConfig::with_max_depth(depth),
        None => WalkerConfig::default(),
    };

    if let Commands::List = cli.command {
        for (name, description) in SAMPLES {
            println!("{:<16} {}", name, description);
        }
        return Ok(());
    }

    let plan = sample(&cli.sample)?;

    match cli.command {
        Commands::List => {}
        Commands::Show => println!("{}", plan),
        Commands::Vars => {
            let vars = collect_vars(&plan, config)?;
            let names: Vec<String> = vars.iter().map(|v| v.to_string()).collect();
            println!("{}", names.join(" "));
        }
        Commands::Stats => {
            let mut walker = Walker::new().config(config);
            match walker.walk_op(&plan) {
                Ok(()) => {}
                Err(WalkError::DepthExceeded(max)) => {
                    return Err(anyhow!("Plan is nested deeper than {} levels", max));
                }
                Err(e) => return Err(e.into()),
            }
            let stats = walker.stats();
            println!("operators:   {}", stats.ops);
            println!("expressions: {}", stats.exprs);
            println!("max depth:   {}", stats.max_depth);
        }
        Commands::Scopes => print_scopes(&plan, config)?,
        Commands::Retarget { from, to } => {
            let rewritten = retarget(&plan, &from, &to, config)?;
            println!("before: {}", plan);
            println!("after:  {}", rewritten);
        }
    }

    Ok(())
}
