// Operator Nodes
//
// Query plan operators. Composite operators own their children and may own
// expressions (filter conditions, sort keys, bindings) alongside them.

use std::fmt;

use crate::algebra::expr::{Expr, ExprList};
use crate::algebra::var_expr::VarExprList;
use crate::common::types::Var;

/// Join algorithm hint carried through rewrites unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinAlgorithm {
    #[default]
    Auto,
    NestedLoop,
    Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One key of an `Order` operator
#[derive(Debug, Clone, PartialEq)]
pub struct SortCondition {
    pub expr: Expr,
    pub direction: SortDirection,
}

impl SortCondition {
    pub fn asc(expr: Expr) -> Self {
        SortCondition { expr, direction: SortDirection::Ascending }
    }

    pub fn desc(expr: Expr) -> Self {
        SortCondition { expr, direction: SortDirection::Descending }
    }
}

/// Structural shape of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpShape {
    Leaf,
    Unary,
    Binary,
    Nary,
}

/// Represents a node in the operator tree
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Scan a table
    Scan {
        table: String,
        alias: Option<String>,
    },
    /// Produces a single empty row
    Empty,
    /// Keep rows satisfying every expression
    Filter {
        exprs: ExprList,
        input: Box<Op>,
    },
    /// Restrict output to the listed variables
    Project {
        vars: Vec<Var>,
        input: Box<Op>,
    },
    Distinct {
        input: Box<Op>,
    },
    /// Offset/limit window
    Slice {
        offset: Option<u64>,
        limit: Option<u64>,
        input: Box<Op>,
    },
    Order {
        conditions: Vec<SortCondition>,
        input: Box<Op>,
    },
    /// Bind each variable to the value of its expression
    Extend {
        bindings: VarExprList,
        input: Box<Op>,
    },
    /// Group by key bindings and compute aggregate bindings
    Group {
        keys: VarExprList,
        aggregates: VarExprList,
        input: Box<Op>,
    },
    Join {
        left: Box<Op>,
        right: Box<Op>,
        algorithm: JoinAlgorithm,
    },
    /// Optional join; the condition may reference both sides
    LeftJoin {
        left: Box<Op>,
        right: Box<Op>,
        exprs: ExprList,
    },
    Union {
        left: Box<Op>,
        right: Box<Op>,
    },
    Minus {
        left: Box<Op>,
        right: Box<Op>,
    },
    /// Evaluate children in order, feeding each into the next
    Sequence {
        ops: Vec<Op>,
    },
    /// Union of any number of children
    Disjunction {
        ops: Vec<Op>,
    },
}

impl Op {
    pub fn scan(table: &str) -> Self {
        Op::Scan { table: table.to_string(), alias: None }
    }

    pub fn scan_as(table: &str, alias: &str) -> Self {
        Op::Scan { table: table.to_string(), alias: Some(alias.to_string()) }
    }

    pub fn filter(expr: Expr, input: Op) -> Self {
        Op::Filter { exprs: ExprList::from(vec![expr]), input: Box::new(input) }
    }

    pub fn filter_all(exprs: ExprList, input: Op) -> Self {
        Op::Filter { exprs, input: Box::new(input) }
    }

    pub fn project(vars: Vec<Var>, input: Op) -> Self {
        Op::Project { vars, input: Box::new(input) }
    }

    pub fn distinct(input: Op) -> Self {
        Op::Distinct { input: Box::new(input) }
    }

    pub fn slice(offset: Option<u64>, limit: Option<u64>, input: Op) -> Self {
        Op::Slice { offset, limit, input: Box::new(input) }
    }

    pub fn order(conditions: Vec<SortCondition>, input: Op) -> Self {
        Op::Order { conditions, input: Box::new(input) }
    }

    pub fn extend(bindings: VarExprList, input: Op) -> Self {
        Op::Extend { bindings, input: Box::new(input) }
    }

    pub fn group(keys: VarExprList, aggregates: VarExprList, input: Op) -> Self {
        Op::Group { keys, aggregates, input: Box::new(input) }
    }

    pub fn join(left: Op, right: Op) -> Self {
        Op::Join { left: Box::new(left), right: Box::new(right), algorithm: JoinAlgorithm::Auto }
    }

    pub fn join_with(left: Op, right: Op, algorithm: JoinAlgorithm) -> Self {
        Op::Join { left: Box::new(left), right: Box::new(right), algorithm }
    }

    pub fn left_join(left: Op, right: Op, exprs: ExprList) -> Self {
        Op::LeftJoin { left: Box::new(left), right: Box::new(right), exprs }
    }

    pub fn union(left: Op, right: Op) -> Self {
        Op::Union { left: Box::new(left), right: Box::new(right) }
    }

    pub fn minus(left: Op, right: Op) -> Self {
        Op::Minus { left: Box::new(left), right: Box::new(right) }
    }

    pub fn sequence(ops: Vec<Op>) -> Self {
        Op::Sequence { ops }
    }

    pub fn disjunction(ops: Vec<Op>) -> Self {
        Op::Disjunction { ops }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Op::Scan { .. } => "scan",
            Op::Empty => "empty",
            Op::Filter { .. } => "filter",
            Op::Project { .. } => "project",
            Op::Distinct { .. } => "distinct",
            Op::Slice { .. } => "slice",
            Op::Order { .. } => "order",
            Op::Extend { .. } => "extend",
            Op::Group { .. } => "group",
            Op::Join { .. } => "join",
            Op::LeftJoin { .. } => "leftjoin",
            Op::Union { .. } => "union",
            Op::Minus { .. } => "minus",
            Op::Sequence { .. } => "sequence",
            Op::Disjunction { .. } => "disjunction",
        }
    }

    pub fn shape(&self) -> OpShape {
        match self {
            Op::Scan { .. } | Op::Empty => OpShape::Leaf,
            Op::Filter { .. }
            | Op::Project { .. }
            | Op::Distinct { .. }
            | Op::Slice { .. }
            | Op::Order { .. }
            | Op::Extend { .. }
            | Op::Group { .. } => OpShape::Unary,
            Op::Join { .. } | Op::LeftJoin { .. } | Op::Union { .. } | Op::Minus { .. } => {
                OpShape::Binary
            }
            Op::Sequence { .. } | Op::Disjunction { .. } => OpShape::Nary,
        }
    }

    /// True for every operator that has child operators
    pub fn is_composite(&self) -> bool {
        self.shape() != OpShape::Leaf
    }

    /// Child operators in the order they are held
    pub fn children(&self) -> Vec<&Op> {
        match self {
            Op::Scan { .. } | Op::Empty => Vec::new(),
            Op::Filter { input, .. }
            | Op::Project { input, .. }
            | Op::Distinct { input }
            | Op::Slice { input, .. }
            | Op::Order { input, .. }
            | Op::Extend { input, .. }
            | Op::Group { input, .. } => vec![input.as_ref()],
            Op::Join { left, right, .. }
            | Op::LeftJoin { left, right, .. }
            | Op::Union { left, right }
            | Op::Minus { left, right } => vec![left.as_ref(), right.as_ref()],
            Op::Sequence { ops } | Op::Disjunction { ops } => ops.iter().collect(),
        }
    }

    /// Expressions owned directly by this operator, in visiting order
    pub fn exprs(&self) -> Vec<&Expr> {
        match self {
            Op::Filter { exprs, .. } | Op::LeftJoin { exprs, .. } => exprs.iter().collect(),
            Op::Order { conditions, .. } => conditions.iter().map(|c| &c.expr).collect(),
            Op::Extend { bindings, .. } => bindings.exprs().collect(),
            Op::Group { keys, aggregates, .. } => keys.exprs().chain(aggregates.exprs()).collect(),
            _ => Vec::new(),
        }
    }
}

fn write_vars(f: &mut fmt::Formatter<'_>, vars: &[Var]) -> fmt::Result {
    write!(f, "(")?;
    for (i, var) in vars.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", var)?;
    }
    write!(f, ")")
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: Option<u64>) -> fmt::Result {
    match bound {
        Some(n) => write!(f, "{}", n),
        None => write!(f, "_"),
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Scan { table, alias } => match alias {
                Some(a) => write!(f, "(scan {} as {})", table, a),
                None => write!(f, "(scan {})", table),
            },
            Op::Empty => write!(f, "(empty)"),
            Op::Filter { exprs, input } => write!(f, "(filter {} {})", exprs, input),
            Op::Project { vars, input } => {
                write!(f, "(project ")?;
                write_vars(f, vars)?;
                write!(f, " {})", input)
            }
            Op::Distinct { input } => write!(f, "(distinct {})", input),
            Op::Slice { offset, limit, input } => {
                write!(f, "(slice ")?;
                write_bound(f, *offset)?;
                write!(f, " ")?;
                write_bound(f, *limit)?;
                write!(f, " {})", input)
            }
            Op::Order { conditions, input } => {
                write!(f, "(order (")?;
                for (i, cond) in conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match cond.direction {
                        SortDirection::Ascending => write!(f, "(asc {})", cond.expr)?,
                        SortDirection::Descending => write!(f, "(desc {})", cond.expr)?,
                    }
                }
                write!(f, ") {})", input)
            }
            Op::Extend { bindings, input } => write!(f, "(extend {} {})", bindings, input),
            Op::Group { keys, aggregates, input } => {
                write!(f, "(group {} {} {})", keys, aggregates, input)
            }
            Op::Join { left, right, algorithm } => match algorithm {
                JoinAlgorithm::Auto => write!(f, "(join {} {})", left, right),
                other => write!(f, "(join[{:?}] {} {})", other, left, right),
            },
            Op::LeftJoin { left, right, exprs } => {
                if exprs.is_empty() {
                    write!(f, "(leftjoin {} {})", left, right)
                } else {
                    write!(f, "(leftjoin {} {} {})", left, right, exprs)
                }
            }
            Op::Union { left, right } => write!(f, "(union {} {})", left, right),
            Op::Minus { left, right } => write!(f, "(minus {} {})", left, right),
            Op::Sequence { ops } | Op::Disjunction { ops } => {
                write!(f, "({}", self.name())?;
                for op in ops {
                    write!(f, " {}", op)?;
                }
                write!(f, ")")
            }
        }
    }
}
