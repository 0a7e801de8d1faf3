// Expression Nodes
//
// Scalar expressions used inside operators. `Expr::Exists` is the only
// variant that carries an operator subtree.

use std::fmt;

use crate::algebra::op::Op;
use crate::common::types::{Value, Var};

/// Number of arguments a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Functions and operators applied by `Expr::Function`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Func {
    // Comparison
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessEquals,
    GreaterEquals,
    // Logical
    And,
    Or,
    Not,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Negate,
    // Built-ins
    Bound,
    If,
    Coalesce,
    /// Named extension function
    Call(String),
}

impl Func {
    pub fn arity(&self) -> Arity {
        match self {
            Func::Not | Func::Negate | Func::Bound => Arity::Exact(1),
            Func::If => Arity::Exact(3),
            Func::Coalesce => Arity::AtLeast(1),
            Func::Call(_) => Arity::AtLeast(0),
            _ => Arity::Exact(2),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Func::Equals => "=",
            Func::NotEquals => "!=",
            Func::LessThan => "<",
            Func::GreaterThan => ">",
            Func::LessEquals => "<=",
            Func::GreaterEquals => ">=",
            Func::And => "&&",
            Func::Or => "||",
            Func::Not => "!",
            Func::Plus => "+",
            Func::Minus => "-",
            Func::Multiply => "*",
            Func::Divide => "/",
            Func::Negate => "neg",
            Func::Bound => "bound",
            Func::If => "if",
            Func::Coalesce => "coalesce",
            Func::Call(name) => name,
        }
    }
}

/// Aggregation semantics of `Expr::Aggregate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Count,
    Sum,
    Min,
    Max,
    Avg,
    Sample,
}

impl AggFunc {
    pub fn name(&self) -> &'static str {
        match self {
            AggFunc::Count => "count",
            AggFunc::Sum => "sum",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Avg => "avg",
            AggFunc::Sample => "sample",
        }
    }
}

/// Represents a scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Constant(Value),
    /// Variable reference
    Var(Var),
    /// Function or operator application
    Function {
        func: Func,
        args: Vec<Expr>,
    },
    /// Aggregate over an argument; `COUNT(*)` has no argument
    Aggregate {
        func: AggFunc,
        distinct: bool,
        arg: Option<Box<Expr>>,
    },
    /// Existence test over a nested operator subtree
    Exists {
        negated: bool,
        op: Box<Op>,
    },
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn int(i: i64) -> Self {
        Expr::Constant(Value::Integer(i))
    }

    pub fn var(name: &str) -> Self {
        Expr::Var(Var::new(name))
    }

    pub fn call(func: Func, args: Vec<Expr>) -> Self {
        Expr::Function { func, args }
    }

    pub fn binary(func: Func, left: Expr, right: Expr) -> Self {
        Expr::Function { func, args: vec![left, right] }
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Expr::binary(Func::Equals, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Expr::binary(Func::GreaterThan, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::binary(Func::LessThan, left, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::binary(Func::And, left, right)
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Function { func: Func::Not, args: vec![expr] }
    }

    pub fn aggregate(func: AggFunc, arg: Expr) -> Self {
        Expr::Aggregate { func, distinct: false, arg: Some(Box::new(arg)) }
    }

    pub fn count_all() -> Self {
        Expr::Aggregate { func: AggFunc::Count, distinct: false, arg: None }
    }

    pub fn exists(op: Op) -> Self {
        Expr::Exists { negated: false, op: Box::new(op) }
    }

    pub fn not_exists(op: Op) -> Self {
        Expr::Exists { negated: true, op: Box::new(op) }
    }

    /// Constants and variable references
    pub fn is_leaf(&self) -> bool {
        matches!(self, Expr::Constant(_) | Expr::Var(_))
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Expr::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "constant",
            Expr::Var(_) => "var",
            Expr::Function { .. } => "function",
            Expr::Aggregate { .. } => "aggregate",
            Expr::Exists { .. } => "exists",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{}", value),
            Expr::Var(var) => write!(f, "{}", var),
            Expr::Function { func, args } => {
                write!(f, "({}", func.symbol())?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Aggregate { func, distinct, arg } => {
                write!(f, "({}", func.name())?;
                if *distinct {
                    write!(f, " distinct")?;
                }
                match arg {
                    Some(arg) => write!(f, " {})", arg),
                    None => write!(f, " *)"),
                }
            }
            Expr::Exists { negated, op } => {
                let keyword = if *negated { "notexists" } else { "exists" };
                write!(f, "({} {})", keyword, op)
            }
        }
    }
}

/// Ordered sequence of expressions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExprList(Vec<Expr>);

impl ExprList {
    pub fn new() -> Self {
        ExprList(Vec::new())
    }

    pub fn push(&mut self, expr: Expr) {
        self.0.push(expr);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Expr> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Expr] {
        &self.0
    }
}

impl From<Vec<Expr>> for ExprList {
    fn from(exprs: Vec<Expr>) -> Self {
        ExprList(exprs)
    }
}

impl FromIterator<Expr> for ExprList {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        ExprList(iter.into_iter().collect())
    }
}

impl IntoIterator for ExprList {
    type Item = Expr;
    type IntoIter = std::vec::IntoIter<Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExprList {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ExprList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, expr) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", expr)?;
        }
        write!(f, ")")
    }
}
