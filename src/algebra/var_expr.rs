// Variable-Expression Lists
//
// Ordered bindings of variables to expressions, as owned by extend and
// group operators. Variables are unique and insertion order is kept.

use std::fmt;

use linked_hash_map::LinkedHashMap;

use crate::algebra::error::{AlgebraError, Result};
use crate::algebra::expr::Expr;
use crate::common::types::Var;

/// Ordered variable to expression bindings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarExprList {
    bindings: LinkedHashMap<Var, Expr>,
}

impl VarExprList {
    pub fn new() -> Self {
        VarExprList {
            bindings: LinkedHashMap::new(),
        }
    }

    /// Build from pairs, rejecting repeated variables
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Var, Expr)>,
    {
        let mut list = VarExprList::new();
        for (var, expr) in pairs {
            list.add(var, expr)?;
        }
        Ok(list)
    }

    /// Append a binding at the end of the list
    pub fn add(&mut self, var: Var, expr: Expr) -> Result<()> {
        if self.bindings.contains_key(&var) {
            return Err(AlgebraError::DuplicateVariable(var));
        }
        self.bindings.insert(var, expr);
        Ok(())
    }

    pub fn get(&self, var: &Var) -> Option<&Expr> {
        self.bindings.get(var)
    }

    pub fn contains(&self, var: &Var) -> bool {
        self.bindings.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Variables in binding order
    pub fn vars(&self) -> impl Iterator<Item = &Var> {
        self.bindings.keys()
    }

    /// Expressions in binding order
    pub fn exprs(&self) -> impl Iterator<Item = &Expr> {
        self.bindings.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, &Expr)> {
        self.bindings.iter()
    }
}

impl fmt::Display for VarExprList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (var, expr)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "({} {})", var, expr)?;
        }
        write!(f, ")")
    }
}
