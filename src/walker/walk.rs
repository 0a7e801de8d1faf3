// Traversal Core
//
// Recursive descent over operator and expression trees. Operators and
// expressions recurse into each other: operators own expressions, and
// `Expr::Exists` owns an operator subtree that is walked with the same
// visitors and hooks as the top-level tree.
//
// Each node's own callback fires after its children (post-order). For a
// composite operator the full sequence is:
//
//   before(op), owned expressions / child operators, visit(op), after(op)
//
// where unary operators visit owned expressions before their input and binary
// operators visit them after both inputs. Leaf operators get no hooks.
// Malformed nodes are rejected on entry, before any hook or child.
//
// The walk runs off a heap work stack (see `step`), so only the configured
// depth limit bounds how deep a tree can be.

use log::trace;

use crate::algebra::expr::{Expr, ExprList};
use crate::algebra::op::Op;
use crate::algebra::var_expr::VarExprList;
use crate::walker::check::{check_expr, check_op, descend};
use crate::walker::config::WalkerConfig;
use crate::walker::error::Result;
use crate::walker::step::{Step, push_expr_children, push_op_children};
use crate::walker::visitor::{ExprVisitor, NoopExprVisitor, NoopOpVisitor, OpVisitor};

/// Counters collected while walking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Operators passed to the operator visitor
    pub ops: usize,
    /// Expressions passed to the expression visitor
    pub exprs: usize,
    /// Deepest nesting reached, counting both node sorts
    pub max_depth: usize,
}

/// Read-only walker bound to a set of visitors
pub struct Walker<'a> {
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
    config: WalkerConfig,
    stats: WalkStats,
}

impl Default for Walker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Walker<'a> {
    /// Create a walker with no-op visitors and the default configuration
    pub fn new() -> Self {
        Walker {
            op_visitor: None,
            expr_visitor: None,
            before: None,
            after: None,
            config: WalkerConfig::default(),
            stats: WalkStats::default(),
        }
    }

    pub fn op_visitor(mut self, visitor: &'a mut dyn OpVisitor) -> Self {
        self.op_visitor = Some(visitor);
        self
    }

    pub fn expr_visitor(mut self, visitor: &'a mut dyn ExprVisitor) -> Self {
        self.expr_visitor = Some(visitor);
        self
    }

    /// Hook fired on entering each composite operator
    pub fn before(mut self, hook: &'a mut dyn OpVisitor) -> Self {
        self.before = Some(hook);
        self
    }

    /// Hook fired on leaving each composite operator
    pub fn after(mut self, hook: &'a mut dyn OpVisitor) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn config(mut self, config: WalkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Walk every operator and expression reachable from `op`
    pub fn walk_op(&mut self, op: &Op) -> Result<()> {
        self.run(Step::EnterOp(op, 0))
    }

    /// Walk every expression and nested operator reachable from `expr`
    pub fn walk_expr(&mut self, expr: &Expr) -> Result<()> {
        self.run(Step::EnterExpr(expr, 0))
    }

    /// Walk each expression of the list in order
    pub fn walk_expr_list(&mut self, exprs: &ExprList) -> Result<()> {
        for expr in exprs {
            self.walk_expr(expr)?;
        }
        Ok(())
    }

    /// Walk each bound expression in binding order; variables are not visited
    pub fn walk_var_expr_list(&mut self, bindings: &VarExprList) -> Result<()> {
        for expr in bindings.exprs() {
            self.walk_expr(expr)?;
        }
        Ok(())
    }

    fn run(&mut self, root: Step<'_>) -> Result<()> {
        let mut stack = vec![root];
        while let Some(step) = stack.pop() {
            match step {
                Step::EnterOp(op, depth) => {
                    let depth = self.enter(depth)?;
                    trace!("Walking {} operator at depth {}", op.name(), depth);
                    check_op(op)?;
                    if op.is_composite() {
                        if let Some(hook) = self.before.as_mut() {
                            hook.visit_op(op)?;
                        }
                    }
                    stack.push(Step::LeaveOp(op));
                    push_op_children(op, depth, &mut stack);
                }
                Step::EnterExpr(expr, depth) => {
                    let depth = self.enter(depth)?;
                    trace!("Walking {} expression at depth {}", expr.name(), depth);
                    check_expr(expr)?;
                    stack.push(Step::LeaveExpr(expr));
                    push_expr_children(expr, depth, &mut stack);
                }
                Step::LeaveOp(op) => {
                    self.visit_op(op)?;
                    if op.is_composite() {
                        if let Some(hook) = self.after.as_mut() {
                            hook.visit_op(op)?;
                        }
                    }
                }
                Step::LeaveExpr(expr) => self.visit_expr(expr)?,
            }
        }
        Ok(())
    }

    fn enter(&mut self, depth: usize) -> Result<usize> {
        let depth = descend(depth, self.config.max_depth)?;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        Ok(depth)
    }

    fn visit_op(&mut self, op: &Op) -> Result<()> {
        self.stats.ops += 1;
        match self.op_visitor.as_mut() {
            Some(visitor) => visitor.visit_op(op),
            None => NoopOpVisitor.visit_op(op),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        self.stats.exprs += 1;
        match self.expr_visitor.as_mut() {
            Some(visitor) => visitor.visit_expr(expr),
            None => NoopExprVisitor.visit_expr(expr),
        }
    }
}
