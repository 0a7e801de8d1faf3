// Transform Core
//
// Bottom-up rebuild of operator and expression trees. Children are
// transformed first, in the same order the walker visits them; the node is
// then rebuilt with the new children and handed to the rewrite callback
// together with the original. The input tree is only read, never modified.
//
// Like the walker, the transform runs off a heap work stack; rebuilt children
// wait on value stacks until their parent's `Leave*` step claims them.

use log::trace;

use crate::algebra::expr::{Expr, ExprList};
use crate::algebra::op::{Op, SortCondition};
use crate::algebra::var_expr::VarExprList;
use crate::walker::check::{check_expr, check_op, descend};
use crate::walker::config::WalkerConfig;
use crate::walker::error::{Result, WalkError};
use crate::walker::step::{Step, push_expr_children, push_op_children};
use crate::walker::transform::{ExprTransform, IdentityExprTransform, IdentityOpTransform, OpTransform};
use crate::walker::visitor::OpVisitor;

/// Bottom-up rewriter bound to a pair of transforms
pub struct Transformer<'a> {
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
    config: WalkerConfig,
}

impl Default for Transformer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Transformer<'a> {
    /// Create a transformer with identity transforms and the default configuration
    pub fn new() -> Self {
        Transformer {
            op_transform: None,
            expr_transform: None,
            before: None,
            after: None,
            config: WalkerConfig::default(),
        }
    }

    pub fn op_transform(mut self, transform: &'a mut dyn OpTransform) -> Self {
        self.op_transform = Some(transform);
        self
    }

    pub fn expr_transform(mut self, transform: &'a mut dyn ExprTransform) -> Self {
        self.expr_transform = Some(transform);
        self
    }

    /// Instrumentation hook fired on entering each composite operator
    pub fn before(mut self, hook: &'a mut dyn OpVisitor) -> Self {
        self.before = Some(hook);
        self
    }

    /// Instrumentation hook fired on leaving each composite operator
    pub fn after(mut self, hook: &'a mut dyn OpVisitor) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn config(mut self, config: WalkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transform_op(&mut self, op: &Op) -> Result<Op> {
        let mut built = Rebuilt::default();
        self.run(Step::EnterOp(op, 0), &mut built)?;
        built.op(op.name())
    }

    pub fn transform_expr(&mut self, expr: &Expr) -> Result<Expr> {
        let mut built = Rebuilt::default();
        self.run(Step::EnterExpr(expr, 0), &mut built)?;
        built.expr(expr.name())
    }

    pub fn transform_expr_list(&mut self, exprs: &ExprList) -> Result<ExprList> {
        exprs.iter().map(|expr| self.transform_expr(expr)).collect()
    }

    /// Transform each bound expression, keeping variables and their order
    pub fn transform_var_expr_list(&mut self, bindings: &VarExprList) -> Result<VarExprList> {
        let mut rebuilt = VarExprList::new();
        for (var, expr) in bindings.iter() {
            let expr = self.transform_expr(expr)?;
            rebuilt.add(var.clone(), expr)?;
        }
        Ok(rebuilt)
    }

    fn run(&mut self, root: Step<'_>, built: &mut Rebuilt) -> Result<()> {
        let mut stack = vec![root];
        while let Some(step) = stack.pop() {
            match step {
                Step::EnterOp(op, depth) => {
                    let depth = descend(depth, self.config.max_depth)?;
                    trace!("Transforming {} operator at depth {}", op.name(), depth);
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
                    let depth = descend(depth, self.config.max_depth)?;
                    trace!("Transforming {} expression at depth {}", expr.name(), depth);
                    check_expr(expr)?;
                    stack.push(Step::LeaveExpr(expr));
                    push_expr_children(expr, depth, &mut stack);
                }
                Step::LeaveOp(op) => {
                    let rebuilt = built.rebuild_op(op)?;
                    // Expression rewrites must leave group aggregates as aggregates
                    check_op(&rebuilt)?;
                    let result = self.rewrite_op(op, rebuilt)?;
                    if op.is_composite() {
                        if let Some(hook) = self.after.as_mut() {
                            hook.visit_op(op)?;
                        }
                    }
                    built.ops.push(result);
                }
                Step::LeaveExpr(expr) => {
                    let rebuilt = built.rebuild_expr(expr)?;
                    let result = self.rewrite_expr(expr, rebuilt)?;
                    built.exprs.push(result);
                }
            }
        }
        Ok(())
    }

    fn rewrite_op(&mut self, original: &Op, rebuilt: Op) -> Result<Op> {
        match self.op_transform.as_mut() {
            Some(transform) => transform.transform_op(original, rebuilt),
            None => IdentityOpTransform.transform_op(original, rebuilt),
        }
    }

    fn rewrite_expr(&mut self, original: &Expr, rebuilt: Expr) -> Result<Expr> {
        match self.expr_transform.as_mut() {
            Some(transform) => transform.transform_expr(original, rebuilt),
            None => IdentityExprTransform.transform_expr(original, rebuilt),
        }
    }
}

/// Transformed nodes waiting to be claimed by their parent, in walk order
#[derive(Default)]
struct Rebuilt {
    ops: Vec<Op>,
    exprs: Vec<Expr>,
}

impl Rebuilt {
    fn op(&mut self, parent: &str) -> Result<Op> {
        self.ops.pop().ok_or_else(|| missing(parent))
    }

    fn expr(&mut self, parent: &str) -> Result<Expr> {
        self.exprs.pop().ok_or_else(|| missing(parent))
    }

    fn ops(&mut self, count: usize, parent: &str) -> Result<Vec<Op>> {
        let start = self.ops.len().checked_sub(count).ok_or_else(|| missing(parent))?;
        Ok(self.ops.split_off(start))
    }

    fn exprs(&mut self, count: usize, parent: &str) -> Result<Vec<Expr>> {
        let start = self.exprs.len().checked_sub(count).ok_or_else(|| missing(parent))?;
        Ok(self.exprs.split_off(start))
    }

    /// Same variant as `op`, non-recursive attributes copied, children taken from the stacks
    fn rebuild_op(&mut self, op: &Op) -> Result<Op> {
        let name = op.name();
        let rebuilt = match op {
            Op::Scan { .. } | Op::Empty => op.clone(),
            Op::Filter { exprs, input: _ } => Op::Filter {
                exprs: ExprList::from(self.exprs(exprs.len(), name)?),
                input: Box::new(self.op(name)?),
            },
            Op::Project { vars, input: _ } => Op::Project {
                vars: vars.clone(),
                input: Box::new(self.op(name)?),
            },
            Op::Distinct { input: _ } => Op::Distinct {
                input: Box::new(self.op(name)?),
            },
            Op::Slice { offset, limit, input: _ } => Op::Slice {
                offset: *offset,
                limit: *limit,
                input: Box::new(self.op(name)?),
            },
            Op::Order { conditions, input: _ } => {
                let exprs = self.exprs(conditions.len(), name)?;
                let conditions = conditions
                    .iter()
                    .zip(exprs)
                    .map(|(condition, expr)| SortCondition { expr, direction: condition.direction })
                    .collect();
                Op::Order { conditions, input: Box::new(self.op(name)?) }
            }
            Op::Extend { bindings, input: _ } => {
                let exprs = self.exprs(bindings.len(), name)?;
                Op::Extend {
                    bindings: rebind(bindings, exprs)?,
                    input: Box::new(self.op(name)?),
                }
            }
            Op::Group { keys, aggregates, input: _ } => {
                // aggregates were rebuilt after keys, so they sit on top
                let new_aggregates = self.exprs(aggregates.len(), name)?;
                let new_keys = self.exprs(keys.len(), name)?;
                Op::Group {
                    keys: rebind(keys, new_keys)?,
                    aggregates: rebind(aggregates, new_aggregates)?,
                    input: Box::new(self.op(name)?),
                }
            }
            Op::Join { algorithm, .. } => {
                let right = self.op(name)?;
                let left = self.op(name)?;
                Op::Join { left: Box::new(left), right: Box::new(right), algorithm: *algorithm }
            }
            Op::LeftJoin { exprs, .. } => {
                let exprs = ExprList::from(self.exprs(exprs.len(), name)?);
                let right = self.op(name)?;
                let left = self.op(name)?;
                Op::LeftJoin { left: Box::new(left), right: Box::new(right), exprs }
            }
            Op::Union { .. } => {
                let right = self.op(name)?;
                let left = self.op(name)?;
                Op::Union { left: Box::new(left), right: Box::new(right) }
            }
            Op::Minus { .. } => {
                let right = self.op(name)?;
                let left = self.op(name)?;
                Op::Minus { left: Box::new(left), right: Box::new(right) }
            }
            Op::Sequence { ops } => Op::Sequence { ops: self.ops(ops.len(), name)? },
            Op::Disjunction { ops } => Op::Disjunction { ops: self.ops(ops.len(), name)? },
        };
        Ok(rebuilt)
    }

    fn rebuild_expr(&mut self, expr: &Expr) -> Result<Expr> {
        let name = expr.name();
        let rebuilt = match expr {
            Expr::Constant(_) | Expr::Var(_) => expr.clone(),
            Expr::Function { func, args } => Expr::Function {
                func: func.clone(),
                args: self.exprs(args.len(), name)?,
            },
            Expr::Aggregate { func, distinct, arg } => Expr::Aggregate {
                func: *func,
                distinct: *distinct,
                arg: match arg {
                    Some(_) => Some(Box::new(self.expr(name)?)),
                    None => None,
                },
            },
            Expr::Exists { negated, .. } => Expr::Exists {
                negated: *negated,
                op: Box::new(self.op(name)?),
            },
        };
        Ok(rebuilt)
    }
}

// Pair the original variables, in order, with their rebuilt expressions
fn rebind(bindings: &VarExprList, exprs: Vec<Expr>) -> Result<VarExprList> {
    Ok(VarExprList::from_pairs(bindings.vars().cloned().zip(exprs))?)
}

fn missing(parent: &str) -> WalkError {
    WalkError::malformed(parent, "rebuilt children missing")
}
