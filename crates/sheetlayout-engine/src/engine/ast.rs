//! Restricted expression tree for reference templates.
//!
//! The supported operator set is exactly what [`BinaryOp`] and [`UnaryOp`]
//! enumerate; there is no general-purpose evaluation.

use super::deps::RefKey;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinaryOp {
    /// Spreadsheet formula spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Concat => "&",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Percent,
}

/// Index applied to a referenced element with postfix `[...]`.
#[derive(Clone, Debug, PartialEq)]
pub enum IndexKey {
    Position(usize),
    Name(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    Ref(RefKey),
    Index {
        target: Box<Expr>,
        index: IndexKey,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Every reference key used by the expression, in evaluation order.
    pub fn refs(&self) -> Vec<&RefKey> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a RefKey>) {
        match self {
            Expr::Ref(key) => out.push(key),
            Expr::Index { target, .. } => target.collect_refs(out),
            Expr::Unary { operand, .. } => operand.collect_refs(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_refs(out);
                rhs.collect_refs(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_refs(out);
                }
            }
            Expr::Number(_) | Expr::Text(_) | Expr::Bool(_) => {}
        }
    }

    /// True if the tree contains a function call anywhere.
    pub fn has_call(&self) -> bool {
        match self {
            Expr::Call { .. } => true,
            Expr::Index { target, .. } => target.has_call(),
            Expr::Unary { operand, .. } => operand.has_call(),
            Expr::Binary { lhs, rhs, .. } => lhs.has_call() || rhs.has_call(),
            Expr::Number(_) | Expr::Text(_) | Expr::Bool(_) | Expr::Ref(_) => false,
        }
    }
}
