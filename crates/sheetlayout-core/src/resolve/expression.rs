//! Reference expressions: formula templates over named or positional
//! placeholders, e.g. `[price] * [qty]` or `SUM([0])`.

use crate::context::Context;
use crate::element::{Dimension, Element, Identified};
use crate::error::{Result, SheetError};
use crate::formula::FormulaNode;
use crate::resolve::Produces;
use crate::resolve::function;
use crate::resolve::value::{self, Value};
use crate::style::CellStyle;
use sheetlayout_engine::engine::{Expr, PreparedTemplate, RefKey, prepare_template};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub struct ExpressionData {
    pub(crate) template: PreparedTemplate,
    /// Keys bound so far. A key is only bound to an element that is no
    /// longer pending.
    pub(crate) bound: BTreeMap<RefKey, Element>,
    pub(crate) produces: Produces,
}

/// Shared handle to a pending expression.
#[derive(Clone)]
pub struct Expression(pub(crate) Rc<RefCell<ExpressionData>>);

impl Expression {
    /// Parse a template. Malformed templates fail here, not at write time.
    pub fn new(template: &str) -> Result<Expression> {
        let template = prepare_template(template)?;
        Ok(Expression(Rc::new(RefCell::new(ExpressionData {
            template,
            bound: BTreeMap::new(),
            produces: Produces::default(),
        }))))
    }

    /// Id for the element this expression evaluates to. The pending
    /// expression is registered too, so dependants can wait on it.
    pub fn with_id(self, ctx: &Context, id: &str) -> Result<Self> {
        ctx.register_id(id, &Element::from(self.clone()))?;
        self.0.borrow_mut().produces.id = Some(id.to_string());
        Ok(self)
    }

    pub fn with_header(self, ctx: &Context, header: &str) -> Self {
        ctx.register_header(header, &Element::from(self.clone()));
        self.0.borrow_mut().produces.header = Some(header.to_string());
        self
    }

    pub fn cell_style(self, style: CellStyle) -> Self {
        self.0.borrow_mut().produces.cell_style = style;
        self
    }

    pub fn header_style(self, style: CellStyle) -> Self {
        self.0.borrow_mut().produces.header_style = style;
        self
    }

    /// The template as written.
    pub fn template(&self) -> String {
        self.0.borrow().template.source.clone()
    }

    /// True when the template is a single placeholder.
    pub fn is_ref(&self) -> bool {
        self.0.borrow().template.is_ref
    }

    pub fn keys(&self) -> Vec<RefKey> {
        self.0.borrow().template.keys.clone()
    }

    pub fn unresolved_keys(&self) -> Vec<RefKey> {
        let data = self.0.borrow();
        data.template
            .keys
            .iter()
            .filter(|key| !data.bound.contains_key(key))
            .cloned()
            .collect()
    }

    pub fn is_resolved(&self) -> bool {
        self.unresolved_keys().is_empty()
    }

    pub fn ptr_eq(&self, other: &Expression) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Try to bind every unbound key. Positional keys index into
    /// `container`; named keys try the container's children, then the
    /// symbol table. Returns true once every key is bound.
    pub fn attempt_to_resolve(&self, container: Option<&Element>, ctx: &Context) -> bool {
        for key in self.unresolved_keys() {
            let found = match &key {
                RefKey::Index(i) => container.and_then(|c| c.child_at(*i)),
                RefKey::Name(name) => container
                    .and_then(|c| c.child_named(name))
                    .or_else(|| ctx.lookup(name)),
            };
            match found {
                Some(el) if !el.is_pending() => {
                    log::debug!("{:?}: bound [{}]", self.template(), key);
                    self.0.borrow_mut().bound.insert(key, el);
                }
                _ => {}
            }
        }
        self.is_resolved()
    }

    /// Interpret the template against the bound keys. `hint` is the
    /// dimension the surrounding container expects from function calls.
    pub fn evaluate(&self, hint: Option<Dimension>) -> Result<Value> {
        let data = self.0.borrow();
        Evaluator {
            bound: &data.bound,
            source: &data.template.source,
            hint,
        }
        .eval(&data.template.ast)
    }

    /// Evaluate into a layout element and stamp the declared id, header and
    /// styles onto it. With `use_ref`, a bare `[key]` template yields cells
    /// pointing at the target instead of a copy of it.
    pub fn eval(&self, ctx: &Context, hint: Option<Dimension>, use_ref: bool) -> Result<Element> {
        let value = self.evaluate(hint)?;
        let element = value.into_element(use_ref && self.is_ref())?;
        let produces = self.0.borrow().produces.clone();
        produces.apply(&element, ctx)?;
        Ok(element)
    }
}

struct Evaluator<'a> {
    bound: &'a BTreeMap<RefKey, Element>,
    source: &'a str,
    hint: Option<Dimension>,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Scalar(FormulaNode::number(*n))),
            Expr::Text(s) => Ok(Value::Scalar(FormulaNode::text(s.clone()))),
            Expr::Bool(b) => Ok(Value::Scalar(FormulaNode::Literal((*b).into()))),
            Expr::Ref(key) => self.bound.get(key).cloned().map(Value::Element).ok_or_else(|| {
                SheetError::UnresolvedReference {
                    template: self.source.to_string(),
                    keys: vec![key.to_string()],
                    cycle: None,
                }
            }),
            Expr::Index { target, index } => value::index(self.eval(target)?, index),
            Expr::Unary { op, operand } => value::unary(*op, self.eval(operand)?),
            Expr::Binary { op, lhs, rhs } => value::combine(*op, self.eval(lhs)?, self.eval(rhs)?),
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>>>()?;
                function::call(name, args, self.hint)
            }
        }
    }
}

impl Identified for Expression {
    fn id(&self) -> Option<String> {
        self.0.borrow().produces.id.clone()
    }

    fn header(&self) -> Option<String> {
        self.0.borrow().produces.header.clone()
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Expression")
            .field("template", &data.template.source)
            .field("bound", &data.bound.len())
            .field("keys", &data.template.keys.len())
            .finish()
    }
}
