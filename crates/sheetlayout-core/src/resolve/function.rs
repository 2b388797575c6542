//! Spreadsheet function calls over layout elements.
//!
//! A call decides its own result shape:
//!
//! - scalar: dimensioned operands become range references, one cell results
//! - vector: one scalar call per position, up to the shortest
//!   one-dimensional operand; frames collapse to the span across their
//!   vectors at that position, and scalars are repeated
//! - frame results are not supported
//!
//! Without an explicit [`FunctionCall::returning`], the shape comes from the
//! container the call sits in at resolution time.

use crate::context::Context;
use crate::element::{
    Cell, CellValue, Dimension, Element, Frame, Identified, Orientation, Stack, Vector,
};
use crate::error::{Result, SheetError};
use crate::formula::FormulaNode;
use crate::resolve::Produces;
use crate::resolve::expression::Expression;
use crate::resolve::value::{Series, Value, pending_error, vector_series};
use crate::style::CellStyle;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One argument as given by the caller.
#[derive(Clone, Debug)]
pub enum Operand {
    Literal(CellValue),
    Element(Element),
    /// Sugar for an [`Expression`] built from this template.
    Template(String),
    /// Spread into separate operands.
    List(Vec<Operand>),
    /// Range between two cells.
    Span(Cell, Cell),
}

macro_rules! operand_from_element {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Operand {
                    Operand::Element(value.into())
                }
            }
        )+
    };
}

operand_from_element!(Element, Cell, Vector, Frame, Stack, Expression, FunctionCall);

macro_rules! operand_from_literal {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Operand {
                    Operand::Literal(value.into())
                }
            }
        )+
    };
}

operand_from_literal!(f64, i32, i64, u32, bool, &str, String, CellValue);

impl Operand {
    /// An expression operand, e.g. `Operand::template("[a] * 2")`.
    pub fn template(text: impl Into<String>) -> Operand {
        Operand::Template(text.into())
    }

    pub fn literal(value: impl Into<CellValue>) -> Operand {
        Operand::Literal(value.into())
    }
}

/// Operand after flattening and validation.
#[derive(Clone)]
pub(crate) enum Arg {
    Literal(CellValue),
    Element(Element),
    Expr(Expression),
    Span(Cell, Cell),
}

pub struct FunctionData {
    pub(crate) name: String,
    pub(crate) args: Vec<Arg>,
    pub(crate) result: Option<Dimension>,
    pub(crate) produces: Produces,
}

/// Shared handle to a pending function call.
#[derive(Clone)]
pub struct FunctionCall(pub(crate) Rc<RefCell<FunctionData>>);

impl FunctionCall {
    pub fn new(name: &str, operands: impl IntoIterator<Item = impl Into<Operand>>) -> Result<FunctionCall> {
        let name = validate_name(name)?;
        let mut args = Vec::new();
        for operand in operands {
            flatten(&name, operand.into(), &mut args)?;
        }
        Ok(FunctionCall(Rc::new(RefCell::new(FunctionData {
            name,
            args,
            result: None,
            produces: Produces::default(),
        }))))
    }

    /// Force the result dimension instead of taking it from the container.
    pub fn returning(self, dimension: Dimension) -> Self {
        self.0.borrow_mut().result = Some(dimension);
        self
    }

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

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn ptr_eq(&self, other: &FunctionCall) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Keys the embedded expressions are still waiting on, as text.
    pub fn unresolved_keys(&self) -> Vec<String> {
        self.expressions()
            .iter()
            .flat_map(|expr| expr.unresolved_keys())
            .map(|key| key.to_string())
            .collect()
    }

    fn expressions(&self) -> Vec<Expression> {
        self.0
            .borrow()
            .args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Expr(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Resolve embedded expressions against `container`. True when every
    /// operand is ready.
    pub fn attempt_to_resolve(&self, container: Option<&Element>, ctx: &Context) -> bool {
        let args = self.0.borrow().args.clone();
        let mut ready = true;
        for arg in &args {
            match arg {
                Arg::Expr(e) => ready &= e.attempt_to_resolve(container, ctx),
                Arg::Element(el) => ready &= !el.is_pending(),
                Arg::Literal(_) | Arg::Span(..) => {}
            }
        }
        ready
    }

    /// Build the result value. `hint` is the container's expectation; an
    /// explicit [`FunctionCall::returning`] wins over it.
    pub fn evaluate(&self, hint: Option<Dimension>) -> Result<Value> {
        let (name, args, result) = {
            let data = self.0.borrow();
            (data.name.clone(), data.args.clone(), data.result)
        };
        let values = args
            .into_iter()
            .map(|arg| match arg {
                Arg::Literal(value) => Ok(Value::Scalar(FormulaNode::Literal(value))),
                Arg::Element(el) => Ok(Value::Element(el)),
                Arg::Expr(e) => e.evaluate(Some(Dimension::Scalar)),
                Arg::Span(a, b) => Ok(Value::Scalar(FormulaNode::Span(a, b))),
            })
            .collect::<Result<Vec<_>>>()?;
        call(&name, values, result.or(hint))
    }

    pub fn eval(&self, ctx: &Context, hint: Option<Dimension>) -> Result<Element> {
        let element = self.evaluate(hint)?.into_element(false)?;
        let produces = self.0.borrow().produces.clone();
        produces.apply(&element, ctx)?;
        Ok(element)
    }

    /// Short form for messages: `SUM(3 operands)`.
    pub(crate) fn describe(&self) -> String {
        let data = self.0.borrow();
        format!("{}({} operands)", data.name, data.args.len())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let upper = name.trim().to_ascii_uppercase();
    let mut chars = upper.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if !valid {
        return Err(SheetError::InvalidFunctionName(name.to_string()));
    }
    Ok(upper)
}

fn flatten(name: &str, operand: Operand, out: &mut Vec<Arg>) -> Result<()> {
    match operand {
        Operand::List(items) => {
            for item in items {
                flatten(name, item, out)?;
            }
        }
        Operand::Literal(value) => out.push(Arg::Literal(value)),
        Operand::Template(text) => out.push(Arg::Expr(Expression::new(&text)?)),
        Operand::Span(a, b) => out.push(Arg::Span(a, b)),
        Operand::Element(Element::Func(_)) => {
            return Err(SheetError::NestedFunctionCall(name.to_string()));
        }
        Operand::Element(Element::Expr(e)) => out.push(Arg::Expr(e)),
        Operand::Element(Element::Gap(_)) => {
            return Err(SheetError::IncompatibleChild {
                container: "FunctionCall",
                child: "Gap",
            });
        }
        Operand::Element(el) => out.push(Arg::Element(el)),
    }
    Ok(())
}

/// Shape of one operand as seen by a call.
enum Shape {
    Scalar(FormulaNode),
    Series(Vec<FormulaNode>, Orientation),
    /// A frame: `(first vector, last vector)` cells per position.
    Frame(Vec<Vec<FormulaNode>>, Orientation, FormulaNode),
}

impl Shape {
    fn of(value: Value) -> Result<Shape> {
        Ok(match value {
            Value::Scalar(node) => Shape::Scalar(node),
            Value::Series(s) => Shape::Series(s.items, s.orientation),
            Value::Table {
                vectors,
                orientation,
            } => {
                let whole = FormulaNode::List(vectors.iter().flat_map(|s| s.items.clone()).collect());
                Shape::Frame(
                    vectors.into_iter().map(|s| s.items).collect(),
                    orientation,
                    whole,
                )
            }
            Value::Element(el) => match &el {
                Element::Cell(c) => Shape::Scalar(FormulaNode::Ref(c.clone())),
                Element::Vector(v) if v.is_empty() => Shape::Scalar(FormulaNode::Range {
                    target: el.clone(),
                    include_headers: false,
                }),
                Element::Vector(v) => {
                    let series = vector_series(v)?;
                    Shape::Series(series.items, series.orientation)
                }
                Element::Frame(f) => {
                    let vectors = f
                        .vectors()
                        .iter()
                        .map(|v| {
                            v.cells()
                                .into_iter()
                                .map(FormulaNode::Ref)
                                .collect::<Vec<_>>()
                        })
                        .collect();
                    Shape::Frame(
                        vectors,
                        f.orientation(),
                        FormulaNode::Range {
                            target: el.clone(),
                            include_headers: false,
                        },
                    )
                }
                Element::Stack(_) => Shape::Scalar(FormulaNode::Range {
                    target: el.clone(),
                    include_headers: false,
                }),
                other => return Err(pending_error(other)),
            },
        })
    }
}

/// Build a call to `name` over `args` producing `requested` (or the
/// natural shape when None or heterogeneous).
pub(crate) fn call(name: &str, args: Vec<Value>, requested: Option<Dimension>) -> Result<Value> {
    let name = validate_name(name)?;
    let vectorize = match requested {
        Some(Dimension::Scalar) => false,
        Some(Dimension::Vector) => true,
        Some(Dimension::Frame) => return Err(SheetError::UnsupportedFunctionDimension(name)),
        None | Some(Dimension::Heterogeneous) => args.iter().any(Value::is_one_dimensional),
    };

    if !vectorize {
        let nodes = args
            .into_iter()
            .map(scalar_operand)
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::Scalar(FormulaNode::call(name, nodes)));
    }

    let shapes = args.into_iter().map(Shape::of).collect::<Result<Vec<_>>>()?;
    let series_len = shapes
        .iter()
        .filter_map(|shape| match shape {
            Shape::Series(items, _) => Some(items.len()),
            _ => None,
        })
        .min();
    let frame_len = shapes
        .iter()
        .filter_map(|shape| match shape {
            Shape::Frame(vectors, ..) => vectors.iter().map(Vec::len).min(),
            _ => None,
        })
        .min();
    let len = series_len.or(frame_len).unwrap_or(1);
    let orientation = shapes
        .iter()
        .find_map(|shape| match shape {
            Shape::Series(_, o) => Some(*o),
            _ => None,
        })
        .or_else(|| {
            shapes.iter().find_map(|shape| match shape {
                Shape::Frame(_, o, _) => Some(o.cross()),
                _ => None,
            })
        })
        .unwrap_or(Orientation::Vertical);

    let items = (0..len)
        .map(|i| {
            let args = shapes.iter().map(|shape| at_position(shape, i)).collect();
            FormulaNode::call(name.clone(), args)
        })
        .collect();
    Ok(Value::Series(Series { items, orientation }))
}

/// Scalar-call operand: dimensioned references collapse to one range.
fn scalar_operand(arg: Value) -> Result<FormulaNode> {
    Ok(match arg {
        Value::Scalar(node) => node,
        Value::Series(s) => FormulaNode::List(s.items),
        Value::Table { vectors, .. } => {
            FormulaNode::List(vectors.into_iter().flat_map(|s| s.items).collect())
        }
        Value::Element(el) => match &el {
            Element::Cell(c) => FormulaNode::Ref(c.clone()),
            Element::Vector(_) | Element::Frame(_) | Element::Stack(_) => {
                if el.is_pending() {
                    return Err(SheetError::ShapeMismatch(format!(
                        "{} still holds unresolved formulas",
                        el.kind_name()
                    )));
                }
                FormulaNode::Range {
                    target: el.clone(),
                    include_headers: false,
                }
            }
            other => return Err(pending_error(other)),
        },
    })
}

fn at_position(shape: &Shape, i: usize) -> FormulaNode {
    match shape {
        Shape::Scalar(node) => node.clone(),
        Shape::Series(items, _) => items[i].clone(),
        Shape::Frame(vectors, _, whole) => {
            let first = vectors.first().and_then(|v| v.get(i));
            let last = vectors.last().and_then(|v| v.get(i));
            match (first, last) {
                (Some(FormulaNode::Ref(a)), Some(FormulaNode::Ref(b))) => {
                    FormulaNode::Span(a.clone(), b.clone())
                }
                (Some(_), Some(_)) => FormulaNode::List(
                    vectors.iter().filter_map(|v| v.get(i).cloned()).collect(),
                ),
                _ => whole.clone(),
            }
        }
    }
}

impl Identified for FunctionCall {
    fn id(&self) -> Option<String> {
        self.0.borrow().produces.id.clone()
    }

    fn header(&self) -> Option<String> {
        self.0.borrow().produces.header.clone()
    }
}

impl fmt::Debug for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("FunctionCall")
            .field("name", &data.name)
            .field("operands", &data.args.len())
            .field("result", &data.result)
            .finish()
    }
}
