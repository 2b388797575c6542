//! The resolution walk and the bounded fixed-point loop around it.

use crate::context::Context;
use crate::element::frame::promote_cell;
use crate::element::{Dimension, Element, Identified};
use crate::error::{Result, SheetError};
use sheetlayout_engine::engine::detect_cycle;
use std::collections::HashMap;

/// What a container expects a function call inside it to produce.
fn dimension_hint(container: &Element) -> Option<Dimension> {
    match container {
        Element::Vector(_) => Some(Dimension::Scalar),
        Element::Frame(_) => Some(Dimension::Vector),
        _ => None,
    }
}

/// One pass over `container` and everything below it. Producers whose keys
/// are all bound are evaluated and replaced by their result. Returns true
/// when nothing under `container` is pending any more.
pub fn resolve_container_recursive(container: &Element, ctx: &Context) -> Result<bool> {
    let hint = dimension_hint(container);
    let mut children = container.children();
    let mut done = true;
    let mut i = 0;
    while i < children.len() {
        let produced = match &children[i] {
            Element::Expr(e) => {
                if e.attempt_to_resolve(Some(container), ctx) {
                    Some(e.eval(ctx, hint, true)?)
                } else {
                    None
                }
            }
            Element::Func(f) => {
                if f.attempt_to_resolve(Some(container), ctx) {
                    Some(f.eval(ctx, hint)?)
                } else {
                    None
                }
            }
            child if child.is_container() => {
                done &= resolve_container_recursive(child, ctx)?;
                i += 1;
                continue;
            }
            _ => {
                i += 1;
                continue;
            }
        };
        match produced {
            Some(element) => {
                let spliced = coerce_into(container, element)?;
                let count = spliced.len();
                children.splice(i..=i, spliced);
                // Later siblings may refer to this result by position.
                container.set_children(children.clone());
                i += count;
            }
            None => {
                done = false;
                i += 1;
            }
        }
    }
    Ok(done)
}

/// Fit a produced element into `container`, as zero or more children.
fn coerce_into(container: &Element, produced: Element) -> Result<Vec<Element>> {
    match container {
        Element::Vector(_) => match produced {
            Element::Cell(_) => Ok(vec![produced]),
            Element::Vector(v) => Ok(v.iter().collect()),
            other => Err(SheetError::IncompatibleChild {
                container: container.kind_name(),
                child: other.kind_name(),
            }),
        },
        Element::Frame(frame) => {
            let along = frame.orientation().cross();
            match produced {
                Element::Cell(cell) => Ok(vec![Element::Vector(promote_cell(cell, along))]),
                Element::Vector(v) => {
                    v.set_orientation(along);
                    Ok(vec![Element::Vector(v)])
                }
                Element::Frame(inner) => Ok(inner
                    .vectors()
                    .into_iter()
                    .map(|v| {
                        v.set_orientation(along);
                        Element::Vector(v)
                    })
                    .collect()),
                other => Err(SheetError::IncompatibleChild {
                    container: "Frame",
                    child: other.kind_name(),
                }),
            }
        }
        Element::Stack(stack) => match produced {
            Element::Cell(cell) => Ok(vec![Element::Vector(promote_cell(
                cell,
                stack.orientation().cross(),
            ))]),
            other => Ok(vec![other]),
        },
        _ => Ok(vec![produced]),
    }
}

/// Pending producers under `roots`, with the keys each is waiting on.
fn pending_producers(roots: &[Element]) -> Vec<(Element, Vec<String>)> {
    let mut out = Vec::new();
    for root in roots {
        root.visit(&mut |el| match el {
            Element::Expr(e) => out.push((
                el.clone(),
                e.unresolved_keys().iter().map(ToString::to_string).collect(),
            )),
            Element::Func(f) => out.push((el.clone(), f.unresolved_keys())),
            _ => {}
        });
    }
    out
}

/// Run passes over `roots` until nothing is pending. Gives up when a pass
/// makes no progress or after `max_resolve_attempts` passes.
pub fn resolve_to_fixed_point(roots: &[Element], ctx: &Context) -> Result<()> {
    let limit = ctx.config().max_resolve_attempts.max(1);
    let mut last_weight = usize::MAX;
    for attempt in 1..=limit {
        let mut done = true;
        for root in roots {
            done &= resolve_container_recursive(root, ctx)?;
        }
        if done {
            log::debug!("references resolved after {} pass(es)", attempt);
            return Ok(());
        }
        let pending = pending_producers(roots);
        let weight: usize = pending.iter().map(|(_, keys)| 1 + keys.len()).sum();
        log::debug!(
            "pass {}: {} producer(s) still pending",
            attempt,
            pending.len()
        );
        if weight >= last_weight {
            break;
        }
        last_weight = weight;
    }
    Err(unresolved_error(roots))
}

fn unresolved_error(roots: &[Element]) -> SheetError {
    let pending = pending_producers(roots);

    // Produced name -> names it waits on.
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    for (el, keys) in &pending {
        for name in [el.id(), el.header()].into_iter().flatten() {
            edges.entry(name).or_default().extend(keys.iter().cloned());
        }
    }

    let Some((first, keys)) = pending.into_iter().next() else {
        return SheetError::UnresolvedReference {
            template: String::new(),
            keys: Vec::new(),
            cycle: None,
        };
    };
    let template = match &first {
        Element::Expr(e) => e.template(),
        Element::Func(f) => f.describe(),
        other => other.kind_name().to_string(),
    };
    let starts = [first.id(), first.header()].into_iter().flatten().chain(keys.iter().cloned());
    let cycle = starts.into_iter().find_map(|start| detect_cycle(&start, &edges));
    SheetError::UnresolvedReference {
        template,
        keys,
        cycle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildConfig;
    use crate::element::{Cell, Frame, Stack, Vector};
    use crate::formula::FormulaNode;
    use crate::resolve::{Expression, FunctionCall, Operand};

    #[test]
    fn test_forward_reference_resolves_in_later_pass() {
        let ctx = Context::new();
        let early = Expression::new("[total] * 2").unwrap();
        let total = Expression::new("[a] + [b]").unwrap().with_id(&ctx, "total").unwrap();
        let a = Cell::new(1).with_id(&ctx, "a").unwrap();
        let b = Cell::new(2).with_id(&ctx, "b").unwrap();
        let root = Element::from(
            Stack::vertical([
                Element::from(Vector::col([Element::from(early)]).unwrap()),
                Element::from(Vector::col([Element::from(total), a.into(), b.into()]).unwrap()),
            ])
            .unwrap(),
        );
        resolve_to_fixed_point(std::slice::from_ref(&root), &ctx).unwrap();
        assert!(!root.is_pending());
        let first = root.children()[0].children()[0].clone();
        let Element::Cell(cell) = first else {
            panic!("expected a cell");
        };
        assert!(matches!(cell.formula(), Some(FormulaNode::Binary { .. })));
    }

    #[test]
    fn test_cycle_is_reported() {
        let ctx = Context::new();
        let a = Expression::new("[b] + 1").unwrap().with_id(&ctx, "a").unwrap();
        let b = Expression::new("[a] + 1").unwrap().with_id(&ctx, "b").unwrap();
        let root = Element::from(Vector::col([Element::from(a), Element::from(b)]).unwrap());
        let err = resolve_to_fixed_point(&[root], &ctx).unwrap_err();
        match err {
            SheetError::UnresolvedReference {
                template,
                keys,
                cycle,
            } => {
                assert_eq!(template, "[b] + 1");
                assert_eq!(keys, vec!["b".to_string()]);
                let cycle = cycle.expect("cycle should be found");
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_gives_up() {
        let ctx = Context::with_config(BuildConfig {
            max_resolve_attempts: 3,
            ..BuildConfig::default()
        });
        let expr = Expression::new("[nowhere]").unwrap();
        let root = Element::from(Vector::row([Element::from(expr)]).unwrap());
        let err = resolve_to_fixed_point(&[root], &ctx).unwrap_err();
        assert!(matches!(
            err,
            SheetError::UnresolvedReference { ref keys, cycle: None, .. } if keys == &vec!["nowhere".to_string()]
        ));
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_ref_vector_splices_into_frame() {
        let ctx = Context::new();
        let prices = Vector::col([1, 2, 3]).unwrap().with_header(&ctx, "price");
        let doubled = Expression::new("[price] * 2").unwrap().with_header(&ctx, "double");
        let frame = Frame::columns([Element::from(prices), Element::from(doubled)]).unwrap();
        let root = Element::from(frame.clone());
        resolve_to_fixed_point(&[root], &ctx).unwrap();
        let v = frame.get_vector(1).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.header().as_deref(), Some("double"));
    }

    #[test]
    fn test_function_in_frame_is_vectorised() {
        let ctx = Context::new();
        let a = Vector::col([1, 2]).unwrap().with_id(&ctx, "a").unwrap();
        let b = Vector::col([3, 4]).unwrap().with_id(&ctx, "b").unwrap();
        let max = FunctionCall::new("MAX", [Operand::template("[a]"), Operand::template("[b]")])
            .unwrap()
            .with_header(&ctx, "max");
        let frame = Frame::columns([Element::from(a), Element::from(b), Element::from(max)]).unwrap();
        resolve_to_fixed_point(&[Element::from(frame.clone())], &ctx).unwrap();
        let result = frame.get_vector(2).unwrap();
        assert_eq!(result.len(), 2);
        assert!(matches!(
            result.get_cell(0).unwrap().formula(),
            Some(FormulaNode::Call { .. })
        ));
    }

    #[test]
    fn test_positional_reference_in_vector() {
        let ctx = Context::new();
        let sum = Expression::new("[0] + [1]").unwrap();
        let v = Vector::col([Element::from(1), Element::from(2), Element::from(sum)]).unwrap();
        resolve_to_fixed_point(&[Element::from(v.clone())], &ctx).unwrap();
        assert_eq!(v.len(), 3);
        assert!(v.get_cell(2).unwrap().has_formula());
    }
}
