//! Build context: the symbol table, build options and warning latches for
//! one workbook build.
//!
//! Elements register their id and header here so that reference templates
//! can find them by name. The table never keeps an element alive: entries
//! are weak handles, and a dropped element simply stops answering lookups.
//!
//! Two namespaces per key kind:
//! - local entries, cleared per sheet when a sheet is isolated and at the
//!   end of every write
//! - global entries, registered with a `G::` prefix (stored without it),
//!   which survive sheet isolation

use crate::element::{Element, WeakElement};
use crate::error::{Result, SheetError};
use serde::Deserialize;
use std::cell::{Cell as Latch, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Prefix that places a key in the global namespace.
pub const GLOBAL_PREFIX: &str = "G::";

/// Options for one build.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Passes of the fixed-point resolver before giving up.
    pub max_resolve_attempts: usize,
    /// Fail instead of writing `#REF!` when a formula points at a cell that
    /// is never placed.
    pub strict_references: bool,
    /// Write `A1 + B1` instead of `A1+B1`.
    pub operator_spacing: bool,
    /// Numeric suffixes tried when a table name is taken.
    pub table_name_attempts: usize,
    /// Open the file with the platform viewer after saving.
    pub auto_open: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            max_resolve_attempts: 30,
            strict_references: false,
            operator_spacing: true,
            table_name_attempts: 100,
            auto_open: false,
        }
    }
}

#[derive(Default)]
struct Namespace {
    local: HashMap<String, WeakElement>,
    global: HashMap<String, WeakElement>,
}

impl Namespace {
    fn insert(&mut self, key: &str, element: &Element) {
        match key.strip_prefix(GLOBAL_PREFIX) {
            Some(name) => self.global.insert(name.to_string(), element.downgrade()),
            None => self.local.insert(key.to_string(), element.downgrade()),
        };
    }

    fn local(&self, key: &str) -> Option<Element> {
        self.local.get(key).and_then(WeakElement::upgrade)
    }

    fn global(&self, key: &str) -> Option<Element> {
        self.global.get(key).and_then(WeakElement::upgrade)
    }
}

struct ContextInner {
    config: BuildConfig,
    ids: RefCell<Namespace>,
    headers: RefCell<Namespace>,
    inline_warned: Latch<bool>,
    missing_warned: Latch<bool>,
}

/// Shared handle to a build context. Clones refer to the same table.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    pub fn new() -> Context {
        Context::with_config(BuildConfig::default())
    }

    pub fn with_config(config: BuildConfig) -> Context {
        Context {
            inner: Rc::new(ContextInner {
                config,
                ids: RefCell::new(Namespace::default()),
                headers: RefCell::new(Namespace::default()),
                inline_warned: Latch::new(false),
                missing_warned: Latch::new(false),
            }),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.inner.config
    }

    /// Register `element` under `id`. Last writer wins.
    pub fn register_id(&self, id: &str, element: &Element) -> Result<()> {
        validate_key(id)?;
        self.inner.ids.borrow_mut().insert(id, element);
        Ok(())
    }

    /// Register `element` under `header`. Last writer wins.
    ///
    /// Headers are display text first; one that could never appear inside a
    /// placeholder is kept on the element but not registered.
    pub fn register_header(&self, header: &str, element: &Element) {
        if validate_key(header).is_err() {
            log::debug!("header {:?} cannot be referenced by name", header);
            return;
        }
        self.inner.headers.borrow_mut().insert(header, element);
    }

    /// Look a key up: local ids, local headers, global ids, global headers.
    /// A `G::` key only consults the global namespace.
    pub fn lookup(&self, key: &str) -> Option<Element> {
        let ids = self.inner.ids.borrow();
        let headers = self.inner.headers.borrow();
        if let Some(name) = key.strip_prefix(GLOBAL_PREFIX) {
            return ids.global(name).or_else(|| headers.global(name));
        }
        ids.local(key)
            .or_else(|| headers.local(key))
            .or_else(|| ids.global(key))
            .or_else(|| headers.global(key))
    }

    /// Drop local entries that point into the subtree under `root`, along
    /// with any entries whose element has been dropped.
    pub fn clear_scope(&self, root: &Element) {
        let mut members = HashSet::new();
        root.visit(&mut |el| {
            members.insert(el.addr());
        });
        let keep = |weak: &WeakElement| match weak.upgrade() {
            Some(el) => !members.contains(&el.addr()),
            None => false,
        };
        self.inner.ids.borrow_mut().local.retain(|_, w| keep(w));
        self.inner.headers.borrow_mut().local.retain(|_, w| keep(w));
    }

    /// Drop every local entry.
    pub fn clear_local(&self) {
        self.inner.ids.borrow_mut().local.clear();
        self.inner.headers.borrow_mut().local.clear();
    }

    /// Drop everything, global entries included.
    pub fn clear_all(&self) {
        self.clear_local();
        self.inner.ids.borrow_mut().global.clear();
        self.inner.headers.borrow_mut().global.clear();
    }

    /// Number of live entries, local and global, ids and headers.
    pub fn len(&self) -> usize {
        let count = |ns: &Namespace| {
            ns.local.values().chain(ns.global.values()).filter(|w| w.upgrade().is_some()).count()
        };
        count(&self.inner.ids.borrow()) + count(&self.inner.headers.borrow())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this build has substituted an unplaced cell inline.
    pub fn inline_warned(&self) -> bool {
        self.inner.inline_warned.get()
    }

    pub(crate) fn warn_inline_once(&self, what: &str) {
        if !self.inner.inline_warned.replace(true) {
            log::warn!(
                "{} is referenced by a formula but never placed on a sheet; its content was \
                 substituted inline (further substitutions in this build are not reported)",
                what
            );
        }
    }

    pub(crate) fn warn_missing_once(&self, what: &str) {
        if !self.inner.missing_warned.replace(true) {
            log::warn!(
                "{} is referenced by a formula but never placed and has no content; wrote #REF! \
                 (further missing references in this build are not reported)",
                what
            );
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

/// Ids and headers are non-empty and bracket-free so templates can name them.
pub fn validate_key(key: &str) -> Result<()> {
    let bare = key.strip_prefix(GLOBAL_PREFIX).unwrap_or(key);
    if bare.trim().is_empty() || key.contains('[') || key.contains(']') {
        return Err(SheetError::InvalidId(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Cell, Vector};

    #[test]
    fn test_lookup_order_prefers_local_ids() {
        let ctx = Context::new();
        let by_id = Element::from(Cell::new(1));
        let by_header = Element::from(Cell::new(2));
        ctx.register_header("x", &by_header);
        ctx.register_id("x", &by_id).unwrap();
        assert!(ctx.lookup("x").unwrap().ptr_eq(&by_id));
    }

    #[test]
    fn test_global_prefix() {
        let ctx = Context::new();
        let el = Element::from(Cell::new(1));
        ctx.register_id("G::rate", &el).unwrap();
        assert!(ctx.lookup("rate").unwrap().ptr_eq(&el));
        assert!(ctx.lookup("G::rate").unwrap().ptr_eq(&el));
        ctx.clear_local();
        assert!(ctx.lookup("rate").is_some());
        ctx.clear_all();
        assert!(ctx.lookup("rate").is_none());
    }

    #[test]
    fn test_entries_do_not_keep_elements_alive() {
        let ctx = Context::new();
        {
            let el = Element::from(Cell::new(1));
            ctx.register_id("tmp", &el).unwrap();
            assert_eq!(ctx.len(), 1);
        }
        assert!(ctx.lookup("tmp").is_none());
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_clear_scope_only_touches_subtree() {
        let ctx = Context::new();
        let inside = Cell::new(1).with_id(&ctx, "inside").unwrap();
        let outside = Cell::new(2).with_id(&ctx, "outside").unwrap();
        let root = Element::from(Vector::col([inside]).unwrap());
        ctx.clear_scope(&root);
        assert!(ctx.lookup("inside").is_none());
        assert!(ctx.lookup("outside").is_some());
        drop(outside);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("G::").is_err());
        assert!(validate_key("a[0]").is_err());
        assert!(validate_key("total").is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.max_resolve_attempts, 30);
        assert_eq!(config.table_name_attempts, 100);
        assert!(config.operator_spacing);
        assert!(!config.strict_references);
    }
}
