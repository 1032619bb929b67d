//! The action registry.
//!
//! A name to [`Action`] table, filled once at startup and shared read-only afterwards
//! (typically behind an [`Arc`](std::sync::Arc)). The registry itself never talks to the
//! host; all side effects live in the registered operations.

use crate::{
    action::{Action, Arity, Category, Invocation, Operation},
    error::{Error, Result},
};
use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Registry {
    actions: IndexMap<SmolStr, Action>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation under `name`.
    ///
    /// Fails with [`Error::DuplicateName`] if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<SmolStr>,
        category: Category,
        arity: Arity,
        operation: Operation,
    ) -> Result<&Action> {
        self.insert(Action::new(name, category, arity, operation))
    }

    /// Register a fully built action, query form included.
    pub fn insert(&mut self, action: Action) -> Result<&Action> {
        let name = SmolStr::new(action.name());
        if self.actions.contains_key(&name) {
            return Err(Error::DuplicateName { name });
        }
        trace!(%name, category = %action.category(), "registered action");
        let entry: &Action = self.actions.entry(name).or_insert(action);
        Ok(entry)
    }

    pub fn resolve(&self, name: &str) -> Result<&Action> {
        self.actions.get(name).ok_or_else(|| Error::UnknownAction {
            name: SmolStr::new(name),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Actions in registration order, optionally restricted to one category.
    pub fn list(&self, category: Option<Category>) -> impl Iterator<Item = &Action> + '_ {
        self.actions
            .values()
            .filter(move |action| category.map_or(true, |c| action.category() == c))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Resolve and run an invocation.
    pub fn invoke(&self, invocation: &Invocation) -> Result<()> {
        self.resolve(&invocation.action)?
            .invoke(invocation.argument)
    }

    /// Resolve an action and run its query form.
    pub fn query(&self, name: &str) -> Result<bool> {
        self.resolve(name)?.query()
    }

    /// Check that an invocation names a registered action with a matching arity.
    pub fn validate(&self, invocation: &Invocation) -> Result<()> {
        let action = self.resolve(&invocation.action)?;
        if !action.arity().accepts(invocation.argument) {
            return Err(Error::ArityMismatch {
                name: invocation.action.clone(),
                expected: action.arity(),
                got: usize::from(invocation.argument.is_some()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn noop() -> Operation {
        Arc::new(|_| Ok(()))
    }

    #[test]
    fn resolve_returns_registered_name() {
        let mut registry = Registry::new();
        for name in ["editCopy", "editCut", "tabsNewTab"] {
            registry
                .register(name, Category::Edit, Arity::Nullary, noop())
                .unwrap();
        }

        for name in ["editCopy", "editCut", "tabsNewTab"] {
            assert_eq!(registry.resolve(name).unwrap().name(), name);
        }
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = Registry::new();
        registry
            .register("editCopy", Category::Edit, Arity::Nullary, noop())
            .unwrap();

        let err = registry
            .register("editCopy", Category::Misc, Arity::Nullary, noop())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name } if name == "editCopy"));
        assert_eq!(registry.resolve("editCopy").unwrap().category(), Category::Edit);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_action() {
        let registry = Registry::new();
        assert!(matches!(
            registry.resolve("navigationBack"),
            Err(Error::UnknownAction { .. })
        ));
        assert!(registry.invoke(&Invocation::new("navigationBack")).is_err());
    }

    #[test]
    fn list_keeps_insertion_order_and_filters() {
        let mut registry = Registry::new();
        registry
            .register("tabsNewTab", Category::Tabs, Arity::Nullary, noop())
            .unwrap();
        registry
            .register("editUndo", Category::Edit, Arity::Nullary, noop())
            .unwrap();
        registry
            .register("tabSelect", Category::Tabs, Arity::Unary, noop())
            .unwrap();

        let all: Vec<_> = registry.list(None).map(Action::name).collect();
        assert_eq!(all, ["tabsNewTab", "editUndo", "tabSelect"]);

        let tabs: Vec<_> = registry.list(Some(Category::Tabs)).map(Action::name).collect();
        assert_eq!(tabs, ["tabsNewTab", "tabSelect"]);

        assert_eq!(registry.list(Some(Category::History)).count(), 0);
    }

    #[test]
    fn invoke_calls_operation_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = Registry::new();
        registry
            .register(
                "editCopy",
                Category::Edit,
                Arity::Nullary,
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();

        registry.invoke(&Invocation::new("editCopy")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn validate_checks_arity() {
        let mut registry = Registry::new();
        registry
            .register("tabSelect", Category::Tabs, Arity::Unary, noop())
            .unwrap();

        assert!(registry.validate(&Invocation::with_argument("tabSelect", 3)).is_ok());
        assert!(matches!(
            registry.validate(&Invocation::new("tabSelect")),
            Err(Error::ArityMismatch { .. })
        ));
        assert!(matches!(
            registry.validate(&Invocation::new("tabsNewTab")),
            Err(Error::UnknownAction { .. })
        ));
    }
}
