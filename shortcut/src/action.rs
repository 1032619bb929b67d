//! Actions: named, categorised operations that delegate to the host.

use crate::{
    error::{Error, Result},
    host::HostError,
};
use serde::Serialize;
use smol_str::SmolStr;
use std::{fmt, str::FromStr, sync::Arc};

/// Imperative form of an action. Receives the positional argument of unary actions.
pub type Operation = Arc<dyn Fn(Option<u32>) -> Result<(), HostError> + Send + Sync>;

/// Boolean query form of an action, e.g. "is full screen active?".
pub type Query = Arc<dyn Fn() -> Result<bool, HostError> + Send + Sync>;

/// Action groups, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Navigation,
    Page,
    Edit,
    Search,
    Tabs,
    Windows,
    History,
    Bookmarks,
    Tools,
    Misc,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Navigation,
        Category::Page,
        Category::Edit,
        Category::Search,
        Category::Tabs,
        Category::Windows,
        Category::History,
        Category::Bookmarks,
        Category::Tools,
        Category::Misc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Navigation => "navigation",
            Category::Page => "page",
            Category::Edit => "edit",
            Category::Search => "search",
            Category::Tabs => "tabs",
            Category::Windows => "windows",
            Category::History => "history",
            Category::Bookmarks => "bookmarks",
            Category::Tools => "tools",
            Category::Misc => "misc",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Number of positional arguments an action takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    Nullary,
    Unary,
}

impl Arity {
    pub fn count(self) -> usize {
        match self {
            Arity::Nullary => 0,
            Arity::Unary => 1,
        }
    }

    /// Whether `argument` is the right shape for this arity.
    pub fn accepts(self, argument: Option<u32>) -> bool {
        matches!(
            (self, argument),
            (Arity::Nullary, None) | (Arity::Unary, Some(_))
        )
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// A registered action. Immutable once built.
#[derive(Clone)]
pub struct Action {
    name: SmolStr,
    category: Category,
    arity: Arity,
    operation: Operation,
    query: Option<Query>,
}

impl Action {
    pub fn new(
        name: impl Into<SmolStr>,
        category: Category,
        arity: Arity,
        operation: Operation,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            arity,
            operation,
            query: None,
        }
    }

    /// Attach a query form reporting the state this action toggles.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    /// Run the imperative form. Host failures are returned as [`Error::Host`] untouched.
    pub fn invoke(&self, argument: Option<u32>) -> Result<()> {
        if !self.arity.accepts(argument) {
            return Err(Error::ArityMismatch {
                name: self.name.clone(),
                expected: self.arity,
                got: usize::from(argument.is_some()),
            });
        }
        (self.operation)(argument)?;
        Ok(())
    }

    /// Run the query form, if the action has one.
    pub fn query(&self) -> Result<bool> {
        let query = self.query.as_ref().ok_or_else(|| Error::NoQuery {
            name: self.name.clone(),
        })?;
        Ok(query()?)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("arity", &self.arity)
            .field("query", &self.query.is_some())
            .finish()
    }
}

/// A reference to an action plus the argument to call it with.
///
/// Keymaps bind keys to invocations, so a unary action such as `tabSelect` becomes
/// bindable by fixing its argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub action: SmolStr,
    pub argument: Option<u32>,
}

impl Invocation {
    pub fn new(action: impl Into<SmolStr>) -> Self {
        Self {
            action: action.into(),
            argument: None,
        }
    }

    pub fn with_argument(action: impl Into<SmolStr>, argument: u32) -> Self {
        Self {
            action: action.into(),
            argument: Some(argument),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument {
            Some(argument) => write!(f, "{}({argument})", self.action),
            None => f.write_str(&self.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostCommand;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn recording(last: Arc<AtomicU32>) -> Operation {
        Arc::new(move |argument| {
            last.store(argument.unwrap_or(0), Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Tabs".parse::<Category>(), Ok(Category::Tabs));
        assert_eq!("misc".parse::<Category>(), Ok(Category::Misc));
        assert!("sidebar".parse::<Category>().is_err());
    }

    #[test]
    fn unary_action_receives_argument() {
        let last = Arc::new(AtomicU32::new(0));
        let action = Action::new("tabSelect", Category::Tabs, Arity::Unary, recording(last.clone()));

        action.invoke(Some(3)).unwrap();
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn wrong_arity_is_rejected_before_the_operation_runs() {
        let last = Arc::new(AtomicU32::new(7));
        let action = Action::new("tabSelect", Category::Tabs, Arity::Unary, recording(last.clone()));

        let err = action.invoke(None).unwrap_err();
        assert!(matches!(
            err,
            Error::ArityMismatch { expected: Arity::Unary, got: 0, .. }
        ));
        assert_eq!(last.load(Ordering::SeqCst), 7);

        let nullary = Action::new("editCopy", Category::Edit, Arity::Nullary, recording(last));
        assert!(nullary.invoke(Some(1)).is_err());
    }

    #[test]
    fn host_errors_pass_through() {
        let failing: Operation = Arc::new(|_| {
            Err(HostError::Unsupported {
                command: HostCommand::ToggleMenuBar,
            })
        });
        let action = Action::new("toggleMenuBar", Category::Misc, Arity::Nullary, failing);

        match action.invoke(None) {
            Err(Error::Host(HostError::Unsupported { command })) => {
                assert_eq!(command, HostCommand::ToggleMenuBar)
            },
            other => panic!("expected host error, got {other:?}"),
        }
    }

    #[test]
    fn query_requires_query_form() {
        let noop: Operation = Arc::new(|_| Ok(()));
        let action = Action::new("editCopy", Category::Edit, Arity::Nullary, noop.clone());
        assert!(matches!(action.query(), Err(Error::NoQuery { .. })));

        let toggled = Action::new("toggleFullScreen", Category::Misc, Arity::Nullary, noop)
            .with_query(Arc::new(|| Ok(true)));
        assert!(toggled.has_query());
        assert!(toggled.query().unwrap());
    }

    #[test]
    fn invocation_display() {
        assert_eq!(Invocation::new("editCopy").to_string(), "editCopy");
        assert_eq!(Invocation::with_argument("tabSelect", 3).to_string(), "tabSelect(3)");
    }
}
