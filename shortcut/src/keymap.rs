//! Key label to action bindings.
//!
//! Two keymaps are consulted by the [`Dispatcher`](crate::dispatch::Dispatcher):
//!
//! - the **mode keymap**, active while the editable surface has focus and is in
//!   [`Mode::Normal`](crate::mode::Mode::Normal);
//! - the **global keymap**, active everywhere on the page, and on the surface in normal mode
//!   for keys the mode keymap does not bind.

use crate::{
    action::Invocation,
    error::Result,
    input::KeyLabel,
    registry::Registry,
};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    bindings: IndexMap<KeyLabel, Invocation>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key`, returning the invocation it was previously bound to.
    pub fn bind(&mut self, key: impl Into<KeyLabel>, invocation: Invocation) -> Option<Invocation> {
        self.bindings.insert(key.into(), invocation)
    }

    /// Builder form of [`Self::bind`].
    pub fn with(mut self, key: impl Into<KeyLabel>, invocation: Invocation) -> Self {
        self.bind(key, invocation);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Invocation> {
        self.bindings.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyLabel, &Invocation)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Check every binding against `registry`.
    ///
    /// Keymaps are static configuration, so a binding to a missing action or one with the
    /// wrong arity is reported here rather than on the first key press.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        self.bindings
            .values()
            .try_for_each(|invocation| registry.validate(invocation))
    }
}

impl<K: Into<KeyLabel>> FromIterator<(K, Invocation)> for Keymap {
    fn from_iter<T: IntoIterator<Item = (K, Invocation)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().map(|(k, i)| (k.into(), i)).collect(),
        }
    }
}

/// Normal mode bindings for the editable surface.
pub fn default_mode_keymap() -> Keymap {
    Keymap::new()
        .with("y", Invocation::new("editCopy"))
        .with("x", Invocation::new("editCut"))
        .with("d", Invocation::new("editDelete"))
        .with("p", Invocation::new("editPaste"))
        .with("P", Invocation::new("editPasteAsPlainText"))
        .with("R", Invocation::new("editRedo"))
        .with("u", Invocation::new("editUndo"))
}

/// Page-wide bindings, including `1`..`8` for selecting tabs.
pub fn default_global_keymap() -> Keymap {
    let mut keymap = Keymap::new()
        .with("^", Invocation::new("toggleCaretBrowsing"))
        .with("A", Invocation::new("editSelectAll"));
    for index in 1..=8u32 {
        keymap.bind(index.to_string(), Invocation::with_argument("tabSelect", index));
    }
    keymap
}
