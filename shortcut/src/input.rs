//! Key event types handed to the dispatcher by the embedding UI.
//!
//! Keys are identified by label, following the DOM `KeyboardEvent.key` naming: printable keys
//! are the character they produce (`"y"`, `"A"`, `"^"`) and everything else has a name
//! (`"Escape"`, `"ArrowDown"`, `"F5"`).

use smol_str::SmolStr;
use std::fmt;

pub type KeyLabel = SmolStr;

/// Labels of common non-printable keys.
pub mod keys {
    pub const ESCAPE: &str = "Escape";
    pub const ENTER: &str = "Enter";
    pub const TAB: &str = "Tab";
    pub const BACKSPACE: &str = "Backspace";
    pub const DELETE: &str = "Delete";

    pub const ARROW_UP: &str = "ArrowUp";
    pub const ARROW_DOWN: &str = "ArrowDown";
    pub const ARROW_LEFT: &str = "ArrowLeft";
    pub const ARROW_RIGHT: &str = "ArrowRight";

    pub const HOME: &str = "Home";
    pub const END: &str = "End";
    pub const PAGE_UP: &str = "PageUp";
    pub const PAGE_DOWN: &str = "PageDown";
    pub const INSERT: &str = "Insert";
}

/// Identity of one editable surface (a textbox).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Where a key event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    /// An editable surface has focus.
    Surface(SurfaceId),
    /// Focus is anywhere else on the page.
    Page,
}

/// A single key press. Ephemeral; the dispatcher never stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyLabel,
    pub target: KeyTarget,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<KeyLabel>, target: KeyTarget) -> Self {
        Self {
            key: key.into(),
            target,
            default_prevented: false,
        }
    }

    pub fn on_surface(surface: SurfaceId, key: impl Into<KeyLabel>) -> Self {
        Self::new(key, KeyTarget::Surface(surface))
    }

    pub fn on_page(key: impl Into<KeyLabel>) -> Self {
        Self::new(key, KeyTarget::Page)
    }

    /// Suppress the UI's default handling of this key press.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Decides which key labels produce text.
///
/// The dispatcher only asks this question for keys it did not otherwise handle, to decide
/// whether a stray key would leak into the text while in command mode.
pub trait KeyClassifier: Send + Sync {
    fn is_printable(&self, key: &str) -> bool;
}

/// Treats a label of exactly one character as printable and anything longer as a named key.
///
/// This is an approximation rather than a keycode table: it keeps arrows, function keys and
/// the like working natively, but it cannot tell e.g. a dead key apart from a character.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelLength;

impl KeyClassifier for LabelLength {
    fn is_printable(&self, key: &str) -> bool {
        let mut chars = key.chars();
        chars.next().is_some() && chars.next().is_none()
    }
}

impl<F> KeyClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_printable(&self, key: &str) -> bool {
        self(key)
    }
}
