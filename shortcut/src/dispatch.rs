//! The modal key dispatcher.
//!
//! One [`Dispatcher`] exists per editable surface. It sees every key press on the page, decides
//! whether the UI's default handling should be suppressed, and resolves the key to at most one
//! registered action. It owns the surface's [`Mode`] and is the only thing that changes it.
//!
//! # Decision table
//!
//! | Focus         | Mode   | Key                         | Suppress | Effect                 |
//! |---------------|--------|-----------------------------|----------|------------------------|
//! | surface       | Normal | toggle key                  | config   | mode becomes Insert    |
//! | surface       | Insert | exit key                    | no       | mode becomes Normal    |
//! | surface       | Insert | anything else               | no       | none                   |
//! | surface       | Normal | in mode keymap              | yes      | invoke mode binding    |
//! | surface       | Normal | in global keymap only       | yes      | invoke global binding  |
//! | surface       | Normal | unbound, printable          | yes      | none                   |
//! | surface       | Normal | unbound, not printable      | no       | none                   |
//! | elsewhere     | any    | in global keymap            | yes      | invoke global binding  |
//! | elsewhere     | any    | unbound                     | no       | none                   |
//!
//! Whether a key is printable is answered by a [`KeyClassifier`], by default [`LabelLength`].
//!
//! # Failures
//!
//! Suppression is applied to the [`KeyEvent`] before the bound action runs. If the host fails,
//! the error is returned as-is and the key press stays consumed; pressing the key again is the
//! recovery path.

use crate::{
    action::Invocation,
    error::Result,
    input::{keys, KeyClassifier, KeyEvent, KeyLabel, KeyTarget, LabelLength, SurfaceId},
    keymap::{self, Keymap},
    mode::Mode,
    registry::Registry,
};
use std::{fmt::Write as _, sync::Arc};
use tracing::{debug, trace};

/// Mode transition keys and related policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Enters insert mode from normal mode.
    pub toggle_key: KeyLabel,
    /// Returns to normal mode from insert mode.
    pub exit_key: KeyLabel,
    /// Whether the toggle key press itself is kept out of the text.
    pub suppress_toggle_key: bool,
    pub initial_mode: Mode,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            toggle_key: KeyLabel::new_inline("i"),
            exit_key: KeyLabel::new_inline(keys::ESCAPE),
            suppress_toggle_key: true,
            initial_mode: Mode::Normal,
        }
    }
}

/// What the dispatcher did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Default handling proceeds untouched.
    PassThrough,
    /// Default handling suppressed, nothing invoked.
    Consumed,
    /// The bound action was invoked.
    Invoked(Invocation),
    /// The surface switched modes.
    ModeChanged { from: Mode, to: Mode },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub suppress_default: bool,
    pub resolution: Resolution,
}

impl KeyOutcome {
    fn pass_through() -> Self {
        Self {
            suppress_default: false,
            resolution: Resolution::PassThrough,
        }
    }

    fn invoke(invocation: &Invocation) -> Self {
        Self {
            suppress_default: true,
            resolution: Resolution::Invoked(invocation.clone()),
        }
    }
}

pub struct Dispatcher {
    surface: SurfaceId,
    registry: Arc<Registry>,
    mode_keymap: Keymap,
    global_keymap: Keymap,
    config: DispatcherConfig,
    classifier: Box<dyn KeyClassifier>,
    mode: Mode,
}

impl Dispatcher {
    /// Create a dispatcher for `surface`, validating both keymaps against `registry`.
    pub fn new(
        surface: SurfaceId,
        registry: Arc<Registry>,
        mode_keymap: Keymap,
        global_keymap: Keymap,
    ) -> Result<Self> {
        mode_keymap.validate(&registry)?;
        global_keymap.validate(&registry)?;

        let config = DispatcherConfig::default();
        Ok(Self {
            surface,
            registry,
            mode_keymap,
            global_keymap,
            mode: config.initial_mode,
            config,
            classifier: Box::new(LabelLength),
        })
    }

    /// Dispatcher with the built-in keymaps from [`crate::keymap`].
    pub fn with_default_keymaps(surface: SurfaceId, registry: Arc<Registry>) -> Result<Self> {
        Self::new(
            surface,
            registry,
            keymap::default_mode_keymap(),
            keymap::default_global_keymap(),
        )
    }

    /// Replace the transition policy. Resets the mode to `config.initial_mode`.
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.mode = config.initial_mode;
        self.config = config;
        self
    }

    pub fn with_classifier(mut self, classifier: impl KeyClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Decide what `event` should do without changing any state.
    pub fn resolve(&self, event: &KeyEvent) -> KeyOutcome {
        let key = event.key.as_str();

        if event.target != KeyTarget::Surface(self.surface) {
            return match self.global_keymap.get(key) {
                Some(invocation) => KeyOutcome::invoke(invocation),
                None => KeyOutcome::pass_through(),
            };
        }

        match self.mode {
            Mode::Insert if key == self.config.exit_key => KeyOutcome {
                suppress_default: false,
                resolution: Resolution::ModeChanged {
                    from: Mode::Insert,
                    to: Mode::Normal,
                },
            },
            Mode::Insert => KeyOutcome::pass_through(),
            Mode::Normal if key == self.config.toggle_key => KeyOutcome {
                suppress_default: self.config.suppress_toggle_key,
                resolution: Resolution::ModeChanged {
                    from: Mode::Normal,
                    to: Mode::Insert,
                },
            },
            Mode::Normal => {
                if let Some(invocation) = self
                    .mode_keymap
                    .get(key)
                    .or_else(|| self.global_keymap.get(key))
                {
                    KeyOutcome::invoke(invocation)
                } else if self.classifier.is_printable(key) {
                    KeyOutcome {
                        suppress_default: true,
                        resolution: Resolution::Consumed,
                    }
                } else {
                    KeyOutcome::pass_through()
                }
            },
        }
    }

    /// Handle one key press.
    ///
    /// Calls [`KeyEvent::prevent_default`] when default handling should be suppressed, then
    /// applies the mode transition or invokes the bound action.
    pub fn handle_key_event(&mut self, event: &mut KeyEvent) -> Result<KeyOutcome> {
        let outcome = self.resolve(event);
        trace!(
            key = %event.key,
            target = ?event.target,
            mode = %self.mode,
            suppress = outcome.suppress_default,
            "resolved key"
        );

        if outcome.suppress_default {
            event.prevent_default();
        }

        match &outcome.resolution {
            Resolution::ModeChanged { from, to } => {
                debug!(surface = %self.surface, %from, %to, "mode changed");
                self.mode = *to;
            },
            Resolution::Invoked(invocation) => {
                debug!(key = %event.key, %invocation, "invoking action");
                self.registry.invoke(invocation)?;
            },
            Resolution::PassThrough | Resolution::Consumed => {},
        }

        Ok(outcome)
    }

    /// Human readable summary of the active bindings.
    pub fn usage(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "NORMAL mode (in the textbox)");
        for (key, invocation) in self.mode_keymap.iter() {
            let _ = writeln!(out, "  {key:<8} {invocation}");
        }
        let _ = writeln!(out, "  {:<8} enter INSERT mode", self.config.toggle_key);

        let _ = writeln!(out, "INSERT mode (in the textbox)");
        let _ = writeln!(out, "  {:<8} return to NORMAL mode", self.config.exit_key);

        let _ = writeln!(out, "PAGE (NORMAL mode textbox or anywhere on the page)");
        for (key, invocation) in self.global_keymap.iter() {
            let shadowed = if self.mode_keymap.contains(key) {
                " (textbox binding wins)"
            } else {
                ""
            };
            let _ = writeln!(out, "  {key:<8} {invocation}{shadowed}");
        }

        out
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("surface", &self.surface)
            .field("mode", &self.mode)
            .field("mode_keymap", &self.mode_keymap)
            .field("global_keymap", &self.global_keymap)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
