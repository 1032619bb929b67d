//! Browser keyboard shortcuts as named actions, and a modal key dispatcher on top of them.
//!
//! A [`Registry`] maps action names (`editCopy`, `tabSelect`, ...) to operations against a
//! [`Host`]. A [`Dispatcher`] watches key presses for one editable surface, keeps its
//! NORMAL/INSERT [`Mode`], and turns bound keys into action invocations.
//!
//! ```no_run
//! use shortcut::{simulated::SimulatedBrowser, Dispatcher, KeyEvent, Registry, SurfaceId};
//! use std::sync::Arc;
//!
//! # fn main() -> shortcut::Result<()> {
//! let registry = Arc::new(Registry::browser(Arc::new(SimulatedBrowser::new()))?);
//! let mut dispatcher = Dispatcher::with_default_keymaps(SurfaceId(0), registry)?;
//! dispatcher.handle_key_event(&mut KeyEvent::on_surface(SurfaceId(0), "y"))?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod catalogue;
pub mod continuation;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod input;
pub mod keymap;
pub mod mode;
pub mod registry;
pub mod simulated;


pub use action::{Action, Arity, Category, Invocation};
pub use continuation::{ContinuationHandle, Continuations};
pub use dispatch::{Dispatcher, DispatcherConfig, KeyOutcome, Resolution};
pub use error::{Error, Result};
pub use host::{DevToolsPanel, Host, HostCommand, HostError, HostQuery};
pub use input::{keys, KeyClassifier, KeyEvent, KeyLabel, KeyTarget, LabelLength, SurfaceId};
pub use keymap::Keymap;
pub use mode::Mode;
pub use registry::Registry;
