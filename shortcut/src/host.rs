//! The host automation surface.
//!
//! Every registered action ends up as a single [`HostCommand`] handed to a [`Host`]. The core
//! never assumes anything about how a host carries a command out: a real embedding forwards
//! it to the browser's privileged command surface, while [`crate::simulated::SimulatedBrowser`]
//! applies it to an in-memory model.

use std::fmt;
use thiserror::Error;

/// Privileged browser operations, one per named action.
///
/// Developer tools panels share [`HostCommand::OpenDevTools`], parameterised by panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    // Navigation
    Back,
    Forward,
    Home,
    OpenFile,
    Reload,
    ReloadOverrideCache,
    Stop,

    // Current page
    ScrollPageDown,
    ScrollPageUp,
    ScrollBottom,
    ScrollTop,
    FocusNextFrame,
    FocusPreviousFrame,
    Print,
    SaveAs,
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // Editing
    Copy,
    Cut,
    Delete,
    Paste,
    PasteAsPlainText,
    Redo,
    SelectAll,
    Undo,

    // Search
    Find,
    FindAgain,
    FindPrevious,
    QuickFindLinksOnly,
    QuickFind,
    CloseFind,

    // Tabs
    CloseTab,
    MoveTabLeft,
    MoveTabRight,
    MoveTabToStart,
    MoveTabToEnd,
    ToggleMute,
    NewTab,
    NextTab,
    PreviousTab,
    UndoCloseTab,
    /// Activate the tab at a 1-based index.
    SelectTab(u32),

    // Windows
    CloseWindow,
    NewWindow,
    NewPrivateWindow,
    UndoCloseWindow,

    // History
    HistorySidebar,
    HistoryLibrary,
    ClearRecentHistory,

    // Bookmarks
    BookmarkPage,
    BookmarksSidebar,
    BookmarksLibrary,

    // Tools
    Downloads,
    Addons,
    ToggleDeveloperTools,
    OpenDevTools(DevToolsPanel),
    DeveloperToolbar,
    ResponsiveDesignView,
    Scratchpad,
    PageSource,
    BrowserConsole,
    PageInfo,

    // Misc
    ToggleFullScreen,
    ToggleMenuBar,
    ToggleReaderMode,
    ToggleCaretBrowsing,
    SelectLocationBar,
}

/// Developer tools panels that can be selected directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevToolsPanel {
    WebConsole,
    Inspector,
    Debugger,
    StyleEditor,
    Performance,
    Network,
}

impl DevToolsPanel {
    /// Tool identifier as the browser's developer tools know it.
    pub fn tool_id(self) -> &'static str {
        match self {
            DevToolsPanel::WebConsole => "webconsole",
            DevToolsPanel::Inspector => "inspector",
            DevToolsPanel::Debugger => "jsdebugger",
            DevToolsPanel::StyleEditor => "styleeditor",
            DevToolsPanel::Performance => "performance",
            DevToolsPanel::Network => "netmonitor",
        }
    }
}

/// Boolean state a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostQuery {
    FullScreen,
    ReaderMode,
    CaretBrowsing,
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCommand::SelectTab(index) => write!(f, "SelectTab({index})"),
            HostCommand::OpenDevTools(panel) => write!(f, "OpenDevTools({})", panel.tool_id()),
            other => write!(f, "{other:?}"),
        }
    }
}

impl fmt::Display for HostQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostQuery::FullScreen => write!(f, "full screen"),
            HostQuery::ReaderMode => write!(f, "reader mode"),
            HostQuery::CaretBrowsing => write!(f, "caret browsing"),
        }
    }
}

/// Failure reported by a host. Passed through the core unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host does not support {command}")]
    Unsupported { command: HostCommand },

    #[error("{command}: index {index} out of range for {len} tab(s)")]
    OutOfRange {
        command: HostCommand,
        index: u32,
        len: usize,
    },

    #[error("{command} failed: {message}")]
    Failed {
        command: HostCommand,
        message: String,
    },
}

/// The browser's privileged command surface.
///
/// Implementations must be cheap to call from the UI event loop; anything long-running
/// should be handed off by the host itself.
pub trait Host: Send + Sync {
    fn perform(&self, command: HostCommand) -> Result<(), HostError>;

    fn query(&self, query: HostQuery) -> Result<bool, HostError>;
}

impl<H: Host + ?Sized> Host for std::sync::Arc<H> {
    fn perform(&self, command: HostCommand) -> Result<(), HostError> {
        (**self).perform(command)
    }

    fn query(&self, query: HostQuery) -> Result<bool, HostError> {
        (**self).query(query)
    }
}
