//! The browser action catalogue.
//!
//! Registers one action per browser keyboard shortcut, grouped by [`Category`]. Each action is
//! a thin wrapper turning a call into a [`HostCommand`] for the injected [`Host`].

use crate::{
    action::{Action, Arity, Category, Operation, Query},
    error::Result,
    host::{DevToolsPanel, Host, HostCommand, HostQuery},
    registry::Registry,
};
use std::sync::Arc;
use tracing::debug;

/// Name of the one unary action: select a tab by 1-based index.
pub const TAB_SELECT: &str = "tabSelect";

/// Opens a new tab in the current window.
pub const NEW_TAB: &str = "tabsNewTab";

/// Names are the browser's public shortcut names and are kept verbatim, including the
/// irregular `tab`/`tabs` and `window`/`windows` prefixes and `tabsMovetoStart`.
const NULLARY: &[(&str, Category, HostCommand)] = &[
    ("navigationBack", Category::Navigation, HostCommand::Back),
    ("navigationForward", Category::Navigation, HostCommand::Forward),
    ("navigationHome", Category::Navigation, HostCommand::Home),
    ("navigationOpenFile", Category::Navigation, HostCommand::OpenFile),
    ("navigationReload", Category::Navigation, HostCommand::Reload),
    (
        "navigationReloadOverrideCache",
        Category::Navigation,
        HostCommand::ReloadOverrideCache,
    ),
    ("navigationStop", Category::Navigation, HostCommand::Stop),
    ("pageGoDownAScreen", Category::Page, HostCommand::ScrollPageDown),
    ("pageGoUpAScreen", Category::Page, HostCommand::ScrollPageUp),
    ("pageGoToBottom", Category::Page, HostCommand::ScrollBottom),
    ("pageGoToTop", Category::Page, HostCommand::ScrollTop),
    ("pageMoveToNextFrame", Category::Page, HostCommand::FocusNextFrame),
    (
        "pageMoveToPreviousFrame",
        Category::Page,
        HostCommand::FocusPreviousFrame,
    ),
    ("pagePrint", Category::Page, HostCommand::Print),
    ("pageSaveAs", Category::Page, HostCommand::SaveAs),
    ("pageZoomIn", Category::Page, HostCommand::ZoomIn),
    ("pageZoomOut", Category::Page, HostCommand::ZoomOut),
    ("pageZoomReset", Category::Page, HostCommand::ZoomReset),
    ("editCopy", Category::Edit, HostCommand::Copy),
    ("editCut", Category::Edit, HostCommand::Cut),
    ("editDelete", Category::Edit, HostCommand::Delete),
    ("editPaste", Category::Edit, HostCommand::Paste),
    ("editPasteAsPlainText", Category::Edit, HostCommand::PasteAsPlainText),
    ("editRedo", Category::Edit, HostCommand::Redo),
    ("editSelectAll", Category::Edit, HostCommand::SelectAll),
    ("editUndo", Category::Edit, HostCommand::Undo),
    ("searchFind", Category::Search, HostCommand::Find),
    ("searchFindAgain", Category::Search, HostCommand::FindAgain),
    ("searchFindPrevious", Category::Search, HostCommand::FindPrevious),
    (
        "searchQuickFindLinksOnly",
        Category::Search,
        HostCommand::QuickFindLinksOnly,
    ),
    ("searchQuickFind", Category::Search, HostCommand::QuickFind),
    ("searchCloseFind", Category::Search, HostCommand::CloseFind),
    ("tabCloseTab", Category::Tabs, HostCommand::CloseTab),
    ("tabsMoveLeft", Category::Tabs, HostCommand::MoveTabLeft),
    ("tabsMoveRight", Category::Tabs, HostCommand::MoveTabRight),
    ("tabsMovetoStart", Category::Tabs, HostCommand::MoveTabToStart),
    ("tabsMoveToEnd", Category::Tabs, HostCommand::MoveTabToEnd),
    ("tabsToggleMute", Category::Tabs, HostCommand::ToggleMute),
    ("tabsNewTab", Category::Tabs, HostCommand::NewTab),
    ("tabsNextTab", Category::Tabs, HostCommand::NextTab),
    ("tabsPreviousTab", Category::Tabs, HostCommand::PreviousTab),
    ("tabUndoClose", Category::Tabs, HostCommand::UndoCloseTab),
    ("tabsSelectTab2", Category::Tabs, HostCommand::SelectTab(2)),
    ("tabsSelectTab3", Category::Tabs, HostCommand::SelectTab(3)),
    ("tabsSelectTab4", Category::Tabs, HostCommand::SelectTab(4)),
    ("tabsSelectTab5", Category::Tabs, HostCommand::SelectTab(5)),
    ("tabsSelectTab6", Category::Tabs, HostCommand::SelectTab(6)),
    ("windowCloseWindow", Category::Windows, HostCommand::CloseWindow),
    ("windowsNewWindow", Category::Windows, HostCommand::NewWindow),
    (
        "windowsNewPrivateWindow",
        Category::Windows,
        HostCommand::NewPrivateWindow,
    ),
    ("windowUndoClose", Category::Windows, HostCommand::UndoCloseWindow),
    ("historySidebar", Category::History, HostCommand::HistorySidebar),
    ("historyLibraryWindow", Category::History, HostCommand::HistoryLibrary),
    ("historyClearRecent", Category::History, HostCommand::ClearRecentHistory),
    ("bookmarksThisPage", Category::Bookmarks, HostCommand::BookmarkPage),
    ("bookmarksSidebar", Category::Bookmarks, HostCommand::BookmarksSidebar),
    (
        "bookmarksLibraryWindow",
        Category::Bookmarks,
        HostCommand::BookmarksLibrary,
    ),
    ("toolsDownloads", Category::Tools, HostCommand::Downloads),
    ("toolsAddons", Category::Tools, HostCommand::Addons),
    (
        "toolsToggleDeveloper",
        Category::Tools,
        HostCommand::ToggleDeveloperTools,
    ),
    (
        "toolsWebConsole",
        Category::Tools,
        HostCommand::OpenDevTools(DevToolsPanel::WebConsole),
    ),
    (
        "toolsInspector",
        Category::Tools,
        HostCommand::OpenDevTools(DevToolsPanel::Inspector),
    ),
    (
        "toolsDebugger",
        Category::Tools,
        HostCommand::OpenDevTools(DevToolsPanel::Debugger),
    ),
    (
        "toolsStyleEditor",
        Category::Tools,
        HostCommand::OpenDevTools(DevToolsPanel::StyleEditor),
    ),
    (
        "toolsProfiler",
        Category::Tools,
        HostCommand::OpenDevTools(DevToolsPanel::Performance),
    ),
    (
        "toolsNetwork",
        Category::Tools,
        HostCommand::OpenDevTools(DevToolsPanel::Network),
    ),
    (
        "toolsDeveloperToolbar",
        Category::Tools,
        HostCommand::DeveloperToolbar,
    ),
    (
        "toolsResponsiveDesignView",
        Category::Tools,
        HostCommand::ResponsiveDesignView,
    ),
    ("toolsScratchpad", Category::Tools, HostCommand::Scratchpad),
    ("toolsPageSource", Category::Tools, HostCommand::PageSource),
    ("toolsBrowserConsole", Category::Tools, HostCommand::BrowserConsole),
    ("toolsPageInfo", Category::Tools, HostCommand::PageInfo),
    ("toggleFullScreen", Category::Misc, HostCommand::ToggleFullScreen),
    ("toggleMenuBar", Category::Misc, HostCommand::ToggleMenuBar),
    ("toggleReaderMode", Category::Misc, HostCommand::ToggleReaderMode),
    ("toggleCaretBrowsing", Category::Misc, HostCommand::ToggleCaretBrowsing),
    ("selectLocationBar", Category::Misc, HostCommand::SelectLocationBar),
];

/// Toggle actions that also answer whether their state is on.
const QUERIES: &[(&str, HostQuery)] = &[
    ("toggleFullScreen", HostQuery::FullScreen),
    ("toggleReaderMode", HostQuery::ReaderMode),
    ("toggleCaretBrowsing", HostQuery::CaretBrowsing),
];

/// Register the whole catalogue against `host`.
pub fn register(registry: &mut Registry, host: Arc<dyn Host>) -> Result<()> {
    for &(name, category, command) in NULLARY {
        let mut action = Action::new(name, category, Arity::Nullary, perform(&host, command));
        if let Some(&(_, query)) = QUERIES.iter().find(|(n, _)| *n == name) {
            action = action.with_query(ask(&host, query));
        }
        registry.insert(action)?;
    }

    let select = host;
    let select_tab: Operation = Arc::new(move |argument| {
        let command = HostCommand::SelectTab(argument.unwrap_or(0));
        debug!(%command, "host command");
        select.perform(command)
    });
    registry.register(TAB_SELECT, Category::Tabs, Arity::Unary, select_tab)?;

    Ok(())
}

impl Registry {
    /// Registry holding the full browser catalogue.
    pub fn browser(host: Arc<dyn Host>) -> Result<Self> {
        let mut registry = Registry::new();
        register(&mut registry, host)?;
        Ok(registry)
    }
}

fn perform(host: &Arc<dyn Host>, command: HostCommand) -> Operation {
    let host = host.clone();
    Arc::new(move |_| {
        debug!(%command, "host command");
        host.perform(command)
    })
}

fn ask(host: &Arc<dyn Host>, query: HostQuery) -> Query {
    let host = host.clone();
    Arc::new(move || host.query(query))
}
