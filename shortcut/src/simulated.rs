//! An in-memory browser host.
//!
//! [`SimulatedBrowser`] keeps just enough browser state (windows, tabs, zoom, panels and the
//! three queryable toggles) for every catalogue action to have an observable effect, and logs
//! each command it receives. The harness drives it interactively; tests use the call log as a
//! call counter.

use crate::host::{DevToolsPanel, Host, HostCommand, HostError, HostQuery};
use parking_lot::Mutex;
use std::fmt;
use tracing::debug;

const ZOOM_STEPS: &[u32] = &[30, 50, 67, 80, 90, 100, 110, 120, 133, 150, 170, 200, 240, 300];
const DEFAULT_ZOOM: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: u64,
    pub title: String,
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub private: bool,
    pub tabs: Vec<Tab>,
    pub active: usize,
}

impl Window {
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sidebar {
    History,
    Bookmarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindBar {
    Find,
    QuickFind,
    QuickFindLinks,
}

/// Everything the simulated browser remembers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    pub windows: Vec<Window>,
    pub active_window: usize,
    pub closed_tabs: Vec<Tab>,
    pub closed_windows: Vec<Window>,
    pub zoom: u32,
    pub full_screen: bool,
    pub reader_mode: bool,
    pub caret_browsing: bool,
    pub location_bar_focused: bool,
    pub sidebar: Option<Sidebar>,
    pub find_bar: Option<FindBar>,
    /// Open developer tools panel. The toolbox opens on the inspector.
    pub dev_tools: Option<DevToolsPanel>,
    next_tab_id: u64,
}

impl BrowserState {
    fn with_tabs(count: usize) -> Self {
        let mut state = Self {
            windows: Vec::new(),
            active_window: 0,
            closed_tabs: Vec::new(),
            closed_windows: Vec::new(),
            zoom: DEFAULT_ZOOM,
            full_screen: false,
            reader_mode: false,
            caret_browsing: false,
            location_bar_focused: false,
            sidebar: None,
            find_bar: None,
            dev_tools: None,
            next_tab_id: 1,
        };
        let tabs = (0..count.max(1)).map(|_| state.new_tab()).collect();
        state.windows.push(Window {
            private: false,
            tabs,
            active: 0,
        });
        state
    }

    pub fn window(&self) -> &Window {
        &self.windows[self.active_window]
    }

    fn window_mut(&mut self) -> &mut Window {
        &mut self.windows[self.active_window]
    }

    fn new_tab(&mut self) -> Tab {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        Tab {
            id,
            title: format!("Tab {id}"),
            muted: false,
        }
    }

    fn zoom_step(&mut self, forward: bool) {
        let index = ZOOM_STEPS
            .iter()
            .position(|step| *step == self.zoom)
            .unwrap_or(5);
        let index = if forward {
            (index + 1).min(ZOOM_STEPS.len() - 1)
        } else {
            index.saturating_sub(1)
        };
        self.zoom = ZOOM_STEPS[index];
    }

    fn toggle_sidebar(&mut self, sidebar: Sidebar) {
        self.sidebar = if self.sidebar == Some(sidebar) {
            None
        } else {
            Some(sidebar)
        };
    }

    fn move_active_tab(&mut self, to: usize) {
        let window = self.window_mut();
        let tab = window.tabs.remove(window.active);
        let to = to.min(window.tabs.len());
        window.tabs.insert(to, tab);
        window.active = to;
    }

    fn apply(&mut self, command: HostCommand) -> Result<(), HostError> {
        match command {
            HostCommand::ZoomIn => self.zoom_step(true),
            HostCommand::ZoomOut => self.zoom_step(false),
            HostCommand::ZoomReset => self.zoom = DEFAULT_ZOOM,

            HostCommand::Find => self.find_bar = Some(FindBar::Find),
            HostCommand::QuickFind => self.find_bar = Some(FindBar::QuickFind),
            HostCommand::QuickFindLinksOnly => self.find_bar = Some(FindBar::QuickFindLinks),
            HostCommand::CloseFind => self.find_bar = None,

            HostCommand::CloseTab => {
                let window = self.window_mut();
                let closed = window.tabs.remove(window.active);
                if window.tabs.is_empty() {
                    let blank = self.new_tab();
                    self.window_mut().tabs.push(blank);
                }
                let window = self.window_mut();
                window.active = window.active.min(window.tabs.len() - 1);
                self.closed_tabs.push(closed);
            },
            HostCommand::MoveTabLeft => {
                let to = self.window().active.saturating_sub(1);
                self.move_active_tab(to);
            },
            HostCommand::MoveTabRight => {
                let to = self.window().active + 1;
                self.move_active_tab(to);
            },
            HostCommand::MoveTabToStart => self.move_active_tab(0),
            HostCommand::MoveTabToEnd => self.move_active_tab(usize::MAX),
            HostCommand::ToggleMute => {
                let window = self.window_mut();
                let active = window.active;
                if let Some(tab) = window.tabs.get_mut(active) {
                    tab.muted = !tab.muted;
                }
            },
            HostCommand::NewTab => {
                let tab = self.new_tab();
                let window = self.window_mut();
                window.tabs.push(tab);
                window.active = window.tabs.len() - 1;
            },
            HostCommand::NextTab => {
                let window = self.window_mut();
                window.active = (window.active + 1) % window.tabs.len();
            },
            HostCommand::PreviousTab => {
                let window = self.window_mut();
                window.active = (window.active + window.tabs.len() - 1) % window.tabs.len();
            },
            HostCommand::UndoCloseTab => {
                if let Some(tab) = self.closed_tabs.pop() {
                    let window = self.window_mut();
                    window.tabs.push(tab);
                    window.active = window.tabs.len() - 1;
                }
            },
            HostCommand::SelectTab(index) => {
                let window = self.window_mut();
                let len = window.tabs.len();
                if index == 0 || index as usize > len {
                    return Err(HostError::OutOfRange {
                        command,
                        index,
                        len,
                    });
                }
                window.active = index as usize - 1;
            },

            HostCommand::NewWindow | HostCommand::NewPrivateWindow => {
                let tab = self.new_tab();
                self.windows.push(Window {
                    private: command == HostCommand::NewPrivateWindow,
                    tabs: vec![tab],
                    active: 0,
                });
                self.active_window = self.windows.len() - 1;
            },
            HostCommand::CloseWindow => {
                if self.windows.len() == 1 {
                    return Err(HostError::Failed {
                        command,
                        message: "refusing to close the last window".into(),
                    });
                }
                let window = self.windows.remove(self.active_window);
                self.active_window = self.active_window.min(self.windows.len() - 1);
                if !window.private {
                    self.closed_windows.push(window);
                }
            },
            HostCommand::UndoCloseWindow => {
                if let Some(window) = self.closed_windows.pop() {
                    self.windows.push(window);
                    self.active_window = self.windows.len() - 1;
                }
            },

            HostCommand::HistorySidebar => self.toggle_sidebar(Sidebar::History),
            HostCommand::BookmarksSidebar => self.toggle_sidebar(Sidebar::Bookmarks),

            HostCommand::ToggleDeveloperTools => {
                self.dev_tools = match self.dev_tools {
                    Some(_) => None,
                    None => Some(DevToolsPanel::Inspector),
                };
            },
            HostCommand::OpenDevTools(panel) => self.dev_tools = Some(panel),

            HostCommand::ToggleFullScreen => self.full_screen = !self.full_screen,
            HostCommand::ToggleReaderMode => self.reader_mode = !self.reader_mode,
            HostCommand::ToggleCaretBrowsing => self.caret_browsing = !self.caret_browsing,
            HostCommand::SelectLocationBar => self.location_bar_focused = true,

            HostCommand::ToggleMenuBar | HostCommand::DeveloperToolbar => {
                return Err(HostError::Unsupported { command });
            },

            // Nothing to model beyond the call log.
            HostCommand::Back
            | HostCommand::Forward
            | HostCommand::Home
            | HostCommand::OpenFile
            | HostCommand::Reload
            | HostCommand::ReloadOverrideCache
            | HostCommand::Stop
            | HostCommand::ScrollPageDown
            | HostCommand::ScrollPageUp
            | HostCommand::ScrollBottom
            | HostCommand::ScrollTop
            | HostCommand::FocusNextFrame
            | HostCommand::FocusPreviousFrame
            | HostCommand::Print
            | HostCommand::SaveAs
            | HostCommand::Copy
            | HostCommand::Cut
            | HostCommand::Delete
            | HostCommand::Paste
            | HostCommand::PasteAsPlainText
            | HostCommand::Redo
            | HostCommand::SelectAll
            | HostCommand::Undo
            | HostCommand::FindAgain
            | HostCommand::FindPrevious
            | HostCommand::HistoryLibrary
            | HostCommand::ClearRecentHistory
            | HostCommand::BookmarkPage
            | HostCommand::BookmarksLibrary
            | HostCommand::Downloads
            | HostCommand::Addons
            | HostCommand::ResponsiveDesignView
            | HostCommand::Scratchpad
            | HostCommand::PageSource
            | HostCommand::BrowserConsole
            | HostCommand::PageInfo => {},
        }
        Ok(())
    }
}

impl fmt::Display for BrowserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, window) in self.windows.iter().enumerate() {
            let marker = if i == self.active_window { '*' } else { ' ' };
            let private = if window.private { " (private)" } else { "" };
            write!(f, "{marker}window {}{private}:", i + 1)?;
            for (t, tab) in window.tabs.iter().enumerate() {
                let open = if t == window.active { "[" } else { " " };
                let close = if t == window.active { "]" } else { " " };
                let muted = if tab.muted { " (muted)" } else { "" };
                write!(f, " {open}{}{muted}{close}", tab.title)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "zoom {}%  full screen {}  reader mode {}  caret browsing {}",
            self.zoom, self.full_screen, self.reader_mode, self.caret_browsing
        )?;
        if let Some(sidebar) = self.sidebar {
            write!(f, "  sidebar {sidebar:?}")?;
        }
        if let Some(find_bar) = self.find_bar {
            write!(f, "  find bar {find_bar:?}")?;
        }
        if let Some(panel) = self.dev_tools {
            write!(f, "  dev tools {}", panel.tool_id())?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Inner {
    state: BrowserState,
    calls: Vec<HostCommand>,
}

/// Thread-safe in-memory [`Host`].
#[derive(Debug)]
pub struct SimulatedBrowser {
    inner: Mutex<Inner>,
}

impl SimulatedBrowser {
    /// One window with a single tab.
    pub fn new() -> Self {
        Self::with_tabs(1)
    }

    pub fn with_tabs(count: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BrowserState::with_tabs(count),
                calls: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> BrowserState {
        self.inner.lock().state.clone()
    }

    /// Every command received so far, including ones that failed.
    pub fn calls(&self) -> Vec<HostCommand> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, command: HostCommand) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| **c == command)
            .count()
    }
}

impl Default for SimulatedBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SimulatedBrowser {
    fn perform(&self, command: HostCommand) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        inner.calls.push(command);
        let result = inner.state.apply(command);
        debug!(%command, ok = result.is_ok(), "simulated browser");
        result
    }

    fn query(&self, query: HostQuery) -> Result<bool, HostError> {
        let inner = self.inner.lock();
        Ok(match query {
            HostQuery::FullScreen => inner.state.full_screen,
            HostQuery::ReaderMode => inner.state.reader_mode,
            HostQuery::CaretBrowsing => inner.state.caret_browsing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(host: &SimulatedBrowser) -> Vec<String> {
        host.state()
            .window()
            .tabs
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    fn active_title(host: &SimulatedBrowser) -> String {
        let state = host.state();
        state
            .window()
            .active_tab()
            .map(|t| t.title.clone())
            .unwrap_or_default()
    }

    #[test]
    fn select_tab_is_one_based_and_bounded() {
        let host = SimulatedBrowser::with_tabs(3);
        host.perform(HostCommand::SelectTab(3)).unwrap();
        assert_eq!(active_title(&host), "Tab 3");

        for index in [0, 4] {
            let err = host.perform(HostCommand::SelectTab(index)).unwrap_err();
            assert!(matches!(err, HostError::OutOfRange { len: 3, .. }));
        }
        assert_eq!(host.count(HostCommand::SelectTab(0)), 1);
    }

    #[test]
    fn moving_tabs_clamps_at_edges() {
        let host = SimulatedBrowser::with_tabs(3);
        host.perform(HostCommand::MoveTabLeft).unwrap();
        assert_eq!(titles(&host), ["Tab 1", "Tab 2", "Tab 3"]);

        host.perform(HostCommand::MoveTabRight).unwrap();
        assert_eq!(titles(&host), ["Tab 2", "Tab 1", "Tab 3"]);

        host.perform(HostCommand::MoveTabToEnd).unwrap();
        assert_eq!(titles(&host), ["Tab 2", "Tab 3", "Tab 1"]);
        host.perform(HostCommand::MoveTabRight).unwrap();
        assert_eq!(titles(&host), ["Tab 2", "Tab 3", "Tab 1"]);

        host.perform(HostCommand::MoveTabToStart).unwrap();
        assert_eq!(titles(&host), ["Tab 1", "Tab 2", "Tab 3"]);
        assert_eq!(active_title(&host), "Tab 1");
    }

    #[test]
    fn next_and_previous_wrap() {
        let host = SimulatedBrowser::with_tabs(2);
        host.perform(HostCommand::PreviousTab).unwrap();
        assert_eq!(active_title(&host), "Tab 2");
        host.perform(HostCommand::NextTab).unwrap();
        assert_eq!(active_title(&host), "Tab 1");
    }

    #[test]
    fn close_and_undo_close_tab() {
        let host = SimulatedBrowser::with_tabs(2);
        host.perform(HostCommand::CloseTab).unwrap();
        assert_eq!(titles(&host), ["Tab 2"]);

        host.perform(HostCommand::CloseTab).unwrap();
        assert_eq!(titles(&host), ["Tab 3"]);

        host.perform(HostCommand::UndoCloseTab).unwrap();
        assert_eq!(titles(&host), ["Tab 3", "Tab 2"]);
        assert_eq!(active_title(&host), "Tab 2");
    }

    #[test]
    fn windows_open_close_and_restore() {
        let host = SimulatedBrowser::new();
        assert!(matches!(
            host.perform(HostCommand::CloseWindow),
            Err(HostError::Failed { .. })
        ));

        host.perform(HostCommand::NewWindow).unwrap();
        host.perform(HostCommand::NewPrivateWindow).unwrap();
        assert_eq!(host.state().windows.len(), 3);
        assert!(host.state().window().private);

        // private windows are not restorable
        host.perform(HostCommand::CloseWindow).unwrap();
        host.perform(HostCommand::UndoCloseWindow).unwrap();
        assert_eq!(host.state().windows.len(), 2);

        host.perform(HostCommand::CloseWindow).unwrap();
        host.perform(HostCommand::UndoCloseWindow).unwrap();
        assert_eq!(host.state().windows.len(), 2);
        assert!(!host.state().window().private);
    }

    #[test]
    fn zoom_steps_and_resets() {
        let host = SimulatedBrowser::new();
        host.perform(HostCommand::ZoomIn).unwrap();
        host.perform(HostCommand::ZoomIn).unwrap();
        assert_eq!(host.state().zoom, 120);
        host.perform(HostCommand::ZoomReset).unwrap();
        for _ in 0..20 {
            host.perform(HostCommand::ZoomOut).unwrap();
        }
        assert_eq!(host.state().zoom, 30);
    }

    #[test]
    fn toggles_answer_queries() {
        let host = SimulatedBrowser::new();
        assert!(!host.query(HostQuery::ReaderMode).unwrap());
        host.perform(HostCommand::ToggleReaderMode).unwrap();
        assert!(host.query(HostQuery::ReaderMode).unwrap());
        host.perform(HostCommand::ToggleReaderMode).unwrap();
        assert!(!host.query(HostQuery::ReaderMode).unwrap());
    }

    #[test]
    fn unsupported_commands_fail_but_are_logged() {
        let host = SimulatedBrowser::new();
        assert_eq!(
            host.perform(HostCommand::ToggleMenuBar),
            Err(HostError::Unsupported {
                command: HostCommand::ToggleMenuBar
            })
        );
        assert_eq!(host.calls(), [HostCommand::ToggleMenuBar]);
    }

    #[test]
    fn panels_and_sidebars() {
        let host = SimulatedBrowser::new();
        host.perform(HostCommand::ToggleDeveloperTools).unwrap();
        assert_eq!(host.state().dev_tools, Some(DevToolsPanel::Inspector));
        host.perform(HostCommand::OpenDevTools(DevToolsPanel::Network))
            .unwrap();
        assert_eq!(host.state().dev_tools, Some(DevToolsPanel::Network));
        host.perform(HostCommand::ToggleDeveloperTools).unwrap();
        assert_eq!(host.state().dev_tools, None);

        host.perform(HostCommand::HistorySidebar).unwrap();
        host.perform(HostCommand::BookmarksSidebar).unwrap();
        assert_eq!(host.state().sidebar, Some(Sidebar::Bookmarks));
        host.perform(HostCommand::BookmarksSidebar).unwrap();
        assert_eq!(host.state().sidebar, None);
    }

    #[test]
    fn display_marks_active_tab() {
        let host = SimulatedBrowser::with_tabs(2);
        host.perform(HostCommand::ToggleMute).unwrap();
        let shown = host.state().to_string();
        assert!(shown.starts_with("*window 1: [Tab 1 (muted)]  Tab 2 "));
        assert!(shown.contains("zoom 100%"));
    }
}
