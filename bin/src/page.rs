//! The interactive test page: one modal textbox, the rest of the page, and a prompt standing in
//! for the page's action buttons.
//!
//! Every key goes through the [`Dispatcher`] first. Only when it leaves the event's default
//! handling alone does the page apply its own behaviour (moving focus, editing the textbox,
//! opening the prompt), the way a browser would after an unprevented `keydown`.

use crate::cli::PageArgs;
use crossterm::event::{self as term, KeyCode, KeyEventKind, KeyModifiers};
use shortcut::{
    catalogue::NEW_TAB, keys, simulated::SimulatedBrowser, Category, Continuations, Dispatcher,
    Invocation, KeyClassifier, KeyEvent, KeyLabel, KeyTarget, LabelLength, Registry, Resolution,
    SurfaceId,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

pub const TEXTBOX: SurfaceId = SurfaceId(1);

/// Page-only button: reader mode on, then off again after a longer delay.
pub const READER_AND_EXIT: &str = "toggleReaderModeAndExit";

const READER_MODE: &str = "toggleReaderMode";
const STATUS_LINES: usize = 6;
const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Praesent a erat purus.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Textbox,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelays {
    pub edit: Duration,
    pub reader: Duration,
    pub reader_exit: Duration,
}

impl From<&PageArgs> for PageDelays {
    fn from(args: &PageArgs) -> Self {
        Self {
            edit: args.edit_delay(),
            reader: args.reader_delay(),
            reader_exit: args.reader_exit_delay(),
        }
    }
}

/// Single line text buffer with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Textbox {
    text: String,
    cursor: usize,
}

impl Textbox {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    pub fn insert(&mut self, s: &str) {
        let offset = self.byte_offset(self.cursor);
        self.text.insert_str(offset, s);
        self.cursor += s.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.text.remove(offset);
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    /// Text with a `|` at the cursor.
    pub fn with_cursor(&self) -> String {
        let offset = self.byte_offset(self.cursor);
        format!("{}|{}", &self.text[..offset], &self.text[offset..])
    }
}

/// DOM style label for a terminal key, or `None` for chords the page ignores.
pub fn key_label(key: &term::KeyEvent) -> Option<KeyLabel> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    let label = match key.code {
        KeyCode::Char(c) => return Some(KeyLabel::from(c.to_string())),
        KeyCode::F(n) => return Some(KeyLabel::from(format!("F{n}"))),
        KeyCode::Esc => keys::ESCAPE,
        KeyCode::Enter => keys::ENTER,
        KeyCode::Tab | KeyCode::BackTab => keys::TAB,
        KeyCode::Backspace => keys::BACKSPACE,
        KeyCode::Delete => keys::DELETE,
        KeyCode::Up => keys::ARROW_UP,
        KeyCode::Down => keys::ARROW_DOWN,
        KeyCode::Left => keys::ARROW_LEFT,
        KeyCode::Right => keys::ARROW_RIGHT,
        KeyCode::Home => keys::HOME,
        KeyCode::End => keys::END,
        KeyCode::PageUp => keys::PAGE_UP,
        KeyCode::PageDown => keys::PAGE_DOWN,
        KeyCode::Insert => keys::INSERT,
        _ => return None,
    };
    Some(KeyLabel::new_inline(label))
}

pub struct Page {
    host: Arc<SimulatedBrowser>,
    dispatcher: Dispatcher,
    continuations: Continuations,
    delays: PageDelays,
    focus: Focus,
    textbox: Textbox,
    prompt: Option<String>,
    status: Vec<String>,
}

impl Page {
    pub fn new(host: Arc<SimulatedBrowser>, delays: PageDelays) -> shortcut::Result<Self> {
        let registry = Arc::new(Registry::browser(host.clone())?);
        let dispatcher = Dispatcher::with_default_keymaps(TEXTBOX, registry)?;
        Ok(Self {
            host,
            dispatcher,
            continuations: Continuations::new(),
            delays,
            focus: Focus::Textbox,
            textbox: Textbox::new(LOREM),
            prompt: None,
            status: Vec::new(),
        })
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn textbox(&self) -> &Textbox {
        &self.textbox
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn status(&self) -> &[String] {
        &self.status
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn pending(&self) -> usize {
        self.continuations.len()
    }

    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.continuations.next_deadline()
    }

    pub fn handle_key(&mut self, key: &term::KeyEvent, now: Instant) -> Flow {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        if self.prompt.is_some() {
            self.prompt_key(key.code, now);
            return Flow::Continue;
        }
        let Some(label) = key_label(key) else {
            return Flow::Continue;
        };

        let target = match self.focus {
            Focus::Textbox => KeyTarget::Surface(TEXTBOX),
            Focus::Page => KeyTarget::Page,
        };
        let mut event = KeyEvent::new(label, target);
        match self.dispatcher.handle_key_event(&mut event) {
            Ok(outcome) => {
                if let Resolution::Invoked(invocation) = outcome.resolution {
                    self.note(format!("{} ran {invocation}", event.key));
                }
            },
            Err(e) => {
                warn!(key = %event.key, error = %e, "bound action failed");
                self.note(format!("{} failed: {e}", event.key));
            },
        }

        if !event.default_prevented() {
            self.default_action(&event.key);
        }
        Flow::Continue
    }

    fn default_action(&mut self, key: &str) {
        match (self.focus, key) {
            (Focus::Textbox, keys::TAB) => self.focus = Focus::Page,
            (Focus::Page, keys::TAB) => self.focus = Focus::Textbox,
            (Focus::Page, ":") => self.prompt = Some(String::new()),
            (Focus::Textbox, keys::BACKSPACE) => self.textbox.backspace(),
            (Focus::Textbox, keys::ARROW_LEFT) => self.textbox.left(),
            (Focus::Textbox, keys::ARROW_RIGHT) => self.textbox.right(),
            (Focus::Textbox, key) if LabelLength.is_printable(key) => self.textbox.insert(key),
            _ => {},
        }
    }

    fn prompt_key(&mut self, code: KeyCode, now: Instant) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.pop();
            },
            KeyCode::Char(c) => prompt.push(c),
            KeyCode::Enter => {
                let line = std::mem::take(prompt);
                self.prompt = None;
                self.submit(&line, now);
            },
            _ => {},
        }
    }

    /// Run a prompt line of the form `name [argument]`.
    pub fn submit(&mut self, line: &str, now: Instant) {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return;
        };
        let argument = match words.next().map(str::parse::<u32>).transpose() {
            Ok(argument) => argument,
            Err(e) => {
                self.note(format!("{name}: bad argument: {e}"));
                return;
            },
        };
        if let Err(e) = self.press_button(name, argument, now) {
            warn!(name, error = %e, "button failed");
            self.note(format!("{name} failed: {e}"));
        }
    }

    /// What clicking the page's button for `name` does.
    ///
    /// Edit buttons focus the textbox and fire after the edit delay so the edit lands there.
    /// The reader mode buttons open a tab and toggle reader mode once it had time to load.
    pub fn press_button(
        &mut self,
        name: &str,
        argument: Option<u32>,
        now: Instant,
    ) -> shortcut::Result<()> {
        let registry = self.dispatcher.registry().clone();
        info!(name, ?argument, "button");

        if name == READER_AND_EXIT {
            self.open_for_reading(&registry, now)?;
            self.continuations.schedule(
                now,
                self.delays.reader_exit,
                Invocation::new(READER_MODE),
            );
            return Ok(());
        }

        let invocation = Invocation {
            action: name.into(),
            argument,
        };
        registry.validate(&invocation)?;

        if registry.resolve(name)?.category() == Category::Edit {
            self.focus = Focus::Textbox;
            self.continuations
                .schedule_for(TEXTBOX, now, self.delays.edit, invocation.clone());
            self.note(format!("{invocation} in {}ms", self.delays.edit.as_millis()));
        } else if name == READER_MODE {
            self.open_for_reading(&registry, now)?;
        } else {
            registry.invoke(&invocation)?;
            self.note(format!("ran {invocation}"));
        }
        Ok(())
    }

    fn open_for_reading(&mut self, registry: &Registry, now: Instant) -> shortcut::Result<()> {
        registry.invoke(&Invocation::new(NEW_TAB))?;
        self.continuations
            .schedule(now, self.delays.reader, Invocation::new(READER_MODE));
        self.note(format!(
            "opened a tab, {READER_MODE} in {}ms",
            self.delays.reader.as_millis()
        ));
        Ok(())
    }

    /// Run continuations that are due.
    pub fn tick(&mut self, now: Instant) {
        let registry = self.dispatcher.registry().clone();
        for (invocation, result) in self.continuations.run_due(now, &registry) {
            match result {
                Ok(()) => self.note(format!("ran {invocation}")),
                Err(e) => {
                    warn!(%invocation, error = %e, "continuation failed");
                    self.note(format!("{invocation} failed: {e}"));
                },
            }
        }
    }

    /// Tear the page down. Returns how many continuations were abandoned.
    pub fn close(&mut self) -> usize {
        let dropped = self.continuations.cancel_surface(TEXTBOX) + self.continuations.cancel_all();
        debug!(dropped, "page closed");
        dropped
    }

    fn note(&mut self, line: String) {
        if self.status.len() == STATUS_LINES {
            self.status.remove(0);
        }
        self.status.push(line);
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Browser".to_string()];
        lines.extend(self.host.state().to_string().lines().map(|l| format!("  {l}")));
        lines.push(String::new());

        let focus = match self.focus {
            Focus::Textbox => "textbox",
            Focus::Page => "page",
        };
        lines.push(format!(
            "Focus: {focus}    Mode: {}    Pending: {}",
            self.dispatcher.mode().display_name(),
            self.pending()
        ));
        lines.push(format!("Textbox: {}", self.textbox.with_cursor()));
        match &self.prompt {
            Some(prompt) => lines.push(format!(":{prompt}")),
            None => lines.push(String::new()),
        }
        lines.extend(self.status.iter().cloned());
        lines.push(String::new());

        lines.extend(self.dispatcher.usage().lines().map(str::to_owned));
        lines.push(String::new());
        lines.push(format!(
            "Tab: move focus    :name [arg]: press a button (on the page, incl. {READER_AND_EXIT})    Ctrl-C: quit"
        ));
        lines
    }
}
