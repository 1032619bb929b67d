use crate::{
    cli::PageArgs,
    page::{Flow, Page, PageDelays},
};
use crossterm::{
    cursor,
    event::{self, Event},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use shortcut::simulated::SimulatedBrowser;
use std::{
    io::{self, Write},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{info, warn};

/// Upper bound on how long to wait for a key before redrawing.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub fn run(args: PageArgs, tab_count: usize) -> anyhow::Result<()> {
    let host = Arc::new(SimulatedBrowser::with_tabs(tab_count));
    let mut page = Page::new(host, PageDelays::from(&args))?;
    info!(?args, tab_count, "starting page");

    let result = RawScreen::enter(io::stdout())
        .map_err(anyhow::Error::from)
        .and_then(|mut screen| event_loop(&mut screen.out, &mut page));

    let abandoned = page.close();
    info!(abandoned, "page closed");

    result
}

/// Raw mode plus the alternate screen, restored on drop whichever way the session ends.
struct RawScreen<W: Write> {
    out: W,
}

impl<W: Write> RawScreen<W> {
    fn enter(out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // Built before anything else can fail, so raw mode is always undone.
        let mut screen = Self { out };
        execute!(screen.out, EnterAlternateScreen, cursor::Hide)?;
        Ok(screen)
    }
}

impl<W: Write> Drop for RawScreen<W> {
    fn drop(&mut self) {
        let raw = terminal::disable_raw_mode();
        let screen = execute!(self.out, LeaveAlternateScreen, cursor::Show);
        if let Err(e) = raw.and(screen) {
            warn!("failed to restore terminal: {e}");
        }
    }
}

fn event_loop(out: &mut impl Write, page: &mut Page) -> anyhow::Result<()> {
    loop {
        draw(out, page)?;

        let timeout = page.next_deadline().map_or(IDLE_POLL, |deadline| {
            deadline
                .saturating_duration_since(Instant::now())
                .min(IDLE_POLL)
        });
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if page.handle_key(&key, Instant::now()) == Flow::Quit {
                    return Ok(());
                }
            }
        }

        page.tick(Instant::now());
    }
}

fn draw(out: &mut impl Write, page: &Page) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in (0u16..).zip(page.render()) {
        queue!(out, cursor::MoveTo(0, row), Print(line))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAVE: &str = "\x1b[?1049l";
    const SHOW_CURSOR: &str = "\x1b[?25h";

    #[test]
    fn dropping_the_screen_restores_the_terminal() {
        let mut out = Vec::new();
        drop(RawScreen { out: &mut out });

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains(LEAVE));
        assert!(text.contains(SHOW_CURSOR));
    }

    #[test]
    fn failed_session_still_restores_the_terminal() {
        let mut out = Vec::new();
        let result = (|| -> io::Result<()> {
            let mut screen = RawScreen { out: &mut out };
            write!(screen.out, "frame")?;
            Err(io::Error::other("read failed"))
        })();

        assert!(result.is_err());
        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("frame"));
        assert!(text.ends_with(&format!("{LEAVE}{SHOW_CURSOR}")));
    }
}
