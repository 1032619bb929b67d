use clap::{Args, Parser, Subcommand};
use shortcut::Category;
use shortcut_log::LogConfig;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[command(name = "shortcut", about = "Browse and trigger browser keyboard shortcut actions")]
pub struct Cli {
    /// Log file path, or a directory to put `shortcut-<pid>.log` in.
    #[arg(long, env = "SHORTCUT_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Number of tabs the simulated browser starts with.
    #[arg(long, env = "SHORTCUT_TAB_COUNT", default_value_t = 3, global = true)]
    pub tab_count: usize,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Console logs go to stderr, except for the page: raw mode owns the terminal there.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_file_path: self.log_file.clone(),
            console: !matches!(self.command, Command::Page(_)),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered actions, grouped by category.
    List(ListArgs),
    /// Invoke one action against the simulated browser.
    Run(RunArgs),
    /// Interactive test page with a modal textbox.
    Page(PageArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list this category.
    #[arg(long)]
    pub category: Option<Category>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Action name, e.g. `tabsNewTab`.
    pub name: String,

    /// Argument for unary actions, e.g. the tab index for `tabSelect`.
    pub argument: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Delay before edit buttons fire, so the textbox has focus.
    #[arg(long, env = "SHORTCUT_EDIT_DELAY_MS", default_value_t = 2000)]
    pub edit_delay_ms: u64,

    /// Delay between opening a tab and toggling reader mode.
    #[arg(long, env = "SHORTCUT_READER_DELAY_MS", default_value_t = 4000)]
    pub reader_delay_ms: u64,

    /// Delay before `toggleReaderModeAndExit` toggles reader mode back off.
    #[arg(long, env = "SHORTCUT_READER_EXIT_DELAY_MS", default_value_t = 8000)]
    pub reader_exit_delay_ms: u64,
}

impl PageArgs {
    pub fn edit_delay(&self) -> Duration {
        Duration::from_millis(self.edit_delay_ms)
    }

    pub fn reader_delay(&self) -> Duration {
        Duration::from_millis(self.reader_delay_ms)
    }

    pub fn reader_exit_delay(&self) -> Duration {
        Duration::from_millis(self.reader_exit_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_category() {
        let cli = Cli::try_parse_from(["shortcut", "list", "--category", "Tabs", "--json"]).unwrap();
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.category, Some(Category::Tabs));
                assert!(args.json);
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_run_with_argument() {
        let cli = Cli::try_parse_from(["shortcut", "run", "tabSelect", "2"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.name, "tabSelect");
                assert_eq!(args.argument, Some(2));
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn page_delays_default() {
        let cli = Cli::try_parse_from(["shortcut", "page", "--edit-delay-ms", "10"]).unwrap();
        let Command::Page(args) = cli.command else {
            panic!("expected page");
        };
        assert_eq!(args.edit_delay(), Duration::from_millis(10));
        assert_eq!(args.reader_delay(), Duration::from_millis(4000));
        assert_eq!(args.reader_exit_delay(), Duration::from_millis(8000));
    }

    #[test]
    fn console_logging_only_outside_the_page() {
        let run = Cli::try_parse_from(["shortcut", "--log-file", "x.log", "run", "tabsNewTab"])
            .unwrap()
            .log_config();
        assert!(run.console);
        assert_eq!(run.log_file_path, Some(PathBuf::from("x.log")));

        let page = Cli::try_parse_from(["shortcut", "page"]).unwrap().log_config();
        assert!(!page.console);
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(Cli::try_parse_from(["shortcut", "list", "--category", "nope"]).is_err());
    }
}
