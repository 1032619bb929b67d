use clap::Parser;
use shortcut_bin::{
    cli::{Cli, Command},
    commands,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = match shortcut_log::init(cli.log_config()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: failed to initialize logging: {e}");
            None
        },
    };

    match cli.command {
        Command::List(args) => commands::list::run(args),
        Command::Run(args) => commands::run::run(args, cli.tab_count),
        Command::Page(args) => commands::page::run(args, cli.tab_count),
    }
}
