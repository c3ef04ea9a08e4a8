mod analysis;
mod app;
mod command;
mod config;
mod diagnostics;
mod editor;
mod format;
mod input;
mod logging;
mod sample;
mod scheduler;
mod theme;
mod tools;
mod ui;

use anyhow::{Context, Result};
use app::Session;
use clap::Parser;
use config::Config;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::analysis::TypeScriptService;
use crate::theme::Theme;
use crate::tools::Runner;

/// Longest the loop sleeps waiting for input.
const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "tsmodal")]
#[command(author, version, about = "Modal terminal editor for TypeScript snippets", long_about = None)]
struct Args {
    /// Source file to load into the buffer. It is read once and never written
    path: Option<PathBuf>,

    /// Config file to use instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init();

    let config = Config::load(args.config.as_deref())?;
    let source = match &args.path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => sample::SAMPLE.to_string(),
    };

    let analysis = TypeScriptService::new(&config.analysis)?;
    info!(tsc = analysis.uses_tsc(), "analysis ready");

    let mut session = Session::new(
        &source,
        Box::new(analysis),
        format::detect(&config.formatter),
        Runner::new(&config.runner),
        config.editor.clone(),
        config.formatter.options(),
    );

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut session, &config.theme);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %format!("{e:#}"), "session ended with an error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    info!("session ended");
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    theme: &Theme,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, session, theme))?;

        // Sleep no longer than the pending diagnostics refresh allows
        let timeout = session
            .time_until_due(Instant::now())
            .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));

        if input::handle_event(session, timeout)? == input::Action::Quit {
            break;
        }
        session.run_due(Instant::now());
    }
    Ok(())
}
