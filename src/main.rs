mod app;
mod export;
mod logging;
mod opener;
mod picker;
mod provider;
mod scanner;
mod tree;
mod ui;

use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use app::App;
use export::{export_json, ExportOptions};
use logging::LogTarget;
use opener::{FileOpener, PrintOpener, SystemOpener};
use picker::BestMatchPicker;
use provider::{ProviderEvent, TreeProvider};
use scanner::{Mode, ScanOptions, Scanner};
use ui::{handle_key, ColorScheme};

#[derive(Parser, Debug)]
#[command(name = "mdnav")]
#[command(author = "Cassel")]
#[command(version)]
#[command(about = "Browse and fuzzy-find the Markdown files of a project", long_about = None)]
struct Args {
    /// Project folder (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Which files to show: readme or all
    #[arg(short, long, default_value = "readme")]
    mode: Mode,

    /// Maximum depth to scan
    #[arg(short, long)]
    depth: Option<usize>,

    /// Extra glob patterns to exclude (can be repeated)
    #[arg(short = 'x', long = "exclude", action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Output the tree as JSON instead of starting the TUI
    #[arg(long)]
    json: bool,

    /// With --json, output a flat list of files
    #[arg(long, requires = "json")]
    flat: bool,

    /// Print every root-relative file path, one per line
    #[arg(long, conflicts_with = "json")]
    list: bool,

    /// Open the best fuzzy match for QUERY
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["json", "list"])]
    find: Option<String>,

    /// With --find, print the matched path instead of opening it
    #[arg(long, requires = "find")]
    print: bool,

    /// Color scheme: default, dark, light, colorblind
    #[arg(long, default_value = "default")]
    color_scheme: String,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Use ASCII instead of Unicode icons
    #[arg(long)]
    ascii: bool,

    /// Write logs to this file while the TUI runs
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let interactive = !args.json && !args.list && args.find.is_none();

    let log_target = match (&args.log_file, interactive) {
        (Some(path), _) => LogTarget::File(path.as_path()),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    };
    logging::init(log_target)?;

    let root = resolve_root(&args.path);
    if root.is_none() {
        warn!(path = %args.path.display(), "not a folder, running without a workspace root");
    }

    let scan_options = ScanOptions::new()
        .with_max_depth(args.depth)
        .with_exclude_patterns(args.exclude.clone());
    let scanner = Scanner::new(scan_options)?;

    let mut provider = TreeProvider::new(root, Arc::new(scanner)).with_mode(args.mode);

    if args.json {
        return run_json_mode(provider, args.flat);
    }
    if args.list {
        return run_list_mode(provider);
    }
    if let Some(query) = args.find.as_deref() {
        let opener: Box<dyn FileOpener> = if args.print {
            Box::new(PrintOpener)
        } else {
            Box::new(SystemOpener)
        };
        let events = provider.subscribe();
        let opened = provider.search(&mut BestMatchPicker::new(query), opener.as_ref());
        log_events(&events);
        if opened.is_none() {
            bail!("no Markdown file matches '{}'", query);
        }
        return Ok(());
    }

    let color_scheme = if args.no_color {
        ColorScheme::monochrome()
    } else {
        ColorScheme::from_name(&args.color_scheme)
    };

    run_tui_mode(provider, color_scheme, args.ascii)
}

/// The workspace root, or `None` when `path` is not an existing folder.
fn resolve_root(path: &Path) -> Option<PathBuf> {
    path.canonicalize().ok().filter(|p| p.is_dir())
}

/// Report provider messages on stderr for the one-shot modes.
fn log_events(events: &Receiver<ProviderEvent>) {
    for event in events.try_iter() {
        match event {
            ProviderEvent::Info(message) => info!("{}", message),
            ProviderEvent::ScanFailed(message) => warn!("scan failed: {}", message),
            ProviderEvent::DataChanged | ProviderEvent::ModeChanged(_) => {}
        }
    }
}

fn run_json_mode(mut provider: TreeProvider, flat: bool) -> Result<()> {
    let events = provider.subscribe();
    provider.wait_for_scan();
    log_events(&events);

    let root_name = provider
        .root()
        .and_then(|root| root.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut stdout = io::stdout();
    export_json(&root_name, provider.tree(), &ExportOptions { flat }, &mut stdout)?;
    writeln!(stdout)?; // Final newline

    Ok(())
}

fn run_list_mode(mut provider: TreeProvider) -> Result<()> {
    let events = provider.subscribe();
    provider.wait_for_scan();
    log_events(&events);

    let mut stdout = io::stdout().lock();
    for (path, _) in provider.tree().flatten() {
        writeln!(stdout, "{}", path)?;
    }

    Ok(())
}

fn run_tui_mode(provider: TreeProvider, color_scheme: ColorScheme, ascii: bool) -> Result<()> {
    // Set up panic handler to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(provider, Box::new(SystemOpener), color_scheme).with_ascii(ascii);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal even if the loop failed
    let cleanup_result = cleanup_terminal(&mut terminal);
    result.and(cleanup_result)
}

/// Clean up terminal state.
fn cleanup_terminal<B: ratatui::backend::Backend + Write>(terminal: &mut Terminal<B>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.update();

        terminal.draw(|frame| {
            ui::render_ui(frame, app);
        })?;

        // Handle input with timeout (for the spinner)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press, not release
                if key.kind == KeyEventKind::Press {
                    let command = handle_key(key, app.input_mode);
                    app.handle_command(command);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
