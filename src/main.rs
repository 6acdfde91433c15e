//! Placeboard - browse places and reviews from the terminal
//!
//! A terminal UI client for the places API: a scrollable card row with price
//! filter and search, place details with reviews, and login/registration.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use placeboard::app::App;
use placeboard::cli::{Cli, StartupConfig};
use placeboard::data::api::ApiClient;
use placeboard::tasks::TaskRunner;
use placeboard::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match logging::init(config.log_file.as_deref()) {
        Ok(path) => tracing::info!(log_file = %path.display(), api_url = %config.api_url, "starting"),
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "exiting with error");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(config.api_url.clone())?;
    let mut runner = TaskRunner::new(client);
    let mut app = App::with_startup_config(&config);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    runner.spawn_all(app.initial_commands());

    let result = event_loop(&mut terminal, &mut app, &mut runner);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runner: &mut TaskRunner,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.listing.set_viewport_width(terminal.size()?.width);

        // Apply finished background work
        while let Some(message) = runner.try_recv() {
            let commands = app.handle_message(message);
            runner.spawn_all(commands);
        }
        app.tick();

        terminal.draw(|f| ui::render(f, app))?;

        // Poll for keyboard events; the timeout doubles as the animation tick
        let timeout = if app.listing.scroll().is_settled() {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(16)
        };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let commands = app.handle_key(key);
                    runner.spawn_all(commands);
                }
            }
        }

        if app.should_quit {
            tracing::info!("quitting");
            return Ok(());
        }
    }
}
