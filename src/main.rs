use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod config;
mod db;
mod error;
mod form;
mod models;
mod streak;
mod tui;

use app::App;
use config::Config;
use error::Result;
use models::{ReadOutcome, Story, DATE_FORMAT};
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    // A store that cannot be opened ends the session before anything is drawn
    let mut app = match App::new(&config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            eprintln!(
                "Failed to open the story database at {}:\n{}\n\nCheck db_path in {}",
                config.db_path,
                e,
                Config::config_path().display()
            );
            std::process::exit(1);
        }
    };

    // Headless modes print and exit
    match args.get(1).map(String::as_str) {
        None => {}
        Some("--list") => {
            print_stories(&app.stories);
            return Ok(());
        }
        Some("--search") => {
            let term = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("--search requires a term"))?;
            app.search(term).await?;
            print_stories(&app.stories);
            return Ok(());
        }
        Some("--read") => {
            let today = chrono::Local::now().date_naive();
            let outcome = app.record_read(today).await?;
            if let ReadOutcome::AlreadyCounted(_) = outcome {
                println!("Today's read is already counted.");
            }
            print_streak(&app);
            return Ok(());
        }
        Some("--streak") => {
            print_streak(&app);
            return Ok(());
        }
        Some("--export") => {
            let path = args
                .get(2)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("--export requires a file path"))?;
            let json = serde_json::to_string_pretty(&app.stories)?;
            std::fs::write(&path, json)?;
            println!("Exported {} stories to {:?}", app.stories.len(), path);
            return Ok(());
        }
        Some(other) => {
            return Err(anyhow::anyhow!(
                "Unknown argument '{other}' (expected --list, --search <term>, --read, --streak or --export <path>)"
            )
            .into());
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) =
                        handle_key_event(key, app.mode, app.notice.is_some(), app.show_help)
                    {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

fn print_stories(stories: &[Story]) {
    println!(
        "{:>4}  {:<3}  {:<30}  {:<20}  {:<10}  {:<10}  {:>6}  {:>8}",
        "ID", "Fav", "Title", "Author", "Genre", "Status", "Chaps", "Words"
    );
    for story in stories {
        println!(
            "{:>4}  {:<3}  {:<30}  {:<20}  {:<10}  {:<10}  {:>6}  {:>8}",
            story.id,
            story.favorite_icon(),
            story.title,
            story.author,
            story.genre,
            story.status,
            story.chapter_count,
            story.word_count
        );
    }
}

fn print_streak(app: &App) {
    let streak = app.streak();
    let last_read = streak
        .last_read_date
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "never".to_string());
    println!("Current streak: {} day(s)", streak.current_streak);
    println!("Longest streak: {} day(s)", streak.longest_streak);
    println!("Last read: {}", last_read);
}
