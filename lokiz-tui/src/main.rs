mod actions;
mod app;
mod cli;
mod logo;
mod ui;

use std::error::Error;
use std::fs::OpenOptions;
use std::io;
use std::time::Duration;

use actions::Action;
use app::{App, Route};
use clap::Parser;
use cli::Cli;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use log::{info, warn};
use lokiz::{ApiClient, ClientConfig, Session};
use ratatui::{prelude::*, Terminal};

/// The terminal owns stdout, so logs go to a file.
fn init_logging(cfg: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(&cfg.log_file)?;
    env_logger::Builder::new()
        .parse_filters(&cfg.log_level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), event::DisableMouseCapture, LeaveAlternateScreen)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let file_cfg = ClientConfig::load(&cli.config)?.apply_env();
    let config = cli.merge_into_config(file_cfg);
    init_logging(&config)?;
    info!("starting against {} (offline: {})", config.base_url(), config.offline);

    let session = Session::load(&config.session_path)?;
    let api = if config.offline {
        None
    } else {
        match ApiClient::new(&config, session.clone()) {
            Ok(api) => Some(api),
            Err(err) => {
                warn!("backend client unavailable, running offline: {err}");
                None
            }
        }
    };
    let mut app = App::new(config, session, api);

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, event::EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    app.start().await;
    let res = run_app(&mut terminal, &mut app).await;

    restore_terminal()?;
    if let Err(e) = res {
        eprintln!("{:?}", e);
    }
    info!("bye");
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    loop {
        app.drain();
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(50))? {
            tokio::time::sleep(Duration::from_millis(10)).await;
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.editing {
                    match key.code {
                        KeyCode::Esc => app.editing = false,
                        KeyCode::Enter => app.submit_edit().await,
                        KeyCode::Tab => app.next_tab(),
                        KeyCode::Backspace => app.backspace(),
                        KeyCode::Char(c) => app.type_char(c),
                        _ => {}
                    }
                    continue;
                }
                match Action::from_key(key) {
                    Action::Quit => return Ok(()),
                    Action::Go(route) => app.open(route).await,
                    Action::Up => app.up(),
                    Action::Down => app.down(),
                    Action::Left => app.left(),
                    Action::Right => app.right(),
                    Action::Select => app.select().await,
                    Action::Back => app.back(),
                    Action::Edit => app.begin_edit(),
                    Action::NextTab => app.next_tab(),
                    Action::TogglePlay => app.toggle_play(),
                    Action::ToggleMute => app.toggle_mute(),
                    Action::Like => app.like().await,
                    Action::Bookmark => app.bookmark().await,
                    Action::Comments => app.open_comments().await,
                    Action::Share => app.open_share().await,
                    Action::Follow => match app.route {
                        Route::Profile(_) => app.toggle_profile_follow().await,
                        _ => app.open_follow().await,
                    },
                    Action::Glitch => app.open_glitch(),
                    Action::Hashtag => app.open_hashtag(),
                    Action::MarkAllRead => app.mark_all_read().await,
                    Action::Refresh => app.refresh().await,
                    Action::Logout => app.logout(),
                    Action::None => {}
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => app.wheel(true),
                MouseEventKind::ScrollUp => app.wheel(false),
                _ => {}
            },
            _ => {}
        }
    }
}
