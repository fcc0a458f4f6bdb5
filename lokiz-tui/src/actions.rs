use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Route;

pub enum Action {
    Quit,
    Go(Route),
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Edit,
    NextTab,
    TogglePlay,
    ToggleMute,
    Like,
    Bookmark,
    Comments,
    Share,
    Follow,
    Glitch,
    Hashtag,
    MarkAllRead,
    Refresh,
    Logout,
    None,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('1') => Action::Go(Route::Feed),
            KeyCode::Char('2') => Action::Go(Route::Explore),
            KeyCode::Char('3') => Action::Go(Route::Search),
            KeyCode::Char('4') => Action::Go(Route::Messages),
            KeyCode::Char('5') => Action::Go(Route::Notifications),
            KeyCode::Char('6') => Action::Go(Route::Profile(None)),
            KeyCode::Char('7') => Action::Go(Route::Settings),
            KeyCode::Char('L') => Action::Go(Route::Login),
            KeyCode::Char('R') => Action::Go(Route::Register),
            KeyCode::Up | KeyCode::Char('k') => Action::Up,
            KeyCode::Down | KeyCode::Char('j') => Action::Down,
            KeyCode::Left => Action::Left,
            KeyCode::Right => Action::Right,
            KeyCode::Enter => Action::Select,
            KeyCode::Esc => Action::Back,
            KeyCode::Char('i') | KeyCode::Char('/') => Action::Edit,
            KeyCode::Tab => Action::NextTab,
            KeyCode::Char(' ') => Action::TogglePlay,
            KeyCode::Char('m') => Action::ToggleMute,
            KeyCode::Char('l') => Action::Like,
            KeyCode::Char('b') => Action::Bookmark,
            KeyCode::Char('c') => Action::Comments,
            KeyCode::Char('s') => Action::Share,
            KeyCode::Char('f') => Action::Follow,
            KeyCode::Char('g') => Action::Glitch,
            KeyCode::Char('h') => Action::Hashtag,
            KeyCode::Char('a') => Action::MarkAllRead,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('O') => Action::Logout,
            _ => Action::None,
        }
    }
}
