use chrono::Utc;
use lokiz::feed::PlaybackState;
use lokiz::model::{format_count, relative_label, Comment, Video};
use lokiz::overlay::{CommentPanel, FollowLists, Overlay, ShareSheet, SocialTarget};
use lokiz::pages::{ProfileTab, SettingsToggle};
use lokiz::search::SearchTab;
use lokiz::toast::ToastLevel;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::{App, Route, EXPLORE_COLUMNS, SETTINGS_FIELDS};
use crate::logo;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(f.size());

    render_header(f, app, chunks[0]);
    match app.route {
        Route::Feed => render_feed(f, app, chunks[1]),
        Route::Explore => render_explore(f, app, chunks[1]),
        Route::Search => render_search(f, app, chunks[1]),
        Route::Profile(_) => render_profile(f, app, chunks[1]),
        Route::Messages => render_messages(f, app, chunks[1]),
        Route::Notifications => render_notifications(f, app, chunks[1]),
        Route::Settings => render_settings(f, app, chunks[1]),
        Route::Login | Route::Register => render_auth(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);

    if let Some(overlay) = app.overlays.current() {
        render_overlay(f, app, overlay);
    }
}

fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let mut block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Magenta));
    }
    block
}

fn highlighted(list: List<'_>) -> List<'_> {
    list.highlight_style(Style::default().bg(Color::Magenta).fg(Color::Black))
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let who = match app.signed_in_user() {
        Some(user) => format!("@{}", user.username),
        None => "signed out".to_string(),
    };
    let mode = if app.is_offline() { " [offline]" } else { "" };
    let line = Line::from(vec![
        Span::styled("LOKIZ ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        Span::raw(app.route.path()),
        Span::styled(format!("  {who}{mode}"), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let (text, color) = match app.toasts.current() {
        Some(toast) => {
            let color = match toast.level {
                ToastLevel::Info => Color::Cyan,
                ToastLevel::Success => Color::Green,
                ToastLevel::Error => Color::Red,
            };
            (toast.msg.clone(), color)
        }
        None if app.editing => ("typing: enter submit, tab next field, esc stop".to_string(), Color::Yellow),
        None => (
            "1 feed 2 explore 3 search 4 messages 5 alerts 6 profile 7 settings | L login R register O logout | q quit"
                .to_string(),
            Color::DarkGray,
        ),
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(color)), area);
}

fn video_lines(video: &Video) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(video.user.handle(), Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(video.caption.clone()),
    ];
    if let Some(music) = &video.music_name {
        lines.push(Line::styled(format!("♪ {music}"), Style::default().fg(Color::Cyan)));
    }
    lines.push(Line::raw(format!(
        "{} {}   💬 {}   {} {}   ↗ {}   ▶ {}",
        if video.is_liked { "♥" } else { "♡" },
        format_count(video.stats.likes),
        format_count(video.stats.comments),
        if video.is_bookmarked { "★" } else { "☆" },
        format_count(video.stats.bookmarks),
        format_count(video.stats.shares),
        format_count(video.stats.views),
    )));
    lines
}

fn render_feed(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(20)])
        .split(area);

    let scroll = app.feed.scroll();
    let items: Vec<ListItem> = app
        .feed
        .videos()
        .iter()
        .zip(app.feed.players())
        .map(|(video, player)| {
            let marker = match player.state() {
                PlaybackState::Playing => "▶",
                PlaybackState::Paused => "⏸",
                PlaybackState::Inactive => " ",
            };
            ListItem::new(format!("{marker} {} {}", video.id, video.user.handle()))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(scroll.active_index()));
    let title = format!("Feed {}/{}", scroll.active_index() + 1, app.feed.len());
    f.render_stateful_widget(highlighted(List::new(items).block(panel_block(&title, false))), cols[0], &mut state);

    let card = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(cols[1]);
    let Some(video) = app.feed.active_video() else {
        f.render_widget(Paragraph::new("Nothing to watch yet").block(panel_block("For you", true)), cols[1]);
        return;
    };
    let status = if scroll.is_scrolling() { "scrolling…" } else { "" };
    let block = panel_block(&format!("For you {status}"), true);
    f.render_widget(Paragraph::new(video_lines(video)).wrap(Wrap { trim: true }).block(block), card[0]);

    if let Some(player) = app.feed.player(scroll.active_index()) {
        let label = format!(
            "{} {}",
            match player.state() {
                PlaybackState::Playing => "playing",
                PlaybackState::Paused => "paused (space to play)",
                PlaybackState::Inactive => "inactive",
            },
            if player.is_muted() { "🔇" } else { "🔊" },
        );
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Magenta))
            .percent(player.progress().round().clamp(0.0, 100.0) as u16)
            .label(label);
        f.render_widget(gauge, card[1]);
    }
}

fn render_explore(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    let titles: Vec<Line> = lokiz::mock::CATEGORIES.iter().map(|c| Line::raw(*c)).collect();
    let tabs = Tabs::new(titles)
        .select(app.explore.category)
        .block(panel_block("Explore", false))
        .highlight_style(Style::default().fg(Color::Magenta));
    f.render_widget(tabs, rows[0]);

    let width = (rows[1].width.saturating_sub(2) as usize / EXPLORE_COLUMNS).max(8);
    let mut lines: Vec<Line> = app
        .explore
        .videos
        .chunks(EXPLORE_COLUMNS)
        .enumerate()
        .map(|(row, chunk)| {
            let cells: Vec<Span> = chunk
                .iter()
                .enumerate()
                .map(|(col, video)| {
                    let text = format!(" #{} ▶{}", video.id, format_count(video.stats.views));
                    let cell = format!("{text:<width$}");
                    if row * EXPLORE_COLUMNS + col == app.explore.selected {
                        Span::styled(cell, Style::default().bg(Color::Magenta).fg(Color::Black))
                    } else {
                        Span::raw(cell)
                    }
                })
                .collect();
            Line::from(cells)
        })
        .collect();
    if app.explore.is_loading() {
        lines.push(Line::styled("loading…", Style::default().fg(Color::DarkGray)));
    }
    let selected_row = (app.explore.selected / EXPLORE_COLUMNS) as u16;
    let visible = rows[1].height.saturating_sub(2);
    let scroll = selected_row.saturating_sub(visible.saturating_sub(1));
    let title = format!("{} ({} videos)", app.explore.category_name(), app.explore.videos.len());
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)).block(panel_block(&title, true)), rows[1]);
}

fn render_search(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    let input = Paragraph::new(app.search_query.as_str()).block(panel_block("Search (i to type)", app.editing));
    f.render_widget(input, rows[0]);

    let tabs_all = [SearchTab::Videos, SearchTab::Users, SearchTab::Hashtags];
    let titles: Vec<Line> =
        tabs_all.iter().map(|t| Line::raw(format!("{} ({})", t.title(), app.search_results.count(*t)))).collect();
    let selected = tabs_all.iter().position(|t| *t == app.search_tab).unwrap_or(0);
    f.render_widget(Tabs::new(titles).select(selected).block(Block::default().borders(Borders::ALL)), rows[1]);

    let items: Vec<ListItem> = match app.search_tab {
        SearchTab::Videos => app.search_results.videos.iter().map(|v| ListItem::new(format!("{}  {}", v.user.handle(), v.caption))).collect(),
        SearchTab::Users => app
            .search_results
            .users
            .iter()
            .map(|u| ListItem::new(format!("{} {}  {} followers", u.nickname, u.handle(), format_count(u.followers_count))))
            .collect(),
        SearchTab::Hashtags => app
            .search_results
            .hashtags
            .iter()
            .map(|h| ListItem::new(format!("#{}  {} videos  {} views", h.name, h.video_count, format_count(h.total_views))))
            .collect(),
    };
    let empty = if app.search_query.trim().is_empty() { "Type to search" } else { "No results" };
    if items.is_empty() {
        f.render_widget(Paragraph::new(empty).block(panel_block("Results", false)), rows[2]);
        return;
    }
    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(highlighted(List::new(items).block(panel_block("Results", false))), rows[2], &mut state);
}

fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let Some(profile) = app.profile.as_ref() else {
        f.render_widget(Paragraph::new("No profile loaded").block(panel_block("Profile", false)), area);
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);
    let user = &profile.user;
    let header = vec![
        Line::styled(format!("{} {}", user.nickname, user.handle()), Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(user.bio.clone().unwrap_or_default()),
        Line::raw(format!(
            "{} following   {} followers   {} likes",
            format_count(user.following_count),
            format_count(user.followers_count),
            format_count(user.likes_count)
        )),
        Line::styled(if user.is_following { "[Following] (f)" } else { "[Follow] (f)" }, Style::default().fg(Color::Magenta)),
    ];
    f.render_widget(Paragraph::new(header).block(panel_block("Profile", false)), rows[0]);

    let tab = match profile.tab {
        ProfileTab::Videos => "Videos",
        ProfileTab::Liked => "Liked",
    };
    let title = format!("{tab} · {} (tab / →)", profile.sort.label());
    let items: Vec<ListItem> = profile
        .visible()
        .iter()
        .map(|v| ListItem::new(format!("▶ {}  {}  {}", format_count(v.stats.views), v.caption, v.created_at.format("%Y-%m-%d"))))
        .collect();
    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(highlighted(List::new(items).block(panel_block(&title, true))), rows[1], &mut state);
}

fn render_messages(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(area);
    let items: Vec<ListItem> = app
        .messages
        .conversations
        .iter()
        .map(|c| {
            let style = if c.is_unread() { Style::default().add_modifier(Modifier::BOLD) } else { Style::default() };
            let badge = if c.is_unread() { format!(" ({})", c.unread_count) } else { String::new() };
            ListItem::new(vec![
                Line::styled(format!("{}{badge}", c.user.nickname), style),
                Line::styled(format!("{} · {}", c.last_message, c.last_message_time), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(highlighted(List::new(items).block(panel_block("Messages", false))), cols[0], &mut state);

    let chat = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(cols[1]);
    let Some(conv) = app.messages.current() else {
        f.render_widget(Paragraph::new("Pick a conversation (enter)").block(panel_block("Chat", true)), cols[1]);
        return;
    };
    let lines: Vec<Line> = conv
        .messages
        .iter()
        .map(|m| {
            let mine = m.sender_id != conv.user.id;
            let who = if mine { "you" } else { conv.user.nickname.as_str() };
            Line::raw(format!("{} {who}: {}", m.created_at.format("%H:%M"), m.text))
        })
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(panel_block(&conv.user.nickname, true)), chat[0]);
    f.render_widget(Paragraph::new(app.messages.draft.as_str()).block(panel_block("Message (i)", app.editing)), chat[1]);
}

fn render_notifications(f: &mut Frame, app: &App, area: Rect) {
    let now = Utc::now();
    let items: Vec<ListItem> = app
        .notifications
        .items
        .iter()
        .map(|n| {
            let who = n.user.as_ref().map(|u| u.nickname.as_str()).unwrap_or("LOKIZ");
            let style = if n.is_read { Style::default() } else { Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD) };
            ListItem::new(Line::styled(
                format!("[{}] {who} {}  {}", n.kind.as_str(), n.message, relative_label(now, n.created_at)),
                style,
            ))
        })
        .collect();
    let title = format!("Notifications ({} unread, a: mark all read)", app.notifications.unread());
    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(highlighted(List::new(items).block(panel_block(&title, true))), area, &mut state);
}

fn render_settings(f: &mut Frame, app: &App, area: Rect) {
    let s = &app.settings;
    let fields = [("Nickname", &s.nickname), ("Username", &s.username), ("Bio", &s.bio), ("E-mail", &s.email)];
    let mut items: Vec<ListItem> = fields.iter().map(|(label, value)| ListItem::new(format!("{label:<24}{value}"))).collect();
    items.extend(SettingsToggle::ALL.iter().map(|t| {
        let mark = if s.get(*t) { "[x]" } else { "[ ]" };
        ListItem::new(format!("{:<24}{mark}", t.label()))
    }));
    let mut state = ListState::default();
    state.select(Some(app.cursor));
    let title = if app.cursor < SETTINGS_FIELDS { "Settings (i edit, enter save)" } else { "Settings (enter toggles)" };
    f.render_stateful_widget(highlighted(List::new(items).block(panel_block(title, app.editing))), area, &mut state);
}

fn render_auth(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);
    f.render_widget(logo::lokiz_logo(), rows[0]);

    let masked = |s: &str| "•".repeat(s.chars().count());
    let (title, fields): (&str, Vec<(&str, String)>) = match app.route {
        Route::Register => (
            "Register",
            vec![
                ("Username", app.register.username.clone()),
                ("E-mail", app.register.email.clone()),
                ("Password", masked(&app.register.password)),
                ("Confirm password", masked(&app.register.confirm_password)),
            ],
        ),
        _ => ("Log in", vec![("E-mail", app.login.email.clone()), ("Password", masked(&app.login.password))]),
    };
    let lines: Vec<Line> = fields
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.cursor { Style::default().fg(Color::Magenta) } else { Style::default() };
            Line::styled(format!("{label:<18}{value}"), style)
        })
        .collect();
    let area = centered_rect(60, 80, rows[1]);
    f.render_widget(Paragraph::new(lines).block(panel_block(title, app.editing)), area);
}

fn comment_items(panel: &CommentPanel) -> Vec<ListItem<'static>> {
    let line = |c: &Comment, indent: &str| {
        let heart = if c.is_liked { "♥" } else { "♡" };
        ListItem::new(format!("{indent}{}: {}  {heart} {}", c.user.nickname, c.text, c.likes))
    };
    panel.comments.iter().flat_map(|c| std::iter::once(line(c, "")).chain(c.replies.iter().map(|r| line(r, "    ↳ ")))).collect()
}

fn share_lines(sheet: &ShareSheet, social: usize) -> (Vec<ListItem<'static>>, Line<'static>) {
    let items = sheet
        .recipients
        .iter()
        .map(|u| {
            let picked = if sheet.selected() == Some(u.id.as_str()) { "● " } else { "○ " };
            ListItem::new(format!("{picked}{} {}", u.nickname, u.handle()))
        })
        .collect();
    let targets = SocialTarget::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let style = if i == social { Style::default().fg(Color::Black).bg(Color::Magenta) } else { Style::default() };
            Span::styled(format!(" {} ", t.label()), style)
        })
        .collect::<Vec<_>>();
    (items, Line::from(targets))
}

fn follow_items(lists: &FollowLists) -> Vec<ListItem<'static>> {
    lists
        .users()
        .iter()
        .map(|u| {
            let button = if u.is_following { "[Following]" } else { "[Follow]" };
            ListItem::new(format!("{} {}  {button}", u.nickname, u.handle()))
        })
        .collect()
}

fn render_overlay(f: &mut Frame, app: &App, overlay: &Overlay) {
    let area = centered_rect(70, 70, f.size());
    f.render_widget(Clear, area);
    let block = panel_block(&overlay.title(), true);
    let mut state = ListState::default();
    state.select(Some(app.overlay_cursor));

    match overlay {
        Overlay::Comments(panel) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)])
                .split(area);
            f.render_stateful_widget(highlighted(List::new(comment_items(panel)).block(block)), rows[0], &mut state);
            let composer = Paragraph::new(panel.draft.as_str()).block(panel_block("Add comment (i)", app.editing));
            f.render_widget(composer, rows[1]);
        }
        Overlay::Share(sheet) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3), Constraint::Length(1)])
                .split(area);
            let (items, targets) = share_lines(sheet, app.social_cursor);
            f.render_stateful_widget(highlighted(List::new(items).block(block)), rows[0], &mut state);
            f.render_widget(Paragraph::new(sheet.message.as_str()).block(panel_block("Message (i, enter sends)", app.editing)), rows[1]);
            f.render_widget(Paragraph::new(targets), rows[2]);
        }
        Overlay::Follow(lists) => {
            f.render_stateful_widget(highlighted(List::new(follow_items(lists)).block(block)), area, &mut state);
        }
        Overlay::Glitch(picker) => {
            let items: Vec<ListItem> = picker
                .effects
                .iter()
                .map(|e| ListItem::new(format!("{}  {}", e.name, e.description.clone().unwrap_or_default())))
                .collect();
            let mut picked = ListState::default();
            picked.select(Some(picker.selected));
            f.render_stateful_widget(highlighted(List::new(items).block(block)), area, &mut picked);
        }
        Overlay::Hashtag(view) => {
            let items: Vec<ListItem> =
                view.videos.iter().map(|v| ListItem::new(format!("{}  {}", v.user.handle(), v.caption))).collect();
            let title = format!("{}  ({} views)", overlay.title(), format_count(view.total_views()));
            f.render_stateful_widget(highlighted(List::new(items).block(panel_block(&title, true))), area, &mut state);
        }
        Overlay::VideoDetail(video) => {
            f.render_widget(Paragraph::new(video_lines(video)).wrap(Wrap { trim: true }).block(block), area);
        }
        Overlay::LoginPrompt => {
            let text = vec![Line::raw("Log in to like, comment and follow."), Line::raw(""), Line::raw("enter: log in   esc: later")];
            f.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
