use ratatui::{prelude::*, widgets::Paragraph};

pub fn lokiz_logo() -> Paragraph<'static> {
    const LOK: [&str; 5] = [
        "█      ███  █  █ ",
        "█     █   █ █ █  ",
        "█     █   █ ██   ",
        "█     █   █ █ █  ",
        "████   ███  █  █ ",
    ];

    const IZ: [&str; 5] = [
        " ███ ████",
        "  █     █",
        "  █    █ ",
        "  █   █  ",
        " ███ ████",
    ];

    let lines: Vec<Line> = LOK
        .iter()
        .zip(IZ.iter())
        .map(|(l, r)| {
            Line::from(vec![
                Span::styled(*l, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::styled(*r, Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    Paragraph::new(lines).alignment(Alignment::Center)
}
