use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use tui_textarea::TextArea;
use unicode_width::UnicodeWidthStr;

use crate::core::message::Bubble;
use crate::core::transcript::{Entry, Transcript};
use crate::ui::terminal_view::Screen;

const MAX_INPUT_ROWS: u16 = 5;
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

fn user_style() -> Style {
    Style::default().fg(Color::Cyan)
}

fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

fn image_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::UNDERLINED)
}

fn indicator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// One to three dots, advancing every 400 ms.
pub fn typing_dots(elapsed: Duration) -> &'static str {
    match (elapsed.as_millis() / 400) % 3 {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

pub fn spinner_frame(elapsed: Duration) -> &'static str {
    SPINNER_FRAMES[((elapsed.as_millis() / 120) % SPINNER_FRAMES.len() as u128) as usize]
}

fn push_bubble(lines: &mut Vec<Line<'static>>, bubble: &Bubble) {
    let style = if bubble.is_error {
        error_style()
    } else if bubble.is_user() {
        user_style()
    } else {
        Style::default()
    };

    let mut content_lines = bubble.content.split('\n');
    let first = content_lines.next().unwrap_or_default();
    if bubble.is_user() {
        lines.push(Line::from(vec![
            Span::styled("You: ", user_style().add_modifier(Modifier::BOLD)),
            Span::styled(first.to_string(), style),
        ]));
    } else if !first.is_empty() || !bubble.has_images() {
        lines.push(Line::from(Span::styled(first.to_string(), style)));
    }
    for line in content_lines {
        lines.push(Line::from(Span::styled(line.to_string(), style)));
    }

    for url in &bubble.images {
        lines.push(Line::from(vec![
            Span::styled("[image] ", indicator_style()),
            Span::styled(url.clone(), image_style()),
        ]));
    }
    lines.push(Line::from(""));
}

/// Transcript as styled lines, in entry order.
pub fn build_display_lines(transcript: &Transcript, elapsed: Duration) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in transcript.entries() {
        match entry {
            Entry::Bubble(bubble) => push_bubble(&mut lines, bubble),
            Entry::Typing => {
                lines.push(Line::from(Span::styled(
                    typing_dots(elapsed),
                    indicator_style(),
                )));
            }
            Entry::Loader(label) => {
                lines.push(Line::from(vec![
                    Span::styled(spinner_frame(elapsed), indicator_style()),
                    Span::raw(" "),
                    Span::styled(label.clone(), indicator_style()),
                ]));
            }
        }
    }
    lines
}

fn input_rows(input: &TextArea) -> u16 {
    u16::try_from(input.lines().len())
        .unwrap_or(MAX_INPUT_ROWS)
        .clamp(1, MAX_INPUT_ROWS)
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    popup
}

fn render_settings(f: &mut Frame, screen: &Screen, area: Rect) {
    let control_style = if screen.clear_control_enabled {
        Style::default().fg(Color::Yellow)
    } else {
        indicator_style()
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Server: ", indicator_style()),
            Span::raw(screen.server_url.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[c] ", control_style.add_modifier(Modifier::BOLD)),
            Span::styled(screen.clear_control_label.clone(), control_style),
        ]),
        Line::from(Span::styled("Ctrl+S or Esc to close", indicator_style())),
    ];
    let width = lines
        .iter()
        .map(Line::width)
        .max()
        .and_then(|widest| u16::try_from(widest).ok())
        .unwrap_or(0)
        .saturating_add(4)
        .max(32);
    let popup = popup_area(area, width, lines.len() as u16 + 2);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Settings")),
        popup,
    );
}

fn render_confirm(f: &mut Frame, prompt: &str, area: Rect) {
    let lines = vec![
        Line::from(prompt.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] Yes", Style::default().fg(Color::Red)),
            Span::raw("   "),
            Span::styled("[n] No", Style::default().fg(Color::Green)),
        ]),
    ];
    let width = u16::try_from(prompt.width())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .max(24);
    let popup = popup_area(area, width, lines.len() as u16 + 2);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Confirm")),
        popup,
    );
}

pub fn ui(f: &mut Frame, screen: &mut Screen) {
    let input_height = input_rows(&screen.input);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(input_height + 2),
        ])
        .split(f.area());

    let title = format!(
        "Companion v{} - {}",
        env!("CARGO_PKG_VERSION"),
        screen.server_url
    );
    f.render_widget(
        Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    let elapsed = screen.started.elapsed();
    let transcript = Paragraph::new(build_display_lines(&screen.transcript, elapsed))
        .wrap(Wrap { trim: false });

    // Keep the offset in bounds as the transcript grows or the window shrinks.
    let total_rows = u16::try_from(transcript.line_count(chunks[1].width)).unwrap_or(u16::MAX);
    screen.viewport_height = chunks[1].height;
    screen.max_scroll = total_rows.saturating_sub(chunks[1].height);
    screen.scroll_offset = if screen.follow_bottom {
        screen.max_scroll
    } else {
        screen.scroll_offset.min(screen.max_scroll)
    };
    f.render_widget(transcript.scroll((screen.scroll_offset, 0)), chunks[1]);

    if let Some(alert) = &screen.alert {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(alert.clone(), error_style()))),
            chunks[2],
        );
    }

    let input_style = if screen.input_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        indicator_style()
    };
    let input_title = if screen.input_enabled {
        "Message (Enter to send, Alt+Enter for new line, Ctrl+S settings, Ctrl+C to quit)"
    } else {
        "Waiting for reply... (Ctrl+C to quit)"
    };
    let show_cursor =
        screen.input_enabled && screen.confirm.is_none() && !screen.settings_visible;
    let cursor_style = if show_cursor {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        input_style
    };
    // The textarea scrolls its own viewport to keep the cursor in view.
    screen.input.set_style(input_style);
    screen.input.set_cursor_style(cursor_style);
    screen.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Reset))
            .title(input_title),
    );
    f.render_widget(&screen.input, chunks[3]);

    if screen.settings_visible {
        render_settings(f, screen, chunks[1]);
    }
    let area = f.area();
    if let Some(pending) = &screen.confirm {
        render_confirm(f, &pending.prompt, area);
    }
}
