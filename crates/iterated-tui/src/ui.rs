use chrono::Local;
use iterated_core::{Message, Sender};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, ConnectionStatus, FormField};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn draw(f: &mut Frame, app: &mut App) {
    if app.session.is_started() {
        draw_chat(f, app);
    } else {
        draw_setup(f, app);
    }
}

fn draw_setup(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Question
            Constraint::Length(5), // Answer
            Constraint::Min(6),    // How it works
            Constraint::Length(1), // Status bar
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);

    let answer_title = if app.session.options().require_answer {
        "Your Answer"
    } else {
        "Your Answer (Optional)"
    };
    draw_field(
        f,
        "Question",
        app.session.question(),
        "What STEM question are you working on?",
        app.focus == FormField::Question,
        chunks[1],
    );
    draw_field(
        f,
        answer_title,
        app.session.answer(),
        "Share your current answer or approach...",
        app.focus == FormField::Answer,
        chunks[2],
    );

    let steps = Text::from(vec![
        Line::from(" 1. Enter the question you're trying to solve"),
        Line::from(" 2. Share your current answer or approach"),
        Line::from(" 3. Work through it with guided questions"),
    ]);
    let how = Paragraph::new(steps)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("How IteratED Works")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(how, chunks[3]);

    let hint = if app.session.can_start() {
        "[Tab] Switch field  [Enter] Start Learning Session  [Ctrl+C] Quit"
    } else {
        "[Tab] Switch field  [Ctrl+C] Quit"
    };
    draw_status_line(f, hint.to_string(), chunks[4]);
}

fn draw_field(f: &mut Frame, title: &str, value: &str, placeholder: &str, focused: bool, area: Rect) {
    let border = if focused { Color::Cyan } else { Color::Blue };

    let line = if value.is_empty() && !focused {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let mut spans = vec![Span::styled(value.to_string(), Style::default().fg(Color::White))];
        if focused {
            spans.push(Span::styled("▌", Style::default().fg(Color::Green)));
        }
        Line::from(spans)
    };

    let field = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(Style::default().fg(border)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(field, area);
}

fn draw_chat(f: &mut Frame, app: &mut App) {
    if app.full_screen {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.size());
        draw_messages(f, app, chunks[0]);
        draw_status_bar(f, app, chunks[1]);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Problem
            Constraint::Min(6),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);
    draw_problem(f, app, chunks[1]);
    draw_messages(f, app, chunks[2]);
    draw_input(f, app, chunks[3]);
    draw_status_bar(f, app, chunks[4]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let status_color = match app.status {
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Disconnected => Color::Red,
    };

    let header_text = Line::from(vec![
        Span::styled(
            " IteratED",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        ),
        Span::styled("  Your Socratic STEM tutor", Style::default().fg(Color::Gray)),
        Span::styled("  |  ", Style::default().fg(Color::Gray)),
        Span::styled(app.status.to_string(), Style::default().fg(status_color)),
    ]);

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(header, area);
}

fn draw_problem(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled("Q: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(app.session.question().to_string()),
    ])];
    if !app.session.answer().trim().is_empty() {
        lines.push(Line::from(vec![
            Span::styled("A: ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(app.session.answer().to_string()),
        ]));
    }

    let problem = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Problem")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(problem, area);
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible_height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = app
        .session
        .transcript()
        .iter()
        .flat_map(|msg| format_message(msg, inner_width))
        .collect();

    if app.session.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("{} Thinking...", SPINNER[app.tick % SPINNER.len()]),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    // Bottom-anchored window, shifted up by the scroll offset
    app.set_scroll_limit(lines.len().saturating_sub(visible_height));
    let end = lines.len() - app.scroll_offset;
    let start = end.saturating_sub(visible_height);
    let window: Vec<Line> = lines.drain(start..end).collect();

    let title = match app.session.session_id() {
        Some(id) => format!("Conversation (Session: {}...)", &id[..8.min(id.len())]),
        None => "Conversation".to_string(),
    };

    let messages = Paragraph::new(window).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue)),
    );

    f.render_widget(messages, area);
}

fn format_message(msg: &Message, width: usize) -> Vec<Line<'static>> {
    let (label, style) = match msg.sender() {
        Sender::User => ("You", Style::default().fg(Color::Cyan)),
        Sender::Tutor => ("Tutor", Style::default().fg(Color::Green)),
    };

    let mut lines = vec![Line::from(Span::styled(
        label,
        style.add_modifier(Modifier::BOLD),
    ))];

    for row in wrap_text(msg.content(), width.saturating_sub(2)) {
        lines.push(Line::from(vec![Span::raw("  "), Span::styled(row, style)]));
    }

    let timestamp = msg.timestamp().with_timezone(&Local).format("%H:%M:%S");
    lines.push(Line::from(Span::styled(
        format!("  └─ {} ", timestamp),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(""));

    lines
}

/// Greedy word wrap by display width; words wider than a row are split
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if row.is_empty() {
                word.width()
            } else {
                row.width() + 1 + word.width()
            };
            if needed > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
            }
            if word.width() > width {
                for c in word.chars() {
                    if !row.is_empty() && row.width() + c.to_string().width() > width {
                        rows.push(std::mem::take(&mut row));
                    }
                    row.push(c);
                }
                continue;
            }
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(word);
        }
        rows.push(row);
    }

    rows
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let input_text = if app.session.is_loading() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::styled(
                "Waiting for the tutor...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else if app.session.input().is_empty() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::styled(
                "Type your response and press Enter...",
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::styled(app.session.input().to_string(), Style::default().fg(Color::White)),
            Span::styled("▌", Style::default().fg(Color::Green)),
        ])
    };

    let input = Paragraph::new(input_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Input")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(input, area);
}

fn chat_hint(app: &App) -> &'static str {
    if app.full_screen {
        "[Ctrl+F] Exit Full Screen  [Ctrl+R] Reset  [Ctrl+C] Quit"
    } else if app.session.can_send() {
        "[Enter] Send  [Ctrl+F] Full Screen  [Ctrl+R] Reset  [Ctrl+C] Quit"
    } else if app.session.is_loading() {
        "[Ctrl+R] Reset  [Ctrl+C] Quit"
    } else {
        "[Ctrl+F] Full Screen  [Ctrl+R] Reset  [Ctrl+C] Quit"
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = chat_hint(app);

    let status = format!(
        " Messages: {} | Scroll: {} | {}",
        app.session.transcript().len(),
        app.scroll_offset,
        help_text
    );
    draw_status_line(f, status, area);
}

fn draw_status_line(f: &mut Frame, text: String, area: Rect) {
    let status_bar = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::REVERSED));

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_text_is_one_row() {
        assert_eq!(wrap_text("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_wide_chars_in_narrow_rows() {
        assert_eq!(wrap_text("你好", 1), vec!["你", "好"]);
        assert_eq!(wrap_text("你好吗", 4), vec!["你好", "吗"]);
    }

    #[test]
    fn test_send_hint_follows_input() {
        let mut app = App::new("http://127.0.0.1:1", iterated_core::SessionOptions::default());
        app.session.start_session("Why?", "").unwrap();
        assert!(!chat_hint(&app).contains("[Enter] Send"));

        app.session.set_input("because");
        assert!(chat_hint(&app).contains("[Enter] Send"));

        app.toggle_full_screen();
        assert!(chat_hint(&app).contains("Exit Full Screen"));
    }

    #[test]
    fn test_wrap_keeps_line_breaks() {
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
    }
}
