use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use taskboard_core::{format_minutes, TaskRepository, TaskState};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::commands::DELETE_PROMPT;
use crate::tui::app::{App, InputMode};

pub fn draw<R: TaskRepository>(f: &mut Frame, app: &mut App<R>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Board
            Constraint::Length(6), // Detail
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer
        ])
        .split(size);

    let header = Paragraph::new("TASKBOARD")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(header, main_chunks[0]);

    draw_board(f, app, main_chunks[1]);
    draw_detail_view(f, app, main_chunks[2]);
    draw_input(f, app, main_chunks[3]);
    draw_footer(f, app, main_chunks[4]);
}

fn state_color(state: TaskState) -> Color {
    match state {
        TaskState::ToDo => Color::Yellow,
        TaskState::InProgress => Color::Blue,
        TaskState::ToVerify => Color::Magenta,
        TaskState::Done => Color::Green,
    }
}

/// Cuts `text` to at most `width` columns, ending with `…` when shortened.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn draw_board<R: TaskRepository>(f: &mut Frame, app: &mut App<R>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            TaskState::ALL
                .iter()
                .map(|_| Constraint::Ratio(1, TaskState::ALL.len() as u32)),
        )
        .split(area);

    for (i, column) in app.board.columns.iter().enumerate() {
        let Some(&area) = columns.get(i) else {
            continue;
        };
        let focused = i == app.column;
        // Borders and the highlight symbol.
        let text_width = usize::from(area.width.saturating_sub(5));

        let items: Vec<ListItem> = column
            .tasks
            .iter()
            .map(|task| {
                let title = task.description.lines().next().unwrap_or_default();
                ListItem::new(vec![
                    Line::from(Span::styled(
                        truncate(title, text_width),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("{} · {}", task.short_id, task.estimation),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let title = format!(
            " {} ({}, {}) ",
            column.state,
            column.tasks.len(),
            format_minutes(u32::try_from(column.total_minutes).unwrap_or(u32::MAX))
        );
        let border_style = if focused {
            Style::default().fg(state_color(column.state))
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let highlight = if focused {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(
                        title,
                        Style::default().fg(state_color(column.state)),
                    ))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border_style),
            )
            .highlight_style(highlight)
            .highlight_symbol(if focused { "> " } else { "  " });

        if let Some(state) = app.selections.get_mut(i) {
            f.render_stateful_widget(list, area, state);
        }
    }
}

fn draw_detail_view<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let Some(task) = app.selected_task() else {
        f.render_widget(block, area);
        return;
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
        Span::raw(task.id.to_string()),
        Span::styled("  Estimation: ", Style::default().fg(Color::Blue)),
        Span::raw(task.estimation.clone()),
        Span::styled("  State: ", Style::default().fg(Color::Blue)),
        Span::styled(task.state.label(), Style::default().fg(state_color(task.state))),
    ])];
    lines.extend(task.description.lines().map(Line::from));

    let detail = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_input<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let title = match app.input_mode {
        InputMode::Creating => " New task: description est:<duration> state:<state> ",
        InputMode::Editing(_) => " Edit task ",
        InputMode::Normal | InputMode::ConfirmDelete(_) => " Input ",
    };
    let active = matches!(app.input_mode, InputMode::Creating | InputMode::Editing(_));
    let style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(app.input.as_str()).style(style).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(input, area);

    if active {
        let before: String = app.input.chars().take(app.cursor_position).collect();
        let offset = u16::try_from(before.width()).unwrap_or(u16::MAX);
        f.set_cursor_position((area.x.saturating_add(1).saturating_add(offset), area.y + 1));
    }
}

fn draw_footer<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let (text, style) = match (&app.input_mode, &app.message) {
        (InputMode::ConfirmDelete(_), _) => (
            format!("{} (y/n)", DELETE_PROMPT),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        (_, Some(msg)) => (msg.clone(), Style::default().fg(Color::Red)),
        (InputMode::Creating | InputMode::Editing(_), None) => (
            "Enter: Save | Esc: Cancel".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        (InputMode::Normal, None) => (
            "h/l: Column | j/k: Task | a: Add | e: Edit | d: Delete | </>: Move | q: Quit"
                .to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let footer = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center);
    f.render_widget(footer, area);
}
