use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::app::{App, Screen};
use super::form::Form;
use crate::domain::api::{AuthApi, TodoApi};
use crate::domain::query::SortOrder;
use crate::domain::store::SessionStore;
use crate::domain::todo::{Todo, TodoPriority, TodoStatus};

const DASHBOARD_KEYS: &str = "n new  e edit  space complete  d delete  f filters  s sort  o order  x clear  r refresh  p profile  l logout  q quit";

pub fn draw<A, S>(f: &mut Frame, app: &App<A, S>)
where
    A: AuthApi + TodoApi + Clone,
    S: SessionStore,
{
    match &app.screen {
        Screen::Login(form) => {
            draw_splash(f, "Todo Manager");
            draw_form(f, form, "Enter sign in  Tab next field  Ctrl+R create account  Esc quit");
        }
        Screen::Register(form) => {
            draw_splash(f, "Todo Manager");
            draw_form(f, form, "Enter register  Tab next field  Esc back");
        }
        Screen::Dashboard => draw_dashboard(f, app),
        Screen::TodoForm { form, .. } => {
            draw_dashboard(f, app);
            draw_form(f, form, "Enter save  Left/Right change choice  Esc cancel");
        }
        Screen::Filters(form) => {
            draw_dashboard(f, app);
            draw_form(f, form, "Enter apply  Left/Right change choice  Esc cancel");
        }
        Screen::Profile(form) => {
            draw_dashboard(f, app);
            let since = app
                .sessions
                .current()
                .map(|s| format!("Session started {}  ", s.session_started_at.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default();
            draw_form(f, form, &format!("{since}Empty passwords keep the current one  Enter save  Esc cancel"));
        }
        Screen::ConfirmDelete { title, .. } => {
            draw_dashboard(f, app);
            let area = centered(f.size(), 50, 5);
            let text = format!("Delete \"{title}\"?  y / n");
            f.render_widget(Clear, area);
            f.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("confirm")), area);
        }
    }
}

fn draw_splash(f: &mut Frame, title: &str) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    f.render_widget(block, f.size());
}

fn draw_dashboard<A, S>(f: &mut Frame, app: &App<A, S>)
where
    A: AuthApi + TodoApi + Clone,
    S: SessionStore,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.size());

    let who = app
        .sessions
        .current()
        .map(|s| format!("{} <{}>", s.display_name, s.email))
        .unwrap_or_default();
    let header = Paragraph::new(format!("Signed in as {who}")).block(Block::default().borders(Borders::ALL).title("Todo Manager"));
    f.render_widget(header, chunks[0]);

    let stats = app.todos.stats();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[1]);
    let card = |label: &str, value: u64, color: Color| {
        Paragraph::new(Span::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)))
            .block(Block::default().borders(Borders::ALL).title(label.to_string()))
    };
    f.render_widget(card("Total", stats.total_todos, Color::White), cards[0]);
    f.render_widget(card("Pending", stats.pending, Color::Yellow), cards[1]);
    f.render_widget(card("In Progress", stats.in_progress, Color::Cyan), cards[2]);
    f.render_widget(card("Completed", stats.completed, Color::Green), cards[3]);

    let visible = app.visible();
    let summary = format!("Showing {} of {} todos  |  {}", visible.len(), app.todos.todos().len(), filter_summary(app));
    f.render_widget(Paragraph::new(summary), chunks[2]);

    let now = Utc::now();
    let rows = visible.iter().map(|todo| todo_row(todo, now));
    let widths = [
        Constraint::Length(3),
        Constraint::Percentage(40),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(["", "Title", "Status", "Priority", "Due", ""]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title("todos"))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED));
    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, chunks[3], &mut state);
    if visible.is_empty() {
        let empty = if app.todos.load_error().is_some() { "Could not load todos. Press r to retry." } else { "No todos yet. Press n to add one." };
        f.render_widget(Paragraph::new(empty).style(Style::default().fg(Color::DarkGray)), inner(chunks[3]));
    }

    let status = match (&app.notice, app.todos.load_error()) {
        (Some(notice), _) => Line::styled(notice.text.clone(), notice_style(notice.is_error)),
        (None, Some(err)) => Line::styled(err.to_string(), notice_style(true)),
        (None, None) => Line::raw(DASHBOARD_KEYS),
    };
    f.render_widget(Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("status")), chunks[4]);
}

fn due_marker(todo: &Todo, now: chrono::DateTime<Utc>) -> Option<&'static str> {
    if todo.is_overdue(now) {
        Some("Overdue")
    } else if todo.is_due_soon_at(now) {
        Some("Due soon")
    } else {
        None
    }
}

fn todo_row(todo: &Todo, now: chrono::DateTime<Utc>) -> Row<'static> {
    let mark = if todo.status == TodoStatus::Completed { "[x]" } else { "[ ]" };
    let priority_color = match todo.priority {
        TodoPriority::High => Color::Red,
        TodoPriority::Medium => Color::Yellow,
        TodoPriority::Low => Color::Green,
    };
    let flag = match due_marker(todo, now) {
        Some(marker @ "Overdue") => Span::styled(marker, Style::default().fg(Color::Red)),
        Some(marker) => Span::styled(marker, Style::default().fg(Color::Yellow)),
        None => Span::raw(""),
    };
    Row::new([
        Cell::from(mark),
        Cell::from(todo.title.clone()),
        Cell::from(todo.status.label()),
        Cell::from(Span::styled(todo.priority.as_str(), Style::default().fg(priority_color))),
        Cell::from(todo.due_date.format("%Y-%m-%d").to_string()),
        Cell::from(flag),
    ])
}

fn filter_summary<A, S>(app: &App<A, S>) -> String
where
    A: AuthApi + TodoApi + Clone,
    S: SessionStore,
{
    let filters = app.todos.filters();
    let (key, order) = app.todos.sort();
    let mut parts = Vec::new();
    if let Some(status) = filters.status { parts.push(format!("status {}", status.label())); }
    if let Some(priority) = filters.priority { parts.push(format!("priority {}", priority.as_str())); }
    if let Some(from) = filters.date_from { parts.push(format!("from {}", from.format("%Y-%m-%d"))); }
    if let Some(to) = filters.date_to { parts.push(format!("to {}", to.format("%Y-%m-%d"))); }
    let arrow = if order == SortOrder::Desc { "desc" } else { "asc" };
    let filters = if parts.is_empty() { "no filters".to_string() } else { parts.join(", ") };
    format!("{filters}  |  sorted by {} {arrow}", key.label().to_lowercase())
}

fn draw_form(f: &mut Frame, form: &Form, help: &str) {
    let height = form.fields.len() as u16 + 6;
    let area = centered(f.size(), 64, height);
    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let cursor = if focused { "_" } else { "" };
            let style = if focused { Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD) } else { Style::default() };
            Line::from(vec![Span::styled(format!("{:>22}: ", field.label), style), Span::raw(format!("{}{cursor}", field.display()))])
        })
        .collect();
    lines.push(Line::raw(""));
    match &form.error {
        Some(err) => lines.push(Line::styled(err.clone(), notice_style(true))),
        None => lines.push(Line::raw("")),
    }
    lines.push(Line::styled(help.to_string(), Style::default().fg(Color::DarkGray)));

    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(form.title);
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn notice_style(is_error: bool) -> Style {
    Style::default().fg(if is_error { Color::Red } else { Color::Green })
}

fn inner(area: Rect) -> Rect {
    Rect { x: area.x + 2, y: area.y + 2, width: area.width.saturating_sub(4), height: area.height.saturating_sub(3).min(1) }
}

/// A `width` x `height` box in the middle of `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect { x: area.x + (area.width - width) / 2, y: area.y + (area.height - height) / 2, width, height }
}
