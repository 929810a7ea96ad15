//! Terminal UI rendering for the mapnote host.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use mapnote_core::UNNAMED;

use crate::app::{App, Mode};

// Catppuccin Mocha colors
const SURFACE0: Color = Color::Rgb(49, 50, 68);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const TEXT: Color = Color::Rgb(205, 214, 244);
const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
const GREEN: Color = Color::Rgb(166, 227, 161);
const BLUE: Color = Color::Rgb(137, 180, 250);
const MAUVE: Color = Color::Rgb(203, 166, 247);

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_main_area(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if app.mode == Mode::Help {
        draw_help(frame);
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.panel.len();
    let current = if count > 0 { app.selected + 1 } else { 0 };

    let title_bar = Paragraph::new(format!(" mapnote - map drawings [{}/{}]", current, count))
        .style(Style::default().fg(TEXT).bg(SURFACE0));

    frame.render_widget(title_bar, area);
}

fn draw_main_area(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Shape list
            Constraint::Length(36), // Detail pane
        ])
        .split(area);

    draw_shape_list(frame, app, chunks[0]);
    draw_detail(frame, app, chunks[1]);
}

fn draw_shape_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title(format!("Shapes ({})", app.panel.len()));

    if app.panel.is_empty() {
        let empty = Paragraph::new("No shapes yet. Press 'p' to draw one.")
            .style(Style::default().fg(SUBTEXT0))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .panel
        .iter()
        .enumerate()
        .map(|(i, editor)| {
            let selected = i == app.selected;
            let marker = if selected { ">" } else { " " };

            let name_line = if let Some(draft) = editor.draft() {
                Line::from(vec![
                    Span::styled(format!("{} ", marker), Style::default().fg(TEXT)),
                    Span::styled(format!("{}_", draft), Style::default().fg(GREEN)),
                ])
            } else {
                let (name, name_style) = match editor.committed() {
                    Some(name) => (name, Style::default().fg(TEXT)),
                    None => (UNNAMED, Style::default().fg(SUBTEXT0).add_modifier(Modifier::DIM)),
                };
                Line::from(vec![
                    Span::styled(format!("{} ", marker), Style::default().fg(TEXT)),
                    Span::styled(name.to_string(), name_style),
                ])
            };

            let id_line = Line::from(Span::styled(
                format!("   Shape {}", editor.id().short()),
                Style::default().fg(SUBTEXT0),
            ));

            let style = if selected {
                Style::default().bg(SURFACE1)
            } else {
                Style::default()
            };

            ListItem::new(vec![name_line, id_line]).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUBTEXT0))
        .title("Detail");

    let set = app.published();
    let annotation = app
        .panel
        .get(app.selected)
        .and_then(|editor| set.get(editor.id()));

    let lines: Vec<Line> = match annotation {
        Some(ann) => vec![
            Line::from(vec![
                Span::styled("Name: ", Style::default().fg(SUBTEXT0)),
                Span::styled(ann.display_name().to_string(), Style::default().fg(TEXT)),
            ]),
            Line::from(vec![
                Span::styled("Id:   ", Style::default().fg(SUBTEXT0)),
                Span::styled(ann.id.to_string(), Style::default().fg(TEXT)),
            ]),
            Line::from(vec![
                Span::styled("Vertices: ", Style::default().fg(SUBTEXT0)),
                Span::styled(vertex_count(&ann.geometry).to_string(), Style::default().fg(TEXT)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("Synced {}", set.synced_at.format("%H:%M:%S")),
                Style::default().fg(SUBTEXT0),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "Nothing selected",
            Style::default().fg(SUBTEXT0),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_str = match app.mode {
        Mode::Browse => "BROWSE",
        Mode::EditName => "RENAME",
        Mode::Help => "HELP",
    };

    let status = app.status_message.as_deref().unwrap_or("");
    let help_hint = match app.mode {
        Mode::EditName => "type a name | Enter commit | Esc cancel",
        _ => "j/k select | p draw | e rename | d delete | w export | ? help",
    };

    let status_text = format!(
        " {} | {}",
        mode_str,
        if status.is_empty() { help_hint } else { status },
    );

    let status_bar = Paragraph::new(status_text).style(Style::default().fg(SUBTEXT0).bg(SURFACE0));

    frame.render_widget(status_bar, area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(52, 16, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title("Help (press any key to close)");

    let help_text = vec![
        Line::from(Span::styled(
            "Surface",
            Style::default().fg(MAUVE).add_modifier(Modifier::BOLD),
        )),
        Line::from("  p        Draw a new polygon"),
        Line::from("  m        Reshape the selected polygon"),
        Line::from("  x        Trash via the surface control"),
        Line::from(""),
        Line::from(Span::styled(
            "Annotations",
            Style::default().fg(MAUVE).add_modifier(Modifier::BOLD),
        )),
        Line::from("  j/k      Select next/previous"),
        Line::from("  e/Enter  Rename the selected shape"),
        Line::from("  d        Delete the selected shape"),
        Line::from(""),
        Line::from(Span::styled(
            "File",
            Style::default().fg(MAUVE).add_modifier(Modifier::BOLD),
        )),
        Line::from("  w        Export drawings as GeoJSON"),
        Line::from("  q        Quit"),
    ];

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

fn vertex_count(geometry: &serde_json::Value) -> usize {
    geometry
        .get("coordinates")
        .and_then(|rings| rings.get(0))
        .and_then(|ring| ring.as_array())
        .map(|ring| ring.len().saturating_sub(1))
        .unwrap_or(0)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
