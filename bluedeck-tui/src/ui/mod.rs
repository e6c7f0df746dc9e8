/*!
 * BLUEDECK TUI Interface
 * Device list, action bar and modal notifications
 */

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{Action, App, Notification, NotificationKind, Phase};

// Conservative color palette
const BLUE: Color = Color::Rgb(100, 149, 237);
const GRAY: Color = Color::Rgb(128, 128, 128);
const WHITE: Color = Color::Rgb(255, 255, 255);
const GREEN: Color = Color::Rgb(34, 139, 34);
const RED: Color = Color::Rgb(220, 20, 60);
const AMBER: Color = Color::Rgb(255, 191, 0);

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Device list
            Constraint::Length(3), // Action bar
            Constraint::Length(1), // Status line
        ])
        .split(f.area());

    render_device_list(f, chunks[0], app);
    render_action_bar(f, chunks[1], app);
    render_status_line(f, chunks[2], app);

    if let Some(notification) = app.notification() {
        render_notification(f, f.area(), notification);
    }
}

fn render_device_list(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.is_busy() {
        Style::default().fg(GRAY)
    } else {
        Style::default().fg(BLUE)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Bluetooth Devices")
        .title_alignment(Alignment::Center)
        .border_style(border_style);

    if app.devices.is_empty() {
        let placeholder = Paragraph::new("No devices")
            .style(Style::default().fg(GRAY))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .devices
        .iter()
        .enumerate()
        .map(|(i, device)| {
            let selected = app.selected == Some(i);
            let prefix = if selected { "▶ " } else { "  " };
            let content = Line::from(vec![
                Span::raw(prefix),
                Span::styled(device.as_str(), Style::default().fg(WHITE)),
            ]);
            if selected {
                ListItem::new(content).style(Style::default().bg(BLUE).fg(WHITE))
            } else {
                ListItem::new(content)
            }
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_action_bar(f: &mut Frame, area: Rect, app: &App) {
    let enabled = !app.is_busy();
    let key_style = if enabled {
        Style::default().fg(BLUE).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(GRAY)
    };
    let label_style = if enabled {
        Style::default().fg(WHITE)
    } else {
        Style::default().fg(GRAY)
    };

    let mut spans = Vec::new();
    for (key, action) in [
        ("c", Action::Connect),
        ("d", Action::Disconnect),
        ("x", Action::Remove),
    ] {
        spans.push(Span::styled(format!("[{}] ", key), key_style));
        spans.push(Span::styled(action.label(), label_style));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled("[r] ", key_style));
    spans.push(Span::styled("Refresh", label_style));
    spans.push(Span::raw("   "));
    spans.push(Span::styled("[q] Quit", Style::default().fg(GRAY)));

    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(GRAY)))
        .alignment(Alignment::Center);

    f.render_widget(bar, area);
}

fn render_status_line(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.phase() {
        Phase::AwaitingTool(action) => {
            let what = action.map(Action::label).unwrap_or("Listing devices");
            Line::from(vec![
                Span::styled("◐ ", Style::default().fg(AMBER)),
                Span::styled(
                    format!("{} via {}...", what, app.tool),
                    Style::default().fg(AMBER),
                ),
            ])
        }
        Phase::Idle => Line::from(vec![Span::styled(
            format!("{} device(s) · {}", app.devices.len(), app.tool),
            Style::default().fg(GRAY),
        )]),
    };

    f.render_widget(Paragraph::new(line), area);
}

fn render_notification(f: &mut Frame, area: Rect, notification: &Notification) {
    let (title, color) = match notification.kind {
        NotificationKind::Validation => ("Error", AMBER),
        NotificationKind::OperationError => ("Error", RED),
        NotificationKind::OperationSuccess => ("Success", GREEN),
    };

    let popup = centered_rect(60, 9, area);
    let content = vec![
        Line::from(Span::styled(
            notification.raised_at.format("%H:%M:%S").to_string(),
            Style::default().fg(GRAY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            notification.message.as_str(),
            Style::default().fg(WHITE),
        )),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(GRAY))),
    ];

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(area.height)),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
