use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use sylladex_core::{MODUS_PREFIX, SYLL_PREFIX};

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(root[1]);

    draw_inventory(frame, middle[0], app);
    draw_hand(frame, middle[1], app);
    draw_output(frame, root[2], app);
    draw_input(frame, root[3], app);

    if app.show_help {
        draw_help_popup(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let (in_use, slots) = app.deck_summary();
    let summary = format!(
        "Modus: {} | State: {:?} | Deck: {in_use}/{slots} | Hand: {}",
        app.active_modus(),
        app.session.container.state(),
        app.loose_items().len()
    );
    let lines = vec![
        Line::from(summary.bold()),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let block = Block::default().borders(Borders::ALL).title("Sylladex");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_inventory(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = app.inventory() else {
        let block = pane_block("Inventory", false);
        frame.render_widget(Paragraph::new("no modus drawn").block(block), area);
        return;
    };
    let columns = view.groups.len().max(1);
    let constraints = vec![Constraint::Ratio(1, columns as u32); columns];
    let outer = pane_block(&view.title, false);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);
    for (group, cell) in view.groups.iter().zip(cells.iter()) {
        let items: Vec<ListItem<'_>> = group
            .cards
            .iter()
            .enumerate()
            .map(|(idx, card)| {
                let style = if card.in_use() {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:>2} ", idx + 1)),
                    Span::styled(card.to_string(), style),
                ]))
            })
            .collect();
        frame.render_widget(
            List::new(items).block(pane_block(&group.label, false)),
            *cell,
        );
    }
}

fn draw_hand(frame: &mut Frame, area: Rect, app: &App) {
    let loose = app.loose_items();
    let items: Vec<ListItem<'_>> = if loose.is_empty() {
        vec![ListItem::new("empty")]
    } else {
        loose.into_iter().map(ListItem::new).collect()
    };
    frame.render_widget(List::new(items).block(pane_block("Loose items", false)), area);
}

fn draw_output(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let end = app.output.len().saturating_sub(app.scroll);
    let start = end.saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .output
        .iter()
        .skip(start)
        .take(end - start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let title = if app.scroll > 0 {
        format!("Output (+{})", app.scroll)
    } else {
        "Output".to_string()
    };
    frame.render_widget(Paragraph::new(lines).block(pane_block(&title, false)), area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.awaiting_reply() {
        "Reply"
    } else {
        "Command"
    };
    let line = Line::from(vec![Span::raw("> "), Span::raw(app.input.as_str())]);
    frame.render_widget(Paragraph::new(line).block(pane_block(title, true)), area);
    let cursor_x = area.x + 3 + app.input.chars().count() as u16;
    frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
}

fn draw_help_popup(frame: &mut Frame) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(format!("{SYLL_PREFIX}<command> talks to the sylladex, e.g. {SYLL_PREFIX}selectModus PentaFile")),
        Line::from(format!("{MODUS_PREFIX}<command> talks to the selected modus, e.g. {MODUS_PREFIX}capture lamp")),
        Line::from("When the modus asks a question, the next line is its answer."),
        Line::from(""),
        Line::from("enter submit | tab complete | up/down history"),
        Line::from("pgup/pgdn scroll output | ctrl+u clear line"),
        Line::from("F1 help | esc/ctrl+c quit"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
