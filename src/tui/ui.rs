use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Cell, Clear, Paragraph, Row, Table};
use crate::output::{format_percent, truncate_title};
use crate::race::FormField;
use crate::scoring::betting_picks;
use crate::tui::app::{App, InputMode};

/// Horses shown in the win-probability chart
const CHART_RUNNERS: usize = 5;

/// Below this width the chart is dropped and the table gets the full row
const CHART_MIN_WIDTH: u16 = 90;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Summary(1) + Body(fill) + Picks(1) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Title bar
        Constraint::Length(1),  // Race summary
        Constraint::Fill(1),    // Rankings (+ chart)
        Constraint::Length(1),  // Betting picks
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_summary(frame, chunks[1], app);

    if chunks[2].width >= CHART_MIN_WIDTH && app.card.is_ready() {
        let body = Layout::horizontal([Constraint::Fill(1), Constraint::Length(36)])
            .split(chunks[2]);
        render_table(frame, body[0], app);
        render_chart(frame, body[1], app);
    } else {
        render_table(frame, chunks[2], app);
    }

    render_picks(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::AddEntry => render_entry_form(frame, app),
        InputMode::Breakdown => render_breakdown_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let mut spans = vec![Span::styled("Furlong", Style::default().fg(colors.title_color).bold())];

    // Race name and track on the right
    let setup = &app.card.setup;
    let race_text = match &setup.track {
        Some(track) => format!("{} @ {}", setup.display_name(), track),
        None => setup.display_name().to_string(),
    };
    let left_len = "Furlong".len();
    let right_len = race_text.chars().count();
    let padding_len = (area.width as usize).saturating_sub(left_len + right_len);

    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(race_text, Style::default().fg(colors.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_summary(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let setup = &app.card.setup;

    let mut parts = vec![format!("{} entered", app.card.len())];
    if let Some(size) = setup.field_size {
        parts.push(format!("field of {}", size));
    }
    if let Some(distance) = setup.distance_furlongs {
        parts.push(format!("{}f", distance));
    }
    if let Some(condition) = setup.track_condition {
        parts.push(condition.label().to_string());
    }
    if let Some(class) = setup.class {
        parts.push(class.label().to_string());
    }

    let text = parts.join("  |  ");
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(colors.muted)),
        area,
    );
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = app.colors.clone();

    if app.predictions.is_empty() {
        let empty_msg = Paragraph::new(vec![
            Line::from("No horses entered"),
            Line::from(Span::styled(
                "Press a to add a horse (at least 2 for predictions)",
                Style::default().fg(colors.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    // Calculate max score for bar scaling
    let max_score = app
        .predictions
        .iter()
        .map(|p| p.score)
        .fold(0.0_f64, f64::max);

    // A lone horse has a score but no meaningful win probability
    let ready = app.card.is_ready();

    let rows: Vec<Row> = app
        .predictions
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let index = format!("{}.", idx + 1);
            let bar_line = score_bar(&colors, p.score, max_score, 8);

            let score_color = colors.score_color(p.score, max_score);
            let mut score_spans = vec![
                Span::styled(format!("{:>6.2} ", p.score), Style::default().fg(score_color))
            ];
            score_spans.extend(bar_line.spans);

            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(index).style(Style::default().fg(colors.index_color)),
                Cell::from(truncate_title(&p.horse, 40)),
                Cell::from(if ready {
                    format!("{:>6}", format_percent(p.win_probability))
                } else {
                    format!("{:>6}", "-")
                }),
                Cell::from(Line::from(score_spans)),
                Cell::from(format!("{:>5.1}", p.sub_scores.speed)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),   // Rank: "12."
        Constraint::Fill(1),     // Horse
        Constraint::Length(7),   // Win %: "100.0%"
        Constraint::Length(16),  // Score + bar: " 92.40 ████████"
        Constraint::Length(6),   // Speed
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Horse", "Win %", "Score", "Speed"])
                .style(colors.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Horizontal bars for the five most likely winners
fn render_chart(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;

    let bars: Vec<Bar> = app
        .predictions
        .iter()
        .take(CHART_RUNNERS)
        .enumerate()
        .map(|(rank, p)| {
            let color = colors.medal_color(rank);
            Bar::default()
                .value((p.win_probability * 10.0).round() as u64)
                .label(Line::from(truncate_title(&p.horse, 12)))
                .text_value(format_percent(p.win_probability))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::bordered().title(" Win Probability "))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(1000)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn render_picks(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;

    let line = if !app.card.is_ready() {
        let needed = 2 - app.card.len().min(2);
        Line::from(Span::styled(
            format!("Add at least 2 horses for predictions ({} more)", needed),
            Style::default().fg(colors.score_mid),
        ))
    } else if let Some(picks) = betting_picks(&app.predictions) {
        let pick = |label: &'static str, name: &str, pct: f64, color: Color| {
            vec![
                Span::styled(label, Style::default().fg(colors.muted)),
                Span::styled(
                    format!("{} ({})", name, format_percent(pct)),
                    Style::default().fg(color),
                ),
                Span::raw("  "),
            ]
        };

        let mut spans = pick(
            "Favorite: ",
            &picks.favorite.horse,
            picks.favorite.win_probability,
            colors.medal_color(0),
        );
        spans.extend(pick(
            "Value: ",
            &picks.value_play.horse,
            picks.value_play.win_probability,
            colors.medal_color(1),
        ));
        spans.extend(pick(
            "Longshot: ",
            &picks.longshot.horse,
            picks.longshot.win_probability,
            colors.medal_color(4),
        ));
        Line::from(spans)
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;

    let text = if let Some((ref msg, _)) = app.flash_message {
        let is_error = ["Failed", "Nothing", "No ", "Add at least"]
            .iter()
            .any(|prefix| msg.starts_with(prefix));
        let msg_color = if is_error {
            colors.flash_error
        } else {
            colors.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints = [
            ("j", "/", "k", ":nav "),
            ("a", "", "", ":add "),
            ("d", "", "", ":remove "),
            ("C", "", "", ":clear "),
            ("z", "", "", ":undo "),
            ("b", "", "", ":breakdown "),
            ("e", "", "", ":export "),
            ("?", "", "", ":help "),
            ("q", "", "", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(format!("{} horses", app.card.len()), Style::default().fg(colors.muted)),
            Span::raw("  "),
        ];
        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key1, Style::default().fg(colors.status_key_color)));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(*key2, Style::default().fg(colors.status_key_color)));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area
    );
}

fn score_bar(
    colors: &crate::tui::ThemeColors,
    score: f64,
    max_score: f64,
    width: usize,
) -> Line<'static> {
    let ratio = if max_score > 0.0 {
        (score / max_score).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_color = colors.score_color(score, max_score);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(bar_color)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(colors.bar_empty)));
    }

    Line::from(spans)
}

/// Render the add-horse form popup
fn render_entry_form(frame: &mut Frame, app: &App) {
    let colors = &app.colors;
    let height = FormField::ALL.len() as u16 + 6;
    let popup_area = centered_rect_fixed(64, height, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Add Horse ", colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(FormField::ALL.len() as u16),  // Fields
        Constraint::Length(1),                            // Spacer
        Constraint::Length(1),                            // Error line
        Constraint::Length(1),                            // Help text
    ])
    .split(inner);

    let focused = app.focused();
    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let label = format!("{:>27}: ", field.label());
            let value = app.form.get(field);
            if field == focused {
                Line::from(vec![
                    Span::styled(label, Style::default().bold()),
                    Span::styled(format!("{}|", value), colors.field_focused),
                ])
            } else {
                Line::from(vec![
                    Span::styled(label, Style::default().fg(colors.muted)),
                    Span::raw(value.to_string()),
                ])
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some(error) = &app.form_error {
        frame.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(colors.flash_error)),
            chunks[2],
        );
    }

    let help = Paragraph::new("Tab/Up/Down: field | Left/Right: choice | Enter: add | Esc: cancel")
        .style(Style::default().fg(colors.muted));
    frame.render_widget(help, chunks[3]);
}

/// Render the per-factor score breakdown for the selected horse
fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let colors = &app.colors;
    let Some(prediction) = app.selected_prediction() else {
        return;
    };

    let height = prediction.factors.len() as u16 + 8;
    let popup_area = centered_rect_fixed(54, height, frame.area());
    frame.render_widget(Clear, popup_area);

    let title = format!(" {} ", truncate_title(&prediction.horse, 40));
    let block = Block::bordered()
        .title(Span::styled(title, colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<10}", "Factor"), colors.header_style),
            Span::styled(format!("{:>9}", "Raw"), colors.header_style),
            Span::styled(format!("{:>9}", "Weight"), colors.header_style),
            Span::styled(format!("{:>10}", "Points"), colors.header_style),
        ]),
    ];
    for factor in &prediction.factors {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<10}", factor.label)),
            Span::raw(format!("{:>9.3}", factor.raw)),
            Span::styled(format!("{:>9.2}", factor.weight), Style::default().fg(colors.muted)),
            Span::raw(format!("{:>10.2}", factor.points)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<28}", "Total"), Style::default().bold()),
        Span::styled(format!("{:>10.2}", prediction.score), Style::default().bold()),
    ]));
    lines.push(Line::from(format!(
        "Win probability {}",
        format_percent(prediction.win_probability)
    )));
    lines.push(Line::from(Span::styled(
        "j/k: next horse | Esc/b: close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    // Calculate centered position
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let colors = &app.colors;
    let popup_area = centered_rect_fixed(50, 16, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(" Keyboard Shortcuts ");
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(colors.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("a             ", "Add a horse"),
        ("d / Delete    ", "Remove selected horse"),
        ("C             ", "Clear all horses"),
        ("z             ", "Undo last change"),
        ("b             ", "Score breakdown"),
        ("e             ", "Export predictions to CSV"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(
        Span::styled("Press any key to close", Style::default().fg(colors.muted))
    ));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
