use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs,
        Wrap,
        canvas::{Canvas, Map, MapResolution},
    },
};

use ecotrack_core::{
    model::{ChatRole, PointStatus},
    ports::MarkerStyle,
};
use ecotrack_provider_osm::OSM_ATTRIBUTION;

use crate::app::{App, InputMode, Screen, inner_area, viewport_for};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: tabs, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let titles = Screen::ALL
        .iter()
        .enumerate()
        .map(|(idx, screen)| format!("{} {}", idx + 1, screen.title()));
    let selected_tab = Screen::ALL
        .iter()
        .position(|screen| *screen == app.screen)
        .unwrap_or_default();
    let header = Tabs::new(titles)
        .select(selected_tab)
        .block(Block::default().borders(Borders::ALL).title("EcoTrack"))
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::Points => draw_points(frame, app, *content_area),
        Screen::Jobs => draw_jobs(frame, app, *content_area),
        Screen::Assistants => draw_assistants(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match (app.screen, app.mode) {
        (Screen::Points, InputMode::Normal) => {
            "↑/↓ move · Enter select · w type · s status · / search · r reset · d directions · y share · click map · Tab next · q quit"
        }
        (Screen::Jobs, InputMode::Normal) => {
            "↑/↓ move · Enter/a apply · t type · l location · / search · r reset · Tab next · q quit"
        }
        (Screen::Assistants, InputMode::Normal) => {
            "↑/↓ switch assistant · Enter/i type a message · Tab next · q quit"
        }
        (Screen::Assistants, InputMode::Editing) => {
            "Type · Enter send · Esc stop typing · Ctrl-C quit"
        }
        (_, InputMode::Editing) => "Type to search · Enter/Esc done · Ctrl-C quit",
    };

    let generating = app
        .conversations
        .iter()
        .any(|conversation| conversation.session.is_generating());

    let status_text = if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(msg) = &app.status_message {
        format!("{msg} · {nav_hint}")
    } else if generating {
        format!("Generating… · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if generating {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_points(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let [list_column, map_column] = columns.as_ref() else {
        return;
    };

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(*list_column);
    let [filter_area, list_area] = left.as_ref() else {
        return;
    };

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(10)])
        .split(*map_column);
    let [map_area, details_area] = right.as_ref() else {
        return;
    };

    draw_point_filter(frame, app, *filter_area);
    draw_point_list(frame, app, *list_area);
    draw_map(frame, app, *map_area);
    draw_point_details(frame, app, *details_area);
}

fn draw_point_filter(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let filter = app.locator.browser().filter();
    let search = if app.mode == InputMode::Editing {
        format!("{}▏", app.point_search)
    } else {
        filter.search.clone()
    };
    let text = format!(
        "Type: {} · Status: {} · Search: {search}",
        filter.waste_type.label(),
        filter.status.label()
    );
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Filters"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_point_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let visible = app.locator.visible();
    let title = format!("Collection points ({})", visible.len());

    if visible.is_empty() {
        let paragraph = Paragraph::new(
            "No collection points match these filters. Press r to reset the filters.",
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = app.locator.browser().selected_id();
    let items = visible
        .iter()
        .map(|point| {
            let marker = if selected == Some(&point.id) { "★ " } else { "  " };
            ListItem::new(vec![
                Line::from(format!("{marker}{}", point.name)),
                Line::from(format!("   {} · {}", point.distance, point.status))
                    .style(Style::default().fg(status_color(point.status))),
            ])
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.point_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_map(frame: &mut Frame<'_>, app: &App, area: Rect) {
    app.map_area.set(area);

    let Some(surface) = app.locator.map().surface() else {
        let reason = app
            .locator
            .map()
            .failure()
            .map_or_else(|| "Loading map…".to_owned(), |failure| {
                format!("Map unavailable: {failure}\nThe list still works.")
            });
        let paragraph = Paragraph::new(reason)
            .block(Block::default().borders(Borders::ALL).title("Map"))
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let viewport = viewport_for(surface, inner_area(area));
    let markers = surface
        .layers()
        .map(|(_, spec)| {
            let (symbol, style) = match spec.style {
                MarkerStyle::Normal => ("●", Style::default().fg(Color::Green)),
                MarkerStyle::Highlighted => (
                    "◆",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                MarkerStyle::UserLocation => ("◎", Style::default().fg(Color::Cyan)),
            };
            (spec.coordinate, symbol, style)
        })
        .collect::<Vec<_>>();

    let title = format!("Map · zoom {} · {OSM_ATTRIBUTION}", surface.zoom());
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds([viewport.west, viewport.east])
        .y_bounds([viewport.south, viewport.north])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (coordinate, symbol, style) in &markers {
                ctx.print(coordinate.lng, coordinate.lat, Span::styled(*symbol, *style));
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_point_details(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");

    let Some(point) = app.locator.selected() else {
        let paragraph = Paragraph::new("Select a collection point from the list or the map.")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let accepted = point
        .waste_types
        .iter()
        .map(|waste_type| waste_type.label())
        .collect::<Vec<_>>()
        .join(", ");
    let directions = app
        .directions()
        .map_or_else(|| "unavailable".to_owned(), |url| url.to_string());

    let mut lines = vec![
        Line::from(point.name.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(point.address.clone()),
        Line::from(format!("Hours: {} · {}", point.operating_hours, point.distance)),
        Line::from(format!("Accepts: {accepted}")),
        Line::from(format!("{}: {}", point.status, point.status.instructions()))
            .style(Style::default().fg(status_color(point.status))),
        Line::from(format!("Directions: {directions}")),
    ];
    if !app.locator.browser().is_selected_visible() {
        lines.push(
            Line::from("Hidden by the current filters.")
                .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_jobs(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(7),
            Constraint::Length(6),
        ])
        .split(area);
    let [filter_area, table_area, details_area, applications_area] = rows.as_ref() else {
        return;
    };

    let query = app.jobs.query();
    let search = if app.mode == InputMode::Editing {
        format!("{}▏", app.job_search)
    } else {
        query.search.clone()
    };
    let filter_text = format!(
        "Type: {} · Location: {} · Search: {search}",
        query.employment_type.as_deref().unwrap_or("All Types"),
        query.location.as_deref().unwrap_or("All Locations"),
    );
    frame.render_widget(
        Paragraph::new(filter_text)
            .block(Block::default().borders(Borders::ALL).title("Filters"))
            .wrap(Wrap { trim: true }),
        *filter_area,
    );

    let visible = app.visible_jobs();
    let title = format!("Jobs ({})", visible.len());
    if visible.is_empty() {
        frame.render_widget(
            Paragraph::new("No jobs match these filters. Press r to reset the filters.")
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: true }),
            *table_area,
        );
    } else {
        let table_rows = visible.iter().map(|job| {
            let applied = if job.applied { "✓ applied" } else { "" };
            Row::new(vec![
                Cell::from(job.title.clone()),
                Cell::from(job.company.clone()),
                Cell::from(job.location.clone()),
                Cell::from(job.employment_type.clone()),
                Cell::from(job.salary.clone()),
                Cell::from(applied),
            ])
        });
        let widths = [
            Constraint::Min(20),
            Constraint::Length(22),
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(10),
        ];
        let table = Table::new(table_rows, widths)
            .header(
                Row::new(vec!["Title", "Company", "Location", "Type", "Salary", ""])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .column_spacing(1);
        let mut state = TableState::default();
        state.select(Some(app.job_index));
        frame.render_stateful_widget(table, *table_area, &mut state);
    }

    let details = app.job_under_cursor().map_or_else(
        || Text::from("No job selected."),
        |job| {
            Text::from(vec![
                Line::from(format!("{} · posted {}", job.title, job.posted))
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Line::from(job.description.clone()),
                Line::from(format!("Skills: {}", job.skills.join(", "))),
            ])
        },
    );
    frame.render_widget(
        Paragraph::new(details)
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true }),
        *details_area,
    );

    let applications = app
        .jobs
        .applications()
        .iter()
        .map(|application| {
            ListItem::new(format!(
                "{} · {} · {} · {}",
                application.applied_on.format("%Y-%m-%d"),
                application.job_title,
                application.company,
                application.status.label()
            ))
        })
        .collect::<Vec<ListItem<'_>>>();
    frame.render_widget(
        List::new(applications).block(
            Block::default()
                .borders(Borders::ALL)
                .title("My applications"),
        ),
        *applications_area,
    );
}

fn draw_assistants(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(area);
    let [picker_area, chat_area] = columns.as_ref() else {
        return;
    };

    let items = app
        .conversations
        .iter()
        .map(|conversation| {
            let busy = if conversation.session.is_generating() { " …" } else { "" };
            ListItem::new(format!("{}{busy}", conversation.title))
        })
        .collect::<Vec<ListItem<'_>>>();
    let picker = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Assistants"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    state.select(Some(app.conversation_index));
    frame.render_stateful_widget(picker, *picker_area, &mut state);

    let Some(conversation) = app.conversation() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(*chat_area);
    let [transcript_area, input_area] = rows.as_ref() else {
        return;
    };

    let mut lines = Vec::new();
    for message in conversation.session.messages() {
        let (speaker, color) = match message.role {
            ChatRole::User => ("You", Color::Cyan),
            ChatRole::Assistant => ("Assistant", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            format!("{speaker}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(message.content.lines().map(|line| Line::from(line.to_owned())));
        lines.push(Line::default());
    }
    if conversation.session.is_generating() {
        lines.push(
            Line::from("Assistant is typing…").style(Style::default().fg(Color::DarkGray)),
        );
    }

    // Keep the newest lines in view; wrapping is ignored for the estimate.
    let overflow = lines
        .len()
        .saturating_sub(usize::from(transcript_area.height.saturating_sub(2)));
    let scroll = u16::try_from(overflow).unwrap_or(u16::MAX);

    let transcript = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} · {}", conversation.title, conversation.description)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(transcript, *transcript_area);

    let (input_text, input_style) = if conversation.session.is_generating() {
        ("Waiting for the reply…".to_owned(), Style::default().fg(Color::DarkGray))
    } else if app.mode == InputMode::Editing {
        (format!("{}▏", app.chat_input), Style::default())
    } else {
        (app.chat_input.clone(), Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(
        Paragraph::new(input_text)
            .style(input_style)
            .block(Block::default().borders(Borders::ALL).title("Message")),
        *input_area,
    );
}

fn status_color(status: PointStatus) -> Color {
    match status {
        PointStatus::Operational => Color::Green,
        PointStatus::Maintenance => Color::Yellow,
        PointStatus::Closed => Color::Red,
    }
}
