//! Drawing for the terminal host. Everything here is read-only over the
//! app; positions come from the grid, content from the store.

use indoc::indoc;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::app::DashboardApp;
use crate::session::EditMode;
use crate::ui::UiFrame;
use crate::widget::{CustomerTier, MetricValue, Widget, WidgetData};

const LOG_PANEL_HEIGHT: u16 = 8;

const HELP_INTRO: &str = indoc! {"
    Drag a card by its title row to move it, or by its bottom-right
    corner to resize it. Dragging only works in edit mode; leaving edit
    mode saves the layout.
"};

/// Screen regions of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub grid: Rect,
    pub log: Option<Rect>,
    pub footer: Rect,
}

pub fn split_screen(area: Rect, log_visible: bool) -> ScreenLayout {
    let header = Rect { height: area.height.min(1), ..area };
    let footer = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.saturating_sub(1).min(1),
        ..area
    };
    let body_y = area.y + header.height;
    let body_height = area.height.saturating_sub(header.height + footer.height);
    let log_height = if log_visible {
        LOG_PANEL_HEIGHT.min(body_height / 2)
    } else {
        0
    };
    let grid = Rect {
        y: body_y,
        height: body_height - log_height,
        ..area
    };
    let log = (log_height > 0).then_some(Rect {
        y: body_y + grid.height,
        height: log_height,
        ..area
    });
    ScreenLayout {
        header,
        grid,
        log,
        footer,
    }
}

pub fn draw_dashboard(frame: &mut UiFrame<'_>, app: &DashboardApp) {
    let layout = split_screen(frame.area(), app.state().log_visible());
    draw_header(frame, app, layout.header);
    if app.is_compact() {
        draw_compact(frame, app, layout.grid);
    } else {
        draw_cards(frame, app);
    }
    if let Some(area) = layout.log {
        draw_log(frame, app, area);
    }
    draw_footer(frame, app, layout.footer);
    if app.state().help_visible() {
        draw_help(frame, app);
    }
}

fn draw_header(frame: &mut UiFrame<'_>, app: &DashboardApp, area: Rect) {
    let dashboard = app.dashboard();
    let store = dashboard.store();
    let mode = match dashboard.transition() {
        Some(transition) => format!("{}…", transition.target()),
        None => dashboard.mode().to_string(),
    };
    let user = app
        .user()
        .map(|user| format!("{} ({})", user.name, user.role))
        .unwrap_or_else(|| "guest".to_string());
    let text = format!(
        " dashgrid | {user} | {mode} | {}/{} widgets visible",
        store.visible_count(),
        store.len()
    );
    let style = match dashboard.mode() {
        EditMode::Edit => Style::default().fg(Color::Black).bg(Color::Yellow),
        EditMode::View => Style::default().add_modifier(Modifier::REVERSED),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn draw_footer(frame: &mut UiFrame<'_>, app: &DashboardApp, area: Rect) {
    let text = match app.state().status() {
        Some(status) => status.to_string(),
        None => {
            let selected = app
                .selected_widget()
                .map(|w| {
                    let hidden = if w.visible { "" } else { " (hidden)" };
                    format!("> {}{hidden}", w.title)
                })
                .unwrap_or_default();
            format!("{selected}   e edit | space hide/show | r restore | ? help | q quit")
        }
    };
    frame.render_widget(Paragraph::new(text), area);
}

fn draw_cards(frame: &mut UiFrame<'_>, app: &DashboardApp) {
    let dashboard = app.dashboard();
    let grid = dashboard.grid();
    let editing = dashboard.is_editing();
    let selected = app.selected_widget().map(|w| &w.id);
    for id in grid.order() {
        let (Some(widget), Some(area)) = (dashboard.store().widget(id), grid.screen_rect(id)) else {
            continue;
        };
        let moving = grid.active_gesture() == Some(id);
        let border = if moving {
            Style::default().fg(Color::Cyan)
        } else if selected == Some(id) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let title = if editing {
            format!(" :: {} ", widget.title)
        } else {
            format!(" {} ", widget.title)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        let page = dashboard.widget_page(id);
        let lines: Vec<Line> = widget_lines(widget, page, dashboard.config().items_per_page)
            .into_iter()
            .map(Line::from)
            .collect();
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn draw_compact(frame: &mut UiFrame<'_>, app: &DashboardApp, area: Rect) {
    let mut lines = vec![
        Line::from("Screen too narrow for the grid; widgets are listed instead."),
        Line::from(""),
    ];
    for (index, widget) in app.dashboard().widgets().iter().enumerate() {
        let marker = if index == app.state().selected() { ">" } else { " " };
        let state = if widget.visible { "shown" } else { "hidden" };
        lines.push(Line::from(format!(
            "{marker} {} [{state}] {}",
            widget.title,
            widget.kind.label()
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn draw_log(frame: &mut UiFrame<'_>, app: &DashboardApp, area: Rect) {
    let rows = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log_buffer()
        .map(|log| log.tail(rows))
        .unwrap_or_default()
        .into_iter()
        .map(Line::from)
        .collect();
    let block = Block::default().borders(Borders::ALL).title(" Log ");
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(frame: &mut UiFrame<'_>, app: &DashboardApp) {
    let mut lines: Vec<Line> = HELP_INTRO.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    for (action, keys) in app.bindings().help_entries() {
        lines.push(Line::from(format!("{:<14} {action}", keys.join(", "))));
    }
    let area = centered(frame.area(), 64, lines.len() as u16 + 2);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .title_alignment(Alignment::Center);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn tier_label(tier: CustomerTier) -> &'static str {
    match tier {
        CustomerTier::Vip => "VIP",
        CustomerTier::Premium => "Premium",
        CustomerTier::Basic => "Basic",
    }
}

fn paged<T>(rows: &[T], page: u32, per_page: usize) -> (&[T], u32) {
    let per_page = per_page.max(1);
    let pages = rows.len().div_ceil(per_page).max(1) as u32;
    let page = page.clamp(1, pages);
    let start = (page as usize - 1) * per_page;
    let end = (start + per_page).min(rows.len());
    (&rows[start.min(end)..end], pages)
}

/// Plain-text body of a widget card. Paged content shows `page` of it.
pub fn widget_lines(widget: &Widget, page: u32, per_page: usize) -> Vec<String> {
    let mut lines = Vec::new();
    match &widget.data {
        WidgetData::Table(table) => {
            let (rows, pages) = paged(&table.users, page, per_page);
            for user in rows {
                lines.push(format!("{:<20} {:<8} {}", user.name, tier_label(user.tier), user.email));
            }
            lines.push(format!("page {}/{pages}", page.clamp(1, pages)));
        }
        WidgetData::Stats(stats) => {
            lines.push(format!("Total users   {}", stats.total_users));
            lines.push(format!("Active        {}", stats.active_users));
            lines.push(format!("New today     {}", stats.new_users_today));
            lines.push(format!("Admins        {}", stats.admin_users));
        }
        WidgetData::Activity(activity) => {
            let (rows, pages) = paged(&activity.activities, page, per_page);
            for entry in rows {
                lines.push(format!("{}: {} ({})", entry.user, entry.action, entry.time));
            }
            if pages > 1 {
                lines.push(format!("page {}/{pages}", page.clamp(1, pages)));
            }
        }
        WidgetData::Growth(growth) => {
            for month in &growth.monthly {
                lines.push(format!("{:<4} {}", month.month, month.users));
            }
            lines.push(format!("growth {:+.1}%", growth.percentage));
        }
        WidgetData::Locations(locations) => {
            for location in &locations.locations {
                lines.push(format!(
                    "{:<14} {:>5} {:>5.1}%",
                    location.country, location.users, location.percentage
                ));
            }
        }
        WidgetData::Custom(custom) => {
            lines.extend(custom.title.clone());
            lines.extend(custom.message.clone());
            for item in custom.items.iter().flatten() {
                lines.push(format!("- {item}"));
            }
            for (name, value) in custom.metrics.iter().flatten() {
                match value {
                    MetricValue::Number(n) => lines.push(format!("{name}: {n}")),
                    MetricValue::Text(t) => lines.push(format!("{name}: {t}")),
                }
            }
            lines.extend(custom.footer.clone());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_widgets;

    #[test]
    fn screen_splits_around_the_grid() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 120,
            height: 40,
        };
        let layout = split_screen(area, false);
        assert_eq!(layout.header.height, 1);
        assert_eq!((layout.grid.y, layout.grid.height), (1, 38));
        assert_eq!(layout.footer.y, 39);
        assert!(layout.log.is_none());

        let with_log = split_screen(area, true);
        assert_eq!(with_log.grid.height, 30);
        assert_eq!(with_log.log.map(|r| (r.y, r.height)), Some((31, 8)));
    }

    #[test]
    fn tiny_screens_do_not_underflow() {
        let layout = split_screen(
            Rect {
                x: 0,
                y: 0,
                width: 10,
                height: 1,
            },
            true,
        );
        assert_eq!(layout.grid.height, 0);
        assert!(layout.log.is_none());
    }

    #[test]
    fn table_pages_through_customers() {
        let table = &default_widgets()[0];
        let first = widget_lines(table, 1, 5);
        assert_eq!(first.len(), 6);
        assert!(first[0].starts_with("Juan Pérez"));
        assert_eq!(first[5], "page 1/4");

        let last = widget_lines(table, 9, 5);
        assert_eq!(last[5], "page 4/4");
        assert!(last[4].starts_with("Isabella Cruz"));
    }

    #[test]
    fn stats_render_every_counter() {
        let stats = &default_widgets()[1];
        let lines = widget_lines(stats, 1, 5);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("1247"));
    }
}
