use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use dashgrid::config::DashboardConfig;
use dashgrid::constraint::ContainerBounds;
use dashgrid::dashboard::Dashboard;
use dashgrid::drivers::OutputDriver;
use dashgrid::drivers::scripted::BufferOutputDriver;
use dashgrid::geometry::{GridRect, RawPosition};
use dashgrid::host::{DashboardApp, TerminalGrid};
use dashgrid::library::DragLibrary;
use dashgrid::seed::default_widgets;
use dashgrid::session::EditMode;
use dashgrid::store::WidgetStateStore;
use dashgrid::widget::WidgetId;

fn app() -> DashboardApp {
    let store = WidgetStateStore::in_memory(default_widgets());
    let dashboard = Dashboard::new(TerminalGrid::new(), store, DashboardConfig::default());
    let mut app = DashboardApp::new(dashboard, None);
    app.init().unwrap();
    app.handle_event(&Event::Resize(120, 40));
    app
}

fn editing_app() -> DashboardApp {
    let mut app = app();
    app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)));
    for _ in 0..5 {
        app.dashboard_mut().advance(Duration::from_millis(100));
    }
    assert_eq!(app.dashboard().mode(), EditMode::Edit);
    assert!(app.dashboard().transition().is_none());
    app
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn stored(app: &DashboardApp, id: &str) -> GridRect {
    app.dashboard().store().widget(&WidgetId::new(id)).unwrap().rect
}

#[test]
fn narrow_terminal_switches_to_the_list_view() {
    let mut app = app();
    assert!(!app.is_compact());

    app.handle_event(&Event::Resize(80, 30));
    assert!(app.is_compact());
    let mut output = BufferOutputDriver::new(80, 30).unwrap();
    output.draw(|mut frame| app.draw(&mut frame)).unwrap();
    assert!(output.contains("Screen too narrow for the grid"));
    assert!(output.contains("> Registered Customers [shown]"));

    app.handle_event(&Event::Resize(120, 40));
    assert!(!app.is_compact());
    let viewport = app.dashboard().grid().viewport();
    assert_eq!((viewport.area.width, viewport.area.height), (120, 38));
}

#[test]
fn header_drag_moves_a_card() {
    let mut app = editing_app();
    let id = WidgetId::new("widget-4");
    // 120 wide: 20 cells per column, 2 rows per grid row, grid starts at row 1
    let screen = app.dashboard().grid().screen_rect(&id).unwrap();
    assert_eq!((screen.x, screen.y, screen.width, screen.height), (0, 13, 60, 6));

    app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 13));
    assert_eq!(app.dashboard().grid().active_gesture(), Some(&id));
    assert!(app.dashboard().store().is_dragging());
    app.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 10, 23));
    app.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 10, 33));
    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 10, 33));

    assert_eq!(stored(&app, "widget-4"), GridRect::new(0, 16, 3, 3));
    assert_eq!(app.selected_widget().map(|w| w.id.clone()), Some(id));
    app.dashboard_mut().advance(Duration::from_millis(60));
    assert!(!app.dashboard().store().is_dragging());
}

#[test]
fn dragging_past_the_bottom_is_pulled_back() {
    let mut app = editing_app();
    app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 13));
    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 10, 213));

    let expected = GridRect::new(0, 37, 3, 3);
    assert_eq!(stored(&app, "widget-4"), expected);
    assert_eq!(
        app.dashboard().grid().node(&WidgetId::new("widget-4")),
        Some(RawPosition::from(expected))
    );
    assert!(app.dashboard().sync_stats().corrections >= 1);
}

#[test]
fn corner_drag_resizes_within_the_container() {
    let mut app = editing_app();
    // widget-5 sits at (3,6,3,3): bottom-right cell is (119, 18)
    app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 119, 18));
    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 119, 22));
    assert_eq!(stored(&app, "widget-5"), GridRect::new(3, 6, 3, 5));
}

#[test]
fn view_mode_ignores_drags() {
    let mut app = app();
    app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 13));
    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 10, 33));
    assert_eq!(stored(&app, "widget-4"), GridRect::new(0, 6, 3, 3));
    // the click still selects
    assert_eq!(app.state().selected(), 3);
}

#[test]
fn smaller_container_reclamps_visible_cards() {
    let mut app = app();
    app.dashboard_mut()
        .measure_container(ContainerBounds::new(4, 40));
    assert_eq!(stored(&app, "widget-1"), GridRect::new(0, 0, 4, 4));
    assert_eq!(stored(&app, "widget-3"), GridRect::new(1, 4, 3, 2));

    app.dashboard_mut().advance(Duration::ZERO);
    assert_eq!(
        app.dashboard().grid().node(&WidgetId::new("widget-3")),
        Some(RawPosition::from(GridRect::new(1, 4, 3, 2)))
    );
}

#[test]
fn hiding_a_card_mid_drag_releases_the_gate() {
    let mut app = editing_app();
    let id = WidgetId::new("widget-4");
    let space = Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));

    app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 13));
    assert!(app.dashboard().store().is_dragging());
    app.handle_event(&space);
    assert!(!app.dashboard().store().widget(&id).unwrap().visible);
    assert!(!app.dashboard().store().is_dragging());
    assert_eq!(app.dashboard().grid().active_gesture(), None);

    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 10, 33));
    app.dashboard_mut().advance(Duration::from_millis(100));
    assert!(!app.dashboard().store().is_dragging());

    app.handle_event(&space);
    app.dashboard_mut().advance(Duration::from_millis(100));
    app.dashboard_mut().advance(Duration::from_millis(100));
    assert!(!app.dashboard().store().has_pending_pushes());
    assert_eq!(stored(&app, "widget-4"), GridRect::new(0, 6, 3, 3));
    assert_eq!(
        app.dashboard().grid().node(&id),
        Some(RawPosition::from(GridRect::new(0, 6, 3, 3)))
    );
}
