//! UiFrame: a thin wrapper around `ratatui::Frame` that clips every draw call
//! to the visible area.
//!
//! Widget cards are positioned from grid coordinates, and while a gesture is
//! in flight (or the grid is scrolled) those rectangles can hang off the edge
//! of the terminal. Writing out of bounds into a `Buffer` panics, so all
//! dashboard drawing goes through this type instead of the raw frame.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Build a frame over an arbitrary buffer, for offscreen rendering and
    /// tests.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Write one line of text, truncated at the frame edge.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let area = self.area;
        safe_set_string(self.buffer, area, x, y, text, style);
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    #[test]
    fn truncate_to_width_short_and_long() {
        assert_eq!(truncate_to_width("widget-1", 12), "widget-1");
        assert_eq!(truncate_to_width("Customers", 4), "Cust");
    }

    #[test]
    fn set_string_stops_at_frame_edge() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 6,
            height: 1,
        };
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        ui.set_string(2, 0, "visible", Style::default());
        // out of bounds writes are dropped
        ui.set_string(20, 0, "x", Style::default());
        assert_eq!(buf.cell((2, 0)).unwrap().symbol(), "v");
        assert_eq!(buf.cell((5, 0)).unwrap().symbol(), "s");
    }

    #[test]
    fn card_hanging_off_the_edge_is_clipped() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 5,
            height: 3,
        };
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);

        struct Fill;
        impl Widget for Fill {
            fn render(self, area: Rect, buf: &mut Buffer) {
                for y in area.y..area.y.saturating_add(area.height) {
                    for x in area.x..area.x.saturating_add(area.width) {
                        if let Some(cell) = buf.cell_mut((x, y)) {
                            cell.set_symbol("#");
                        }
                    }
                }
            }
        }

        ui.render_widget(
            Fill,
            Rect {
                x: 3,
                y: 1,
                width: 5,
                height: 4,
            },
        );
        assert_eq!(buf.cell((3, 1)).unwrap().symbol(), "#");
        assert_eq!(buf.cell((4, 2)).unwrap().symbol(), "#");
        assert_eq!(buf.cell((2, 1)).unwrap().symbol(), " ");
    }
}
