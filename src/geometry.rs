//! Grid rectangles and the validation applied to untrusted positions.
//!
//! Positions reach the engine from two untrusted places: the drag library's
//! node payloads and the string attributes written on rendered elements.
//! Both are funneled through [`RawPosition`] and sanitized into a
//! [`GridRect`] before they touch the store.

use serde::{Deserialize, Serialize};

/// A widget position in grid cells.
///
/// `w` and `h` are at least 1 for every rectangle produced by this crate;
/// the struct itself does not enforce it so persisted data can be inspected
/// as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl GridRect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge. Widened so `x + w` never overflows.
    pub fn right(&self) -> u32 {
        self.x as u32 + self.w as u32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y as u32 + self.h as u32
    }

    pub fn intersects(&self, other: &GridRect) -> bool {
        if self.w == 0 || self.h == 0 || other.w == 0 || other.h == 0 {
            return false;
        }
        (self.x as u32) < other.right()
            && self.right() > other.x as u32
            && (self.y as u32) < other.bottom()
            && self.bottom() > other.y as u32
    }

    pub fn with_origin(self, x: u16, y: u16) -> Self {
        Self { x, y, ..self }
    }
}

impl std::fmt::Display for GridRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{},{})", self.x, self.y, self.w, self.h)
    }
}

/// A position as reported by an untrusted source. `None` means the value
/// was missing or unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPosition {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
}

impl RawPosition {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w: Some(w),
            h: Some(h),
        }
    }

    pub fn from_attrs(attrs: &ElementAttrs) -> Self {
        Self {
            x: attrs.x.as_deref().and_then(parse_int_attr),
            y: attrs.y.as_deref().and_then(parse_int_attr),
            w: attrs.w.as_deref().and_then(parse_int_attr),
            h: attrs.h.as_deref().and_then(parse_int_attr),
        }
    }

    pub fn is_valid(&self) -> bool {
        match (self.x, self.y, self.w, self.h) {
            (Some(x), Some(y), Some(w), Some(h)) => is_valid_position(x, y, w, h),
            _ => false,
        }
    }

    pub fn sanitize(&self) -> GridRect {
        sanitize_position(
            self.x.unwrap_or(f64::NAN),
            self.y.unwrap_or(f64::NAN),
            self.w.unwrap_or(f64::NAN),
            self.h.unwrap_or(f64::NAN),
        )
    }
}

impl From<GridRect> for RawPosition {
    fn from(rect: GridRect) -> Self {
        Self::new(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64)
    }
}

/// The four position attributes carried by a rendered widget element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementAttrs {
    pub x: Option<String>,
    pub y: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
}

impl ElementAttrs {
    pub fn from_rect(rect: GridRect) -> Self {
        Self {
            x: Some(rect.x.to_string()),
            y: Some(rect.y.to_string()),
            w: Some(rect.w.to_string()),
            h: Some(rect.h.to_string()),
        }
    }
}

/// True when every component is a finite, non-negative number and the size
/// is strictly positive.
pub fn is_valid_position(x: f64, y: f64, w: f64, h: f64) -> bool {
    [x, y, w, h].iter().all(|v| v.is_finite()) && x >= 0.0 && y >= 0.0 && w > 0.0 && h > 0.0
}

/// Coerce any numeric input into a structurally valid rectangle.
///
/// Origins default to 0 and sizes to 1 when missing or NaN; everything is
/// floored and saturated into the `u16` range. Container bounds are not
/// applied here.
pub fn sanitize_position(x: f64, y: f64, w: f64, h: f64) -> GridRect {
    GridRect {
        x: sanitize_component(x, 0),
        y: sanitize_component(y, 0),
        w: sanitize_component(w, 1),
        h: sanitize_component(h, 1),
    }
}

fn sanitize_component(value: f64, floor: u16) -> u16 {
    if value.is_nan() {
        return floor;
    }
    let floored = value.floor();
    // a zero size is as unusable as a missing one
    if floored == 0.0 && floor > 0 {
        return floor;
    }
    floored.clamp(floor as f64, u16::MAX as f64) as u16
}

/// Parse an integer attribute the way a lenient DOM integer parser does:
/// leading whitespace, an optional sign, then digits. Trailing garbage is
/// ignored; no digits at all means the value is missing.
pub fn parse_int_attr(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_position_rejects_nan_negative_and_zero_size() {
        assert!(is_valid_position(0.0, 0.0, 1.0, 1.0));
        assert!(!is_valid_position(f64::NAN, 0.0, 1.0, 1.0));
        assert!(!is_valid_position(-1.0, 0.0, 1.0, 1.0));
        assert!(!is_valid_position(0.0, 0.0, 0.0, 1.0));
        assert!(!is_valid_position(0.0, 0.0, 1.0, f64::INFINITY));
    }

    #[test]
    fn sanitize_defaults_and_floors() {
        assert_eq!(
            sanitize_position(f64::NAN, -4.0, f64::NAN, 0.0),
            GridRect::new(0, 0, 1, 1)
        );
        assert_eq!(
            sanitize_position(2.9, 3.1, 2.5, 4.99),
            GridRect::new(2, 3, 2, 4)
        );
        assert_eq!(
            sanitize_position(1e12, f64::INFINITY, -7.0, f64::NEG_INFINITY),
            GridRect::new(u16::MAX, u16::MAX, 1, 1)
        );
    }

    #[test]
    fn parse_int_attr_is_lenient() {
        assert_eq!(parse_int_attr("12"), Some(12.0));
        assert_eq!(parse_int_attr("  7px"), Some(7.0));
        assert_eq!(parse_int_attr("-3"), Some(-3.0));
        assert_eq!(parse_int_attr("4.8"), Some(4.0));
        assert_eq!(parse_int_attr(""), None);
        assert_eq!(parse_int_attr("abc"), None);
        assert_eq!(parse_int_attr("-"), None);
    }

    #[test]
    fn raw_from_attrs_falls_back_per_component() {
        let attrs = ElementAttrs {
            x: Some("2".into()),
            y: None,
            w: Some("oops".into()),
            h: Some("3".into()),
        };
        let raw = RawPosition::from_attrs(&attrs);
        assert!(!raw.is_valid());
        assert_eq!(raw.sanitize(), GridRect::new(2, 0, 1, 3));
    }

    #[test]
    fn rect_intersection() {
        let a = GridRect::new(0, 0, 3, 2);
        assert!(a.intersects(&GridRect::new(2, 1, 2, 2)));
        assert!(!a.intersects(&GridRect::new(3, 0, 1, 1)));
        assert!(!a.intersects(&GridRect::new(0, 2, 6, 1)));
    }
}
