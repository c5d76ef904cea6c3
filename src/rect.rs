use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

/// Rectangle position used for chaining constructors.
pub struct RectPosition {
    pub x: f64,
    pub y: f64,
}

impl RectPosition {
    /// Makes a rectangle with the given size.
    pub fn with_size(&self, width: f64, height: f64) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width,
            height,
        }
    }
}

impl Rect {
    /// Starts a rectangle with the given position.
    pub fn at(x: f64, y: f64) -> RectPosition {
        RectPosition { x, y }
    }

    /// Right end of the rectangle.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom end of the rectangle.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn end(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Scales the rectangle.
    pub fn scale(&self, x_scale: f64, y_scale: f64) -> Rect {
        Rect {
            x: self.x * x_scale,
            y: self.y * y_scale,
            width: self.width * x_scale,
            height: self.height * y_scale,
        }
    }

    /// Whether the point lies inside the rectangle, borders included.
    ///
    /// # Arguments
    ///
    /// * `point` - Point to test.
    /// * `tolerance` - Slack allowed on every side, to absorb floating-point error.
    pub fn contains(&self, point: &Point, tolerance: f64) -> bool {
        point.x >= self.x - tolerance
            && point.x <= self.right() + tolerance
            && point.y >= self.y - tolerance
            && point.y <= self.bottom() + tolerance
    }

    /// Gets the rectangle as a tuple of (x, y, width, height).
    pub fn to_xywh(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{x: {}, y: {}, width: {}, height: {}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scales the point.
    pub fn scale(&self, x_scale: f64, y_scale: f64) -> Point {
        Point {
            x: self.x * x_scale,
            y: self.y * y_scale,
        }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{x: {}, y: {}}}", self.x, self.y)
    }
}

/// Ordered sequence of points outlining a facial feature.
pub type Polyline = Vec<Point>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_applies_per_axis() {
        let rect = Rect::at(10.0, 20.0).with_size(30.0, 40.0).scale(2.0, 0.5);
        assert_eq!(rect.to_xywh(), (20.0, 10.0, 60.0, 20.0));
        assert_eq!(rect.end(), Point::new(80.0, 30.0));
    }

    #[test]
    fn contains_includes_borders() {
        let rect = Rect::at(0.0, 0.0).with_size(10.0, 10.0);
        assert!(rect.contains(&Point::new(10.0, 0.0), 0.0));
        assert!(!rect.contains(&Point::new(10.5, 5.0), 0.0));
        assert!(rect.contains(&Point::new(10.0 + 1e-9, 5.0), 1e-6));
    }

    #[test]
    fn display_matches_record_shape() {
        let rect = Rect::at(1.0, 2.0).with_size(3.0, 4.0);
        assert_eq!(rect.to_string(), "{x: 1, y: 2, width: 3, height: 4}");
    }
}
