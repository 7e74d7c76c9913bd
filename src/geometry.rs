//! Plain geometry and color values shared by every layer of the presenter.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in container coordinates.
///
/// Width and height may be negative: the compatible top exit of a move
/// transition produces such a frame. Use [`Rect::standardized`] to compare
/// the region a rect covers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Equivalent rect with non-negative width and height.
    pub fn standardized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn has_negative_size(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        let a = self.standardized();
        let b = other.standardized();
        a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let r = self.standardized();
        x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// True when every channel lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_negative_height() {
        let r = Rect::new(0.0, 0.0, 320.0, -480.0);
        assert_eq!(r.standardized(), Rect::new(0.0, -480.0, 320.0, 480.0));
        assert!(r.has_negative_size());
        assert!(!r.standardized().has_negative_size());
    }

    #[test]
    fn test_standardized_is_noop_for_positive() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.standardized(), r);
    }

    #[test]
    fn test_contains_uses_covered_region() {
        let r = Rect::new(0.0, 0.0, 100.0, -50.0);
        assert!(r.contains(10.0, -10.0));
        assert!(!r.contains(10.0, 10.0));
    }

    #[test]
    fn test_intersects() {
        let screen = Rect::new(0.0, 0.0, 320.0, 480.0);
        assert!(!screen.intersects(&Rect::new(0.0, -480.0, 320.0, 480.0)));
        assert!(screen.intersects(&Rect::new(100.0, 100.0, 10.0, 10.0)));
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFF0000);
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
        assert!(c.is_normalized());
        assert!(!Color::rgba(1.5, 0.0, 0.0, 1.0).is_normalized());
    }

    #[test]
    fn test_color_default_is_transparent() {
        assert_eq!(Color::default(), Color::TRANSPARENT);
        assert_eq!(Color::BLACK.with_alpha(0.4).a, 0.4);
    }
}
