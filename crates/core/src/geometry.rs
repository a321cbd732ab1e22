//! Coordinate types tagged with the space they live in.
//!
//! Pointer events, the rendered pixmap and the source image all use plain
//! pixel numbers, which makes it easy to subtract a screen point from a
//! pixmap offset by accident. Every type here carries a zero-sized marker
//! naming its space, so mixing spaces does not compile; moving between them
//! goes through the functions in [`crate::transform`] and
//! [`crate::selection`].
//!
//! ```text
//! Screen (widget/label) --offset--> Pixmap --scale--> Source
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Pointer coordinates relative to the widget hosting the pixmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Screen;

/// The visible area the image is rendered into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport;

/// Relative to the top-left of the rendered pixmap, letterbox excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pixmap;

/// Pixel grid of the loaded image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Source;

/// A point in coordinate space `S`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<S>,
}

impl<S> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Reinterprets the coordinates in another space.
    ///
    /// Only the conversion functions should call this.
    pub(crate) fn cast<T>(self) -> Point<T> {
        Point::new(self.x, self.y)
    }
}

/// A displacement in coordinate space `S`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset<S> {
    pub dx: f64,
    pub dy: f64,
    _space: PhantomData<S>,
}

impl<S> Offset<S> {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            _space: PhantomData,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub(crate) fn cast<T>(self) -> Offset<T> {
        Offset::new(self.dx, self.dy)
    }
}

impl<S> Add<Offset<S>> for Point<S> {
    type Output = Point<S>;
    fn add(self, rhs: Offset<S>) -> Point<S> {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl<S> Sub<Offset<S>> for Point<S> {
    type Output = Point<S>;
    fn sub(self, rhs: Offset<S>) -> Point<S> {
        Point::new(self.x - rhs.dx, self.y - rhs.dy)
    }
}

impl<S> Sub for Point<S> {
    type Output = Offset<S>;
    fn sub(self, rhs: Point<S>) -> Offset<S> {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height in coordinate space `S`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size<S> {
    pub width: f64,
    pub height: f64,
    _space: PhantomData<S>,
}

impl<S> Size<S> {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            _space: PhantomData,
        }
    }

    pub fn from_u32(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }

    /// True when either side is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    /// Rounds to whole pixels, never below one.
    pub fn to_pixels(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }

    /// Uniform scaling; aspect ratio is preserved.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    pub fn max(&self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub(crate) fn cast<T>(self) -> Size<T> {
        Size::new(self.width, self.height)
    }
}

impl<S> fmt::Display for Size<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
impl<S> FromStr for Size<S> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width = w.trim().parse::<f64>().map_err(|e| format!("bad width {w:?}: {e}"))?;
        let height = h.trim().parse::<f64>().map_err(|e| format!("bad height {h:?}: {e}"))?;
        Ok(Self::new(width, height))
    }
}

/// Parses `X,Y`, e.g. `150,150`.
impl<S> FromStr for Point<S> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
        let x = x.trim().parse::<f64>().map_err(|e| format!("bad x {x:?}: {e}"))?;
        let y = y.trim().parse::<f64>().map_err(|e| format!("bad y {y:?}: {e}"))?;
        Ok(Self::new(x, y))
    }
}

/// An axis-aligned rectangle in coordinate space `S`, `min` inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect<S> {
    pub min: Point<S>,
    pub max: Point<S>,
}

// The derives on `Point`/`Offset` only make them `Copy` for `Copy` markers.
impl<S: Copy> Rect<S> {
    pub fn from_min_size(min: Point<S>, size: Size<S>) -> Self {
        Self {
            min,
            max: Point::new(min.x + size.width, min.y + size.height),
        }
    }

    /// Builds a normalised rectangle from two opposite corners.
    ///
    /// Users can drag in any direction; the result always has a
    /// non-negative width and height.
    pub fn from_two_points(a: Point<S>, b: Point<S>) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Size<S> {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn translate(&self, by: Offset<S>) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }

    /// Overlap of two rectangles. Disjoint inputs give an empty rectangle
    /// anchored at the clamped corner rather than a negative size.
    pub fn intersect(&self, other: &Self) -> Self {
        let min = Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Point::new(
            self.max.x.min(other.max.x).max(min.x),
            self.max.y.min(other.max.y).max(min.y),
        );
        Self { min, max }
    }

    pub(crate) fn cast<T>(self) -> Rect<T> {
        Rect {
            min: self.min.cast(),
            max: self.max.cast(),
        }
    }
}

/// Pixel dimensions of a decoded image.
pub type ImageSize = Size<Source>;
/// Size of the visible area, updated on every host resize.
pub type ViewportSize = Size<Viewport>;
/// A drag rectangle in widget coordinates, valid only during a gesture.
pub type SelectionRect = Rect<Screen>;

/// A region of the source image in whole pixels.
///
/// Always lies inside the image it was produced for. It is consumed by
/// value when the crop is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// True when the region is non-empty and lies within `width x height`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.w > 0
            && self.h > 0
            && self.x.checked_add(self.w).is_some_and(|r| r <= width)
            && self.y.checked_add(self.h).is_some_and(|b| b <= height)
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_points_normalise_any_drag_direction() {
        let r = Rect::<Screen>::from_two_points(Point::new(30.0, 40.0), Point::new(10.0, 5.0));
        assert_eq!(r.min, Point::new(10.0, 5.0));
        assert_eq!(r.max, Point::new(30.0, 40.0));
        assert_eq!(r.width(), 20.0);
        assert_eq!(r.height(), 35.0);
    }

    #[test]
    fn translate_moves_both_corners() {
        let r = Rect::<Screen>::from_min_size(Point::new(10.0, 20.0), Size::new(30.0, 40.0));
        assert_eq!(r.max, Point::new(40.0, 60.0));

        let moved = r.translate(Offset::new(-10.0, 5.0));
        assert_eq!(moved.min, Point::new(0.0, 25.0));
        assert_eq!(moved.max, Point::new(30.0, 65.0));
        assert_eq!(moved.size(), r.size());
        // the original is untouched
        assert_eq!(r.min, Point::new(10.0, 20.0));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Rect::<Pixmap>::from_min_size(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Rect::<Pixmap>::from_min_size(Point::new(20.0, 20.0), Size::new(5.0, 5.0));
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn parses_sizes_and_points() {
        let s: Size<Viewport> = "800x600".parse().unwrap();
        assert_eq!(s, Size::new(800.0, 600.0));
        let p: Point<Screen> = "150, 150".parse().unwrap();
        assert_eq!(p, Point::new(150.0, 150.0));
        assert!("800".parse::<Size<Viewport>>().is_err());
    }

    #[test]
    fn crop_region_bounds() {
        assert!(CropRegion::new(0, 0, 10, 10).fits_within(10, 10));
        assert!(!CropRegion::new(1, 0, 10, 10).fits_within(10, 10));
        assert!(!CropRegion::new(0, 0, 0, 10).fits_within(10, 10));
        assert!(!CropRegion::new(u32::MAX, 0, 2, 1).fits_within(10, 10));
    }
}
