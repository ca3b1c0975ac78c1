//! Mask surfaces the user scratches away

use serde::{Deserialize, Serialize};

/// Pointer position in mask pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An opaque overlay that can be erased and measured
///
/// Erasing clears pixels (destination-out), it never paints over them, so
/// the erased fraction of any sequence of strokes is the area of their union.
pub trait Maskable: Send {
    /// Clear a disc of `radius` centered at `center`
    fn erase(&mut self, center: Point, radius: f64);

    /// Clear the whole mask
    fn erase_all(&mut self);

    /// Fraction of fully transparent pixels, in [0, 1]
    fn erased_fraction(&self) -> f64;
}

/// Alpha-channel raster mask
///
/// A pixel is erased when its center lies inside the brush disc.
#[derive(Debug, Clone)]
pub struct RasterMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
    transparent: usize,
}

impl RasterMask {
    /// Create a fully opaque mask; dimensions are at least 1x1
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            alpha: vec![u8::MAX; width as usize * height as usize],
            transparent: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) has been erased; out-of-bounds is false
    pub fn is_transparent(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.alpha[self.index(x, y)] == 0
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn total(&self) -> usize {
        self.alpha.len()
    }
}

impl Default for RasterMask {
    /// Canvas size of the original card
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Maskable for RasterMask {
    fn erase(&mut self, center: Point, radius: f64) {
        if !radius.is_finite() || radius <= 0.0 || !center.x.is_finite() || !center.y.is_finite()
        {
            return;
        }

        // Float to int casts saturate, so strokes fully off-canvas give empty ranges
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let max_x = ((center.x + radius).ceil().min(self.width as f64)).max(0.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_y = ((center.y + radius).ceil().min(self.height as f64)).max(0.0) as u32;
        let r2 = radius * radius;

        for y in min_y..max_y {
            let dy = y as f64 + 0.5 - center.y;
            for x in min_x..max_x {
                let dx = x as f64 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    let idx = self.index(x, y);
                    if self.alpha[idx] != 0 {
                        self.alpha[idx] = 0;
                        self.transparent += 1;
                    }
                }
            }
        }
    }

    fn erase_all(&mut self) {
        self.alpha.fill(0);
        self.transparent = self.total();
    }

    fn erased_fraction(&self) -> f64 {
        self.transparent as f64 / self.total() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mask_is_opaque() {
        let mask = RasterMask::new(64, 32);
        assert_eq!(mask.erased_fraction(), 0.0);
        assert!(!mask.is_transparent(0, 0));
    }

    #[test]
    fn test_default_size() {
        let mask = RasterMask::default();
        assert_eq!((mask.width(), mask.height()), (1280, 720));
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let mask = RasterMask::new(0, 0);
        assert_eq!(mask.width(), 1);
        assert_eq!(mask.height(), 1);
    }

    #[test]
    fn test_erase_disc_area() {
        let mut mask = RasterMask::new(200, 200);
        mask.erase(Point::new(100.0, 100.0), 10.0);

        let erased = mask.erased_fraction() * 200.0 * 200.0;
        let expected = std::f64::consts::PI * 100.0;
        assert!((erased - expected).abs() / expected < 0.05);
        assert!(mask.is_transparent(100, 100));
        assert!(!mask.is_transparent(100, 120));
    }

    #[test]
    fn test_erase_same_spot_is_idempotent() {
        let mut mask = RasterMask::new(100, 100);
        mask.erase(Point::new(50.0, 50.0), 8.0);
        let once = mask.erased_fraction();
        mask.erase(Point::new(50.0, 50.0), 8.0);
        assert_eq!(mask.erased_fraction(), once);
    }

    #[test]
    fn test_erase_clips_at_edges() {
        let mut mask = RasterMask::new(50, 50);
        mask.erase(Point::new(0.0, 0.0), 10.0);
        assert!(mask.erased_fraction() > 0.0);
        assert!(mask.is_transparent(0, 0));

        let before = mask.erased_fraction();
        mask.erase(Point::new(-100.0, -100.0), 10.0);
        mask.erase(Point::new(500.0, 500.0), 10.0);
        assert_eq!(mask.erased_fraction(), before);
    }

    #[test]
    fn test_erase_ignores_degenerate_input() {
        let mut mask = RasterMask::new(20, 20);
        mask.erase(Point::new(10.0, 10.0), 0.0);
        mask.erase(Point::new(10.0, 10.0), -3.0);
        mask.erase(Point::new(f64::NAN, 10.0), 5.0);
        mask.erase(Point::new(10.0, 10.0), f64::INFINITY);
        assert_eq!(mask.erased_fraction(), 0.0);
    }

    #[test]
    fn test_erase_all() {
        let mut mask = RasterMask::new(30, 10);
        mask.erase(Point::new(5.0, 5.0), 3.0);
        mask.erase_all();
        assert_eq!(mask.erased_fraction(), 1.0);
    }

    #[test]
    fn test_disjoint_strokes_commute() {
        let strokes = [
            Point::new(20.0, 20.0),
            Point::new(80.0, 20.0),
            Point::new(50.0, 70.0),
        ];

        let mut forward = RasterMask::new(100, 100);
        for p in strokes {
            forward.erase(p, 12.0);
        }

        let mut backward = RasterMask::new(100, 100);
        for p in strokes.iter().rev() {
            backward.erase(*p, 12.0);
        }

        assert_eq!(forward.erased_fraction(), backward.erased_fraction());
    }

    #[test]
    fn test_overlapping_strokes_count_union() {
        let mut a = RasterMask::new(100, 100);
        a.erase(Point::new(40.0, 50.0), 15.0);
        a.erase(Point::new(50.0, 50.0), 15.0);

        let mut b = RasterMask::new(100, 100);
        b.erase(Point::new(50.0, 50.0), 15.0);
        b.erase(Point::new(40.0, 50.0), 15.0);

        assert_eq!(a.erased_fraction(), b.erased_fraction());

        let mut single = RasterMask::new(100, 100);
        single.erase(Point::new(50.0, 50.0), 15.0);
        assert!(a.erased_fraction() < 2.0 * single.erased_fraction());
    }
}
