//! Pure calculation functions for layer geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::Gravity;

/// How a source is scaled into a target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// `min(target/src)` per axis: the whole source fits inside the box.
    Fit,
    /// `max(target/src)` per axis: the source covers the box, overflow is cropped.
    Cover,
}

/// Scale factor taking `source` into `target` under `mode`.
///
/// # Examples
/// ```
/// # use og_card::imaging::{Dimensions, ScaleMode, calculate_ratio};
/// let src = Dimensions { width: 300, height: 150 };
/// let box_ = Dimensions { width: 150, height: 150 };
/// assert_eq!(calculate_ratio(src, box_, ScaleMode::Fit), 0.5);
/// assert_eq!(calculate_ratio(src, box_, ScaleMode::Cover), 1.0);
/// ```
pub fn calculate_ratio(source: Dimensions, target: Dimensions, mode: ScaleMode) -> f64 {
    let rx = target.width as f64 / source.width.max(1) as f64;
    let ry = target.height as f64 / source.height.max(1) as f64;
    match mode {
        ScaleMode::Fit => rx.min(ry),
        ScaleMode::Cover => rx.max(ry),
    }
}

/// Dimensions of `source` after scaling by `ratio`, never below 1×1.
pub fn scaled_dimensions(source: Dimensions, ratio: f64) -> Dimensions {
    Dimensions {
        width: ((source.width as f64 * ratio).round() as u32).max(1),
        height: ((source.height as f64 * ratio).round() as u32).max(1),
    }
}

/// Resolve a gravity-relative offset to an absolute top-left position.
///
/// - `nw` → `(x, y)`
/// - `ne` → `(canvas.w - element.w - x, y)`
/// - `sw` → `(x, canvas.h - element.h - y)`
/// - `se` → both mirrored
///
/// The result depends only on the two sizes and the offset, so re-applying
/// it to a canvas of the same size always lands in the same place.
pub fn gravity_position(
    gravity: Gravity,
    canvas: Dimensions,
    element: Dimensions,
    x: i64,
    y: i64,
) -> (i64, i64) {
    let px = if gravity.mirrors_x() {
        canvas.width as i64 - element.width as i64 - x
    } else {
        x
    };
    let py = if gravity.mirrors_y() {
        canvas.height as i64 - element.height as i64 - y
    } else {
        y
    };
    (px, py)
}

/// One solid band of a border strip, along the strip's long axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub offset: u32,
    pub length: u32,
}

/// Split a strip of `length` pixels into `count` equal bands, in order.
///
/// Each band is `length / count` long; the last band also takes the
/// remainder so the bands cover the whole strip edge to edge.
pub fn calculate_bands(length: u32, count: usize) -> Vec<Band> {
    if count == 0 {
        return Vec::new();
    }
    let count = count as u32;
    let base = length / count;
    (0..count)
        .map(|i| {
            let offset = i * base;
            let length = if i + 1 == count { length - offset } else { base };
            Band { offset, length }
        })
        .collect()
}
