//! Coordinate array generators.
//!
//! These produce the 1-D coordinate vectors that raster data carries along
//! its x and y axes.

/// `n` evenly spaced values starting at `start`.
///
/// # Example
///
/// ```
/// use test_utils::arange;
///
/// assert_eq!(arange(0.0, 2.5, 3), vec![0.0, 2.5, 5.0]);
/// ```
pub fn arange(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Pixel center coordinates for a north-up raster.
///
/// Returns `(y, x)` with y descending from the top, matching the order
/// coordinate arrays are stored in.
pub fn pixel_centers(
    left: f64,
    top: f64,
    res: (f64, f64),
    shape: (usize, usize),
) -> (Vec<f64>, Vec<f64>) {
    let (height, width) = shape;
    let y = arange(top - res.1 / 2.0, -res.1, height);
    let x = arange(left + res.0 / 2.0, res.0, width);
    (y, x)
}

/// Pixel upper-left edge coordinates for a north-up raster, `(y, x)`.
pub fn pixel_edges(
    left: f64,
    top: f64,
    res: (f64, f64),
    shape: (usize, usize),
) -> (Vec<f64>, Vec<f64>) {
    let (height, width) = shape;
    (arange(top, -res.1, height), arange(left, res.0, width))
}

/// A coordinate array whose middle interval is half the others.
pub fn irregular_coords() -> Vec<f64> {
    vec![90.0, 85.0, 80.0, 77.5, 75.0, 72.5, 70.0]
}
