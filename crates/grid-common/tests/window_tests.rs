//! Tests for raster window resolution.

use grid_common::{calculate_dst_window, calculate_src_window, Affine, BoundingBox, Window};
use test_utils::bbox::{BOX_1, BOX_2, BOX_3, FAR_AWAY};
use test_utils::transform::{AFFINE_1M, AFFINE_5M};

fn affine(c: [f64; 6]) -> Affine {
    Affine::from(c)
}

// ============================================================================
// calculate_src_window
// ============================================================================

#[test]
fn test_src_window_1m() {
    let (window, bounds) =
        calculate_src_window(&BOX_1.into(), &affine(AFFINE_1M), &BOX_2.into()).unwrap();
    assert_eq!(window, Window::new(0.0, 5.0, 5.0, 5.0));
    assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 5.0, 5.0));
}

#[test]
fn test_src_window_5m() {
    let src = BoundingBox::from(BOX_1);
    let transform = affine(AFFINE_5M);

    let (window, bounds) = calculate_src_window(&src, &transform, &BOX_2.into()).unwrap();
    assert_eq!(window, Window::new(0.0, 1.0, 1.0, 1.0));
    assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 5.0, 5.0));

    let (window, bounds) = calculate_src_window(&src, &transform, &BOX_3.into()).unwrap();
    assert_eq!(window, Window::new(1.0, 0.0, 1.0, 1.0));
    assert_eq!(bounds, BoundingBox::new(5.0, 5.0, 10.0, 10.0));
}

#[test]
fn test_src_window_rounds_to_whole_pixels() {
    let src = BoundingBox::from(BOX_1);
    let dst = BoundingBox::new(-1.0, 0.0, 12.0, 13.0);
    let (window, bounds) = calculate_src_window(&src, &affine(AFFINE_5M), &dst).unwrap();
    assert_eq!(window, Window::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(bounds, src);
    assert_eq!(window.shape(), (2, 2));
    assert_eq!(window.offsets(), (0, 0));
}

#[test]
fn test_src_window_disjoint_is_zero_sized() {
    let (window, _) =
        calculate_src_window(&BOX_1.into(), &affine(AFFINE_1M), &FAR_AWAY.into()).unwrap();
    assert_eq!(window.shape(), (0, 0));
}

// ============================================================================
// calculate_dst_window
// ============================================================================

#[test]
fn test_dst_window() {
    let dst_transform = Affine::new(30.0, 0.0, -35.0, 0.0, -30.0, 155.0);
    let window =
        calculate_dst_window(&BoundingBox::new(0.0, 0.0, 65.0, 95.0), &dst_transform).unwrap();
    assert_eq!(window, Window::new(1.0, 2.0, 2.0, 3.0));
}

#[test]
fn test_dst_window_of_aligned_source() {
    let window = calculate_dst_window(&BOX_3.into(), &affine(AFFINE_5M)).unwrap();
    assert_eq!(window, Window::new(1.0, -1.0, 2.0, 2.0));
    assert_eq!(
        window.bounds(&affine(AFFINE_5M)),
        BoundingBox::new(5.0, 5.0, 15.0, 15.0)
    );
}
