use super::*;

#[test]
fn lerp_half_opacity_matches_midpoint() {
    assert_eq!(
        lerp_opaque([10, 20, 30, 255], [20, 20, 20, 255], 0.5),
        [15, 20, 25, 255]
    );
}

#[test]
fn zero_opacity_keeps_colour_but_forces_alpha() {
    assert_eq!(lerp_opaque([1, 2, 3, 0], [200, 200, 200, 200], 0.0), [1, 2, 3, 255]);
}

#[test]
fn opacity_is_clamped() {
    assert_eq!(lerp_opaque([0, 0, 0, 255], [100, 100, 100, 255], 7.0), [100, 100, 100, 255]);
    assert_eq!(lerp_opaque([9, 9, 9, 255], [100, 100, 100, 255], -1.0), [9, 9, 9, 255]);
}

#[test]
fn in_place_rejects_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(lerp_opaque_in_place(&mut dst, &[0u8; 4], 2, 1.0).is_err());
}

#[test]
fn in_place_blends_every_pixel() {
    let mut dst = vec![0u8, 0, 0, 255, 100, 100, 100, 10];
    let src = vec![200u8, 100, 50, 255, 0, 0, 0, 255];
    lerp_opaque_in_place(&mut dst, &src, 2, 1.0).unwrap();
    assert_eq!(dst, vec![200, 100, 50, 255, 0, 0, 0, 255]);
}
