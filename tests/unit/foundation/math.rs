use super::*;
use std::cmp::Ordering;

#[test]
fn clamp_u8_saturates_and_rounds() {
    assert_eq!(clamp_u8(-4.0), 0);
    assert_eq!(clamp_u8(300.0), 255);
    assert_eq!(clamp_u8(12.5), 13);
    assert_eq!(clamp_u8(f32::NAN), 0);
}

#[test]
fn fingerprint_depends_on_dimensions() {
    let data = [1u8; 16];
    assert_ne!(fingerprint_rgba(2, 2, &data), fingerprint_rgba(4, 1, &data));
    assert_eq!(fingerprint_rgba(2, 2, &data), fingerprint_rgba(2, 2, &data));
}

#[test]
fn natural_order_compares_digit_runs_numerically() {
    assert_eq!(natural_cmp("frame2.png", "frame10.png"), Ordering::Less);
    assert_eq!(natural_cmp("a10", "a9"), Ordering::Greater);
    assert_eq!(natural_cmp("B1", "a2"), Ordering::Greater);
    assert_eq!(natural_cmp("x01", "x1"), Ordering::Greater);
    assert_eq!(natural_cmp("same", "same"), Ordering::Equal);

    let mut names = vec!["img12", "img1", "img3", "Img2"];
    names.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(names, vec!["img1", "Img2", "img3", "img12"]);
}
