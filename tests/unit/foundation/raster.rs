use super::*;

fn numbered(w: u32, h: u32) -> Raster {
    let mut r = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            r.set_pixel(x, y, [(y * w + x) as u8, 0, 0, 255]);
        }
    }
    r
}

#[test]
fn from_rgba_validates_length() {
    assert!(Raster::from_rgba(2, 2, vec![0; 16]).is_ok());
    let err = Raster::from_rgba(2, 2, vec![0; 15]).unwrap_err();
    assert!(matches!(err, LayerforgeError::InvalidInput(_)));
}

#[test]
fn clone_does_not_alias() {
    let a = Raster::filled(2, 1, [1, 2, 3, 4]);
    let mut b = a.clone();
    b.set_pixel(0, 0, [9, 9, 9, 9]);
    assert_eq!(a.pixel(0, 0), [1, 2, 3, 4]);
    assert_eq!(b.pixel(0, 0), [9, 9, 9, 9]);
}

#[test]
fn transferable_round_trip_moves_bytes() {
    let a = numbered(3, 2);
    let expected = a.clone();
    let t = a.into_transferable();
    assert_eq!(t.dimensions(), (3, 2));
    assert_eq!(t.into_raster(), expected);
}

#[test]
fn draw_subregion_clips_negative_offsets() {
    let src = numbered(3, 3);
    let mut dst = Raster::new(2, 2);
    dst.draw_subregion(&src, PixelRect::new(0, 0, 3, 3), -1, -1);
    assert_eq!(dst.pixel(0, 0), src.pixel(1, 1));
    assert_eq!(dst.pixel(1, 1), src.pixel(2, 2));
}

#[test]
fn crop_rejects_out_of_bounds() {
    let r = numbered(4, 4);
    assert!(r.crop(PixelRect::new(3, 3, 2, 2)).is_err());
    assert!(r.crop(PixelRect::new(0, 0, 0, 2)).is_err());
    let inner = r.crop(PixelRect::new(1, 1, 2, 2)).unwrap();
    assert_eq!(inner.pixel(0, 0), r.pixel(1, 1));
    assert_eq!(inner.pixel(1, 1), r.pixel(2, 2));
}

#[test]
fn rotate_quarter_turn_swaps_dimensions() {
    let r = numbered(3, 2);
    let rotated = r.rotate(90.0);
    assert_eq!(rotated.dimensions(), (2, 3));
    // Clockwise: the bottom-left source pixel ends up top-left.
    assert_eq!(rotated.pixel(0, 0), r.pixel(0, 1));
    assert_eq!(r.rotate(360.0), r);
    assert_eq!(r.rotate(-90.0), r.rotate(270.0));
}

#[test]
fn rotate_arbitrary_angle_keeps_dimensions() {
    let r = Raster::filled(5, 3, [10, 20, 30, 255]);
    let rotated = r.rotate(30.0);
    assert_eq!(rotated.dimensions(), (5, 3));
    assert_eq!(rotated.pixel(2, 1), [10, 20, 30, 255]);
}

#[test]
fn scale_to_uniform_color_stays_uniform() {
    let r = Raster::filled(4, 4, [50, 100, 150, 255]);
    let small = r.scale_to(1, 1).unwrap();
    assert_eq!(small.pixel(0, 0), [50, 100, 150, 255]);
    let big = small.scale_to(8, 6).unwrap();
    assert_eq!(big.dimensions(), (8, 6));
    assert!(big.data().chunks_exact(4).all(|p| p == [50, 100, 150, 255]));
    assert!(r.scale_to(0, 3).is_err());
}

#[test]
fn bilinear_sample_interpolates_midpoint() {
    let mut r = Raster::new(2, 1);
    r.set_pixel(0, 0, [0, 0, 0, 255]);
    r.set_pixel(1, 0, [100, 200, 50, 255]);
    assert_eq!(r.sample_bilinear(0.5, 0.0), Some([50, 100, 25, 255]));
    assert_eq!(r.sample_bilinear(-3.0, 0.0), None);
}
