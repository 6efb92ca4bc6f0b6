use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL.into_iter().filter(|e| *e != Ease::Bounce) {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn bounce_dips_between_segments() {
    // Peak of the first arc, then the second arc starts lower.
    let first_peak = Ease::Bounce.apply(1.0 / 2.75 - 1e-9);
    let second_low = Ease::Bounce.apply(1.5 / 2.75);
    assert!((first_peak - 1.0).abs() < 1e-6);
    assert!((second_low - 0.75).abs() < 1e-12);
}

#[test]
fn names_round_trip_and_unknown_is_linear() {
    for ease in Ease::ALL {
        assert_eq!(Ease::from_name(ease.name()), ease);
        let json = serde_json::to_string(&ease).unwrap();
        assert_eq!(json, format!("\"{}\"", ease.name()));
    }
    assert_eq!(Ease::from_name("wobble"), Ease::Linear);
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InQuad.apply(-1.0), 0.0);
    assert_eq!(Ease::InQuad.apply(2.0), 1.0);
}

#[test]
fn unknown_names_deserialize_to_linear() {
    let ease: Ease = serde_json::from_str("\"wobble\"").unwrap();
    assert_eq!(ease, Ease::Linear);
    let ease: Ease = serde_json::from_str("\"bounce\"").unwrap();
    assert_eq!(ease, Ease::Bounce);
}
