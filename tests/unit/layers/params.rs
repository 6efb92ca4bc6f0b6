use super::*;
use serde_json::json;

fn schema() -> Params {
    Params::new()
        .with("intensity", ParamDescriptor::number(0.5, 0.0, 1.0, 0.01))
        .with("invert", ParamDescriptor::flag(false))
        .with("tint", ParamDescriptor::color(Rgb8::WHITE))
}

#[test]
fn update_values_clamps_and_preserves_metadata() {
    let mut p = schema();
    let partial = ParamValues::new().with("intensity", ParamValue::Number(3.0));
    assert_eq!(p.update_values(&partial), vec!["intensity".to_owned()]);

    let desc = p.get("intensity").unwrap();
    assert_eq!(desc.value, ParamValue::Number(1.0));
    assert_eq!(desc.range, Some([0.0, 1.0]));
    assert_eq!(desc.step, Some(0.01));
}

#[test]
fn unknown_names_and_mismatched_types_are_ignored() {
    let mut p = schema();
    let before = p.clone();
    let partial = ParamValues::new()
        .with("nope", ParamValue::Number(1.0))
        .with("invert", ParamValue::Number(1.0));
    assert!(p.update_values(&partial).is_empty());
    assert_eq!(p, before);
}

#[test]
fn colour_accepts_hex_text() {
    let mut p = schema();
    let partial = ParamValues::new().with("tint", ParamValue::Text("#102030".into()));
    p.update_values(&partial);
    assert_eq!(p.value("tint"), Some(&ParamValue::Color(Rgb8::new(16, 32, 48))));
}

#[test]
fn range_is_present_iff_numeric() {
    schema().validate().unwrap();

    let bad = Params::new().with(
        "x",
        ParamDescriptor {
            value: ParamValue::Bool(true),
            range: Some([0.0, 1.0]),
            step: None,
        },
    );
    assert!(bad.validate().is_err());

    let bad = Params::new().with(
        "x",
        ParamDescriptor {
            value: ParamValue::Number(1.0),
            range: None,
            step: None,
        },
    );
    assert!(bad.validate().is_err());
}

#[test]
fn values_view_and_typed_getters() {
    let values = schema().values();
    assert_eq!(values.number("intensity", 0.0), 0.5);
    assert!(!values.flag("invert", true));
    assert_eq!(values.color("tint", Rgb8::BLACK), Rgb8::WHITE);
    assert_eq!(values.number("missing", 7.0), 7.0);
}

#[test]
fn json_form_is_untagged() {
    let values: ParamValues =
        serde_json::from_value(json!({"a": 1.5, "b": true, "c": "#ff0000"})).unwrap();
    assert_eq!(values.get("a"), Some(&ParamValue::Number(1.5)));
    assert_eq!(values.get("b"), Some(&ParamValue::Bool(true)));
    assert_eq!(values.color("c", Rgb8::BLACK), Rgb8::new(255, 0, 0));

    let desc = serde_json::to_value(ParamDescriptor::number(2.0, 0.0, 4.0, 1.0)).unwrap();
    assert_eq!(desc, json!({"value": 2.0, "range": [0.0, 4.0], "step": 1.0}));
}
