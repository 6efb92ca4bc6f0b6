use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = EditorConfig::default();
    assert_eq!(cfg.preview_scale, 0.25);
    assert_eq!(cfg.preview_delay_ms, 60);
    assert_eq!(cfg.full_quality_delay_ms, 150);
    assert_eq!(cfg.history_limit, 50);
    assert_eq!(cfg.gif_min_delay_ms, 20);
    assert_eq!(cfg.gif_default_quality, 10);
    assert_eq!(cfg.gif_workers, 2);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let cfg = EditorConfig::from_json_str(r#"{ "history_limit": 5, "render_worker": false }"#)
        .unwrap();
    assert_eq!(cfg.history_limit, 5);
    assert!(!cfg.render_worker);
    assert_eq!(cfg.preview_delay_ms, 60);
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = EditorConfig::from_json_str(r#"{ "preview_scale": 0.0 }"#).unwrap_err();
    assert!(matches!(err, LayerforgeError::Config(_)));

    let err = EditorConfig::from_json_str(r#"{ "history_limit": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("history_limit"));

    assert!(EditorConfig::from_json_str("not json").is_err());
}
