use std::sync::Mutex;

use super::*;
use crate::effects::colour::SEPIA_INTENSITY;
use crate::effects::registry::{EffectDef, GREYSCALE, SEPIA};
use crate::layers::params::{ParamValues, Params};

fn editor() -> ImageEditor {
    ImageEditor::with_config(EditorConfig {
        render_worker: false,
        ..EditorConfig::default()
    })
    .unwrap()
}

fn s1_base() -> Raster {
    Raster::from_rgba(2, 1, vec![10, 20, 30, 255, 40, 60, 80, 255]).unwrap()
}

fn loaded(raster: Raster) -> ImageEditor {
    let mut ed = editor();
    ed.load_image(ImageSource::Raster(raster)).unwrap();
    ed.flush();
    ed
}

fn explode(_: &mut Raster, _: &ParamValues) {
    panic!("explode");
}

/// Editor whose registry carries an effect that always panics.
fn volatile_editor(render_worker: bool) -> ImageEditor {
    let mut registry = EffectRegistry::builtin();
    registry.register(EffectDef {
        id: "explode",
        label: "Explode",
        apply: explode,
        schema: Params::new,
    });
    let config = EditorConfig {
        render_worker,
        ..EditorConfig::default()
    };
    let mut ed = ImageEditor::with_registry(config, Arc::new(registry)).unwrap();
    ed.load_image(ImageSource::Raster(s1_base())).unwrap();
    ed.flush();
    ed
}

fn recorder(ed: &mut ImageEditor) -> Arc<Mutex<Vec<StateChanged>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ed.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    seen
}

#[test]
fn load_records_initial_snapshot_and_displays_base() {
    let ed = loaded(s1_base());
    assert_eq!(ed.history_labels(), ["Initial load"]);
    assert_eq!(ed.canvas_size(), (2, 1));
    assert_eq!(ed.display(), Some(&s1_base()));
    assert!(!ed.can_undo());
}

#[test]
fn failed_load_changes_nothing() {
    let mut ed = loaded(s1_base());
    let err = ed
        .load_image(ImageSource::encoded(b"junk".to_vec(), None))
        .unwrap_err();
    assert!(matches!(err, LayerforgeError::DecodeFailed(_)));
    assert_eq!(ed.history_labels(), ["Initial load"]);
    assert_eq!(ed.base(), Some(&s1_base()));
}

#[test]
fn effect_layer_composes_at_full_quality() {
    let mut ed = loaded(s1_base());
    ed.add_effect_layer(Some("grey"), GREYSCALE, None, EditOptions::COMMIT)
        .unwrap();
    ed.flush();
    assert_eq!(
        ed.display().unwrap().data(),
        [20, 20, 20, 255, 60, 60, 60, 255]
    );
    assert_eq!(ed.history_labels(), ["Initial load", "Add layer: grey"]);
}

#[test]
fn unknown_effect_is_rejected_without_side_effects() {
    let mut ed = loaded(s1_base());
    assert!(ed
        .add_effect_layer(None, "nope", None, EditOptions::COMMIT)
        .is_err());
    assert!(ed.layers().is_empty());
    assert_eq!(ed.history_labels().len(), 1);
}

#[test]
fn effect_layer_params_override_schema_defaults() {
    let mut ed = loaded(s1_base());
    let params = ParamValues::new().with(SEPIA_INTENSITY, ParamValue::Number(0.25));
    let i = ed
        .add_effect_layer(None, SEPIA, Some(&params), EditOptions::COMMIT)
        .unwrap();
    assert_eq!(ed.parameter(i, SEPIA_INTENSITY).unwrap(), 0.25);
}

#[test]
fn undo_redo_round_trip_from_empty() {
    let mut ed = editor();
    ed.add_layer(None, EditOptions::COMMIT);
    ed.set_opacity(0, 0.5, EditOptions::COMMIT).unwrap();
    ed.undo().unwrap();
    assert_eq!(ed.layers()[0].opacity(), 1.0);
    ed.redo().unwrap();
    assert_eq!(ed.layers().len(), 1);
    assert_eq!(ed.layers()[0].opacity(), 0.5);
    assert!(ed.can_undo());
    assert!(!ed.can_redo());
}

#[test]
fn undo_past_bottom_is_invalid_input() {
    let mut ed = loaded(s1_base());
    assert!(matches!(ed.undo(), Err(LayerforgeError::InvalidInput(_))));
    assert!(matches!(ed.redo(), Err(LayerforgeError::InvalidInput(_))));
}

#[test]
fn transient_edits_skip_history_until_commit() {
    let mut ed = loaded(s1_base());
    ed.add_effect_layer(None, GREYSCALE, None, EditOptions::COMMIT)
        .unwrap();
    for o in [0.9, 0.8, 0.7] {
        ed.set_opacity(0, o, EditOptions::TRANSIENT).unwrap();
    }
    assert_eq!(ed.history_labels().len(), 2);
    ed.set_opacity(0, 0.6, EditOptions::COMMIT).unwrap();
    assert_eq!(ed.history_labels().len(), 3);
    ed.undo().unwrap();
    assert_eq!(ed.layers()[0].opacity(), 1.0);
}

#[test]
fn crop_orders_corners_and_undo_restores_base() {
    let mut base = Raster::new(4, 4);
    for y in 0..4 {
        for x in 0..4 {
            base.set_pixel(x, y, [(x * 10) as u8, (y * 10) as u8, 0, 255]);
        }
    }
    let mut ed = loaded(base.clone());
    ed.crop(3, 3, 1, 1).unwrap();
    assert_eq!(ed.canvas_size(), (2, 2));
    assert_eq!(ed.base().unwrap().pixel(0, 0), [10, 10, 0, 255]);
    assert!(ed.crop(0, 0, 0, 1).is_err());
    assert!(ed.crop(0, 0, 5, 5).is_err());

    ed.undo().unwrap();
    assert_eq!(ed.base(), Some(&base));
    ed.flush();
    assert_eq!(ed.display(), Some(&base));
}

#[test]
fn resize_keeps_aspect_when_asked() {
    let mut ed = loaded(Raster::filled(8, 4, [5, 5, 5, 255]));
    ed.resize_canvas(4, 99, true, ResizeMode::Default).unwrap();
    assert_eq!(ed.canvas_size(), (4, 2));
    ed.resize_canvas(3, 3, false, ResizeMode::NearestNeighbour)
        .unwrap();
    assert_eq!(ed.canvas_size(), (3, 3));
    assert!(ed.resize_canvas(0, 3, false, ResizeMode::Bilinear).is_err());
}

#[test]
fn rotate_quarter_swaps_dimensions() {
    let mut ed = loaded(Raster::new(3, 1));
    ed.rotate(90.0).unwrap();
    assert_eq!(ed.canvas_size(), (1, 3));
    ed.rotate(45.0).unwrap();
    assert_eq!(ed.canvas_size(), (1, 3));
    ed.reset_image().unwrap();
    assert_eq!(ed.canvas_size(), (3, 1));
}

#[test]
fn image_edits_need_an_image() {
    let mut ed = editor();
    assert!(ed.crop(0, 0, 1, 1).is_err());
    assert!(ed.rotate(90.0).is_err());
    assert!(ed.reset_image().is_err());
    assert!(ed.history_labels().is_empty());
}

#[test]
fn metadata_changes_are_snapshotted() {
    let mut ed = editor();
    ed.set_name("holiday").unwrap();
    ed.change_file_type("image/jpeg").unwrap();
    assert_eq!(ed.meta().file_name(), "holiday.jpg");
    ed.set_extension(".webp").unwrap();
    assert_eq!(ed.meta().mime, "image/webp");
    assert!(ed.change_file_type("image/tiff").is_err());
    assert!(ed.set_name("  ").is_err());
    ed.undo().unwrap();
    assert_eq!(ed.meta().mime, "image/jpeg");
}

#[test]
fn events_follow_snapshots() {
    let mut ed = editor();
    let seen = recorder(&mut ed);
    ed.add_layer(Some("a"), EditOptions::COMMIT);
    ed.add_layer(Some("b"), EditOptions::COMMIT);
    ed.undo().unwrap();
    assert!(ed.set_opacity(9, 0.1, EditOptions::COMMIT).is_err());

    let seen = seen.lock().unwrap();
    let reasons: Vec<&str> = seen.iter().map(|e| e.reason.as_str()).collect();
    assert_eq!(reasons, ["Add layer: a", "Add layer: b", "Undo"]);
    assert!(!seen[0].undo_available);
    assert!(seen[1].undo_available);
    assert!(seen[2].redo_available);
}

#[test]
fn layer_ordering_and_selection() {
    let mut ed = editor();
    ed.add_layer(Some("a"), EditOptions::COMMIT);
    ed.add_layer(Some("b"), EditOptions::COMMIT);
    assert_eq!(ed.move_layer_up(0, EditOptions::COMMIT).unwrap(), 1);
    assert_eq!(ed.layers()[1].name(), "a");
    assert_eq!(ed.selected_index(), Some(1));
    ed.select_layer(None).unwrap();
    assert_eq!(ed.selected_index(), None);
    assert!(ed.select_layer(Some(2)).is_err());
    ed.rename_layer(0, "bottom", EditOptions::COMMIT).unwrap();
    ed.delete_layer(1, EditOptions::COMMIT).unwrap();
    assert_eq!(ed.layers().len(), 1);
    assert_eq!(ed.layers()[0].name(), "bottom");
}

#[test]
fn set_and_clear_layer_effect() {
    let mut ed = loaded(s1_base());
    ed.add_layer(None, EditOptions::COMMIT);
    ed.set_layer_effect(0, Some(GREYSCALE), EditOptions::COMMIT)
        .unwrap();
    ed.flush();
    assert_eq!(ed.display().unwrap().pixel(0, 0), [20, 20, 20, 255]);
    ed.set_layer_effect(0, None, EditOptions::COMMIT).unwrap();
    ed.flush();
    assert_eq!(ed.display(), Some(&s1_base()));
    assert!(ed.set_layer_effect(0, Some("nope"), EditOptions::COMMIT).is_err());
}

#[test]
fn hidden_layer_leaves_base_untouched() {
    let mut ed = loaded(s1_base());
    ed.add_effect_layer(None, GREYSCALE, None, EditOptions::COMMIT)
        .unwrap();
    assert!(!ed.toggle_visibility(0, EditOptions::COMMIT).unwrap());
    ed.flush();
    assert_eq!(ed.display(), Some(&s1_base()));
}

#[test]
fn export_display_encodes_png() {
    let mut ed = loaded(s1_base());
    let bytes = ed.export_display(image::ImageFormat::Png).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(Raster::from_rgba_image(back), s1_base());
    assert!(editor().export().is_err());
}

#[test]
fn gif_import_export_and_frame_editing() {
    let mut ed = editor();
    ed.gif_frames_mut()
        .add_frame(Raster::filled(2, 2, [40, 80, 120, 255]), 100)
        .unwrap();
    let bytes = ed.export_gif(None).unwrap();
    assert!(ed.export_gif(Some(0)).is_err());

    assert!(ed.import_gif(b"GIF89a").is_err());
    assert_eq!(ed.gif_frames().len(), 1);
    assert_eq!(ed.import_gif(&bytes).unwrap(), 1);

    ed.open_gif_frame(0).unwrap();
    ed.add_effect_layer(None, GREYSCALE, None, EditOptions::COMMIT)
        .unwrap();
    ed.store_gif_frame(0).unwrap();
    assert_eq!(
        ed.gif_frames().get_frame(0).unwrap().pixels.pixel(1, 1),
        [80, 80, 80, 255]
    );
    assert_eq!(ed.append_gif_frame(50).unwrap(), 1);
}

#[test]
fn animation_sweeps_and_restores_parameter() {
    let mut ed = loaded(Raster::filled(4, 4, [200, 100, 50, 255]));
    ed.add_effect_layer(None, SEPIA, None, EditOptions::COMMIT)
        .unwrap();
    let spec = AnimationSpec {
        parameter: SEPIA_INTENSITY.into(),
        start: 0.0,
        end: 1.0,
        frame_count: 3,
        ..AnimationSpec::default()
    };
    let bytes = ed.generate_animation(&spec, |_| {}).unwrap();
    let gif = crate::gif::decode::decode(&bytes).unwrap();
    assert_eq!(gif.frames.len(), 3);
    assert_eq!(gif.frames[0].pixels.pixel(0, 0), [200, 100, 50, 255]);
    assert_eq!(ed.parameter(0, SEPIA_INTENSITY).unwrap(), 1.0);
    assert_eq!(ed.history_labels().len(), 2);
}

#[test]
fn worker_backed_editor_settles_on_flush() {
    let mut ed = ImageEditor::new();
    ed.load_image(ImageSource::Raster(s1_base())).unwrap();
    ed.add_effect_layer(None, GREYSCALE, None, EditOptions::COMMIT)
        .unwrap();
    ed.flush();
    assert!(!ed.is_rendering());
    assert_eq!(ed.display().unwrap().pixel(1, 0), [60, 60, 60, 255]);
}

#[test]
fn failed_render_is_reported_once_on_the_next_event() {
    let mut ed = volatile_editor(false);
    let seen = recorder(&mut ed);
    ed.add_effect_layer(Some("boom"), "explode", None, EditOptions::COMMIT)
        .unwrap();
    ed.delete_layer(0, EditOptions::COMMIT).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].reason, "Add layer: boom");
    assert!(seen[0].render_failed);
    assert!(!seen[1].render_failed);
    assert_eq!(ed.display(), Some(&s1_base()));
}

#[test]
fn flush_announces_the_settled_render() {
    let mut ed = ImageEditor::new();
    ed.load_image(ImageSource::Raster(s1_base())).unwrap();
    ed.flush();
    let seen = recorder(&mut ed);
    ed.add_effect_layer(None, GREYSCALE, None, EditOptions::COMMIT)
        .unwrap();
    assert!(ed.flush());

    let seen = seen.lock().unwrap();
    let last = seen.last().unwrap();
    assert_eq!(last.reason, "Render complete");
    assert!(!last.is_rendering);
    assert!(!last.render_failed);
    assert!(last.undo_available);
}

#[test]
fn worker_failure_surfaces_through_flush() {
    let mut ed = volatile_editor(true);
    let seen = recorder(&mut ed);
    ed.add_effect_layer(None, "explode", None, EditOptions::COMMIT)
        .unwrap();
    ed.flush();

    let seen = seen.lock().unwrap();
    assert!(seen.iter().any(|e| e.render_failed));
    let last = seen.last().unwrap();
    assert_eq!(last.reason, "Render complete");
    assert!(!last.is_rendering);
    assert!(!ed.is_rendering());
}

#[test]
fn idle_pump_stays_quiet() {
    let mut ed = loaded(s1_base());
    let seen = recorder(&mut ed);
    assert!(!ed.pump());
    assert!(!ed.flush());
    assert!(seen.lock().unwrap().is_empty());
}
