use super::*;

#[test]
fn builtin_has_all_eleven_effects() {
    let reg = EffectRegistry::builtin();
    assert_eq!(reg.ids().len(), 11);
    for id in [
        GREYSCALE,
        SEPIA,
        FILM_EFFECTS,
        HSV_ADJUSTMENT,
        PAINTED_STYLIZATION,
        POINTS_IN_SPACE,
        VECTORS_IN_SPACE,
        SOBEL_EDGES,
        SOBEL_EDGES_COLOURED,
        PREWITT_EDGES,
        PREWITT_EDGES_COLOURED,
    ] {
        assert!(reg.contains(id), "missing {id}");
        reg.schema(id).unwrap().validate().unwrap();
    }
}

#[test]
fn apply_unknown_id_reports_false_and_leaves_pixels() {
    let reg = EffectRegistry::builtin();
    let mut r = Raster::filled(1, 1, [1, 2, 3, 4]);
    assert!(!reg.apply("doesNotExist", &mut r, &ParamValues::new()));
    assert_eq!(r.pixel(0, 0), [1, 2, 3, 4]);
}

#[test]
fn register_replaces_existing_definition() {
    fn invert(r: &mut Raster, _: &ParamValues) {
        for px in r.data_mut().chunks_exact_mut(4) {
            px[0] = 255 - px[0];
        }
    }

    let mut reg = EffectRegistry::builtin();
    let prev = reg.register(EffectDef {
        id: GREYSCALE,
        label: "Invert red",
        apply: invert,
        schema: Params::new,
    });
    assert_eq!(prev.map(|d| d.label), Some("Greyscale"));

    let mut r = Raster::filled(1, 1, [5, 0, 0, 255]);
    assert!(reg.apply(GREYSCALE, &mut r, &ParamValues::new()));
    assert_eq!(r.pixel(0, 0), [250, 0, 0, 255]);
}
