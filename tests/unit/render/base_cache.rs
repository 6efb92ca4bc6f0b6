use super::*;

#[test]
fn first_ensure_copies_the_source() {
    let mut cache = BaseImageCache::new();
    let src = Raster::filled(2, 2, [1, 2, 3, 255]);
    assert_eq!(cache.ensure(Some(&src)), Some(&src));
    assert_eq!(cache.copies(), 1);
    assert!(!cache.is_dirty());
}

#[test]
fn clean_cache_ignores_source_changes_until_invalidated() {
    let mut cache = BaseImageCache::new();
    let a = Raster::filled(1, 1, [1, 1, 1, 255]);
    let b = Raster::filled(1, 1, [2, 2, 2, 255]);
    cache.ensure(Some(&a));
    assert_eq!(cache.ensure(Some(&b)), Some(&a));

    cache.invalidate();
    assert_eq!(cache.ensure(Some(&b)), Some(&b));
    assert_eq!(cache.copies(), 2);
}

#[test]
fn identical_content_reuses_the_buffer() {
    let mut cache = BaseImageCache::new();
    let a = Raster::filled(3, 1, [7, 7, 7, 255]);
    cache.ensure(Some(&a));
    cache.invalidate();
    cache.ensure(Some(&a.clone()));
    assert_eq!(cache.copies(), 1);
}

#[test]
fn missing_source_clears_the_cache() {
    let mut cache = BaseImageCache::new();
    cache.ensure(Some(&Raster::filled(1, 1, [0, 0, 0, 255])));
    cache.invalidate();
    assert!(cache.ensure(None).is_none());
    assert!(cache.pixels().is_none());
}
