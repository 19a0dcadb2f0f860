use layered_canvas::presets::{JsonFilePresetStorage, PresetError, PresetStorage, PresetStore};

fn temp_file() -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("layered_canvas_{}", uuid::Uuid::new_v4()))
        .join("presets.json")
}

#[test]
fn test_presets_survive_reopening() {
    let path = temp_file();
    let mut store = PresetStore::open(JsonFilePresetStorage::new(&path)).unwrap();
    assert!(store.list().is_empty());

    let watercolor = store.save("Watercolor", "soft watercolor, paper texture").unwrap();
    let noir = store.save("Noir", "black and white, hard shadows").unwrap();
    store.update(noir, "Film noir", "black and white, hard shadows, rain").unwrap();

    let reopened = PresetStore::open(JsonFilePresetStorage::new(&path)).unwrap();
    assert_eq!(reopened.list(), store.list());
    assert_eq!(reopened.get(watercolor).unwrap().name, "Watercolor");
    assert_eq!(reopened.get(noir).unwrap().text, "black and white, hard shadows, rain");

    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).unwrap();
    }
}

#[test]
fn test_delete_writes_through() {
    let path = temp_file();
    let mut store = PresetStore::open(JsonFilePresetStorage::new(&path)).unwrap();
    let id = store.save("Sketch", "pencil sketch").unwrap();

    let removed = store.delete(id).unwrap();
    assert_eq!(removed.name, "Sketch");
    assert!(matches!(store.delete(id), Err(PresetError::UnknownPreset(missing)) if missing == id));

    let stored = JsonFilePresetStorage::new(&path).load().unwrap();
    assert!(stored.is_empty());

    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).unwrap();
    }
}

#[test]
fn test_corrupt_file_is_reported() {
    let path = temp_file();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).unwrap();
    }
    std::fs::write(&path, "{ not json").unwrap();

    let result = PresetStore::open(JsonFilePresetStorage::new(&path));
    assert!(matches!(result, Err(PresetError::Json(_))));

    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).unwrap();
    }
}
