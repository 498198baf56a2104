use pretty_assertions::assert_eq;
use segue_infra_storage_fs::FsStorage;
use segue_ports::storage::{PlaybackConfig, StorageError, StoragePort};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("segue-{name}-{nanos}"))
}

#[test]
fn missing_config_yields_defaults() {
    let storage = FsStorage::new(temp_dir("missing"));
    let config = storage.load_config().expect("load ok");

    assert_eq!(config, PlaybackConfig::default());
    assert_eq!(config.poll_interval_ms, 200);
    assert_eq!(config.lookahead_window_ms, 1500);
    assert_eq!(config.tick_denominator, 1024);
}

#[test]
fn config_save_load_roundtrip() {
    let dir = temp_dir("roundtrip");
    let storage = FsStorage::new(dir.clone());
    let config = PlaybackConfig {
        default_bpm: 72.0,
        lookahead_window_ms: 900,
        default_instrument: "marimba".to_string(),
        ..PlaybackConfig::default()
    };

    storage.save_config(&config).expect("save ok");
    assert_eq!(storage.load_config().expect("load ok"), config);
    assert!(storage.config_path().exists());
    assert!(!dir.join("config.json.tmp").exists());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn partial_config_fills_in_defaults() {
    let dir = temp_dir("partial");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("config.json"), br#"{ "poll_interval_ms": 50 }"#).expect("write");

    let config = FsStorage::new(dir.clone()).load_config().expect("load ok");
    assert_eq!(config.poll_interval_ms, 50);
    assert_eq!(config.cursor_lead_ms, 40);
    assert_eq!(config.default_instrument, "acoustic_grand_piano");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_config_is_an_error() {
    let dir = temp_dir("corrupt");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("config.json"), b"{ not json").expect("write");

    let result = FsStorage::new(dir.clone()).load_config();
    assert!(matches!(result, Err(StorageError::Serde(_))));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn save_creates_missing_directories() {
    let root = temp_dir("nested");
    let storage = FsStorage::new(root.join("a").join("b"));

    storage.save_config(&PlaybackConfig::default()).expect("save ok");
    assert_eq!(storage.dir(), root.join("a").join("b").as_path());
    assert_eq!(storage.load_config().expect("load ok"), PlaybackConfig::default());

    let _ = fs::remove_dir_all(root);
}
