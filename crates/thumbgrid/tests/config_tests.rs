//! Integration tests for loading browser configuration from disk.

use std::fs;

use thumbgrid::{BrowserConfig, BrowserError, GridSurface, ImageBrowser};
use thumbgrid_core::Size;

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("browser.toml");
    fs::write(
        &path,
        r#"
refresh_interval_ms = 250
prevent_selection = true
label_text = "Sprite:"
dark_background = true
cell_width = 64.0
cell_height = 72.0
spacing = 2.0
"#,
    )
    .unwrap();

    let config = BrowserConfig::load(&path).unwrap();
    assert_eq!(config.refresh_interval_ms, 250);
    assert!(config.prevent_selection);
    assert_eq!(config.label_text, "Sprite:");
    assert_eq!(config.thumbnail_size, 64);

    let surface = GridSurface::new(Size::new(200.0, 200.0), &config);
    assert_eq!(surface.columns(), 3);

    let browser = ImageBrowser::new(surface, &config);
    assert!(browser.prevent_selection());
    assert_eq!(browser.label_text(), "Sprite:");
    assert!(browser.surface().chrome().dark_background);
}

#[test]
fn test_saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("browser.toml");
    let config = BrowserConfig {
        hide_filter_input: true,
        preview_workers: 3,
        ..Default::default()
    };
    fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(BrowserConfig::load(&path).unwrap(), config);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BrowserConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, BrowserError::ConfigIo { .. }));
}

#[test]
fn test_malformed_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("browser.toml");
    fs::write(&path, "cell_width = [").unwrap();

    let err = BrowserConfig::load(&path).unwrap_err();
    assert!(matches!(err, BrowserError::ConfigParse(_)));
}
