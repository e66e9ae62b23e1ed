#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn empty_lookup_yields_defaults() {
    let config = EditorConfig::from_lookup(|_| None);
    assert_eq!(config, EditorConfig::default());
    assert_eq!(config.grid.size, 20.0);
    assert!(!config.grid.enabled);
    assert_eq!(config.canvas.width, 1200.0);
    assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
}

#[test]
fn values_are_parsed() {
    let config = EditorConfig::from_lookup(lookup_from(&[
        ("SEATPLAN_GRID_SIZE", "25"),
        ("SEATPLAN_SNAP_TO_GRID", "true"),
        ("SEATPLAN_CANVAS_WIDTH", "2000"),
        ("SEATPLAN_CANVAS_HEIGHT", " 1500 "),
        ("SEATPLAN_PIXELS_PER_METER", "40"),
        ("SEATPLAN_DATA_DIR", "/tmp/plans"),
    ]));
    assert_eq!(config.grid, GridSettings { enabled: true, size: 25.0 });
    assert_eq!(config.canvas, CanvasSettings { width: 2000.0, height: 1500.0, pixels_per_meter: 40.0 });
    assert_eq!(config.data_dir, PathBuf::from("/tmp/plans"));
}

#[test]
fn invalid_values_fall_back() {
    let config = EditorConfig::from_lookup(lookup_from(&[
        ("SEATPLAN_GRID_SIZE", "-5"),
        ("SEATPLAN_SNAP_TO_GRID", "yes"),
        ("SEATPLAN_CANVAS_WIDTH", "wide"),
        ("SEATPLAN_CANVAS_HEIGHT", "NaN"),
        ("SEATPLAN_PIXELS_PER_METER", "0"),
        ("SEATPLAN_DATA_DIR", "   "),
    ]));
    assert_eq!(config, EditorConfig::default());
}
