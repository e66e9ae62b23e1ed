//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::placement::GridSettings;
use crate::scene::CanvasSettings;

pub const DEFAULT_DATA_DIR: &str = "data/floorplans";

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub grid: GridSettings,
    pub canvas: CanvasSettings,
    /// Directory holding `<event_id>.json` floor plans.
    pub data_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            canvas: CanvasSettings::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SEATPLAN_GRID_SIZE`: default 20
    /// - `SEATPLAN_SNAP_TO_GRID`: `true`/`false`, default false
    /// - `SEATPLAN_CANVAS_WIDTH`: default 1200
    /// - `SEATPLAN_CANVAS_HEIGHT`: default 800
    /// - `SEATPLAN_PIXELS_PER_METER`: default 50
    /// - `SEATPLAN_DATA_DIR`: default `data/floorplans`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(v) => Some(v),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary key lookup. Unparsable or out-of-range
    /// values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |v: &f64| v.is_finite() && *v > 0.0;

        let grid = GridSettings {
            enabled: parse_or(&lookup, "SEATPLAN_SNAP_TO_GRID", defaults.grid.enabled, |_| true),
            size: parse_or(&lookup, "SEATPLAN_GRID_SIZE", defaults.grid.size, positive),
        };
        let canvas = CanvasSettings {
            width: parse_or(&lookup, "SEATPLAN_CANVAS_WIDTH", defaults.canvas.width, positive),
            height: parse_or(&lookup, "SEATPLAN_CANVAS_HEIGHT", defaults.canvas.height, positive),
            pixels_per_meter: parse_or(&lookup, "SEATPLAN_PIXELS_PER_METER", defaults.canvas.pixels_per_meter, positive),
        };
        let data_dir = lookup("SEATPLAN_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.data_dir, PathBuf::from);

        Self { grid, canvas, data_dir }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!(key, value = %raw, ?default, "ignoring invalid config value");
            default
        }
    }
}
