//! WebAssembly module for the weather override platform
//!
//! Provides client-side computation for:
//! - Merging an override onto a baseline snapshot
//! - Weather code to icon mapping
//! - Daily reduction of an hourly forecast
//! - Cache freshness checks

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::forecast::*;
pub use shared::merge::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("weather-override-wasm loaded"));
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

/// Merge an override record (or `null`) onto a baseline snapshot.
///
/// Returns the merged view as JSON: `{ snapshot, provenance }`.
#[wasm_bindgen]
pub fn merge_override(baseline_json: &str, record_json: &str) -> Result<String, JsValue> {
    let baseline: WeatherSnapshot =
        serde_json::from_str(baseline_json).map_err(|e| js_error("Invalid snapshot JSON", e))?;
    let record: Option<OverrideRecord> =
        serde_json::from_str(record_json).map_err(|e| js_error("Invalid override JSON", e))?;

    let view = merge(&baseline, record.as_ref());
    serde_json::to_string(&view).map_err(|e| js_error("Serialization failed", e))
}

/// Icon code for a WMO weather code
#[wasm_bindgen]
pub fn condition_for_code(code: i32) -> String {
    WeatherCondition::from_wmo_code(code).icon_code().to_string()
}

/// Human readable label for an icon code, if known
#[wasm_bindgen]
pub fn condition_label(icon_code: &str) -> Option<String> {
    WeatherCondition::from_icon_code(icon_code).map(|c| c.label().to_string())
}

/// Reduce a provider hourly series to the snapshot for `date` (YYYY-MM-DD)
#[wasm_bindgen]
pub fn summarize_hourly(hourly_json: &str, date: &str) -> Result<String, JsValue> {
    let series: HourlySeries =
        serde_json::from_str(hourly_json).map_err(|e| js_error("Invalid hourly JSON", e))?;
    let date = parse_calendar_date(date).map_err(|e| js_error("Invalid date", e))?;
    let snapshot = summarize_day(&series, date).map_err(|e| js_error("No forecast", e))?;
    serde_json::to_string(&snapshot).map_err(|e| js_error("Serialization failed", e))
}

/// Whether a snapshot fetched at `fetched_at_ms` may still be served at `now_ms`
#[wasm_bindgen]
pub fn is_snapshot_fresh(fetched_at_ms: f64, now_ms: f64) -> bool {
    let window_ms = (FRESHNESS_WINDOW_MINUTES * 60 * 1000) as f64;
    now_ms - fetched_at_ms < window_ms
}

fn parse_override_values(values_json: &str) -> Result<SnapshotPatch, String> {
    let patch: SnapshotPatch = serde_json::from_str(values_json)
        .map_err(|e| format!("Invalid values JSON: {}", e))?;
    validate_patch(&patch).map_err(|e| format!("Invalid override: {}", e))?;
    Ok(patch)
}

/// Validate an override patch before sending it
#[wasm_bindgen]
pub fn check_override_values(values_json: &str) -> Result<(), JsValue> {
    parse_override_values(values_json)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e))
}

/// Current time in milliseconds, for use with [`is_snapshot_fresh`]
#[wasm_bindgen]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
