//! Simulated sensor and vessel samples.
//!
//! The dashboard demo has no real ingestion; these generators produce
//! plausible readings for the reef monitoring stations and the research
//! fleet. Every function takes the RNG by argument so tests can seed it.

use rand::Rng;
use serde_json::{json, Value};

/// Monitoring stations the environmental feed cycles through.
const STATIONS: &[&str] = &[
    "outer-reef-01",
    "lagoon-03",
    "channel-buoy-07",
    "shelf-edge-12",
];

/// Research vessels reporting positions.
const VESSELS: &[&str] = &["RV Coral Sky", "RV Tidecaller", "RV Southern Drift"];

/// Temperature above which a threshold alert is raised (°C).
const TEMPERATURE_ALERT_THRESHOLD: f64 = 27.5;

/// Latest environmental readings for one station.
pub fn environmental_reading(rng: &mut impl Rng) -> Value {
    let station = STATIONS[rng.random_range(0..STATIONS.len())];
    json!({
        "stationId": station,
        "temperatureC": round2(rng.random_range(21.0..29.0)),
        "salinityPsu": round2(rng.random_range(33.5..36.5)),
        "ph": round2(rng.random_range(7.9..8.3)),
        "dissolvedOxygenMgL": round2(rng.random_range(5.5..8.5)),
        "turbidityNtu": round2(rng.random_range(0.1..4.0)),
        "depthMeters": round2(rng.random_range(4.0..40.0)),
        "recordedAt": chrono::Utc::now().to_rfc3339(),
    })
}

/// Current position report for one research vessel.
pub fn vessel_position(rng: &mut impl Rng) -> Value {
    let vessel = VESSELS[rng.random_range(0..VESSELS.len())];
    json!({
        "vesselName": vessel,
        "latitude": round4(rng.random_range(-18.9..-16.1)),
        "longitude": round4(rng.random_range(145.2..147.3)),
        "headingDegrees": rng.random_range(0..360),
        "speedKnots": round2(rng.random_range(0.0..12.0)),
        "updatedAt": chrono::Utc::now().to_rfc3339(),
    })
}

/// Threshold alert for a reading, if any of its values warrant one.
pub fn threshold_alert(reading: &Value) -> Option<Value> {
    let temperature = reading["temperatureC"].as_f64()?;
    if temperature <= TEMPERATURE_ALERT_THRESHOLD {
        return None;
    }
    Some(json!({
        "severity": "warning",
        "parameter": "temperatureC",
        "value": temperature,
        "threshold": TEMPERATURE_ALERT_THRESHOLD,
        "stationId": reading["stationId"],
        "message": format!(
            "water temperature {temperature}°C above {TEMPERATURE_ALERT_THRESHOLD}°C threshold"
        ),
    }))
}

/// Backend status payload.
pub fn system_status(connections: usize, active_jobs: usize) -> Value {
    json!({
        "status": "operational",
        "connections": connections,
        "activeTrainingJobs": active_jobs,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
