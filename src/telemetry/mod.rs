// Telemetry data model
//
// Wire types consumed from the monitoring service plus the client-side
// stores built from them: the bounded event buffer, chart state and the
// allow/deny rule set.

pub mod buffer;
pub mod chart;
pub mod rules;

pub use buffer::EventRingBuffer;
pub use chart::{ChartPalette, ChartState};
pub use rules::{ListType, RuleSet, RuleStore};

use serde::Deserialize;
use std::collections::HashMap;

/// Ordinal attack-impact classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Default)]
pub enum Severity {
    #[serde(rename = "INFO", alias = "NONE")]
    #[default]
    None,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "CRITICAL")]
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Whether an event came from the simulator or from the live packet feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Origin {
    #[serde(rename = "SIM", alias = "SIMULATED")]
    Simulated,
    #[serde(rename = "REAL", alias = "LIVE")]
    Live,
}

/// Geolocation attached to an event source IP
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat", default)]
    pub latitude: f64,
    #[serde(rename = "lon", default)]
    pub longitude: f64,
    #[serde(default = "unknown")]
    pub city: String,
    #[serde(default = "unknown")]
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl GeoPoint {
    /// True when the service could not resolve a location (reported as 0, 0)
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub fn has_city(&self) -> bool {
        self.city != "Unknown"
    }

    /// "City, Country", or the country alone when the city is unknown
    pub fn label(&self) -> String {
        if self.has_city() {
            format!("{}, {}", self.city, self.country)
        } else {
            self.country.clone()
        }
    }
}

/// Detector verdict for one request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Verdict {
    pub is_attack: bool,
    #[serde(rename = "alert_level", default)]
    pub severity: Severity,
    #[serde(rename = "attack_probability", default)]
    pub probability: f64,
    #[serde(rename = "attack_type", alias = "category", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// One analysed request, immutable once received
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecurityEvent {
    #[serde(default)]
    pub id: Option<u64>,
    pub timestamp: String,
    #[serde(rename = "ip")]
    pub source_ip: String,
    #[serde(rename = "source")]
    pub origin: Origin,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
    #[serde(rename = "result")]
    pub verdict: Verdict,
}

impl SecurityEvent {
    pub fn is_live(&self) -> bool {
        self.origin == Origin::Live
    }

    /// Geo point worth plotting: present and not the (0, 0) placeholder
    pub fn plottable_geo(&self) -> Option<&GeoPoint> {
        self.geo.as_ref().filter(|g| !g.is_null_island())
    }
}

/// Response of the event endpoint: either idle or one event
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    Idle,
    Event(Box<SecurityEvent>),
}

impl EventResponse {
    /// Decode the event endpoint body
    ///
    /// `{"status": "idle"}` is the idle marker; anything else must be an event.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.get("status").and_then(|s| s.as_str()) == Some("idle") {
            return Ok(EventResponse::Idle);
        }
        let event: SecurityEvent = serde_json::from_value(value)?;
        Ok(EventResponse::Event(Box::new(event)))
    }
}

/// Server-side aggregate counters; every field is optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceStats {
    #[serde(default)]
    pub total_requests: Option<u64>,
    #[serde(default)]
    pub attacks_blocked: Option<u64>,
    #[serde(default)]
    pub current_threat_level: Option<String>,
    #[serde(default)]
    pub attack_types: Option<HashMap<String, u64>>,
}

/// Host load reported by the service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemLoad {
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub ram: Option<f64>,
    #[serde(default)]
    pub net: Option<f64>,
}

/// Body of the stats endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub stats: Option<ServiceStats>,
    #[serde(default)]
    pub system: Option<SystemLoad>,
}

/// Plain metric display values, updated field by field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub total_requests: Option<u64>,
    pub attacks_blocked: Option<u64>,
    pub threat_level: Option<String>,
    pub cpu: Option<f64>,
    pub ram: Option<f64>,
    pub net_mbps: Option<f64>,
}

impl Metrics {
    /// Apply the fields present in a stats body; absent fields keep their value
    pub fn apply(&mut self, response: &StatsResponse) {
        if let Some(stats) = &response.stats {
            if let Some(v) = stats.total_requests {
                self.total_requests = Some(v);
            }
            if let Some(v) = stats.attacks_blocked {
                self.attacks_blocked = Some(v);
            }
            if let Some(v) = &stats.current_threat_level {
                self.threat_level = Some(v.clone());
            }
        }
        if let Some(system) = &response.system {
            if let Some(v) = system.cpu {
                self.cpu = Some(v);
            }
            if let Some(v) = system.ram {
                self.ram = Some(v);
            }
            if let Some(v) = system.net {
                self.net_mbps = Some(v);
            }
        }
    }
}

/// Traffic scenario driven by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    #[default]
    Normal,
    Ddos,
    BruteForce,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Normal, Scenario::Ddos, Scenario::BruteForce];

    pub fn as_wire(&self) -> &'static str {
        match self {
            Scenario::Normal => "NORMAL",
            Scenario::Ddos => "DDOS",
            Scenario::BruteForce => "BRUTE_FORCE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Normal => "Normal",
            Scenario::Ddos => "DDoS",
            Scenario::BruteForce => "Brute Force",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a simulated event with a distinct id and IP
    pub fn event(n: u64, severity: Severity, is_attack: bool) -> SecurityEvent {
        SecurityEvent {
            id: Some(n),
            timestamp: format!("12:00:{:02}", n % 60),
            source_ip: format!("203.0.113.{}", n % 256),
            origin: Origin::Simulated,
            geo: Some(GeoPoint {
                latitude: 48.85,
                longitude: 2.35,
                city: "Paris".to_string(),
                country: "France".to_string(),
                region: None,
                isp: None,
            }),
            verdict: Verdict {
                is_attack,
                severity,
                probability: if is_attack { 0.9 } else { 0.1 },
                category: None,
                message: format!("event {}", n),
                emoji: None,
                recommendation: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_idle() {
        let resp = EventResponse::from_json(json!({"status": "idle"})).unwrap();
        assert_eq!(resp, EventResponse::Idle);
    }

    #[test]
    fn test_decode_wire_event() {
        let body = json!({
            "id": 17,
            "timestamp": "14:03:22",
            "ip": "10.0.0.7",
            "source": "SIM",
            "geo": {"country": "United States", "city": "New York (Local)", "lat": 40.71, "lon": -74.0, "isp": "Local Network"},
            "result": {
                "is_attack": true,
                "attack_probability": 0.82,
                "alert_level": "CRITICAL",
                "emoji": "x",
                "message": "CRITICAL ATTACK - 82.0% attack confidence",
                "recommendation": "IMMEDIATE ACTION: Block IP, isolate system, alert team"
            }
        });
        let EventResponse::Event(event) = EventResponse::from_json(body).unwrap() else {
            panic!("expected an event");
        };
        assert_eq!(event.id, Some(17));
        assert_eq!(event.source_ip, "10.0.0.7");
        assert_eq!(event.origin, Origin::Simulated);
        assert_eq!(event.verdict.severity, Severity::Critical);
        assert!(event.verdict.is_attack);
        assert_eq!(event.geo.as_ref().unwrap().isp.as_deref(), Some("Local Network"));
    }

    #[test]
    fn test_decode_info_and_live() {
        let body = json!({
            "timestamp": "00:00:01",
            "ip": "1.2.3.4",
            "source": "REAL",
            "result": {"is_attack": false, "attack_probability": 0.0, "alert_level": "INFO", "message": "ok"}
        });
        let EventResponse::Event(event) = EventResponse::from_json(body).unwrap() else {
            panic!("expected an event");
        };
        assert!(event.is_live());
        assert_eq!(event.verdict.severity, Severity::None);
        assert!(event.geo.is_none());
        assert!(event.plottable_geo().is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_event() {
        assert!(EventResponse::from_json(json!({"status": "ok"})).is_err());
    }

    #[test]
    fn test_geo_label() {
        let mut geo = fixtures::event(1, Severity::Low, false).geo.unwrap();
        assert_eq!(geo.label(), "Paris, France");
        geo.city = "Unknown".to_string();
        assert_eq!(geo.label(), "France");
    }

    #[test]
    fn test_null_island_not_plottable() {
        let mut event = fixtures::event(1, Severity::Low, false);
        if let Some(geo) = event.geo.as_mut() {
            geo.latitude = 0.0;
            geo.longitude = 0.0;
        }
        assert!(event.plottable_geo().is_none());
    }

    #[test]
    fn test_metrics_apply_partial_fields() {
        let mut metrics = Metrics::default();
        let full: StatsResponse = serde_json::from_value(json!({
            "stats": {"total_requests": 10, "attacks_blocked": 3, "current_threat_level": "HIGH"},
            "system": {"cpu": 12.5, "ram": 40.0, "net": 1.25}
        }))
        .unwrap();
        metrics.apply(&full);
        assert_eq!(metrics.total_requests, Some(10));
        assert_eq!(metrics.net_mbps, Some(1.25));

        // Missing fields leave the previous values in place
        let partial: StatsResponse =
            serde_json::from_value(json!({"stats": {"total_requests": 11}})).unwrap();
        metrics.apply(&partial);
        assert_eq!(metrics.total_requests, Some(11));
        assert_eq!(metrics.attacks_blocked, Some(3));
        assert_eq!(metrics.threat_level.as_deref(), Some("HIGH"));
        assert_eq!(metrics.cpu, Some(12.5));
    }

    #[test]
    fn test_stats_without_stats_field() {
        let resp: StatsResponse = serde_json::from_value(json!({"recent_logs": []})).unwrap();
        assert!(resp.stats.is_none());
        let mut metrics = Metrics::default();
        metrics.apply(&resp);
        assert_eq!(metrics, Metrics::default());
    }
}
