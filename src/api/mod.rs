// Monitoring service client
//
// The consumed HTTP contract: event polling, aggregate stats, simulator
// controls and the allow/deny rule endpoints. All calls are fire-and-report;
// there is no retry logic here, the polling cadence is the retry.

use crate::telemetry::{EventResponse, ListType, RuleSet, Scenario, StatsResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the monitoring service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service answered HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("service rejected request: {0}")]
    Rejected(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Rule mutation verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Add,
    Remove,
}

/// Generic `{status, message?}` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Deserialize)]
struct RulesUpdateReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    rules: Option<RuleSet>,
}

#[derive(Serialize)]
struct RulesUpdateRequest<'a> {
    action: RuleAction,
    ip: &'a str,
    #[serde(rename = "type")]
    list: ListType,
}

/// Contract of the remote monitoring service
#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Fetch the next analysed event, or the idle marker
    async fn fetch_event(&self) -> ApiResult<EventResponse>;

    /// Fetch aggregate counters and host load
    async fn fetch_stats(&self) -> ApiResult<StatsResponse>;

    async fn set_scenario(&self, scenario: Scenario) -> ApiResult<Ack>;

    /// `threshold` is a fraction in 0..=1
    async fn set_threshold(&self, threshold: f64) -> ApiResult<Ack>;

    async fn set_webhook(&self, url: &str) -> ApiResult<Ack>;

    async fn fetch_rules(&self) -> ApiResult<RuleSet>;

    /// Apply a rule mutation and return the server's canonical rule set
    async fn update_rule(&self, action: RuleAction, ip: &str, list: ListType) -> ApiResult<RuleSet>;
}

/// reqwest-backed implementation of [`TelemetryApi`]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> ApiResult<serde_json::Value> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await?;
        check_status(response.status())?;
        Ok(response.json::<serde_json::Value>().await?)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> ApiResult<serde_json::Value> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        check_status(response.status())?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl TelemetryApi for HttpApi {
    async fn fetch_event(&self) -> ApiResult<EventResponse> {
        let value = self.get_json("/api/simulate").await?;
        Ok(EventResponse::from_json(value)?)
    }

    async fn fetch_stats(&self) -> ApiResult<StatsResponse> {
        let value = self.get_json("/api/stats").await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn set_scenario(&self, scenario: Scenario) -> ApiResult<Ack> {
        let body = serde_json::json!({ "scenario": scenario.as_wire() });
        let value = self.post_json("/api/control/scenario", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn set_threshold(&self, threshold: f64) -> ApiResult<Ack> {
        let body = serde_json::json!({ "threshold": threshold.clamp(0.0, 1.0) });
        let value = self.post_json("/api/control/threshold", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn set_webhook(&self, url: &str) -> ApiResult<Ack> {
        let body = serde_json::json!({ "url": url });
        let value = self.post_json("/api/control/webhook", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_rules(&self) -> ApiResult<RuleSet> {
        let value = self.get_json("/api/rules").await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn update_rule(&self, action: RuleAction, ip: &str, list: ListType) -> ApiResult<RuleSet> {
        let body = RulesUpdateRequest { action, ip, list };
        let value = self.post_json("/api/rules/update", &body).await?;
        decode_rules_update(value)
    }
}

/// Non-2xx replies carry no usable body; keep the status for the log
fn check_status(status: reqwest::StatusCode) -> ApiResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(status))
    }
}

/// Decode a rules-update reply, turning `status != "ok"` into a rejection
fn decode_rules_update(value: serde_json::Value) -> ApiResult<RuleSet> {
    let reply: RulesUpdateReply = serde_json::from_value(value)?;
    match (reply.status.as_str(), reply.rules) {
        ("ok", Some(rules)) => Ok(rules),
        ("ok", None) => Err(ApiError::Rejected("reply carried no rule set".to_string())),
        _ => Err(ApiError::Rejected(
            reply.message.unwrap_or_else(|| "Failed to update rule".to_string()),
        )),
    }
}
