//! HTTP broker client.
//!
//! Talks JSON to the terminal's broker server. Calls are one-shot: no retry,
//! no caching. Callers decide what a failure means for the page.

use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BrokerApi, BrokerError};
use crate::domain::{Candle, Instrument, InstrumentSummary, Interval, RobotLog, RobotRef, TradingSchedule};

/// Some endpoints answer with a bare array, others wrap it in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Logs { logs: Vec<T> },
    Candles { candles: Vec<T> },
    Instruments { instruments: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(v)
            | ListBody::Logs { logs: v }
            | ListBody::Candles { candles: v }
            | ListBody::Instruments { instruments: v } => v,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartRobotBody<'a> {
    #[serde(flatten)]
    robot: &'a RobotRef,
    date: NaiveDate,
}

/// Blocking HTTP client for the broker server.
pub struct HttpBroker {
    client: reqwest::blocking::Client,
    base_uri: String,
}

impl HttpBroker {
    pub fn new(server_uri: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let base_uri = normalize_base(server_uri)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_uri })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_uri, path)
    }

    /// GET `path` and return the body text, or `None` on 404.
    fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>, BrokerError> {
        let url = self.url(path);
        debug!(%url, ?query, "broker GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| BrokerError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BrokerError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        resp.text()
            .map(Some)
            .map_err(|e| BrokerError::Malformed(format!("{path}: {e}")))
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), BrokerError> {
        let url = self.url(path);
        debug!(%url, "broker POST");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| BrokerError::Unreachable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BrokerError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
fn normalize_base(server_uri: &str) -> Result<String, BrokerError> {
    let trimmed = server_uri.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(BrokerError::InvalidUri(server_uri.to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse<T: DeserializeOwned>(what: &str, body: &str) -> Result<T, BrokerError> {
    serde_json::from_str(body).map_err(|e| BrokerError::Malformed(format!("{what}: {e}")))
}

/// `null`, `{}` and non-object bodies mean "no such instrument". A body
/// without a `figi` field takes the requested one.
pub(crate) fn parse_instrument(figi: &str, body: &str) -> Result<Option<Instrument>, BrokerError> {
    let mut value: serde_json::Value = parse("instrument", body)?;
    let Some(obj) = value.as_object_mut().filter(|o| !o.is_empty()) else {
        return Ok(None);
    };
    obj.entry("figi").or_insert_with(|| serde_json::Value::String(figi.to_string()));
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| BrokerError::Malformed(format!("instrument: {e}")))
}

pub(crate) fn parse_schedule(body: &str) -> Result<Option<TradingSchedule>, BrokerError> {
    parse::<Option<TradingSchedule>>("trading schedule", body)
}

pub(crate) fn parse_list<T: DeserializeOwned>(what: &str, body: &str) -> Result<Vec<T>, BrokerError> {
    parse::<ListBody<T>>(what, body).map(ListBody::into_vec)
}

impl BrokerApi for HttpBroker {
    fn get_instrument(&self, figi: &str) -> Result<Option<Instrument>, BrokerError> {
        match self.get_text(&format!("/instrument/{figi}"), &[])? {
            Some(body) => parse_instrument(figi, &body),
            None => Ok(None),
        }
    }

    fn list_instruments(&self) -> Result<Vec<InstrumentSummary>, BrokerError> {
        match self.get_text("/instruments", &[])? {
            Some(body) => parse_list("instruments", &body),
            None => Ok(Vec::new()),
        }
    }

    fn get_trading_schedules(
        &self,
        exchange: &str,
        date: NaiveDate,
    ) -> Result<Option<TradingSchedule>, BrokerError> {
        let day = date.format("%Y-%m-%d").to_string();
        let query = [
            ("exchange", exchange.to_string()),
            ("from", day.clone()),
            ("to", day),
        ];
        match self.get_text("/tradingschedules", &query)? {
            Some(body) => parse_schedule(&body),
            None => Ok(None),
        }
    }

    fn get_robot_logs(
        &self,
        name: &str,
        account_id: &str,
        figi: &str,
        timestamp_ms: i64,
    ) -> Result<Vec<RobotLog>, BrokerError> {
        let query = [
            ("name", name.to_string()),
            ("accountId", account_id.to_string()),
            ("figi", figi.to_string()),
            ("date", timestamp_ms.to_string()),
        ];
        match self.get_text("/robots/logs", &query)? {
            Some(body) => parse_list("robot logs", &body),
            None => Ok(Vec::new()),
        }
    }

    fn get_candles(
        &self,
        figi: &str,
        interval: Interval,
        date: NaiveDate,
    ) -> Result<Vec<Candle>, BrokerError> {
        let query = [
            ("figi", figi.to_string()),
            ("interval", interval.api_name().to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        match self.get_text("/candles", &query)? {
            Some(body) => parse_list("candles", &body),
            None => Ok(Vec::new()),
        }
    }

    fn start_robot(&self, robot: &RobotRef, date: NaiveDate) -> Result<(), BrokerError> {
        self.post_json("/robots/start", &StartRobotBody { robot, date })
    }

    fn stop_robot(&self, robot: &RobotRef) -> Result<(), BrokerError> {
        self.post_json("/robots/stop", robot)
    }
}
