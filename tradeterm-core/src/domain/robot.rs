use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of a trading robot's log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RobotLog {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
}

/// Identifies a robot session on the broker server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RobotRef {
    pub name: String,
    pub account_id: String,
    pub figi: String,
}
