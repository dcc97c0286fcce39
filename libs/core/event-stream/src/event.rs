//! Platform event model
//!
//! An `Event` is one entry of the events stream: the kind of occurrence, the
//! tenant it comes from and the identifiers of the entities involved.

use crate::error::StreamError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use strum::EnumString;

/// Kind of platform event.
///
/// Names the consumer does not know yet parse into `Unknown` so that new
/// producers never break the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum EventKind {
    TransferCommitted,
    TransferRejected,
    TransferPending,
    MemberJoined,
    MemberRequested,
    GroupActivated,
    GroupRequested,
    #[strum(default)]
    Unknown(String),
}

impl EventKind {
    /// Parse an event name as written by the producers.
    pub fn from_name(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| EventKind::Unknown(name.to_string()))
    }

    /// The wire name of this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::TransferCommitted => "TransferCommitted",
            Self::TransferRejected => "TransferRejected",
            Self::TransferPending => "TransferPending",
            Self::MemberJoined => "MemberJoined",
            Self::MemberRequested => "MemberRequested",
            Self::GroupActivated => "GroupActivated",
            Self::GroupRequested => "GroupRequested",
            Self::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A platform event read from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Stream entry ID (e.g. "1700000000000-0"), only used to acknowledge
    pub id: String,

    pub kind: EventKind,

    /// Base URL of the tenant's accounting API that emitted the event
    pub source: String,

    /// Tenant (group) code
    pub code: String,

    pub time: DateTime<Utc>,

    /// Entity identifiers ("payer", "payee", "transfer", "member", ...)
    pub data: HashMap<String, String>,

    /// ID of the user that triggered the event, empty for system events
    pub user: String,
}

impl Event {
    /// Create an event with no data, stamped now.
    pub fn new(
        id: impl Into<String>,
        kind: EventKind,
        source: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            code: code.into(),
            time: Utc::now(),
            data: HashMap::new(),
            user: String::new(),
        }
    }

    /// Builder method to add an entity identifier.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Get an entity identifier, `""` when absent.
    pub fn data(&self, key: &str) -> &str {
        self.data.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Build an event from the fields of a stream entry.
    ///
    /// `time` must be RFC 3339. `data` must be a JSON object when present;
    /// non-string values inside it are dropped.
    pub fn from_entry(id: &str, fields: &HashMap<String, String>) -> Result<Self, StreamError> {
        let field = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let time = fields
            .get("time")
            .ok_or_else(|| StreamError::malformed(id, "missing time"))
            .and_then(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| StreamError::malformed(id, format!("invalid time: {}", e)))
            })?;

        let data = match fields.get("data") {
            Some(raw) => parse_data(id, raw)?,
            None => HashMap::new(),
        };

        Ok(Self {
            id: id.to_string(),
            kind: EventKind::from_name(&field("name")),
            source: field("source"),
            code: field("code"),
            time,
            data,
            user: field("user"),
        })
    }
}

fn parse_data(id: &str, raw: &str) -> Result<HashMap<String, String>, StreamError> {
    let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
        .map_err(|e| StreamError::malformed(id, format!("invalid data: {}", e)))?;

    Ok(parsed
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key, s)),
            _ => None,
        })
        .collect())
}
