//! Admin log entries and validation of incoming entry requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LogError, LogResult};

/// One immutable administrative action, as stored on disk.
///
/// ```json
/// {"actorUserId": 7, "targetUserId": null, "action": "ban", "details": "", "timestamp": 1000}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub actor_user_id: i64,
    pub target_user_id: Option<i64>,
    pub action: String,
    pub details: String,
    pub timestamp: i64,
}

impl LogEntry {
    pub fn new(actor_user_id: i64, action: impl Into<String>, timestamp: i64) -> Self {
        Self {
            actor_user_id,
            target_user_id: None,
            action: action.into(),
            details: String::new(),
            timestamp,
        }
    }

    pub fn with_target(mut self, target_user_id: i64) -> Self {
        self.target_user_id = Some(target_user_id);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

/// An entry as received from a caller, before validation.
///
/// Fields hold raw JSON so that numeric strings and floats sent by game
/// clients can be coerced the same way on every path. `null` and a missing
/// field are treated alike.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryRequest {
    #[serde(default)]
    pub actor_user_id: Option<Value>,
    #[serde(default)]
    pub target_user_id: Option<Value>,
    #[serde(default)]
    pub action: Option<Value>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl LogEntryRequest {
    /// Validate and coerce into a [`LogEntry`].
    ///
    /// - `actorUserId`, `timestamp`: required, numeric (integers, floats
    ///   truncated toward zero, or numeric strings)
    /// - `action`: required and not empty-like (`""`, `"0"`, `0`, `false`)
    /// - `targetUserId`: optional, coerced to an integer without rejection
    /// - `details`: optional, defaults to `""`
    ///
    /// Booleans stringify as `"1"` and `""`. Arrays and objects are only
    /// accepted as a target.
    pub fn validate(&self) -> LogResult<LogEntry> {
        let actor_user_id = match &self.actor_user_id {
            Some(value) => coerce_int("actorUserId", value)?,
            None => return Err(LogError::invalid("actorUserId", "missing")),
        };

        let action = match &self.action {
            Some(value) if is_empty_like(value) => {
                return Err(LogError::invalid("action", "must not be empty"))
            }
            Some(value) => coerce_string("action", value)?,
            None => return Err(LogError::invalid("action", "missing")),
        };

        let timestamp = match &self.timestamp {
            Some(value) => coerce_int("timestamp", value)?,
            None => return Err(LogError::invalid("timestamp", "missing")),
        };

        let target_user_id = self.target_user_id.as_ref().map(lenient_int);

        let details = match &self.details {
            Some(value) => coerce_string("details", value)?,
            None => String::new(),
        };

        Ok(LogEntry {
            actor_user_id,
            target_user_id,
            action,
            details,
            timestamp,
        })
    }
}

impl From<LogEntry> for LogEntryRequest {
    fn from(entry: LogEntry) -> Self {
        Self {
            actor_user_id: Some(entry.actor_user_id.into()),
            target_user_id: entry.target_user_id.map(Value::from),
            action: Some(entry.action.into()),
            details: Some(entry.details.into()),
            timestamp: Some(entry.timestamp.into()),
        }
    }
}

fn coerce_int(field: &'static str, value: &Value) -> LogResult<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Err(LogError::invalid(field, format!("{n} is out of range")))
            } else {
                n.as_f64()
                    .and_then(truncate)
                    .ok_or_else(|| LogError::invalid(field, format!("{n} is out of range")))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(truncate)
                .ok_or_else(|| LogError::invalid(field, format!("{s:?} is not numeric")))
        }
        other => Err(LogError::invalid(
            field,
            format!("expected a number, found {other}"),
        )),
    }
}

fn truncate(f: f64) -> Option<i64> {
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

fn coerce_string(field: &'static str, value: &Value) -> LogResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) | Value::Null => Ok(String::new()),
        other => Err(LogError::invalid(
            field,
            format!("expected a string, found {other}"),
        )),
    }
}

/// Values a game client sends to mean "nothing": `""`, `"0"`, zero, `false`,
/// and empty collections.
fn is_empty_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Best-effort integer for optional fields. Never fails: non-numeric input
/// becomes `0`, out-of-range numbers saturate.
fn lenient_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i,
            (None, Some(_)) => i64::MAX,
            // `as` truncates toward zero and saturates.
            (None, None) => n.as_f64().map_or(0, |f| f as i64),
        },
        Value::String(s) => leading_int(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(fields) => i64::from(!fields.is_empty()),
    }
}

/// Integer value of the optionally signed digit run at the start of `s`.
fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return 0;
    }

    let magnitude = &rest[..digits];
    let parsed = if negative {
        format!("-{magnitude}").parse::<i64>()
    } else {
        magnitude.parse::<i64>()
    };
    match parsed {
        Ok(i) => i,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}
