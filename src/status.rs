//! Domain model for homework review states, plus the validation and
//! extraction pipeline that turns the untrusted remote payload into a
//! typed [`Submission`].

use crate::error::WatchError;
use serde_json::Value;
use std::str::FromStr;

/// Review state of a submission. The set is closed: the remote API
/// documents exactly these three wire strings, and anything else is a
/// hard error rather than a silently skipped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    /// Fixed human-readable verdict shown to the user. Total over the enum.
    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// One validated homework entry. `raw` keeps the untouched wire object so
/// unknown fields survive for debugging; nothing downstream reads it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub status: ReviewStatus,
    pub raw: serde_json::Map<String, Value>,
}

/// Normalized shape of one poll response. Entries stay loosely typed
/// here; [`latest`] types the one entry that matters.
#[derive(Debug, Clone, Default)]
pub struct StatusFeed {
    pub submissions: Vec<Value>,
    pub cursor: Option<u64>,
}

/// Validates the top-level shape of the remote payload.
///
/// The `homeworks` key must be present and be an array — an empty array is
/// a valid "no submissions yet" response. `current_date` is optional; a
/// present but non-conforming value is tolerated (the caller keeps its
/// previous cursor) since continuing to poll beats failing on an optional
/// field.
pub fn validate(raw: &Value) -> Result<StatusFeed, WatchError> {
    let Some(object) = raw.as_object() else {
        return Err(WatchError::MalformedResponse(
            "top-level value is not an object".into(),
        ));
    };

    let submissions = match object.get("homeworks") {
        None | Some(Value::Null) => {
            return Err(WatchError::MalformedResponse(
                "homeworks key is absent or null".into(),
            ));
        }
        Some(Value::Array(entries)) => entries.clone(),
        Some(other) => {
            return Err(WatchError::MalformedResponse(format!(
                "homeworks is not an array (got {other})"
            )));
        }
    };

    let cursor = match object.get("current_date") {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64() {
            Some(ts) => Some(ts),
            None => {
                tracing::warn!("ignoring non-integer current_date: {value}");
                None
            }
        },
    };

    Ok(StatusFeed { submissions, cursor })
}

/// Selects the current submission from a validated feed.
///
/// The remote API returns entries newest-first, so the first element is
/// the one to report. An empty feed means "nothing to report this cycle",
/// not an error.
pub fn latest(feed: &StatusFeed) -> Result<Option<Submission>, WatchError> {
    let Some(entry) = feed.submissions.first() else {
        return Ok(None);
    };

    let raw = entry
        .as_object()
        .ok_or_else(|| WatchError::MalformedResponse("homework entry is not an object".into()))?;

    let status_str = raw
        .get("status")
        .and_then(Value::as_str)
        .ok_or(WatchError::MissingField("status"))?;
    let status = ReviewStatus::from_str(status_str)
        .map_err(|_| WatchError::UndocumentedStatus(status_str.to_string()))?;

    let name = raw
        .get("homework_name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or(WatchError::MissingField("homework_name"))?;

    Ok(Some(Submission {
        name: name.to_string(),
        status,
        raw: raw.clone(),
    }))
}

/// Composes the status-change announcement. Pure; no failure path.
pub fn format_status_change(submission: &Submission) -> String {
    format!(
        "Изменился статус проверки работы \"{}\". {}",
        submission.name,
        submission.status.verdict()
    )
}
