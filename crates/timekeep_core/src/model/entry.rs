//! Time-entry record and partial-update patch.
//!
//! # Responsibility
//! - Define the canonical record shape plus its wire (JSON) naming.
//! - Provide patch-merge semantics used by local and remote mutations.
//!
//! # Invariants
//! - `id` is stable and never changed by a patch.
//! - Numeric fields are decoded leniently (number or numeric string) because
//!   peer instances may still hold records written by older clients.
//! - Merging a patch always stamps `updated_at_ms`.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable record identifier, always compared as a string.
pub type EntryId = String;

/// Canonical time-entry record.
///
/// Date and clock fields are opaque display strings; parsing and formatting
/// belong to outer layers. Monetary/duration fields are plain `f64` after the
/// lenient decode at the wire boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    /// Stable id. New local records get a UUID v4 string; ids arriving on
    /// the wire may be numbers and are normalized to strings when decoded.
    pub id: EntryId,
    pub category_id: String,
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub duration: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub earned: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub rate: f64,
    /// Display name of the category, carried alongside `category_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at_ms: Option<i64>,
    #[serde(
        default,
        rename = "updatedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at_ms: Option<i64>,
}

/// Input for a locally-authored record; identity and timestamps are
/// assigned by `TimeEntry::from_draft`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub category_id: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub duration: f64,
    pub earned: f64,
    pub rate: f64,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Partial update for an existing record.
///
/// Numeric fields are kept as raw JSON values so the merge can fall back to
/// the existing value when a peer sends something non-numeric. `id` is
/// deliberately absent: identity is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Validation failures for record write paths.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValidationError {
    BlankId,
    NonFiniteNumber { field: &'static str },
    NegativeNumber { field: &'static str, value: f64 },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "entry id must not be blank"),
            Self::NonFiniteNumber { field } => {
                write!(f, "entry field `{field}` must be a finite number")
            }
            Self::NegativeNumber { field, value } => {
                write!(f, "entry field `{field}` must not be negative, got {value}")
            }
        }
    }
}

impl Error for EntryValidationError {}

impl TimeEntry {
    /// Creates a record from a draft, assigning a fresh UUID v4 id and
    /// stamping creation/update times.
    pub fn from_draft(draft: EntryDraft, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category_id: draft.category_id,
            date: draft.date,
            start: draft.start,
            end: draft.end,
            duration: draft.duration,
            earned: draft.earned,
            rate: draft.rate,
            category: draft.category,
            description: draft.description,
            created_at_ms: Some(now_ms),
            updated_at_ms: Some(now_ms),
        }
    }

    /// Checks the record against core write invariants.
    ///
    /// # Errors
    /// - `BlankId` when `id` is empty or whitespace.
    /// - `NonFiniteNumber` / `NegativeNumber` for `duration`, `earned`, `rate`.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.id.trim().is_empty() {
            return Err(EntryValidationError::BlankId);
        }
        for (field, value) in [
            ("duration", self.duration),
            ("earned", self.earned),
            ("rate", self.rate),
        ] {
            if !value.is_finite() {
                return Err(EntryValidationError::NonFiniteNumber { field });
            }
            if value < 0.0 {
                return Err(EntryValidationError::NegativeNumber { field, value });
            }
        }
        Ok(())
    }

    /// Merges a partial update into this record and stamps `updated_at_ms`.
    ///
    /// Numeric patch fields that are not numbers (and not numeric strings)
    /// leave the existing value untouched instead of corrupting it.
    pub fn apply_patch(&mut self, patch: &EntryPatch, now_ms: i64) {
        if let Some(category_id) = &patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(start) = &patch.start {
            self.start = start.clone();
        }
        if let Some(end) = &patch.end {
            self.end = end.clone();
        }
        if let Some(category) = &patch.category {
            self.category = Some(category.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        self.duration = coerce_number(patch.duration.as_ref(), self.duration);
        self.earned = coerce_number(patch.earned.as_ref(), self.earned);
        self.rate = coerce_number(patch.rate.as_ref(), self.rate);
        self.updated_at_ms = Some(now_ms);
    }
}

/// Resolves a raw JSON patch value against the current number.
///
/// Absent, non-numeric or unparseable values keep the current number.
fn coerce_number(raw: Option<&Value>, current: f64) -> f64 {
    match raw {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(current),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(current),
        _ => current,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match &raw {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of f64 range")),
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("expected numeric value, got `{text}`"))
        }),
        other => Err(serde::de::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{coerce_number, EntryDraft, EntryPatch, EntryValidationError, TimeEntry};
    use serde_json::json;

    fn draft() -> EntryDraft {
        EntryDraft {
            category_id: "cat-1".to_string(),
            date: "2026-08-07".to_string(),
            start: "09:00".to_string(),
            end: "10:30".to_string(),
            duration: 90.0,
            earned: 45.0,
            rate: 30.0,
            category: Some("Writing".to_string()),
            description: None,
        }
    }

    #[test]
    fn from_draft_assigns_identity_and_timestamps() {
        let entry = TimeEntry::from_draft(draft(), 1_700_000_000_000);

        assert!(!entry.id.trim().is_empty());
        assert_eq!(entry.created_at_ms, Some(1_700_000_000_000));
        assert_eq!(entry.updated_at_ms, Some(1_700_000_000_000));
        entry.validate().expect("draft-built entry should be valid");
    }

    #[test]
    fn validate_rejects_blank_id_and_bad_numbers() {
        let mut entry = TimeEntry::from_draft(draft(), 0);
        entry.id = "   ".to_string();
        assert_eq!(entry.validate(), Err(EntryValidationError::BlankId));

        let mut entry = TimeEntry::from_draft(draft(), 0);
        entry.earned = -1.5;
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::NegativeNumber {
                field: "earned",
                value: -1.5,
            })
        );

        let mut entry = TimeEntry::from_draft(draft(), 0);
        entry.rate = f64::NAN;
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::NonFiniteNumber { field: "rate" })
        );
    }

    #[test]
    fn coerce_number_parses_numeric_strings_and_keeps_fallback() {
        assert_eq!(coerce_number(Some(&json!(12.5)), 1.0), 12.5);
        assert_eq!(coerce_number(Some(&json!("33.25")), 1.0), 33.25);
        assert_eq!(coerce_number(Some(&json!("not a number")), 1.0), 1.0);
        assert_eq!(coerce_number(Some(&json!(null)), 1.0), 1.0);
        assert_eq!(coerce_number(None, 1.0), 1.0);
    }

    #[test]
    fn apply_patch_merges_fields_and_stamps_update_time() {
        let mut entry = TimeEntry::from_draft(draft(), 1_000);
        let id_before = entry.id.clone();

        let patch = EntryPatch {
            category_id: Some("cat-2".to_string()),
            earned: Some(json!("50.5")),
            rate: Some(json!(null)),
            description: Some("late edit".to_string()),
            ..EntryPatch::default()
        };
        entry.apply_patch(&patch, 2_000);

        assert_eq!(entry.id, id_before);
        assert_eq!(entry.category_id, "cat-2");
        assert_eq!(entry.earned, 50.5);
        assert_eq!(entry.rate, 30.0);
        assert_eq!(entry.description.as_deref(), Some("late edit"));
        assert_eq!(entry.updated_at_ms, Some(2_000));
    }

    #[test]
    fn entry_decodes_numeric_strings_from_older_clients() {
        let entry: TimeEntry = serde_json::from_value(json!({
            "id": "legacy-1",
            "categoryId": "cat-1",
            "date": "2026-08-07",
            "start": "09:00",
            "end": "10:00",
            "duration": "60",
            "earned": "25.5",
            "rate": 25.5,
        }))
        .expect("lenient numeric decode should succeed");

        assert_eq!(entry.duration, 60.0);
        assert_eq!(entry.earned, 25.5);
        assert_eq!(entry.created_at_ms, None);
    }
}
