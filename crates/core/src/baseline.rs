//! Baseline records and incoming baseline candidates.
//!
//! A baseline is the anchor date from which the next inspection of one type
//! is computed for one vehicle. There is at most one baseline per
//! (vehicle, inspection type) pair; later resolutions update it in place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp, VehicleId};

// ---------------------------------------------------------------------------
// Source constants
// ---------------------------------------------------------------------------

/// An inspection of this type was just completed.
pub const SOURCE_COMPLETION: &str = "completion";
/// Vehicle acquisition date.
pub const SOURCE_PURCHASE: &str = "purchase";
/// Human override.
pub const SOURCE_MANUAL: &str = "manual";
/// Default or fallback value supplied by the system.
pub const SOURCE_SYSTEM: &str = "system";

/// All valid source strings.
pub const VALID_SOURCES: &[&str] = &[
    SOURCE_COMPLETION,
    SOURCE_PURCHASE,
    SOURCE_MANUAL,
    SOURCE_SYSTEM,
];

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

/// Date format accepted for candidate base dates.
pub const BASE_DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where a baseline date came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    Completion,
    Purchase,
    #[default]
    Manual,
    System,
}

impl BaselineSource {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            SOURCE_COMPLETION => Ok(Self::Completion),
            SOURCE_PURCHASE => Ok(Self::Purchase),
            SOURCE_MANUAL => Ok(Self::Manual),
            SOURCE_SYSTEM => Ok(Self::System),
            _ => Err(format!(
                "Invalid baseline source '{s}'. Must be one of: {}",
                VALID_SOURCES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completion => SOURCE_COMPLETION,
            Self::Purchase => SOURCE_PURCHASE,
            Self::Manual => SOURCE_MANUAL,
            Self::System => SOURCE_SYSTEM,
        }
    }

    /// Trust rank used for conflict resolution. Higher wins.
    ///
    /// `manual` > `completion` > `purchase` > `system`.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Manual => 3,
            Self::Completion => 2,
            Self::Purchase => 1,
            Self::System => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The resolved baseline for one (vehicle, inspection type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub vehicle_id: VehicleId,
    pub inspection_type_id: DbId,
    pub base_date: NaiveDate,
    pub source: BaselineSource,
    pub notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BaselineRecord {
    /// The (vehicle, inspection type) key this record is stored under.
    pub fn key(&self) -> (&str, DbId) {
        (&self.vehicle_id, self.inspection_type_id)
    }
}

/// A validated write to the baseline store. Timestamps are assigned by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineUpsert {
    pub vehicle_id: VehicleId,
    pub inspection_type_id: DbId,
    pub base_date: NaiveDate,
    pub source: BaselineSource,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// An incoming baseline update as received from a bulk payload.
///
/// Every field is optional so that a malformed entry still deserializes and
/// can be skipped on its own instead of rejecting the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineCandidate {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub inspection_type_id: Option<DbId>,
    /// Calendar date in `YYYY-MM-DD` form.
    #[serde(default)]
    pub base_date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Set when the raw payload could not be read as a candidate at all.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl BaselineCandidate {
    /// Read a candidate from an arbitrary JSON value.
    ///
    /// Never fails: a payload with wrongly typed fields yields a candidate
    /// marked as malformed, which [`Self::to_upsert`] then rejects.
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| Self {
            malformed: Some(e.to_string()),
            ..Self::default()
        })
    }

    /// Validate the candidate and turn it into a store write.
    ///
    /// `source` defaults to `manual` and `notes` to the empty string.
    pub fn to_upsert(&self) -> Result<BaselineUpsert, CoreError> {
        if let Some(reason) = &self.malformed {
            return Err(CoreError::Validation(format!("malformed candidate: {reason}")));
        }

        let vehicle_id = self
            .vehicle_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::Validation("vehicle_id is required".to_string()))?;

        let inspection_type_id = self
            .inspection_type_id
            .ok_or_else(|| CoreError::Validation("inspection_type_id is required".to_string()))?;

        let raw_date = self
            .base_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| CoreError::Validation("base_date is required".to_string()))?;
        let base_date = parse_base_date(raw_date)?;

        let source = match self.source.as_deref().map(str::trim) {
            None | Some("") => BaselineSource::default(),
            Some(s) => BaselineSource::from_str_value(s).map_err(CoreError::Validation)?,
        };

        Ok(BaselineUpsert {
            vehicle_id: vehicle_id.to_string(),
            inspection_type_id,
            base_date,
            source,
            notes: self.notes.clone().unwrap_or_default(),
        })
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_base_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw, BASE_DATE_FORMAT).map_err(|e| {
        CoreError::Validation(format!(
            "base_date '{raw}' is not a valid calendar date (expected YYYY-MM-DD): {e}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn candidate() -> BaselineCandidate {
        BaselineCandidate {
            vehicle_id: Some("V1".to_string()),
            inspection_type_id: Some(7),
            base_date: Some("2024-06-01".to_string()),
            source: Some("completion".to_string()),
            notes: None,
            malformed: None,
        }
    }

    // -----------------------------------------------------------------------
    // Source
    // -----------------------------------------------------------------------

    #[test]
    fn source_round_trips_through_str() {
        for s in VALID_SOURCES {
            assert_eq!(BaselineSource::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn unknown_source_rejected() {
        let err = BaselineSource::from_str_value("imported").unwrap_err();
        assert!(err.contains("imported"));
    }

    #[test]
    fn priority_order() {
        assert!(BaselineSource::Manual.priority() > BaselineSource::Completion.priority());
        assert!(BaselineSource::Completion.priority() > BaselineSource::Purchase.priority());
        assert!(BaselineSource::Purchase.priority() > BaselineSource::System.priority());
    }

    // -----------------------------------------------------------------------
    // Candidate validation
    // -----------------------------------------------------------------------

    #[test]
    fn valid_candidate_converts() {
        let upsert = candidate().to_upsert().unwrap();
        assert_eq!(upsert.vehicle_id, "V1");
        assert_eq!(upsert.inspection_type_id, 7);
        assert_eq!(upsert.base_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(upsert.source, BaselineSource::Completion);
        assert_eq!(upsert.notes, "");
    }

    #[test]
    fn source_and_notes_default() {
        let c = BaselineCandidate {
            source: None,
            notes: None,
            ..candidate()
        };
        let upsert = c.to_upsert().unwrap();
        assert_eq!(upsert.source, BaselineSource::Manual);
        assert!(upsert.notes.is_empty());
    }

    #[test]
    fn long_vehicle_id_and_multibyte_notes_accepted() {
        let notes = "台車点検、異常なし。".repeat(300);
        let c = BaselineCandidate {
            vehicle_id: Some("V".repeat(65)),
            notes: Some(notes.clone()),
            ..candidate()
        };
        let upsert = c.to_upsert().unwrap();
        assert_eq!(upsert.vehicle_id.len(), 65);
        assert!(upsert.notes.len() > 2_000);
        assert_eq!(upsert.notes, notes);
    }

    #[test]
    fn missing_vehicle_rejected() {
        let c = BaselineCandidate {
            vehicle_id: Some("   ".to_string()),
            ..candidate()
        };
        assert_matches!(
            c.to_upsert(),
            Err(CoreError::Validation(msg)) if msg.contains("vehicle_id")
        );
    }

    #[test]
    fn missing_inspection_type_rejected() {
        let c = BaselineCandidate {
            inspection_type_id: None,
            ..candidate()
        };
        assert_matches!(c.to_upsert(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn missing_base_date_rejected() {
        let c = BaselineCandidate {
            base_date: None,
            ..candidate()
        };
        assert_matches!(
            c.to_upsert(),
            Err(CoreError::Validation(msg)) if msg.contains("base_date")
        );
    }

    #[test]
    fn impossible_date_rejected() {
        let c = BaselineCandidate {
            base_date: Some("2024-02-31".to_string()),
            ..candidate()
        };
        assert_matches!(c.to_upsert(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unknown_source_in_candidate_rejected() {
        let c = BaselineCandidate {
            source: Some("guess".to_string()),
            ..candidate()
        };
        assert_matches!(c.to_upsert(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn partial_payload_reads_and_fails_validation() {
        let c = BaselineCandidate::from_json(serde_json::json!({"vehicle_id": "V9"}));
        assert_eq!(c.vehicle_id.as_deref(), Some("V9"));
        assert!(c.malformed.is_none());
        assert_matches!(c.to_upsert(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn wrongly_typed_payload_is_marked_malformed() {
        let c = BaselineCandidate::from_json(serde_json::json!({
            "vehicle_id": "V9",
            "inspection_type_id": "seven",
            "base_date": "2024-01-01"
        }));
        assert!(c.malformed.is_some());
        assert_matches!(
            c.to_upsert(),
            Err(CoreError::Validation(msg)) if msg.starts_with("malformed")
        );
    }

    #[test]
    fn non_object_payload_is_marked_malformed() {
        let c = BaselineCandidate::from_json(serde_json::json!(42));
        assert!(c.malformed.is_some());
    }
}
