use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::goal::{Goal, GoalStore};
use crate::record::ShiftRecord;
use crate::store::RecordStore;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("malformed backup payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Full-dataset backup. Older payloads without a goals array still
/// import; the records array is mandatory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackupPayload {
    pub version: String,
    pub exported_at: String,
    pub records: Vec<ShiftRecord>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub records: usize,
    pub goals: usize,
}

pub fn export(records: &[ShiftRecord], goals: Vec<Goal>, exported_at: String) -> BackupPayload {
    BackupPayload {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at,
        records: records.to_vec(),
        goals,
    }
}

/// Validates a raw backup without touching any store.
pub fn parse(raw: &str) -> Result<BackupPayload, BackupError> {
    Ok(serde_json::from_str(raw)?)
}

/// All-or-nothing import: the payload is parsed and validated in full
/// before either store is mutated, so a malformed payload leaves the
/// existing data untouched.
pub fn restore(
    raw: &str,
    records: &mut RecordStore,
    goals: &mut GoalStore,
) -> Result<ImportSummary, BackupError> {
    let payload = parse(raw)?;
    let summary = ImportSummary {
        records: payload.records.len(),
        goals: payload.goals.len(),
    };
    records.replace_all(payload.records);
    goals.replace_all(payload.goals);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{derive_record, tests::sample_input};

    fn record(date: &str, total_sales: u64) -> ShiftRecord {
        let mut input = sample_input(date, "18:00", "23:00");
        input.total_sales = total_sales;
        derive_record(input)
    }

    #[test]
    fn malformed_payload_leaves_stores_untouched() {
        let mut records = RecordStore::new();
        let mut goals = GoalStore::new();
        records.append(record("2024-03-05", 10_000));
        goals.upsert(Goal {
            month: "2024-03".into(),
            ..Goal::default()
        });

        let result = restore(r#"{"records": "not a sequence"}"#, &mut records, &mut goals);
        assert!(result.is_err());
        assert_eq!(records.len(), 1);
        assert_eq!(goals.len(), 1);
    }

    #[test]
    fn round_trip_replaces_both_stores() {
        let payload = export(
            &[record("2024-03-05", 10_000), record("2024-04-01", 5_000)],
            vec![Goal {
                month: "2024-03".into(),
                monthly_sales: 25_000,
                ..Goal::default()
            }],
            "2024-04-02T00:00:00Z".into(),
        );
        let raw = serde_json::to_string(&payload).unwrap();

        let mut records = RecordStore::new();
        let mut goals = GoalStore::new();
        records.append(record("2020-01-01", 1));

        let summary = restore(&raw, &mut records, &mut goals).expect("valid payload");
        assert_eq!(summary, ImportSummary { records: 2, goals: 1 });
        assert_eq!(records.len(), 2);
        assert_eq!(records.all()[0].date.to_string(), "2024-03-05");
        assert!(goals.find_by_month("2024-03").is_some());
    }

    #[test]
    fn missing_goals_array_defaults_to_empty() {
        let raw = r#"{"version":"0.2.2","exported_at":"2024-04-02T00:00:00Z","records":[]}"#;
        let payload = parse(raw).expect("goals are optional");
        assert!(payload.goals.is_empty());
    }
}
