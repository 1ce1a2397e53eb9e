//! Batch decoding for vitals records
//!
//! Producers hand over a single record, a JSON array of records, or
//! newline-delimited records (one per day, as exported by the dashboard).

use serde::Serialize;

use super::record::{VitalField, VitalsRecord};
use crate::error::ComputeError;
use crate::normalizer::Normalizer;

/// Adapter for decoding batches of vitals records
pub struct VitalsRecordAdapter;

impl VitalsRecordAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<VitalsRecord>, ComputeError> {
        let records: Vec<VitalsRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<VitalsRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<VitalsRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Accept any of the supported layouts: an array, a single object, or NDJSON
    pub fn parse_any(input: &str) -> Result<Vec<VitalsRecord>, ComputeError> {
        let trimmed = input.trim();
        if trimmed.starts_with('[') {
            return Self::parse_array(trimmed);
        }

        match serde_json::from_str::<VitalsRecord>(trimmed) {
            Ok(record) => Ok(vec![record]),
            Err(_) => Self::parse_ndjson(trimmed),
        }
    }

    /// Report the fields of each record that would fall back to defaults
    pub fn inspect_records(records: &[VitalsRecord]) -> Vec<RecordInspection> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let normalized = Normalizer::normalize(record);
                RecordInspection {
                    index: idx,
                    coverage: normalized.coverage,
                    defaulted: normalized.defaulted,
                    empty: record.is_empty(),
                }
            })
            .collect()
    }
}

/// Per-record normalization summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordInspection {
    pub index: usize,
    pub coverage: f64,
    pub defaulted: Vec<VitalField>,
    pub empty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let input = "{\"heartRate\": 72}\n\n{\"heartRate\": \"88 bpm\"}\n";
        let records = VitalsRecordAdapter::parse_ndjson(input).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let input = "{\"heartRate\": 72}\n{\"heartRate\": false}\n";
        let err = VitalsRecordAdapter::parse_ndjson(input).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_any_layouts() {
        let single = VitalsRecordAdapter::parse_any(r#"{"bp": "118/76"}"#).unwrap();
        assert_eq!(single.len(), 1);

        let array = VitalsRecordAdapter::parse_any(r#"[{"bp": "118/76"}, {}]"#).unwrap();
        assert_eq!(array.len(), 2);

        let ndjson = VitalsRecordAdapter::parse_any("{\"energy\": 40}\n{\"energy\": 70}").unwrap();
        assert_eq!(ndjson.len(), 2);
    }

    #[test]
    fn test_inspect_records() {
        let records = VitalsRecordAdapter::parse_any(
            r#"[{"heartRate": 72, "stressLevel": "38%", "sleepHours": 7, "energy": 60, "bp": "120/80", "temperature": 36.6}, {}]"#,
        )
        .unwrap();
        let report = VitalsRecordAdapter::inspect_records(&records);

        assert_eq!(report[0].coverage, 1.0);
        assert!(report[0].defaulted.is_empty());
        assert!(!report[0].empty);

        assert_eq!(report[1].coverage, 0.0);
        assert_eq!(report[1].defaulted.len(), 6);
        assert!(report[1].empty);
    }
}
