//! Vitals record definition
//!
//! A vitals record is the producer-supplied reading set for one assessment.
//! No field is required and unknown keys (`ecg`, `date`, ...) are carried
//! through untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::VitalValue;
use crate::error::ComputeError;
use crate::normalizer::FAHRENHEIT_CUTOFF;
use crate::types::CanonicalVitals;

/// Named vitals fields, keyed by their JSON names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VitalField {
    HeartRate,
    StressLevel,
    SleepHours,
    Energy,
    Bp,
    Temperature,
    Steps,
}

impl VitalField {
    /// Fields that feed the category assessment
    pub const SCORED: [VitalField; 6] = [
        VitalField::HeartRate,
        VitalField::StressLevel,
        VitalField::SleepHours,
        VitalField::Energy,
        VitalField::Bp,
        VitalField::Temperature,
    ];

    pub const ALL: [VitalField; 7] = [
        VitalField::HeartRate,
        VitalField::StressLevel,
        VitalField::SleepHours,
        VitalField::Energy,
        VitalField::Bp,
        VitalField::Temperature,
        VitalField::Steps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VitalField::HeartRate => "heartRate",
            VitalField::StressLevel => "stressLevel",
            VitalField::SleepHours => "sleepHours",
            VitalField::Energy => "energy",
            VitalField::Bp => "bp",
            VitalField::Temperature => "temperature",
            VitalField::Steps => "steps",
        }
    }
}

/// Raw vitals record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsRecord {
    /// e.g. `72`, `"72 bpm"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<VitalValue>,
    /// e.g. `38`, `"38%"`, `"Moderate"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<VitalValue>,
    /// e.g. `7.5`, `"7.5 hrs"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<VitalValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<VitalValue>,
    /// `"systolic/diastolic"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp: Option<VitalValue>,
    /// Celsius or Fahrenheit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<VitalValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<VitalValue>,
    /// Keys not used for scoring
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl VitalsRecord {
    /// Parse a single record from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, field: VitalField) -> Option<&VitalValue> {
        match field {
            VitalField::HeartRate => self.heart_rate.as_ref(),
            VitalField::StressLevel => self.stress_level.as_ref(),
            VitalField::SleepHours => self.sleep_hours.as_ref(),
            VitalField::Energy => self.energy.as_ref(),
            VitalField::Bp => self.bp.as_ref(),
            VitalField::Temperature => self.temperature.as_ref(),
            VitalField::Steps => self.steps.as_ref(),
        }
    }

    /// Fields carrying a non-blank reading
    pub fn present_fields(&self) -> Vec<VitalField> {
        VitalField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_some_and(|v| !v.is_blank()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Reject a manual entry that carries no reading at all
    pub fn validate_entry(&self) -> Result<(), ComputeError> {
        if self.is_empty() {
            return Err(ComputeError::EmptyRecord);
        }
        Ok(())
    }

    /// Merge `newer` over this record. Each non-blank reading in `newer` wins.
    pub fn overlay(&self, newer: &VitalsRecord) -> VitalsRecord {
        fn pick(newer: &Option<VitalValue>, base: &Option<VitalValue>) -> Option<VitalValue> {
            match newer {
                Some(value) if !value.is_blank() => Some(value.clone()),
                _ => base.clone(),
            }
        }

        let mut extra = self.extra.clone();
        extra.extend(newer.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        VitalsRecord {
            heart_rate: pick(&newer.heart_rate, &self.heart_rate),
            stress_level: pick(&newer.stress_level, &self.stress_level),
            sleep_hours: pick(&newer.sleep_hours, &self.sleep_hours),
            energy: pick(&newer.energy, &self.energy),
            bp: pick(&newer.bp, &self.bp),
            temperature: pick(&newer.temperature, &self.temperature),
            steps: pick(&newer.steps, &self.steps),
            extra,
        }
    }

    /// Render canonical values with the display units the dashboard shows
    pub fn from_canonical(canonical: &CanonicalVitals) -> Self {
        VitalsRecord {
            heart_rate: Some(format!("{} bpm", canonical.heart_rate_bpm).into()),
            stress_level: Some(format!("{}%", canonical.stress).into()),
            sleep_hours: Some(format!("{} hrs", canonical.sleep_hours).into()),
            energy: Some(format!("{}%", canonical.energy).into()),
            bp: Some(format!("{}/{} mmHg", canonical.systolic, canonical.diastolic).into()),
            temperature: Some(render_temperature(canonical.temperature_c).into()),
            steps: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Celsius above the Fahrenheit cutoff would be re-read as Fahrenheit
fn render_temperature(celsius: f64) -> String {
    if celsius > FAHRENHEIT_CUTOFF {
        format!("{} °F", celsius * 9.0 / 5.0 + 32.0)
    } else {
        format!("{} °C", celsius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LevelLabel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_mixed_record() {
        let record = VitalsRecord::from_json(
            r#"{
                "heartRate": "72 bpm",
                "stressLevel": "Moderate",
                "sleepHours": 6.5,
                "bp": "120/80",
                "ecg": "Normal",
                "temperature": null
            }"#,
        )
        .unwrap();

        assert_eq!(record.heart_rate, Some(VitalValue::Raw("72 bpm".to_string())));
        assert_eq!(record.stress_level, Some(VitalValue::Label(LevelLabel::Moderate)));
        assert_eq!(record.sleep_hours, Some(VitalValue::Numeric(6.5)));
        assert_eq!(record.temperature, None);
        assert_eq!(record.extra.get("ecg"), Some(&serde_json::json!("Normal")));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        assert!(VitalsRecord::from_json("[1, 2, 3]").is_err());
        assert!(VitalsRecord::from_json(r#"{"heartRate": true}"#).is_err());
        assert!(VitalsRecord::from_json(r#"{"bp": {"sys": 120}}"#).is_err());
    }

    #[test]
    fn test_empty_entry_rejected() {
        let record = VitalsRecord::from_json(r#"{"date": "2024-01-15", "bp": ""}"#).unwrap();
        assert!(record.is_empty());
        assert!(matches!(record.validate_entry(), Err(ComputeError::EmptyRecord)));

        let record = VitalsRecord::from_json(r#"{"steps": 4200}"#).unwrap();
        assert!(record.validate_entry().is_ok());
        assert_eq!(record.present_fields(), vec![VitalField::Steps]);
    }

    #[test]
    fn test_overlay_prefers_newer_readings() {
        let base = VitalsRecord::from_json(
            r#"{"heartRate": 72, "sleepHours": 7, "bp": "120/80", "date": "Mon"}"#,
        )
        .unwrap();
        let manual =
            VitalsRecord::from_json(r#"{"heartRate": 98, "bp": "", "energy": "40%"}"#).unwrap();

        let merged = base.overlay(&manual);
        assert_eq!(merged.heart_rate, Some(VitalValue::Numeric(98.0)));
        assert_eq!(merged.sleep_hours, Some(VitalValue::Numeric(7.0)));
        assert_eq!(merged.bp, Some(VitalValue::Raw("120/80".to_string())));
        assert_eq!(merged.energy, Some(VitalValue::Percentage(40.0)));
        assert_eq!(merged.extra.get("date"), Some(&serde_json::json!("Mon")));
    }

    #[test]
    fn test_display_rendering() {
        let record = VitalsRecord::from_canonical(&CanonicalVitals::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["heartRate"], "72 bpm");
        assert_eq!(json["stressLevel"], "40%");
        assert_eq!(json["sleepHours"], "7 hrs");
        assert_eq!(json["bp"], "120/80 mmHg");
        assert_eq!(json["temperature"], "36.8 °C");
        assert!(json.get("steps").is_none());
    }
}
