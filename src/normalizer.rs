//! Vitals normalization
//!
//! This module resolves loosely-typed readings into canonical numbers.
//! - Every `observe_*` function returns the reading only if it parsed
//! - Every `parse_*` function is total and substitutes a documented default
//! - Fahrenheit temperatures are detected heuristically and converted
//!
//! The observe layer is shared by both scoring views: the assessment works on
//! canonical values, the advisory on observed ones.

use crate::schema::{LevelLabel, VitalField, VitalValue, VitalsRecord};
use crate::types::{BloodPressure, CanonicalVitals, NormalizedVitals, ObservedVitals};

pub const DEFAULT_HEART_RATE: f64 = 72.0;
pub const DEFAULT_STRESS: f64 = 40.0;
pub const DEFAULT_SLEEP_HOURS: f64 = 7.0;
pub const DEFAULT_ENERGY: f64 = 60.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 36.8;

/// Readings above this are taken to be Fahrenheit
pub(crate) const FAHRENHEIT_CUTOFF: f64 = 45.0;

/// Normalizer for converting raw records to canonical vitals
pub struct Normalizer;

impl Normalizer {
    /// Resolve a record into canonical values, recording each fallback
    pub fn normalize(record: &VitalsRecord) -> NormalizedVitals {
        let observed = Self::observe(record);
        let mut defaulted = Vec::new();

        let heart_rate_bpm = or_default(
            observed.heart_rate,
            DEFAULT_HEART_RATE,
            VitalField::HeartRate,
            &mut defaulted,
        );
        let stress = or_default(
            observed.stress.map(clamp_percent),
            DEFAULT_STRESS,
            VitalField::StressLevel,
            &mut defaulted,
        );
        let sleep_hours = or_default(
            observed.sleep_hours,
            DEFAULT_SLEEP_HOURS,
            VitalField::SleepHours,
            &mut defaulted,
        );
        let energy = or_default(
            observed.energy.map(clamp_percent),
            DEFAULT_ENERGY,
            VitalField::Energy,
            &mut defaulted,
        );
        let bp = observed.bp.unwrap_or_else(|| {
            tracing::debug!(field = "bp", "vitals reading absent or unparsable; using 120/80");
            defaulted.push(VitalField::Bp);
            BloodPressure::default()
        });
        let temperature_c = or_default(
            observed.temperature,
            DEFAULT_TEMPERATURE_C,
            VitalField::Temperature,
            &mut defaulted,
        );

        let scored = VitalField::SCORED.len();
        let coverage = (scored - defaulted.len()) as f64 / scored as f64;

        NormalizedVitals {
            canonical: CanonicalVitals {
                heart_rate_bpm,
                stress,
                sleep_hours,
                energy,
                systolic: bp.systolic,
                diastolic: bp.diastolic,
                temperature_c,
            },
            coverage,
            defaulted,
        }
    }

    /// Resolve only the readings that parsed
    pub fn observe(record: &VitalsRecord) -> ObservedVitals {
        ObservedVitals {
            heart_rate: observe_heart_rate(record.heart_rate.as_ref()),
            stress: observe_stress(record.stress_level.as_ref()),
            sleep_hours: observe_sleep_hours(record.sleep_hours.as_ref()),
            energy: observe_energy(record.energy.as_ref()),
            bp: observe_bp(record.bp.as_ref()),
            temperature: observe_temperature(record.temperature.as_ref()),
            steps: observe_steps(record.steps.as_ref()),
        }
    }
}

fn or_default(
    observed: Option<f64>,
    default: f64,
    field: VitalField,
    defaulted: &mut Vec<VitalField>,
) -> f64 {
    observed.unwrap_or_else(|| {
        tracing::debug!(
            field = field.as_str(),
            default,
            "vitals reading absent or unparsable; using default"
        );
        defaulted.push(field);
        default
    })
}

/// Heart rate in bpm; default 72
pub fn parse_heart_rate(value: Option<&VitalValue>) -> f64 {
    observe_heart_rate(value).unwrap_or(DEFAULT_HEART_RATE)
}

/// Stress on a 0-100 scale; default 40
pub fn parse_stress(value: Option<&VitalValue>) -> f64 {
    observe_stress(value).map(clamp_percent).unwrap_or(DEFAULT_STRESS)
}

/// Sleep duration in hours; default 7
pub fn parse_sleep_hours(value: Option<&VitalValue>) -> f64 {
    observe_sleep_hours(value).unwrap_or(DEFAULT_SLEEP_HOURS)
}

/// Energy on a 0-100 scale; default 60
pub fn parse_energy(value: Option<&VitalValue>) -> f64 {
    observe_energy(value).map(clamp_percent).unwrap_or(DEFAULT_ENERGY)
}

/// Blood pressure; each side falls back independently to 120/80
pub fn parse_bp(value: Option<&VitalValue>) -> BloodPressure {
    observe_bp(value).unwrap_or_default()
}

/// Temperature in Celsius; default 36.8
pub fn parse_temperature(value: Option<&VitalValue>) -> f64 {
    observe_temperature(value).unwrap_or(DEFAULT_TEMPERATURE_C)
}

pub fn observe_heart_rate(value: Option<&VitalValue>) -> Option<f64> {
    value.and_then(VitalValue::as_number)
}

pub fn observe_stress(value: Option<&VitalValue>) -> Option<f64> {
    observe_level(value, |label| match label {
        LevelLabel::Low => 20.0,
        LevelLabel::Moderate => 50.0,
        LevelLabel::High => 80.0,
    })
}

pub fn observe_sleep_hours(value: Option<&VitalValue>) -> Option<f64> {
    value.and_then(VitalValue::as_number)
}

pub fn observe_energy(value: Option<&VitalValue>) -> Option<f64> {
    observe_level(value, |label| match label {
        LevelLabel::Low => 25.0,
        LevelLabel::Moderate => 55.0,
        LevelLabel::High => 80.0,
    })
}

pub fn observe_steps(value: Option<&VitalValue>) -> Option<f64> {
    value.and_then(VitalValue::as_number)
}

/// Percentage-style reading (stress, energy), unclamped.
///
/// Unit-suffixed text without a `%` is only read for a level word.
fn observe_level(value: Option<&VitalValue>, level: fn(LevelLabel) -> f64) -> Option<f64> {
    match value? {
        VitalValue::Numeric(n) | VitalValue::Percentage(n) => Some(*n).filter(|n| n.is_finite()),
        VitalValue::Label(label) => Some(level(*label)),
        VitalValue::Raw(text) if text.contains('%') => None,
        VitalValue::Raw(text) => LevelLabel::detect(text).map(level),
    }
}

fn clamp_percent(n: f64) -> f64 {
    n.clamp(0.0, 100.0)
}

pub fn observe_bp(value: Option<&VitalValue>) -> Option<BloodPressure> {
    let (systolic, diastolic) = match value? {
        VitalValue::Numeric(n) | VitalValue::Percentage(n) => {
            (Some(*n).filter(|n| n.is_finite()).map(|n| n as i32), None)
        }
        VitalValue::Label(_) => (None, None),
        VitalValue::Raw(text) => split_bp(text),
    };

    if systolic.is_none() && diastolic.is_none() {
        return None;
    }

    let fallback = BloodPressure::default();
    Some(BloodPressure {
        systolic: systolic.unwrap_or(fallback.systolic),
        diastolic: diastolic.unwrap_or(fallback.diastolic),
    })
}

fn split_bp(text: &str) -> (Option<i32>, Option<i32>) {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '/')
        .collect();
    let mut parts = cleaned.split('/');
    let systolic = parts.next().and_then(|p| p.parse::<i32>().ok());
    let diastolic = parts.next().and_then(|p| p.parse::<i32>().ok());
    (systolic, diastolic)
}

pub fn observe_temperature(value: Option<&VitalValue>) -> Option<f64> {
    let value = value?;
    let n = value.as_number()?;
    let marked_fahrenheit = value
        .text()
        .is_some_and(|text| text.to_lowercase().contains('f'));

    if marked_fahrenheit || n > FAHRENHEIT_CUTOFF {
        Some(fahrenheit_to_celsius(n))
    } else {
        Some(n)
    }
}

fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Numeric text under the shared cleaning rule, for callers holding plain strings
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    crate::schema::parse_number(text)
}

/// Cleaned form of `text` (digits, `.`, `/`, `-` only)
pub fn clean_numeric_text(text: &str) -> String {
    crate::schema::clean_numeric(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(text: &str) -> VitalValue {
        VitalValue::from(text)
    }

    #[test]
    fn test_heart_rate() {
        assert_eq!(parse_heart_rate(Some(&VitalValue::Numeric(72.0))), 72.0);
        assert_eq!(parse_heart_rate(Some(&v("88 bpm"))), 88.0);
        assert_eq!(parse_heart_rate(Some(&v("high"))), 72.0);
        assert_eq!(parse_heart_rate(Some(&v("118/76"))), 72.0);
        assert_eq!(parse_heart_rate(None), 72.0);
    }

    #[test]
    fn test_stress_encodings() {
        assert_eq!(parse_stress(None), 40.0);
        assert_eq!(parse_stress(Some(&v("38%"))), 38.0);
        assert_eq!(parse_stress(Some(&v("140%"))), 100.0);
        assert_eq!(parse_stress(Some(&v("abc%"))), 40.0);
        assert_eq!(parse_stress(Some(&v("Low"))), 20.0);
        assert_eq!(parse_stress(Some(&v("Moderate"))), 50.0);
        assert_eq!(parse_stress(Some(&v("medium"))), 50.0);
        assert_eq!(parse_stress(Some(&v("HIGH"))), 80.0);
        assert_eq!(parse_stress(Some(&v("calm"))), 40.0);
        assert_eq!(parse_stress(Some(&VitalValue::Numeric(38.0))), 38.0);
        assert_eq!(parse_stress(Some(&VitalValue::Numeric(-5.0))), 0.0);
    }

    #[test]
    fn test_stress_unit_text_reads_level_word() {
        assert_eq!(parse_stress(Some(&v("38"))), 40.0);
        assert_eq!(parse_stress(Some(&v("high (8/10)"))), 80.0);
    }

    #[test]
    fn test_energy_labels() {
        assert_eq!(parse_energy(None), 60.0);
        assert_eq!(parse_energy(Some(&v("Low"))), 25.0);
        assert_eq!(parse_energy(Some(&v("medium"))), 55.0);
        assert_eq!(parse_energy(Some(&v("High"))), 80.0);
        assert_eq!(parse_energy(Some(&v("65%"))), 65.0);
    }

    #[test]
    fn test_sleep_hours() {
        assert_eq!(parse_sleep_hours(Some(&v("7.5 hrs"))), 7.5);
        assert_eq!(parse_sleep_hours(Some(&v("7/8"))), 7.0);
        assert_eq!(parse_sleep_hours(Some(&v(""))), 7.0);
        assert_eq!(parse_sleep_hours(Some(&VitalValue::Numeric(5.0))), 5.0);
    }

    #[test]
    fn test_blood_pressure() {
        let default = BloodPressure::default();
        assert_eq!(parse_bp(None), default);
        assert_eq!(parse_bp(Some(&v(""))), default);
        assert_eq!(
            parse_bp(Some(&v("118 / 76"))),
            BloodPressure { systolic: 118, diastolic: 76 }
        );
        assert_eq!(
            parse_bp(Some(&v("150/95 mmHg"))),
            BloodPressure { systolic: 150, diastolic: 95 }
        );
        assert_eq!(
            parse_bp(Some(&v("135"))),
            BloodPressure { systolic: 135, diastolic: 80 }
        );
        assert_eq!(
            parse_bp(Some(&v("/92"))),
            BloodPressure { systolic: 120, diastolic: 92 }
        );
        assert_eq!(parse_bp(Some(&v("high"))), default);
    }

    #[test]
    fn test_temperature() {
        assert_eq!(parse_temperature(None), 36.8);
        assert_eq!(parse_temperature(Some(&v("36.8 °C"))), 36.8);
        assert!((parse_temperature(Some(&v("101f"))) - 38.333).abs() < 0.01);
        assert!((parse_temperature(Some(&v("98.6°F"))) - 37.0).abs() < 0.01);
        assert!((parse_temperature(Some(&VitalValue::Numeric(100.4))) - 38.0).abs() < 0.01);
        assert_eq!(parse_temperature(Some(&VitalValue::Numeric(37.6))), 37.6);
        assert_eq!(parse_temperature(Some(&v("fever"))), 36.8);
    }

    #[test]
    fn test_canonical_numbers_are_idempotent() {
        assert_eq!(parse_heart_rate(Some(&VitalValue::Numeric(72.0))), 72.0);
        assert_eq!(parse_sleep_hours(Some(&VitalValue::Numeric(7.5))), 7.5);
        assert_eq!(parse_energy(Some(&VitalValue::Numeric(65.0))), 65.0);
        assert_eq!(parse_temperature(Some(&VitalValue::Numeric(36.8))), 36.8);
    }

    #[test]
    fn test_normalize_records_fallbacks() {
        let record = VitalsRecord::from_json(
            r#"{"heartRate": "72 bpm", "stressLevel": "38%", "bp": "n/a"}"#,
        )
        .unwrap();
        let normalized = Normalizer::normalize(&record);

        assert_eq!(normalized.canonical.heart_rate_bpm, 72.0);
        assert_eq!(normalized.canonical.stress, 38.0);
        assert_eq!(
            normalized.defaulted,
            vec![
                VitalField::SleepHours,
                VitalField::Energy,
                VitalField::Bp,
                VitalField::Temperature
            ]
        );
        assert!((normalized.coverage - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_record_is_all_defaults() {
        let normalized = Normalizer::normalize(&VitalsRecord::default());
        assert_eq!(normalized.canonical, CanonicalVitals::default());
        assert_eq!(normalized.coverage, 0.0);
    }

    #[test]
    fn test_display_round_trip() {
        let canonical = CanonicalVitals {
            heart_rate_bpm: 84.5,
            stress: 62.0,
            sleep_hours: 5.25,
            energy: 33.0,
            systolic: 138,
            diastolic: 91,
            temperature_c: 37.9,
        };
        let rendered = VitalsRecord::from_canonical(&canonical);
        let normalized = Normalizer::normalize(&rendered);
        assert_eq!(normalized.canonical, canonical);
        assert!(normalized.defaulted.is_empty());
    }

    #[test]
    fn test_display_round_trip_above_fahrenheit_cutoff() {
        let record = VitalsRecord::from_json(r#"{"temperature": "114 F"}"#).unwrap();
        let canonical = Normalizer::normalize(&record).canonical;
        assert!(canonical.temperature_c > FAHRENHEIT_CUTOFF);

        let rendered = VitalsRecord::from_canonical(&canonical);
        let reparsed = Normalizer::normalize(&rendered).canonical;
        assert!((reparsed.temperature_c - canonical.temperature_c).abs() < 1e-9);
    }

    #[test]
    fn test_observe_keeps_out_of_range_levels() {
        let record = VitalsRecord::from_json(r#"{"stressLevel": "140%", "energy": -5}"#).unwrap();
        let observed = Normalizer::observe(&record);
        assert_eq!(observed.stress, Some(140.0));
        assert_eq!(observed.energy, Some(-5.0));

        let canonical = Normalizer::normalize(&record).canonical;
        assert_eq!(canonical.stress, 100.0);
        assert_eq!(canonical.energy, 0.0);
    }

    #[test]
    fn test_observe_keeps_absent_fields_empty() {
        let record = VitalsRecord::from_json(r#"{"steps": "4,200 steps", "sleepHours": 6}"#).unwrap();
        let observed = Normalizer::observe(&record);
        assert_eq!(observed.steps, Some(4200.0));
        assert_eq!(observed.sleep_hours, Some(6.0));
        assert_eq!(observed.heart_rate, None);
        assert_eq!(observed.bp, None);
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(clean_numeric_text("118 / 76 mmHg"), "118/76");
        assert_eq!(parse_numeric_text("72 bpm"), Some(72.0));
    }
}
