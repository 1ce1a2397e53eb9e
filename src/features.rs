//! Sub-signal derivation
//!
//! This module maps canonical vitals onto normalized [0, 1] sub-signals:
//! - Sleep debt and low energy (deficits below a healthy floor)
//! - High heart rate, high blood pressure and fever (excess above a ceiling)
//! - Stress fraction

use crate::types::{CanonicalVitals, SubSignals};

/// Feature deriver for computing sub-signals
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive sub-signals from canonical vitals
    pub fn derive(vitals: &CanonicalVitals) -> SubSignals {
        SubSignals {
            sleep_debt: compute_sleep_debt(vitals),
            high_hr: compute_high_hr(vitals),
            stress_frac: vitals.stress / 100.0,
            low_energy: compute_low_energy(vitals),
            high_bp: compute_high_bp(vitals),
            fever: compute_fever(vitals),
        }
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// 7h or more is no debt, 3h or less is full debt
fn compute_sleep_debt(vitals: &CanonicalVitals) -> f64 {
    clamp01((7.0 - vitals.sleep_hours) / 4.0)
}

/// 80-120 bpm maps onto 0..1
fn compute_high_hr(vitals: &CanonicalVitals) -> f64 {
    clamp01((vitals.heart_rate_bpm - 80.0) / 40.0)
}

/// 60% energy or more is 0, 0% is 1
fn compute_low_energy(vitals: &CanonicalVitals) -> f64 {
    clamp01((60.0 - vitals.energy) / 60.0)
}

/// Mean of systolic excess over 130 (per 30 mmHg) and diastolic excess over 85 (per 20 mmHg)
fn compute_high_bp(vitals: &CanonicalVitals) -> f64 {
    let systolic = (f64::from(vitals.systolic) - 130.0) / 30.0;
    let diastolic = (f64::from(vitals.diastolic) - 85.0) / 20.0;
    clamp01((systolic + diastolic) / 2.0)
}

fn compute_fever(vitals: &CanonicalVitals) -> f64 {
    clamp01((vitals.temperature_c - 37.5) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals(heart_rate_bpm: f64, sleep_hours: f64, energy: f64) -> CanonicalVitals {
        CanonicalVitals {
            heart_rate_bpm,
            sleep_hours,
            energy,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_produce_no_excess() {
        let signals = FeatureDeriver::derive(&CanonicalVitals::default());
        assert_eq!(signals.sleep_debt, 0.0);
        assert_eq!(signals.high_hr, 0.0);
        assert_eq!(signals.low_energy, 0.0);
        assert_eq!(signals.high_bp, 0.0);
        assert_eq!(signals.fever, 0.0);
        assert!((signals.stress_frac - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_sleep_debt_range() {
        assert_eq!(FeatureDeriver::derive(&vitals(72.0, 9.0, 60.0)).sleep_debt, 0.0);
        assert_eq!(FeatureDeriver::derive(&vitals(72.0, 5.0, 60.0)).sleep_debt, 0.5);
        assert_eq!(FeatureDeriver::derive(&vitals(72.0, 1.0, 60.0)).sleep_debt, 1.0);
    }

    #[test]
    fn test_high_hr_range() {
        assert_eq!(FeatureDeriver::derive(&vitals(110.0, 7.0, 60.0)).high_hr, 0.75);
        assert_eq!(FeatureDeriver::derive(&vitals(150.0, 7.0, 60.0)).high_hr, 1.0);
    }

    #[test]
    fn test_low_energy() {
        let signals = FeatureDeriver::derive(&vitals(72.0, 7.0, 30.0));
        assert_eq!(signals.low_energy, 0.5);
        let signals = FeatureDeriver::derive(&vitals(72.0, 7.0, 0.0));
        assert_eq!(signals.low_energy, 1.0);
    }

    #[test]
    fn test_high_bp_and_fever() {
        let signals = FeatureDeriver::derive(&CanonicalVitals {
            systolic: 145,
            diastolic: 95,
            temperature_c: 38.5,
            ..Default::default()
        });
        assert_eq!(signals.high_bp, 0.5);
        assert_eq!(signals.fever, 0.5);
    }

    #[test]
    fn test_signals_stay_in_unit_interval() {
        let extreme = CanonicalVitals {
            heart_rate_bpm: 400.0,
            stress: 100.0,
            sleep_hours: -3.0,
            energy: -50.0,
            systolic: 300,
            diastolic: 200,
            temperature_c: 45.0,
        };
        let signals = FeatureDeriver::derive(&extreme);
        for value in [
            signals.sleep_debt,
            signals.high_hr,
            signals.stress_frac,
            signals.low_energy,
            signals.high_bp,
            signals.fever,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
