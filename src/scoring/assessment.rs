//! Category-risk assessment
//!
//! Each category is `round(100 * weighted sum)` over sub-signals, with the
//! weights of a category summing to 1.0. Heuristic support only, not a
//! diagnosis.

use crate::features::FeatureDeriver;
use crate::normalizer::Normalizer;
use crate::schema::VitalsRecord;
use crate::types::{AssessmentResult, CanonicalVitals, Categories, CategoryScore, SubSignals};

/// Appended to every assessment
pub const DISCLAIMER: &str = "Heuristic wellbeing assessment from vitals for support only. \
Not medical advice or diagnosis. If you are in crisis or considering self-harm, \
seek immediate help or contact local emergency services.";

const NOTE_STRESS: &str = "Elevated stress indicated by vitals.";
const NOTE_SLEEP: &str = "Sleep duration appears low (<6h).";
const NOTE_HEART_RATE: &str = "Resting heart rate is high.";
const NOTE_BLOOD_PRESSURE: &str = "Blood pressure is elevated.";
const NOTE_ENERGY: &str = "Reported energy is very low.";

/// Scorer producing the category-risk view
pub struct AssessmentScorer;

impl AssessmentScorer {
    /// Normalize a raw record and score it
    pub fn assess(record: &VitalsRecord) -> AssessmentResult {
        let normalized = Normalizer::normalize(record);
        tracing::debug!(
            coverage = normalized.coverage,
            defaulted = normalized.defaulted.len(),
            "normalized vitals record"
        );
        let result = Self::score(&normalized.canonical);
        tracing::debug!(
            overall = result.overall.score,
            level = result.overall.level.as_str(),
            "scored vitals record"
        );
        result
    }

    /// Score canonical vitals
    pub fn score(vitals: &CanonicalVitals) -> AssessmentResult {
        let signals = FeatureDeriver::derive(vitals);
        let categories = compute_categories(&signals);

        let total: u32 = categories.scores().iter().map(|s| u32::from(*s)).sum();
        let overall = CategoryScore::new(round_score(f64::from(total) / 5.0));

        AssessmentResult {
            categories,
            overall,
            notes: compute_notes(vitals),
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

fn compute_categories(s: &SubSignals) -> Categories {
    let anxiety = weighted(&[
        (0.45, s.stress_frac),
        (0.35, s.high_hr),
        (0.20, s.sleep_debt),
    ]);
    let depression = weighted(&[
        (0.50, s.low_energy),
        (0.30, s.sleep_debt),
        (0.20, s.stress_frac),
    ]);
    let stress = weighted(&[
        (0.60, s.stress_frac),
        (0.25, s.high_bp),
        (0.15, s.fever),
    ]);
    let nervous_breakdown = weighted(&[
        (0.50, s.stress_frac),
        (0.30, s.sleep_debt),
        (0.20, s.high_hr),
    ]);
    // Built on the rounded depression score, not the raw sub-signals.
    let self_harm_risk = weighted(&[
        (0.45, f64::from(depression) / 100.0),
        (0.35, s.stress_frac),
        (0.20, s.sleep_debt),
    ]);

    Categories {
        anxiety: CategoryScore::new(anxiety),
        depression: CategoryScore::new(depression),
        stress: CategoryScore::new(stress),
        nervous_breakdown: CategoryScore::new(nervous_breakdown),
        self_harm_risk: CategoryScore::new(self_harm_risk),
    }
}

fn weighted(terms: &[(f64, f64)]) -> u8 {
    let sum: f64 = terms.iter().map(|(weight, signal)| weight * signal).sum();
    round_score(100.0 * sum)
}

fn round_score(x: f64) -> u8 {
    x.round().clamp(0.0, 100.0) as u8
}

fn compute_notes(vitals: &CanonicalVitals) -> Vec<String> {
    let checks = [
        (vitals.stress >= 70.0, NOTE_STRESS),
        (vitals.sleep_hours < 6.0, NOTE_SLEEP),
        (vitals.heart_rate_bpm > 100.0, NOTE_HEART_RATE),
        (
            vitals.systolic >= 140 || vitals.diastolic >= 90,
            NOTE_BLOOD_PRESSURE,
        ),
        (vitals.energy <= 30.0, NOTE_ENERGY),
    ];

    checks
        .into_iter()
        .filter(|(triggered, _)| *triggered)
        .map(|(_, note)| note.to_string())
        .collect()
}
