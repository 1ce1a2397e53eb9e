//! Core types for the wellbeing pipeline
//!
//! This module defines the data structures that flow through each stage:
//! canonical vitals, sub-signals, the category-risk assessment and the
//! deduction/tip advisory.

use serde::{Deserialize, Serialize};

use crate::recommend::PlaylistRecommendation;
use crate::schema::VitalField;

/// Systolic/diastolic pair in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: i32,
    pub diastolic: i32,
}

impl Default for BloodPressure {
    fn default() -> Self {
        Self {
            systolic: 120,
            diastolic: 80,
        }
    }
}

/// Canonical vitals - every field is a finite number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVitals {
    /// Heart rate (bpm)
    pub heart_rate_bpm: f64,
    /// Stress (0-100)
    pub stress: f64,
    /// Sleep duration (hours)
    pub sleep_hours: f64,
    /// Energy (0-100)
    pub energy: f64,
    pub systolic: i32,
    pub diastolic: i32,
    /// Body temperature (Celsius)
    pub temperature_c: f64,
}

impl Default for CanonicalVitals {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 72.0,
            stress: 40.0,
            sleep_hours: 7.0,
            energy: 60.0,
            systolic: 120,
            diastolic: 80,
            temperature_c: 36.8,
        }
    }
}

/// Canonical vitals plus a record of which fields fell back to defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVitals {
    pub canonical: CanonicalVitals,
    /// Fraction of scored fields that parsed without a fallback (0-1)
    pub coverage: f64,
    /// Fields that used their documented default
    pub defaulted: Vec<VitalField>,
}

/// Readings that actually parsed, without defaults applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedVitals {
    pub heart_rate: Option<f64>,
    pub stress: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub energy: Option<f64>,
    pub bp: Option<BloodPressure>,
    /// Celsius
    pub temperature: Option<f64>,
    pub steps: Option<f64>,
}

/// Normalized sub-signals, each clamped to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSignals {
    /// 0 at 7h+ sleep, 1 at 3h or less
    pub sleep_debt: f64,
    /// 0 at 80 bpm or less, 1 at 120 bpm or more
    pub high_hr: f64,
    pub stress_frac: f64,
    /// 0 at 60% energy or more, 1 at 0%
    pub low_energy: f64,
    pub high_bp: f64,
    pub fever: f64,
}

/// Discrete risk level derived from a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            RiskLevel::High
        } else if score >= 40 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: u8,
    pub level: RiskLevel,
}

impl CategoryScore {
    pub fn new(score: u8) -> Self {
        Self {
            score,
            level: RiskLevel::from_score(score),
        }
    }
}

/// The five fixed assessment categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    pub anxiety: CategoryScore,
    pub depression: CategoryScore,
    pub stress: CategoryScore,
    pub nervous_breakdown: CategoryScore,
    pub self_harm_risk: CategoryScore,
}

impl Categories {
    pub fn scores(&self) -> [u8; 5] {
        [
            self.anxiety.score,
            self.depression.score,
            self.stress.score,
            self.nervous_breakdown.score,
            self.self_harm_risk.score,
        ]
    }
}

/// Category-risk view of a vitals record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub categories: Categories,
    pub overall: CategoryScore,
    /// Insight notes in fixed check order
    pub notes: Vec<String>,
    pub disclaimer: String,
}

/// Tip priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight (higher sorts first)
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// User-facing recommendation with a stable identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub positive: bool,
}

impl Tip {
    pub fn new(id: &str, text: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: id.to_string(),
            text: text.into(),
            priority,
            positive: false,
        }
    }

    pub fn positive(id: &str, text: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            text: text.into(),
            priority: Priority::Low,
            positive: true,
        }
    }
}

/// Machine-readable tags for the conditions an advisory detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WellnessIssue {
    HighHeartRate,
    LowHeartRate,
    InsufficientSleep,
    LowActivity,
    HighStress,
    LowEnergy,
    HighBp,
    ElevatedTemp,
}

/// Wellness status label derived from the advisory score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WellnessStatus {
    #[serde(rename = "Critical - Seek Help")]
    Critical,
    #[serde(rename = "High Risk - Professional Help Recommended")]
    HighRisk,
    #[serde(rename = "Mild Stress Signs")]
    MildStress,
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Excellent")]
    Excellent,
}

impl WellnessStatus {
    pub const ALL: [WellnessStatus; 6] = [
        WellnessStatus::Critical,
        WellnessStatus::HighRisk,
        WellnessStatus::MildStress,
        WellnessStatus::Stable,
        WellnessStatus::Good,
        WellnessStatus::Excellent,
    ];

    pub fn from_score(score: i32) -> Self {
        if score < 40 {
            WellnessStatus::Critical
        } else if score < 50 {
            WellnessStatus::HighRisk
        } else if score < 70 {
            WellnessStatus::MildStress
        } else if score >= 90 {
            WellnessStatus::Excellent
        } else if score >= 80 {
            WellnessStatus::Good
        } else {
            WellnessStatus::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WellnessStatus::Critical => "Critical - Seek Help",
            WellnessStatus::HighRisk => "High Risk - Professional Help Recommended",
            WellnessStatus::MildStress => "Mild Stress Signs",
            WellnessStatus::Stable => "Stable",
            WellnessStatus::Good => "Good",
            WellnessStatus::Excellent => "Excellent",
        }
    }
}

impl std::fmt::Display for WellnessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduction/tip view of a vitals record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryResult {
    /// Starts at 100, reduced by each triggered rule
    pub score: i32,
    pub status: WellnessStatus,
    /// Sorted by priority, generation order within a priority
    pub tips: Vec<Tip>,
    pub issues: Vec<WellnessIssue>,
}

/// Score below which the emergency flow is asked to escalate
pub const ESCALATION_THRESHOLD: i32 = 40;

impl AdvisoryResult {
    /// Auto-escalate condition for the emergency-flow collaborator
    pub fn requires_escalation(&self) -> bool {
        self.score < ESCALATION_THRESHOLD
    }
}

/// Combined output of a stateful processor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessReport {
    pub assessment: AssessmentResult,
    pub advisory: AdvisoryResult,
    pub playlist: PlaylistRecommendation,
    pub escalate: bool,
    /// Ids of tips in this report already marked done
    pub completed_tips: Vec<String>,
}
