//! Pipeline orchestration
//!
//! This module provides the public API for the wellbeing engine. It runs a raw
//! vitals record through normalization and both scoring views.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::recommend::PlaylistRecommendation;
use crate::schema::VitalsRecord;
use crate::scoring::{AdvisoryEngine, AssessmentScorer};
use crate::state::{EscalationRecord, ProcessorState, WellnessSnapshot};
use crate::types::{AdvisoryResult, AssessmentResult, WellnessReport};

/// Category-risk assessment of a single record
pub fn assess(record: &VitalsRecord) -> AssessmentResult {
    AssessmentScorer::assess(record)
}

/// Deduction/tip advisory of a single record
pub fn advise(record: &VitalsRecord) -> AdvisoryResult {
    AdvisoryEngine::advise(record)
}

/// Convert a raw vitals JSON object to an assessment JSON object.
///
/// # Example
/// ```ignore
/// let json = vitals_to_assessment(r#"{"heartRate": "72 bpm"}"#.to_string())?;
/// ```
pub fn vitals_to_assessment(raw_json: String) -> Result<String, ComputeError> {
    let record = VitalsRecord::from_json(&raw_json)?;
    let result = assess(&record);
    serde_json::to_string(&result).map_err(|e| ComputeError::EncodingError(e.to_string()))
}

/// Convert a raw vitals JSON object to an advisory JSON object.
pub fn vitals_to_advisory(raw_json: String) -> Result<String, ComputeError> {
    let record = VitalsRecord::from_json(&raw_json)?;
    let result = advise(&record);
    serde_json::to_string(&result).map_err(|e| ComputeError::EncodingError(e.to_string()))
}

/// Stateful processor that remembers the last snapshot, the tip checklist and
/// any pending escalation across runs.
pub struct WellbeingProcessor {
    state: ProcessorState,
    instance_id: Uuid,
}

impl Default for WellbeingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl WellbeingProcessor {
    /// Create a processor with empty state
    pub fn new() -> Self {
        Self {
            state: ProcessorState::default(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Create a processor resuming from existing state
    pub fn with_state(state: ProcessorState) -> Self {
        Self {
            state,
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn with_instance_id(mut self, instance_id: Uuid) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    /// Load state from JSON
    pub fn load_state(&mut self, json: &str) -> Result<(), ComputeError> {
        self.state =
            ProcessorState::from_json(json).map_err(|e| ComputeError::StateError(e.to_string()))?;
        if let Some(escalation) = &self.state.escalation {
            tracing::warn!(
                score = escalation.score,
                raised_at = %escalation.raised_at,
                "loaded state with a pending escalation"
            );
        }
        Ok(())
    }

    /// Save state to JSON
    pub fn save_state(&self) -> Result<String, ComputeError> {
        self.state
            .to_json()
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Score a record with both views and record the result
    pub fn report(&mut self, record: &VitalsRecord) -> WellnessReport {
        self.report_at(record, Utc::now())
    }

    pub fn report_at(&mut self, record: &VitalsRecord, now: DateTime<Utc>) -> WellnessReport {
        let assessment = assess(record);
        let advisory = advise(record);
        let playlist = PlaylistRecommendation::for_score(Some(advisory.score));

        let escalate = advisory.requires_escalation();
        if escalate && self.state.escalation.is_none() {
            tracing::info!(score = advisory.score, "raising escalation");
            self.state.escalation = Some(EscalationRecord {
                score: advisory.score,
                raised_at: now,
            });
        }

        let completed_tips = self.state.checklist.completed_in(&advisory.tips);
        self.state.last_snapshot = Some(WellnessSnapshot::from_advisory(
            &advisory,
            now,
            &self.instance_id.to_string(),
        ));

        WellnessReport {
            assessment,
            advisory,
            playlist,
            escalate,
            completed_tips,
        }
    }

    /// Mark a tip as done or not done
    pub fn set_tip_completed(&mut self, tip_id: &str, completed: bool) {
        self.state.checklist.set_completed(tip_id, completed);
    }

    /// Drop a pending escalation once the emergency flow has handled it
    pub fn clear_escalation(&mut self) -> Option<EscalationRecord> {
        self.state.escalation.take()
    }

    /// Playlist for the last recorded score
    pub fn playlist(&self) -> PlaylistRecommendation {
        PlaylistRecommendation::for_score(self.state.last_score())
    }
}
