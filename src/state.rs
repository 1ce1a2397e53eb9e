//! Caller-owned wellness state
//!
//! Scoring is pure; whatever must survive between runs (the last snapshot,
//! the tip checklist, a pending escalation) lives here and is handed back
//! and forth by the caller as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::types::{AdvisoryResult, Tip, WellnessStatus};

/// Key/value storage keys used by the dashboard
pub const LAST_SCORE_KEY: &str = "mindsync_last_wellness_score";
pub const LAST_TIPS_KEY: &str = "mindsync_last_wellness_tips";
pub const LAST_STATUS_KEY: &str = "mindsync_last_wellness_status";
pub const COMPLETED_TIPS_KEY: &str = "mindsync_completed_tips";
pub const CRITICAL_SCORE_KEY: &str = "mindsync_critical_score";
pub const CRITICAL_TIMESTAMP_KEY: &str = "mindsync_critical_timestamp";

/// The `{score, tips, status}` triple reused across pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessSnapshot {
    pub score: i32,
    pub tips: Vec<Tip>,
    pub status: WellnessStatus,
    pub computed_at: DateTime<Utc>,
    /// Processor instance that produced the snapshot
    pub producer_instance: String,
}

impl WellnessSnapshot {
    pub fn from_advisory(
        advisory: &AdvisoryResult,
        computed_at: DateTime<Utc>,
        producer_instance: &str,
    ) -> Self {
        Self {
            score: advisory.score,
            tips: advisory.tips.clone(),
            status: advisory.status,
            computed_at,
            producer_instance: producer_instance.to_string(),
        }
    }

    /// Entries for a string key/value store, values JSON-encoded
    pub fn storage_entries(&self) -> Result<Vec<(&'static str, String)>, ComputeError> {
        Ok(vec![
            (LAST_SCORE_KEY, serde_json::to_string(&self.score)?),
            (LAST_TIPS_KEY, serde_json::to_string(&self.tips)?),
            (LAST_STATUS_KEY, self.status.as_str().to_string()),
        ])
    }
}

/// Ids of tips the user has ticked off, in the order they were ticked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipChecklist {
    completed: Vec<String>,
}

impl TipChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_completed(&mut self, tip_id: &str, completed: bool) {
        let position = self.completed.iter().position(|id| id == tip_id);
        match (completed, position) {
            (true, None) => self.completed.push(tip_id.to_string()),
            (false, Some(idx)) => {
                self.completed.remove(idx);
            }
            _ => {}
        }
    }

    pub fn is_completed(&self, tip_id: &str) -> bool {
        self.completed.iter().any(|id| id == tip_id)
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Completed ids among `tips`, in tip order
    pub fn completed_in(&self, tips: &[Tip]) -> Vec<String> {
        tips.iter()
            .filter(|tip| self.is_completed(&tip.id))
            .map(|tip| tip.id.clone())
            .collect()
    }

    pub fn storage_entry(&self) -> Result<(&'static str, String), ComputeError> {
        Ok((COMPLETED_TIPS_KEY, serde_json::to_string(&self.completed)?))
    }
}

/// Pending auto-escalation for the emergency flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub score: i32,
    pub raised_at: DateTime<Utc>,
}

impl EscalationRecord {
    pub fn storage_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (CRITICAL_SCORE_KEY, self.score.to_string()),
            (
                CRITICAL_TIMESTAMP_KEY,
                self.raised_at.timestamp_millis().to_string(),
            ),
        ]
    }
}

/// Everything a processor carries between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorState {
    #[serde(default)]
    pub last_snapshot: Option<WellnessSnapshot>,
    #[serde(default)]
    pub checklist: TipChecklist,
    #[serde(default)]
    pub escalation: Option<EscalationRecord>,
}

impl ProcessorState {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Last known advisory score, if any run has been recorded
    pub fn last_score(&self) -> Option<i32> {
        self.last_snapshot.as_ref().map(|snapshot| snapshot.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_tips() -> Vec<Tip> {
        vec![
            Tip::new("hr-tip-1", "breathe", Priority::High),
            Tip::new("hr-tip-2", "no caffeine", Priority::Medium),
            Tip::positive("sleep-tip-4", "great sleep"),
        ]
    }

    #[test]
    fn test_checklist_toggle() {
        let mut checklist = TipChecklist::new();
        checklist.set_completed("hr-tip-2", true);
        checklist.set_completed("hr-tip-1", true);
        checklist.set_completed("hr-tip-2", true);
        assert_eq!(checklist.completed(), ["hr-tip-2", "hr-tip-1"]);

        checklist.set_completed("hr-tip-2", false);
        checklist.set_completed("missing", false);
        assert_eq!(checklist.completed(), ["hr-tip-1"]);
        assert!(checklist.is_completed("hr-tip-1"));
        assert!(!checklist.is_completed("hr-tip-2"));
    }

    #[test]
    fn test_completed_in_follows_tip_order() {
        let mut checklist = TipChecklist::new();
        checklist.set_completed("sleep-tip-4", true);
        checklist.set_completed("hr-tip-1", true);
        checklist.set_completed("stale-tip", true);

        assert_eq!(
            checklist.completed_in(&sample_tips()),
            vec!["hr-tip-1".to_string(), "sleep-tip-4".to_string()]
        );
    }

    #[test]
    fn test_checklist_serializes_as_plain_array() {
        let mut checklist = TipChecklist::new();
        checklist.set_completed("hr-tip-1", true);
        let (key, value) = checklist.storage_entry().unwrap();
        assert_eq!(key, COMPLETED_TIPS_KEY);
        assert_eq!(value, r#"["hr-tip-1"]"#);
    }

    #[test]
    fn test_state_round_trip() {
        let raised_at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let mut state = ProcessorState {
            last_snapshot: Some(WellnessSnapshot {
                score: 35,
                tips: sample_tips(),
                status: WellnessStatus::Critical,
                computed_at: raised_at,
                producer_instance: "instance-1".to_string(),
            }),
            escalation: Some(EscalationRecord { score: 35, raised_at }),
            ..Default::default()
        };
        state.checklist.set_completed("hr-tip-1", true);

        let json = state.to_json().unwrap();
        let restored = ProcessorState::from_json(&json).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.last_score(), Some(35));
    }

    #[test]
    fn test_state_accepts_empty_object() {
        let state = ProcessorState::from_json("{}").unwrap();
        assert_eq!(state, ProcessorState::default());
        assert_eq!(state.last_score(), None);
    }

    #[test]
    fn test_storage_entries() {
        let raised_at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let snapshot = WellnessSnapshot {
            score: 85,
            tips: sample_tips(),
            status: WellnessStatus::Good,
            computed_at: raised_at,
            producer_instance: "instance-1".to_string(),
        };
        let entries = snapshot.storage_entries().unwrap();
        assert_eq!(entries[0], (LAST_SCORE_KEY, "85".to_string()));
        assert_eq!(entries[2], (LAST_STATUS_KEY, "Good".to_string()));

        let escalation = EscalationRecord { score: 20, raised_at };
        let entries = escalation.storage_entries();
        assert_eq!(entries[0], (CRITICAL_SCORE_KEY, "20".to_string()));
        assert_eq!(
            entries[1],
            (CRITICAL_TIMESTAMP_KEY, raised_at.timestamp_millis().to_string())
        );
    }
}
