//! Wellbeing scoring
//!
//! Two views over the same normalized vitals:
//! - [`AssessmentScorer`]: five weighted category risks plus an overall score
//! - [`AdvisoryEngine`]: a deduction score, status label and prioritized tips
//!
//! Both read their inputs through [`crate::normalizer`], so a reading is
//! interpreted the same way by each view.

mod advisory;
mod assessment;

pub use advisory::AdvisoryEngine;
pub use assessment::{AssessmentScorer, DISCLAIMER};
