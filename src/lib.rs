//! MindSync Wellbeing - vitals-to-wellbeing assessment engine
//!
//! Turns loosely formatted vital-sign readings into two views through a
//! deterministic pipeline: record decoding → normalization → sub-signal
//! derivation → scoring.
//!
//! ## Views
//!
//! - **Assessment**: five category risk scores with levels, an overall score,
//!   clinical notes and a fixed disclaimer
//! - **Advisory**: a single deduction-based wellness score, a status label and
//!   prioritized tips
//!
//! Both views read the same normalized sub-signals. Persisted state (last
//! snapshot, tip checklist, pending escalation) is owned by the caller and
//! threaded through [`WellbeingProcessor`].

pub mod error;
pub mod features;
pub mod normalizer;
pub mod pipeline;
pub mod recommend;
pub mod schema;
pub mod scoring;
pub mod state;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use pipeline::{advise, assess, vitals_to_advisory, vitals_to_assessment, WellbeingProcessor};
pub use recommend::{PlaylistCategory, PlaylistRecommendation};
pub use state::{EscalationRecord, ProcessorState, TipChecklist, WellnessSnapshot};
pub use types::{AdvisoryResult, AssessmentResult, WellnessReport, WellnessStatus};

// Schema exports
pub use schema::{VitalValue, VitalsRecord, VitalsRecordAdapter};

/// Library version
pub const WELLBEING_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name recorded by the CLI and FFI hosts
pub const PRODUCER_NAME: &str = "mindsync-wellbeing";
