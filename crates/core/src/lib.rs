//! Core domain types, field formatting and error taxonomy for
//! campaign pitch-deck generation.

pub mod brief;
pub mod error;
pub mod format;
pub mod types;

pub use brief::{BriefStatus, BriefSummary, CampaignBrief, NewCampaignBrief};
pub use error::{Error, FailureKind, Result};
pub use types::{Channel, ClientData};
