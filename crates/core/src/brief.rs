//! Campaign brief records as submitted through the intake form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Channel, ClientData};

/// Youngest target age the form accepts.
pub const MIN_TARGET_AGE: u8 = 13;

/// Oldest target age the form accepts.
pub const MAX_TARGET_AGE: u8 = 100;

/// Processing status of a brief.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BriefStatus {
    #[default]
    Submitted,
    InReview,
    Completed,
}

/// Intake form payload, before it has an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaignBrief {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub campaign_objective: Option<String>,
    #[serde(default)]
    pub target_gender: String,
    pub target_age_min: u8,
    pub target_age_max: u8,
    #[serde(default)]
    pub primary_channels: Vec<String>,
    #[serde(default)]
    pub key_regions: Vec<String>,
}

impl NewCampaignBrief {
    /// Collect every validation failure, in field order.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.brand_name.trim().is_empty() {
            errors.push("Brand name is required".to_string());
        }
        if self.industry.trim().is_empty() {
            errors.push("Industry is required".to_string());
        }
        if self.target_gender.trim().is_empty() {
            errors.push("Target gender is required".to_string());
        }
        for (label, age) in [("minimum", self.target_age_min), ("maximum", self.target_age_max)] {
            if !(MIN_TARGET_AGE..=MAX_TARGET_AGE).contains(&age) {
                errors.push(format!(
                    "Target {} age must be between {} and {}",
                    label, MIN_TARGET_AGE, MAX_TARGET_AGE
                ));
            }
        }
        if self.target_age_min > self.target_age_max {
            errors.push("Target minimum age cannot exceed maximum age".to_string());
        }
        if !self.primary_channels.iter().any(|c| Channel::parse(c).is_some()) {
            errors.push("At least one primary channel (TV, RADIO, DIGITAL) is required".to_string());
        }

        errors
    }

    /// Assign an identity and creation time.
    pub fn into_brief(self, id: Uuid, created_at: DateTime<Utc>) -> CampaignBrief {
        CampaignBrief {
            id,
            brand_name: self.brand_name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            campaign_objective: self.campaign_objective,
            target_gender: self.target_gender.trim().to_string(),
            target_age_min: self.target_age_min,
            target_age_max: self.target_age_max,
            primary_channels: self.primary_channels,
            key_regions: self.key_regions,
            status: BriefStatus::default(),
            created_at,
        }
    }
}

/// A persisted campaign brief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBrief {
    pub id: Uuid,
    pub brand_name: String,
    pub industry: String,
    pub campaign_objective: Option<String>,
    pub target_gender: String,
    pub target_age_min: u8,
    pub target_age_max: u8,
    pub primary_channels: Vec<String>,
    pub key_regions: Vec<String>,
    #[serde(default)]
    pub status: BriefStatus,
    pub created_at: DateTime<Utc>,
}

impl CampaignBrief {
    /// Map the stored record onto the values the deck template needs.
    pub fn to_client_data(&self) -> ClientData {
        ClientData {
            brand_name: self.brand_name.clone(),
            industry: self.industry.clone(),
            target_audience: format!(
                "{}, Age {}-{}",
                self.target_gender, self.target_age_min, self.target_age_max
            ),
            primary_channels: self.primary_channels.clone(),
            key_regions: self.key_regions.clone(),
        }
    }

    /// Listing projection.
    pub fn summary(&self) -> BriefSummary {
        BriefSummary {
            id: self.id,
            brand_name: self.brand_name.clone(),
            industry: self.industry.clone(),
            campaign_objective: self.campaign_objective.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// The subset of a brief shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefSummary {
    pub id: Uuid,
    pub brand_name: String,
    pub industry: String,
    pub campaign_objective: Option<String>,
    pub status: BriefStatus,
    pub created_at: DateTime<Utc>,
}
