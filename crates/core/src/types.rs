//! Domain types for the client data that customises a deck.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format;

/// A media channel the pitch deck can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Tv,
    Radio,
    Digital,
}

impl Channel {
    /// Every channel in the allow-list, in display order.
    pub const ALL: [Channel; 3] = [Channel::Tv, Channel::Radio, Channel::Digital];

    /// Parse a channel token, ignoring case and surrounding whitespace.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "TV" => Some(Self::Tv),
            "RADIO" => Some(Self::Radio),
            "DIGITAL" => Some(Self::Digital),
            _ => None,
        }
    }

    /// Allow-listed channels among `tokens`, de-duplicated, in input order.
    pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Vec<Self> {
        let mut channels = Vec::new();
        for channel in tokens.iter().filter_map(|t| Self::parse(t.as_ref())) {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        channels
    }

    /// Upper-case display token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::Radio => "RADIO",
            Self::Digital => "DIGITAL",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client-specific values substituted into the template.
///
/// `primary_channels` is kept as raw tokens: the allow-list is applied when
/// the display text is built, so callers can pass whatever they received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    /// Brand name shown in the heading run.
    pub brand_name: String,

    /// Industry shown after the "Industry:" label.
    pub industry: String,

    /// Pre-formatted audience text, e.g. "Female, Age 25-40".
    pub target_audience: String,

    /// Channel tokens as submitted.
    #[serde(default)]
    pub primary_channels: Vec<String>,

    /// Regions in submission order. Empty means nationwide.
    #[serde(default)]
    pub key_regions: Vec<String>,
}

impl ClientData {
    /// Create client data with no channels or regions.
    pub fn new(
        brand_name: impl Into<String>,
        industry: impl Into<String>,
        target_audience: impl Into<String>,
    ) -> Self {
        Self {
            brand_name: brand_name.into(),
            industry: industry.into(),
            target_audience: target_audience.into(),
            primary_channels: Vec::new(),
            key_regions: Vec::new(),
        }
    }

    /// Set the channel tokens.
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the region list.
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Channels that survive the allow-list, de-duplicated, in submission order.
    pub fn valid_channels(&self) -> Vec<Channel> {
        Channel::parse_all(self.primary_channels.as_slice())
    }

    /// Comma-joined display text for the channel run.
    pub fn channel_text(&self) -> Option<String> {
        format::channel_display(&self.primary_channels)
    }

    /// Comma-joined display text for the regions run.
    pub fn region_text(&self) -> String {
        format::region_display(&self.key_regions)
    }

    /// Reject data that must never reach the generation pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.brand_name.trim().is_empty() {
            return Err(Error::InvalidClientData("brand name is required".to_string()));
        }
        if self.valid_channels().is_empty() {
            return Err(Error::NoValidChannels);
        }
        Ok(())
    }
}
