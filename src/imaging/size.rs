//! Size labels and their target widths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three fixed variant sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeLabel {
    Small,
    Medium,
    Large,
}

impl SizeLabel {
    pub const ALL: [SizeLabel; 3] = [SizeLabel::Small, SizeLabel::Medium, SizeLabel::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeLabel::Small => "small",
            SizeLabel::Medium => "medium",
            SizeLabel::Large => "large",
        }
    }

    /// Target pixel width for this label
    pub fn width(&self, widths: &TargetWidths) -> u32 {
        match self {
            SizeLabel::Small => widths.small,
            SizeLabel::Medium => widths.medium,
            SizeLabel::Large => widths.large,
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(SizeLabel::Small),
            "medium" => Ok(SizeLabel::Medium),
            "large" => Ok(SizeLabel::Large),
            other => Err(format!(
                "Invalid size '{}': expected one of small, medium, large",
                other
            )),
        }
    }
}

/// Pixel widths for each size label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWidths {
    #[serde(default = "default_small_width")]
    pub small: u32,
    #[serde(default = "default_medium_width")]
    pub medium: u32,
    #[serde(default = "default_large_width")]
    pub large: u32,
}

impl Default for TargetWidths {
    fn default() -> Self {
        Self {
            small: default_small_width(),
            medium: default_medium_width(),
            large: default_large_width(),
        }
    }
}

fn default_small_width() -> u32 {
    100
}

fn default_medium_width() -> u32 {
    500
}

fn default_large_width() -> u32 {
    1500
}
