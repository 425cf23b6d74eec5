//! Named option catalogs accepted by the stages.
//!
//! Every catalog parses leniently: an unknown name falls back to the
//! catalog default and logs a warning, so a typo in a form field degrades
//! the output instead of failing the request.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Script length
// ---------------------------------------------------------------------------

/// Target length of a generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ScriptLength {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "short" => Self::Short,
            "medium" => Self::Medium,
            "long" => Self::Long,
            other => {
                tracing::warn!(length = other, "Unknown script length, using medium");
                Self::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Spoken duration the script should fill.
    pub fn duration_label(self) -> &'static str {
        match self {
            Self::Short => "2-3 minutes",
            Self::Medium => "5-7 minutes",
            Self::Long => "10-15 minutes",
        }
    }

    /// Inclusive target word-count range.
    pub fn word_range(self) -> (usize, usize) {
        match self {
            Self::Short => (150, 250),
            Self::Medium => (400, 600),
            Self::Long => (800, 1200),
        }
    }
}

// ---------------------------------------------------------------------------
// Script style
// ---------------------------------------------------------------------------

/// Tone of a generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptStyle {
    #[default]
    Educational,
    Entertaining,
    Professional,
    Casual,
}

impl ScriptStyle {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "educational" => Self::Educational,
            "entertaining" => Self::Entertaining,
            "professional" => Self::Professional,
            "casual" => Self::Casual,
            other => {
                tracing::warn!(style = other, "Unknown script style, using educational");
                Self::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Educational => "educational",
            Self::Entertaining => "entertaining",
            Self::Professional => "professional",
            Self::Casual => "casual",
        }
    }

    /// Tone instruction inserted into the generation prompt.
    pub fn tone(self) -> &'static str {
        match self {
            Self::Educational => {
                "educational, informative, clear explanations, step-by-step approach"
            }
            Self::Entertaining => {
                "entertaining, engaging, humorous, captivating storytelling"
            }
            Self::Professional => "professional, formal, business-like, authoritative tone",
            Self::Casual => "casual, conversational, friendly, relaxed tone",
        }
    }
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// Synthesis voice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceType {
    Male,
    #[default]
    Female,
    Neutral,
}

impl VoiceType {
    /// `"default"` is an explicit alias for the default voice.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "male" => Self::Male,
            "female" | "default" | "" => Self::Female,
            "neutral" => Self::Neutral,
            other => {
                tracing::warn!(voice_type = other, "Unknown voice type, using default voice");
                Self::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Neutral => "neutral",
        }
    }

    /// Provider voice identifier.
    pub fn voice_id(self) -> &'static str {
        match self {
            // Josh
            Self::Male => "TxGEqnHWrfWFTfGW9XjX",
            // Rachel
            Self::Female => "21m00Tcm4TlvDq8ikWAM",
            // Adam
            Self::Neutral => "pNInz6obpgDQGcFmaJgB",
        }
    }
}

/// Lowest accepted numeric speaking rate.
pub const MIN_SPEED: f32 = 0.5;

/// Highest accepted numeric speaking rate.
pub const MAX_SPEED: f32 = 2.0;

/// Speaking-rate multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSpeed(f32);

impl Default for VoiceSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl VoiceSpeed {
    /// Parse `slow`/`normal`/`fast` or a number in [`MIN_SPEED`, `MAX_SPEED`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "slow" => Self(0.8),
            "normal" | "" => Self(1.0),
            "fast" => Self(1.2),
            other => match other.parse::<f32>() {
                Ok(v) if (MIN_SPEED..=MAX_SPEED).contains(&v) => Self(v),
                _ => {
                    tracing::warn!(speed = other, "Unknown voice speed, using normal");
                    Self::default()
                }
            },
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Video style and resolution
// ---------------------------------------------------------------------------

/// Visual style of the rendered animation and the final grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStyle {
    #[default]
    Modern,
    Minimal,
    Dynamic,
    Elegant,
}

impl VideoStyle {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "modern" => Self::Modern,
            "minimal" => Self::Minimal,
            "dynamic" => Self::Dynamic,
            "elegant" => Self::Elegant,
            other => {
                tracing::warn!(style = other, "Unknown video style, using modern");
                Self::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Minimal => "minimal",
            Self::Dynamic => "dynamic",
            Self::Elegant => "elegant",
        }
    }

    /// Prompt fragment describing the look to the animation service.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Modern => "modern, sleek, contemporary design, clean lines, professional",
            Self::Minimal => "minimalist, simple, clean, uncluttered, elegant",
            Self::Dynamic => "dynamic, energetic, vibrant, fast-paced, engaging",
            Self::Elegant => "elegant, sophisticated, refined, polished, high-quality",
        }
    }

    /// FFmpeg colour-grade filter applied during the final encode.
    pub fn grade_filter(self) -> &'static str {
        match self {
            Self::Modern => "eq=contrast=1.05:saturation=1.1",
            Self::Minimal => "eq=saturation=0.85",
            Self::Dynamic => "eq=contrast=1.15:saturation=1.3",
            Self::Elegant => "eq=contrast=1.05:brightness=0.02:saturation=0.95",
        }
    }
}

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd,
    #[default]
    #[serde(rename = "1080p")]
    FullHd,
    #[serde(rename = "4k")]
    UltraHd,
}

impl Resolution {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "720p" => Self::Hd,
            "1080p" => Self::FullHd,
            "4k" | "2160p" => Self::UltraHd,
            other => {
                tracing::warn!(resolution = other, "Unknown resolution, using 1080p");
                Self::default()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hd => "720p",
            Self::FullHd => "1080p",
            Self::UltraHd => "4k",
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd => (1280, 720),
            Self::FullHd => (1920, 1080),
            Self::UltraHd => (3840, 2160),
        }
    }
}

// ---------------------------------------------------------------------------
// Publication visibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    #[default]
    Private,
}

impl Visibility {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "public" => Self::Public,
            "unlisted" => Self::Unlisted,
            "private" => Self::Private,
            other => {
                tracing::warn!(visibility = other, "Unknown visibility, using private");
                Self::default()
            }
        }
    }

    /// Value of the hosting platform's `privacyStatus` field.
    pub fn privacy_status(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
        }
    }
}
