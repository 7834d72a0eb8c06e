use forge_logging::forge_warn;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("empty song plan")]
    Empty,
    #[error("invalid song plan: {0}")]
    Json(#[from] serde_json::Error),
}

/// One object to generate and the point in the song where it appears.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageCue {
    #[serde(default)]
    pub color: String,
    pub minute: f64,
    pub second: f64,
    #[serde(rename = "objectDescription")]
    pub object_description: String,
}

impl ImageCue {
    pub fn offset_seconds(&self) -> f64 {
        self.minute * 60.0 + self.second
    }
}

/// Song metadata: which objects to generate and when to reveal them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongPlan {
    #[serde(default)]
    pub song: String,
    #[serde(default)]
    pub mp3_url: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageCue>,
}

impl SongPlan {
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        if text.trim().is_empty() {
            return Err(PlanError::Empty);
        }
        let plan: SongPlan = serde_json::from_str(text)?;
        if plan.images.is_empty() {
            forge_warn!("Song plan for {:?} has no images", plan.song);
        }
        Ok(plan)
    }

    /// Prompts in reveal order.
    pub fn prompts(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|cue| cue.object_description.clone())
            .collect()
    }

    /// Reveal offsets in seconds, one per prompt.
    pub fn timing_offsets(&self) -> Vec<f64> {
        self.images.iter().map(ImageCue::offset_seconds).collect()
    }
}
