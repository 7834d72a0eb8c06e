use serde::{Deserialize, Serialize};

/// Container format requested from the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    #[default]
    Glb,
}

impl ModelFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelFormat::Glb => "glb",
        }
    }
}

/// Options attached to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub format: ModelFormat,
    /// When false, the base mesh is final and `refined_mesh` is never awaited.
    pub refine: bool,
    pub use_vertex_color: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            format: ModelFormat::Glb,
            refine: true,
            use_vertex_color: false,
        }
    }
}
