/// Opaque reference to an asset produced by the generation service
/// (a texture or model URI, or whatever the client hands back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

/// Visual stand-in for one Task's output object.
///
/// Every visual mutation bumps `revision`, so two snapshots with the same
/// revision are guaranteed to look identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    preview: Option<AssetRef>,
    temp_model: Option<AssetRef>,
    final_model: Option<AssetRef>,
    image_visible: bool,
    spinner_visible: bool,
    loading_image: bool,
    label: String,
    enabled: bool,
    revision: u64,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self {
            preview: None,
            temp_model: None,
            final_model: None,
            image_visible: true,
            spinner_visible: true,
            loading_image: false,
            label: String::new(),
            enabled: false,
            revision: 0,
        }
    }
}

impl Placeholder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&AssetRef> {
        self.preview.as_ref()
    }

    pub fn temp_model(&self) -> Option<&AssetRef> {
        self.temp_model.as_ref()
    }

    pub fn final_model(&self) -> Option<&AssetRef> {
        self.final_model.as_ref()
    }

    pub fn image_visible(&self) -> bool {
        self.image_visible
    }

    pub fn spinner_visible(&self) -> bool {
        self.spinner_visible
    }

    pub fn loading_image(&self) -> bool {
        self.loading_image
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Slot visibility, toggled by slot addressing only.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Marks the preview as pending until the first image (or a failure) lands.
    pub(crate) fn begin_loading(&mut self) {
        self.loading_image = true;
    }

    pub(crate) fn set_image(&mut self, texture: AssetRef) {
        self.image_visible = true;
        self.preview = Some(texture);
        self.loading_image = false;
        self.touch();
    }

    pub(crate) fn set_model(&mut self, model: AssetRef, is_final: bool) {
        if is_final {
            self.image_visible = false;
            self.spinner_visible = false;
            self.final_model = Some(model);
        } else {
            // Preview stays up until the final model lands.
            self.temp_model = Some(model);
        }
        self.touch();
    }

    pub(crate) fn fail(&mut self, message: &str) {
        self.loading_image = false;
        self.image_visible = false;
        self.spinner_visible = false;
        self.temp_model = None;
        self.final_model = None;
        self.label = format!("Error: {message}");
        self.touch();
    }

    pub(crate) fn cancel(&mut self) {
        self.loading_image = false;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
