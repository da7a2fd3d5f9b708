use serde::{Deserialize, Serialize};

/// SDK configuration supplied by the host at initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site identifier issued to the host application.
    pub site_id: String,
    /// Optional two-letter language code forcing the consent UI language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_language: Option<String>,
}

impl Config {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            app_language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.app_language = Some(language.into());
        self
    }
}
