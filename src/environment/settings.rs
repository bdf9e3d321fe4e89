use super::ApplicationKind;
use serde::Deserialize;

/// Settings bound from the `main.*` properties before the context is created
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MainSettings {
    /// Overrides the kind the application was described with
    pub kind: Option<ApplicationKind>,
    /// Log a `Started <name> in <secs>s` line once the application is running
    pub log_startup_info: bool,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            kind: None,
            log_startup_info: true,
        }
    }
}

impl MainSettings {
    /// Property prefix the settings are bound from
    pub const PREFIX: &'static str = "main";
}
