use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            "system" => Some(ThemeMode::System),
            _ => None,
        }
    }

    /// Cycle light -> dark -> system
    pub fn next(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme_mode: ThemeMode,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::System,
            notifications_enabled: true,
        }
    }
}

impl Settings {
    /// Build settings from loosely-typed JSON, defaulting each invalid field
    pub fn from_value(value: &Value) -> Self {
        let mut settings = Self::default();
        settings.merge_from(value);
        settings
    }

    /// Apply the valid fields of `value`, keeping current values for the rest.
    ///
    /// Returns false when `value` is not an object.
    pub fn merge_from(&mut self, value: &Value) -> bool {
        let Some(fields) = value.as_object() else {
            return false;
        };
        if let Some(mode) = fields
            .get("themeMode")
            .and_then(Value::as_str)
            .and_then(ThemeMode::parse)
        {
            self.theme_mode = mode;
        }
        if let Some(enabled) = fields.get("notificationsEnabled").and_then(Value::as_bool) {
            self.notifications_enabled = enabled;
        }
        true
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
    }

    /// The concrete theme, resolving `system` with the host preference
    pub fn resolved_theme(&self, system_prefers_dark: bool) -> ThemeMode {
        match self.theme_mode {
            ThemeMode::System if system_prefers_dark => ThemeMode::Dark,
            ThemeMode::System => ThemeMode::Light,
            mode => mode,
        }
    }
}
