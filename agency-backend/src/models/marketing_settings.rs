use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Analytics / pixel integration settings stored in database (single row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingSettings {
    pub id: i64,
    pub ga_enabled: bool,
    /// Google Analytics measurement id, e.g. "G-XXXXXXX"
    pub ga_measurement_id: Option<String>,
    pub fb_capi_enabled: bool,
    pub fb_pixel_id: Option<String>,
    /// Conversions API access token. Never sent to the public client.
    pub fb_access_token: Option<String>,
    /// Free-form GA options passed through to the client
    pub ga_settings: Value,
    /// Free-form Facebook options passed through to the client
    pub fb_settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for MarketingSettings {
    fn default() -> Self {
        Self {
            id: 0,
            ga_enabled: false,
            ga_measurement_id: None,
            fb_capi_enabled: false,
            fb_pixel_id: None,
            fb_access_token: None,
            ga_settings: empty_blob(),
            fb_settings: empty_blob(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

pub fn empty_blob() -> Value {
    Value::Object(Default::default())
}

/// What the SPA reads at startup to decide which trackers to initialise
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicMarketingSettings {
    pub ga_enabled: bool,
    pub ga_measurement_id: Option<String>,
    pub fb_capi_enabled: bool,
    pub fb_pixel_id: Option<String>,
    pub fb_access_token_configured: bool,
    pub ga_settings: Value,
    pub fb_settings: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<MarketingSettings> for PublicMarketingSettings {
    fn from(s: MarketingSettings) -> Self {
        Self {
            ga_enabled: s.ga_enabled,
            ga_measurement_id: s.ga_measurement_id,
            fb_capi_enabled: s.fb_capi_enabled,
            fb_pixel_id: s.fb_pixel_id,
            fb_access_token_configured: s.fb_access_token.is_some(),
            ga_settings: s.ga_settings,
            fb_settings: s.fb_settings,
            updated_at: s.updated_at,
        }
    }
}

/// Request type for updating marketing settings.
/// Absent fields are left alone; an empty string clears an id or token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMarketingSettingsRequest {
    pub ga_enabled: Option<bool>,
    pub ga_measurement_id: Option<String>,
    pub fb_capi_enabled: Option<bool>,
    pub fb_pixel_id: Option<String>,
    pub fb_access_token: Option<String>,
    pub ga_settings: Option<Value>,
    pub fb_settings: Option<Value>,
}

/// Trimmed value, with an empty string meaning "clear"
fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn blob(field: &str, value: &Value) -> AppResult<Value> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        Value::Null => Ok(empty_blob()),
        _ => Err(AppError::Validation(format!("{} must be a JSON object", field))),
    }
}

impl MarketingSettings {
    /// Merge a partial update into the current settings. Nothing is changed on error.
    pub fn apply_update(&mut self, req: &UpdateMarketingSettingsRequest) -> AppResult<()> {
        let ga_settings = req.ga_settings.as_ref().map(|v| blob("ga_settings", v)).transpose()?;
        let fb_settings = req.fb_settings.as_ref().map(|v| blob("fb_settings", v)).transpose()?;

        if let Some(enabled) = req.ga_enabled {
            self.ga_enabled = enabled;
        }
        if let Some(id) = &req.ga_measurement_id {
            self.ga_measurement_id = clearable(id);
        }
        if let Some(enabled) = req.fb_capi_enabled {
            self.fb_capi_enabled = enabled;
        }
        if let Some(id) = &req.fb_pixel_id {
            self.fb_pixel_id = clearable(id);
        }
        if let Some(token) = &req.fb_access_token {
            self.fb_access_token = clearable(token);
        }
        if let Some(v) = ga_settings {
            self.ga_settings = v;
        }
        if let Some(v) = fb_settings {
            self.fb_settings = v;
        }
        Ok(())
    }
}
