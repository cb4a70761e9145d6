//! Marketing settings database operations

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;

use crate::db::{format_timestamp, now, parse_timestamp};
use crate::error::AppResult;
use crate::models::{MarketingSettings, UpdateMarketingSettingsRequest};
use super::super::Database;

/// The table holds at most one row, pinned to this id
const SETTINGS_ROW_ID: i64 = 1;

fn parse_blob(column: usize, raw: &str) -> rusqlite::Result<Value> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn load_settings(conn: &Connection) -> rusqlite::Result<Option<MarketingSettings>> {
    conn.query_row(
        "SELECT id, ga_enabled, ga_measurement_id, fb_capi_enabled, fb_pixel_id, fb_access_token,
                ga_settings, fb_settings, created_at, updated_at
         FROM marketing_settings WHERE id = ?1",
        [SETTINGS_ROW_ID],
        |row| {
            let ga_settings: String = row.get(6)?;
            let fb_settings: String = row.get(7)?;
            let created_at_str: String = row.get(8)?;
            let updated_at_str: String = row.get(9)?;
            Ok(MarketingSettings {
                id: row.get(0)?,
                ga_enabled: row.get::<_, i64>(1)? != 0,
                ga_measurement_id: row.get(2)?,
                fb_capi_enabled: row.get::<_, i64>(3)? != 0,
                fb_pixel_id: row.get(4)?,
                fb_access_token: row.get(5)?,
                ga_settings: parse_blob(6, &ga_settings)?,
                fb_settings: parse_blob(7, &fb_settings)?,
                created_at: parse_timestamp(8, &created_at_str)?,
                updated_at: parse_timestamp(9, &updated_at_str)?,
            })
        },
    )
    .optional()
}

impl Database {
    /// Get marketing settings (there's only one row). Defaults when never saved.
    pub fn get_marketing_settings(&self) -> AppResult<MarketingSettings> {
        let conn = self.conn()?;
        Ok(load_settings(&conn)?.unwrap_or_default())
    }

    /// Apply a partial update, creating the row on first write
    pub fn update_marketing_settings(
        &self,
        req: &UpdateMarketingSettingsRequest,
    ) -> AppResult<MarketingSettings> {
        let mut conn = self.conn()?;
        // Take the write lock before the read so concurrent writers queue on busy_timeout
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = load_settings(&tx)?;
        let is_new = existing.is_none();
        let mut settings = existing.unwrap_or_default();
        settings.apply_update(req)?;

        let timestamp = now();
        if is_new {
            settings.created_at = timestamp;
        }
        settings.id = SETTINGS_ROW_ID;
        settings.updated_at = timestamp;

        tx.execute(
            "INSERT INTO marketing_settings (id, ga_enabled, ga_measurement_id, fb_capi_enabled, fb_pixel_id,
                fb_access_token, ga_settings, fb_settings, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                ga_enabled = excluded.ga_enabled,
                ga_measurement_id = excluded.ga_measurement_id,
                fb_capi_enabled = excluded.fb_capi_enabled,
                fb_pixel_id = excluded.fb_pixel_id,
                fb_access_token = excluded.fb_access_token,
                ga_settings = excluded.ga_settings,
                fb_settings = excluded.fb_settings,
                updated_at = excluded.updated_at",
            rusqlite::params![
                SETTINGS_ROW_ID,
                if settings.ga_enabled { 1 } else { 0 },
                &settings.ga_measurement_id,
                if settings.fb_capi_enabled { 1 } else { 0 },
                &settings.fb_pixel_id,
                &settings.fb_access_token,
                serde_json::to_string(&settings.ga_settings)?,
                serde_json::to_string(&settings.fb_settings)?,
                format_timestamp(&settings.created_at),
                format_timestamp(&settings.updated_at),
            ],
        )?;
        tx.commit()?;

        log::info!(
            "Marketing settings updated (ga_enabled={}, fb_capi_enabled={})",
            settings.ga_enabled,
            settings.fb_capi_enabled
        );
        Ok(settings)
    }
}
