//! Fixtures shared by the unit tests.

use tempfile::TempDir;

use crate::db::Database;
use crate::models::{CreateLeadRequest, NewLead};

pub fn jane_request() -> CreateLeadRequest {
    CreateLeadRequest {
        name: Some("Jane Doe".into()),
        email: Some("jane@acme.com".into()),
        company: Some("Acme".into()),
        phone: Some("555-0100".into()),
        budget: Some("$5k-$10k".into()),
        ..Default::default()
    }
}

pub fn jane() -> NewLead {
    jane_request().validate().expect("valid lead")
}

pub fn memory_db() -> Database {
    Database::open_in_memory().expect("in-memory db")
}

/// File-backed database with a real pool, for tests that need several connections
pub fn file_db(dir: &TempDir, pool_size: u32) -> Database {
    let path = dir.path().join("agency.db");
    Database::new(path.to_str().expect("utf-8 temp path"), pool_size).expect("file db")
}
