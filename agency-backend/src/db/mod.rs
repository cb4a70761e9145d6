mod sqlite;
mod tables;

pub use sqlite::Database;
pub(crate) use sqlite::{format_timestamp, now, parse_timestamp};
