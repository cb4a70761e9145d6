//! Chatbot conversation log database operations (append-only)

use rusqlite::{Connection, Row};

use crate::db::{format_timestamp, now, parse_timestamp};
use crate::error::AppResult;
use crate::models::{ConversationTurn, NewTurn};
use super::super::Database;

fn row_to_turn(row: &Row) -> rusqlite::Result<ConversationTurn> {
    let created_at_str: String = row.get(4)?;
    Ok(ConversationTurn {
        id: row.get(0)?,
        visitor_id: row.get(1)?,
        message: row.get(2)?,
        is_bot: row.get::<_, i64>(3)? != 0,
        created_at: parse_timestamp(4, &created_at_str)?,
    })
}

fn insert_turn(conn: &Connection, turn: &NewTurn) -> rusqlite::Result<ConversationTurn> {
    let created_at = now();
    conn.execute(
        "INSERT INTO conversations (visitor_id, message, is_bot, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            &turn.visitor_id,
            &turn.message,
            if turn.is_bot { 1 } else { 0 },
            format_timestamp(&created_at),
        ],
    )?;

    Ok(ConversationTurn {
        id: conn.last_insert_rowid(),
        visitor_id: turn.visitor_id.clone(),
        message: turn.message.clone(),
        is_bot: turn.is_bot,
        created_at,
    })
}

impl Database {
    pub fn append_turn(&self, turn: &NewTurn) -> AppResult<ConversationTurn> {
        let conn = self.conn()?;
        Ok(insert_turn(&conn, turn)?)
    }

    /// Log a visitor message and the bot's reply together
    pub fn append_exchange(
        &self,
        visitor: &NewTurn,
        bot: &NewTurn,
    ) -> AppResult<(ConversationTurn, ConversationTurn)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let visitor_turn = insert_turn(&tx, visitor)?;
        let bot_turn = insert_turn(&tx, bot)?;
        tx.commit()?;
        Ok((visitor_turn, bot_turn))
    }

    /// Full transcript for a visitor, oldest first
    pub fn get_transcript(&self, visitor_id: &str) -> AppResult<Vec<ConversationTurn>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, visitor_id, message, is_bot, created_at FROM conversations
             WHERE visitor_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let turns = stmt
            .query_map([visitor_id], row_to_turn)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(turns)
    }
}
