//! Session log storage with SQLite
//!
//! Wraps a single connection and the embedded schema. The importer writes
//! through this layer; the CLI reads through it. Duplicate message UUIDs
//! are reported as [`MessageInsert::DuplicateUuid`] rather than errors, so
//! re-imports of the same log file are no-ops.

mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::import::entry::{ParsedBlock, ParsedEntry};

pub use schema::SCHEMA;

/// Outcome of a message insert attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageInsert {
    Inserted(i64),
    /// A message with this UUID already exists; the entry was skipped.
    DuplicateUuid,
}

pub struct LogStore {
    conn: Connection,
}

impl LogStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // recursive_triggers: cascade deletes must reach the FTS sync triggers
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA recursive_triggers=ON;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Run `f` inside a single transaction. Rolls back if `f` fails, so a
    /// message is never left without its content blocks.
    pub fn transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f()?;
        tx.commit()?;
        Ok(value)
    }

    // ============================================
    // SESSIONS
    // ============================================

    /// Create a session on first sight of its UUID, or return the existing
    /// row's id. A known project path fills in a previously-NULL one.
    pub fn upsert_session(&self, session_uuid: &str, project_path: Option<&str>) -> Result<i64> {
        let id = self.conn.query_row(
            r#"INSERT INTO sessions (session_uuid, project_path)
               VALUES (?, ?)
               ON CONFLICT(session_uuid) DO UPDATE SET
                   project_path = COALESCE(excluded.project_path, project_path)
               RETURNING id"#,
            params![session_uuid, project_path],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn session_summary(&self, session_id: i64) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT summary FROM sessions WHERE id = ?",
            params![session_id],
            |row| row.get(0),
        );

        match result {
            Ok(summary) => Ok(summary),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_session_summary(&self, session_id: i64, summary: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET summary = ?, updated_at = datetime('now') WHERE id = ?",
            params![summary, session_id],
        )?;
        Ok(())
    }

    /// Add to the session's token accumulators. Totals are caller-written;
    /// the store never derives them from message rows.
    pub fn add_session_tokens(&self, session_id: i64, input: i64, output: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET
                 total_input_tokens = total_input_tokens + ?1,
                 total_output_tokens = total_output_tokens + ?2,
                 updated_at = datetime('now')
             WHERE id = ?3",
            params![input, output, session_id],
        )?;
        Ok(())
    }

    /// Delete a session; messages and content blocks cascade.
    pub fn delete_session(&self, session_uuid: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM sessions WHERE session_uuid = ?",
            params![session_uuid],
        )?;
        Ok(n > 0)
    }

    // ============================================
    // MESSAGES & CONTENT BLOCKS
    // ============================================

    /// Insert a log entry envelope plus its content blocks.
    ///
    /// A unique-constraint hit on `messages.uuid` means the entry was
    /// already imported and returns [`MessageInsert::DuplicateUuid`].
    /// Every other constraint violation (missing session, NULL type) is a
    /// real error and propagates.
    pub fn insert_message(&self, session_id: i64, entry: &ParsedEntry) -> Result<MessageInsert> {
        let result = self.conn.query_row(
            r#"INSERT INTO messages
               (session_id, uuid, type, role, timestamp, cwd, input_tokens, output_tokens, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id"#,
            params![
                session_id,
                entry.uuid,
                entry.kind,
                entry.role,
                entry.timestamp.map(|t| t.to_rfc3339()),
                entry.cwd,
                entry.input_tokens,
                entry.output_tokens,
                entry.version,
            ],
            |row| row.get::<_, i64>(0),
        );

        let message_id = match result {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => return Ok(MessageInsert::DuplicateUuid),
            Err(e) => return Err(e).context("Failed to insert message"),
        };

        for (index, block) in entry.blocks.iter().enumerate() {
            self.insert_content_block(message_id, index as i64, block)?;
        }

        Ok(MessageInsert::Inserted(message_id))
    }

    pub fn insert_content_block(
        &self,
        message_id: i64,
        block_index: i64,
        block: &ParsedBlock,
    ) -> Result<i64> {
        let tool_input = block
            .tool_input
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"INSERT INTO content_blocks
               (message_id, block_index, block_type, text_content, tool_name, tool_input, tool_use_id)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                message_id,
                block_index,
                block.block_type,
                block.text,
                block.tool_name,
                tool_input,
                block.tool_use_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ============================================
    // IMPORT METADATA
    // ============================================

    pub fn last_import_timestamp(&self, project_path: &str) -> Result<Option<DateTime<Utc>>> {
        let result = self.conn.query_row(
            "SELECT last_import_timestamp FROM import_metadata WHERE project_path = ?",
            params![project_path],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(raw) => {
                let ts = DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("Invalid import watermark for {}", project_path))?;
                Ok(Some(ts.with_timezone(&Utc)))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_last_import_timestamp(
        &self,
        project_path: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO import_metadata (project_path, last_import_timestamp)
             VALUES (?, ?)
             ON CONFLICT(project_path) DO UPDATE SET
                 last_import_timestamp = excluded.last_import_timestamp",
            params![project_path, timestamp.to_rfc3339()],
        )?;
        Ok(())
    }

    // ============================================
    // QUERIES
    // ============================================

    pub fn list_sessions(&self) -> Result<Vec<SessionRow>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT s.id, s.session_uuid, s.project_path, s.summary, s.created_at,
                      s.updated_at, s.total_input_tokens, s.total_output_tokens,
                      (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id) AS message_count
               FROM sessions s
               ORDER BY s.updated_at DESC"#,
        )?;

        let rows = stmt.query_map([], map_session_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Look up a session by full UUID or unambiguous prefix.
    pub fn get_session(&self, query: &str) -> Result<Option<SessionRow>> {
        let row = self.conn.query_row(
            r#"SELECT s.id, s.session_uuid, s.project_path, s.summary, s.created_at,
                      s.updated_at, s.total_input_tokens, s.total_output_tokens,
                      (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id) AS message_count
               FROM sessions s
               WHERE s.session_uuid = ?1 OR s.session_uuid LIKE ?2
               ORDER BY CASE WHEN s.session_uuid = ?1 THEN 0 ELSE 1 END
               LIMIT 1"#,
            params![query, format!("{}%", query)],
            map_session_row,
        );

        match row {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_messages(&self, session_id: i64) -> Result<Vec<MessageRow>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, uuid, type, role, timestamp, cwd, input_tokens, output_tokens, version
               FROM messages
               WHERE session_id = ?
               ORDER BY timestamp, id"#,
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                uuid: row.get(1)?,
                kind: row.get(2)?,
                role: row.get(3)?,
                timestamp: row.get(4)?,
                cwd: row.get(5)?,
                input_tokens: row.get(6)?,
                output_tokens: row.get(7)?,
                version: row.get(8)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_content_blocks(&self, message_id: i64) -> Result<Vec<BlockRow>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, block_index, block_type, text_content, tool_name, tool_input, tool_use_id
               FROM content_blocks
               WHERE message_id = ?
               ORDER BY block_index"#,
        )?;

        let rows = stmt.query_map(params![message_id], |row| {
            Ok(BlockRow {
                id: row.get(0)?,
                block_index: row.get(1)?,
                block_type: row.get(2)?,
                text_content: row.get(3)?,
                tool_name: row.get(4)?,
                tool_input: row.get(5)?,
                tool_use_id: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Full-text search over content block text. `query` uses FTS5 match
    /// syntax; bare words work as expected. Results are relevance-ranked.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT s.session_uuid, m.type, m.role, m.timestamp,
                      cb.id, cb.block_type, cb.text_content, rank
               FROM content_blocks_fts f
               JOIN content_blocks cb ON cb.id = f.rowid
               JOIN messages m ON m.id = cb.message_id
               JOIN sessions s ON s.id = m.session_id
               WHERE content_blocks_fts MATCH ?1
               ORDER BY rank
               LIMIT ?2"#,
        )?;

        let rows = stmt.query_map(params![query, limit as i64], |row| {
            Ok(SearchHit {
                session_uuid: row.get(0)?,
                message_kind: row.get(1)?,
                role: row.get(2)?,
                timestamp: row.get(3)?,
                block_id: row.get(4)?,
                block_type: row.get(5)?,
                text_content: row.get(6)?,
                rank: row.get(7)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.conn
            .query_row(
                r#"SELECT (SELECT COUNT(*) FROM sessions),
                          (SELECT COUNT(*) FROM messages),
                          (SELECT COUNT(*) FROM content_blocks),
                          (SELECT COALESCE(SUM(total_input_tokens), 0) FROM sessions),
                          (SELECT COALESCE(SUM(total_output_tokens), 0) FROM sessions)"#,
                [],
                |row| {
                    Ok(StoreStats {
                        sessions: row.get(0)?,
                        messages: row.get(1)?,
                        content_blocks: row.get(2)?,
                        total_input_tokens: row.get(3)?,
                        total_output_tokens: row.get(4)?,
                    })
                },
            )
            .map_err(Into::into)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn map_session_row(row: &rusqlite::Row) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        session_uuid: row.get(1)?,
        project_path: row.get(2)?,
        summary: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        total_input_tokens: row.get(6)?,
        total_output_tokens: row.get(7)?,
        message_count: row.get(8)?,
    })
}

// ============================================
// ROW TYPES
// ============================================

#[derive(Debug)]
pub struct SessionRow {
    pub id: i64,
    pub session_uuid: String,
    pub project_path: Option<String>,
    pub summary: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub message_count: i64,
}

#[derive(Debug)]
pub struct MessageRow {
    pub id: i64,
    pub uuid: Option<String>,
    pub kind: String,
    pub role: Option<String>,
    pub timestamp: Option<String>,
    pub cwd: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub version: Option<String>,
}

#[derive(Debug)]
pub struct BlockRow {
    pub id: i64,
    pub block_index: i64,
    pub block_type: String,
    pub text_content: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<String>,
    pub tool_use_id: Option<String>,
}

#[derive(Debug)]
pub struct SearchHit {
    pub session_uuid: String,
    pub message_kind: String,
    pub role: Option<String>,
    pub timestamp: Option<String>,
    pub block_id: i64,
    pub block_type: String,
    pub text_content: Option<String>,
    pub rank: f64,
}

#[derive(Debug)]
pub struct StoreStats {
    pub sessions: i64,
    pub messages: i64,
    pub content_blocks: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SESSION_UUID: &str = "11111111-1111-1111-1111-111111111111";

    fn text_entry(uuid: Option<&str>, text: &str) -> ParsedEntry {
        ParsedEntry {
            uuid: uuid.map(String::from),
            kind: "user".to_string(),
            role: Some("user".to_string()),
            timestamp: None,
            cwd: None,
            input_tokens: None,
            output_tokens: None,
            version: None,
            summary: None,
            blocks: vec![ParsedBlock::text("text", text)],
        }
    }

    fn count(store: &LogStore, table: &str) -> i64 {
        store
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_upsert_session_returns_same_id() {
        let store = LogStore::open_in_memory().unwrap();

        let first = store.upsert_session(SESSION_UUID, None).unwrap();
        let second = store.upsert_session(SESSION_UUID, Some("/repo/a")).unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&store, "sessions"), 1);

        // Second upsert backfilled the project path
        let session = store.get_session(SESSION_UUID).unwrap().unwrap();
        assert_eq!(session.project_path.as_deref(), Some("/repo/a"));
    }

    #[test]
    fn test_duplicate_uuid_is_skipped_nulls_are_not() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();

        let first = store
            .insert_message(session_id, &text_entry(Some("m1"), "one"))
            .unwrap();
        assert!(matches!(first, MessageInsert::Inserted(_)));

        let second = store
            .insert_message(session_id, &text_entry(Some("m1"), "one again"))
            .unwrap();
        assert_eq!(second, MessageInsert::DuplicateUuid);

        // NULL UUIDs never collide with each other
        let a = store
            .insert_message(session_id, &text_entry(None, "a"))
            .unwrap();
        let b = store
            .insert_message(session_id, &text_entry(None, "b"))
            .unwrap();
        assert!(matches!(a, MessageInsert::Inserted(_)));
        assert!(matches!(b, MessageInsert::Inserted(_)));

        assert_eq!(count(&store, "messages"), 3);
    }

    #[test]
    fn test_message_for_missing_session_is_an_error() {
        let store = LogStore::open_in_memory().unwrap();
        let result = store.insert_message(9999, &text_entry(Some("m1"), "orphan"));
        assert!(result.is_err());
    }

    #[test]
    fn test_blocks_come_back_in_index_order() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();

        let mut entry = text_entry(Some("m1"), "ignored");
        entry.blocks.clear();
        let message_id = match store.insert_message(session_id, &entry).unwrap() {
            MessageInsert::Inserted(id) => id,
            other => panic!("unexpected insert result: {:?}", other),
        };

        // Physical insertion order deliberately scrambled
        for index in [2i64, 0, 1] {
            store
                .insert_content_block(
                    message_id,
                    index,
                    &ParsedBlock::text("text", &format!("block {}", index)),
                )
                .unwrap();
        }

        let blocks = store.get_content_blocks(message_id).unwrap();
        let indices: Vec<i64> = blocks.iter().map(|b| b.block_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(blocks[0].text_content.as_deref(), Some("block 0"));
    }

    #[test]
    fn test_duplicate_block_index_is_rejected() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();
        let mut entry = text_entry(Some("m1"), "ignored");
        entry.blocks.clear();
        let message_id = match store.insert_message(session_id, &entry).unwrap() {
            MessageInsert::Inserted(id) => id,
            other => panic!("unexpected insert result: {:?}", other),
        };

        store
            .insert_content_block(message_id, 0, &ParsedBlock::text("text", "first"))
            .unwrap();
        let dup = store.insert_content_block(message_id, 0, &ParsedBlock::text("text", "second"));
        assert!(dup.is_err());
    }

    #[test]
    fn test_messages_ordered_by_timestamp() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();

        let times = [
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
        ];
        for (i, ts) in times.iter().enumerate() {
            let mut entry = text_entry(Some(&format!("m{}", i)), "x");
            entry.timestamp = Some(*ts);
            store.insert_message(session_id, &entry).unwrap();
        }

        let messages = store.get_messages(session_id).unwrap();
        let uuids: Vec<&str> = messages.iter().filter_map(|m| m.uuid.as_deref()).collect();
        assert_eq!(uuids, vec!["m1", "m0", "m2"]);
    }

    #[test]
    fn test_cascade_delete_closure() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();

        store
            .insert_message(session_id, &text_entry(Some("m1"), "hello world"))
            .unwrap();
        store
            .insert_message(session_id, &text_entry(Some("m2"), "goodbye world"))
            .unwrap();

        assert_eq!(count(&store, "messages"), 2);
        assert_eq!(count(&store, "content_blocks"), 2);

        assert!(store.delete_session(SESSION_UUID).unwrap());

        assert_eq!(count(&store, "sessions"), 0);
        assert_eq!(count(&store, "messages"), 0);
        assert_eq!(count(&store, "content_blocks"), 0);
        // The FTS index followed the cascade
        assert!(store.search("hello", 10).unwrap().is_empty());

        // Deleting again is a no-op
        assert!(!store.delete_session(SESSION_UUID).unwrap());
    }

    #[test]
    fn test_search_scenario() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store
            .upsert_session(SESSION_UUID, Some("/repo/a"))
            .unwrap();

        store
            .insert_message(session_id, &text_entry(Some("m1"), "hello world"))
            .unwrap();

        let hits = store.search("hello", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].session_uuid, SESSION_UUID);
        assert_eq!(hits[0].text_content.as_deref(), Some("hello world"));

        let dup = store
            .insert_message(session_id, &text_entry(Some("m1"), "hello world"))
            .unwrap();
        assert_eq!(dup, MessageInsert::DuplicateUuid);

        assert!(store.delete_session(SESSION_UUID).unwrap());
        assert!(store.search("hello", 10).unwrap().is_empty());
    }

    #[test]
    fn test_fts_follows_text_update() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();
        store
            .insert_message(session_id, &text_entry(Some("m1"), "alpha"))
            .unwrap();

        store
            .conn
            .execute("UPDATE content_blocks SET text_content = 'bravo'", [])
            .unwrap();

        assert!(store.search("alpha", 10).unwrap().is_empty());
        assert_eq!(store.search("bravo", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_block_with_only_tool_use_id_is_valid() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();
        let mut entry = text_entry(Some("m1"), "ignored");
        entry.blocks = vec![ParsedBlock {
            block_type: "tool_result".to_string(),
            text: None,
            tool_name: None,
            tool_input: None,
            tool_use_id: Some("toolu_01".to_string()),
        }];

        store.insert_message(session_id, &entry).unwrap();
        assert_eq!(count(&store, "content_blocks"), 1);
    }

    #[test]
    fn test_watermark_roundtrip() {
        let store = LogStore::open_in_memory().unwrap();

        assert!(store.last_import_timestamp("/repo/a").unwrap().is_none());

        let first = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.set_last_import_timestamp("/repo/a", first).unwrap();
        assert_eq!(store.last_import_timestamp("/repo/a").unwrap(), Some(first));

        // Upsert overwrites
        let later = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        store.set_last_import_timestamp("/repo/a", later).unwrap();
        assert_eq!(store.last_import_timestamp("/repo/a").unwrap(), Some(later));

        assert!(store.last_import_timestamp("/repo/b").unwrap().is_none());
    }

    #[test]
    fn test_token_accumulation() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();

        store.add_session_tokens(session_id, 100, 20).unwrap();
        store.add_session_tokens(session_id, 50, 5).unwrap();

        let session = store.get_session(SESSION_UUID).unwrap().unwrap();
        assert_eq!(session.total_input_tokens, 150);
        assert_eq!(session.total_output_tokens, 25);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();

        let result: Result<()> = store.transaction(|| {
            store
                .insert_message(session_id, &text_entry(Some("m1"), "doomed"))
                .unwrap();
            anyhow::bail!("import failed mid-batch")
        });

        assert!(result.is_err());
        assert_eq!(count(&store, "messages"), 0);
        assert_eq!(count(&store, "content_blocks"), 0);
    }

    #[test]
    fn test_get_session_by_prefix() {
        let store = LogStore::open_in_memory().unwrap();
        store.upsert_session(SESSION_UUID, None).unwrap();

        let session = store.get_session("1111").unwrap().unwrap();
        assert_eq!(session.session_uuid, SESSION_UUID);
        assert!(store.get_session("9999").unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let store = LogStore::open_in_memory().unwrap();
        let session_id = store.upsert_session(SESSION_UUID, None).unwrap();
        store
            .insert_message(session_id, &text_entry(Some("m1"), "hello"))
            .unwrap();
        store.add_session_tokens(session_id, 10, 3).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.sessions, 1);
        assert_eq!(stats.messages, 1);
        assert_eq!(stats.content_blocks, 1);
        assert_eq!(stats.total_input_tokens, 10);
        assert_eq!(stats.total_output_tokens, 3);
    }
}
