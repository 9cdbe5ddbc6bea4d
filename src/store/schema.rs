//! SQLite schema definition
//!
//! Four tables: sessions, messages, content_blocks, import_metadata.
//! Message content lives in content_blocks, one row per block, ordered by
//! block_index. Full-text search over text_content is an external-content
//! FTS5 table kept in sync by triggers, so callers never write the index
//! themselves.

pub const SCHEMA: &str = r#"
-- ============================================
-- SESSIONS
-- ============================================

-- One row per Claude Code session
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_uuid TEXT NOT NULL UNIQUE,
    project_path TEXT,
    summary TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    total_input_tokens INTEGER DEFAULT 0,
    total_output_tokens INTEGER DEFAULT 0
);

-- ============================================
-- MESSAGES
-- ============================================

-- One row per log entry (envelope only, content in content_blocks)
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    uuid TEXT,
    type TEXT NOT NULL,                    -- 'user', 'assistant', 'system', 'summary', etc.
    role TEXT,                             -- 'user', 'assistant' (from message.role)
    timestamp DATETIME,                    -- RFC 3339 UTC
    cwd TEXT,
    input_tokens INTEGER,
    output_tokens INTEGER,
    version TEXT,
    FOREIGN KEY(session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

-- ============================================
-- CONTENT BLOCKS
-- ============================================

CREATE TABLE IF NOT EXISTS content_blocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id INTEGER NOT NULL,
    block_index INTEGER NOT NULL,          -- order within the message
    block_type TEXT NOT NULL,              -- 'text', 'tool_use', 'tool_result', 'thinking'
    text_content TEXT,                     -- for text, thinking, tool_result blocks
    tool_name TEXT,                        -- for tool_use blocks
    tool_input TEXT,                       -- for tool_use blocks (JSON input parameters)
    tool_use_id TEXT,                      -- links tool_use to its tool_result
    UNIQUE(message_id, block_index),
    FOREIGN KEY(message_id) REFERENCES messages(id) ON DELETE CASCADE
);

-- ============================================
-- IMPORT METADATA
-- ============================================

-- Last import watermark per project, for incremental re-imports
CREATE TABLE IF NOT EXISTS import_metadata (
    project_path TEXT PRIMARY KEY,
    last_import_timestamp DATETIME NOT NULL
);

-- ============================================
-- INDEXES
-- ============================================

-- Messages indexes
CREATE INDEX IF NOT EXISTS idx_messages_session_id ON messages(session_id);
CREATE INDEX IF NOT EXISTS idx_messages_type ON messages(type);
CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_messages_session_timestamp ON messages(session_id, timestamp DESC);

-- Unique among non-null UUIDs: the idempotent-import guard
CREATE UNIQUE INDEX IF NOT EXISTS idx_messages_uuid_unique
    ON messages(uuid) WHERE uuid IS NOT NULL;

-- Content block indexes
CREATE INDEX IF NOT EXISTS idx_content_blocks_message_id ON content_blocks(message_id);
CREATE INDEX IF NOT EXISTS idx_content_blocks_type ON content_blocks(block_type);
CREATE INDEX IF NOT EXISTS idx_content_blocks_tool_use_id ON content_blocks(tool_use_id);
CREATE INDEX IF NOT EXISTS idx_content_blocks_tool_name ON content_blocks(tool_name);

-- ============================================
-- FULL-TEXT SEARCH
-- ============================================

-- External-content FTS5 table over text_content. The triggers are the only
-- writers; a NULL text_content indexes as empty.
CREATE VIRTUAL TABLE IF NOT EXISTS content_blocks_fts USING fts5(
    text_content,
    content='content_blocks',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS content_blocks_ai AFTER INSERT ON content_blocks BEGIN
    INSERT INTO content_blocks_fts(rowid, text_content)
    VALUES (new.id, new.text_content);
END;

CREATE TRIGGER IF NOT EXISTS content_blocks_ad AFTER DELETE ON content_blocks BEGIN
    INSERT INTO content_blocks_fts(content_blocks_fts, rowid, text_content)
    VALUES ('delete', old.id, old.text_content);
END;

CREATE TRIGGER IF NOT EXISTS content_blocks_au AFTER UPDATE ON content_blocks BEGIN
    INSERT INTO content_blocks_fts(content_blocks_fts, rowid, text_content)
    VALUES ('delete', old.id, old.text_content);
    INSERT INTO content_blocks_fts(rowid, text_content)
    VALUES (new.id, new.text_content);
END;
"#;
