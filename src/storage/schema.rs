//! Database schema definitions

use rusqlite::Connection;

/// SQL schema for the harvester database
pub const SCHEMA_SQL: &str = r#"
-- Harvested article and discussion records, keyed by exact URL
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url TEXT NOT NULL,
    tags TEXT NOT NULL,
    publish_date TEXT,
    outbound_links TEXT NOT NULL,
    byte_size INTEGER NOT NULL,
    inserted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_kind ON articles(kind);
CREATE INDEX IF NOT EXISTS idx_articles_inserted_at ON articles(inserted_at);

-- Frontier backlog carried between sessions
CREATE TABLE IF NOT EXISTS backlog (
    url TEXT PRIMARY KEY,
    added_at TEXT NOT NULL
);

-- Operator-managed seed sites; empty means "use configured/builtin seeds"
CREATE TABLE IF NOT EXISTS seeds (
    url TEXT PRIMARY KEY
);

-- Operator-managed tag vocabulary; empty means "use the builtin vocabulary"
CREATE TABLE IF NOT EXISTS vocabulary (
    tag TEXT PRIMARY KEY
);
"#;

/// Initializes the database schema
///
/// Idempotent: safe to call on every open.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
