pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Database {
    pub conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        // WAL mode for better concurrent read performance
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        self.migrate()?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if version < 1 {
            self.migrate_v1()?;
        }

        self.conn.pragma_update(None, "user_version", 1)?;
        Ok(())
    }

    /// V1: songs + tag membership + tags + photos
    fn migrate_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS songs (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                artist          TEXT NOT NULL,
                proficiency     INTEGER NOT NULL,
                key_original    TEXT NOT NULL DEFAULT '',
                key_adjustment  INTEGER NOT NULL DEFAULT 0,
                high_score      REAL,
                score_photo_id  TEXT,
                memo            TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title);
            CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs(artist);
            CREATE INDEX IF NOT EXISTS idx_songs_proficiency ON songs(proficiency);
            CREATE INDEX IF NOT EXISTS idx_songs_high_score ON songs(high_score);
            CREATE INDEX IF NOT EXISTS idx_songs_created ON songs(created_at);
            CREATE INDEX IF NOT EXISTS idx_songs_updated ON songs(updated_at);

            -- Tag membership. tag_id has no foreign key on purpose: a song
            -- may keep the id of a tag whose cascade removal didn't reach it,
            -- and readers skip unresolved ids.
            CREATE TABLE IF NOT EXISTS song_tags (
                song_id TEXT NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
                tag_id  TEXT NOT NULL,
                PRIMARY KEY (song_id, tag_id)
            );
            CREATE INDEX IF NOT EXISTS idx_song_tags_tag ON song_tags(tag_id);

            CREATE TABLE IF NOT EXISTS tags (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                color       TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name);

            CREATE TABLE IF NOT EXISTS photos (
                id          TEXT PRIMARY KEY,
                data        BLOB NOT NULL,
                created_at  TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_parent_dirs_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ohako.db");

        {
            let db = Database::open(&path).unwrap();
            db.conn
                .execute(
                    "INSERT INTO tags (id, name, color, created_at)
                     VALUES ('t1', '盛り上がる', '#EF4444', '2024-06-01T00:00:00.000000Z')",
                    [],
                )
                .unwrap();
        }

        // Reopening re-runs init/migrate; both must be idempotent and
        // the data must survive.
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let version: i32 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_in_memory_schema_is_queryable() {
        let db = Database::open_in_memory().unwrap();
        for table in ["songs", "song_tags", "tags", "photos"] {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            let count: i64 = db.conn.query_row(&sql, [], |row| row.get(0)).unwrap();
            assert_eq!(count, 0);
        }
    }
}
