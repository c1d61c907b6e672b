use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::params;

use super::{Database, Result};
use crate::model::{KeySetting, Song, Tag};

/// Timestamps are stored as RFC 3339 UTC with fixed precision, so
/// lexicographic ORDER BY matches chronological order.
fn ts_to_sql(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn ts_from_sql(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_song(row: &rusqlite::Row) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        tags: Vec::new(), // attached separately from song_tags
        proficiency: row.get(3)?,
        key: KeySetting {
            original: row.get(4)?,
            adjustment: row.get(5)?,
        },
        high_score: row.get(6)?,
        score_photo_id: row.get(7)?,
        memo: row.get(8)?,
        created_at: ts_from_sql(9, row.get(9)?)?,
        updated_at: ts_from_sql(10, row.get(10)?)?,
    })
}

const SONG_COLUMNS: &str = "id, title, artist, proficiency, key_original, key_adjustment,
     high_score, score_photo_id, memo, created_at, updated_at";

impl Database {
    /// Insert a song with its tag memberships in one transaction.
    pub fn insert_song(&self, song: &Song) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO songs (
                id, title, artist, proficiency, key_original, key_adjustment,
                high_score, score_photo_id, memo, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                song.id, song.title, song.artist, song.proficiency,
                song.key.original, song.key.adjustment,
                song.high_score, song.score_photo_id, song.memo,
                ts_to_sql(&song.created_at), ts_to_sql(&song.updated_at),
            ],
        )?;
        Self::write_song_tags(&tx, &song.id, &song.tags)?;
        tx.commit()?;
        Ok(())
    }

    /// Rewrite a song row (and its tag memberships) in one transaction.
    /// Returns false when the id does not exist.
    pub fn update_song(&self, song: &Song) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE songs SET
                title = ?2, artist = ?3, proficiency = ?4,
                key_original = ?5, key_adjustment = ?6,
                high_score = ?7, score_photo_id = ?8, memo = ?9,
                updated_at = ?10
             WHERE id = ?1",
            params![
                song.id, song.title, song.artist, song.proficiency,
                song.key.original, song.key.adjustment,
                song.high_score, song.score_photo_id, song.memo,
                ts_to_sql(&song.updated_at),
            ],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        tx.execute("DELETE FROM song_tags WHERE song_id = ?1", params![song.id])?;
        Self::write_song_tags(&tx, &song.id, &song.tags)?;
        tx.commit()?;
        Ok(true)
    }

    fn write_song_tags(
        conn: &rusqlite::Connection,
        song_id: &str,
        tags: &[String],
    ) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let mut stmt = conn.prepare_cached(
            "INSERT OR IGNORE INTO song_tags (song_id, tag_id) VALUES (?1, ?2)",
        )?;
        for tag_id in tags {
            stmt.execute(params![song_id, tag_id])?;
        }
        Ok(())
    }

    pub fn get_song(&self, id: &str) -> Result<Option<Song>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
                params![id],
                row_to_song,
            );
        let mut song = match row {
            Ok(song) => song,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = self
            .conn
            .prepare_cached("SELECT tag_id FROM song_tags WHERE song_id = ?1 ORDER BY tag_id")?;
        song.tags = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(song))
    }

    /// All songs, most recently updated first.
    pub fn list_songs(&self) -> Result<Vec<Song>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SONG_COLUMNS} FROM songs ORDER BY updated_at DESC, id"
        ))?;
        let mut songs = stmt
            .query_map([], row_to_song)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Attach tag memberships in one pass.
        let mut tag_stmt = self
            .conn
            .prepare("SELECT song_id, tag_id FROM song_tags ORDER BY song_id, tag_id")?;
        let mut by_song: HashMap<String, Vec<String>> = HashMap::new();
        let rows = tag_stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (song_id, tag_id) = row?;
            by_song.entry(song_id).or_default().push(tag_id);
        }
        for song in &mut songs {
            if let Some(tags) = by_song.remove(&song.id) {
                song.tags = tags;
            }
        }
        Ok(songs)
    }

    /// Returns false when the id does not exist. Tag memberships go with
    /// the row (ON DELETE CASCADE).
    pub fn delete_song(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn insert_tag(&self, tag: &Tag) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![tag.id, tag.name, tag.color, ts_to_sql(&tag.created_at)],
        )?;
        Ok(())
    }

    pub fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        let row = self.conn.query_row(
            "SELECT id, name, color, created_at FROM tags WHERE id = ?1",
            params![id],
            |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    created_at: ts_from_sql(3, row.get(3)?)?,
                })
            },
        );
        match row {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All tags, oldest first (creation order).
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, created_at FROM tags ORDER BY created_at, id",
        )?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    created_at: ts_from_sql(3, row.get(3)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn update_tag(&self, tag: &Tag) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE tags SET name = ?2, color = ?3 WHERE id = ?1",
            params![tag.id, tag.name, tag.color],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_tag(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn put_photo(&self, id: &str, data: &[u8], created_at: &DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO photos (id, data, created_at) VALUES (?1, ?2, ?3)",
            params![id, data, ts_to_sql(created_at)],
        )?;
        Ok(())
    }

    pub fn get_photo(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let row = self.conn.query_row(
            "SELECT data FROM photos WHERE id = ?1",
            params![id],
            |row| row.get(0),
        );
        match row {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_photo(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM photos WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
