use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use super::{RepertoireStore, Result, Snapshot, StoreError, Subscription};
use crate::db::Database;
use crate::model::{NewSong, NewTag, Song, SongPatch, Tag, TagPatch};

/// Embedded-database backend. Request/response only: there is no
/// external writer, so the live feed is driven by the mutations made
/// through this instance.
pub struct LocalStore {
    db: Database,
    subscribers: Mutex<Vec<(Sender<Snapshot>, Arc<AtomicBool>)>>,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(path)?,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Truncated to the precision the database stores, so a returned
    /// entity compares equal to its re-read copy.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    /// Push the current state to every live subscriber. Canceled or
    /// disconnected subscribers are dropped along the way.
    fn notify(&self) -> Result<()> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.is_empty() {
            return Ok(());
        }
        let snapshot = self.snapshot()?;
        subscribers.retain(|(sender, stop)| {
            !stop.load(Ordering::Relaxed) && sender.send(snapshot.clone()).is_ok()
        });
        Ok(())
    }
}

impl RepertoireStore for LocalStore {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            songs: self.db.list_songs()?,
            tags: self.db.list_tags()?,
        })
    }

    fn subscribe(&self) -> Result<Subscription> {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));

        // Deliver the current state before any change lands.
        sender
            .send(self.snapshot()?)
            .expect("receiver held by this function");

        self.subscribers.lock().unwrap().push((sender, stop.clone()));
        Ok(Subscription::new(receiver, stop))
    }

    fn create_song(&self, input: NewSong) -> Result<Song> {
        let now = Self::now();
        let song = Song {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            artist: input.artist,
            tags: input.tags,
            proficiency: input.proficiency,
            key: input.key,
            high_score: input.high_score,
            score_photo_id: input.score_photo_id,
            memo: input.memo,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_song(&song)?;
        self.notify()?;
        Ok(song)
    }

    fn update_song(&self, id: &str, patch: SongPatch) -> Result<Song> {
        let mut song = self.db.get_song(id)?.ok_or(StoreError::NotFound)?;
        patch.apply(&mut song);
        song.updated_at = Self::now();
        if !self.db.update_song(&song)? {
            return Err(StoreError::NotFound);
        }
        self.notify()?;
        Ok(song)
    }

    fn delete_song(&self, id: &str) -> Result<()> {
        if !self.db.delete_song(id)? {
            return Err(StoreError::NotFound);
        }
        self.notify()?;
        Ok(())
    }

    fn get_song(&self, id: &str) -> Result<Option<Song>> {
        Ok(self.db.get_song(id)?)
    }

    fn create_tag(&self, input: NewTag) -> Result<Tag> {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            color: input.color,
            created_at: Self::now(),
        };
        self.db.insert_tag(&tag)?;
        self.notify()?;
        Ok(tag)
    }

    fn update_tag(&self, id: &str, patch: TagPatch) -> Result<Tag> {
        let mut tag = self.db.get_tag(id)?.ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.name {
            tag.name = name;
        }
        if let Some(color) = patch.color {
            tag.color = color;
        }
        if !self.db.update_tag(&tag)? {
            return Err(StoreError::NotFound);
        }
        self.notify()?;
        Ok(tag)
    }

    fn delete_tag(&self, id: &str) -> Result<()> {
        if !self.db.delete_tag(id)? {
            return Err(StoreError::NotFound);
        }
        self.notify()?;
        Ok(())
    }

    fn put_photo(&self, id: &str, data: &[u8]) -> Result<()> {
        self.db.put_photo(id, data, &Self::now())?;
        Ok(())
    }

    fn get_photo(&self, id: &str) -> Result<Vec<u8>> {
        self.db.get_photo(id)?.ok_or(StoreError::NotFound)
    }

    fn delete_photo(&self, id: &str) -> Result<()> {
        if !self.db.delete_photo(id)? {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
