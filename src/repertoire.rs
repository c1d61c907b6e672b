use thiserror::Error;

use crate::model::{
    self, NewSong, NewTag, Song, SongPatch, Tag, TagPatch, ValidationError, PRESET_TAGS,
};
use crate::store::{RepertoireStore, Snapshot, StoreError, Subscription};

#[derive(Error, Debug)]
pub enum RepertoireError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RepertoireError>;

/// Collection-level numbers for the `stats` command.
#[derive(Debug)]
pub struct RepertoireStats {
    pub total_songs: usize,
    pub scored_songs: usize,
    pub avg_proficiency: f64,
    pub top_score: Option<f64>,
    /// (tag name, song count), most used first.
    pub tag_counts: Vec<(String, usize)>,
}

/// Outcome of a tag deletion cascade.
#[derive(Debug)]
pub struct TagDeleteResult {
    /// Songs that carried the tag and were rewritten without it.
    pub songs_updated: usize,
    /// Cascade writes that failed. The affected songs keep a dangling
    /// tag id, which readers skip.
    pub cascade_errors: usize,
}

/// The active session's view of the collection: one store backend plus
/// the latest snapshot. All mutations go through here; the snapshot is
/// refreshed from the store after each write, so the store's read path
/// stays the single source of truth.
pub struct Repertoire {
    store: Box<dyn RepertoireStore>,
    snapshot: Snapshot,
    seeded: bool,
}

impl Repertoire {
    /// Open a session over a backend. Seeds the preset tags when the
    /// tag collection is empty (first run).
    pub fn open(store: Box<dyn RepertoireStore>) -> Result<Self> {
        let mut repertoire = Self {
            store,
            snapshot: Snapshot::default(),
            seeded: false,
        };
        repertoire.refresh()?;
        repertoire.ensure_preset_tags()?;
        Ok(repertoire)
    }

    /// Re-fetch the authoritative state from the store.
    pub fn refresh(&mut self) -> Result<()> {
        self.snapshot = self.store.snapshot()?;
        Ok(())
    }

    /// Replace the in-memory state with a pushed snapshot (live feed).
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    pub fn subscribe(&self) -> Result<Subscription> {
        Ok(self.store.subscribe()?)
    }

    /// Direct access to the backend, for collaborators like the photo
    /// manager. Callers that mutate through it should `refresh` after.
    pub fn store(&self) -> &dyn RepertoireStore {
        self.store.as_ref()
    }

    /// Seed the preset tags into an empty tag collection, at most once
    /// per session. The latch makes a duplicate initialization call a
    /// no-op even when it races the snapshot refresh.
    pub fn ensure_preset_tags(&mut self) -> Result<()> {
        if self.seeded || !self.snapshot.tags.is_empty() {
            return Ok(());
        }
        self.seeded = true;
        log::info!("empty tag collection, seeding {} presets", PRESET_TAGS.len());
        for (name, color) in PRESET_TAGS {
            self.store.create_tag(NewTag {
                name: (*name).to_string(),
                color: (*color).to_string(),
            })?;
        }
        self.refresh()
    }

    pub fn songs(&self) -> &[Song] {
        &self.snapshot.songs
    }

    pub fn tags(&self) -> &[Tag] {
        &self.snapshot.tags
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn song(&self, id: &str) -> Option<&Song> {
        self.snapshot.songs.iter().find(|s| s.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.snapshot.tags.iter().find(|t| t.id == id)
    }

    /// The tags of a song that still resolve, in tag-store order.
    /// Ids of deleted tags are skipped, never an error.
    pub fn display_tags<'a>(&'a self, song: &Song) -> Vec<&'a Tag> {
        self.snapshot
            .tags
            .iter()
            .filter(|tag| song.tags.iter().any(|id| *id == tag.id))
            .collect()
    }

    /// Collection statistics computed over the current snapshot, so
    /// they mean the same thing on every backend.
    pub fn stats(&self) -> RepertoireStats {
        let songs = &self.snapshot.songs;
        let scored_songs = songs.iter().filter(|s| s.high_score.is_some()).count();
        let avg_proficiency = if songs.is_empty() {
            0.0
        } else {
            songs.iter().map(|s| s.proficiency as f64).sum::<f64>() / songs.len() as f64
        };
        let top_score = songs
            .iter()
            .filter_map(|s| s.high_score)
            .fold(None, |best: Option<f64>, score| {
                Some(best.map_or(score, |b| b.max(score)))
            });

        let mut tag_counts: Vec<(String, usize)> = self
            .snapshot
            .tags
            .iter()
            .map(|tag| {
                let count = songs
                    .iter()
                    .filter(|s| s.tags.iter().any(|t| *t == tag.id))
                    .count();
                (tag.name.clone(), count)
            })
            .collect();
        tag_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        RepertoireStats {
            total_songs: songs.len(),
            scored_songs,
            avg_proficiency,
            top_score,
            tag_counts,
        }
    }

    /// Whether any song currently carries the tag. Used to warn before
    /// a destructive delete; never used to block it.
    pub fn is_referenced(&self, tag_id: &str) -> bool {
        self.snapshot
            .songs
            .iter()
            .any(|song| song.tags.iter().any(|id| id == tag_id))
    }

    pub fn create_song(&mut self, mut input: NewSong) -> Result<Song> {
        model::validate_new_song(&mut input)?;
        let song = self.store.create_song(input)?;
        self.refresh()?;
        Ok(song)
    }

    pub fn update_song(&mut self, id: &str, mut patch: SongPatch) -> Result<Song> {
        model::validate_song_patch(&mut patch)?;
        let song = self.store.update_song(id, patch)?;
        self.refresh()?;
        Ok(song)
    }

    /// Delete a song, cleaning up its photo first when it has one.
    pub fn delete_song(&mut self, id: &str) -> Result<()> {
        let song = self.store.get_song(id)?.ok_or(StoreError::NotFound)?;
        if let Some(photo_id) = &song.score_photo_id {
            match self.store.delete_photo(photo_id) {
                Ok(()) | Err(StoreError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.store.delete_song(id)?;
        self.refresh()?;
        Ok(())
    }

    pub fn create_tag(&mut self, mut input: NewTag) -> Result<Tag> {
        model::validate_new_tag(&mut input)?;
        let tag = self.store.create_tag(input)?;
        self.refresh()?;
        Ok(tag)
    }

    pub fn update_tag(&mut self, id: &str, patch: TagPatch) -> Result<Tag> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyTagName.into());
            }
        }
        let tag = self.store.update_tag(id, patch)?;
        self.refresh()?;
        Ok(tag)
    }

    /// Delete a tag and strip it from every referencing song. Two
    /// phases behind one call: the tag record goes first, then each
    /// affected song is rewritten (refreshing its `updated_at`). A
    /// failed rewrite is logged and tolerated; the leftover id is
    /// skipped on read.
    pub fn delete_tag(&mut self, id: &str) -> Result<TagDeleteResult> {
        self.store.delete_tag(id)?;

        let referencing: Vec<(String, Vec<String>)> = self
            .snapshot
            .songs
            .iter()
            .filter(|song| song.tags.iter().any(|t| t == id))
            .map(|song| {
                let remaining = song
                    .tags
                    .iter()
                    .filter(|t| *t != id)
                    .cloned()
                    .collect();
                (song.id.clone(), remaining)
            })
            .collect();

        let mut result = TagDeleteResult { songs_updated: 0, cascade_errors: 0 };
        for (song_id, remaining) in referencing {
            let patch = SongPatch { tags: Some(remaining), ..SongPatch::default() };
            match self.store.update_song(&song_id, patch) {
                Ok(_) => result.songs_updated += 1,
                Err(e) => {
                    result.cascade_errors += 1;
                    log::warn!("tag cascade failed for song {song_id}: {e}");
                }
            }
        }

        self.refresh()?;
        Ok(result)
    }
}
