use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;
use uuid::Uuid;

use crate::model::SongPatch;
use crate::store::{RepertoireStore, StoreError};

/// Score photos are downscaled to fit within this box.
pub const MAX_DIMENSION: u32 = 1200;
/// JPEG re-encode quality.
pub const JPEG_QUALITY: u8 = 80;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreadable or unsupported image: {0}")]
    Image(#[from] image::ImageError),
    #[error("song not found")]
    SongNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PhotoError>;

/// Normalize a raw image into the stored photo format: decode whatever
/// the codec stack reads, downscale (only when larger) to fit within
/// 1200x1200 preserving aspect ratio, re-encode as JPEG quality 80.
pub fn process_image(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
    encoder.encode_image(&rgb)?;
    Ok(out)
}

/// Keeps the one-live-photo-per-song invariant over any store backend:
/// a song's photo reference is null or resolvable, and replacing a
/// photo releases the old bytes within the same attach call.
pub struct PhotoManager<'a> {
    store: &'a dyn RepertoireStore,
}

impl<'a> PhotoManager<'a> {
    pub fn new(store: &'a dyn RepertoireStore) -> Self {
        Self { store }
    }

    /// Process and store a photo for a song, replacing any existing
    /// one. Returns the new photo id. Processing happens before
    /// anything is written, and the song record is only repointed after
    /// the new bytes are stored, so a failure at any step leaves the
    /// song's current reference resolvable.
    pub fn attach(&self, song_id: &str, raw_image: &[u8]) -> Result<String> {
        let song = self
            .store
            .get_song(song_id)?
            .ok_or(PhotoError::SongNotFound)?;

        let processed = process_image(raw_image)?;

        let photo_id = Uuid::new_v4().to_string();
        self.store.put_photo(&photo_id, &processed)?;
        let repoint = self.store.update_song(
            song_id,
            SongPatch {
                score_photo_id: Some(Some(photo_id.clone())),
                ..SongPatch::default()
            },
        );
        if let Err(e) = repoint {
            // Don't leak the bytes we just stored.
            let _ = self.store.delete_photo(&photo_id);
            return Err(e.into());
        }

        // Release the replaced photo's bytes. Already-gone is fine.
        if let Some(old_id) = &song.score_photo_id {
            match self.store.delete_photo(old_id) {
                Ok(()) | Err(StoreError::NotFound) => {}
                Err(e) => log::warn!("failed to release replaced photo {old_id}: {e}"),
            }
        }

        Ok(photo_id)
    }

    /// Remove a song's photo: bytes first, then the reference. No-op
    /// when the song has no photo.
    pub fn detach(&self, song_id: &str) -> Result<()> {
        let song = self
            .store
            .get_song(song_id)?
            .ok_or(PhotoError::SongNotFound)?;

        let Some(photo_id) = &song.score_photo_id else {
            return Ok(());
        };

        match self.store.delete_photo(photo_id) {
            Ok(()) | Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        self.store.update_song(
            song_id,
            SongPatch {
                score_photo_id: Some(None),
                ..SongPatch::default()
            },
        )?;
        Ok(())
    }

    /// The stored bytes for a photo reference.
    pub fn resolve(&self, photo_id: &str) -> Result<Vec<u8>> {
        Ok(self.store.get_photo(photo_id)?)
    }
}
