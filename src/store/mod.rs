pub mod local;
pub mod remote;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::model::{NewSong, NewTag, Song, SongPatch, Tag, TagPatch};

#[derive(Error, Debug)]
pub enum StoreError {
    /// The id does not exist. Update/delete on it is a no-op.
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] crate::db::DbError),
    #[error("remote store error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One authoritative view of both collections. Consumers replace their
/// state with each snapshot wholesale, never merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Most recently updated first.
    pub songs: Vec<Song>,
    pub tags: Vec<Tag>,
}

/// A live feed of collection snapshots. Dropping (or canceling) the
/// handle stops the backing poller and closes the channel.
pub struct Subscription {
    receiver: Receiver<Snapshot>,
    stop: Arc<AtomicBool>,
}

impl Subscription {
    pub(crate) fn new(receiver: Receiver<Snapshot>, stop: Arc<AtomicBool>) -> Self {
        Self { receiver, stop }
    }

    /// Block until the next snapshot. None once the feed is closed.
    pub fn recv(&self) -> Option<Snapshot> {
        self.receiver.recv().ok()
    }

    /// Like `recv`, but gives up after `timeout`. `Ok(None)` means the
    /// feed is closed; `Err(())` means no snapshot arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> std::result::Result<Option<Snapshot>, ()> {
        match self.receiver.recv_timeout(timeout) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => Err(()),
        }
    }

    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The one contract both storage backends satisfy. Chosen at startup
/// from configuration; call sites never branch on the variant.
///
/// Guarantees shared by all implementations:
/// - a create is visible in the next snapshot/read;
/// - a delete is absent from all subsequent reads;
/// - updates to different songs never affect each other
///   (last-write-wins per song).
pub trait RepertoireStore {
    /// Fetch the current authoritative state of both collections.
    fn snapshot(&self) -> Result<Snapshot>;

    /// Subscribe to live snapshots. The current state is delivered
    /// first; later snapshots follow collection changes.
    fn subscribe(&self) -> Result<Subscription>;

    fn create_song(&self, input: NewSong) -> Result<Song>;
    /// Merge the patch over the stored song and refresh its
    /// `updated_at`. `NotFound` when the id does not exist.
    fn update_song(&self, id: &str, patch: SongPatch) -> Result<Song>;
    fn delete_song(&self, id: &str) -> Result<()>;
    fn get_song(&self, id: &str) -> Result<Option<Song>>;

    fn create_tag(&self, input: NewTag) -> Result<Tag>;
    fn update_tag(&self, id: &str, patch: TagPatch) -> Result<Tag>;
    /// Removes only the tag record. The membership cascade is driven by
    /// the caller so every backend behaves identically.
    fn delete_tag(&self, id: &str) -> Result<()>;

    fn put_photo(&self, id: &str, data: &[u8]) -> Result<()>;
    fn get_photo(&self, id: &str) -> Result<Vec<u8>>;
    fn delete_photo(&self, id: &str) -> Result<()>;
}
