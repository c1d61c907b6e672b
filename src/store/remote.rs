use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{RepertoireStore, Result, Snapshot, StoreError, Subscription};
use crate::model::{NewSong, NewTag, Song, SongPatch, Tag, TagPatch};

/// How often a sleeping poller checks for cancellation or a poke.
const POLL_SLICE_MS: u64 = 50;

/// Remote document-store backend. Documents live under a per-user
/// namespace (`users/{user_id}/songs|tags|photos`); the server assigns
/// ids and both timestamps on write. Reads are push-shaped: a
/// subscription polls the full collections and delivers each result as
/// an authoritative snapshot, including the echo of this client's own
/// writes.
pub struct RemoteStore {
    base_url: String,
    user_id: String,
    poll_interval: Duration,
    /// One poke flag per live subscription; set after each write so the
    /// poller refreshes without waiting out its interval.
    pokes: Mutex<Vec<Arc<AtomicBool>>>,
}

impl RemoteStore {
    pub fn new(base_url: &str, user_id: &str, poll_interval: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            poll_interval,
            pokes: Mutex::new(Vec::new()),
        }
    }

    fn songs_url(&self) -> String {
        collection_url(&self.base_url, &self.user_id, "songs")
    }

    fn tags_url(&self) -> String {
        collection_url(&self.base_url, &self.user_id, "tags")
    }

    fn photos_url(&self) -> String {
        collection_url(&self.base_url, &self.user_id, "photos")
    }

    /// Wake every live poller so the write's echo arrives promptly.
    fn poke(&self) {
        let mut pokes = self.pokes.lock().unwrap();
        pokes.retain(|p| Arc::strong_count(p) > 1);
        for poke in pokes.iter() {
            poke.store(true, Ordering::Relaxed);
        }
    }
}

fn collection_url(base: &str, user_id: &str, collection: &str) -> String {
    format!("{base}/users/{user_id}/{collection}")
}

fn remote_err(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Remote(format!("{context}: {e}"))
}

/// Map an HTTP error, turning 404 into the store's NotFound.
fn call_err(context: &str, e: ureq::Error) -> StoreError {
    match e {
        ureq::Error::StatusCode(404) => StoreError::NotFound,
        e => remote_err(context, e),
    }
}

fn fetch_snapshot(songs_url: &str, tags_url: &str) -> Result<Snapshot> {
    // Server-side ordering: songs by updatedAt descending, tags by name.
    let songs: Vec<Song> = ureq::get(songs_url)
        .call()
        .map_err(|e| remote_err("fetch songs", e))?
        .body_mut()
        .read_json()
        .map_err(|e| remote_err("parse songs", e))?;

    let tags: Vec<Tag> = ureq::get(tags_url)
        .call()
        .map_err(|e| remote_err("fetch tags", e))?
        .body_mut()
        .read_json()
        .map_err(|e| remote_err("parse tags", e))?;

    Ok(Snapshot { songs, tags })
}

impl RepertoireStore for RemoteStore {
    fn snapshot(&self) -> Result<Snapshot> {
        fetch_snapshot(&self.songs_url(), &self.tags_url())
    }

    fn subscribe(&self) -> Result<Subscription> {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let poke = Arc::new(AtomicBool::new(false));
        self.pokes.lock().unwrap().push(poke.clone());

        let songs_url = self.songs_url();
        let tags_url = self.tags_url();
        let interval = self.poll_interval;
        let thread_stop = stop.clone();

        thread::spawn(move || {
            let mut last: Option<Snapshot> = None;
            loop {
                if thread_stop.load(Ordering::Relaxed) {
                    return;
                }
                match fetch_snapshot(&songs_url, &tags_url) {
                    Ok(snapshot) => {
                        // Only deliver actual collection changes.
                        if last.as_ref() != Some(&snapshot) {
                            if sender.send(snapshot.clone()).is_err() {
                                return; // receiver gone
                            }
                            last = Some(snapshot);
                        }
                    }
                    Err(e) => log::warn!("snapshot poll failed: {e}"),
                }

                // Sleep in slices so cancellation and write pokes land fast.
                let mut slept = Duration::ZERO;
                while slept < interval {
                    if thread_stop.load(Ordering::Relaxed) {
                        return;
                    }
                    if poke.swap(false, Ordering::Relaxed) {
                        break;
                    }
                    thread::sleep(Duration::from_millis(POLL_SLICE_MS));
                    slept += Duration::from_millis(POLL_SLICE_MS);
                }
            }
        });

        Ok(Subscription::new(receiver, stop))
    }

    fn create_song(&self, input: NewSong) -> Result<Song> {
        let song: Song = ureq::post(&self.songs_url())
            .send_json(&input)
            .map_err(|e| remote_err("create song", e))?
            .body_mut()
            .read_json()
            .map_err(|e| remote_err("parse created song", e))?;
        self.poke();
        Ok(song)
    }

    fn update_song(&self, id: &str, patch: SongPatch) -> Result<Song> {
        let url = format!("{}/{id}", self.songs_url());
        let song: Song = ureq::patch(&url)
            .send_json(&patch)
            .map_err(|e| call_err("update song", e))?
            .body_mut()
            .read_json()
            .map_err(|e| remote_err("parse updated song", e))?;
        self.poke();
        Ok(song)
    }

    fn delete_song(&self, id: &str) -> Result<()> {
        let url = format!("{}/{id}", self.songs_url());
        ureq::delete(&url)
            .call()
            .map_err(|e| call_err("delete song", e))?;
        self.poke();
        Ok(())
    }

    fn get_song(&self, id: &str) -> Result<Option<Song>> {
        let url = format!("{}/{id}", self.songs_url());
        match ureq::get(&url).call() {
            Ok(mut resp) => {
                let song = resp
                    .body_mut()
                    .read_json()
                    .map_err(|e| remote_err("parse song", e))?;
                Ok(Some(song))
            }
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(remote_err("fetch song", e)),
        }
    }

    fn create_tag(&self, input: NewTag) -> Result<Tag> {
        let tag: Tag = ureq::post(&self.tags_url())
            .send_json(&input)
            .map_err(|e| remote_err("create tag", e))?
            .body_mut()
            .read_json()
            .map_err(|e| remote_err("parse created tag", e))?;
        self.poke();
        Ok(tag)
    }

    fn update_tag(&self, id: &str, patch: TagPatch) -> Result<Tag> {
        let url = format!("{}/{id}", self.tags_url());
        let tag: Tag = ureq::patch(&url)
            .send_json(&patch)
            .map_err(|e| call_err("update tag", e))?
            .body_mut()
            .read_json()
            .map_err(|e| remote_err("parse updated tag", e))?;
        self.poke();
        Ok(tag)
    }

    fn delete_tag(&self, id: &str) -> Result<()> {
        let url = format!("{}/{id}", self.tags_url());
        ureq::delete(&url)
            .call()
            .map_err(|e| call_err("delete tag", e))?;
        self.poke();
        Ok(())
    }

    fn put_photo(&self, id: &str, data: &[u8]) -> Result<()> {
        let url = format!("{}/{id}", self.photos_url());
        ureq::put(&url)
            .header("Content-Type", "image/jpeg")
            .send(data)
            .map_err(|e| remote_err("upload photo", e))?;
        Ok(())
    }

    fn get_photo(&self, id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{id}", self.photos_url());
        let mut resp = ureq::get(&url)
            .call()
            .map_err(|e| call_err("fetch photo", e))?;
        resp.body_mut()
            .read_to_vec()
            .map_err(|e| remote_err("read photo", e))
    }

    fn delete_photo(&self, id: &str) -> Result<()> {
        let url = format!("{}/{id}", self.photos_url());
        ureq::delete(&url)
            .call()
            .map_err(|e| call_err("delete photo", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_urls() {
        let store = RemoteStore::new(
            "https://repertoire.example.com/api/",
            "user-42",
            Duration::from_secs(2),
        );
        assert_eq!(
            store.songs_url(),
            "https://repertoire.example.com/api/users/user-42/songs"
        );
        assert_eq!(
            store.tags_url(),
            "https://repertoire.example.com/api/users/user-42/tags"
        );
        assert_eq!(
            store.photos_url(),
            "https://repertoire.example.com/api/users/user-42/photos"
        );
    }

    #[test]
    fn test_song_document_parsing() {
        let json = r#"[{
            "id": "abc123",
            "title": "Lemon",
            "artist": "米津玄師",
            "tags": ["t-jpop"],
            "proficiency": 4,
            "key": {"original": "B", "adjustment": -2},
            "highScore": 91.5,
            "scorePhotoId": null,
            "memo": "",
            "createdAt": "2024-06-01T12:00:00Z",
            "updatedAt": "2024-06-02T09:30:00Z"
        }]"#;
        let songs: Vec<Song> = serde_json::from_str(json).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Lemon");
        assert_eq!(songs[0].high_score, Some(91.5));
        assert_eq!(songs[0].key.adjustment, -2);
        assert!(songs[0].updated_at > songs[0].created_at);
    }

    #[test]
    fn test_tag_document_parsing() {
        let json = r##"[
            {"id": "t1", "name": "アニソン", "color": "#8B5CF6",
             "createdAt": "2024-06-01T00:00:00Z"},
            {"id": "t2", "name": "バラード", "color": "#3B82F6",
             "createdAt": "2024-06-01T00:00:01Z"}
        ]"##;
        let tags: Vec<Tag> = serde_json::from_str(json).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "アニソン");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = SongPatch {
            proficiency: Some(5),
            high_score: Some(None),
            ..SongPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["proficiency"], 5);
        // Clearing a score sends an explicit null...
        assert!(json["highScore"].is_null());
        assert!(json.as_object().unwrap().contains_key("highScore"));
        // ...but an untouched photo reference is not sent at all.
        assert!(!json.as_object().unwrap().contains_key("scorePhotoId"));
    }

    #[test]
    fn test_poke_wakes_all_live_subscribers() {
        let store = RemoteStore::new("http://localhost:9", "u", Duration::from_secs(60));
        let poke = Arc::new(AtomicBool::new(false));
        store.pokes.lock().unwrap().push(poke.clone());

        store.poke();
        assert!(poke.load(Ordering::Relaxed));
    }
}
