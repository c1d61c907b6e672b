use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semitone transposition from a song's original key, range -6..=+6.
pub const KEY_ADJUST_MIN: i8 = -6;
pub const KEY_ADJUST_MAX: i8 = 6;

/// Tags seeded into an empty tag store on first run.
pub const PRESET_TAGS: &[(&str, &str)] = &[
    ("盛り上がる", "#EF4444"),
    ("バラード", "#3B82F6"),
    ("アニソン", "#8B5CF6"),
    ("J-POP", "#10B981"),
    ("洋楽", "#F59E0B"),
    ("デュエット", "#EC4899"),
    ("懐メロ", "#6366F1"),
    ("ボカロ", "#06B6D4"),
];

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("artist must not be empty")]
    EmptyArtist,
    #[error("proficiency must be 1-5, got {0}")]
    ProficiencyOutOfRange(u8),
    #[error("key adjustment must be {KEY_ADJUST_MIN}..{KEY_ADJUST_MAX}, got {0}")]
    KeyAdjustmentOutOfRange(i8),
    #[error("high score must be 0-100, got {0}")]
    HighScoreOutOfRange(f64),
    #[error("tag name must not be empty")]
    EmptyTagName,
}

/// Original key plus the singer's semitone adjustment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeySetting {
    pub original: String,
    pub adjustment: i8,
}

/// A repertoire entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Tag ids. Set semantics: no duplicates, order irrelevant.
    /// May contain ids of since-deleted tags; readers skip those.
    pub tags: Vec<String>,
    /// 1-5 star self-rating.
    pub proficiency: u8,
    pub key: KeySetting,
    /// Best recorded score, 0-100. None means no score yet.
    pub high_score: Option<f64>,
    pub score_photo_id: Option<String>,
    pub memo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, colored label. Many-to-many with songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    /// Display color token, e.g. "#EF4444".
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a song. Id and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub tags: Vec<String>,
    pub proficiency: u8,
    pub key: KeySetting,
    pub high_score: Option<f64>,
    pub score_photo_id: Option<String>,
    pub memo: String,
}

impl Default for NewSong {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            tags: Vec::new(),
            proficiency: 3,
            key: KeySetting::default(),
            high_score: None,
            score_photo_id: None,
            memo: String::new(),
        }
    }
}

/// Partial update for a song. None fields are left untouched and are
/// not sent over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeySetting>,
    /// Some(None) clears the score (an explicit null on the wire).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_score: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_photo_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl SongPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.tags.is_none()
            && self.proficiency.is_none()
            && self.key.is_none()
            && self.high_score.is_none()
            && self.score_photo_id.is_none()
            && self.memo.is_none()
    }

    /// Merge this patch over an existing song. Does not touch timestamps.
    pub fn apply(&self, song: &mut Song) {
        if let Some(title) = &self.title {
            song.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            song.artist = artist.clone();
        }
        if let Some(tags) = &self.tags {
            song.tags = dedup_tags(tags);
        }
        if let Some(proficiency) = self.proficiency {
            song.proficiency = proficiency;
        }
        if let Some(key) = &self.key {
            song.key = key.clone();
        }
        if let Some(high_score) = self.high_score {
            song.high_score = high_score;
        }
        if let Some(score_photo_id) = &self.score_photo_id {
            song.score_photo_id = score_photo_id.clone();
        }
        if let Some(memo) = &self.memo {
            song.memo = memo.clone();
        }
    }
}

/// Input for creating a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

/// Partial update for a tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Collapse duplicate tag ids, keeping first occurrence order.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

/// Validate a full song input. Trims title/artist in place.
pub fn validate_new_song(input: &mut NewSong) -> Result<(), ValidationError> {
    input.title = input.title.trim().to_string();
    input.artist = input.artist.trim().to_string();
    if input.title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if input.artist.is_empty() {
        return Err(ValidationError::EmptyArtist);
    }
    validate_proficiency(input.proficiency)?;
    validate_key_adjustment(input.key.adjustment)?;
    if let Some(score) = input.high_score {
        validate_high_score(score)?;
    }
    input.tags = dedup_tags(&input.tags);
    Ok(())
}

/// Validate the fields a patch actually sets. Trims title/artist in place.
pub fn validate_song_patch(patch: &mut SongPatch) -> Result<(), ValidationError> {
    if let Some(title) = &mut patch.title {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
    }
    if let Some(artist) = &mut patch.artist {
        *artist = artist.trim().to_string();
        if artist.is_empty() {
            return Err(ValidationError::EmptyArtist);
        }
    }
    if let Some(proficiency) = patch.proficiency {
        validate_proficiency(proficiency)?;
    }
    if let Some(key) = &patch.key {
        validate_key_adjustment(key.adjustment)?;
    }
    if let Some(Some(score)) = patch.high_score {
        validate_high_score(score)?;
    }
    if let Some(tags) = &mut patch.tags {
        *tags = dedup_tags(tags);
    }
    Ok(())
}

pub fn validate_new_tag(input: &mut NewTag) -> Result<(), ValidationError> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(ValidationError::EmptyTagName);
    }
    Ok(())
}

fn validate_proficiency(p: u8) -> Result<(), ValidationError> {
    if (1..=5).contains(&p) {
        Ok(())
    } else {
        Err(ValidationError::ProficiencyOutOfRange(p))
    }
}

fn validate_key_adjustment(adj: i8) -> Result<(), ValidationError> {
    if (KEY_ADJUST_MIN..=KEY_ADJUST_MAX).contains(&adj) {
        Ok(())
    } else {
        Err(ValidationError::KeyAdjustmentOutOfRange(adj))
    }
}

fn validate_high_score(score: f64) -> Result<(), ValidationError> {
    if (0.0..=100.0).contains(&score) {
        Ok(())
    } else {
        Err(ValidationError::HighScoreOutOfRange(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewSong {
        NewSong {
            title: "夜明けのうた".to_string(),
            artist: "テスト歌手".to_string(),
            proficiency: 4,
            ..NewSong::default()
        }
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        let mut input = valid_input();
        assert!(validate_new_song(&mut input).is_ok());
    }

    #[test]
    fn test_validate_trims_and_rejects_blank_title() {
        let mut input = valid_input();
        input.title = "   ".to_string();
        assert!(matches!(
            validate_new_song(&mut input),
            Err(ValidationError::EmptyTitle)
        ));

        let mut input = valid_input();
        input.title = "  Lemon  ".to_string();
        validate_new_song(&mut input).unwrap();
        assert_eq!(input.title, "Lemon");
    }

    #[test]
    fn test_validate_proficiency_bounds() {
        for p in [0u8, 6] {
            let mut input = valid_input();
            input.proficiency = p;
            assert!(validate_new_song(&mut input).is_err());
        }
        for p in 1..=5u8 {
            let mut input = valid_input();
            input.proficiency = p;
            assert!(validate_new_song(&mut input).is_ok());
        }
    }

    #[test]
    fn test_validate_key_adjustment_bounds() {
        let mut input = valid_input();
        input.key.adjustment = -7;
        assert!(validate_new_song(&mut input).is_err());

        let mut input = valid_input();
        input.key.adjustment = 7;
        assert!(validate_new_song(&mut input).is_err());

        let mut input = valid_input();
        input.key.adjustment = -6;
        assert!(validate_new_song(&mut input).is_ok());
    }

    #[test]
    fn test_validate_high_score_bounds() {
        let mut input = valid_input();
        input.high_score = Some(100.5);
        assert!(validate_new_song(&mut input).is_err());

        let mut input = valid_input();
        input.high_score = Some(-0.1);
        assert!(validate_new_song(&mut input).is_err());

        let mut input = valid_input();
        input.high_score = None;
        assert!(validate_new_song(&mut input).is_ok());
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let mut input = valid_input();
        input.tags = vec!["a".into(), "b".into(), "a".into(), "b".into()];
        validate_new_song(&mut input).unwrap();
        assert_eq!(input.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_patch_apply_merges_only_set_fields() {
        let now = Utc::now();
        let mut song = Song {
            id: "s1".into(),
            title: "Lemon".into(),
            artist: "米津玄師".into(),
            tags: vec!["t1".into()],
            proficiency: 3,
            key: KeySetting { original: "B".into(), adjustment: -2 },
            high_score: Some(88.5),
            score_photo_id: None,
            memo: String::new(),
            created_at: now,
            updated_at: now,
        };

        let patch = SongPatch {
            proficiency: Some(5),
            high_score: Some(None),
            ..SongPatch::default()
        };
        patch.apply(&mut song);

        assert_eq!(song.proficiency, 5);
        assert_eq!(song.high_score, None);
        // Untouched fields survive
        assert_eq!(song.title, "Lemon");
        assert_eq!(song.key.adjustment, -2);
        assert_eq!(song.created_at, now);
    }

    #[test]
    fn test_song_serde_camel_case() {
        let now = Utc::now();
        let song = Song {
            id: "s1".into(),
            title: "Lemon".into(),
            artist: "米津玄師".into(),
            tags: vec![],
            proficiency: 3,
            key: KeySetting::default(),
            high_score: None,
            score_photo_id: None,
            memo: String::new(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&song).unwrap();
        assert!(json.contains("\"highScore\""));
        assert!(json.contains("\"scorePhotoId\""));
        assert!(json.contains("\"updatedAt\""));

        let back: Song = serde_json::from_str(&json).unwrap();
        assert_eq!(back, song);
    }
}
