use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::model::Song;

/// Default quiescence window before a typed query is applied.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// What to sort the filtered collection by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    UpdatedAt,
    Title,
    Artist,
    Proficiency,
    HighScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One search/filter/sort request over the in-memory collection.
/// `query` is the settled (debounced) text, not the raw keystroke value.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub query: String,
    pub selected_tag_ids: Vec<String>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            query: String::new(),
            selected_tag_ids: Vec::new(),
            sort_key: SortKey::UpdatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Filter and sort the song collection. Pure: no I/O, input untouched,
/// identical inputs give identical output. Never fails; an empty
/// collection just produces an empty result.
pub fn evaluate(songs: &[Song], spec: &QuerySpec) -> Vec<Song> {
    let mut result: Vec<Song> = songs.to_vec();

    if !spec.query.is_empty() {
        let needle = spec.query.to_lowercase();
        result.retain(|song| {
            song.title.to_lowercase().contains(&needle)
                || song.artist.to_lowercase().contains(&needle)
        });
    }

    if !spec.selected_tag_ids.is_empty() {
        // OR semantics: any selected tag on the song keeps it.
        result.retain(|song| {
            spec.selected_tag_ids
                .iter()
                .any(|tag_id| song.tags.iter().any(|t| t == tag_id))
        });
    }

    // sort_by is stable: equal keys keep their input order.
    result.sort_by(|a, b| {
        let ord = compare(a, b, spec.sort_key);
        match spec.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    result
}

fn compare(a: &Song, b: &Song, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => compare_folded(&a.title, &b.title),
        SortKey::Artist => compare_folded(&a.artist, &b.artist),
        SortKey::Proficiency => a.proficiency.cmp(&b.proficiency),
        SortKey::HighScore => {
            // Missing scores order as 0; the stored None is never touched.
            let a_score = a.high_score.unwrap_or(0.0);
            let b_score = b.high_score.unwrap_or(0.0);
            a_score.partial_cmp(&b_score).unwrap_or(Ordering::Equal)
        }
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

/// Case-folded code-point comparison. ASCII and wide Latin fold
/// case-insensitively; kana compare in code-point (gojūon) order.
fn compare_folded(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Applies a typed query only after it has been stable for the window.
/// One pending window at a time: new input cancels and restarts it.
/// The clock is passed in, so callers decide what "now" means and tests
/// never sleep.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    raw: String,
    settled: String,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            raw: String::new(),
            settled: String::new(),
            deadline: None,
        }
    }

    /// Record a keystroke/edit. Cancels any pending window and starts a
    /// fresh one.
    pub fn input(&mut self, text: &str, now: Instant) {
        if text == self.raw {
            return;
        }
        self.raw = text.to_string();
        if self.raw == self.settled {
            // Typed back to the settled value: nothing to apply.
            self.deadline = None;
        } else {
            self.deadline = Some(now + self.window);
        }
    }

    /// Settle the raw value if the window has elapsed. Returns true if
    /// the settled query changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.settled = self.raw.clone();
                true
            }
            _ => false,
        }
    }

    /// A recomputation is pending: typed text has not settled yet.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The current settled query, for building a `QuerySpec`.
    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Time until the pending window elapses, if any. Lets callers
    /// block on channel receive for exactly the right duration.
    pub fn time_to_deadline(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeySetting;
    use chrono::{TimeZone, Utc};

    fn make_song(id: &str, title: &str, artist: &str, proficiency: u8) -> Song {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Song {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            tags: Vec::new(),
            proficiency,
            key: KeySetting::default(),
            high_score: None,
            score_photo_id: None,
            memo: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    fn spec() -> QuerySpec {
        QuerySpec::default()
    }

    #[test]
    fn test_empty_collection_is_empty_result() {
        assert!(evaluate(&[], &spec()).is_empty());
    }

    #[test]
    fn test_text_filter_case_insensitive() {
        let songs = vec![
            make_song("1", "AikoNeko", "A", 3),
            make_song("2", "Other", "B", 3),
        ];
        let result = evaluate(
            &songs,
            &QuerySpec { query: "aikoneko".into(), ..spec() },
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn test_text_filter_matches_artist_too() {
        let songs = vec![
            make_song("1", "曲A", "米津玄師", 3),
            make_song("2", "曲B", "あいみょん", 3),
        ];
        let result = evaluate(&songs, &QuerySpec { query: "米津".into(), ..spec() });
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn test_japanese_prefix_query_proficiency_desc() {
        let mut a = make_song("1", "夜明け", "A", 2);
        let mut b = make_song("2", "夜明けのうた", "B", 5);
        let c = make_song("3", "別の曲", "C", 4);
        a.updated_at = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        b.updated_at = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();

        let result = evaluate(
            &[a, b, c],
            &QuerySpec {
                query: "夜明け".into(),
                sort_key: SortKey::Proficiency,
                sort_order: SortOrder::Desc,
                ..spec()
            },
        );
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].proficiency, 5);
        assert_eq!(result[1].proficiency, 2);
    }

    #[test]
    fn test_tag_filter_or_semantics() {
        let mut a = make_song("1", "A", "x", 3);
        a.tags = vec!["rock".into()];
        let mut b = make_song("2", "B", "x", 3);
        b.tags = vec!["ballad".into()];
        let mut c = make_song("3", "C", "x", 3);
        c.tags = vec!["anison".into()];

        let result = evaluate(
            &[a, b, c],
            &QuerySpec {
                selected_tag_ids: vec!["rock".into(), "ballad".into()],
                ..spec()
            },
        );
        // Union of rock and ballad, not intersection.
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_tag_selection_passes_all() {
        let songs = vec![make_song("1", "A", "x", 3), make_song("2", "B", "x", 3)];
        assert_eq!(evaluate(&songs, &spec()).len(), 2);
    }

    #[test]
    fn test_sort_stability_on_equal_keys() {
        let songs = vec![
            make_song("first", "A", "x", 3),
            make_song("second", "B", "x", 3),
            make_song("third", "C", "x", 3),
        ];
        let result = evaluate(
            &songs,
            &QuerySpec { sort_key: SortKey::Proficiency, sort_order: SortOrder::Asc, ..spec() },
        );
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);

        // Descending on equal keys keeps input order too.
        let result = evaluate(
            &songs,
            &QuerySpec { sort_key: SortKey::Proficiency, sort_order: SortOrder::Desc, ..spec() },
        );
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let songs = vec![
            make_song("1", "Zoo", "c", 1),
            make_song("2", "Apple", "a", 5),
            make_song("3", "Mango", "b", 3),
        ];
        let q = QuerySpec { sort_key: SortKey::Title, sort_order: SortOrder::Asc, ..spec() };
        let first = evaluate(&songs, &q);
        let second = evaluate(&songs, &q);
        assert_eq!(first, second);
        // Re-evaluating the already-sorted output changes nothing either.
        let third = evaluate(&first, &q);
        assert_eq!(first, third);
    }

    #[test]
    fn test_title_sort_folds_case() {
        let songs = vec![
            make_song("1", "banana", "x", 3),
            make_song("2", "Apple", "x", 3),
            make_song("3", "cherry", "x", 3),
        ];
        let result = evaluate(
            &songs,
            &QuerySpec { sort_key: SortKey::Title, sort_order: SortOrder::Asc, ..spec() },
        );
        let titles: Vec<&str> = result.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_kana_titles_sort_in_gojuon_order() {
        let songs = vec![
            make_song("1", "さくら", "x", 3),
            make_song("2", "あめ", "x", 3),
            make_song("3", "かぜ", "x", 3),
        ];
        let result = evaluate(
            &songs,
            &QuerySpec { sort_key: SortKey::Title, sort_order: SortOrder::Asc, ..spec() },
        );
        let titles: Vec<&str> = result.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["あめ", "かぜ", "さくら"]);
    }

    #[test]
    fn test_null_high_score_sorts_as_zero_without_mutating() {
        let mut a = make_song("1", "A", "x", 3);
        a.high_score = Some(85.0);
        let b = make_song("2", "B", "x", 3); // no score
        let mut c = make_song("3", "C", "x", 3);
        c.high_score = Some(12.5);

        let result = evaluate(
            &[a, b, c],
            &QuerySpec { sort_key: SortKey::HighScore, sort_order: SortOrder::Asc, ..spec() },
        );
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        // The missing score is still missing, not materialized as 0.
        assert_eq!(result[0].high_score, None);
    }

    #[test]
    fn test_updated_at_sort() {
        let mut a = make_song("old", "A", "x", 3);
        a.updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut b = make_song("new", "B", "x", 3);
        b.updated_at = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();

        let result = evaluate(&[a, b], &spec()); // default: updated_at desc
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_filtered_length_matches_subset() {
        let songs = vec![
            make_song("1", "Lemon", "米津玄師", 3),
            make_song("2", "Peace Sign", "米津玄師", 4),
            make_song("3", "マリーゴールド", "あいみょん", 2),
        ];
        let result = evaluate(&songs, &QuerySpec { query: "米津".into(), ..spec() });
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_debouncer_settles_after_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));

        d.input("夜", t0);
        assert!(d.is_pending());
        assert_eq!(d.settled(), "");

        // Not yet quiescent.
        assert!(!d.poll(t0 + Duration::from_millis(299)));
        assert!(d.is_pending());

        assert!(d.poll(t0 + Duration::from_millis(300)));
        assert!(!d.is_pending());
        assert_eq!(d.settled(), "夜");
    }

    #[test]
    fn test_debouncer_restarts_on_new_input() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));

        d.input("夜", t0);
        d.input("夜明", t0 + Duration::from_millis(200));

        // The first window was canceled; 300ms after t0 nothing settles.
        assert!(!d.poll(t0 + Duration::from_millis(300)));
        assert_eq!(d.settled(), "");

        // 300ms after the second keystroke it does.
        assert!(d.poll(t0 + Duration::from_millis(500)));
        assert_eq!(d.settled(), "夜明");
    }

    #[test]
    fn test_debouncer_typing_back_to_settled_cancels() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));

        d.input("abc", t0);
        assert!(d.poll(t0 + Duration::from_millis(300)));

        d.input("abcd", t0 + Duration::from_millis(400));
        assert!(d.is_pending());
        d.input("abc", t0 + Duration::from_millis(450));
        assert!(!d.is_pending());
        assert_eq!(d.settled(), "abc");
    }

    #[test]
    fn test_debouncer_repeated_same_input_keeps_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));

        d.input("a", t0);
        d.input("a", t0 + Duration::from_millis(200));
        // The duplicate did not restart the window.
        assert!(d.poll(t0 + Duration::from_millis(300)));
        assert_eq!(d.settled(), "a");
    }
}
