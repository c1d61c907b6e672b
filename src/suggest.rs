use serde::Deserialize;
use thiserror::Error;

/// Shorter terms return too much noise from the catalog.
pub const MIN_TERM_CHARS: usize = 2;
/// Hard cap on candidates per lookup.
pub const MAX_RESULTS: usize = 10;

const SEARCH_URL: &str = "https://itunes.apple.com/search";

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("search term must be at least {MIN_TERM_CHARS} characters")]
    TermTooShort,
    #[error("catalog request failed: {0}")]
    Http(String),
    #[error("failed to parse catalog response: {0}")]
    Parse(String),
}

/// A candidate for prefilling title/artist on song creation. Display
/// only, never persisted.
#[derive(Debug, Clone)]
pub struct TrackSuggestion {
    pub track: String,
    pub artist: String,
    pub artwork_url: Option<String>,
}

/// iTunes Search API response (partial — we only need the results).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchTrack>,
}

#[derive(Debug, Deserialize)]
struct SearchTrack {
    #[serde(rename = "trackName")]
    track_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url: Option<String>,
}

/// Look up song candidates from the public iTunes catalog.
pub fn search_catalog(
    term: &str,
    country: &str,
    limit: usize,
) -> Result<Vec<TrackSuggestion>, SuggestError> {
    let term = term.trim();
    if term.chars().count() < MIN_TERM_CHARS {
        return Err(SuggestError::TermTooShort);
    }
    let limit = limit.clamp(1, MAX_RESULTS);

    let response: SearchResponse = ureq::get(SEARCH_URL)
        .query("term", term)
        .query("country", country)
        .query("media", "music")
        .query("entity", "song")
        .query("limit", &limit.to_string())
        .call()
        .map_err(|e| SuggestError::Http(e.to_string()))?
        .body_mut()
        .read_json()
        .map_err(|e| SuggestError::Parse(e.to_string()))?;

    Ok(collect_suggestions(response, limit))
}

fn collect_suggestions(response: SearchResponse, limit: usize) -> Vec<TrackSuggestion> {
    response
        .results
        .into_iter()
        .filter_map(|t| {
            Some(TrackSuggestion {
                track: t.track_name?,
                artist: t.artist_name?,
                artwork_url: t.artwork_url,
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_terms_rejected() {
        assert!(matches!(
            search_catalog("a", "JP", 10),
            Err(SuggestError::TermTooShort)
        ));
        assert!(matches!(
            search_catalog("  x  ", "JP", 10),
            Err(SuggestError::TermTooShort)
        ));
    }

    #[test]
    fn test_term_length_counts_characters_not_bytes() {
        // Two kana are two characters even though six bytes.
        let term = "夜明";
        assert_eq!(term.len(), 6);
        assert!(term.chars().count() >= MIN_TERM_CHARS);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "resultCount": 2,
            "results": [
                {"trackName": "Lemon", "artistName": "Kenshi Yonezu",
                 "artworkUrl100": "https://example.com/a.jpg"},
                {"trackName": "打上花火", "artistName": "DAOKO"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let suggestions = collect_suggestions(response, 10);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].track, "Lemon");
        assert_eq!(suggestions[0].artwork_url.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(suggestions[1].artwork_url, None);
    }

    #[test]
    fn test_incomplete_entries_are_skipped() {
        let json = r#"{
            "resultCount": 2,
            "results": [
                {"artistName": "no track name"},
                {"trackName": "valid", "artistName": "someone"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let suggestions = collect_suggestions(response, 10);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].track, "valid");
    }

    #[test]
    fn test_limit_is_applied() {
        let entries: Vec<String> = (0..15)
            .map(|i| format!(r#"{{"trackName": "t{i}", "artistName": "a"}}"#))
            .collect();
        let json = format!(r#"{{"resultCount": 15, "results": [{}]}}"#, entries.join(","));
        let response: SearchResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(collect_suggestions(response, MAX_RESULTS).len(), 10);
    }
}
