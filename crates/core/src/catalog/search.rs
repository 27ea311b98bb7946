//! Name matching over a full scan of the index.

use std::cmp::Ordering;

use super::{CatalogMatch, PREFIX_SEARCH_LIMIT, RANKED_SEARCH_LIMIT};

/// Trim and case-fold a search term. `None` for blank input.
pub fn normalize_term(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

/// Entries whose name starts with `prefix` (case-insensitive), ascending by
/// id, at most [`PREFIX_SEARCH_LIMIT`].
pub fn prefix_matches<I>(entries: I, prefix: &str) -> Vec<CatalogMatch>
where
    I: IntoIterator<Item = CatalogMatch>,
{
    let Some(prefix) = normalize_term(prefix) else {
        return Vec::new();
    };

    let mut hits: Vec<CatalogMatch> = entries
        .into_iter()
        .filter(|e| e.name.to_lowercase().starts_with(&prefix))
        .collect();

    hits.sort_by_key(|e| e.id);
    hits.truncate(PREFIX_SEARCH_LIMIT);
    hits
}

/// Entries whose name contains `term` (case-insensitive). Names starting
/// with the term come first, then by name; at most [`RANKED_SEARCH_LIMIT`].
pub fn ranked_substring_matches<I>(entries: I, term: &str) -> Vec<CatalogMatch>
where
    I: IntoIterator<Item = CatalogMatch>,
{
    let Some(term) = normalize_term(term) else {
        return Vec::new();
    };

    let mut hits: Vec<(bool, String, CatalogMatch)> = entries
        .into_iter()
        .filter_map(|e| {
            let folded = e.name.to_lowercase();
            folded
                .contains(&term)
                .then(|| (folded.starts_with(&term), folded, e))
        })
        .collect();

    hits.sort_by(|(a_starts, a_name, a), (b_starts, b_name, b)| {
        match (*a_starts, *b_starts) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a_name.cmp(b_name).then(a.id.cmp(&b.id)),
        }
    });

    hits.into_iter()
        .take(RANKED_SEARCH_LIMIT)
        .map(|(_, _, e)| e)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, name: &str) -> CatalogMatch {
        CatalogMatch {
            id,
            name: name.to_string(),
            image: None,
        }
    }

    fn starters() -> Vec<CatalogMatch> {
        vec![
            entry(1, "bulbasaur"),
            entry(2, "ivysaur"),
            entry(3, "venusaur"),
            entry(4, "charmander"),
        ]
    }

    fn names(hits: &[CatalogMatch]) -> Vec<&str> {
        hits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Pika "), Some("pika".to_string()));
        assert_eq!(normalize_term(""), None);
        assert_eq!(normalize_term(" \t "), None);
    }

    #[test]
    fn test_prefix_single_hit() {
        let hits = prefix_matches(starters(), "bulba");
        assert_eq!(hits, vec![entry(1, "bulbasaur")]);
    }

    #[test]
    fn test_prefix_is_case_insensitive_and_trimmed() {
        let hits = prefix_matches(starters(), "  CHAR ");
        assert_eq!(names(&hits), vec!["charmander"]);
    }

    #[test]
    fn test_prefix_does_not_match_inner_substring() {
        assert!(prefix_matches(starters(), "saur").is_empty());
    }

    #[test]
    fn test_prefix_blank_term_is_empty() {
        assert!(prefix_matches(starters(), "").is_empty());
        assert!(prefix_matches(starters(), "   ").is_empty());
    }

    #[test]
    fn test_prefix_orders_by_id_and_caps() {
        let entries: Vec<CatalogMatch> = (1..=30)
            .rev()
            .map(|id| entry(id, &format!("unown-{}", id)))
            .collect();

        let hits = prefix_matches(entries, "unown");
        assert_eq!(hits.len(), PREFIX_SEARCH_LIMIT);
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_ranked_substring_lexicographic_when_no_prefix_hit() {
        let hits = ranked_substring_matches(starters(), "saur");
        assert_eq!(names(&hits), vec!["bulbasaur", "ivysaur", "venusaur"]);
    }

    #[test]
    fn test_ranked_substring_prefix_hits_first() {
        let entries = vec![
            entry(1, "bulbasaur"),
            entry(2, "abra"),
            entry(63, "kadabra"),
            entry(64, "alakazam"),
            entry(65, "abrasive"),
        ];
        let hits = ranked_substring_matches(entries, "abra");
        assert_eq!(names(&hits), vec!["abra", "abrasive", "kadabra"]);
    }

    #[test]
    fn test_ranked_substring_caps_at_ten() {
        let entries: Vec<CatalogMatch> = (1..=15)
            .map(|id| entry(id, &format!("mon-{:02}", id)))
            .collect();
        let hits = ranked_substring_matches(entries, "mon");
        assert_eq!(hits.len(), RANKED_SEARCH_LIMIT);
        assert_eq!(hits[0].name, "mon-01");
        assert_eq!(hits[9].name, "mon-10");
    }

    #[test]
    fn test_ranked_substring_blank_term_is_empty() {
        assert!(ranked_substring_matches(starters(), " ").is_empty());
    }
}
