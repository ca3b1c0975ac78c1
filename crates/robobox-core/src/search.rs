//! Site search over kits, workshops and common questions

use crate::qa::common_questions;
use serde::Serialize;

/// What a search hit points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Kit,
    Workshop,
    Faq,
}

/// One searchable entry of the site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub href: String,
    pub kind: SearchKind,
}

/// In-memory search index
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    items: Vec<SearchItem>,
}

const KITS: &[(&str, &str, &str)] = &[
    (
        "robobox",
        "Starter Bot Kit",
        "The perfect introduction to robotics. Build your first autonomous robot with our \
         easy-to-follow guide.",
    ),
    (
        "mechatronics",
        "Advanced Sensor Pack",
        "Expand your robot's capabilities with a range of advanced sensors for navigation and \
         interaction.",
    ),
    (
        "blix",
        "AI Vision Module",
        "Give your creation the power of sight. Integrates seamlessly with our core platform \
         for object recognition.",
    ),
    (
        "drone",
        "DIY Drone Kit",
        "Build and fly your own drone with this comprehensive kit, including a high-res camera.",
    ),
];

const WORKSHOPS: &[(&str, &str, &str)] = &[
    (
        "robotics-insight",
        "Insight to Robotics",
        "A beginner-friendly workshop covering the fundamentals of robotics, from basic \
         electronics to simple programming.",
    ),
    (
        "all-in-one",
        "All in one Masterclass",
        "A comprehensive masterclass for enthusiasts looking to dive deep into mechatronics, \
         AI, and autonomous systems.",
    ),
    (
        "scratch-to-pro",
        "Master class (Scratch to Pro)",
        "Take your skills from zero to hero. This intensive course covers everything from \
         Scratch block-based coding to advanced Python for robotics.",
    ),
];

impl SearchIndex {
    pub fn new(items: Vec<SearchItem>) -> Self {
        Self { items }
    }

    /// Index of the site's static kits, workshops and FAQ entries
    pub fn site() -> Self {
        let mut items = Vec::new();

        for (id, title, description) in KITS {
            items.push(SearchItem {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                href: format!("/kits/{}", id),
                kind: SearchKind::Kit,
            });
        }
        for (id, title, description) in WORKSHOPS {
            items.push(SearchItem {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                href: format!("/workshops/{}", id),
                kind: SearchKind::Workshop,
            });
        }
        for (i, pair) in common_questions().into_iter().enumerate() {
            items.push(SearchItem {
                id: format!("faq-{}", i),
                title: pair.question,
                description: pair.answer,
                href: "/#faq".to_string(),
                kind: SearchKind::Faq,
            });
        }

        Self { items }
    }

    /// Case-insensitive substring match on title or description
    pub fn search(&self, query: &str) -> Vec<&SearchItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.items
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_index_contents() {
        let index = SearchIndex::site();
        assert_eq!(index.len(), 4 + 3 + 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = SearchIndex::site();
        let hits = index.search("DRONE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].href, "/kits/drone");
        assert_eq!(hits[0].kind, SearchKind::Kit);
    }

    #[test]
    fn test_search_matches_description() {
        let index = SearchIndex::site();
        let hits = index.search("python");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "scratch-to-pro");
    }

    #[test]
    fn test_search_faq_entries() {
        let index = SearchIndex::site();
        let hits = index.search("discount");
        assert!(hits.iter().any(|h| h.kind == SearchKind::Faq && h.href == "/#faq"));
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let index = SearchIndex::site();
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
    }
}
