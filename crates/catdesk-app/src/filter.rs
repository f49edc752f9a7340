// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Category;

pub const EMPTY_LIST_MESSAGE: &str = "No categories found.";
pub const EMPTY_SEARCH_MESSAGE: &str = "No categories found matching your search.";

/// Categories whose title or description contains `query`, ignoring case.
///
/// Order follows the input. An empty query returns every category.
pub fn filter_categories<'a>(categories: &'a [Category], query: &str) -> Vec<&'a Category> {
    if query.is_empty() {
        return categories.iter().collect();
    }

    let needle = query.to_lowercase();
    categories
        .iter()
        .filter(|category| matches_needle(category, &needle))
        .collect()
}

pub fn empty_list_message(query: &str) -> &'static str {
    if query.is_empty() {
        EMPTY_LIST_MESSAGE
    } else {
        EMPTY_SEARCH_MESSAGE
    }
}

fn matches_needle(category: &Category, needle: &str) -> bool {
    if category.title.to_lowercase().contains(needle) {
        return true;
    }
    category
        .description
        .as_deref()
        .is_some_and(|description| description.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::{
        EMPTY_LIST_MESSAGE, EMPTY_SEARCH_MESSAGE, empty_list_message,
        filter_categories,
    };
    use crate::{Category, CategoryId};

    fn category(id: &str, title: &str, description: Option<&str>) -> Category {
        Category {
            id: CategoryId::new(id),
            title: title.to_owned(),
            description: description.map(str::to_owned),
            icon_name: "tag".to_owned(),
            color: "#64748b".to_owned(),
            count: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn fixture() -> Vec<Category> {
        vec![
            category("1", "Tech", Some("Gadgets")),
            category("2", "Food", None),
        ]
    }

    fn ids(rows: &[&Category]) -> Vec<String> {
        rows.iter().map(|row| row.id.as_str().to_owned()).collect()
    }

    #[test]
    fn description_substring_matches_case_insensitively() {
        let categories = fixture();
        assert_eq!(ids(&filter_categories(&categories, "gad")), vec!["1"]);
        assert_eq!(ids(&filter_categories(&categories, "GADGETS")), vec!["1"]);
    }

    #[test]
    fn unmatched_query_yields_nothing() {
        let categories = fixture();
        assert!(filter_categories(&categories, "zz").is_empty());
    }

    #[test]
    fn empty_query_keeps_every_row_in_order() {
        let categories = vec![
            category("b", "Zebra", None),
            category("a", "Apple", Some("fruit")),
            category("c", "Mango", None),
        ];
        let filtered = filter_categories(&categories, "");
        assert_eq!(ids(&filtered), vec!["b", "a", "c"]);
        for (kept, original) in filtered.iter().zip(&categories) {
            assert!(std::ptr::eq(*kept, original));
        }
    }

    #[test]
    fn missing_description_does_not_hide_title_match() {
        let categories = fixture();
        assert_eq!(ids(&filter_categories(&categories, "foo")), vec!["2"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let categories = vec![
            category("1", "Tech", Some("Gadgets and gizmos")),
            category("2", "Food", None),
            category("3", "Travel", Some("Technical trips")),
            category("4", "Music", Some("gigs")),
        ];
        for query in ["", "te", "G", "zz", "tech"] {
            let once = filter_categories(&categories, query)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            let twice = filter_categories(&once, query)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            assert_eq!(once, twice, "query {query:?}");
        }
    }

    #[test]
    fn matches_exactly_title_or_present_description() {
        let categories = vec![
            category("1", "Tech", Some("Gadgets")),
            category("2", "Food", None),
            category("3", "Outdoors", Some("hiking gear")),
        ];
        for query in ["o", "g", "ea", "tech", "x"] {
            let filtered = ids(&filter_categories(&categories, query));
            let expected = categories
                .iter()
                .filter(|row| {
                    let needle = query.to_lowercase();
                    row.title.to_lowercase().contains(&needle)
                        || row
                            .description
                            .as_ref()
                            .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
                .map(|row| row.id.as_str().to_owned())
                .collect::<Vec<_>>();
            assert_eq!(filtered, expected, "query {query:?}");
        }
    }

    #[test]
    fn empty_message_depends_on_query() {
        assert_eq!(empty_list_message(""), EMPTY_LIST_MESSAGE);
        assert_eq!(empty_list_message("zz"), EMPTY_SEARCH_MESSAGE);
    }
}
