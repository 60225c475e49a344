use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::ContentItem,
};

/// Item field a search query can match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Description,
    Subject,
    Category,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Title,
        SearchField::Description,
        SearchField::Subject,
        SearchField::Category,
    ];

    fn haystack<'a>(&self, item: &'a ContentItem) -> Option<&'a str> {
        match self {
            SearchField::Title => Some(item.title.as_str()),
            SearchField::Description => Some(item.description.as_str()),
            SearchField::Subject => item.subject.map(|s| s.as_str()),
            SearchField::Category => item.category.map(|c| c.as_str()),
        }
    }
}

impl FromStr for SearchField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "description" => Ok(SearchField::Description),
            "subject" => Ok(SearchField::Subject),
            "category" => Ok(SearchField::Category),
            other => Err(AppError::InvalidInput(format!("Unknown search field: {}", other))),
        }
    }
}

/// Parses a comma separated field list such as `"title,subject"`
pub fn parse_fields(raw: &str) -> AppResult<Vec<SearchField>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SearchField::from_str)
        .collect()
}

/// Case-insensitive substring search over the selected fields
///
/// A blank query returns every item. An empty field selection searches all
/// fields. Each matching item appears once, in collection order.
pub fn search<'a>(items: &'a [ContentItem], query: &str, fields: &[SearchField]) -> Vec<&'a ContentItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    let fields = if fields.is_empty() { &SearchField::ALL[..] } else { fields };

    items
        .iter()
        .filter(|item| {
            fields.iter().any(|field| {
                field
                    .haystack(item)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

/// One page of results plus enough bookkeeping to render a pager
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slices `items` into 1-based pages, clamping the requested page into range
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> AppResult<Page<T>> {
    if page_size == 0 {
        return Err(AppError::InvalidInput("page_size must be positive".to_string()));
    }

    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;

    let items = items.into_iter().skip(start).take(page_size).collect();

    Ok(Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Subject};
    use chrono::Utc;

    fn items() -> Vec<ContentItem> {
        let now = Utc::now();
        vec![
            ContentItem::new("1", "Help debugging pointers", Some(Category::Tutoring), Some(Subject::ComputerScience), now)
                .with_description("segmentation fault in my linked list"),
            ContentItem::new("2", "Essay feedback needed", Some(Category::Review), Some(Subject::Writing), now)
                .with_description("structure and transitions"),
            ContentItem::new("3", "Math 19A derivatives", Some(Category::Tutoring), Some(Subject::Math), now),
        ]
    }

    fn ids(found: &[&ContentItem]) -> Vec<String> {
        found.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_blank_query_returns_all() {
        let items = items();
        assert_eq!(search(&items, "   ", &[]).len(), 3);
    }

    #[test]
    fn test_match_any_field_once() {
        let items = items();
        // "tutoring" matches category of 1 and 3; nothing matches twice
        assert_eq!(ids(&search(&items, "TUTORING", &[])), vec!["1", "3"]);
    }

    #[test]
    fn test_restricted_fields() {
        let items = items();
        assert!(search(&items, "linked list", &[SearchField::Title]).is_empty());
        assert_eq!(
            ids(&search(&items, "linked list", &[SearchField::Description])),
            vec!["1"]
        );
        assert_eq!(ids(&search(&items, "computer", &[SearchField::Subject])), vec!["1"]);
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(
            parse_fields("title, Subject,").unwrap(),
            vec![SearchField::Title, SearchField::Subject]
        );
        assert!(matches!(parse_fields("tags"), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_paginate_clamps_page() {
        let page = paginate((1..=7).collect::<Vec<_>>(), 9, 3).unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![7]);

        let first = paginate((1..=7).collect::<Vec<_>>(), 0, 3).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.items, vec![1, 2, 3]);
    }

    #[test]
    fn test_paginate_empty_has_one_page() {
        let page = paginate(Vec::<u8>::new(), 1, 10).unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_paginate_rejects_zero_page_size() {
        assert!(paginate(vec![1], 1, 0).is_err());
    }
}
