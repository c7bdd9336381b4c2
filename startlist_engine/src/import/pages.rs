use startlist_entities::prelude::RankingMap;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

pub const PAGE_PLACEHOLDER: &str = "{page}";

#[derive(Debug, Error)]
pub enum PageFetchError {
    #[error("Invalid page URL pattern: {0}")]
    InvalidPattern(String),
    #[error("Failed to fetch page {page}: {message}")]
    Fetch { page: u32, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingPageRow {
    pub identifier: String,
    /// The page's own numbering, when it carries one.
    pub position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankingPage {
    pub rows: Vec<RankingPageRow>,
}

/// Boundary to a remote, paged ranking listing. Implementations fetch one
/// numbered page at a time and return None past the last page; the transport
/// itself lives outside this workspace.
pub trait RankingPageSource {
    fn fetch_page(&mut self, page_number: u32) -> Result<Option<RankingPage>, PageFetchError>;
}

/// Expands a fixed URL pattern (`…&page={page}`) for one page number.
pub fn page_url(pattern: &str, page_number: u32) -> Result<Url, PageFetchError> {
    if !pattern.contains(PAGE_PLACEHOLDER) {
        return Err(PageFetchError::InvalidPattern(pattern.to_string()));
    }
    let expanded = pattern.replace(PAGE_PLACEHOLDER, &page_number.to_string());
    Url::parse(&expanded).map_err(|_| PageFetchError::InvalidPattern(pattern.to_string()))
}

/// Requests sequential pages starting at 1 and merges their rows into one
/// ranking. Identifiers already seen on an earlier page are skipped. A page's
/// own numbering is trusted only while it keeps ascending across the merged
/// result; when it restarts or is absent the row gets the next synthetic
/// sequential rank instead.
pub fn fetch_all_pages<S>(source: &mut S, max_pages: u32) -> Result<RankingMap, PageFetchError>
where
    S: RankingPageSource,
{
    let mut ranking = RankingMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut last_rank = 0u32;

    for page_number in 1..=max_pages {
        let Some(page) = source.fetch_page(page_number)? else {
            break;
        };
        if page.rows.is_empty() {
            break;
        }

        for row in page.rows {
            if !seen.insert(row.identifier.clone()) {
                continue;
            }
            let rank = match row.position {
                Some(position) if position > last_rank => position,
                _ => last_rank + 1,
            };
            last_rank = rank;
            ranking.insert(row.identifier, rank);
        }
    }

    Ok(ranking)
}

#[cfg(test)]
mod test {
    use super::*;

    struct FixedPages {
        pages: Vec<RankingPage>,
        fetched: Vec<u32>,
    }

    impl RankingPageSource for FixedPages {
        fn fetch_page(&mut self, page_number: u32) -> Result<Option<RankingPage>, PageFetchError> {
            self.fetched.push(page_number);
            Ok(self.pages.get(page_number as usize - 1).cloned())
        }
    }

    fn row(identifier: &str, position: Option<u32>) -> RankingPageRow {
        RankingPageRow {
            identifier: identifier.into(),
            position,
        }
    }

    #[test]
    fn test_page_url_expands_pattern() {
        let url = page_url("https://ranking.example/list?page={page}", 3).unwrap();
        assert_eq!(url.as_str(), "https://ranking.example/list?page=3");
    }

    #[test]
    fn test_pattern_without_placeholder_is_rejected() {
        assert!(matches!(
            page_url("https://ranking.example/list", 1),
            Err(PageFetchError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_pages_merge_in_order() {
        let mut source = FixedPages {
            pages: vec![
                RankingPage {
                    rows: vec![row("A", Some(1)), row("B", Some(2))],
                },
                RankingPage {
                    rows: vec![row("C", Some(3))],
                },
            ],
            fetched: vec![],
        };

        let ranking = fetch_all_pages(&mut source, 10).unwrap();
        assert_eq!(ranking.position("A"), Some(1));
        assert_eq!(ranking.position("B"), Some(2));
        assert_eq!(ranking.position("C"), Some(3));
        // Stops at the page after the last existing one.
        assert_eq!(source.fetched, vec![1, 2, 3]);
    }

    #[test]
    fn test_restarting_page_numbering_gets_synthetic_ranks() {
        let mut source = FixedPages {
            pages: vec![
                RankingPage {
                    rows: vec![row("A", Some(1)), row("B", Some(2))],
                },
                RankingPage {
                    // The page numbers its rows from 1 again.
                    rows: vec![row("C", Some(1)), row("D", Some(2))],
                },
            ],
            fetched: vec![],
        };

        let ranking = fetch_all_pages(&mut source, 10).unwrap();
        assert_eq!(ranking.position("C"), Some(3));
        assert_eq!(ranking.position("D"), Some(4));
    }

    #[test]
    fn test_rows_without_numbering_get_sequential_ranks() {
        let mut source = FixedPages {
            pages: vec![RankingPage {
                rows: vec![row("A", None), row("B", None)],
            }],
            fetched: vec![],
        };

        let ranking = fetch_all_pages(&mut source, 10).unwrap();
        assert_eq!(ranking.position("A"), Some(1));
        assert_eq!(ranking.position("B"), Some(2));
    }

    #[test]
    fn test_repeated_identifiers_are_skipped() {
        let mut source = FixedPages {
            pages: vec![
                RankingPage {
                    rows: vec![row("A", Some(1))],
                },
                RankingPage {
                    rows: vec![row("A", Some(1)), row("B", Some(2))],
                },
            ],
            fetched: vec![],
        };

        let ranking = fetch_all_pages(&mut source, 10).unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.position("A"), Some(1));
        assert_eq!(ranking.position("B"), Some(2));
    }
}
