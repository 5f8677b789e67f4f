use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{Difficulty, Passage, PassageId};
use storage::repository::PassageRepository;

use crate::error::CatalogError;

/// Passages shown per catalog page unless the query says otherwise.
pub const DEFAULT_PER_PAGE: usize = 9;
const EXCERPT_CHARS: usize = 160;

/// Search, filter and page selection for the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive match against title and body. Blank matches everything.
    pub search: String,
    pub difficulty: Option<Difficulty>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            difficulty: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Card-sized summary of one passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: PassageId,
    pub title: String,
    pub excerpt: String,
    pub difficulty: Difficulty,
    pub word_count: u32,
    pub reading_minutes: u32,
    pub time_limit_minutes: u32,
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
}

impl CatalogEntry {
    fn from_passage(passage: &Passage) -> Self {
        Self {
            id: passage.id().clone(),
            title: passage.title().to_owned(),
            excerpt: excerpt(passage.content(), EXCERPT_CHARS),
            difficulty: passage.difficulty(),
            word_count: passage.word_count(),
            reading_minutes: passage.estimated_reading_minutes(),
            time_limit_minutes: passage.time_limit_minutes(),
            question_count: passage.questions().len(),
            created_at: passage.created_at(),
        }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// Page actually returned, after clamping.
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    /// Passages in the catalog before filtering.
    pub catalog_size: usize,
}

impl CatalogPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Read-only browse service over the content repository.
#[derive(Clone)]
pub struct CatalogService {
    passages: Arc<dyn PassageRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(passages: Arc<dyn PassageRepository>) -> Self {
        Self { passages }
    }

    /// Filter, order (newest first, then title) and paginate the catalog.
    ///
    /// Out-of-range pages are clamped to the nearest valid page.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the catalog cannot be read.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        let passages = self.passages.list_passages().await?;
        Ok(paginate(&passages, query))
    }
}

fn paginate(passages: &[Passage], query: &CatalogQuery) -> CatalogPage {
    let needle = query.search.trim().to_lowercase();
    let mut matches: Vec<&Passage> = passages
        .iter()
        .filter(|passage| query.difficulty.is_none_or(|d| passage.difficulty() == d))
        .filter(|passage| {
            needle.is_empty()
                || passage.title().to_lowercase().contains(&needle)
                || passage.content().to_lowercase().contains(&needle)
        })
        .collect();
    matches.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.title().cmp(b.title()))
    });

    let per_page = if query.per_page == 0 {
        DEFAULT_PER_PAGE
    } else {
        query.per_page
    };
    let total_matches = matches.len();
    let total_pages = total_matches.div_ceil(per_page).max(1);
    let page = query.page.clamp(1, total_pages);

    let entries = matches
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(CatalogEntry::from_passage)
        .collect();

    CatalogPage {
        entries,
        page,
        per_page,
        total_pages,
        total_matches,
        catalog_size: passages.len(),
    }
}

fn excerpt(content: &str, max_chars: usize) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars).collect();
    let trimmed = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{}...", trimmed.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn passage(id: &str, title: &str, difficulty: Difficulty, days_ago: i64) -> Passage {
        Passage::new(
            PassageId::new(id),
            title,
            format!("Body of {title} about economics."),
            120,
            difficulty,
            10,
            fixed_now() - Duration::days(days_ago),
            Vec::new(),
        )
        .unwrap()
    }

    fn catalog() -> Vec<Passage> {
        vec![
            passage("1", "Commons", Difficulty::Medium, 30),
            passage("2", "Attention", Difficulty::Easy, 1),
            passage("3", "Signals", Difficulty::Hard, 10),
            passage("4", "Beta", Difficulty::Easy, 1),
            passage("5", "Markets", Difficulty::Medium, 5),
        ]
    }

    fn titles(page: &CatalogPage) -> Vec<&str> {
        page.entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn orders_newest_first_then_by_title() {
        let page = paginate(&catalog(), &CatalogQuery::default());
        assert_eq!(titles(&page), ["Attention", "Beta", "Markets", "Signals", "Commons"]);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_body() {
        let query = CatalogQuery {
            search: "  SIGNAL ".into(),
            ..CatalogQuery::default()
        };
        assert_eq!(titles(&paginate(&catalog(), &query)), ["Signals"]);

        let query = CatalogQuery {
            search: "economics".into(),
            ..CatalogQuery::default()
        };
        assert_eq!(paginate(&catalog(), &query).total_matches, 5);
    }

    #[test]
    fn filters_by_difficulty() {
        let query = CatalogQuery {
            difficulty: Some(Difficulty::Medium),
            ..CatalogQuery::default()
        };
        let page = paginate(&catalog(), &query);
        assert_eq!(titles(&page), ["Markets", "Commons"]);
        assert_eq!(page.catalog_size, 5);
    }

    #[test]
    fn paginates_and_clamps_pages() {
        let query = CatalogQuery {
            page: 2,
            per_page: 2,
            ..CatalogQuery::default()
        };
        let page = paginate(&catalog(), &query);
        assert_eq!(titles(&page), ["Markets", "Signals"]);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.total_pages, 3);

        let query = CatalogQuery {
            page: 99,
            per_page: 2,
            ..CatalogQuery::default()
        };
        let page = paginate(&catalog(), &query);
        assert_eq!(page.page, 3);
        assert_eq!(titles(&page), ["Commons"]);

        let query = CatalogQuery {
            page: 0,
            per_page: 0,
            ..CatalogQuery::default()
        };
        let page = paginate(&catalog(), &query);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn empty_catalog_has_one_empty_page() {
        let page = paginate(&[], &CatalogQuery::default());
        assert!(page.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.catalog_size, 0);
    }

    #[test]
    fn excerpt_cuts_on_word_boundary() {
        assert_eq!(excerpt("short   text\nhere", 40), "short text here");
        assert_eq!(excerpt("alpha beta gamma delta", 13), "alpha beta...");
    }

    #[tokio::test]
    async fn browse_reads_through_repository() {
        let repo = InMemoryRepository::with_passages(catalog());
        let service = CatalogService::new(Arc::new(repo));
        let page = service
            .browse(&CatalogQuery {
                per_page: 3,
                ..CatalogQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.entries.len(), 3);
        assert_eq!(page.total_matches, 5);
        assert_eq!(page.entries[0].reading_minutes, 1);
    }
}
