use quiz_core::model::Difficulty;
use services::{CatalogEntry, CatalogPage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogCardVm {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub difficulty_label: &'static str,
    pub difficulty_class: &'static str,
    pub meta: String,
    pub questions_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogPageVm {
    pub cards: Vec<CatalogCardVm>,
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub range_label: String,
    /// Set when there is nothing to show.
    pub empty_message: Option<&'static str>,
}

/// Value for the difficulty filter `<select>`; empty means any.
#[must_use]
pub fn difficulty_option_value(difficulty: Option<Difficulty>) -> &'static str {
    difficulty.map_or("", Difficulty::as_str)
}

#[must_use]
pub fn parse_difficulty_filter(value: &str) -> Option<Difficulty> {
    value.parse().ok()
}

fn map_card(entry: &CatalogEntry) -> CatalogCardVm {
    let questions_label = match entry.question_count {
        1 => "1 question".to_string(),
        n => format!("{n} questions"),
    };
    CatalogCardVm {
        id: entry.id.to_string(),
        title: entry.title.clone(),
        excerpt: entry.excerpt.clone(),
        difficulty_label: entry.difficulty.as_str(),
        difficulty_class: match entry.difficulty {
            Difficulty::Easy => "badge easy",
            Difficulty::Medium => "badge medium",
            Difficulty::Hard => "badge hard",
        },
        meta: format!(
            "{} words · {} min read · {} min limit",
            entry.word_count, entry.reading_minutes, entry.time_limit_minutes
        ),
        questions_label,
    }
}

#[must_use]
pub fn map_catalog_page(page: &CatalogPage) -> CatalogPageVm {
    let empty_message = if page.catalog_size == 0 {
        Some("No passages available.")
    } else if page.total_matches == 0 {
        Some("No passages match your filters.")
    } else {
        None
    };
    let range_label = if page.total_matches == 0 {
        String::new()
    } else {
        let first = (page.page - 1) * page.per_page + 1;
        let last = first + page.entries.len() - 1;
        format!("Showing {first}-{last} of {}", page.total_matches)
    };

    CatalogPageVm {
        cards: page.entries.iter().map(map_card).collect(),
        page: page.page,
        total_pages: page.total_pages,
        has_previous: page.has_previous(),
        has_next: page.has_next(),
        range_label,
        empty_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::PassageId;
    use quiz_core::time::fixed_now;

    fn entry(n: usize) -> CatalogEntry {
        CatalogEntry {
            id: PassageId::new(format!("p{n}")),
            title: format!("Title {n}"),
            excerpt: "Excerpt".into(),
            difficulty: Difficulty::Hard,
            word_count: 1200,
            reading_minutes: 6,
            time_limit_minutes: 15,
            question_count: 1,
            created_at: fixed_now(),
        }
    }

    fn page(entries: Vec<CatalogEntry>, page: usize, total: usize, size: usize) -> CatalogPage {
        CatalogPage {
            entries,
            page,
            per_page: 9,
            total_pages: total.div_ceil(9).max(1),
            total_matches: total,
            catalog_size: size,
        }
    }

    #[test]
    fn maps_cards_and_range() {
        let vm = map_catalog_page(&page(vec![entry(10), entry(11)], 2, 11, 11));
        assert_eq!(vm.range_label, "Showing 10-11 of 11");
        assert!(vm.has_previous);
        assert!(!vm.has_next);
        assert_eq!(vm.cards[0].meta, "1200 words · 6 min read · 15 min limit");
        assert_eq!(vm.cards[0].questions_label, "1 question");
        assert_eq!(vm.cards[0].difficulty_class, "badge hard");
        assert!(vm.empty_message.is_none());
    }

    #[test]
    fn distinguishes_empty_catalog_from_no_matches() {
        let empty = map_catalog_page(&page(Vec::new(), 1, 0, 0));
        assert_eq!(empty.empty_message, Some("No passages available."));

        let filtered = map_catalog_page(&page(Vec::new(), 1, 0, 4));
        assert_eq!(filtered.empty_message, Some("No passages match your filters."));
    }

    #[test]
    fn difficulty_filter_round_trips_through_select_value() {
        assert_eq!(parse_difficulty_filter(""), None);
        assert_eq!(
            parse_difficulty_filter(difficulty_option_value(Some(Difficulty::Medium))),
            Some(Difficulty::Medium)
        );
    }
}
