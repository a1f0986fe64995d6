use mosweeper_protocol::ScoreEntry;

use crate::{RankedRow, ranked_rows};

/// Full score list split into fixed-size, 1-indexed pages.
#[derive(Clone, Debug, PartialEq)]
pub struct ScorePages {
    entries: Vec<ScoreEntry>,
    page_size: usize,
    current: usize,
}

impl ScorePages {
    pub fn new(entries: Vec<ScoreEntry>, page_size: usize) -> Self {
        Self {
            entries,
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_pages(&self) -> usize {
        self.entries.len().div_ceil(self.page_size)
    }

    /// Entries of `page`, empty when it is out of range.
    pub fn page(&self, page: usize) -> &[ScoreEntry] {
        let Some(start) = page
            .checked_sub(1)
            .and_then(|index| index.checked_mul(self.page_size))
            .filter(|&start| start < self.entries.len())
        else {
            return &[];
        };
        let end = (start + self.page_size).min(self.entries.len());
        &self.entries[start..end]
    }

    /// Rows of `page`, ranked by their position in the full list.
    pub fn page_rows(&self, page: usize) -> Vec<RankedRow> {
        let offset = page.saturating_sub(1).saturating_mul(self.page_size);
        ranked_rows(self.page(page), offset)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_rows(&self) -> Vec<RankedRow> {
        self.page_rows(self.current)
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    /// Whether page controls are worth showing at all.
    pub fn needs_controls(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.has_next();
        if moved {
            self.current += 1;
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.has_prev();
        if moved {
            self.current -= 1;
        }
        moved
    }
}
