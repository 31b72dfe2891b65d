//! Incremental reveal of an already-filtered list.
//!
//! Shows `page * page_size` leading items and grows by one page each time
//! the consumer signals it is near the end of what is shown.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealState {
    /// Nothing to show yet.
    Empty,
    /// A prefix is shown and more items remain.
    Revealing,
    /// The whole source is shown.
    Complete,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reveal<T> {
    source: Vec<T>,
    page_size: usize,
    pages: usize,
    pending: bool,
}

impl<T> Reveal<T> {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            source: Vec::new(),
            page_size: page_size.max(1),
            pages: 0,
            pending: false,
        }
    }

    pub fn with_source(source: Vec<T>, page_size: usize) -> Self {
        let mut reveal = Self::new(page_size);
        reveal.replace(source);
        reveal
    }

    /// Swaps in a new source list and shows its first page.
    pub fn replace(&mut self, source: Vec<T>) {
        self.source = source;
        self.pages = 0;
        self.pending = false;
        if !self.source.is_empty() {
            self.pages = 1;
        }
    }

    pub fn state(&self) -> RevealState {
        if self.pages == 0 || self.source.is_empty() {
            RevealState::Empty
        } else if self.visible_len() >= self.source.len() {
            RevealState::Complete
        } else {
            RevealState::Revealing
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.pages
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn visible(&self) -> &[T] {
        &self.source[..self.visible_len()]
    }

    pub fn has_more(&self) -> bool {
        self.state() == RevealState::Revealing
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Claims the next page. Returns false when everything is shown or a
    /// reveal is already in progress.
    pub fn begin_reveal(&mut self) -> bool {
        if self.pending || !self.has_more() {
            return false;
        }
        self.pending = true;
        true
    }

    /// Completes a reveal claimed with `begin_reveal`.
    pub fn finish_reveal(&mut self) {
        if !self.pending {
            return;
        }
        self.pages += 1;
        self.pending = false;
    }

    /// Shows one more page. Returns whether the visible prefix grew.
    pub fn reveal_more(&mut self) -> bool {
        if !self.begin_reveal() {
            return false;
        }
        self.finish_reveal();
        true
    }

    fn visible_len(&self) -> usize {
        self.pages
            .saturating_mul(self.page_size)
            .min(self.source.len())
    }
}

impl<T> Default for Reveal<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
