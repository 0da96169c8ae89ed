//! Page cursor state machine with single-flight fetch semantics.

use picker_types::PageSignal;

use crate::session::Generation;

/// Identity of an issued page fetch: the session it belongs to and its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStamp {
    pub generation: Generation,
    pub page: u32,
}

/// Pagination state for one picker session.
///
/// At most one fetch is outstanding at a time (`fetching`). Completions are
/// applied only when their [`FetchStamp`] matches the fetch in flight, so a
/// response from an earlier session can never advance the current one.
#[derive(Debug, Clone)]
pub struct PaginationState {
    page: u32,
    page_size: u32,
    has_more: bool,
    fetching: bool,
    generation: Generation,
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            has_more: true,
            fetching: false,
            generation: Generation::default(),
        }
    }

    /// Reset for a new session: page 1, more pages assumed, nothing in flight.
    pub fn reset(&mut self, generation: Generation) {
        self.page = 1;
        self.has_more = true;
        self.fetching = false;
        self.generation = generation;
    }

    /// Mark the page-1 fetch of the current session as in flight.
    pub fn begin_first_page(&mut self) -> FetchStamp {
        self.page = 1;
        self.fetching = true;
        self.stamp()
    }

    /// Advance to the next page unless a fetch is in flight or paging is exhausted.
    pub fn request_next_page(&mut self) -> Option<FetchStamp> {
        if self.fetching || !self.has_more {
            return None;
        }
        self.page += 1;
        self.fetching = true;
        Some(self.stamp())
    }

    /// Whether `stamp` identifies the fetch currently in flight.
    pub fn accepts(&self, stamp: FetchStamp) -> bool {
        self.fetching && stamp == self.stamp()
    }

    /// Apply a successful page. Returns `false` for stale stamps.
    pub fn complete(&mut self, stamp: FetchStamp, signal: PageSignal) -> bool {
        if !self.accepts(stamp) {
            return false;
        }
        self.fetching = false;
        self.has_more = derive_has_more(signal, stamp.page, self.page_size);
        true
    }

    /// Apply a failed page: stop paging. Returns `false` for stale stamps.
    pub fn fail(&mut self, stamp: FetchStamp) -> bool {
        if !self.accepts(stamp) {
            return false;
        }
        self.fetching = false;
        self.has_more = false;
        true
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn stamp(&self) -> FetchStamp {
        FetchStamp {
            generation: self.generation,
            page: self.page,
        }
    }
}

/// Decide whether another page exists after `page`.
///
/// `hasMore` is taken verbatim; a total count yields `page * page_size < total`;
/// a response without either stops paging.
pub fn derive_has_more(signal: PageSignal, page: u32, page_size: u32) -> bool {
    match signal {
        PageSignal::ByHasMore { has_more } => has_more,
        PageSignal::ByTotal { total } => u64::from(page) * u64::from(page_size) < total,
        PageSignal::Missing => false,
    }
}
