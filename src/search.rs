use crate::profile::UserSummary;
use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTrigger {
    Clear,
    Search(String),
}

/// Holds back a query until typing has paused for the debounce delay.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Debounce {
            delay,
            pending: None,
        }
    }

    pub fn input(&mut self, query: &str, now: Instant) {
        self.pending = Some((query.to_string(), now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fires at most once per burst of input. Blank queries fire at once.
    pub fn due(&mut self, now: Instant) -> Option<SearchTrigger> {
        let (query, at) = self.pending.as_ref()?;
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.pending = None;
            return Some(SearchTrigger::Clear);
        }
        if now.duration_since(*at) < self.delay {
            return None;
        }
        let trigger = SearchTrigger::Search(trimmed.to_string());
        self.pending = None;
        Some(trigger)
    }
}

/// The search box and its dropdown.
#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<UserSummary>,
    pub open: bool,
    pub loading: bool,
    pub selected: usize,
    pub debounce: Debounce,
}

impl SearchState {
    pub fn push(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.debounce.input(&self.query, now);
    }

    pub fn pop(&mut self, now: Instant) {
        self.query.pop();
        self.debounce.input(&self.query, now);
    }

    pub fn set_results(&mut self, results: Vec<UserSummary>) {
        self.open = !results.is_empty();
        self.results = results;
        self.selected = 0;
        self.loading = false;
    }

    pub fn clear_results(&mut self) {
        self.set_results(Vec::new());
    }

    /// Picking a user empties the box and closes the dropdown.
    pub fn choose(&mut self) -> Option<UserSummary> {
        if !self.open {
            return None;
        }
        let chosen = self.results.get(self.selected).cloned()?;
        self.query.clear();
        self.clear_results();
        Some(chosen)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
