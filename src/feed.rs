use crate::journal::Journal;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Everyone,
    CloseCircle,
}

impl FeedKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FeedKind::Everyone => "/api/journal/public",
            FeedKind::CloseCircle => "/api/journal/close-circle",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FeedKind::Everyone => "Everyone",
            FeedKind::CloseCircle => "Close Circle",
        }
    }

    pub fn anonymous_label(&self) -> &'static str {
        match self {
            FeedKind::Everyone => "Anonymous Writer",
            FeedKind::CloseCircle => "A Friend",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            FeedKind::Everyone => "No public journals yet.",
            FeedKind::CloseCircle => "Your close circle hasn't shared anything yet.",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    #[serde(default)]
    pub journals: Vec<Journal>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default = "first_page")]
    pub current_page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedJournals {
    #[serde(default)]
    pub liked_journals: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes_count: u64,
}

/// A paginated list of other people's entries plus which ones we liked.
#[derive(Debug)]
pub struct FeedState {
    pub kind: FeedKind,
    pub journals: Vec<Journal>,
    pub liked: HashSet<String>,
    pub current_page: u32,
    pub has_more: bool,
    pub loading_more: bool,
    pub selected: usize,
    pub error: Option<String>,
}

impl FeedState {
    pub fn new(kind: FeedKind) -> Self {
        FeedState {
            kind,
            journals: Vec::new(),
            liked: HashSet::new(),
            current_page: 1,
            has_more: false,
            loading_more: false,
            selected: 0,
            error: None,
        }
    }

    pub fn apply_page(&mut self, page: FeedPage, append: bool) {
        if append {
            self.journals.extend(page.journals);
        } else {
            self.journals = page.journals;
            self.selected = 0;
        }
        self.has_more = page.has_more;
        self.current_page = page.current_page;
        self.loading_more = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading_more = false;
        self.error = Some(message.into());
    }

    /// The page to request for "load more", marking the load in flight.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.has_more && !self.loading_more {
            self.loading_more = true;
            Some(self.current_page + 1)
        } else {
            None
        }
    }

    pub fn set_liked(&mut self, ids: Vec<String>) {
        self.liked = ids.into_iter().collect();
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.liked.contains(id)
    }

    /// Flip the heart before the request goes out. Returns the previous state.
    pub fn toggle_like_optimistic(&mut self, id: &str) -> bool {
        let was_liked = self.liked.remove(id);
        if !was_liked {
            self.liked.insert(id.to_string());
        }
        was_liked
    }

    pub fn apply_like_count(&mut self, id: &str, count: u64) {
        if let Some(journal) = self.journals.iter_mut().find(|j| j.id == id) {
            journal.likes = count;
        }
    }

    pub fn revert_like(&mut self, id: &str, was_liked: bool) {
        if was_liked {
            self.liked.insert(id.to_string());
        } else {
            self.liked.remove(id);
        }
    }

    pub fn selected_journal(&self) -> Option<&Journal> {
        self.journals.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.journals.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn is_at_end(&self) -> bool {
        self.journals.is_empty() || self.selected + 1 == self.journals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str], has_more: bool, current_page: u32) -> FeedPage {
        let journals = ids
            .iter()
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "_id": id,
                    "title": format!("Entry {}", id),
                    "content": "...",
                    "likes": 2
                }))
                .unwrap()
            })
            .collect();
        FeedPage {
            journals,
            has_more,
            current_page,
        }
    }

    #[test]
    fn test_feed_page_shape() {
        let page: FeedPage = serde_json::from_str(
            r#"{"journals":[{"_id":"a","title":"t","content":"c"}],"hasMore":true,"currentPage":2}"#,
        )
        .unwrap();
        assert!(page.has_more);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.journals.len(), 1);

        let likes: LikedJournals = serde_json::from_str(r#"{"likedJournals":["a","b"]}"#).unwrap();
        assert_eq!(likes.liked_journals, vec!["a", "b"]);
    }

    #[test]
    fn test_pagination_appends() {
        let mut feed = FeedState::new(FeedKind::Everyone);
        feed.apply_page(page(&["a", "b"], true, 1), false);
        assert_eq!(feed.next_page(), Some(2));
        // a second "load more" while the first is in flight is ignored
        assert_eq!(feed.next_page(), None);

        feed.apply_page(page(&["c"], false, 2), true);
        assert_eq!(feed.journals.len(), 3);
        assert_eq!(feed.current_page, 2);
        assert_eq!(feed.next_page(), None);
    }

    #[test]
    fn test_failed_load_more_can_retry() {
        let mut feed = FeedState::new(FeedKind::CloseCircle);
        feed.apply_page(page(&["a"], true, 1), false);
        assert_eq!(feed.next_page(), Some(2));
        feed.fail("HTTP error! status: 500");
        assert_eq!(feed.next_page(), Some(2));
    }

    #[test]
    fn test_like_toggle_and_revert() {
        let mut feed = FeedState::new(FeedKind::Everyone);
        feed.apply_page(page(&["a"], false, 1), false);
        feed.set_liked(vec!["z".to_string()]);

        let was_liked = feed.toggle_like_optimistic("a");
        assert!(!was_liked);
        assert!(feed.is_liked("a"));
        feed.apply_like_count("a", 3);
        assert_eq!(feed.journals[0].likes, 3);

        let was_liked = feed.toggle_like_optimistic("a");
        assert!(was_liked);
        assert!(!feed.is_liked("a"));
        feed.revert_like("a", was_liked);
        assert!(feed.is_liked("a"));
    }

    #[test]
    fn test_selection_bounds() {
        let mut feed = FeedState::new(FeedKind::Everyone);
        assert!(feed.is_at_end());
        feed.apply_page(page(&["a", "b"], false, 1), false);
        feed.select_prev();
        assert_eq!(feed.selected, 0);
        feed.select_next();
        feed.select_next();
        assert_eq!(feed.selected, 1);
        assert!(feed.is_at_end());
        assert_eq!(feed.selected_journal().map(|j| j.id.as_str()), Some("b"));
    }
}
