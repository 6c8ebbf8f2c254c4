use ratatui::style::Color;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn color(&self) -> Color {
        match self {
            NoticeKind::Success => Color::Green,
            NoticeKind::Info => Color::Cyan,
            NoticeKind::Warning => Color::Yellow,
            NoticeKind::Error => Color::Red,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NoticeKind::Success => "✓",
            NoticeKind::Info => "ℹ",
            NoticeKind::Warning => "⚠️",
            NoticeKind::Error => "✗",
        }
    }

    fn lifetime(&self) -> Duration {
        match self {
            NoticeKind::Success | NoticeKind::Info => Duration::from_secs(3),
            NoticeKind::Warning => Duration::from_secs(2),
            NoticeKind::Error => Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

/// The single toast line at the bottom of a screen.
#[derive(Debug, Default)]
pub struct Notices {
    current: Option<Notice>,
}

impl Notices {
    pub fn push_at(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            kind,
            message: message.into(),
            expires_at: now + kind.lifetime(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push_at(NoticeKind::Success, message, Instant::now());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_at(NoticeKind::Info, message, Instant::now());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push_at(NoticeKind::Warning, message, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push_at(NoticeKind::Error, message, Instant::now());
    }

    pub fn active(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.expires_at)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes() {
        let now = Instant::now();
        let mut notices = Notices::default();

        notices.push_at(NoticeKind::Success, "Journal saved", now);
        assert!(notices.active(now + Duration::from_millis(2900)).is_some());
        assert!(notices.active(now + Duration::from_secs(3)).is_none());

        notices.push_at(NoticeKind::Error, "Failed to update journal.", now);
        assert!(notices.active(now + Duration::from_millis(4900)).is_some());

        notices.push_at(NoticeKind::Warning, "Can't write in future dates!", now);
        assert!(notices.active(now + Duration::from_millis(2100)).is_none());
    }

    #[test]
    fn test_newest_replaces_and_clear() {
        let now = Instant::now();
        let mut notices = Notices::default();
        notices.push_at(NoticeKind::Info, "one", now);
        notices.push_at(NoticeKind::Error, "two", now);
        assert_eq!(notices.active(now).map(|n| n.message.as_str()), Some("two"));
        notices.clear();
        assert!(notices.active(now).is_none());
    }
}
