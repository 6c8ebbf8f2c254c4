use crate::textarea::TextArea;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const CHARACTER_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Private,
    CloseCircle,
    #[serde(alias = "public")]
    Everyone,
}

impl Visibility {
    pub const OPTIONS: [Visibility; 3] = [
        Visibility::Private,
        Visibility::CloseCircle,
        Visibility::Everyone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::CloseCircle => "close-circle",
            Visibility::Everyone => "everyone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Visibility::Private => "Private",
            Visibility::CloseCircle => "Me & my friends",
            Visibility::Everyone => "Everyone",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Visibility::Private => "🔒",
            Visibility::CloseCircle => "👥",
            Visibility::Everyone => "🌍",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Visibility::Private => "Only you can see this",
            Visibility::CloseCircle => "Your close friends can see",
            Visibility::Everyone => "Anyone on Close Circle can read",
        }
    }

    pub fn next(&self) -> Visibility {
        match self {
            Visibility::Private => Visibility::CloseCircle,
            Visibility::CloseCircle => Visibility::Everyone,
            Visibility::Everyone => Visibility::Private,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(rename = "journaldate", default)]
    pub journal_date: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub reads: u64,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Journal {
    /// The diary day this entry belongs to.
    pub fn date(&self) -> Option<NaiveDate> {
        self.journal_date
            .as_deref()
            .and_then(parse_journal_date)
            .or_else(|| self.created_at.map(|t| t.date_naive()))
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn author_label(&self, anonymous_label: &str) -> String {
        match (&self.author, self.is_anonymous) {
            (Some(author), false) => author
                .name
                .clone()
                .unwrap_or_else(|| anonymous_label.to_string()),
            _ => anonymous_label.to_string(),
        }
    }

    /// Location is only shown for entries that reveal their author.
    pub fn author_location(&self) -> Option<&str> {
        if self.is_anonymous {
            return None;
        }
        self.author.as_ref()?.location.as_deref()
    }
}

/// Dates come back either as full ISO timestamps (`2024-05-02T00:00:00.000Z`)
/// or as bare `YYYY-MM-DD`. The calendar day is taken in UTC.
pub fn parse_journal_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageChoice {
    #[default]
    None,
    Existing(String),
    New(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Both title and content are required.")]
    MissingFields,

    #[error("Image file {0:?} does not exist")]
    MissingImage(PathBuf),
}

/// The editor's working copy of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalDraft {
    pub title: TextArea,
    pub content: TextArea,
    pub visibility: Visibility,
    pub is_anonymous: bool,
    pub image: ImageChoice,
}

impl Default for JournalDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalDraft {
    pub fn new() -> Self {
        JournalDraft {
            title: TextArea::new(),
            content: TextArea::with_limit(CHARACTER_LIMIT),
            visibility: Visibility::Private,
            is_anonymous: false,
            image: ImageChoice::None,
        }
    }

    pub fn from_journal(journal: &Journal) -> Self {
        let mut draft = Self::new();
        draft.title.set_text(&journal.title);
        draft.content.set_text(&journal.content);
        draft.visibility = journal.visibility;
        draft.is_anonymous = journal.is_anonymous && journal.visibility != Visibility::Private;
        if let Some(url) = journal.first_image() {
            draft.image = ImageChoice::Existing(url.to_string());
        }
        draft
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        if visibility == Visibility::Private {
            self.is_anonymous = false;
        }
    }

    pub fn cycle_visibility(&mut self) {
        self.set_visibility(self.visibility.next());
    }

    /// Anonymity only means something for shared entries.
    pub fn toggle_anonymous(&mut self) {
        if self.visibility != Visibility::Private {
            self.is_anonymous = !self.is_anonymous;
        }
    }

    pub fn attach_image(&mut self, path: impl Into<PathBuf>) -> Result<(), DraftError> {
        let path = path.into();
        if !path.is_file() {
            return Err(DraftError::MissingImage(path));
        }
        self.image = ImageChoice::New(path);
        Ok(())
    }

    pub fn remove_image(&mut self) {
        self.image = ImageChoice::None;
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.is_blank() || self.content.is_blank() {
            return Err(DraftError::MissingFields);
        }
        Ok(())
    }

    pub fn title_value(&self) -> &str {
        self.title.text().trim()
    }

    pub fn content_value(&self) -> &str {
        self.content.text().trim()
    }
}
