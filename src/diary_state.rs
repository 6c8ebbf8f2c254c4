use crate::calendar::{self, CalendarDay, MonthView};
use crate::journal::{ImageChoice, Journal, JournalDraft};
use crate::stores::SelectedDayStore;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("Can't write in future dates!")]
    FutureDate,
}

/// How the editor's save button talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update { id: String, had_images: bool },
}

/// State behind the My Diary screen: one selected day, the month around it
/// and the entry written on it.
#[derive(Debug)]
pub struct DiaryState {
    pub selected: NaiveDate,
    pub view: MonthView,
    pub cursor: NaiveDate,
    pub journal_dates: HashSet<NaiveDate>,
    pub current: Option<Journal>,
    pub draft: JournalDraft,
    pub editing: bool,
    pub saved: bool,
    pub loading_journal: bool,
    pub loading_month: bool,
    pub saving: bool,
    pub days: SelectedDayStore,
}

impl DiaryState {
    /// Opens on the remembered day, or today when there is none.
    pub fn new(today: NaiveDate, mut days: SelectedDayStore) -> Self {
        let selected = days
            .selected_day()
            .filter(|day| *day <= today)
            .unwrap_or(today);
        days.set_selected_day(selected);
        DiaryState {
            selected,
            view: MonthView::containing(selected),
            cursor: selected,
            journal_dates: HashSet::new(),
            current: None,
            draft: JournalDraft::new(),
            editing: false,
            saved: false,
            loading_journal: true,
            loading_month: true,
            saving: false,
            days,
        }
    }

    /// Picks a day to read or write. The calendar follows the selection.
    pub fn select(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), SelectError> {
        if date > today {
            return Err(SelectError::FutureDate);
        }
        self.open(date);
        Ok(())
    }

    fn open(&mut self, date: NaiveDate) {
        self.selected = date;
        self.cursor = date;
        self.view = MonthView::containing(date);
        self.days.set_selected_day(date);
        self.current = None;
        self.editing = false;
        self.saved = false;
        self.loading_journal = true;
        self.draft.clear();
    }

    /// Moves the calendar cursor; returns true when it crossed into another
    /// month so the caller can fetch that month's dates.
    pub fn move_cursor(&mut self, days: i64) -> bool {
        self.cursor += Duration::days(days);
        if self.view.contains(self.cursor) {
            return false;
        }
        self.view = MonthView::containing(self.cursor);
        self.loading_month = true;
        true
    }

    pub fn show_month(&mut self, view: MonthView) {
        if view == self.view {
            return;
        }
        self.view = view;
        if !view.contains(self.cursor) {
            self.cursor = view.first_day();
        }
        self.loading_month = true;
    }

    /// Jumps back to today and opens its page.
    pub fn today(&mut self, today: NaiveDate) {
        self.show_month(MonthView::containing(today));
        self.open(today);
    }

    pub fn set_month_journals(&mut self, journals: &[Journal]) {
        self.journal_dates = calendar::journal_dates(journals);
        self.loading_month = false;
    }

    pub fn set_current_journal(&mut self, journal: Option<Journal>) {
        self.current = journal;
        self.loading_journal = false;
        if !self.editing {
            self.draft.clear();
        }
    }

    pub fn begin_edit(&mut self) {
        if let Some(journal) = &self.current {
            self.draft = JournalDraft::from_journal(journal);
        }
        self.editing = true;
        self.saved = false;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.draft.clear();
    }

    /// Whether the editor is showing: no entry yet for the day, or editing.
    pub fn is_writing(&self) -> bool {
        self.editing || (self.current.is_none() && !self.loading_journal)
    }

    pub fn save_mode(&self) -> SaveMode {
        match &self.current {
            Some(journal) if self.editing => SaveMode::Update {
                id: journal.id.clone(),
                had_images: !journal.images.is_empty(),
            },
            _ => SaveMode::Create,
        }
    }

    /// True when an update must tell the backend to drop the old image.
    pub fn removes_image(&self) -> bool {
        matches!(
            self.save_mode(),
            SaveMode::Update {
                had_images: true,
                ..
            }
        ) && self.draft.image == ImageChoice::None
    }

    pub fn mark_saved(&mut self) {
        self.saving = false;
        self.saved = true;
        self.editing = false;
        self.draft.clear();
    }

    pub fn cells(&self, today: NaiveDate) -> Vec<Option<CalendarDay>> {
        calendar::grid(
            self.view,
            self.selected,
            self.cursor,
            today,
            &self.journal_dates,
        )
    }
}
