use chrono::NaiveDate;

/// The signed-in user's id, once `/api/auth/me` has answered.
#[derive(Debug, Default)]
pub struct UserStore {
    user_id: Option<String>,
}

impl UserStore {
    pub fn set_user_id(&mut self, id: impl Into<String>) {
        self.user_id = Some(id.into());
    }

    pub fn clear_user_id(&mut self) {
        self.user_id = None;
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// The calendar day the diary is looking at, shared with the editor header.
#[derive(Debug, Default)]
pub struct SelectedDayStore {
    selected_day: Option<NaiveDate>,
}

impl SelectedDayStore {
    pub fn set_selected_day(&mut self, day: NaiveDate) {
        self.selected_day = Some(day);
    }

    pub fn clear_selected_day(&mut self) {
        self.selected_day = None;
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.selected_day
    }

    pub fn day_or_today(&self, today: NaiveDate) -> NaiveDate {
        self.selected_day.unwrap_or(today)
    }
}
