use super::{image_part, ApiClient, ApiError};
use crate::calendar::MonthView;
use crate::feed::{FeedKind, FeedPage, LikeResponse, LikedJournals};
use crate::journal::{ImageChoice, Journal, JournalDraft};
use chrono::NaiveDate;
use reqwest::multipart::Form;
use reqwest::StatusCode;
use tracing::info;

impl ApiClient {
    /// Fields shared by create and update.
    async fn draft_form(&self, draft: &JournalDraft) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text("title", draft.title_value().to_string())
            .text("content", draft.content_value().to_string())
            .text("visibility", draft.visibility.as_str())
            .text("isAnonymous", draft.is_anonymous.to_string());
        if let ImageChoice::New(path) = &draft.image {
            form = form.part("image", image_part(path).await?);
        }
        Ok(form)
    }

    /// The entry written on `date`; a 404 means there is none.
    pub async fn journal_by_date(&self, date: NaiveDate) -> Result<Option<Journal>, ApiError> {
        let path = format!("/api/journals/date/{}", date.format("%Y-%m-%d"));
        match self.get_json::<Option<Journal>>(&path).await {
            Ok(journal) => Ok(journal),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn journals_for_month(&self, view: MonthView) -> Result<Vec<Journal>, ApiError> {
        self.get_json(&format!("/api/journals/month/{}/{}", view.year, view.month))
            .await
    }

    pub async fn create_journal(
        &self,
        draft: &JournalDraft,
        date: NaiveDate,
    ) -> Result<(), ApiError> {
        let form = self
            .draft_form(draft)
            .await?
            .text("journaldate", date.format("%Y-%m-%d").to_string());
        let response = self.send(self.post("/api/journals")?.multipart(form)).await?;
        if response.status() != StatusCode::CREATED {
            return Err(ApiError::Unexpected("Save failed. Try again.".to_string()));
        }
        info!("Journal created for {}", date);
        Ok(())
    }

    /// `remove_image` asks the backend to drop the entry's stored picture.
    pub async fn update_journal(
        &self,
        id: &str,
        draft: &JournalDraft,
        remove_image: bool,
    ) -> Result<(), ApiError> {
        let mut form = self.draft_form(draft).await?;
        if remove_image {
            form = form.text("removeImage", "true");
        }
        let response = self
            .send(self.put(&format!("/api/journals/{}", id))?.multipart(form))
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::Unexpected("Update failed. Try again.".to_string()));
        }
        info!("Journal {} updated", id);
        Ok(())
    }

    pub async fn user_journals(&self, user_id: &str) -> Result<Vec<Journal>, ApiError> {
        self.get_json(&format!("/api/journals/users/{}", user_id))
            .await
    }

    pub async fn feed_page(&self, kind: FeedKind, page: u32) -> Result<FeedPage, ApiError> {
        let request = self
            .get(kind.endpoint())?
            .query(&[("page", page), ("limit", self.page_size)]);
        self.json(request).await
    }

    pub async fn liked_journals(&self) -> Result<Vec<String>, ApiError> {
        let response: LikedJournals = self.get_json("/api/journal/user/likes").await?;
        Ok(response.liked_journals)
    }

    /// Likes or unlikes an entry and returns its new like count.
    pub async fn set_like(&self, journal_id: &str, like: bool) -> Result<u64, ApiError> {
        let path = format!("/api/journal/{}/like", journal_id);
        let request = if like {
            self.post(&path)?
        } else {
            self.delete(&path)?
        };
        let response: LikeResponse = self.json(request).await?;
        Ok(response.likes_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::serve_once;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> JournalDraft {
        let mut draft = JournalDraft::new();
        draft.title.set_text("Lake day");
        draft.content.set_text("Swam twice.");
        draft
    }

    /// The value of a text field in a multipart body.
    fn field<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        let marker = format!("name=\"{}\"\r\n\r\n", name);
        let start = request.find(&marker)? + marker.len();
        let rest = &request[start..];
        Some(&rest[..rest.find("\r\n")?])
    }

    #[tokio::test]
    async fn test_missing_day_is_none() {
        let (api, server) = serve_once("404 Not Found", r#"{"message":"No journal"}"#).await;
        let journal = api.journal_by_date(ymd(2024, 5, 2)).await.unwrap();
        assert!(journal.is_none());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/journals/date/2024-05-02 HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer t0k"));
    }

    #[tokio::test]
    async fn test_day_with_entry() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"_id":"j1","title":"Lake day","content":"Swam twice.","visibility":"everyone","journaldate":"2024-05-02"}"#,
        )
        .await;
        let journal = api.journal_by_date(ymd(2024, 5, 2)).await.unwrap().unwrap();
        assert_eq!(journal.id, "j1");
        assert_eq!(journal.title, "Lake day");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_errors_surface() {
        let (api, server) = serve_once("500 Internal Server Error", r#"{"message":"db down"}"#).await;
        let err = api.journal_by_date(ymd(2024, 5, 2)).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message_or("Failed"), "db down");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_create_sends_fields_and_needs_created() {
        let (api, server) = serve_once("201 Created", "{}").await;
        api.create_journal(&draft(), ymd(2024, 5, 2)).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/journals HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
        assert_eq!(field(&request, "journaldate"), Some("2024-05-02"));
        assert_eq!(field(&request, "title"), Some("Lake day"));
        assert_eq!(field(&request, "content"), Some("Swam twice."));
        assert_eq!(field(&request, "visibility"), Some("private"));
        assert_eq!(field(&request, "isAnonymous"), Some("false"));
        assert_eq!(field(&request, "removeImage"), None);

        let (api, server) = serve_once("200 OK", "{}").await;
        let err = api.create_journal(&draft(), ymd(2024, 5, 2)).await.unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
        assert_eq!(err.message_or("Something went wrong."), "Save failed. Try again.");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_update_remove_image_flag() {
        let (api, server) = serve_once("200 OK", "{}").await;
        api.update_journal("j1", &draft(), true).await.unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /api/journals/j1 HTTP/1.1"));
        assert_eq!(field(&request, "removeImage"), Some("true"));
        assert_eq!(field(&request, "journaldate"), None);

        let (api, server) = serve_once("200 OK", "{}").await;
        api.update_journal("j1", &draft(), false).await.unwrap();
        let request = server.await.unwrap();
        assert_eq!(field(&request, "removeImage"), None);
    }

    #[tokio::test]
    async fn test_update_needs_ok() {
        let (api, server) = serve_once("201 Created", "{}").await;
        let err = api.update_journal("j1", &draft(), false).await.unwrap_err();
        assert!(matches!(err, ApiError::Unexpected(_)));
        server.await.unwrap();
    }
}
