use super::{ApiClient, ApiError};
use crate::friends::{Ack, FriendRequest, FriendStatus, PendingResponse, StatusResponse};
use crate::profile::{filter_suggestions, PublicUser, PublicUserResponse, UserSummary, UsersResponse};
use serde_json::json;
use tracing::info;

impl ApiClient {
    pub async fn friend_status(&self, user_id: &str) -> Result<FriendStatus, ApiError> {
        let response: StatusResponse = self
            .get_json(&format!("/api/friend-requests/status/{}", user_id))
            .await?;
        Ok(if response.success {
            response.status
        } else {
            FriendStatus::None
        })
    }

    pub async fn send_friend_request(&self, user_id: &str) -> Result<Ack, ApiError> {
        let request = self
            .post("/api/friend-requests/send")?
            .json(&json!({ "to": user_id }));
        let ack: Ack = self.json(request).await?;
        info!("Friend request sent to {}", user_id);
        Ok(ack)
    }

    pub async fn cancel_friend_request(&self, user_id: &str) -> Result<Ack, ApiError> {
        let request = self.delete(&format!("/api/friend-requests/cancel/{}", user_id))?;
        let ack: Ack = self.json(request).await?;
        info!("Friend request to {} cancelled", user_id);
        Ok(ack)
    }

    pub async fn pending_requests(&self) -> Result<Vec<FriendRequest>, ApiError> {
        let response: PendingResponse = self.get_json("/api/friend-requests/pending").await?;
        Ok(response.data)
    }

    /// Accepts or rejects a pending request.
    pub async fn answer_request(&self, request_id: &str, accept: bool) -> Result<(), ApiError> {
        let verb = if accept { "accept" } else { "reject" };
        let request = self
            .post(&format!("/api/friend-requests/{}/{}", verb, request_id))?
            .json(&json!({}));
        self.send(request).await?;
        info!("Friend request {} {}ed", request_id, verb);
        Ok(())
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, ApiError> {
        let request = self.get("/api/search")?.query(&[("q", query)]);
        let response: UsersResponse = self.json(request).await?;
        Ok(response.users)
    }

    /// People to discover next, minus the profile being viewed.
    pub async fn suggested_users(&self, viewing: &str) -> Result<Vec<UserSummary>, ApiError> {
        let request = self
            .get("/api/search/suggested")?
            .query(&[("limit", self.suggested_limit)]);
        let response: UsersResponse = self.json(request).await?;
        if !response.success {
            return Ok(Vec::new());
        }
        Ok(filter_suggestions(response.users, viewing))
    }

    pub async fn public_user(&self, user_id: &str) -> Result<PublicUser, ApiError> {
        let response: PublicUserResponse =
            self.get_json(&format!("/api/users/{}", user_id)).await?;
        match response.user {
            Some(user) if response.success => Ok(user),
            _ => Err(ApiError::Unexpected(
                "Invalid response format from server".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_server::serve_once;

    #[tokio::test]
    async fn test_suggestions_skip_viewed_user() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"success":true,"users":[{"_id":"u1","name":"Ada"},{"_id":"u2","name":"Grace"}]}"#,
        )
        .await;
        let users = api.suggested_users("u1").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "u2");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/search/suggested?limit=12 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_unsuccessful_suggestions_are_empty() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"success":false,"users":[{"_id":"u2","name":"Grace"}]}"#,
        )
        .await;
        assert!(api.suggested_users("u1").await.unwrap().is_empty());
        server.await.unwrap();
    }
}
