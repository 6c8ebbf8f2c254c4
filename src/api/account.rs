use super::{image_part, ApiClient, ApiError};
use crate::auth::{LoginForm, SignupForm};
use crate::profile::{
    close_friend_endpoint, CloseFriends, CommunityCount, Profile, ProfileUpdate, UploadResponse,
    UserSummary,
};
use reqwest::multipart::Form;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct Me {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
}

impl ApiClient {
    pub async fn login(&self, form: &LoginForm) -> Result<String, ApiError> {
        let request = self.client.post(self.url("/api/auth/login")).json(form);
        let response: LoginResponse = self.json(request).await?;
        info!("Logged in as {}", form.username);
        Ok(response.token)
    }

    pub async fn register(&self, form: &SignupForm) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/api/auth/register"))
            .json(form);
        self.send(request).await?;
        info!("Registered {}", form.username);
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/api/auth/forgot-password"))
            .json(&json!({ "email": email }));
        self.send(request).await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/api/auth/reset-password/{}", token)))
            .json(&json!({ "password": password }));
        self.send(request).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<Me, ApiError> {
        self.get_json("/api/auth/me").await
    }

    pub async fn my_profile(&self) -> Result<Profile, ApiError> {
        self.get_json("/api/myprofile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.send(self.put("/api/myprofile")?.json(update)).await?;
        info!("Profile updated");
        Ok(())
    }

    /// Uploads a picture and returns the URL the backend stored it under.
    pub async fn upload_profile_image(&self, path: &Path) -> Result<String, ApiError> {
        let form = Form::new().part("image", image_part(path).await?);
        let response: UploadResponse = self
            .json(self.post("/api/upload/profile-image")?.multipart(form))
            .await?;
        Ok(response.image_url)
    }

    pub async fn community_count(&self) -> Result<CommunityCount, ApiError> {
        self.get_json("/api/myprofile/community/count").await
    }

    pub async fn close_friends(&self) -> Result<Vec<UserSummary>, ApiError> {
        let response: CloseFriends = self
            .get_json("/api/myprofile/community/closefriends")
            .await?;
        Ok(response.close_friends)
    }

    pub async fn remove_close_friend(&self, user_id: &str) -> Result<(), ApiError> {
        self.send(self.delete(&close_friend_endpoint(user_id))?).await?;
        info!("Removed {} from close friends", user_id);
        Ok(())
    }
}
