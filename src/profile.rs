use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A user as returned by search, suggestions and community lists.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawUser")]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
}

/// The backend is not consistent about field names across endpoints, and
/// some documents carry both spellings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(rename = "_id")]
    object_id: Option<String>,
    id: Option<String>,
    name: Option<String>,
    full_name: Option<String>,
    username: Option<String>,
    avatar: Option<String>,
    profile_picture: Option<String>,
    profile_image: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    total_likes: u64,
    #[serde(default)]
    total_reads: u64,
    consistency: Option<serde_json::Value>,
    #[serde(default)]
    journal_count: u64,
}

impl RawUser {
    fn resolved_id(&mut self) -> String {
        self.object_id.take().or(self.id.take()).unwrap_or_default()
    }

    fn resolved_name(&mut self) -> Option<String> {
        self.name.take().or(self.full_name.take())
    }

    fn resolved_image(&mut self) -> Option<String> {
        self.profile_image
            .take()
            .or(self.profile_picture.take())
            .or(self.avatar.take())
    }
}

impl From<RawUser> for UserSummary {
    fn from(mut raw: RawUser) -> Self {
        UserSummary {
            id: raw.resolved_id(),
            name: raw.resolved_name(),
            username: raw.username,
            bio: raw.bio,
        }
    }
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| "Unknown user".to_string())
    }

    pub fn handle(&self) -> String {
        self.username
            .as_ref()
            .map(|u| format!("@{}", u))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

/// Another user's profile page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawUser")]
pub struct PublicUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub total_likes: u64,
    pub total_reads: u64,
    pub consistency: Option<serde_json::Value>,
    pub journal_count: u64,
}

impl From<RawUser> for PublicUser {
    fn from(mut raw: RawUser) -> Self {
        PublicUser {
            name: raw.resolved_name(),
            profile_image: raw.resolved_image(),
            username: raw.username,
            bio: raw.bio,
            location: raw.location,
            created_at: raw.created_at,
            total_likes: raw.total_likes,
            total_reads: raw.total_reads,
            consistency: raw.consistency,
            journal_count: raw.journal_count,
        }
    }
}

impl PublicUser {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| "Unknown user".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicUserResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<PublicUser>,
}

/// The signed-in user's own profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub total_reads: u64,
    #[serde(default)]
    pub consistency: Option<serde_json::Value>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| "Anonymous User".to_string())
    }
}

pub fn member_since(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|t| format!("Member since {}", t.format("%B %Y")))
        .unwrap_or_default()
}

/// Consistency arrives as a number on some accounts and as text on others.
pub fn consistency_label(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::Number(n)) => format!("{}%", n),
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "-".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub username: String,
    pub bio: String,
    pub location: String,
    pub profile_image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

/// Edit-profile form. An image is either a URL or a local file, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub username: String,
    pub bio: String,
    pub location: String,
    pub profile_image: String,
    pub image_file: Option<PathBuf>,
}

impl ProfileForm {
    pub fn from_profile(profile: &Profile) -> Self {
        ProfileForm {
            name: profile.name.clone().unwrap_or_default(),
            username: profile.username.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            profile_image: profile.profile_image.clone().unwrap_or_default(),
            image_file: None,
        }
    }

    pub fn set_image_url(&mut self, url: &str) {
        self.profile_image = url.trim().to_string();
        if !self.profile_image.is_empty() {
            self.image_file = None;
        }
    }

    pub fn set_image_file(&mut self, path: PathBuf) {
        self.image_file = Some(path);
        self.profile_image.clear();
    }

    pub fn remove_image(&mut self) {
        self.image_file = None;
        self.profile_image.clear();
    }

    /// The JSON body, with the URL an upload produced taking precedence.
    pub fn to_update(&self, uploaded_url: Option<String>) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            bio: self.bio.trim().to_string(),
            location: self.location.trim().to_string(),
            profile_image: uploaded_url.unwrap_or_else(|| self.profile_image.clone()),
        }
    }
}

pub const CLOSE_FRIEND_REMOVED: &str = "Removed from close friends successfully";

pub fn close_friend_endpoint(user_id: &str) -> String {
    format!("/api/myprofile/community/closefriends/{}", user_id)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityCount {
    #[serde(default)]
    pub close_friends: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseFriends {
    #[serde(default)]
    pub close_friends: Vec<UserSummary>,
}

/// Close friends list with its counter kept in step.
#[derive(Debug, Default)]
pub struct Community {
    pub close_friend_count: u64,
    pub close_friends: Vec<UserSummary>,
    pub selected: usize,
    pub removing: Option<String>,
}

impl Community {
    pub fn removed(&mut self, user_id: &str) {
        let before = self.close_friends.len();
        self.close_friends.retain(|u| u.id != user_id);
        if self.close_friends.len() < before {
            self.close_friend_count = self.close_friend_count.saturating_sub(1);
        }
        if self.selected >= self.close_friends.len() {
            self.selected = self.close_friends.len().saturating_sub(1);
        }
        self.removing = None;
    }
}

/// Suggestions never include the profile being looked at.
pub fn filter_suggestions(users: Vec<UserSummary>, viewing: &str) -> Vec<UserSummary> {
    users.into_iter().filter(|u| u.id != viewing).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_summary_aliases() {
        let users: UsersResponse = serde_json::from_str(
            r#"{"success":true,"users":[
                {"_id":"1","fullName":"Ada L","username":"ada","profilePicture":"p.png"},
                {"id":"2","_id":"2","name":"Grace","avatar":"g.png","profileImage":"g2.png"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(users.users[0].id, "1");
        assert_eq!(users.users[0].display_name(), "Ada L");
        assert_eq!(users.users[0].handle(), "@ada");
        assert_eq!(users.users[1].id, "2");
        assert_eq!(users.users[1].handle(), "");
    }

    #[test]
    fn test_public_user_response() {
        let response: PublicUserResponse = serde_json::from_str(
            r#"{"success":true,"user":{"id":"9","name":"Lin","totalLikes":12,
                "journalCount":3,"consistency":80,"createdAt":"2023-11-04T10:00:00Z"}}"#,
        )
        .unwrap();
        let user = response.user.unwrap();
        assert_eq!(user.total_likes, 12);
        assert_eq!(user.journal_count, 3);
        assert_eq!(consistency_label(user.consistency.as_ref()), "80%");
        assert_eq!(member_since(user.created_at), "Member since November 2023");
    }

    #[test]
    fn test_profile_form_image_exclusive() {
        let mut form = ProfileForm::default();
        form.set_image_file(PathBuf::from("me.png"));
        assert_eq!(form.image_file, Some(PathBuf::from("me.png")));

        form.set_image_url(" https://cdn.example/me.png ");
        assert_eq!(form.image_file, None);
        assert_eq!(form.profile_image, "https://cdn.example/me.png");

        form.set_image_file(PathBuf::from("other.png"));
        assert!(form.profile_image.is_empty());

        form.remove_image();
        assert_eq!(form, ProfileForm::default());
    }

    #[test]
    fn test_update_prefers_uploaded_url() {
        let form = ProfileForm {
            name: " Ada ".into(),
            profile_image: "old.png".into(),
            ..ProfileForm::default()
        };
        let update = form.to_update(Some("new.png".into()));
        assert_eq!(update.name, "Ada");
        assert_eq!(update.profile_image, "new.png");
        assert_eq!(form.to_update(None).profile_image, "old.png");

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["profileImage"], "new.png");
    }

    #[test]
    fn test_community_removal_updates_count() {
        let mut community = Community {
            close_friend_count: 2,
            close_friends: vec![
                UserSummary {
                    id: "a".into(),
                    ..UserSummary::default()
                },
                UserSummary {
                    id: "b".into(),
                    ..UserSummary::default()
                },
            ],
            selected: 1,
            removing: Some("b".into()),
        };
        community.removed("b");
        assert_eq!(community.close_friend_count, 1);
        assert_eq!(community.selected, 0);
        assert_eq!(community.removing, None);

        community.removed("missing");
        assert_eq!(community.close_friend_count, 1);
    }

    #[test]
    fn test_community_endpoints() {
        assert_eq!(
            close_friend_endpoint("42"),
            "/api/myprofile/community/closefriends/42"
        );
    }

    #[test]
    fn test_suggestions_exclude_viewed_user() {
        let users = vec![
            UserSummary {
                id: "me".into(),
                ..UserSummary::default()
            },
            UserSummary {
                id: "you".into(),
                ..UserSummary::default()
            },
        ];
        let filtered = filter_suggestions(users, "me");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "you");
    }
}
