use serde::{Deserialize, Serialize};

use crate::models::hobby::Hobby;

/// The account identity returned by login, register and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "userProfileId")]
    pub user_profile_id: i64,
    pub username: String,
    pub email: String,
}

/// `{data: {user}}` payload of the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

/// Public profile served by `GET /user/:userProfileId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub sosmed: Option<SocialLinks>,
    #[serde(default)]
    pub hobbies: Vec<Hobby>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// `{data: {user}}` payload of the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "passwordConfirmation")]
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_payload() {
        let json = r#"{"user":{"id":7,"userProfileId":12,"username":"andi","email":"andi@example.com"}}"#;
        let payload: UserPayload = serde_json::from_str(json).expect("parse user payload");
        assert_eq!(payload.user.id, 7);
        assert_eq!(payload.user.user_profile_id, 12);
        assert_eq!(payload.user.username, "andi");
    }

    #[test]
    fn test_parse_profile_with_hobbies() {
        let json = r#"{"user":{"id":12,"username":"andi","fullName":"Andi Wijaya","bio":null,
            "sosmed":{"instagram":"@andi","tiktok":null,"linkedin":null,"website":null},
            "hobbies":[{"id":1,"name":"Cycling","description":"road bikes","image":"cycling.png","isJoined":true,"users":[]}]}}"#;
        let payload: ProfilePayload = serde_json::from_str(json).expect("parse profile");
        assert_eq!(payload.user.full_name.as_deref(), Some("Andi Wijaya"));
        assert_eq!(payload.user.hobbies.len(), 1);
        assert!(payload.user.hobbies[0].is_joined);
    }

    #[test]
    fn test_register_request_wire_names() {
        let req = RegisterRequest {
            email: "a@b.co".to_string(),
            password: "password1".to_string(),
            password_confirmation: "password1".to_string(),
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert!(value.get("passwordConfirmation").is_some());
        assert!(value.get("password_confirmation").is_none());
    }
}
