use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub user: PostAuthor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostAuthor {
    #[serde(rename = "userProfileId")]
    pub user_profile_id: i64,
    pub username: String,
}

impl Post {
    /// Whether the given profile id owns this post (controls the
    /// update/delete actions).
    pub fn is_owned_by(&self, user_profile_id: i64) -> bool {
        self.user.user_profile_id == user_profile_id
    }

    /// Creation date rendered for display; falls back to the raw string
    /// when it is not RFC 3339.
    pub fn display_created_at(&self) -> String {
        match chrono::DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(dt) => dt.format("%a %b %e %Y").to_string(),
            Err(_) => self.created_at.clone(),
        }
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub content: String,
    #[serde(rename = "hobbyId")]
    pub hobby_id: i64,
}

/// Body of `PUT /posts/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePost {
    pub content: String,
    #[serde(rename = "hobbyId")]
    pub hobby_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership() {
        let json = r#"{"id":9,"content":"morning ride","createdAt":"2024-03-02T07:15:00Z",
            "user":{"userProfileId":12,"username":"andi"}}"#;
        let post: Post = serde_json::from_str(json).expect("parse post");
        assert!(post.is_owned_by(12));
        assert!(!post.is_owned_by(13));
    }

    #[test]
    fn test_display_created_at() {
        let post = Post {
            id: 1,
            content: "x".to_string(),
            created_at: "2024-03-02T07:15:00Z".to_string(),
            user: PostAuthor {
                user_profile_id: 1,
                username: "andi".to_string(),
            },
        };
        assert_eq!(post.display_created_at(), "Sat Mar  2 2024");

        let raw = Post {
            created_at: "yesterday".to_string(),
            ..post
        };
        assert_eq!(raw.display_created_at(), "yesterday");
    }
}
