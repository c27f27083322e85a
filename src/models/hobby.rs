use serde::{Deserialize, Serialize};

use crate::models::post::Post;

/// A hobby as listed by `GET /hobbies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hobby {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image: String,
    #[serde(rename = "isJoined", default)]
    pub is_joined: bool,
    #[serde(default)]
    pub users: Vec<HobbyMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HobbyMember {
    pub id: i64,
    pub username: String,
}

/// A single hobby with its posts, from `GET /hobbies/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HobbyDetail {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image: String,
    #[serde(rename = "isJoined", default)]
    pub is_joined: bool,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// `{data: {hobbies: [..]}}` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HobbiesPayload {
    pub hobbies: Vec<Hobby>,
}

/// `{data: {hobby}}` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HobbyPayload {
    pub hobby: HobbyDetail,
}

/// Body of `POST /user/hobby`. The server takes a batch of hobby ids.
#[derive(Debug, Clone, Serialize)]
pub struct JoinHobbyRequest {
    #[serde(rename = "hobbyId")]
    pub hobby_id: Vec<i64>,
}
