use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Successful login: bearer token plus the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}
