//! Session boundary types: credentials, user profile, token storage.
//!
//! The observation core performs no authentication itself; the gateway
//! attaches whatever token the [`TokenStore`] currently holds.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role string the API uses for administrators.
pub const ROLE_ADMIN: &str = "admin";

/// How the `id` field of a login request is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    Username,
    Phone,
}

/// Credentials exchanged for a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login_type: LoginType,
    pub id: String,
    pub password: String,
}

/// Authenticated user profile returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Persistent key-value storage for the session token and cached user
/// profile. The HTTP gateway reads the token through this interface on
/// every request, so a login in one place is picked up everywhere.
pub trait TokenStore {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear_token(&self);

    fn user(&self) -> Option<UserInfo>;
    fn set_user(&self, user: &UserInfo);
    fn clear_user(&self);
}

/// Authentication operations against the monitoring API.
#[allow(async_fn_in_trait)]
pub trait AuthGateway {
    /// Exchange credentials for a session token.
    async fn login(&self, request: &LoginRequest) -> Result<String>;

    /// Fetch the profile of the currently authenticated user.
    async fn get_me(&self) -> Result<UserInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_serializes_lowercase_type() {
        let request = LoginRequest {
            login_type: LoginType::Phone,
            id: "13800000000".to_string(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""login_type":"phone""#));
    }

    #[test]
    fn admin_role_is_recognized() {
        let user = UserInfo {
            id: 1,
            username: "ops".to_string(),
            role: "admin".to_string(),
            phone: None,
            name: None,
            department: None,
        };
        assert!(user.is_admin());
    }
}
