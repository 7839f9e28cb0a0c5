//! Password authentication against the store's auth collection

use log::{debug, info};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::client::{HttpRecordStore, decode, send};
use super::models::{Session, StoredRecord};
use super::store::{StoreError, StoreResult};

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    record: Option<StoredRecord>,
}

/// Issues sessions for a given auth collection (usually `users`)
#[derive(Debug, Clone)]
pub struct AuthManager {
    store: HttpRecordStore,
    collection: String,
}

impl AuthManager {
    pub fn new(store: HttpRecordStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Exchange username/password for a session token
    pub async fn authenticate(&self, username: &str, password: &str) -> StoreResult<Session> {
        let url = format!(
            "{}/api/collections/{}/auth-with-password",
            self.store.base_url(),
            urlencoding::encode(&self.collection)
        );
        debug!("POST {} identity={}", url, username);

        let body = json!({ "identity": username, "password": password });
        let response = send(self.store.http().request(Method::POST, &url).json(&body)).await?;
        let auth: AuthResponse = decode(response).await?;

        let user = auth
            .record
            .as_ref()
            .and_then(|r| r.str_field("username").or_else(|| r.str_field("email")))
            .unwrap_or(username)
            .to_string();
        let session = Session::authenticated(auth.token, user);
        if !session.is_authenticated() {
            return Err(StoreError::Unauthorized);
        }
        info!("Authenticated as {}", session.user.as_deref().unwrap_or_default());

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_decodes() {
        let auth: AuthResponse = serde_json::from_str(
            r#"{"token":"eyJhbGciOi","record":{"id":"u1","username":"admin","email":"a@b.c"}}"#,
        )
        .unwrap();
        assert_eq!(auth.token, "eyJhbGciOi");
        assert_eq!(
            auth.record.as_ref().and_then(|r| r.str_field("username")),
            Some("admin")
        );
    }
}
