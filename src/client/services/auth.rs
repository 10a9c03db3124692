// Login, logout and token refresh against the auth endpoints

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::api_client::ApiClient;
use crate::client::error::{ClientError, ClientResult};
use crate::client::models::UserAccount;
use crate::client::payload::unwrap_data;
use crate::client::session::{LoginIdentity, Session};

use super::{decode_record, reraise};

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    session: Session,
}

impl AuthService {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Log in and persist the returned identity
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<UserAccount> {
        let result = self
            .client
            .post("login", &json!({ "email": email, "password": password }))
            .await
            .and_then(|payload| self.store_login(payload));
        reraise("login", result)
    }

    fn store_login(&self, payload: Value) -> ClientResult<UserAccount> {
        let data = unwrap_data(payload);
        let token = string_field(&data, &["token", "access_token"])
            .ok_or_else(|| ClientError::Decode("Login response carried no token".to_string()))?;
        let refresh_token = string_field(&data, &["refresh_token", "refreshToken"]);
        let user_value = data.get("user").cloned().unwrap_or(Value::Null);
        let user: UserAccount = if user_value.is_object() {
            serde_json::from_value(user_value.clone())
                .map_err(|e| ClientError::Decode(e.to_string()))?
        } else {
            UserAccount::default()
        };

        self.session.store_login(&LoginIdentity {
            token,
            refresh_token,
            user: user_value,
            user_name: user.name.clone(),
            user_role: user.role.clone(),
        })?;

        info!(user_id = ?user.id, role = ?user.role, "Logged in");
        Ok(user)
    }

    /// Tell the server, then clear the local session whatever it said
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.client.post("logout", &json!({})).await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        reraise("logout", self.session.clear())
    }

    /// Exchange the stored refresh token for a new token pair
    pub async fn refresh_token(&self) -> ClientResult<String> {
        let refresh = self
            .session
            .refresh_token()
            .ok_or_else(|| ClientError::NotLoggedIn("no refresh token stored".to_string()))?;

        let result = self
            .client
            .post("refresh", &json!({ "refresh_token": refresh }))
            .await
            .and_then(|payload| {
                let data = unwrap_data(payload);
                let token = string_field(&data, &["token", "access_token"]).ok_or_else(|| {
                    ClientError::Decode("Refresh response carried no token".to_string())
                })?;
                let refresh_token = string_field(&data, &["refresh_token", "refreshToken"]);
                self.session.store_tokens(&token, refresh_token.as_deref())?;
                Ok(token)
            });
        reraise("refresh_token", result)
    }

    pub async fn current_user(&self) -> ClientResult<UserAccount> {
        let result = self.client.get("me").await;
        reraise("current_user", result.and_then(decode_record))
    }
}

fn string_field(data: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| data.get(*name).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
