use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile record returned by the backend on login and check-token.
///
/// Fields this crate does not know about are kept in `extra` so the
/// record round-trips to UI code unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "isActive", default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// `{user, token}` body returned by both `/login` and `/check-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

pub type LoginResponse = AuthResponse;
pub type CheckTokenResponse = AuthResponse;

/// Body returned by `/register`. Its shape is backend-defined, so every
/// field is optional and anything else is kept in `extra`.
///
/// Built with [`RegisterResponse::from_body`], which never fails: an
/// accepted registration is a success whatever the body looks like.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The body exactly as received
    #[serde(skip)]
    pub raw: String,
}

impl RegisterResponse {
    /// Decode a 2xx register body leniently.
    ///
    /// A `user` that is not a full [`User`] stays in `extra["user"]`; a
    /// `token` that is not a string stays in `extra["token"]`. Empty or
    /// non-object bodies only fill `raw`.
    pub fn from_body(body: &str) -> Self {
        let mut extra = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Self {
                    raw: body.to_string(),
                    ..Self::default()
                }
            }
        };

        let user = match extra.remove("user") {
            Some(value) => match serde_json::from_value::<User>(value.clone()) {
                Ok(user) => Some(user),
                Err(_) => {
                    extra.insert("user".to_string(), value);
                    None
                }
            },
            None => None,
        };

        let token = match extra.remove("token") {
            Some(Value::String(token)) => Some(token),
            Some(other) => {
                extra.insert("token".to_string(), other);
                None
            }
            None => None,
        };

        Self {
            user,
            token,
            extra,
            raw: body.to_string(),
        }
    }
}
