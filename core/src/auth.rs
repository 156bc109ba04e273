//! Credentials accepted by the Zendesk API.

use std::fmt;

use base64::prelude::{Engine as _, BASE64_STANDARD};

/// How requests authenticate against Zendesk.
///
/// `ApiToken` is Zendesk's `{email}/token:{token}` basic-auth form.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Basic { email: String, password: String },
    ApiToken { email: String, token: String },
    Bearer(String),
}

impl Credential {
    pub fn basic(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::Basic {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn api_token(email: impl Into<String>, token: impl Into<String>) -> Self {
        Credential::ApiToken {
            email: email.into(),
            token: token.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Credential::Bearer(token.into())
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Credential::Basic { email, password } => {
                format!("Basic {}", BASE64_STANDARD.encode(format!("{email}:{password}")))
            }
            Credential::ApiToken { email, token } => {
                format!("Basic {}", BASE64_STANDARD.encode(format!("{email}/token:{token}")))
            }
            Credential::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Credential::ApiToken { email, .. } => f
                .debug_struct("ApiToken")
                .field("email", email)
                .field("token", &"<redacted>")
                .finish(),
            Credential::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}
