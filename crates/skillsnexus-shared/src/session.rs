//! Learner session context, rebuilt from identity-provider notifications.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COUNTRY_CODE, DEFAULT_DISPLAY_NAME};
use crate::types::Currency;

/// Sign-in providers offered on the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Facebook,
}

impl AuthProvider {
    /// Provider id understood by the identity service.
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Facebook => "facebook.com",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "FB",
        }
    }
}

/// Identity reported by the identity provider for a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub currency: Currency,
    pub country_code: String,
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            currency: Currency::Zar,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            is_admin: false,
            region: None,
            is_authenticated: false,
            display_name: None,
            photo_url: None,
            email: None,
        }
    }
}

impl UserContext {
    /// Fold a session notification into the context.
    ///
    /// Identity fields follow the notification; locale fields (currency,
    /// country, region) are kept across sign-in and sign-out.
    pub fn apply_session(&mut self, identity: Option<&SessionIdentity>) {
        match identity {
            Some(user) => {
                self.is_authenticated = true;
                self.email = user.email.clone();
                self.display_name = Some(
                    user.display_name
                        .clone()
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
                );
                self.photo_url = user.photo_url.clone();
            }
            None => {
                self.is_authenticated = false;
                self.email = None;
                self.display_name = None;
                self.photo_url = None;
            }
        }
    }
}
