//! User information contract for identity providers.
//!
//! Each provider hands back profile attributes in its own shape. Types in
//! this crate deserialize those payloads and expose them through the
//! provider-agnostic [`UserInfo`] trait.
//!
//! - [`OidcUserInfo`]: standard OpenID Connect userinfo claims.
//! - [`GitHubUserInfo`]: the GitHub `/user` resource.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Profile information about an authenticated user.
///
/// Accessors never return null; an attribute the provider did not release is
/// reported as an empty string.
pub trait UserInfo {
    fn username(&self) -> &str;

    fn full_name(&self) -> &str;

    fn email(&self) -> &str;
}

impl<T: UserInfo + ?Sized> UserInfo for Box<T> {
    fn username(&self) -> &str {
        (**self).username()
    }

    fn full_name(&self) -> &str {
        (**self).full_name()
    }

    fn email(&self) -> &str {
        (**self).email()
    }
}

/// Claims returned by an OpenID Connect userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OidcUserInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub preferred_username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl UserInfo for OidcUserInfo {
    fn username(&self) -> &str {
        &self.preferred_username
    }

    fn full_name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> &str {
        &self.email
    }
}

/// The subset of GitHub's `/user` resource used as profile information.
///
/// GitHub sends `null` for a name or email the user keeps private.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitHubUserInfo {
    #[serde(default)]
    pub login: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl UserInfo for GitHubUserInfo {
    fn username(&self) -> &str {
        &self.login
    }

    fn full_name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> &str {
        &self.email
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identity providers with a known userinfo shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Oidc,
    GitHub,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Oidc => "oidc",
            Provider::GitHub => "github",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oidc" | "openid" => Ok(Provider::Oidc),
            "github" => Ok(Provider::GitHub),
            other => Err(IdentityError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unknown identity provider '{0}' (expected oidc or github)")]
    UnknownProvider(String),

    #[error("invalid {provider} userinfo document: {source}")]
    InvalidDocument {
        provider: Provider,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a provider's userinfo JSON document.
pub fn parse_user_info(provider: Provider, json: &str) -> Result<Box<dyn UserInfo>, IdentityError> {
    let invalid = |source| IdentityError::InvalidDocument { provider, source };
    debug!(provider = provider.as_str(), bytes = json.len(), "parsing userinfo");
    Ok(match provider {
        Provider::Oidc => Box::new(serde_json::from_str::<OidcUserInfo>(json).map_err(invalid)?),
        Provider::GitHub => {
            Box::new(serde_json::from_str::<GitHubUserInfo>(json).map_err(invalid)?)
        }
    })
}
