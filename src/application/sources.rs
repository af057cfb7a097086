//! Capability traits the application services are composed from.
//!
//! The sitemap assembler takes these at construction instead of exposing
//! overridable hooks: a route-resolution capability and any number of
//! entry providers.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::domain::entities::{RoutedEntry, UserProfileRecord};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route `{path}` could not be resolved against `{base}`: {reason}")]
    Unresolvable {
        path: String,
        base: String,
        reason: String,
    },
}

impl RouteError {
    pub fn unresolvable(path: &str, base: &Url, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            path: path.to_string(),
            base: base.to_string(),
            reason: reason.into(),
        }
    }
}

/// Resolves site-relative paths to absolute URLs.
pub trait RouteResolver: Send + Sync {
    /// Absolute base of the public site, with a trailing slash.
    fn base(&self) -> &Url;

    fn resolve(&self, path: &str) -> Result<Url, RouteError>;
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("profile listing failed: {0}")]
    Listing(String),
}

impl RepoError {
    pub fn listing(message: impl Into<String>) -> Self {
        Self::Listing(message.into())
    }
}

/// Read access to the user-profile directory.
#[async_trait]
pub trait ProfilesRepo: Send + Sync {
    async fn list_public_profiles(&self) -> Result<Vec<UserProfileRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<UserProfileRecord>, RepoError>;
}

/// Supplies routed entries for sitemap assembly.
///
/// Implementations degrade to partial output on their own: a provider that
/// cannot reach its backing store logs and returns what it has, it does not
/// fail the assembly.
#[async_trait]
pub trait EntryProvider: Send + Sync {
    async fn entries(&self) -> Vec<RoutedEntry>;
}
