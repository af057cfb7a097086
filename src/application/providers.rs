//! Entry providers for sitemap assembly.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::entities::RoutedEntry;
use crate::domain::error::DomainError;
use crate::domain::types::ChangeFrequency;

use super::sources::{EntryProvider, ProfilesRepo};

const PROFILE_PRIORITY: f32 = 0.5;

/// The fixed, application-defined page list every deployment carries.
pub struct StaticPagesProvider {
    routes: Vec<RoutedEntry>,
}

impl StaticPagesProvider {
    /// Standard scaffold pages: home, about, contact.
    pub fn standard() -> Self {
        Self {
            routes: vec![
                RoutedEntry::new("/", 1.0),
                RoutedEntry::new("/about", 0.9),
                RoutedEntry::new("/contact", 0.9),
            ],
        }
    }

    /// Build a provider from caller-supplied routes. Paths must be
    /// site-relative and priorities inside `[0.0, 1.0]`.
    pub fn from_routes(routes: Vec<RoutedEntry>) -> Result<Self, DomainError> {
        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(DomainError::validation(format!(
                    "route `{}` is not site-relative",
                    route.path
                )));
            }
            if !(0.0..=1.0).contains(&route.priority) {
                return Err(DomainError::validation(format!(
                    "route `{}` has priority {} outside [0.0, 1.0]",
                    route.path, route.priority
                )));
            }
        }
        Ok(Self { routes })
    }
}

#[async_trait]
impl EntryProvider for StaticPagesProvider {
    async fn entries(&self) -> Vec<RoutedEntry> {
        self.routes.clone()
    }
}

/// Contributes one entry per public user profile.
pub struct ProfilesProvider {
    profiles: Arc<dyn ProfilesRepo>,
}

impl ProfilesProvider {
    pub fn new(profiles: Arc<dyn ProfilesRepo>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl EntryProvider for ProfilesProvider {
    async fn entries(&self) -> Vec<RoutedEntry> {
        let profiles = match self.profiles.list_public_profiles().await {
            Ok(profiles) => profiles,
            Err(err) => {
                warn!(error = %err, "Profile directory unavailable, omitting profile entries");
                return Vec::new();
            }
        };

        profiles
            .into_iter()
            .map(|profile| {
                RoutedEntry::new(format!("/profiles/{}", profile.slug), PROFILE_PRIORITY)
                    .with_lastmod(Some(profile.updated_at))
                    .with_changefreq(Some(ChangeFrequency::Weekly))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn standard_pages_in_declared_order() {
        let provider = StaticPagesProvider::standard();
        let entries = provider.entries().await;
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/about", "/contact"]);
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[1].priority, 0.9);
    }

    #[test]
    fn rejects_non_relative_routes() {
        let result = StaticPagesProvider::from_routes(vec![RoutedEntry::new("about", 0.9)]);
        assert!(matches!(
            result,
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let result = StaticPagesProvider::from_routes(vec![RoutedEntry::new("/about", 1.5)]);
        assert!(matches!(
            result,
            Err(DomainError::Validation { .. })
        ));
    }
}
