//! In-memory profile directory.
//!
//! Stands in for the account store; deployments embedding a real identity
//! backend swap their own `ProfilesRepo` in at construction.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::sources::{ProfilesRepo, RepoError};
use crate::domain::entities::UserProfileRecord;

#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: RwLock<Vec<UserProfileRecord>>,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: UserProfileRecord) {
        let mut profiles = self.profiles.write().await;
        profiles.retain(|existing| existing.id != profile.id);
        profiles.push(profile);
    }
}

#[async_trait]
impl ProfilesRepo for InMemoryProfiles {
    async fn list_public_profiles(&self) -> Result<Vec<UserProfileRecord>, RepoError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .iter()
            .filter(|profile| profile.public_profile)
            .cloned()
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<UserProfileRecord>, RepoError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|profile| profile.slug == slug).cloned())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    fn profile(slug: &str, public: bool) -> UserProfileRecord {
        UserProfileRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            email: format!("{slug}@example.com"),
            email_confirmed: true,
            display_name: slug.to_string(),
            phone_number: None,
            has_password: true,
            two_factor_enabled: false,
            authenticator_enrolled: false,
            recovery_codes_left: 0,
            public_profile: public,
            logins: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn lists_only_public_profiles() {
        let directory = InMemoryProfiles::new();
        directory.insert(profile("open", true)).await;
        directory.insert(profile("hidden", false)).await;

        let public = directory.list_public_profiles().await.expect("listing");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].slug, "open");
    }

    #[tokio::test]
    async fn insert_replaces_by_id() {
        let directory = InMemoryProfiles::new();
        let mut record = profile("mara", true);
        directory.insert(record.clone()).await;
        record.display_name = "Mara Q".to_string();
        directory.insert(record).await;

        let found = directory
            .find_by_slug("mara")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.display_name, "Mara Q");
    }
}
