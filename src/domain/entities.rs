//! Domain records and sitemap value types.

use serde::Serialize;
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::domain::types::ChangeFrequency;

/// A sitemap entry with a fully resolved absolute location.
///
/// Immutable once constructed; the priority is clamped into the protocol
/// range `[0.0, 1.0]` at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    loc: Url,
    priority: f32,
    lastmod: Option<OffsetDateTime>,
    changefreq: Option<ChangeFrequency>,
}

impl SitemapEntry {
    pub fn new(loc: Url, priority: f32) -> Self {
        Self {
            loc,
            priority: priority.clamp(0.0, 1.0),
            lastmod: None,
            changefreq: None,
        }
    }

    pub fn with_lastmod(mut self, lastmod: Option<OffsetDateTime>) -> Self {
        self.lastmod = lastmod;
        self
    }

    pub fn with_changefreq(mut self, changefreq: Option<ChangeFrequency>) -> Self {
        self.changefreq = changefreq;
        self
    }

    pub fn loc(&self) -> &Url {
        &self.loc
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub fn lastmod(&self) -> Option<OffsetDateTime> {
        self.lastmod
    }

    pub fn changefreq(&self) -> Option<ChangeFrequency> {
        self.changefreq
    }
}

/// A sitemap entry before route resolution: a site-relative path plus the
/// metadata that survives into the rendered `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEntry {
    pub path: String,
    pub priority: f32,
    pub lastmod: Option<OffsetDateTime>,
    pub changefreq: Option<ChangeFrequency>,
}

impl RoutedEntry {
    pub fn new(path: impl Into<String>, priority: f32) -> Self {
        Self {
            path: path.into(),
            priority,
            lastmod: None,
            changefreq: None,
        }
    }

    pub fn with_lastmod(mut self, lastmod: Option<OffsetDateTime>) -> Self {
        self.lastmod = lastmod;
        self
    }

    pub fn with_changefreq(mut self, changefreq: Option<ChangeFrequency>) -> Self {
        self.changefreq = changefreq;
        self
    }
}

/// An account's link to an external login provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalLoginRecord {
    pub provider: String,
    pub provider_key: String,
    pub display_name: String,
}

/// User profile as mirrored from the account store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfileRecord {
    pub id: Uuid,
    pub slug: String,
    pub email: String,
    pub email_confirmed: bool,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub has_password: bool,
    pub two_factor_enabled: bool,
    pub authenticator_enrolled: bool,
    pub recovery_codes_left: u32,
    pub public_profile: bool,
    pub logins: Vec<ExternalLoginRecord>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_clamped_to_protocol_range() {
        let loc = Url::parse("https://example.com/about").expect("valid url");
        assert_eq!(SitemapEntry::new(loc.clone(), 1.7).priority(), 1.0);
        assert_eq!(SitemapEntry::new(loc.clone(), -0.3).priority(), 0.0);
        assert_eq!(SitemapEntry::new(loc, 0.9).priority(), 0.9);
    }

    #[test]
    fn routed_entry_keeps_metadata() {
        let entry = RoutedEntry::new("/about", 0.9)
            .with_changefreq(Some(crate::domain::types::ChangeFrequency::Monthly));
        assert_eq!(entry.path, "/about");
        assert_eq!(
            entry.changefreq,
            Some(crate::domain::types::ChangeFrequency::Monthly)
        );
        assert!(entry.lastmod.is_none());
    }
}
