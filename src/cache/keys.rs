//! Cache key constants.
//!
//! Each cached value lives under one fixed slot; keys are namespaced with a
//! `/` so related slots group together in diagnostics.

/// The serialized sitemap document set. Invalidated only by expiry, never
/// partially.
pub const SITEMAP_DOCUMENTS: &str = "sitemap/documents";
