//! Sitemap service for sitemap.xml and robots.txt generation.
//!
//! Builds the full document set in one pass, caches the serialized result
//! under a fixed key with a sliding expiration, and answers per-document
//! lookups out of that set.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::cache::{SlidingStore, keys};
use crate::domain::entities::SitemapEntry;

use super::sources::{EntryProvider, RouteResolver};

/// Per-document entry cap from the sitemaps.org protocol.
pub const MAX_ENTRIES_PER_DOCUMENT: usize = 25_000;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const URLSET_OPEN: &str = "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n";
const SITEMAPINDEX_OPEN: &str =
    "<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n";

/// Service assembling sitemap documents from injected entry providers.
#[derive(Clone)]
pub struct SitemapService {
    routes: Arc<dyn RouteResolver>,
    providers: Vec<Arc<dyn EntryProvider>>,
    cache: Option<Arc<SlidingStore>>,
}

impl SitemapService {
    pub fn new(
        routes: Arc<dyn RouteResolver>,
        providers: Vec<Arc<dyn EntryProvider>>,
        cache: Option<Arc<SlidingStore>>,
    ) -> Self {
        Self {
            routes,
            providers,
            cache,
        }
    }

    /// Return the document at `index`, or the root document when `index`
    /// is absent: the index file if several documents exist, otherwise the
    /// single sitemap. `None` means the index is out of range; the HTTP
    /// layer maps that to a 404.
    pub async fn document(&self, index: Option<usize>) -> Option<String> {
        let documents = self.documents().await;
        documents.get(index.unwrap_or(0)).cloned()
    }

    /// Number of documents the current configuration yields.
    pub async fn document_count(&self) -> usize {
        self.documents().await.len()
    }

    /// The whole serialized document set, cache-aside.
    ///
    /// Population is not mutually exclusive: concurrent misses each
    /// regenerate and the last write wins. Regeneration is deterministic,
    /// so the only cost is redundant work.
    async fn documents(&self) -> Vec<String> {
        if let Some(cache) = &self.cache
            && let Some(documents) = cache.try_get::<Vec<String>>(keys::SITEMAP_DOCUMENTS)
        {
            return documents;
        }

        let started = Instant::now();
        let documents = self.assemble().await;
        histogram!("brezza_sitemap_assemble_ms").record(started.elapsed().as_millis() as f64);
        debug!(
            documents = documents.len(),
            "Assembled sitemap document set"
        );

        if let Some(cache) = &self.cache {
            cache.set(keys::SITEMAP_DOCUMENTS, &documents);
        }
        documents
    }

    async fn assemble(&self) -> Vec<String> {
        let entries = self.collect_entries().await;
        let chunks: Vec<&[SitemapEntry]> = entries.chunks(MAX_ENTRIES_PER_DOCUMENT).collect();

        if chunks.len() <= 1 {
            let only = chunks.first().copied().unwrap_or(&[]);
            return vec![render_urlset(only)];
        }

        let mut documents = Vec::with_capacity(chunks.len() + 1);
        documents.push(render_index(self.routes.base(), chunks.len()));
        documents.extend(chunks.into_iter().map(render_urlset));
        documents
    }

    /// Collect entries from every provider, resolving each route to an
    /// absolute URL. An entry whose route does not resolve is logged and
    /// skipped; collection itself never fails.
    pub async fn collect_entries(&self) -> Vec<SitemapEntry> {
        let mut entries = Vec::new();
        for provider in &self.providers {
            for routed in provider.entries().await {
                match self.routes.resolve(&routed.path) {
                    Ok(loc) => entries.push(
                        SitemapEntry::new(loc, routed.priority)
                            .with_lastmod(routed.lastmod)
                            .with_changefreq(routed.changefreq),
                    ),
                    Err(err) => {
                        warn!(path = %routed.path, error = %err, "Skipping sitemap entry with unresolvable route");
                    }
                }
            }
        }
        entries
    }

    /// Generate robots.txt content pointing crawlers at the sitemap.
    pub fn robots_txt(&self) -> String {
        let base = self.routes.base();
        format!("User-agent: *\nAllow: /\nSitemap: {base}sitemap.xml\n")
    }
}

fn render_urlset(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(URLSET_OPEN);
    for entry in entries {
        xml.push_str("  <url><loc>");
        xml.push_str(&xml_escape(entry.loc().as_str()));
        xml.push_str("</loc>");
        if let Some(lastmod) = entry.lastmod()
            && let Ok(stamp) = lastmod.format(&Rfc3339)
        {
            xml.push_str("<lastmod>");
            xml.push_str(&stamp);
            xml.push_str("</lastmod>");
        }
        if let Some(changefreq) = entry.changefreq() {
            xml.push_str("<changefreq>");
            xml.push_str(changefreq.as_str());
            xml.push_str("</changefreq>");
        }
        xml.push_str(&format!("<priority>{:.1}</priority>", entry.priority()));
        xml.push_str("</url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn render_index(base: &url::Url, chunk_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(SITEMAPINDEX_OPEN);
    for number in 1..=chunk_count {
        xml.push_str("  <sitemap><loc>");
        xml.push_str(&xml_escape(&format!("{base}sitemap.xml?index={number}")));
        xml.push_str("</loc></sitemap>\n");
    }
    xml.push_str("</sitemapindex>\n");
    xml
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use url::Url;

    use crate::application::sources::{EntryProvider, RouteError, RouteResolver};
    use crate::domain::entities::RoutedEntry;
    use crate::domain::types::ChangeFrequency;

    use super::*;

    struct FixedResolver {
        base: Url,
    }

    impl FixedResolver {
        fn new() -> Self {
            Self {
                base: Url::parse("https://example.com/").expect("valid base"),
            }
        }
    }

    impl RouteResolver for FixedResolver {
        fn base(&self) -> &Url {
            &self.base
        }

        fn resolve(&self, path: &str) -> Result<Url, RouteError> {
            if !path.starts_with('/') {
                return Err(RouteError::unresolvable(path, &self.base, "not site-relative"));
            }
            self.base
                .join(path)
                .map_err(|err| RouteError::unresolvable(path, &self.base, err.to_string()))
        }
    }

    struct ListProvider {
        routes: Vec<RoutedEntry>,
    }

    #[async_trait]
    impl EntryProvider for ListProvider {
        async fn entries(&self) -> Vec<RoutedEntry> {
            self.routes.clone()
        }
    }

    fn service_with(routes: Vec<RoutedEntry>) -> SitemapService {
        SitemapService::new(
            Arc::new(FixedResolver::new()),
            vec![Arc::new(ListProvider { routes })],
            None,
        )
    }

    #[tokio::test]
    async fn unresolvable_entry_is_skipped_not_fatal() {
        let service = service_with(vec![
            RoutedEntry::new("/", 1.0),
            RoutedEntry::new("no-leading-slash", 0.9),
            RoutedEntry::new("/contact", 0.9),
        ]);

        let entries = service.collect_entries().await;
        let locs: Vec<&str> = entries.iter().map(|e| e.loc().as_str()).collect();
        assert_eq!(locs, vec!["https://example.com/", "https://example.com/contact"]);
    }

    #[tokio::test]
    async fn urlset_carries_optional_elements() {
        let lastmod = time::macros::datetime!(2025-05-04 12:00:00 UTC);
        let service = service_with(vec![
            RoutedEntry::new("/about", 0.9)
                .with_lastmod(Some(lastmod))
                .with_changefreq(Some(ChangeFrequency::Monthly)),
        ]);

        let document = service.document(None).await.expect("root document");
        assert!(document.contains("<loc>https://example.com/about</loc>"));
        assert!(document.contains("<lastmod>2025-05-04T12:00:00Z</lastmod>"));
        assert!(document.contains("<changefreq>monthly</changefreq>"));
        assert!(document.contains("<priority>0.9</priority>"));
    }

    #[tokio::test]
    async fn empty_configuration_yields_one_empty_urlset() {
        let service = service_with(Vec::new());
        assert_eq!(service.document_count().await, 1);
        let document = service.document(None).await.expect("root document");
        assert!(document.contains("<urlset"));
        assert!(!document.contains("<url>"));
    }

    #[test]
    fn index_document_links_sub_documents_by_query() {
        let base = Url::parse("https://example.com/").expect("valid base");
        let document = render_index(&base, 3);
        assert_eq!(document.matches("<sitemap>").count(), 3);
        assert!(document.contains("<loc>https://example.com/sitemap.xml?index=1</loc>"));
        assert!(document.contains("<loc>https://example.com/sitemap.xml?index=3</loc>"));
    }

    #[test]
    fn escapes_reserved_characters_in_locations() {
        assert_eq!(
            xml_escape("https://example.com/?a=1&b=2"),
            "https://example.com/?a=1&amp;b=2"
        );
    }

    #[tokio::test]
    async fn robots_txt_points_at_the_sitemap() {
        let service = service_with(Vec::new());
        let body = service.robots_txt();
        assert!(body.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
