//! Route resolution against the configured public site URL.

use url::Url;

use crate::application::sources::{RouteError, RouteResolver};

/// Resolver rooted at the site's public base URL.
///
/// The base is normalized to a trailing slash at configuration time, so
/// joining keeps the full base path.
pub struct SiteRoutes {
    base: Url,
}

impl SiteRoutes {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl RouteResolver for SiteRoutes {
    fn base(&self) -> &Url {
        &self.base
    }

    fn resolve(&self, path: &str) -> Result<Url, RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::unresolvable(
                path,
                &self.base,
                "path is not site-relative",
            ));
        }
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| RouteError::unresolvable(path, &self.base, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(base: &str) -> SiteRoutes {
        SiteRoutes::new(Url::parse(base).expect("valid base url"))
    }

    #[test]
    fn joins_relative_paths_onto_the_base() {
        let resolver = routes("https://example.com/");
        let url = resolver.resolve("/about").expect("resolvable");
        assert_eq!(url.as_str(), "https://example.com/about");
    }

    #[test]
    fn keeps_a_base_path_prefix() {
        let resolver = routes("https://example.com/site/");
        let url = resolver.resolve("/contact").expect("resolvable");
        assert_eq!(url.as_str(), "https://example.com/site/contact");
    }

    #[test]
    fn root_path_resolves_to_the_base() {
        let resolver = routes("https://example.com/");
        let url = resolver.resolve("/").expect("resolvable");
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn rejects_paths_without_leading_slash() {
        let resolver = routes("https://example.com/");
        assert!(resolver.resolve("about").is_err());
    }
}
