//! Brezza: sitemap assembly with sliding-expiration caching, plus the
//! profile and account-management scaffolding of a server-rendered site.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
