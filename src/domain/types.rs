//! Enumerations shared across the domain.

use serde::{Deserialize, Serialize};

/// Expected change cadence of a sitemap location, per the sitemaps.org
/// protocol's `<changefreq>` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_frequency_wire_names() {
        assert_eq!(ChangeFrequency::Always.as_str(), "always");
        assert_eq!(ChangeFrequency::Never.as_str(), "never");
        let json = serde_json::to_string(&ChangeFrequency::Weekly).expect("serializable");
        assert_eq!(json, "\"weekly\"");
    }
}
