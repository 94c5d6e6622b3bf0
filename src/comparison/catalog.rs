//! Metric catalog

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDef {
    /// Key used in `individual_scores`
    pub key: String,
    /// Display name
    pub name: String,
}

/// Ordered set of metrics considered when picking winners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCatalog {
    metrics: Vec<MetricDef>,
}

const DEFAULT_METRICS: [(&str, &str); 7] = [
    ("problem_clarity", "Problem clarity"),
    ("market_demand", "Market demand"),
    ("competitive_landscape", "Competitive landscape"),
    ("solution_fit", "Solution fit"),
    ("business_model", "Business model"),
    ("scalability", "Scalability"),
    ("execution_feasibility", "Execution feasibility"),
];

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            metrics: DEFAULT_METRICS
                .iter()
                .map(|(key, name)| MetricDef {
                    key: key.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

impl MetricCatalog {
    /// Catalog from `(key, name)` pairs; later duplicates of a key are ignored
    pub fn new<K, N>(metrics: impl IntoIterator<Item = (K, N)>) -> Self
    where
        K: Into<String>,
        N: Into<String>,
    {
        let mut defs: Vec<MetricDef> = Vec::new();
        for (key, name) in metrics {
            let key = key.into();
            if defs.iter().any(|d| d.key == key) {
                continue;
            }
            defs.push(MetricDef {
                key,
                name: name.into(),
            });
        }
        Self { metrics: defs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDef> {
        self.metrics.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.metrics.iter().any(|m| m.key == key)
    }

    /// Display name for `key`, falling back to the key itself
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.metrics
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.name.as_str())
            .unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = MetricCatalog::default();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.keys().next(), Some("problem_clarity"));
        assert!(catalog.contains("solution_fit"));
        assert_eq!(catalog.display_name("market_demand"), "Market demand");
        assert_eq!(catalog.display_name("unknown_metric"), "unknown_metric");
    }

    #[test]
    fn test_custom_catalog_dedupes_keys() {
        let catalog = MetricCatalog::new([("a", "A"), ("b", "B"), ("a", "A again")]);
        let keys: Vec<&str> = catalog.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(catalog.display_name("a"), "A");
    }
}
