//! Incremental-processing planner.
//!
//! Pure set difference over normalized ids: no I/O, O(|bronze| + |silver|).

use std::collections::HashSet;

/// Normalize an object key to an article id by dropping any path prefix
/// and the `.json` extension.
pub fn article_id(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.strip_suffix(".json").unwrap_or(name)
}

/// Bronze keys whose article has no silver counterpart yet.
///
/// Result order follows the bronze listing and carries no meaning.
pub fn unprocessed(bronze_keys: &[String], silver_keys: &[String]) -> Vec<String> {
    let silver_ids: HashSet<&str> = silver_keys.iter().map(|k| article_id(k)).collect();

    bronze_keys
        .iter()
        .filter(|key| !silver_ids.contains(article_id(key)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn returns_bronze_keys_missing_from_silver() {
        let bronze = keys(&["1.json", "2.json", "3.json"]);
        let silver = keys(&["2.json"]);

        let mut pending = unprocessed(&bronze, &silver);
        pending.sort();
        assert_eq!(pending, keys(&["1.json", "3.json"]));
    }

    #[test]
    fn path_prefixes_are_ignored_when_matching() {
        let bronze = keys(&["raw/2024/1.json", "raw/2024/2.json"]);
        let silver = keys(&["1.json"]);

        assert_eq!(unprocessed(&bronze, &silver), keys(&["raw/2024/2.json"]));
    }

    #[test]
    fn everything_pending_when_silver_is_empty() {
        let bronze = keys(&["a.json", "b.json"]);
        assert_eq!(unprocessed(&bronze, &[]).len(), 2);
    }

    #[test]
    fn nothing_pending_when_fully_processed() {
        let bronze = keys(&["a.json", "b.json"]);
        let silver = keys(&["b.json", "a.json"]);
        assert!(unprocessed(&bronze, &silver).is_empty());
    }

    #[test]
    fn article_id_strips_prefix_and_extension() {
        assert_eq!(article_id("2401.01234.json"), "2401.01234");
        assert_eq!(article_id("bronze/2401.01234.json"), "2401.01234");
        assert_eq!(article_id("no-extension"), "no-extension");
    }
}
