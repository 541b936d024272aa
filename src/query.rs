//! Query-string override parsing
//!
//! A browser URL such as `?force=12&variant=1` (or `#/route?force=12&variant=1`)
//! forces the experiment whose testing ID is `12` to variant `1`.
//!
//! ## Loose comparison
//!
//! `force` is compared to the testing ID numerically, not textually:
//! surrounding whitespace is ignored, an empty value counts as `0`, and
//! `"12.0"` or `"1.2e1"` match `12`. This keeps existing forcing links working.
//! It also means `?force=&variant=1` forces an experiment whose testing ID is `0`.

use std::collections::BTreeMap;

use crate::context::Location;

/// Query parameter key matched against an experiment's testing ID.
pub const FORCE_KEY: &str = "force";
/// Query parameter key holding the forced variant index.
pub const VARIANT_KEY: &str = "variant";

/// Parsed query string: key to comma-split values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parse a raw query string, with or without the leading `?`.
    ///
    /// Segments are split on `&`, then on `=`; only the text between the first
    /// and second `=` is kept as the value. A key without `=` maps to no values.
    /// Later duplicates replace earlier ones.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = BTreeMap::new();

        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let mut parts = segment.split('=');
            let key = parts.next().unwrap_or_default();
            let values = parts
                .next()
                .map(|value| value.split(',').map(str::to_string).collect())
                .unwrap_or_default();
            params.insert(key.to_string(), values);
        }

        Self { params }
    }

    /// Parse the query of a browser location.
    ///
    /// Uses `search` first; when it is empty, falls back to the `?...` segment
    /// embedded in the hash (hash-based routers).
    #[must_use]
    pub fn from_location(location: &Location) -> Self {
        let search = location.search().strip_prefix('?').unwrap_or(location.search());
        if !search.is_empty() {
            return Self::parse(search);
        }

        location
            .hash()
            .split('?')
            .nth(1)
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// All values for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// First value for a key.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(<[String]>::first).map(String::as_str)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if no keys were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Variant forced for `testing_id`, if `force` and `variant` are both present
    /// and `force` loosely equals `testing_id`.
    #[must_use]
    pub fn forced_variant(&self, testing_id: i64) -> Option<usize> {
        let force = self.first(FORCE_KEY)?;
        let variant = self.first(VARIANT_KEY)?;

        loose_eq(force, testing_id).then(|| to_variant_index(variant))
    }
}

/// Numeric value of a query value, following the loose rules above.
#[must_use]
pub fn loose_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Loose numeric equality between a query value and a testing ID.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn loose_eq(raw: &str, testing_id: i64) -> bool {
    loose_number(raw).is_some_and(|n| n == testing_id as f64)
}

/// Convert a query value to a variant index.
///
/// Anything that is not a non-negative whole number maps to `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn to_variant_index(raw: &str) -> usize {
    match loose_number(raw) {
        Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 => {
            n as usize
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_split() {
        let params = QueryParams::parse("?a=1,2,3&b=x");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a").unwrap(), ["1", "2", "3"]);
        assert_eq!(params.first("b"), Some("x"));
    }

    #[test]
    fn test_parse_key_without_value() {
        let params = QueryParams::parse("flag&force=3");
        assert_eq!(params.get("flag").unwrap().len(), 0);
        assert_eq!(params.first("flag"), None);
        assert_eq!(params.first("force"), Some("3"));
    }

    #[test]
    fn test_parse_keeps_text_between_first_and_second_equals() {
        let params = QueryParams::parse("a=1=2");
        assert_eq!(params.first("a"), Some("1"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
        assert!(QueryParams::parse("&&").is_empty());
    }

    #[test]
    fn test_from_location_prefers_search() {
        let loc = Location::new("?force=1", "#/x?force=2");
        assert_eq!(QueryParams::from_location(&loc).first("force"), Some("1"));
    }

    #[test]
    fn test_from_location_hash_fallback() {
        let loc = Location::new("", "#/x?force=2&variant=1");
        let params = QueryParams::from_location(&loc);
        assert_eq!(params.first("force"), Some("2"));
        assert_eq!(params.first("variant"), Some("1"));
    }

    #[test]
    fn test_from_location_hash_without_query() {
        let loc = Location::new("", "#/x");
        assert!(QueryParams::from_location(&loc).is_empty());
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq("12", 12));
        assert!(loose_eq(" 12 ", 12));
        assert!(loose_eq("12.0", 12));
        assert!(loose_eq("", 0));
        assert!(!loose_eq("12a", 12));
        assert!(!loose_eq("NaN", 0));
        assert!(!loose_eq("13", 12));
    }

    #[test]
    fn test_to_variant_index() {
        assert_eq!(to_variant_index("1"), 1);
        assert_eq!(to_variant_index("3.0"), 3);
        assert_eq!(to_variant_index("1.5"), 0);
        assert_eq!(to_variant_index("-1"), 0);
        assert_eq!(to_variant_index("abc"), 0);
        assert_eq!(to_variant_index("inf"), 0);
    }

    #[test]
    fn test_forced_variant() {
        let params = QueryParams::parse("force=5&variant=2");
        assert_eq!(params.forced_variant(5), Some(2));
        assert_eq!(params.forced_variant(6), None);

        let missing_variant = QueryParams::parse("force=5");
        assert_eq!(missing_variant.forced_variant(5), None);
    }
}
