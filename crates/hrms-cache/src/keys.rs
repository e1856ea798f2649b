//! Cache key builders for resource queries.
//!
//! Centralising key construction keeps the serialized form of query
//! parameters identical for every hook.

use std::collections::BTreeMap;

/// Query parameters of a resource read. Ordered so that the same set of
/// parameters always yields the same key.
pub type QueryParams = BTreeMap<String, String>;

/// Cache key for a resource query.
///
/// `("employees", {page: 2, dept: 7})` becomes `"employees?dept=7&page=2"`;
/// an empty parameter set yields the bare resource name.
pub fn query_key(resource: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return resource.to_string();
    }
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{resource}?{}", query.join("&"))
}

/// Key under which a query is stored for a given invalidation generation.
pub(crate) fn generation_key(generation: u64, key: &str) -> String {
    format!("g{generation}:{key}")
}
