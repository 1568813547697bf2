//! Queue address composition.

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;

/// Network address of a queue: `{endpoint_url}/{tenant_id}/{queue_name}`.
///
/// Components are joined verbatim. No trailing-slash trimming or percent
/// encoding is applied, so callers must pass well-formed parts.
///
/// # Examples
///
/// ```
/// use queue_adapter::address::queue_url;
///
/// assert_eq!(
///     queue_url("https://q.example.com", "tenant1", "orders"),
///     "https://q.example.com/tenant1/orders"
/// );
/// ```
pub fn queue_url(endpoint_url: &str, tenant_id: &str, queue_name: &str) -> String {
    format!("{}/{}/{}", endpoint_url, tenant_id, queue_name)
}
