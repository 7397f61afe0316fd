use kube::core::ApiResource;

/// REST path of a resource collection: `/api/v1/namespaces/ns/pods`,
/// `/apis/batch/v1/namespaces/ns/jobs`, `/api/v1/nodes`. `namespace` is
/// `None` for cluster-scoped resources and all-namespaces queries.
pub fn collection_path(resource: &ApiResource, namespace: Option<&str>) -> String {
    let mut path = if resource.group.is_empty() {
        format!("/api/{}", resource.version)
    } else {
        format!("/apis/{}/{}", resource.group, resource.version)
    };
    if let Some(namespace) = namespace {
        path.push_str("/namespaces/");
        path.push_str(namespace);
    }
    path.push('/');
    path.push_str(&resource.plural);
    path
}

/// Minimal percent-encoding for query values. Selectors keep their `=`,
/// `,`, `!` and parentheses; only the characters that would break the query
/// string are escaped.
pub fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b' ' => encoded.push_str("%20"),
            b'%' => encoded.push_str("%25"),
            b'&' => encoded.push_str("%26"),
            b'+' => encoded.push_str("%2B"),
            b'#' => encoded.push_str("%23"),
            b'?' => encoded.push_str("%3F"),
            other => encoded.push(other as char),
        }
    }
    encoded
}
