//! API route constants for the users backend

/// User directory endpoints
pub mod users {
    /// Paged listing, takes `page`, `pageSize`, `query` and `status`
    pub const COLLECTION: &str = "/api/users";
    /// Single user, `PATCH` updates the status
    pub const ITEM: &str = "/api/users/{id}";
}

pub mod utils {
    /// Replace a single path parameter with its percent-encoded value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, &urlencoding::encode(value.as_ref()))
    }
}
