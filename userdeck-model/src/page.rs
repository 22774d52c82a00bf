use crate::ids::UserID;
use crate::user::{User, UserStatus};

/// One page of the user listing, the `data` payload of `GET /api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct UsersPage {
    pub users: Vec<User>,
    pub total_count: u64,
}

impl UsersPage {
    pub fn new(users: Vec<User>, total_count: u64) -> Self {
        Self { users, total_count }
    }

    /// Number of pages for `page_size`, never less than one.
    pub fn page_count(&self, page_size: u32) -> u32 {
        let page_size = u64::from(page_size.max(1));
        let pages = self.total_count.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn find(&self, id: &UserID) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    /// Rewrite the status of every row matching `id`. Returns whether any
    /// row changed.
    pub fn set_status(&mut self, id: &UserID, status: UserStatus) -> bool {
        let mut changed = false;
        for user in self.users.iter_mut().filter(|user| &user.id == id) {
            if user.status != status {
                user.status = status;
                changed = true;
            }
        }
        changed
    }
}

/// Envelope the users API wraps every payload in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApiResponse<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up_and_floors_at_one() {
        assert_eq!(UsersPage::new(Vec::new(), 0).page_count(10), 1);
        assert_eq!(UsersPage::new(Vec::new(), 10).page_count(10), 1);
        assert_eq!(UsersPage::new(Vec::new(), 11).page_count(10), 2);
        assert_eq!(UsersPage::new(Vec::new(), 5).page_count(0), 5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn envelope_decodes_list_payload() {
        let raw = r#"{"data":{"users":[],"totalCount":42}}"#;
        let response: ApiResponse<UsersPage> =
            serde_json::from_str(raw).unwrap();
        assert_eq!(response.data.total_count, 42);
    }
}
