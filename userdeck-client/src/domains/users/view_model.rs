//! Framework-free view model for the users grid

use std::cmp::Ordering;
use std::fmt;

use userdeck_model::prelude::{
    Density, GroupID, SortSpec, StatusFilter, User, UserID, UserStatus,
    UsersPage, ViewPreferences,
};

use crate::domains::users::LoadState;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
}

pub const COLUMNS: [Column; 6] = [
    Column {
        field: "name",
        header: "Name",
    },
    Column {
        field: "email",
        header: "Email",
    },
    Column {
        field: "status",
        header: "Status",
    },
    Column {
        field: "createdAt",
        header: "Created",
    },
    Column {
        field: "groups",
        header: "Groups",
    },
    Column {
        field: "actions",
        header: "Active",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChip {
    pub id: GroupID,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserID,
    pub name: String,
    pub email: String,
    pub status_label: &'static str,
    pub created: String,
    pub groups: Vec<GroupChip>,
    /// State of the row's toggle
    pub active: bool,
    /// A status update for this row is awaiting the server
    pub pending: bool,
}

impl UserRow {
    pub fn from_user(user: &User, pending: bool) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            status_label: status_label(user.status),
            created: user.created_at.format(DATE_FORMAT).to_string(),
            groups: user
                .groups
                .iter()
                .map(|group| GroupChip {
                    id: group.group_id.clone(),
                    label: group.group_name.clone(),
                })
                .collect(),
            active: user.is_active(),
            pending,
        }
    }

    fn cell(&self, field: &str) -> String {
        match field {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "status" => self.status_label.to_string(),
            "createdAt" => self.created.clone(),
            "groups" => self
                .groups
                .iter()
                .map(|chip| chip.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            "actions" => {
                let toggle = if self.active { "[on]" } else { "[off]" };
                if self.pending {
                    format!("{toggle}…")
                } else {
                    toggle.to_string()
                }
            }
            _ => String::new(),
        }
    }
}

pub fn status_label(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "Active",
        UserStatus::Inactive => "Inactive",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total_count: u64,
}

impl PaginationSummary {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// Unreachable backend; offers a retry
    Offline { message: String },
    /// Inline alert with the raw server message and a retry
    Error { message: String },
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Offline { message } | Banner::Error { message } => message,
        }
    }
}

pub const OFFLINE_MESSAGE: &str =
    "You are offline. Data may be out of date until the connection returns.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub load_state: LoadState,
    pub columns: Vec<Column>,
    pub rows: Vec<UserRow>,
    pub density: Density,
    pub sorting: Vec<SortSpec>,
    pub pagination: PaginationSummary,
    pub banner: Option<Banner>,
    pub notifications: Vec<Notification>,
}

/// Inputs [`build`] renders from.
pub struct ViewInputs<'a> {
    pub search_text: &'a str,
    pub status_filter: StatusFilter,
    pub page: u32,
    pub page_size: u32,
    pub data: Option<&'a UsersPage>,
    pub load_state: &'a LoadState,
    pub preferences: &'a ViewPreferences,
    pub pending: &'a dyn Fn(&UserID) -> bool,
    pub notifications: &'a [Notification],
}

pub fn build(inputs: ViewInputs<'_>) -> DashboardView {
    let prefs = inputs.preferences;
    let mut users: Vec<&User> = inputs
        .data
        .map(|page| page.users.iter().collect())
        .unwrap_or_default();
    sort_users(&mut users, &prefs.sorting);

    let total_count = inputs.data.map(|page| page.total_count).unwrap_or(0);
    let page_count = inputs
        .data
        .map(|page| page.page_count(inputs.page_size))
        .unwrap_or(1);

    let banner = match inputs.load_state {
        LoadState::Offline => Some(Banner::Offline {
            message: OFFLINE_MESSAGE.to_string(),
        }),
        LoadState::Error(message) => Some(Banner::Error {
            message: message.clone(),
        }),
        _ => None,
    };

    DashboardView {
        search_text: inputs.search_text.to_string(),
        status_filter: inputs.status_filter,
        load_state: inputs.load_state.clone(),
        columns: COLUMNS
            .iter()
            .copied()
            .filter(|column| prefs.is_column_visible(column.field))
            .collect(),
        rows: users
            .into_iter()
            .map(|user| UserRow::from_user(user, (inputs.pending)(&user.id)))
            .collect(),
        density: prefs.density,
        sorting: prefs.sorting.clone(),
        pagination: PaginationSummary {
            page: inputs.page,
            page_size: inputs.page_size,
            page_count,
            total_count,
        },
        banner,
        notifications: inputs.notifications.to_vec(),
    }
}

/// Stable multi-key sort of the current page. Unknown fields are ignored.
pub fn sort_users(users: &mut [&User], sorting: &[SortSpec]) {
    if sorting.is_empty() {
        return;
    }
    users.sort_by(|a, b| {
        sorting
            .iter()
            .map(|spec| {
                let ordering = compare_field(a, b, &spec.field);
                if spec.desc {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn compare_field(a: &User, b: &User, field: &str) -> Ordering {
    match field {
        "name" => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        "email" => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        "status" => a.status.as_str().cmp(b.status.as_str()),
        "createdAt" => a.created_at.cmp(&b.created_at),
        _ => Ordering::Equal,
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "! {}", banner.message())?;
        }

        let mut widths: Vec<usize> =
            self.columns.iter().map(|c| c.header.chars().count()).collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| self.columns.iter().map(|c| row.cell(c.field)).collect())
            .collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &widths, self.columns.iter().map(|c| c.header))?;
        for row in &cells {
            write_line(f, &widths, row.iter().map(String::as_str))?;
        }
        if self.rows.is_empty() {
            writeln!(f, "(no users)")?;
        }

        write!(
            f,
            "Page {} of {} ({} users, {} per page)",
            self.pagination.page,
            self.pagination.page_count,
            self.pagination.total_count,
            self.pagination.page_size
        )?;
        for notification in &self.notifications {
            write!(f, "\n* {}", notification.message)?;
        }
        Ok(())
    }
}

fn write_line<'a>(
    f: &mut fmt::Formatter<'_>,
    widths: &[usize],
    values: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    let padded: Vec<String> = values
        .zip(widths)
        .map(|(value, width)| format!("{value:<width$}"))
        .collect();
    writeln!(f, "{}", padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::fixtures;

    fn render(
        data: &UsersPage,
        prefs: &ViewPreferences,
        load_state: &LoadState,
    ) -> DashboardView {
        build(ViewInputs {
            search_text: "",
            status_filter: StatusFilter::All,
            page: 1,
            page_size: 10,
            data: Some(data),
            load_state,
            preferences: prefs,
            pending: &|_| false,
            notifications: &[],
        })
    }

    #[test]
    fn group_chips_are_labelled_with_the_group_name() {
        let mut alice =
            fixtures::user("1", "Alice Moreau", UserStatus::Active);
        alice.groups = fixtures::admins_and_users();
        let page = UsersPage::new(vec![alice], 1);

        let view =
            render(&page, &ViewPreferences::default(), &LoadState::Idle);
        let labels: Vec<&str> = view.rows[0]
            .groups
            .iter()
            .map(|chip| chip.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Admins", "Users"]);
    }

    #[test]
    fn hidden_columns_are_dropped() {
        let page = UsersPage::new(fixtures::sample_users(), 12);
        let mut prefs = ViewPreferences::default();
        prefs.set_column_visible("email", false);
        prefs.set_column_visible("groups", false);

        let view = render(&page, &prefs, &LoadState::Idle);
        let fields: Vec<&str> = view.columns.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["name", "status", "createdAt", "actions"]);
    }

    #[test]
    fn sort_spec_orders_the_current_page() {
        let page = UsersPage::new(fixtures::sample_users(), 12);
        let prefs = ViewPreferences {
            sorting: vec![SortSpec::asc("status"), SortSpec::desc("name")],
            ..ViewPreferences::default()
        };

        let view = render(&page, &prefs, &LoadState::Idle);
        assert_eq!(view.rows[0].name, "Kemi Ade");
        assert!(view.rows[..7].iter().all(|row| row.active));
        assert_eq!(view.rows[7].name, "Liam Byrne");
    }

    #[test]
    fn error_state_shows_the_raw_message() {
        let page = UsersPage::default();
        let view = render(
            &page,
            &ViewPreferences::default(),
            &LoadState::Error("database is down".into()),
        );
        assert_eq!(
            view.banner,
            Some(Banner::Error {
                message: "database is down".into()
            })
        );
        assert_eq!(view.pagination.page_count, 1);
        assert!(!view.pagination.has_next());
    }

    #[test]
    fn text_rendering_lists_rows_and_summary() {
        let page = UsersPage::new(
            vec![fixtures::user("2", "Bob Stone", UserStatus::Inactive)],
            21,
        );
        let text = render(&page, &ViewPreferences::default(), &LoadState::Idle)
            .to_string();
        assert!(text.contains("Bob Stone"));
        assert!(text.contains("bob.stone@example.com"));
        assert!(text.contains("2024-01-03 09:00"));
        assert!(text.ends_with("Page 1 of 3 (21 users, 10 per page)"));
    }
}
