//! Canned users for tests and the stub backend

use userdeck_model::chrono::{Duration, TimeZone, Utc};
use userdeck_model::prelude::{Group, Role, RoleID, User, UserID, UserStatus};

pub fn user(id: &str, name: &str, status: UserStatus) -> User {
    let slug = name.to_lowercase().replace(' ', ".");
    User {
        id: UserID::new(id),
        name: name.to_string(),
        email: format!("{slug}@example.com"),
        status,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
            + Duration::days(id.parse::<i64>().unwrap_or_default()),
        groups: Vec::new(),
    }
}

pub fn admins_and_users() -> Vec<Group> {
    let mut admins = Group::new("1", "Admins");
    admins.roles.push(Role {
        role_id: RoleID::new("r-owner"),
        role_name: "Owner".to_string(),
    });
    vec![admins, Group::new("2", "Users")]
}

/// Twelve users, alternating active and inactive after the first three.
pub fn sample_users() -> Vec<User> {
    let names = [
        "Alice Moreau",
        "Bob Stone",
        "Carla Diaz",
        "Dmitri Volkov",
        "Erin Walsh",
        "Bobby Fischer",
        "Grace Hopper",
        "Hiro Tanaka",
        "Ines Costa",
        "Jonas Berg",
        "Kemi Ade",
        "Liam Byrne",
    ];
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let status = if idx < 3 || idx % 2 == 0 {
                UserStatus::Active
            } else {
                UserStatus::Inactive
            };
            let mut u = user(&(idx + 1).to_string(), name, status);
            if idx == 0 {
                u.groups = admins_and_users();
            }
            u
        })
        .collect()
}
