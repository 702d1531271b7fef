//! Client-side view over the last accepted result: role filter and age sort.
//! Nothing here ever goes back to the gateway.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::contract::model::User;
use crate::domain::normalize::digits_only;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    AgeAsc,
    AgeDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::AgeAsc => "age_asc",
            SortOrder::AgeDesc => "age_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown sort order '{0}' (expected age_asc or age_desc)")]
pub struct ParseSortOrderError(String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "age_asc" => Ok(SortOrder::AgeAsc),
            "age_desc" => Ok(SortOrder::AgeDesc),
            _ => Err(ParseSortOrderError(s.to_string())),
        }
    }
}

/// Age used for ordering; a missing age counts as 0.
pub fn effective_age(user: &User) -> u32 {
    user.age.unwrap_or(0)
}

/// Distinct non-empty roles in first-seen order.
pub fn available_roles(users: &[User]) -> Vec<String> {
    let mut roles: Vec<String> = Vec::new();
    for role in users.iter().filter_map(|u| u.role.as_deref()) {
        if !role.is_empty() && !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }
    roles
}

/// Keep users whose role is selected; an empty selection keeps everyone.
pub fn filter_by_roles<'a>(users: &'a [User], selected: &[String]) -> Vec<&'a User> {
    if selected.is_empty() {
        return users.iter().collect();
    }
    users
        .iter()
        .filter(|u| {
            u.role
                .as_deref()
                .is_some_and(|role| selected.iter().any(|s| s == role))
        })
        .collect()
}

/// Stable sort by effective age.
pub fn sort_by_age(users: &mut [&User], order: SortOrder) {
    match order {
        SortOrder::AgeAsc => users.sort_by_key(|u| effective_age(u)),
        SortOrder::AgeDesc => users.sort_by(|a, b| effective_age(b).cmp(&effective_age(a))),
    }
}

/// Derived view state owned by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultView {
    sort: SortOrder,
    selected_roles: Vec<String>,
}

impl ResultView {
    pub fn new(sort: SortOrder) -> Self {
        Self {
            sort,
            selected_roles: Vec::new(),
        }
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn selected_roles(&self) -> &[String] {
        &self.selected_roles
    }

    pub fn select_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for role in roles {
            let role = role.into();
            if !self.selected_roles.contains(&role) {
                self.selected_roles.push(role);
            }
        }
    }

    /// Checkbox semantics: select if absent, unselect if present.
    pub fn toggle_role(&mut self, role: &str) {
        if let Some(pos) = self.selected_roles.iter().position(|r| r == role) {
            self.selected_roles.remove(pos);
        } else {
            self.selected_roles.push(role.to_string());
        }
    }

    pub fn clear_roles(&mut self) {
        self.selected_roles.clear();
    }

    /// Filter then sort `users`; recompute whenever users, sort or roles change.
    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        let mut list = filter_by_roles(users, &self.selected_roles);
        sort_by_age(&mut list, self.sort);
        list
    }
}

/// Display form of an SSN: only the last four digits stay visible.
pub fn mask_ssn(ssn: Option<&str>) -> String {
    let Some(ssn) = ssn.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let digits = digits_only(ssn);
    let last4 = &digits[digits.len().saturating_sub(4)..];
    format!("***-**-{last4}")
}
