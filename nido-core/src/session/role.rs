// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account roles and their landing destinations.

use serde::{Deserialize, Serialize};

/// Account role. The set is closed: the backend only issues these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Parent,
}

/// Navigation destinations the core can request from the hosting shell.
///
/// The router itself is an external collaborator; the core only names
/// where to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    AdminDashboard,
    TeacherDashboard,
    ParentDashboard,
}

impl Role {
    /// The landing destination after a successful login.
    ///
    /// Total mapping: adding a role means adding a row here, and the
    /// compiler points at every place that must learn about it.
    pub const fn landing(self) -> Destination {
        match self {
            Role::Admin => Destination::AdminDashboard,
            Role::Teacher => Destination::TeacherDashboard,
            Role::Parent => Destination::ParentDashboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_a_landing() {
        assert_eq!(Role::Admin.landing(), Destination::AdminDashboard);
        assert_eq!(Role::Teacher.landing(), Destination::TeacherDashboard);
        assert_eq!(Role::Parent.landing(), Destination::ParentDashboard);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Parent).unwrap(), "\"parent\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
