// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Allow-list registry gating which identities the pipeline answers.

use std::collections::HashSet;

use mynah_config::model::AllowlistConfig;
use mynah_core::SenderId;
use tracing::info;

/// Set-membership registry of approved senders.
///
/// Individuals and groups are tracked in separate sets since their identity
/// namespaces never collide. Entries never expire and are never removed;
/// the registry grows monotonically for the life of the process.
pub struct AllowList {
    users: HashSet<String>,
    groups: HashSet<String>,
    auto_approve_individuals: bool,
    auto_approve_groups: bool,
}

impl AllowList {
    /// Creates a registry seeded with the pre-approved identities from config.
    pub fn from_config(config: &AllowlistConfig) -> Self {
        Self {
            users: config.pre_approved_users.iter().cloned().collect(),
            groups: config.pre_approved_groups.iter().cloned().collect(),
            auto_approve_individuals: config.auto_approve_individuals,
            auto_approve_groups: config.auto_approve_groups,
        }
    }

    /// Pure membership lookup, no side effects.
    pub fn is_allowed(&self, identity: &SenderId) -> bool {
        if identity.is_group() {
            self.groups.contains(identity.as_str())
        } else {
            self.users.contains(identity.as_str())
        }
    }

    /// Idempotent insert. Logs the identity only the first time it is seen.
    pub fn approve(&mut self, identity: &SenderId) {
        let inserted = if identity.is_group() {
            self.groups.insert(identity.as_str().to_string())
        } else {
            self.users.insert(identity.as_str().to_string())
        };
        if inserted {
            info!(
                identity = %identity,
                is_group = identity.is_group(),
                "approved sender"
            );
        }
    }

    /// Approves an unknown identity when auto-approval is enabled for its
    /// kind, and reports whether this was a first-time approval.
    ///
    /// The report drives the one-time welcome message, so it must read true
    /// at most once per identity.
    pub fn auto_approve(&mut self, identity: &SenderId) -> bool {
        if self.is_allowed(identity) {
            return false;
        }
        let enabled = if identity.is_group() {
            self.auto_approve_groups
        } else {
            self.auto_approve_individuals
        };
        if !enabled {
            return false;
        }
        self.approve(identity);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_config() -> AllowlistConfig {
        AllowlistConfig::default()
    }

    #[test]
    fn auto_approve_reports_new_only_once() {
        let mut list = AllowList::from_config(&open_config());
        let id = SenderId::from("94771234567@c.us");

        assert!(list.auto_approve(&id));
        assert!(list.is_allowed(&id));
        assert!(!list.auto_approve(&id));
        assert!(list.is_allowed(&id));
    }

    #[test]
    fn approve_is_idempotent() {
        let mut list = AllowList::from_config(&open_config());
        let id = SenderId::from("94771234567@c.us");

        list.approve(&id);
        list.approve(&id);
        assert!(list.is_allowed(&id));
    }

    #[test]
    fn pre_approved_identities_are_not_new() {
        let config = AllowlistConfig {
            pre_approved_users: vec!["94771234567".into()],
            pre_approved_groups: vec!["120363040000000001@g.us".into()],
            ..AllowlistConfig::default()
        };
        let mut list = AllowList::from_config(&config);

        assert!(!list.auto_approve(&SenderId::from("94771234567")));
        assert!(!list.auto_approve(&SenderId::from("120363040000000001@g.us")));
    }

    #[test]
    fn disabled_auto_approval_keeps_unknown_senders_blocked() {
        let config = AllowlistConfig {
            auto_approve_individuals: false,
            auto_approve_groups: false,
            ..AllowlistConfig::default()
        };
        let mut list = AllowList::from_config(&config);

        assert!(!list.auto_approve(&SenderId::from("94770000000@c.us")));
        assert!(!list.is_allowed(&SenderId::from("94770000000@c.us")));
        assert!(!list.auto_approve(&SenderId::from("120363049999999999@g.us")));
        assert!(!list.is_allowed(&SenderId::from("120363049999999999@g.us")));
    }

    #[test]
    fn user_and_group_namespaces_are_disjoint() {
        let mut list = AllowList::from_config(&open_config());
        list.approve(&SenderId::from("94771234567@c.us"));

        assert!(!list.is_allowed(&SenderId::from("94771234567@g.us")));
    }

    #[test]
    fn per_kind_auto_approval_switches() {
        let config = AllowlistConfig {
            auto_approve_individuals: true,
            auto_approve_groups: false,
            ..AllowlistConfig::default()
        };
        let mut list = AllowList::from_config(&config);

        assert!(list.auto_approve(&SenderId::from("94771234567@c.us")));
        assert!(!list.auto_approve(&SenderId::from("120363040000000001@g.us")));
    }
}
