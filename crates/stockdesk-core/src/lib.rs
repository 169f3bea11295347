// SPDX-FileCopyrightText: 2026 Stockdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Stockdesk inventory client.
//!
//! This crate provides the domain model (users, items, borrow states)
//! and the error types shared by every crate in the workspace.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DeskError, ErrorReason};
pub use types::{BorrowState, BorrowStateId, Item, ItemCount, ItemId, User, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desk_error_has_all_variants() {
        // Verify all 7 error variants exist and can be constructed.
        let _config = DeskError::Config("test".into());
        let _validation = DeskError::Validation("test".into());
        let _not_found = DeskError::NotFound {
            token: "test".into(),
        };
        let _conflict = DeskError::AlreadyBorrowed { conflicts: vec![] };
        let _api = DeskError::Api {
            reason: ErrorReason::NoSuchObject,
            message: "test".into(),
        };
        let _transport = DeskError::Transport {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _internal = DeskError::Internal("test".into());
    }

    #[test]
    fn id_newtypes_are_hashable_and_comparable() {
        let a = ItemId(1);
        let b = ItemId(1);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(UserId(7));
        assert!(set.contains(&UserId(7)));
    }
}
