// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::kind::NodeKind;
use crate::path::TreePath;

/// Represents a symbolic link to another path
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicLink {
    target: TreePath,
    /// Kind found at `target` when last checked; derived by the engine
    target_kind: Option<NodeKind>,
}

impl SymbolicLink {
    pub fn new(target: TreePath) -> Self {
        Self {
            target,
            target_kind: None,
        }
    }

    pub fn target(&self) -> &TreePath {
        &self.target
    }

    pub fn target_kind(&self) -> Option<NodeKind> {
        self.target_kind
    }

    pub(crate) fn set_target(&mut self, target: TreePath) {
        self.target = target;
    }

    pub(crate) fn set_target_kind(&mut self, kind: Option<NodeKind>) {
        self.target_kind = kind;
    }
}
