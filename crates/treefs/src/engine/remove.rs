// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::kind::NodeKind;
use crate::path::TreePath;
use crate::walker::{Lookup, WalkState};

use super::StorageEngine;

/// How a removal treats directories and links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Allow removing a non-empty directory with all its contents.
    pub recursive: bool,
    /// Also remove the targets of removed links, transitively.
    pub follow_links: bool,
}

impl RemoveOptions {
    #[must_use]
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            follow_links: false,
        }
    }

    #[must_use]
    pub fn recursive_following_links() -> Self {
        Self {
            recursive: true,
            follow_links: true,
        }
    }
}

impl<T> StorageEngine<T> {
    /// Remove the node at `path`. The last segment is never followed, so
    /// naming a link removes the link.
    ///
    /// Returns the physical paths of the subtrees that were detached, the
    /// requested one first unless a link target swallowed it.
    pub fn remove_node<P: AsRef<str>>(&mut self, path: P, options: RemoveOptions) -> Result<Vec<TreePath>> {
        let requested = TreePath::new(path)?;
        if requested.is_root() || requested.node_name().is_none() {
            return Err(Error::conflict(requested.as_str(), "cannot remove this path"));
        }
        let requested = requested.to_absolute(&self.current);
        if requested.is_root() {
            return Err(Error::conflict(requested.as_str(), "cannot remove the root"));
        }
        let physical = self.locate_entry(&requested)?;

        let plan = self.removal_plan(physical, options)?;
        let current = self.current_physical();

        for path in &plan {
            let node = self.node_at(path)?;
            if path.is_root() {
                return Err(Error::conflict(path.as_str(), "cannot remove the root"));
            }
            if !options.recursive && node.as_dir().is_ok_and(|d| !d.is_empty()) {
                return Err(Error::conflict(path.as_str(), "directory is not empty"));
            }
            if current.as_ref().is_some_and(|c| c.starts_with(path))
                || self.current.starts_with(path)
            {
                return Err(Error::conflict(path.as_str(), "contains the current directory"));
            }
        }

        for path in &plan {
            self.unregister_links(path);
            let name = path
                .node_name()
                .ok_or_else(|| Error::conflict(path.as_str(), "cannot remove this path"))?;
            let parent = self.node_at_mut(&path.dir_path())?;
            let removed = parent.as_dir_mut()?.remove(name)?;
            parent.touch();
            diagnostics::debug!(
                "removed {kind} at {path}",
                kind: removed.kind().as_str(),
                path: path.as_str()
            );
        }
        for path in &plan {
            self.refresh_links_into(path)?;
        }
        Ok(plan)
    }

    /// Physical subtrees to detach, none nested inside another.
    fn removal_plan(&self, start: TreePath, options: RemoveOptions) -> Result<Vec<TreePath>> {
        let mut plan = vec![start];
        let mut scanned = 0;

        while options.follow_links && scanned < plan.len() {
            let base = plan[scanned].clone();
            scanned += 1;
            if self.node_at(&base)?.kind() == NodeKind::Directory && !options.recursive {
                continue;
            }
            for (key, _) in self.links_below(&base)? {
                // A target that cannot be reached does not exist.
                let mut state = WalkState::new(&key, true);
                if !matches!(state.run(&self.root, &mut |_, _, _| {}), Ok(Lookup::Found)) {
                    continue;
                }
                let target = state.physical_path();
                if !plan.iter().any(|p| target.starts_with(p)) {
                    plan.push(target);
                }
            }
        }

        let mut roots: Vec<TreePath> = Vec::new();
        for path in plan {
            if roots.iter().any(|r| path.starts_with(r)) {
                continue;
            }
            roots.retain(|r| !r.starts_with(&path));
            roots.push(path);
        }
        Ok(roots)
    }
}
