// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Wildcard path resolution and name search.

use crate::error::{Error, Result};
use crate::kind::{KindFilter, NodeKind};
use crate::path::TreePath;

use super::StorageEngine;

impl<T> StorageEngine<T> {
    /// Every existing path matching `pattern`.
    ///
    /// Segments holding a wildcard are matched against each child name in
    /// the directory's configured order; several wildcard segments expand
    /// depth-first. Links are followed to reach intermediate directories,
    /// and the returned paths keep the names as matched.
    pub fn resolve_path<P: AsRef<str>>(&self, pattern: P) -> Result<Vec<TreePath>> {
        let pattern = self.absolute(pattern)?;
        let segments: Vec<&str> = pattern.segments().collect();
        for seg in &segments {
            if self.matcher.contains_wildcard(seg) && !self.matcher.is_valid_pattern(seg) {
                return Err(Error::invalid_argument(*seg, "invalid wildcard pattern"));
            }
        }

        let mut results = Vec::new();
        // (path so far, next segment, a wildcard has branched)
        let mut stack = vec![(TreePath::root(), 0usize, false)];

        while let Some((path, index, branched)) = stack.pop() {
            let Some(seg) = segments.get(index) else {
                results.push(path);
                continue;
            };
            let ctx = match self.walk_to_target(path.as_str(), true) {
                Ok(ctx) => ctx,
                Err(_) if branched => continue,
                Err(err) => return Err(err),
            };
            let dir = match ctx.node.as_dir() {
                Ok(dir) => dir,
                Err(_) if branched => continue,
                Err(_) => return Err(Error::not_a_directory(path.as_str(), ctx.node.kind())),
            };

            if self.matcher.contains_wildcard(seg) {
                let matches: Vec<TreePath> = dir
                    .node_list(KindFilter::ALL, &self.settings.sort)
                    .into_iter()
                    .filter(|n| self.matcher.is_match(n.name().as_str(), seg))
                    .map(|n| path.child(n.name()))
                    .collect();
                for m in matches.into_iter().rev() {
                    stack.push((m, index + 1, true));
                }
            } else {
                let name = self.matcher.unescape(seg);
                let next = path.child(&name);
                if dir.contains(&name) {
                    stack.push((next, index + 1, branched));
                } else if !branched {
                    return Err(Error::not_found(next.as_str()));
                }
            }
        }

        diagnostics::debug!(
            "resolved {pattern} to {count} paths",
            pattern: pattern.as_str(),
            count: results.len()
        );
        Ok(results)
    }

    /// Paths below `base` whose names match `name_pattern` under the active
    /// matcher. The base itself is not a candidate.
    pub fn find_nodes<P: AsRef<str>>(
        &self,
        base: P,
        filter: KindFilter,
        name_pattern: &str,
        recursive: bool,
    ) -> Result<Vec<TreePath>> {
        let base = self.absolute(base)?;
        let mut found = Vec::new();
        for ctx in self.walk_tree(base.as_str(), filter, recursive, false)? {
            let ctx = ctx?;
            if ctx.depth == 0 {
                continue;
            }
            if self.matcher.is_match(ctx.node.name().as_str(), name_pattern) {
                found.push(base.combine(&ctx.traversal_path));
            }
        }
        Ok(found)
    }

    /// Shorthand for [`StorageEngine::find_nodes`] over items only.
    pub fn find_items<P: AsRef<str>>(&self, base: P, name_pattern: &str) -> Result<Vec<TreePath>> {
        self.find_nodes(base, NodeKind::Item.into(), name_pattern, true)
    }
}
