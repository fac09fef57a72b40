// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Rename, move and copy, and the link index rewriting they require.

use crate::error::{Error, Result};
use crate::item::DeepCloneable;
use crate::kind::NodeKind;
use crate::name::NodeName;
use crate::path::TreePath;

use super::StorageEngine;

/// How a copy treats occupied names, directories and links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub overwrite: bool,
    /// Copy directory contents depth-first instead of an empty directory.
    pub recursive: bool,
    /// Copy what a link source points at, and follow links in the
    /// destination path.
    pub follow_links: bool,
}

/// Where a relocated node lands.
struct Destination {
    container: TreePath,
    name: NodeName,
}

impl Destination {
    fn path(&self) -> TreePath {
        self.container.child(&self.name)
    }
}

impl<T> StorageEngine<T> {
    /// Give the node at `path` a new name within its directory.
    pub fn set_node_name<P: AsRef<str>>(&mut self, path: P, new_name: &str) -> Result<TreePath> {
        let name = NodeName::new(new_name)?;
        let src = self.movable_source(path)?;
        let dest = Destination {
            container: src.dir_path(),
            name,
        };
        if dest.path() == src {
            return Ok(src);
        }
        self.relocate(&src, dest, false)
    }

    /// Move the node at `src` to `dst`. When `dst` is an existing directory
    /// the node is placed inside it under its own name.
    pub fn move_node<P: AsRef<str>, Q: AsRef<str>>(&mut self, src: P, dst: Q, overwrite: bool) -> Result<TreePath> {
        let src = self.movable_source(src)?;
        let dest = self.destination(&src, dst, true)?;
        self.relocate(&src, dest, overwrite)
    }

    fn movable_source<P: AsRef<str>>(&self, path: P) -> Result<TreePath> {
        let requested = TreePath::new(path)?;
        if requested.node_name().is_none() {
            return Err(Error::conflict(requested.as_str(), "cannot relocate this path"));
        }
        let requested = requested.to_absolute(&self.current);
        if requested.is_root() {
            return Err(Error::conflict(requested.as_str(), "cannot relocate the root"));
        }
        self.locate_entry(&requested)
    }

    /// Resolve `dst` into a container and name, rejecting self and subtree
    /// targets.
    fn destination<Q: AsRef<str>>(&self, src: &TreePath, dst: Q, follow_links: bool) -> Result<Destination> {
        let dst = self.absolute(dst)?;
        let existing_dir = self
            .walk_to_target(dst.as_str(), follow_links)
            .ok()
            .filter(|ctx| ctx.node.kind() == NodeKind::Directory)
            .map(|ctx| ctx.resolved_path);

        let dest = match existing_dir {
            Some(container) => {
                let name = src
                    .node_name()
                    .ok_or_else(|| Error::conflict(src.as_str(), "cannot relocate the root"))?;
                Destination {
                    container,
                    name: NodeName::new(name)?,
                }
            }
            None => {
                if dst.is_root() {
                    return Err(Error::conflict(dst.as_str(), "cannot replace the root"));
                }
                let name = dst
                    .node_name()
                    .ok_or_else(|| Error::invalid_argument(dst.as_str(), "path does not name a node"))?;
                let parent = self.walk_to_target(dst.dir_path().as_str(), follow_links)?;
                if parent.node.kind() != NodeKind::Directory {
                    return Err(Error::not_a_directory(parent.traversal_path.as_str(), parent.node.kind()));
                }
                Destination {
                    container: parent.resolved_path,
                    name: NodeName::new(name)?,
                }
            }
        };

        if dest.path() == *src {
            return Err(Error::conflict(src.as_str(), "source and destination are the same"));
        }
        if dest.container.starts_with(src) {
            return Err(Error::conflict(
                dest.path().as_str(),
                "destination is inside the source",
            ));
        }
        Ok(dest)
    }

    /// Check that `incoming` may be placed at `dest`.
    fn check_destination(&self, dest: &Destination, incoming: NodeKind, overwrite: bool) -> Result<()> {
        let path = dest.path();
        let Ok(existing) = self.node_at(&path) else {
            return Ok(());
        };
        if !overwrite {
            return Err(Error::already_exists(path.as_str()));
        }
        let old = existing.kind();
        if old != incoming && (old == NodeKind::Directory || incoming == NodeKind::Directory) {
            return Err(Error::conflict(
                path.as_str(),
                format!("cannot replace {} with {}", old, incoming),
            ));
        }
        let current = self.current_physical();
        if current.is_some_and(|c| c.starts_with(&path)) || self.current.starts_with(&path) {
            return Err(Error::conflict(path.as_str(), "contains the current directory"));
        }
        Ok(())
    }

    /// Detach the node at physical `src` and attach it at `dest`, carrying
    /// the link index along.
    fn relocate(&mut self, src: &TreePath, dest: Destination, overwrite: bool) -> Result<TreePath> {
        let kind = self.node_at(src)?.kind();
        self.check_destination(&dest, kind, overwrite)?;
        let dst = dest.path();
        let cursor = self.current_physical();

        self.unregister_links(&dst);
        let carried = self
            .links
            .drain_matching(|target, link| target.starts_with(src) || link.starts_with(src));

        let src_name = src
            .node_name()
            .ok_or_else(|| Error::conflict(src.as_str(), "cannot relocate the root"))?;
        let src_parent = self.node_at_mut(&src.dir_path())?;
        let mut node = src_parent.as_dir_mut()?.take(src_name)?;
        src_parent.touch();
        if node.name() != &dest.name {
            node.set_name(dest.name.clone());
        }
        _ = self
            .node_at_mut(&dest.container)?
            .add_child(node, overwrite)?;

        for (target, link) in carried {
            let link_moved = link.starts_with(src);
            let new_link = link.rebase(src, &dst).unwrap_or(link);
            let written = self.node_at(&new_link)?.as_symlink()?.target().clone();

            let new_target = if link_moved && !written.is_absolute() {
                written.to_absolute(&new_link.dir_path())
            } else if let Some(rebased) = target.rebase(src, &dst) {
                if let Some(symlink) = self.node_at_mut(&new_link)?.as_symlink_mut() {
                    symlink.set_target(rebased.clone());
                }
                rebased
            } else {
                target
            };
            self.links.insert(new_target, new_link);
        }

        // A cursor reached through a link follows its physical directory.
        if let Some(rebased) = cursor.and_then(|c| c.rebase(src, &dst)) {
            self.current = rebased;
        } else if let Some(rebased) = self.current.rebase(src, &dst) {
            self.current = rebased;
        }
        self.refresh_links_into(&dst)?;
        self.refresh_links_into(src)?;
        self.refresh_target_kinds(|_, link| link.starts_with(&dst))?;

        diagnostics::debug!(
            "moved {kind} {src} to {dst}",
            kind: kind.as_str(),
            src: src.as_str(),
            dst: dst.as_str()
        );
        Ok(dst)
    }
}

impl<T: DeepCloneable> StorageEngine<T> {
    /// Copy the node at `src` to `dst`. Links inside a copied directory are
    /// copied as links.
    pub fn copy_node<P: AsRef<str>, Q: AsRef<str>>(&mut self, src: P, dst: Q, options: CopyOptions) -> Result<TreePath> {
        let requested = self.absolute(src)?;
        let src = if options.follow_links {
            self.walk_to_target(requested.as_str(), true)?.resolved_path
        } else {
            self.locate_entry(&requested)?
        };
        if src.is_root() {
            return Err(Error::conflict(src.as_str(), "cannot copy the root"));
        }

        let dest = self.destination(&src, dst, options.follow_links)?;
        let source = self.node_at(&src)?;
        self.check_destination(&dest, source.kind(), options.overwrite)?;

        let copy = if options.recursive {
            source.clone_subtree()?
        } else {
            source.deep_clone()
        };
        let copy = copy.with_name(dest.name.clone());
        let dst = dest.path();

        self.unregister_links(&dst);
        _ = self
            .node_at_mut(&dest.container)?
            .add_child(copy, options.overwrite)?;
        self.register_links(&dst)?;
        self.refresh_links_into(&dst)?;

        diagnostics::debug!("copied {src} to {dst}", src: src.as_str(), dst: dst.as_str());
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AddOptions, RemoveOptions};
    use crate::error::ErrorKind;

    fn engine() -> Result<StorageEngine<String>> {
        let mut engine = StorageEngine::new();
        _ = engine.add_item("/a/b/x", Some("x".into()), AddOptions::intermediate())?;
        _ = engine.add_directory("/c", AddOptions::default())?;
        Ok(engine)
    }

    fn p(s: &str) -> TreePath {
        TreePath::new(s).unwrap()
    }

    #[test]
    fn test_rename() -> Result<()> {
        let mut engine = engine()?;
        assert_eq!(engine.set_node_name("/a/b/x", "y")?, "/a/b/y");
        assert!(!engine.node_exists("/a/b/x", false));
        assert_eq!(engine.get_item_data("/a/b/y")?, Some(&"x".to_string()));

        _ = engine.add_item("/a/b/z", None, AddOptions::default())?;
        let err = engine.set_node_name("/a/b/z", "y").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            engine.set_node_name("/a/b/z", "bad/name").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        Ok(())
    }

    #[test]
    fn test_move_into_existing_directory() -> Result<()> {
        let mut engine = engine()?;
        assert_eq!(engine.move_node("/a/b", "/c", false)?, "/c/b");
        assert!(engine.item_exists("/c/b/x", false));
        assert!(!engine.node_exists("/a/b", false));
        assert!(engine.get_node("/c/b/x", false)?.is_referenced_in_storage());
        Ok(())
    }

    #[test]
    fn test_move_to_new_name() -> Result<()> {
        let mut engine = engine()?;
        assert_eq!(engine.move_node("/a/b/x", "/c/renamed", false)?, "/c/renamed");
        assert_eq!(engine.get_item_data("/c/renamed")?, Some(&"x".to_string()));
        Ok(())
    }

    #[test]
    fn test_move_guards() -> Result<()> {
        let mut engine = engine()?;
        for (src, dst) in [("/a", "/a"), ("/a", "/a/b"), ("/a", "/a/b/new"), ("/a/b", "/a")] {
            let err = engine.move_node(src, dst, true).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict, "{} -> {}", src, dst);
        }
        assert_eq!(engine.move_node("/", "/c", false).unwrap_err().kind(), ErrorKind::Conflict);
        assert!(engine.move_node("/missing", "/c", false).unwrap_err().is_not_found());
        Ok(())
    }

    #[test]
    fn test_move_overwrite() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.add_item("/c/x", Some("old".into()), AddOptions::default())?;
        let err = engine.move_node("/a/b/x", "/c/x", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        _ = engine.move_node("/a/b/x", "/c/x", true)?;
        assert_eq!(engine.get_item_data("/c/x")?, Some(&"x".to_string()));
        Ok(())
    }

    #[test]
    fn test_move_rebases_cursor() -> Result<()> {
        let mut engine = engine()?;
        engine.change_directory("/a/b")?;
        _ = engine.move_node("/a", "/c", false)?;
        assert_eq!(engine.current_path(), "/c/a/b");
        assert!(engine.item_exists("x", false));
        Ok(())
    }

    #[test]
    fn test_move_rebases_cursor_set_through_link() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.add_symbolic_link("/alias", "/a", AddOptions::default())?;
        engine.change_directory("/alias/b")?;

        _ = engine.move_node("/a/b", "/moved", false)?;
        assert_eq!(engine.current_path(), "/moved");
        _ = engine.add_item("y", Some("y".into()), AddOptions::default())?;
        assert!(engine.item_exists("/moved/y", false));

        let err = engine.remove_node("/moved", RemoveOptions::recursive()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(engine.directory_exists("/moved", false));
        Ok(())
    }

    #[test]
    fn test_move_rewrites_links_into_subtree() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.add_symbolic_link("/lx", "/a/b/x", AddOptions::default())?;
        _ = engine.add_symbolic_link("/c/rel", "../a/b", AddOptions::default())?;

        _ = engine.move_node("/a", "/c/moved", false)?;
        assert_eq!(engine.get_symbolic_link("/lx")?.target(), "/c/moved/b/x");
        assert_eq!(engine.get_symbolic_link("/c/rel")?.target(), "/c/moved/b");
        assert_eq!(engine.links_to("/c/moved/b/x")?, vec![p("/lx")]);
        assert!(engine.links_to("/a/b/x")?.is_empty());
        assert_eq!(engine.get_item_data("/lx")?, Some(&"x".to_string()));
        Ok(())
    }

    #[test]
    fn test_move_carries_links_inside_subtree() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.add_symbolic_link("/a/rel", "b/x", AddOptions::default())?;
        _ = engine.add_symbolic_link("/a/out", "/c", AddOptions::default())?;

        _ = engine.move_node("/a", "/c/a2", false)?;
        assert_eq!(engine.get_symbolic_link("/c/a2/rel")?.target(), "b/x");
        assert_eq!(engine.links_to("/c/a2/b/x")?, vec![p("/c/a2/rel")]);
        assert_eq!(engine.links_to("/c")?, vec![p("/c/a2/out")]);
        assert_eq!(engine.link_index().len(), 2);
        Ok(())
    }

    #[test]
    fn test_copy_item_is_independent() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.copy_node("/a/b/x", "/c", CopyOptions::default())?;
        engine.set_item_data("/c/x", Some("changed".into()))?;
        assert_eq!(engine.get_item_data("/a/b/x")?, Some(&"x".to_string()));
        Ok(())
    }

    #[test]
    fn test_copy_directory_shallow_and_recursive() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.copy_node("/a", "/shallow", CopyOptions::default())?;
        assert!(engine.get_directory("/shallow", false)?.is_empty());

        let opts = CopyOptions {
            recursive: true,
            ..CopyOptions::default()
        };
        _ = engine.copy_node("/a", "/deep", opts)?;
        assert_eq!(engine.get_item_data("/deep/b/x")?, Some(&"x".to_string()));
        assert!(engine.item_exists("/a/b/x", false));
        Ok(())
    }

    #[test]
    fn test_copy_guards() -> Result<()> {
        let mut engine = engine()?;
        let opts = CopyOptions {
            recursive: true,
            ..CopyOptions::default()
        };
        assert_eq!(engine.copy_node("/a", "/a/b", opts).unwrap_err().kind(), ErrorKind::Conflict);
        assert_eq!(engine.copy_node("/a", "/a", opts).unwrap_err().kind(), ErrorKind::Conflict);
        assert_eq!(engine.copy_node("/a/b", "/a", opts).unwrap_err().kind(), ErrorKind::Conflict);
        Ok(())
    }

    #[test]
    fn test_copy_link_as_link_or_target() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.add_symbolic_link("/lb", "/a/b", AddOptions::default())?;

        _ = engine.copy_node("/lb", "/c/as_link", CopyOptions::default())?;
        assert_eq!(engine.get_symbolic_link("/c/as_link")?.target(), "/a/b");
        assert_eq!(engine.links_to("/a/b")?, vec![p("/c/as_link"), p("/lb")]);

        let opts = CopyOptions {
            recursive: true,
            follow_links: true,
            ..CopyOptions::default()
        };
        _ = engine.copy_node("/lb", "/c/as_dir", opts)?;
        assert!(engine.directory_exists("/c/as_dir", false));
        assert!(engine.item_exists("/c/as_dir/x", false));
        Ok(())
    }

    #[test]
    fn test_copy_destination_through_link() -> Result<()> {
        let mut engine = engine()?;
        _ = engine.add_symbolic_link("/to_c", "/c", AddOptions::default())?;
        let err = engine
            .copy_node("/a/b/x", "/to_c/x", CopyOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let opts = CopyOptions {
            follow_links: true,
            ..CopyOptions::default()
        };
        assert_eq!(engine.copy_node("/a/b/x", "/to_c/x", opts)?, "/c/x");
        Ok(())
    }
}
