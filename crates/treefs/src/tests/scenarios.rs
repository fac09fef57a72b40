// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end behavior of the engine on small trees.

use super::{assert_index_matches_tree, p};
use crate::engine::{AddOptions, CopyOptions, RemoveOptions, StorageEngine};
use crate::error::{ErrorKind, Result};
use crate::kind::NodeKind;

#[test]
fn test_link_to_directory_exists_both_ways() -> Result<()> {
    let mut engine: StorageEngine<String> = StorageEngine::new();
    _ = engine.add_directory("/dir1", AddOptions::default())?;
    _ = engine.add_symbolic_link("/link1", "/dir1", AddOptions::default())?;

    assert!(engine.node_exists("/link1", true));
    assert!(engine.node_exists("/link1", false));

    assert!(engine.directory_exists("/link1", true));
    assert!(!engine.directory_exists("/link1", false));
    assert!(engine.symbolic_link_exists("/link1", false));
    assert!(!engine.symbolic_link_exists("/link1", true));
    assert!(!engine.item_exists("/link1", true));

    let link = engine.get_symbolic_link("/link1")?;
    assert_eq!(link.target_kind(), Some(NodeKind::Directory));
    Ok(())
}

#[test]
fn test_rename_moves_index_entry() -> Result<()> {
    let mut engine: StorageEngine<String> = StorageEngine::new();
    _ = engine.add_item("/a/item1", Some("X".into()), AddOptions::intermediate())?;
    _ = engine.add_symbolic_link("/linkToItem", "/a/item1", AddOptions::default())?;

    let renamed = engine.set_node_name("/a/item1", "item2")?;
    assert_eq!(renamed, "/a/item2");

    assert!(engine.links_to("/a/item1")?.is_empty());
    assert_eq!(engine.links_to("/a/item2")?, vec![p("/linkToItem")]);

    let link = engine.get_symbolic_link("/linkToItem")?;
    assert_eq!(link.target(), "/a/item2");
    assert_eq!(link.target_kind(), Some(NodeKind::Item));
    assert_eq!(engine.get_item_data("/linkToItem")?, Some(&"X".to_string()));
    assert_index_matches_tree(&engine);
    Ok(())
}

#[test]
fn test_wildcard_resolution_in_directory_order() -> Result<()> {
    let mut engine: StorageEngine<u32> = StorageEngine::new();
    _ = engine.add_item("/dir1/file1.txt", Some(1), AddOptions::intermediate())?;
    _ = engine.add_item("/dir1/file2.log", Some(2), AddOptions::default())?;
    _ = engine.add_item("/dir2/file1.txt", Some(3), AddOptions::intermediate())?;

    assert_eq!(
        engine.resolve_path("/dir*/file?.txt")?,
        vec![p("/dir1/file1.txt"), p("/dir2/file1.txt")]
    );
    Ok(())
}

fn linked_removal_tree() -> Result<StorageEngine<u32>> {
    let mut engine = StorageEngine::new();
    _ = engine.add_directory("/test/nested", AddOptions::intermediate())?;
    _ = engine.add_item("/target/item", Some(1), AddOptions::intermediate())?;
    _ = engine.add_symbolic_link("/test/nested/link", "/target", AddOptions::default())?;
    Ok(engine)
}

#[test]
fn test_recursive_removal_following_links() -> Result<()> {
    let mut engine = linked_removal_tree()?;
    let removed = engine.remove_node("/test", RemoveOptions::recursive_following_links())?;

    assert_eq!(removed, vec![p("/test"), p("/target")]);
    assert!(!engine.node_exists("/test", false));
    assert!(!engine.node_exists("/target", false));
    assert!(engine.link_index().is_empty());
    assert_index_matches_tree(&engine);
    Ok(())
}

#[test]
fn test_recursive_removal_keeps_link_targets() -> Result<()> {
    let mut engine = linked_removal_tree()?;
    let removed = engine.remove_node("/test", RemoveOptions::recursive())?;

    assert_eq!(removed, vec![p("/test")]);
    assert!(!engine.node_exists("/test", false));
    assert!(engine.item_exists("/target/item", false));
    assert!(engine.link_index().is_empty());
    Ok(())
}

#[test]
fn test_circular_links_resolve_finite_paths() -> Result<()> {
    let mut engine: StorageEngine<u32> = StorageEngine::new();
    _ = engine.add_directory("/dir1", AddOptions::default())?;
    _ = engine.add_directory("/dir2", AddOptions::default())?;
    _ = engine.add_symbolic_link("/dir1/link1", "/dir2", AddOptions::default())?;
    _ = engine.add_symbolic_link("/dir2/link2", "/dir1", AddOptions::default())?;

    let ctx = engine.walk_to_target("/dir1/link1/link2/link1", true)?;
    assert_eq!(ctx.node.kind(), NodeKind::Directory);
    assert_eq!(ctx.resolved_path, "/dir2");
    assert_eq!(ctx.traversal_path, "/dir1/link1/link2/link1");
    Ok(())
}

#[test]
fn test_self_referencing_link_is_terminal() -> Result<()> {
    let mut engine: StorageEngine<u32> = StorageEngine::new();
    _ = engine.add_symbolic_link("/me", "/me", AddOptions::default())?;

    let node = engine.get_node("/me", true)?;
    assert_eq!(node.kind(), NodeKind::SymbolicLink);
    assert!(engine.get_item_data("/me").is_err());
    Ok(())
}

#[test]
fn test_relocation_guards() -> Result<()> {
    let mut engine: StorageEngine<String> = StorageEngine::new();
    _ = engine.add_item("/a/b/x", Some("x".into()), AddOptions::intermediate())?;
    _ = engine.add_item("/y", Some("y".into()), AddOptions::default())?;

    assert_eq!(engine.move_node("/a", "/a/b", false).unwrap_err().kind(), ErrorKind::Conflict);
    assert_eq!(engine.move_node("/a", "/a", false).unwrap_err().kind(), ErrorKind::Conflict);
    assert_eq!(engine.move_node("/", "/a", false).unwrap_err().kind(), ErrorKind::Conflict);
    assert_eq!(
        engine.copy_node("/a", "/a/b/c", CopyOptions { recursive: true, ..CopyOptions::default() })
            .unwrap_err()
            .kind(),
        ErrorKind::Conflict
    );

    // Occupied destinations need overwrite, and never swap a directory for an item
    assert_eq!(engine.move_node("/y", "/a/b/x", false).unwrap_err().kind(), ErrorKind::Conflict);
    assert_eq!(engine.move_node("/y", "/a/b", true)?, "/a/b/y");
    assert_eq!(engine.move_node("/a/b/y", "/a/b/x", true)?, "/a/b/x");
    assert_eq!(engine.get_item_data("/a/b/x")?, Some(&"y".to_string()));
    assert_eq!(engine.move_node("/a/b/x", "/a", true)?, "/a/x");
    _ = engine.add_directory("/d", AddOptions::default())?;
    assert_eq!(engine.move_node("/a/x", "/a/b", true)?, "/a/b/x");
    assert_eq!(
        engine.move_node("/d", "/a/b/x", true).unwrap_err().kind(),
        ErrorKind::Conflict
    );

    assert!(engine.item_exists("/a/b/x", false));
    assert!(engine.directory_exists("/d", false));
    Ok(())
}

#[test]
fn test_cursor_blocks_removal_but_follows_moves() -> Result<()> {
    let mut engine: StorageEngine<u32> = StorageEngine::new();
    _ = engine.add_item("/keep/me", Some(1), AddOptions::intermediate())?;
    _ = engine.add_symbolic_link("/l", "/keep/me", AddOptions::default())?;
    engine.change_directory("/keep")?;

    assert!(engine.remove_node("/keep", RemoveOptions::recursive()).is_err());
    assert!(engine.remove_node(".", RemoveOptions::recursive()).is_err());
    assert!(engine.remove_node("..", RemoveOptions::recursive()).is_err());
    assert!(engine.move_node("/keep", "/elsewhere", false).is_ok());
    assert_eq!(engine.current_path(), "/elsewhere");
    assert_eq!(engine.get_item_data("/l")?, Some(&1));
    assert_index_matches_tree(&engine);
    Ok(())
}

#[test]
fn test_copy_is_independent_of_source() -> Result<()> {
    let mut engine: StorageEngine<String> = StorageEngine::new();
    _ = engine.add_item("/src/doc", Some("one".into()), AddOptions::intermediate())?;
    _ = engine.add_symbolic_link("/src/alias", "doc", AddOptions::default())?;

    let copied = engine.copy_node(
        "/src",
        "/dst",
        CopyOptions {
            recursive: true,
            ..CopyOptions::default()
        },
    )?;
    assert_eq!(copied, "/dst");

    let original = engine.get_node("/src/doc", false)?;
    let copy = engine.get_node("/dst/doc", false)?;
    assert_ne!(original.id(), copy.id());
    assert_eq!(original.name(), copy.name());
    assert!(copy.is_referenced_in_storage());
    assert!(!original.as_item()?.shares_data_with(copy.as_item()?));

    engine.set_item_data("/dst/alias", Some("two".into()))?;
    assert_eq!(engine.get_item_data("/src/doc")?, Some(&"one".to_string()));
    assert_eq!(engine.get_item_data("/dst/doc")?, Some(&"two".to_string()));
    assert_eq!(engine.links_to("/dst/doc")?, vec![p("/dst/alias")]);
    assert_index_matches_tree(&engine);
    Ok(())
}
