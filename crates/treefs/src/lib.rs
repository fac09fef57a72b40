// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! An in-memory virtual filesystem with typed items and symbolic links.
//!
//! A [`StorageEngine`] owns a tree of directories, items carrying a payload
//! of type `T`, and symbolic links. Paths are slash-separated and may be
//! relative to the engine's current directory. Links are stored by path,
//! so the addressable graph may contain cycles; resolution stops a chain
//! at the first link it revisits instead of looping.
//!
//! The engine keeps a reverse [`LinkIndex`] from link targets to the links
//! pointing at them, and rewrites it on every add, remove, rename, move and
//! copy.
//!
//! ```
//! use treefs::{AddOptions, StorageEngine};
//!
//! let mut engine: StorageEngine<String> = StorageEngine::new();
//! engine.add_item("/docs/readme", Some("hello".into()), AddOptions::intermediate())?;
//! engine.add_symbolic_link("/latest", "/docs/readme", AddOptions::default())?;
//!
//! assert_eq!(engine.get_item_data("/latest")?, Some(&"hello".to_string()));
//! assert_eq!(engine.resolve_path("/*/read*")?.len(), 1);
//! # Ok::<(), treefs::Error>(())
//! ```

mod cycle;
mod dir;
mod engine;
mod error;
mod item;
mod kind;
mod link_index;
mod name;
mod node;
mod path;
mod settings;
mod symlink;
mod walker;
mod wildcard;

pub mod tree_format;

pub use cycle::CycleDetector;
pub use dir::Directory;
pub use engine::{AddOptions, CopyOptions, RemoveOptions, StorageEngine};
pub use error::{Error, ErrorKind, Result};
pub use item::{DeepCloneable, Item};
pub use kind::{KindFilter, NodeKind};
pub use link_index::LinkIndex;
pub use name::NodeName;
pub use node::{Node, NodeBody, NodeID};
pub use path::TreePath;
pub use settings::{Settings, SortKey, SortOrder, SortProperty, WildcardKind};
pub use symlink::SymbolicLink;
pub use walker::{Lookup, MissingSegment, VisitFn, WalkContext, WalkState, WalkTree};
pub use wildcard::{GlobMatcher, RegexMatcher, WildcardMatcher};

#[cfg(test)]
mod tests;
