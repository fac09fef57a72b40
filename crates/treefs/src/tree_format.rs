// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Box-drawing rendering of a subtree.
//!
//! [`render_tree`] consumes the engine's subtree walk and labels each entry
//! with the node's `Display` form:
//!
//! ```text
//! /
//! ├─┬ docs/
//! │ └── readme
//! └── latest -> /docs/readme
//! ```

use std::fmt;

use crate::engine::StorageEngine;
use crate::error::Result;
use crate::kind::KindFilter;

/// A labelled node of a rendered tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Add a child node (builder pattern)
    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }
}

/// Render the subtree at `base`. With `follow_links`, links to
/// directories are expanded in place.
pub fn render_tree<T, P: AsRef<str>>(engine: &StorageEngine<T>, base: P, follow_links: bool) -> Result<String> {
    let mut stack: Vec<TreeNode> = Vec::new();

    for ctx in engine.walk_tree(base, KindFilter::ALL, true, follow_links)? {
        let ctx = ctx?;
        fold_to_depth(&mut stack, ctx.depth);
        let label = if ctx.depth == 0 {
            ctx.resolved_path.to_string()
        } else if follow_links && ctx.traversal_path.node_name() != Some(ctx.node.name().as_str()) {
            // Reached through a link: show the link name and where it went
            format!("{} => {}", ctx.traversal_path.node_name().unwrap_or_default(), ctx.node)
        } else {
            ctx.node.to_string()
        };
        stack.push(TreeNode::new(label));
    }

    fold_to_depth(&mut stack, 1);
    Ok(stack.pop().map(|root| format_tree(&root)).unwrap_or_default())
}

/// Attach finished nodes to their parents until `depth` entries remain.
fn fold_to_depth(stack: &mut Vec<TreeNode>, depth: usize) {
    while stack.len() > depth {
        let Some(done) = stack.pop() else {
            return;
        };
        if let Some(parent) = stack.last_mut() {
            parent.add_child(done);
        }
    }
}

/// Format a tree structure with box-drawing characters.
pub fn format_tree(root: &TreeNode) -> String {
    let mut output = String::new();
    output.push_str(&root.label);
    output.push('\n');
    format_children(&mut output, &root.children, "");
    output
}

fn format_children(output: &mut String, children: &[TreeNode], prefix: &str) {
    let child_count = children.len();

    for (index, child) in children.iter().enumerate() {
        let is_last = index == child_count - 1;

        let (connector, continuation_char) = match (child.children.is_empty(), is_last) {
            (true, true) => ("└──", ' '),
            (true, false) => ("├──", '│'),
            (false, true) => ("└─┬", ' '),
            (false, false) => ("├─┬", '│'),
        };

        for (line_idx, line) in child.label.lines().enumerate() {
            output.push_str(prefix);
            if line_idx == 0 {
                output.push_str(connector);
                output.push(' ');
            } else {
                output.push(continuation_char);
                output.push_str(&" ".repeat(connector.chars().count()));
            }
            output.push_str(line);
            output.push('\n');
        }

        if !child.children.is_empty() {
            let new_prefix = format!("{}{} ", prefix, continuation_char);
            format_children(output, &child.children, &new_prefix);
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_tree(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AddOptions;

    #[test]
    fn test_nested_tree() {
        let root = TreeNode::new("root")
            .with_child(TreeNode::new("child1").with_child(TreeNode::new("grandchild1")))
            .with_child(TreeNode::new("child2"));

        let output = format_tree(&root);
        assert!(output.contains("├─┬ child1"));
        assert!(output.contains("│ └── grandchild1"));
        assert!(output.contains("└── child2"));
    }

    #[test]
    fn test_render_engine_tree() -> Result<()> {
        let mut engine: StorageEngine<u32> = StorageEngine::new();
        _ = engine.add_item("/docs/readme", Some(1), AddOptions::intermediate())?;
        _ = engine.add_symbolic_link("/latest", "/docs/readme", AddOptions::default())?;

        let output = render_tree(&engine, "/", false)?;
        assert_eq!(
            output,
            "/\n├─┬ docs/\n│ └── readme\n└── latest -> /docs/readme\n"
        );
        Ok(())
    }

    #[test]
    fn test_render_follows_links() -> Result<()> {
        let mut engine: StorageEngine<u32> = StorageEngine::new();
        _ = engine.add_item("/docs/readme", Some(1), AddOptions::intermediate())?;
        _ = engine.add_symbolic_link("/d", "/docs", AddOptions::default())?;

        let output = render_tree(&engine, "/", true)?;
        assert!(output.contains("└─┬ d => docs/"));
        assert!(output.contains("  └── readme"));
        Ok(())
    }
}
