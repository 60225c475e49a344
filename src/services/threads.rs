use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{CommentRecord, CommentTree};

/// Rebuilds the reply forest from a flat, insertion-ordered comment list
///
/// Records are grouped by parent id in a single pass, keeping encounter order
/// inside each sibling group, then expanded from the root bucket. A record
/// whose parent is missing from `records` is never reached and is left out.
pub fn build_thread(records: &[CommentRecord]) -> Vec<CommentTree> {
    let mut by_parent: HashMap<Option<&str>, Vec<&CommentRecord>> = HashMap::new();
    for record in records {
        by_parent
            .entry(record.parent_id.as_deref())
            .or_default()
            .push(record);
    }

    let forest = expand(&by_parent);

    tracing::debug!(
        comments = records.len(),
        roots = forest.len(),
        "Built comment thread"
    );

    forest
}

fn children_of<'m, 'a>(
    by_parent: &'m HashMap<Option<&'a str>, Vec<&'a CommentRecord>>,
    parent: Option<&'a str>,
) -> std::slice::Iter<'m, &'a CommentRecord> {
    by_parent.get(&parent).map(Vec::as_slice).unwrap_or(&[]).iter()
}

/// Depth-first expansion on an explicit stack so reply depth is bounded by
/// the heap, not the call stack. A node is attached to its parent once all of
/// its own replies have been visited.
fn expand<'a>(by_parent: &HashMap<Option<&'a str>, Vec<&'a CommentRecord>>) -> Vec<CommentTree> {
    let mut roots = Vec::new();
    let mut pending_roots = children_of(by_parent, None);
    let mut stack: Vec<(CommentTree, std::slice::Iter<'_, &'a CommentRecord>)> = Vec::new();

    loop {
        let next = match stack.last_mut() {
            Some((_, remaining)) => remaining.next(),
            None => pending_roots.next(),
        };

        match next {
            Some(&record) => {
                let node = CommentTree {
                    comment: record.clone(),
                    children: Vec::new(),
                };
                stack.push((node, children_of(by_parent, Some(record.id.as_str()))));
            }
            None => match stack.pop() {
                Some((done, _)) => match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(done),
                    None => roots.push(done),
                },
                None => break,
            },
        }
    }

    roots
}

/// Number of ancestors above comment `id`, 0 for a root comment
///
/// `None` when `id` is not in `records`. A chain that runs into a missing
/// parent stops counting there.
pub fn reply_depth(records: &[CommentRecord], id: &str) -> Option<usize> {
    let parents: HashMap<&str, Option<&str>> = records
        .iter()
        .map(|record| (record.id.as_str(), record.parent_id.as_deref()))
        .collect();

    let mut current = *parents.get(id)?;
    let mut depth = 0;
    while let Some(parent) = current {
        depth += 1;
        if depth > records.len() {
            break;
        }
        current = parents.get(parent).copied().flatten();
    }
    Some(depth)
}

/// Pre-order walk of a forest: each node, then its children
pub fn flatten(forest: &[CommentTree]) -> Vec<&CommentRecord> {
    let mut out = Vec::new();
    let mut stack: Vec<&CommentTree> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(&node.comment);
        stack.extend(node.children.iter().rev());
    }
    out
}

struct CachedThread {
    version: u64,
    forest: Arc<Vec<CommentTree>>,
}

/// Memoizes built threads per collection version
///
/// The store hands out a new version token whenever a comment list changes.
/// A lookup hits only when the same key was last built from the same version;
/// any other version triggers a full rebuild.
#[derive(Default)]
pub struct ThreadCache {
    entries: HashMap<String, CachedThread>,
}

impl ThreadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        key: &str,
        version: u64,
        records: &[CommentRecord],
    ) -> Arc<Vec<CommentTree>> {
        if let Some(cached) = self.entries.get(key) {
            if cached.version == version {
                tracing::debug!(thread = %key, version, "Thread cache hit");
                return Arc::clone(&cached.forest);
            }
        }

        tracing::debug!(thread = %key, version, "Thread cache miss");

        let forest = Arc::new(build_thread(records));
        self.entries.insert(
            key.to_string(),
            CachedThread {
                version,
                forest: Arc::clone(&forest),
            },
        );
        forest
    }

    /// Drops the cached forest for `key`
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
