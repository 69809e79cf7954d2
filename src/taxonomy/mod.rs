pub mod registry;

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::error::Error;
use crate::types::CauseKind;

struct CategoryNode {
    name: String,
    parents: Vec<Category>,
    own_cause_kind: OnceLock<CauseKind>,
}

/// A named node in the error taxonomy.
///
/// Handles are cheap to clone and compare by identity. Parents are fixed at
/// definition time and must already exist, so the graph cannot contain cycles.
#[derive(Clone)]
pub struct Category(Arc<CategoryNode>);

impl Category {
    pub(crate) fn new(name: String, parents: Vec<Category>) -> Self {
        Self(Arc::new(CategoryNode {
            name,
            parents,
            own_cause_kind: OnceLock::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parents(&self) -> &[Category] {
        &self.0.parents
    }

    pub fn is_root(&self) -> bool {
        self.0.parents.is_empty()
    }

    pub fn own_cause_kind(&self) -> Option<CauseKind> {
        self.0.own_cause_kind.get().copied()
    }

    /// Declares the kind this category constructs by default. Set once.
    pub fn set_default_cause_kind(&self, kind: CauseKind) -> Result<(), Error> {
        self.0.own_cause_kind.set(kind).map_err(|attempted| Error::AlreadySet {
            category: self.name().to_string(),
            current: self.own_cause_kind().unwrap_or_default(),
            attempted,
        })?;
        tracing::debug!(category = self.name(), %kind, "declared default cause kind");
        Ok(())
    }

    /// Own kind if declared, else the first kind resolved among the parents in
    /// declaration order (depth-first), else [`CauseKind::Generic`].
    pub fn effective_cause_kind(&self) -> CauseKind {
        self.resolve_cause_kind(&mut HashSet::new())
            .unwrap_or_default()
    }

    /// A node already visited resolved to nothing, otherwise the search would
    /// have stopped there.
    fn resolve_cause_kind(&self, visited: &mut HashSet<Category>) -> Option<CauseKind> {
        if !visited.insert(self.clone()) {
            return None;
        }
        self.own_cause_kind().or_else(|| {
            self.parents()
                .iter()
                .find_map(|parent| parent.resolve_cause_kind(visited))
        })
    }

    /// True when `self` equals `of` or is reachable from it through parents.
    pub fn is_ancestor_of(&self, of: &Category) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![of.clone()];
        while let Some(node) = stack.pop() {
            if node == *self {
                return true;
            }
            if visited.insert(node.clone()) {
                stack.extend(node.parents().iter().cloned());
            }
        }
        false
    }

    /// This category and every ancestor, each listed once and before all of
    /// its own ancestors. Siblings keep parent declaration order.
    pub fn ancestors(&self) -> Vec<Category> {
        let mut lineage = self.lineage_generic_first();
        lineage.reverse();
        lineage
    }

    /// Reverse of [`ancestors`](Self::ancestors): every category after all of
    /// its ancestors.
    pub(crate) fn lineage_generic_first(&self) -> Vec<Category> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.post_order(&mut visited, &mut out);
        out
    }

    fn post_order(&self, visited: &mut HashSet<Category>, out: &mut Vec<Category>) {
        if !visited.insert(self.clone()) {
            return;
        }
        for parent in self.parents().iter().rev() {
            parent.post_order(visited, out);
        }
        out.push(self.clone());
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.name())
            .field(
                "parents",
                &self.parents().iter().map(Category::name).collect::<Vec<_>>(),
            )
            .field("own_cause_kind", &self.own_cause_kind())
            .finish()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
