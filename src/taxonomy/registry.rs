//! Category registry: unique names, parent resolution, and sealing.

use std::collections::{HashMap, HashSet};
use std::sync::{OnceLock, PoisonError, RwLock, RwLockWriteGuard};

use crate::error::Error;
use crate::taxonomy::Category;
use crate::types::{CategoryDecl, CauseKind};

#[derive(Default)]
struct RegistryState {
    by_name: HashMap<String, Category>,
    /// Definition order, for stable listings.
    order: Vec<Category>,
    sealed: bool,
}

impl RegistryState {
    fn check_new(&self, name: &str) -> Result<(), Error> {
        if self.sealed {
            return Err(Error::Sealed {
                name: name.to_string(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateCategory {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, name: &str, parents: Vec<Category>) -> Category {
        let category = Category::new(name.to_string(), parents);
        self.by_name.insert(name.to_string(), category.clone());
        self.order.push(category.clone());
        tracing::debug!(
            category = name,
            parents = ?category.parents().iter().map(Category::name).collect::<Vec<_>>(),
            "defined category"
        );
        category
    }

    /// Every entry is checked against the current names plus the entries
    /// before it, so a failing document defines nothing.
    fn check_decls(&self, decls: &[CategoryDecl]) -> Result<(), Error> {
        let mut pending: HashSet<&str> = HashSet::new();
        for decl in decls {
            self.check_new(&decl.name)?;
            if pending.contains(decl.name.as_str()) {
                return Err(Error::DuplicateCategory {
                    name: decl.name.clone(),
                });
            }
            if let Some(parent) = decl
                .parents
                .iter()
                .find(|p| !self.by_name.contains_key(*p) && !pending.contains(p.as_str()))
            {
                return Err(Error::UnknownParent {
                    name: decl.name.clone(),
                    parent: parent.clone(),
                });
            }
            pending.insert(&decl.name);
        }
        Ok(())
    }
}

/// Process-wide or scoped set of categories, guarded for concurrent readers.
#[derive(Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by the whole process, created on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Registers a category under `name` with `parents` in declaration order.
    pub fn define(&self, name: &str, parents: &[&Category]) -> Result<Category, Error> {
        let mut state = self.write();
        state.check_new(name)?;
        if let Some(unknown) = parents
            .iter()
            .find(|p| state.by_name.get(p.name()) != Some(**p))
        {
            return Err(Error::UnknownParent {
                name: name.to_string(),
                parent: unknown.name().to_string(),
            });
        }
        Ok(state.insert(name, parents.iter().map(|p| (*p).clone()).collect()))
    }

    /// [`define`](Self::define) followed by [`set_default_cause_kind`](Self::set_default_cause_kind).
    pub fn define_with_kind(
        &self,
        name: &str,
        parents: &[&Category],
        kind: CauseKind,
    ) -> Result<Category, Error> {
        let category = self.define(name, parents)?;
        category.set_default_cause_kind(kind)?;
        Ok(category)
    }

    /// Same as [`define`](Self::define), resolving parents by name.
    pub fn define_by_names(&self, name: &str, parents: &[&str]) -> Result<Category, Error> {
        let resolved = parents
            .iter()
            .map(|parent| {
                self.lookup(parent).ok_or_else(|| Error::UnknownParent {
                    name: name.to_string(),
                    parent: (*parent).to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Category> = resolved.iter().collect();
        self.define(name, &refs)
    }

    pub fn set_default_cause_kind(&self, category: &Category, kind: CauseKind) -> Result<(), Error> {
        category.set_default_cause_kind(kind)
    }

    pub fn effective_cause_kind(&self, category: &Category) -> CauseKind {
        category.effective_cause_kind()
    }

    pub fn is_ancestor(&self, candidate: &Category, of: &Category) -> bool {
        candidate.is_ancestor_of(of)
    }

    pub fn lookup(&self, name: &str) -> Option<Category> {
        self.read(|state| state.by_name.get(name).cloned())
    }

    /// Category names in definition order.
    pub fn names(&self) -> Vec<String> {
        self.read(|state| state.order.iter().map(|c| c.name().to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.read(|state| state.order.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the category set; later definitions fail with [`Error::Sealed`].
    pub fn seal(&self) {
        let mut state = self.write();
        if !state.sealed {
            state.sealed = true;
            tracing::debug!(categories = state.order.len(), "sealed category registry");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.read(|state| state.sealed)
    }

    /// Declares categories from a JSON array of [`CategoryDecl`] entries, in order.
    /// Returns the number of categories defined.
    ///
    /// All or nothing: the whole document is validated under the write lock
    /// before the first category is defined.
    pub fn load_json(&self, json: &str) -> Result<usize, Error> {
        let decls: Vec<CategoryDecl> = serde_json::from_str(json)?;
        let mut state = self.write();
        state.check_decls(&decls)?;
        for decl in &decls {
            let parents = decl
                .parents
                .iter()
                .filter_map(|parent| state.by_name.get(parent).cloned())
                .collect();
            let category = state.insert(&decl.name, parents);
            if let Some(kind) = decl.cause_kind {
                category.set_default_cause_kind(kind)?;
            }
        }
        tracing::debug!(count = decls.len(), "loaded taxonomy");
        Ok(decls.len())
    }

    /// Defines a single declaration entry.
    pub fn declare(&self, decl: &CategoryDecl) -> Result<Category, Error> {
        let parents: Vec<&str> = decl.parents.iter().map(String::as_str).collect();
        let category = self.define_by_names(&decl.name, &parents)?;
        if let Some(kind) = decl.cause_kind {
            category.set_default_cause_kind(kind)?;
        }
        Ok(category)
    }

    fn read<T>(&self, f: impl FnOnce(&RegistryState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
