//! Category tree stored as a flat table of parent links.
//!
//! Parent links are ids, never references, so a misconfigured table cannot
//! create an ownership cycle. Writes go through [`check_parent`], which
//! rejects links that would close a loop; reads through [`ancestry`] are
//! still bounded in case a cycle slipped in from outside.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use twotails_core::{CategoryId, DomainError, DomainResult, Entity, validate_text};

const MAX_NAME_CHARS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(id: CategoryId, name: &str, parent_id: Option<CategoryId>) -> DomainResult<Self> {
        validate_text("category name", name.trim(), MAX_NAME_CHARS)?;
        if parent_id == Some(id) {
            return Err(DomainError::invariant("category cannot be its own parent"));
        }
        Ok(Self {
            id,
            name: name.trim().to_string(),
            parent_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        validate_text("category name", name.trim(), MAX_NAME_CHARS)?;
        self.name = name.trim().to_string();
        Ok(())
    }

    /// Re-parent without validation; callers run [`check_parent`] first.
    pub fn set_parent(&mut self, parent_id: Option<CategoryId>) {
        self.parent_id = parent_id;
    }
}

impl Entity for Category {
    type Id = CategoryId;
    const NAME: &'static str = "category";

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

/// Read access to the category table.
pub trait CategoryTree {
    fn category(&self, id: CategoryId) -> Option<&Category>;

    /// Upper bound on the depth of any valid chain.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CategoryTree for HashMap<CategoryId, Category> {
    fn category(&self, id: CategoryId) -> Option<&Category> {
        self.get(&id)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// The category itself followed by its parent, grandparent, ... up to a root.
///
/// Fails with `CategoryMissing` when a link points at a category that does
/// not exist, and with `InvariantViolation` when the chain loops.
pub fn ancestry<T: CategoryTree + ?Sized>(tree: &T, start: CategoryId) -> DomainResult<Vec<&Category>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(start);

    while let Some(id) = next {
        if !seen.insert(id) || chain.len() > tree.len() {
            return Err(DomainError::invariant(format!("category cycle through {id}")));
        }
        let category = tree
            .category(id)
            .ok_or_else(|| DomainError::category_missing(format!("category {id} does not exist")))?;
        chain.push(category);
        next = category.parent_id;
    }

    Ok(chain)
}

/// Whether `start` or any of its ancestors carries `name`.
pub fn is_within<T: CategoryTree + ?Sized>(tree: &T, start: CategoryId, name: &str) -> DomainResult<bool> {
    Ok(ancestry(tree, start)?.iter().any(|c| c.name == name))
}

/// Validate moving `id` under `parent`.
///
/// `parent` must exist and must not be `id` or one of its descendants.
pub fn check_parent<T: CategoryTree + ?Sized>(
    tree: &T,
    id: CategoryId,
    parent: Option<CategoryId>,
) -> DomainResult<()> {
    let Some(parent) = parent else {
        return Ok(());
    };
    if parent == id {
        return Err(DomainError::invariant("category cannot be its own parent"));
    }
    if ancestry(tree, parent)?.iter().any(|c| c.id == id) {
        return Err(DomainError::invariant(format!(
            "moving category {id} under {parent} would create a cycle"
        )));
    }
    Ok(())
}

/// Direct children of `parent`.
pub fn subcategories<'a>(
    categories: impl IntoIterator<Item = &'a Category>,
    parent: CategoryId,
) -> Vec<&'a Category> {
    categories
        .into_iter()
        .filter(|c| c.parent_id == Some(parent))
        .collect()
}
