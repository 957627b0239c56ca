//! The set of categories a user can file expenses under.

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
};

/// A user's categories, kept in Ukrainian alphabetical order.
///
/// The registry is the only place names are checked for duplicates. It is
/// changed through [CategoryRegistry::insert], [CategoryRegistry::rename] and
/// [CategoryRegistry::remove] once the database has accepted the change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Create a registry from `categories` in any order.
    pub fn new(mut categories: Vec<Category>) -> Self {
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Self { categories }
    }

    /// Validate `raw_name` as the name of a new category.
    ///
    /// # Errors
    ///
    /// Returns the errors of [CategoryName::new], or an
    /// [Error::DuplicateCategoryName] if a category with the same name, ignoring
    /// case and the kind of apostrophe, already exists.
    pub fn validate_new_name(&self, raw_name: &str) -> Result<CategoryName, Error> {
        let name = CategoryName::new(raw_name)?;

        match self.find_by_name(name.as_ref()) {
            Some(existing) => Err(Error::DuplicateCategoryName(existing.name.to_string())),
            None => Ok(name),
        }
    }

    /// Validate `raw_name` as the new name of the category `id`.
    ///
    /// Renaming a category to its current name, or changing only its case, is
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns the errors of [CategoryName::new], or an
    /// [Error::DuplicateCategoryName] if another category already has the name.
    pub fn validate_rename(&self, id: CategoryId, raw_name: &str) -> Result<CategoryName, Error> {
        let name = CategoryName::new(raw_name)?;

        match self.find_by_name(name.as_ref()) {
            Some(existing) if existing.id != id => {
                Err(Error::DuplicateCategoryName(existing.name.to_string()))
            }
            _ => Ok(name),
        }
    }

    /// Add `category`, keeping the registry sorted.
    pub fn insert(&mut self, category: Category) {
        let position = self
            .categories
            .partition_point(|existing| existing.name < category.name);

        self.categories.insert(position, category);
    }

    /// Change the name of the category `id`, returning its previous name.
    pub fn rename(&mut self, id: CategoryId, name: CategoryName) -> Option<CategoryName> {
        let mut category = self.remove(id)?;
        let old_name = std::mem::replace(&mut category.name, name);
        self.insert(category);

        Some(old_name)
    }

    /// Remove the category `id` and return it.
    pub fn remove(&mut self, id: CategoryId) -> Option<Category> {
        let position = self
            .categories
            .iter()
            .position(|category| category.id == id)?;

        Some(self.categories.remove(position))
    }

    /// Get the category with `id`.
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Find a category by name, ignoring case and the kind of apostrophe.
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.name.is_same_as(name))
    }

    /// Whether a category is named exactly `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.categories
            .iter()
            .any(|category| category.name.as_ref() == name)
    }

    /// Iterate over the categories in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// The number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the user has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
