//! The closed category vocabulary a conversion accepts.
//!
//! Category ids are assigned from the vocabulary order: the first name gets
//! id 1, the second id 2, and so on. Labels outside the vocabulary are never
//! given an id.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Xml2CocoError;
use crate::ir::{Category, CategoryId};

/// Supercategory written for every category unless overridden.
pub const DEFAULT_SUPERCATEGORY: &str = "object";

/// Class labels of the Semantic Drone Dataset, in id order.
pub const SEMANTIC_DRONE_CLASSES: &[&str] = &[
    "unlabeled",
    "paved-area",
    "dirt",
    "grass",
    "gravel",
    "water",
    "rocks",
    "pool",
    "vegetation",
    "roof",
    "wall",
    "window",
    "door",
    "fence",
    "fence-pole",
    "person",
    "dog",
    "car",
    "bicycle",
    "tree",
    "bald-tree",
    "ar-marker",
    "obstacle",
];

/// A fixed, ordered set of categories with lookup by name.
#[derive(Clone, Debug)]
pub struct CategoryTable {
    categories: Vec<Category>,
    id_by_name: HashMap<String, CategoryId>,
}

impl CategoryTable {
    /// Builds the table from an ordered list of names.
    ///
    /// # Errors
    /// Fails if the list is empty, a name is blank, or a name repeats.
    pub fn from_names<I, S>(names: I, supercategory: &str) -> Result<Self, Xml2CocoError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories = Vec::new();
        let mut id_by_name = HashMap::new();

        for (idx, name) in names.into_iter().enumerate() {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(Xml2CocoError::InvalidCategories(format!(
                    "category at position {} has an empty name",
                    idx + 1
                )));
            }

            let id = CategoryId::new((idx + 1) as u64);
            if id_by_name.insert(name.clone(), id).is_some() {
                return Err(Xml2CocoError::InvalidCategories(format!(
                    "duplicate category name '{name}'"
                )));
            }
            categories.push(Category::new(id, name, supercategory));
        }

        if categories.is_empty() {
            return Err(Xml2CocoError::InvalidCategories(
                "at least one category name is required".to_string(),
            ));
        }

        Ok(Self {
            categories,
            id_by_name,
        })
    }

    /// The built-in Semantic Drone Dataset vocabulary under `supercategory`.
    pub fn semantic_drone(supercategory: &str) -> Result<Self, Xml2CocoError> {
        Self::from_names(SEMANTIC_DRONE_CLASSES.iter().copied(), supercategory)
    }

    /// Reads one category name per line. Blank lines and lines starting with
    /// `#` are ignored; surrounding whitespace is trimmed.
    pub fn from_file(path: &Path, supercategory: &str) -> Result<Self, Xml2CocoError> {
        let contents = fs::read_to_string(path).map_err(Xml2CocoError::Io)?;
        let names = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        Self::from_names(names, supercategory)
    }

    /// Returns the id of `name`, or `None` if it is not in the vocabulary.
    pub fn lookup(&self, name: &str) -> Option<CategoryId> {
        self.id_by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in id order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
