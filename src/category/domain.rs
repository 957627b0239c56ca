//! Core category domain types.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// The Ukrainian alphabet in collation order.
const UKRAINIAN_ALPHABET: &str = "абвгґдеєжзиіїйклмнопрстуфхцчшщьюя";

/// Characters allowed in a category name besides letters.
const SEPARATORS: [char; 5] = [' ', '-', '\'', '’', 'ʼ'];

/// The categories every new user starts with.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Їжа",
    "Транспорт",
    "Розваги",
    "Здоров’я",
    "Освіта",
    "Покупки",
    "Інше",
];

fn is_ukrainian_letter(c: char) -> bool {
    c.to_lowercase()
        .all(|lower| UKRAINIAN_ALPHABET.contains(lower))
}

/// A validated category name.
///
/// Names are made of Ukrainian letters, apostrophes, hyphens and single
/// spaces, contain at least one letter, and are capitalised: the first
/// character is upper case and the rest are lower case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Validate and normalise a category name.
    ///
    /// Leading and trailing whitespace is removed and runs of spaces are
    /// collapsed before validation.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyCategoryName] if `name` is blank, or an
    /// [Error::InvalidCategoryName] if it contains any other character or no
    /// letters at all.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

        if name.is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        let all_allowed = name
            .chars()
            .all(|c| is_ukrainian_letter(c) || SEPARATORS.contains(&c));
        let has_letter = name.chars().any(is_ukrainian_letter);

        if !all_allowed || !has_letter {
            return Err(Error::InvalidCategoryName(name));
        }

        Ok(Self(capitalise(&name)))
    }

    /// Whether `raw_name` would be shown as the same name, ignoring case
    /// and which apostrophe is used.
    pub fn is_same_as(&self, raw_name: &str) -> bool {
        collation_key(&self.0) == collation_key(raw_name.trim())
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the name has already been validated,
    /// e.g. because it was read back from the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

fn capitalise(name: &str) -> String {
    let mut graphemes = name.graphemes(true);

    match graphemes.next() {
        Some(first) => {
            let rest = graphemes.collect::<String>();
            format!("{}{}", first.to_uppercase(), rest.to_lowercase())
        }
        None => String::new(),
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for CategoryName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ukrainian alphabetical order.
///
/// Letters compare by their position in the Ukrainian alphabet ignoring case,
/// separators sort before every letter, and the raw strings break ties.
impl Ord for CategoryName {
    fn cmp(&self, other: &Self) -> Ordering {
        collation_key(&self.0)
            .cmp(&collation_key(&other.0))
            .then_with(|| self.0.cmp(&other.0))
    }
}

fn collation_key(name: &str) -> Vec<(u8, u32)> {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if let Some(position) = SEPARATORS.iter().position(|&separator| separator == c) {
                // The apostrophes are equivalent to each other.
                (0, position.min(2) as u32)
            } else if let Some(position) = UKRAINIAN_ALPHABET.chars().position(|letter| letter == c)
            {
                (1, position as u32)
            } else {
                (2, c as u32)
            }
        })
        .collect()
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A user's expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
}

/// Form data for category creation and renaming.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
}
