use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One product category swept by the scan scheduler.
///
/// `search_terms` are the query templates sent to real sources; `keywords`
/// is the vocabulary the synthetic generator draws product nouns from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub search_terms: Vec<String>,
    pub keywords: Vec<String>,
}

/// Most search templates a category may carry; a trending keyword makes
/// the third query.
pub const MAX_SEARCH_TERMS: usize = 2;

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<Category>,
}

fn category(slug: &str, name: &str, search_terms: &[&str], keywords: &[&str]) -> Category {
    Category {
        slug: slug.to_string(),
        name: name.to_string(),
        search_terms: search_terms.iter().map(|s| (*s).to_string()).collect(),
        keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// The built-in category catalogue, in sweep order.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    vec![
        category(
            "electronics",
            "Electronics",
            &["trending electronics gadgets", "best selling tech accessories"],
            &[
                "Wireless Earbuds",
                "Phone Stand",
                "LED Strip Lights",
                "Mini Projector",
                "Power Bank",
                "Smart Plug",
                "Bluetooth Speaker",
                "Ring Light",
            ],
        ),
        category(
            "home-kitchen",
            "Home & Kitchen",
            &["viral kitchen gadgets", "home organization products"],
            &[
                "Vegetable Chopper",
                "Electric Milk Frother",
                "Drawer Organizer",
                "Silicone Baking Mat",
                "Oil Sprayer",
                "Magnetic Spice Rack",
                "Portable Blender",
            ],
        ),
        category(
            "beauty",
            "Beauty & Personal Care",
            &["trending beauty tools", "skincare devices"],
            &[
                "Ice Roller",
                "Scalp Massager",
                "Heatless Curling Rod",
                "Gua Sha Set",
                "Facial Steamer",
                "Lash Curler",
            ],
        ),
        category(
            "fitness",
            "Fitness",
            &["home workout equipment", "fitness accessories"],
            &[
                "Resistance Bands",
                "Massage Gun",
                "Ab Roller",
                "Smart Jump Rope",
                "Yoga Mat",
                "Grip Strengthener",
            ],
        ),
        category(
            "pets",
            "Pet Supplies",
            &["trending pet products", "dog accessories"],
            &[
                "Pet Hair Remover",
                "Lick Mat",
                "Cat Water Fountain",
                "Dog Car Seat Cover",
                "Interactive Cat Toy",
                "Slow Feeder Bowl",
            ],
        ),
        category(
            "fashion",
            "Fashion Accessories",
            &["trending fashion accessories", "minimalist jewelry"],
            &[
                "Claw Clip",
                "Crossbody Phone Bag",
                "Layered Necklace",
                "Blue Light Glasses",
                "Silk Scrunchie",
                "Canvas Tote",
            ],
        ),
        category(
            "toys-games",
            "Toys & Games",
            &["viral toys", "educational toys for kids"],
            &[
                "Fidget Cube",
                "Magnetic Tiles",
                "Montessori Busy Board",
                "Bubble Machine",
                "Kinetic Sand Kit",
                "Stacking Game",
            ],
        ),
        category(
            "outdoor",
            "Outdoor & Travel",
            &["camping gadgets", "travel accessories"],
            &[
                "Collapsible Water Bottle",
                "Solar Lantern",
                "Packing Cubes",
                "Neck Fan",
                "Camping Hammock",
                "Waterproof Phone Pouch",
            ],
        ),
    ]
}

/// Load and validate a category catalogue from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<Vec<Category>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CategoriesFile = serde_yaml::from_str(&content)?;
    validate_categories(&file.categories)?;

    Ok(file.categories)
}

/// The catalogue file named by `categories_path`, or the built-ins when unset.
///
/// # Errors
///
/// Returns `ConfigError` if a configured file cannot be loaded.
pub fn configured_categories(categories_path: Option<&Path>) -> Result<Vec<Category>, ConfigError> {
    match categories_path {
        Some(path) => load_categories(path),
        None => Ok(default_categories()),
    }
}

fn validate_categories(categories: &[Category]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category is required".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();

    for category in categories {
        if category.slug.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category slug must be non-empty".to_string(),
            ));
        }

        if !seen_slugs.insert(category.slug.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category slug: '{}'",
                category.slug
            )));
        }

        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' needs a display name",
                category.slug
            )));
        }

        let terms = category
            .search_terms
            .iter()
            .filter(|t| !t.trim().is_empty())
            .count();
        if terms == 0 || terms > MAX_SEARCH_TERMS {
            return Err(ConfigError::Validation(format!(
                "category '{}' needs 1 to {MAX_SEARCH_TERMS} search terms, got {terms}",
                category.slug
            )));
        }

        if category.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' needs at least one keyword",
                category.slug
            )));
        }
    }

    Ok(())
}
