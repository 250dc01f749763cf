//! Read access to an immutable catalogue snapshot.
//!
//! The `CatalogStore` trait exposes the records every derivation needs: the
//! foods themselves, their nutrition facts, allergen links and curated
//! recommendations. Implementations load data once and then serve borrowed
//! views, so a store can be shared between threads without locking.

use crate::{
    Allergen, AllergenLink, FoodId, FoodItem, HealthCondition, NutritionFacts, Recommendation,
};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::{CatalogError, MemoryCatalog, MemoryCatalogBuilder};
#[cfg(feature = "serde")]
pub use memory::{CatalogSnapshot, FoodAllergenRecord, NutritionRecord};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteCatalog, SqliteCatalogError};

/// Read-only access to catalogue records.
///
/// Lookups for unknown identifiers return `None` or an empty slice rather
/// than failing; resolving identifiers is the caller's concern.
///
/// # Examples
///
/// ```rust
/// use flavorfit_core::{Category, CatalogStore, FoodItem, MemoryCatalog};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = MemoryCatalog::builder()
///     .food(FoodItem::new(1, "Green Tea", Category::Drink)?)
///     .build()?;
///
/// let names: Vec<_> = catalog.all_foods().map(|food| food.name.as_str()).collect();
/// assert_eq!(names, vec!["Green Tea"]);
/// assert!(catalog.recommendations_for(1).is_empty());
/// # Ok(())
/// # }
/// ```
pub trait CatalogStore {
    /// Iterate over every food in ascending id order.
    fn all_foods(&self) -> Box<dyn Iterator<Item = &FoodItem> + Send + '_>;

    /// Resolve a single food.
    fn food(&self, id: FoodId) -> Option<&FoodItem>;

    /// Curated recommendation rows for a food, across all conditions.
    fn recommendations_for(&self, id: FoodId) -> &[Recommendation];

    /// Allergen links for a food.
    fn allergens_for(&self, id: FoodId) -> &[AllergenLink];

    /// Nutrition facts for a food when the catalogue has them.
    fn nutrition_for(&self, id: FoodId) -> Option<&NutritionFacts>;

    /// Every catalogued health condition.
    fn conditions(&self) -> &[HealthCondition];

    /// Every catalogued allergen.
    fn allergens(&self) -> &[Allergen];
}

impl<S: CatalogStore + ?Sized> CatalogStore for &S {
    fn all_foods(&self) -> Box<dyn Iterator<Item = &FoodItem> + Send + '_> {
        (**self).all_foods()
    }

    fn food(&self, id: FoodId) -> Option<&FoodItem> {
        (**self).food(id)
    }

    fn recommendations_for(&self, id: FoodId) -> &[Recommendation] {
        (**self).recommendations_for(id)
    }

    fn allergens_for(&self, id: FoodId) -> &[AllergenLink] {
        (**self).allergens_for(id)
    }

    fn nutrition_for(&self, id: FoodId) -> Option<&NutritionFacts> {
        (**self).nutrition_for(id)
    }

    fn conditions(&self) -> &[HealthCondition] {
        (**self).conditions()
    }

    fn allergens(&self) -> &[Allergen] {
        (**self).allergens()
    }
}
