//! In-memory catalogue snapshot and its builder.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::{debug, warn};
use thiserror::Error;

use crate::{
    Allergen, AllergenId, AllergenLink, AllergenSeverity, ConditionCode, FoodId, FoodItem,
    FoodItemError, HealthCondition, NutritionError, NutritionFacts, Recommendation,
};

use super::CatalogStore;

/// Error raised when assembling a catalogue snapshot.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two foods shared an identifier.
    #[error("food {id} appears more than once")]
    DuplicateFood {
        /// Repeated identifier.
        id: FoodId,
    },
    /// Two allergens shared an identifier.
    #[error("allergen {id} appears more than once")]
    DuplicateAllergen {
        /// Repeated identifier.
        id: AllergenId,
    },
    /// A record referenced a food that is not in the catalogue.
    #[error("{record} references unknown food {id}")]
    UnknownFood {
        /// Kind of record holding the dangling reference.
        record: &'static str,
        /// Unresolved identifier.
        id: FoodId,
    },
    /// An allergen link referenced an allergen that is not in the catalogue.
    #[error("food {food_id} is linked to unknown allergen {allergen_id}")]
    UnknownAllergen {
        /// Food holding the link.
        food_id: FoodId,
        /// Unresolved allergen identifier.
        allergen_id: AllergenId,
    },
    /// A food record failed validation.
    #[error("invalid food {id}: {source}")]
    InvalidFood {
        /// Rejected food.
        id: FoodId,
        /// Validation failure.
        #[source]
        source: FoodItemError,
    },
    /// Nutrition facts failed validation.
    #[error("invalid nutrition facts for food {id}: {source}")]
    InvalidNutrition {
        /// Food the facts belong to.
        id: FoodId,
        /// Validation failure.
        #[source]
        source: NutritionError,
    },
    /// A JSON snapshot could not be decoded.
    #[cfg(feature = "serde")]
    #[error("failed to decode catalogue snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable, fully indexed catalogue held in memory.
///
/// Every other store implementation loads into one of these.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    foods: BTreeMap<FoodId, FoodItem>,
    nutrition: BTreeMap<FoodId, NutritionFacts>,
    links: BTreeMap<FoodId, Vec<AllergenLink>>,
    recommendations: BTreeMap<FoodId, Vec<Recommendation>>,
    conditions: Vec<HealthCondition>,
    allergens: Vec<Allergen>,
}

impl MemoryCatalog {
    /// Start building a catalogue.
    #[must_use]
    pub fn builder() -> MemoryCatalogBuilder {
        MemoryCatalogBuilder::default()
    }

    /// Number of foods in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    /// Report whether the catalogue holds no foods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl CatalogStore for MemoryCatalog {
    fn all_foods(&self) -> Box<dyn Iterator<Item = &FoodItem> + Send + '_> {
        Box::new(self.foods.values())
    }

    fn food(&self, id: FoodId) -> Option<&FoodItem> {
        self.foods.get(&id)
    }

    fn recommendations_for(&self, id: FoodId) -> &[Recommendation] {
        self.recommendations.get(&id).map_or(&[], Vec::as_slice)
    }

    fn allergens_for(&self, id: FoodId) -> &[AllergenLink] {
        self.links.get(&id).map_or(&[], Vec::as_slice)
    }

    fn nutrition_for(&self, id: FoodId) -> Option<&NutritionFacts> {
        self.nutrition.get(&id)
    }

    fn conditions(&self) -> &[HealthCondition] {
        &self.conditions
    }

    fn allergens(&self) -> &[Allergen] {
        &self.allergens
    }
}

/// Collects catalogue records and validates them into a [`MemoryCatalog`].
///
/// # Examples
///
/// ```rust
/// use flavorfit_core::{
///     Allergen, AllergenSeverity, Category, CatalogStore, FoodItem, MemoryCatalog,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let gluten = Allergen {
///     id: 1,
///     name: "Gluten".into(),
///     code: "gluten".into(),
///     severity_warning: String::new(),
/// };
/// let catalog = MemoryCatalog::builder()
///     .food(FoodItem::new(4, "Margherita Pizza", Category::Italian)?)
///     .allergen(gluten)
///     .link_allergen(4, 1, AllergenSeverity::Contains)
///     .build()?;
/// assert_eq!(catalog.allergens_for(4)[0].code, "gluten");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogBuilder {
    foods: Vec<FoodItem>,
    nutrition: Vec<(FoodId, NutritionFacts)>,
    allergens: Vec<Allergen>,
    links: Vec<(FoodId, AllergenId, AllergenSeverity)>,
    conditions: Vec<HealthCondition>,
    recommendations: Vec<Recommendation>,
}

impl MemoryCatalogBuilder {
    /// Add a food.
    #[must_use]
    pub fn food(mut self, food: FoodItem) -> Self {
        self.foods.push(food);
        self
    }

    /// Add several foods.
    #[must_use]
    pub fn foods<I: IntoIterator<Item = FoodItem>>(mut self, foods: I) -> Self {
        self.foods.extend(foods);
        self
    }

    /// Attach nutrition facts to a food.
    #[must_use]
    pub fn nutrition(mut self, food_id: FoodId, facts: NutritionFacts) -> Self {
        self.nutrition.push((food_id, facts));
        self
    }

    /// Add an allergen definition.
    #[must_use]
    pub fn allergen(mut self, allergen: Allergen) -> Self {
        self.allergens.push(allergen);
        self
    }

    /// Link a food to an allergen by identifier.
    #[must_use]
    pub fn link_allergen(
        mut self,
        food_id: FoodId,
        allergen_id: AllergenId,
        severity: AllergenSeverity,
    ) -> Self {
        self.links.push((food_id, allergen_id, severity));
        self
    }

    /// Add a health condition definition.
    #[must_use]
    pub fn condition(mut self, condition: HealthCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a curated recommendation row.
    #[must_use]
    pub fn recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendations.push(recommendation);
        self
    }

    /// Validate the collected records and index them.
    ///
    /// # Errors
    /// Returns a [`CatalogError`] for invalid foods, duplicate identifiers,
    /// dangling references and invalid nutrition facts.
    pub fn build(self) -> Result<MemoryCatalog, CatalogError> {
        let mut foods = BTreeMap::new();
        for food in self.foods {
            food.validate()
                .map_err(|source| CatalogError::InvalidFood { id: food.id, source })?;
            match foods.entry(food.id) {
                Entry::Vacant(slot) => {
                    slot.insert(food);
                }
                Entry::Occupied(slot) => {
                    return Err(CatalogError::DuplicateFood { id: *slot.key() });
                }
            }
        }

        let mut allergen_index: BTreeMap<AllergenId, &Allergen> = BTreeMap::new();
        for allergen in &self.allergens {
            if allergen_index.insert(allergen.id, allergen).is_some() {
                return Err(CatalogError::DuplicateAllergen { id: allergen.id });
            }
        }

        let mut nutrition = BTreeMap::new();
        for (id, facts) in self.nutrition {
            ensure_food(&foods, "nutrition facts", id)?;
            let facts = facts
                .validated()
                .map_err(|source| CatalogError::InvalidNutrition { id, source })?;
            nutrition.insert(id, facts);
        }

        let mut links: BTreeMap<FoodId, Vec<AllergenLink>> = BTreeMap::new();
        for (food_id, allergen_id, severity) in self.links {
            ensure_food(&foods, "allergen link", food_id)?;
            let allergen = allergen_index.get(&allergen_id).ok_or(
                CatalogError::UnknownAllergen {
                    food_id,
                    allergen_id,
                },
            )?;
            links
                .entry(food_id)
                .or_default()
                .push(AllergenLink::new(food_id, allergen, severity));
        }
        for food_links in links.values_mut() {
            food_links.sort();
            food_links.dedup();
        }

        let known_codes: Vec<&ConditionCode> =
            self.conditions.iter().map(|condition| &condition.code).collect();
        let mut recommendations: BTreeMap<FoodId, Vec<Recommendation>> = BTreeMap::new();
        for row in self.recommendations {
            ensure_food(&foods, "recommendation", row.food_id)?;
            if !known_codes.is_empty() && !known_codes.contains(&&row.condition) {
                warn!(
                    "recommendation for food {} names uncatalogued condition {}",
                    row.food_id, row.condition
                );
            }
            recommendations.entry(row.food_id).or_default().push(row);
        }

        let mut allergens = self.allergens;
        allergens.sort_by_key(|allergen| allergen.id);
        let mut conditions = self.conditions;
        conditions.sort_by_key(|condition| condition.id);

        debug!(
            "built catalogue with {} foods, {} allergens, {} conditions",
            foods.len(),
            allergens.len(),
            conditions.len()
        );

        Ok(MemoryCatalog {
            foods,
            nutrition,
            links,
            recommendations,
            conditions,
            allergens,
        })
    }
}

fn ensure_food(
    foods: &BTreeMap<FoodId, FoodItem>,
    record: &'static str,
    id: FoodId,
) -> Result<(), CatalogError> {
    if foods.contains_key(&id) {
        Ok(())
    } else {
        Err(CatalogError::UnknownFood { record, id })
    }
}

#[cfg(feature = "serde")]
mod snapshot {
    use std::io::Read;

    use serde::{Deserialize, Serialize};

    use super::{CatalogError, MemoryCatalog};
    use crate::{
        Allergen, AllergenId, AllergenSeverity, CatalogStore, FoodId, FoodItem,
        HealthCondition, NutritionFacts, Recommendation,
    };

    /// Nutrition facts keyed by food in a serialised snapshot.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct NutritionRecord {
        /// Food the facts describe.
        pub food_id: FoodId,
        /// The facts themselves.
        #[serde(flatten)]
        pub facts: NutritionFacts,
    }

    /// Food-allergen association in a serialised snapshot.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FoodAllergenRecord {
        /// Linked food.
        pub food_id: FoodId,
        /// Linked allergen.
        pub allergen_id: AllergenId,
        /// Severity of the association.
        pub severity: AllergenSeverity,
    }

    /// Serialisable form of a whole catalogue.
    ///
    /// Every table defaults to empty so partial snapshots load.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct CatalogSnapshot {
        /// Foods.
        pub foods: Vec<FoodItem>,
        /// Nutrition facts.
        pub nutrition: Vec<NutritionRecord>,
        /// Allergen definitions.
        pub allergens: Vec<Allergen>,
        /// Food-allergen links.
        pub food_allergens: Vec<FoodAllergenRecord>,
        /// Health condition definitions.
        pub conditions: Vec<HealthCondition>,
        /// Curated recommendations.
        pub recommendations: Vec<Recommendation>,
    }

    impl MemoryCatalog {
        /// Validate and index a decoded snapshot.
        ///
        /// # Errors
        /// Returns the same errors as
        /// [`MemoryCatalogBuilder::build`](super::MemoryCatalogBuilder::build).
        pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, CatalogError> {
            let mut builder = Self::builder().foods(snapshot.foods);
            for record in snapshot.nutrition {
                builder = builder.nutrition(record.food_id, record.facts);
            }
            for allergen in snapshot.allergens {
                builder = builder.allergen(allergen);
            }
            for link in snapshot.food_allergens {
                builder = builder.link_allergen(link.food_id, link.allergen_id, link.severity);
            }
            for condition in snapshot.conditions {
                builder = builder.condition(condition);
            }
            for row in snapshot.recommendations {
                builder = builder.recommendation(row);
            }
            builder.build()
        }

        /// Decode a JSON snapshot.
        ///
        /// # Errors
        /// Returns [`CatalogError::Json`] for malformed JSON and the builder
        /// errors for inconsistent records.
        pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
            let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
            Self::from_snapshot(snapshot)
        }

        /// Decode a JSON snapshot from a reader.
        ///
        /// # Errors
        /// As for [`MemoryCatalog::from_json_str`].
        pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
            let snapshot: CatalogSnapshot = serde_json::from_reader(reader)?;
            Self::from_snapshot(snapshot)
        }

        /// Export the catalogue as a snapshot.
        #[must_use]
        pub fn to_snapshot(&self) -> CatalogSnapshot {
            let foods: Vec<FoodItem> = self.all_foods().cloned().collect();
            let nutrition = self
                .nutrition
                .iter()
                .map(|(food_id, facts)| NutritionRecord {
                    food_id: *food_id,
                    facts: *facts,
                })
                .collect();
            let food_allergens = self
                .links
                .values()
                .flatten()
                .map(|link| FoodAllergenRecord {
                    food_id: link.food_id,
                    allergen_id: link.allergen_id,
                    severity: link.severity,
                })
                .collect();
            let recommendations = self.recommendations.values().flatten().cloned().collect();
            CatalogSnapshot {
                foods,
                nutrition,
                allergens: self.allergens.clone(),
                food_allergens,
                conditions: self.conditions.clone(),
                recommendations,
            }
        }
    }
}

#[cfg(feature = "serde")]
pub use snapshot::{CatalogSnapshot, FoodAllergenRecord, NutritionRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, RecommendationType, SafetyScore};
    use rstest::rstest;

    fn food(id: FoodId, name: &str) -> FoodItem {
        FoodItem::new(id, name, Category::Protein).expect("valid food")
    }

    fn gluten() -> Allergen {
        Allergen {
            id: 1,
            name: "Gluten".into(),
            code: "gluten".into(),
            severity_warning: String::new(),
        }
    }

    #[rstest]
    fn duplicate_food_ids_are_rejected() {
        let result = MemoryCatalog::builder()
            .food(food(1, "Grilled Chicken"))
            .food(food(1, "Salmon"))
            .build();
        assert!(matches!(result, Err(CatalogError::DuplicateFood { id: 1 })));
    }

    #[rstest]
    fn dangling_recommendation_is_rejected() {
        let score = SafetyScore::new(8).expect("valid score");
        let result = MemoryCatalog::builder()
            .food(food(1, "Grilled Chicken"))
            .recommendation(Recommendation::new(
                9,
                "DM",
                RecommendationType::Recommended,
                score,
            ))
            .build();
        assert!(matches!(
            result,
            Err(CatalogError::UnknownFood {
                record: "recommendation",
                id: 9
            })
        ));
    }

    #[rstest]
    fn unknown_allergen_link_is_rejected() {
        let result = MemoryCatalog::builder()
            .food(food(1, "Grilled Chicken"))
            .link_allergen(1, 42, AllergenSeverity::Traces)
            .build();
        assert!(matches!(
            result,
            Err(CatalogError::UnknownAllergen {
                food_id: 1,
                allergen_id: 42
            })
        ));
    }

    #[rstest]
    fn invalid_nutrition_names_the_food() {
        let facts = NutritionFacts {
            sodium_mg: -1.0,
            ..NutritionFacts::default()
        };
        let result = MemoryCatalog::builder()
            .food(food(3, "Grilled Chicken"))
            .nutrition(3, facts)
            .build();
        assert!(matches!(
            result,
            Err(CatalogError::InvalidNutrition { id: 3, .. })
        ));
    }

    #[rstest]
    fn links_carry_allergen_code_and_name() {
        let catalog = MemoryCatalog::builder()
            .food(food(1, "Margherita Pizza"))
            .allergen(gluten())
            .link_allergen(1, 1, AllergenSeverity::Contains)
            .build()
            .expect("valid catalogue");
        let links = catalog.allergens_for(1);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Gluten");
        assert!(catalog.allergens_for(2).is_empty());
    }

    #[rstest]
    fn foods_iterate_in_id_order() {
        let catalog = MemoryCatalog::builder()
            .food(food(3, "Salmon"))
            .food(food(1, "Grilled Chicken"))
            .build()
            .expect("valid catalogue");
        let ids: Vec<FoodId> = catalog.all_foods().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn json_snapshot_loads() {
        let json = r#"{
            "foods": [{"id": 1, "name": "Margherita Pizza", "category": "Italian"}],
            "nutrition": [{"food_id": 1, "calories": 266.0, "sodium_mg": 598.0}],
            "allergens": [{"id": 1, "name": "Gluten", "code": "gluten"}],
            "food_allergens": [{"food_id": 1, "allergen_id": 1, "severity": "Contains"}],
            "recommendations": [{
                "food_id": 1,
                "condition": "cd",
                "recommendation_type": "Avoid",
                "safety_score": 1
            }]
        }"#;
        let catalog = MemoryCatalog::from_json_str(json).expect("valid snapshot");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.recommendations_for(1)[0].condition.as_str(), "CD");
        let calories = catalog.nutrition_for(1).map(|facts| facts.calories);
        assert_eq!(calories, Some(266.0));
    }

    #[rstest]
    fn blank_food_names_are_rejected() {
        let mut unnamed = food(5, "Green Tea");
        unnamed.name = "  ".to_owned();
        let result = MemoryCatalog::builder().food(unnamed).build();
        assert!(matches!(
            result,
            Err(CatalogError::InvalidFood {
                id: 5,
                source: FoodItemError::BlankName { id: 5 }
            })
        ));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn blank_food_names_in_snapshots_are_rejected() {
        let json = r#"{"foods": [{"id": 1, "name": "   ", "category": "Drink"}]}"#;
        assert!(matches!(
            MemoryCatalog::from_json_str(json),
            Err(CatalogError::InvalidFood { id: 1, .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn out_of_range_score_fails_to_decode() {
        let json = r#"{
            "foods": [{"id": 1, "name": "Hamburger", "category": "FastFood"}],
            "recommendations": [{
                "food_id": 1,
                "condition": "DM",
                "recommendation_type": "Avoid",
                "safety_score": 11
            }]
        }"#;
        assert!(matches!(
            MemoryCatalog::from_json_str(json),
            Err(CatalogError::Json(_))
        ));
    }
}
