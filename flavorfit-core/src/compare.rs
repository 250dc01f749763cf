//! Side-by-side comparison of two foods.

use crate::{
    AggregatedVerdict, AllergenLink, CatalogStore, ConditionCode, ConditionSafety, ConditionSet,
    FoodId, FoodItem, InvalidInput, NutrientDifference, NutritionFacts, aggregate,
};

/// Allergen disclosure for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllergenSummary {
    /// The food has no allergen links.
    None,
    /// The food's allergen links.
    Listed(Vec<AllergenLink>),
}

impl AllergenSummary {
    fn from_links(links: &[AllergenLink]) -> Self {
        if links.is_empty() {
            Self::None
        } else {
            Self::Listed(links.to_vec())
        }
    }

    /// Links as a slice; empty for [`AllergenSummary::None`].
    #[must_use]
    pub fn links(&self) -> &[AllergenLink] {
        match self {
            Self::None => &[],
            Self::Listed(links) => links,
        }
    }
}

/// Safe/unsafe classification of a food for one condition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionClassification {
    /// Condition classified.
    pub condition: ConditionCode,
    /// Classification drawn from the aggregated verdict.
    pub safety: ConditionSafety,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparedFood {
    /// The food.
    pub food: FoodItem,
    /// Nutrition snapshot, `None` when the catalogue has no facts.
    pub nutrition: Option<NutritionFacts>,
    /// Allergen disclosure.
    pub allergens: AllergenSummary,
    /// Aggregated verdict when conditions were supplied.
    pub verdict: Option<AggregatedVerdict>,
    /// Per-condition classification when conditions were supplied.
    pub classifications: Vec<ConditionClassification>,
}

impl ComparedFood {
    fn load<S>(
        store: &S,
        id: FoodId,
        conditions: Option<&ConditionSet>,
    ) -> Result<Self, InvalidInput>
    where
        S: CatalogStore + ?Sized,
    {
        let food = store.food(id).ok_or(InvalidInput::UnknownFood { id })?;
        let verdict = conditions.map(|set| aggregate(id, store.recommendations_for(id), set));
        let classifications = verdict
            .iter()
            .flat_map(|verdict| verdict.conditions.iter())
            .map(|entry| ConditionClassification {
                condition: entry.condition.clone(),
                safety: entry.safety(),
            })
            .collect();
        Ok(Self {
            food: food.clone(),
            nutrition: store.nutrition_for(id).copied(),
            allergens: AllergenSummary::from_links(store.allergens_for(id)),
            verdict,
            classifications,
        })
    }
}

/// Structured comparison of two distinct foods.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoodComparison {
    /// The first food requested.
    pub first: ComparedFood,
    /// The second food requested.
    pub second: ComparedFood,
    /// Second minus first, when both sides have nutrition facts.
    pub difference: Option<NutrientDifference>,
}

/// Compare two foods, optionally classifying both for a condition set.
///
/// # Errors
/// Returns [`InvalidInput::IdenticalFoods`] when `first == second` and
/// [`InvalidInput::UnknownFood`] when either identifier does not resolve.
///
/// # Examples
/// ```
/// use flavorfit_core::{Category, FoodItem, InvalidInput, MemoryCatalog, compare};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = MemoryCatalog::builder()
///     .food(FoodItem::new(1, "Green Tea", Category::Drink)?)
///     .build()?;
/// assert_eq!(
///     compare(&catalog, 1, 1, None),
///     Err(InvalidInput::IdenticalFoods { id: 1 })
/// );
/// # Ok(())
/// # }
/// ```
pub fn compare<S>(
    store: &S,
    first: FoodId,
    second: FoodId,
    conditions: Option<&ConditionSet>,
) -> Result<FoodComparison, InvalidInput>
where
    S: CatalogStore + ?Sized,
{
    if first == second {
        return Err(InvalidInput::IdenticalFoods { id: first });
    }
    let first = ComparedFood::load(store, first, conditions)?;
    let second = ComparedFood::load(store, second, conditions)?;
    let difference = first
        .nutrition
        .as_ref()
        .zip(second.nutrition.as_ref())
        .map(|(a, b)| NutrientDifference::between(a, b));
    Ok(FoodComparison {
        first,
        second,
        difference,
    })
}
