//! Meal-plan roles, requests and the planner trait.

use std::fmt;

use thiserror::Error;

use crate::{AllergenExclusion, Category, ConditionSet, FoodItem, InvalidInput};

/// A slot in a meal plan.
///
/// Each role draws from a fixed set of categories.
///
/// # Examples
/// ```
/// use flavorfit_core::{Category, MealRole};
///
/// assert_eq!(MealRole::for_category(Category::Seafood), Some(MealRole::Protein));
/// assert_eq!(MealRole::for_category(Category::Dessert), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MealRole {
    /// Main protein: Protein, Seafood or Meat.
    Protein,
    /// Side dish: Vegetarian or Indian.
    Side,
    /// Drink.
    Drink,
}

impl MealRole {
    /// Roles in plan order.
    pub const ALL: [Self; 3] = [Self::Protein, Self::Side, Self::Drink];

    /// Categories the role draws from.
    #[must_use]
    pub const fn categories(self) -> &'static [Category] {
        match self {
            Self::Protein => &[Category::Protein, Category::Seafood, Category::Meat],
            Self::Side => &[Category::Vegetarian, Category::Indian],
            Self::Drink => &[Category::Drink],
        }
    }

    /// Report whether a category belongs to the role's pool.
    #[must_use]
    pub fn allows(self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// Role whose pool contains the category, if any.
    #[must_use]
    pub fn for_category(category: Category) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.allows(category))
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Protein => "Protein",
            Self::Side => "Side",
            Self::Drink => "Drink",
        }
    }
}

impl fmt::Display for MealRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One selected food, tagged with its role.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MealPlanEntry {
    /// Slot the food fills.
    pub role: MealRole,
    /// The chosen food.
    pub food: FoodItem,
    /// Calories per serving when the catalogue has nutrition facts.
    pub calories: Option<f64>,
}

/// A generated meal: at most one entry per role, in role order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MealPlan {
    entries: Vec<MealPlanEntry>,
    total_calories: f64,
}

impl MealPlan {
    /// Build a plan, ordering entries by role and keeping the first entry
    /// for each role.
    #[must_use]
    pub fn new(mut entries: Vec<MealPlanEntry>) -> Self {
        entries.sort_by_key(|entry| entry.role);
        entries.dedup_by_key(|entry| entry.role);
        let total_calories = entries.iter().filter_map(|entry| entry.calories).sum();
        Self {
            entries,
            total_calories,
        }
    }

    /// Entries in role order.
    #[must_use]
    pub fn entries(&self) -> &[MealPlanEntry] {
        &self.entries
    }

    /// Entry for a role, if the role's pool was non-empty.
    #[must_use]
    pub fn entry(&self, role: MealRole) -> Option<&MealPlanEntry> {
        self.entries.iter().find(|entry| entry.role == role)
    }

    /// Sum of known calories across entries.
    #[must_use]
    pub const fn total_calories(&self) -> f64 {
        self.total_calories
    }

    /// Number of entries; never more than three.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether every role pool was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parameters for a meal-plan request.
///
/// # Examples
/// ```rust
/// use flavorfit_core::{AllergenExclusion, ConditionSet, MealPlanRequest};
///
/// # fn main() -> Result<(), flavorfit_core::InvalidInput> {
/// let request = MealPlanRequest {
///     conditions: ConditionSet::new(["DM"])?,
///     exclude_allergens: AllergenExclusion::new(["gluten"]),
///     seed: 7,
/// };
/// assert_eq!(request.seed, 7);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MealPlanRequest {
    /// Conditions the plan must respect.
    pub conditions: ConditionSet,
    /// Allergens the plan must avoid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exclude_allergens: AllergenExclusion,
    /// Seed for reproducible selection.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: u64,
}

impl MealPlanRequest {
    /// Build a request from raw condition codes and allergen entries.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyConditionSet`] when no condition code is
    /// given.
    pub fn from_codes<C, A>(
        conditions: C,
        exclude_allergens: A,
        seed: u64,
    ) -> Result<Self, InvalidInput>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Ok(Self {
            conditions: ConditionSet::new(conditions)?,
            exclude_allergens: AllergenExclusion::new(exclude_allergens),
            seed,
        })
    }
}

/// Errors returned by [`MealPlanner::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MealPlanError {
    /// The request could not be processed.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
}

/// Generate a meal plan for a request.
///
/// An empty role pool is not an error; the role is simply omitted.
/// Planners must be `Send + Sync` to serve concurrent requests.
pub trait MealPlanner: Send + Sync {
    /// Produce a plan for the request.
    fn plan(&self, request: &MealPlanRequest) -> Result<MealPlan, MealPlanError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::food;
    use rstest::rstest;

    struct FixedPlanner(MealPlan);

    impl MealPlanner for FixedPlanner {
        fn plan(&self, _request: &MealPlanRequest) -> Result<MealPlan, MealPlanError> {
            Ok(self.0.clone())
        }
    }

    fn entry(role: MealRole, id: u64, name: &str, category: Category, kcal: f64) -> MealPlanEntry {
        MealPlanEntry {
            role,
            food: food(id, name, category),
            calories: Some(kcal),
        }
    }

    #[rstest]
    #[case(Category::Protein, Some(MealRole::Protein))]
    #[case(Category::Meat, Some(MealRole::Protein))]
    #[case(Category::Indian, Some(MealRole::Side))]
    #[case(Category::Vegetarian, Some(MealRole::Side))]
    #[case(Category::Drink, Some(MealRole::Drink))]
    #[case(Category::Italian, None)]
    #[case(Category::FastFood, None)]
    fn roles_cover_fixed_categories(#[case] category: Category, #[case] role: Option<MealRole>) {
        assert_eq!(MealRole::for_category(category), role);
    }

    #[rstest]
    fn plans_sort_by_role_and_total_calories() {
        let plan = MealPlan::new(vec![
            entry(MealRole::Drink, 6, "Green Tea", Category::Drink, 2.0),
            entry(MealRole::Protein, 4, "Grilled Chicken", Category::Protein, 165.0),
        ]);
        let roles: Vec<MealRole> = plan.entries().iter().map(|e| e.role).collect();
        assert_eq!(roles, vec![MealRole::Protein, MealRole::Drink]);
        assert_eq!(plan.total_calories(), 167.0);
        assert!(plan.entry(MealRole::Side).is_none());
    }

    #[rstest]
    fn planners_are_usable_as_trait_objects() {
        let planner: Box<dyn MealPlanner> = Box::new(FixedPlanner(MealPlan::default()));
        let request = MealPlanRequest::from_codes(["DM"], ["gluten"], 1).expect("valid request");
        let plan = planner.plan(&request).expect("fixed plan");
        assert!(plan.is_empty());
    }

    #[rstest]
    fn requests_need_conditions() {
        let result = MealPlanRequest::from_codes(Vec::<&str>::new(), ["gluten"], 1);
        assert_eq!(result, Err(InvalidInput::EmptyConditionSet));
    }
}
