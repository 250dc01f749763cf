//! `RandomMealPlanner` implementation and per-role selection.

use flavorfit_core::{
    CatalogStore, FoodItem, FoodService, MealPlan, MealPlanEntry, MealPlanError,
    MealPlanRequest, MealPlanner, MealRole, SafetyTier,
};
use log::debug;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

/// Configuration for [`RandomMealPlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealPlannerConfig {
    /// Most severe aggregated tier a food may have and still be planned.
    pub tier_ceiling: SafetyTier,
}

impl MealPlannerConfig {
    /// Plan only with foods rated `Recommended` or better for every
    /// condition.
    #[must_use]
    pub const fn recommended_only() -> Self {
        Self {
            tier_ceiling: SafetyTier::Recommended,
        }
    }
}

impl Default for MealPlannerConfig {
    /// Exclude only foods some condition says to avoid.
    fn default() -> Self {
        Self {
            tier_ceiling: SafetyTier::Caution,
        }
    }
}

/// Meal planner choosing one safe food per role at random.
///
/// The planner is generic over the catalogue store and keeps no state
/// between requests.
///
/// # Examples
/// ```rust
/// use flavorfit_core::{Category, FoodItem, MealPlanRequest, MealPlanner, MealRole, MemoryCatalog};
/// use flavorfit_planner::RandomMealPlanner;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = MemoryCatalog::builder()
///     .food(FoodItem::new(1, "Green Tea", Category::Drink)?)
///     .build()?;
/// let planner = RandomMealPlanner::new(catalog);
///
/// let request = MealPlanRequest::from_codes(["DM"], Vec::<String>::new(), 7)?;
/// let plan = planner.plan(&request)?;
/// assert_eq!(plan.len(), 1);
/// assert!(plan.entry(MealRole::Drink).is_some());
/// # Ok(())
/// # }
/// ```
pub struct RandomMealPlanner<S>
where
    S: CatalogStore,
{
    service: FoodService<S>,
    config: MealPlannerConfig,
}

impl<S> RandomMealPlanner<S>
where
    S: CatalogStore,
{
    /// Construct a planner using default configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, MealPlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    #[must_use]
    pub const fn with_config(store: S, config: MealPlannerConfig) -> Self {
        Self {
            service: FoodService::new(store),
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> MealPlannerConfig {
        self.config
    }
}

impl<S> MealPlanner for RandomMealPlanner<S>
where
    S: CatalogStore + Send + Sync,
{
    fn plan(&self, request: &MealPlanRequest) -> Result<MealPlan, MealPlanError> {
        let safe_foods = self.service.safe_foods(
            &request.conditions,
            &request.exclude_allergens,
            self.config.tier_ceiling,
        );
        debug!(
            "{} foods are at or below {} for {} condition(s)",
            safe_foods.len(),
            self.config.tier_ceiling,
            request.conditions.len()
        );

        let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
        let store = self.service.store();
        let entries = pick_per_role(&safe_foods, &mut rng)
            .into_iter()
            .map(|(role, food)| MealPlanEntry {
                role,
                food: food.clone(),
                calories: store.nutrition_for(food.id).map(|facts| facts.calories),
            })
            .collect();
        Ok(MealPlan::new(entries))
    }
}

/// Pick one food per role from a safe-food set.
///
/// Each role pool is sorted by id before drawing so the result depends only
/// on the set and the generator state. Roles with an empty pool are omitted.
/// Entries carry no calorie figures; [`RandomMealPlanner`] fills them from
/// the catalogue.
///
/// # Examples
/// ```rust
/// use flavorfit_core::{Category, FoodItem, MealRole};
/// use flavorfit_planner::select_meal;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// # fn main() -> Result<(), flavorfit_core::FoodItemError> {
/// let salmon = FoodItem::new(7, "Grilled Salmon", Category::Seafood)?;
/// let cake = FoodItem::new(8, "Chocolate Cake", Category::Dessert)?;
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
///
/// let plan = select_meal(&[&salmon, &cake], &mut rng);
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan.entry(MealRole::Protein).map(|e| e.food.id), Some(7));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn select_meal<R>(safe_foods: &[&FoodItem], rng: &mut R) -> MealPlan
where
    R: Rng + ?Sized,
{
    MealPlan::new(
        pick_per_role(safe_foods, rng)
            .into_iter()
            .map(|(role, food)| MealPlanEntry {
                role,
                food: food.clone(),
                calories: None,
            })
            .collect(),
    )
}

fn pick_per_role<'a, R>(
    safe_foods: &[&'a FoodItem],
    rng: &mut R,
) -> Vec<(MealRole, &'a FoodItem)>
where
    R: Rng + ?Sized,
{
    MealRole::ALL
        .into_iter()
        .filter_map(|role| {
            let mut pool: Vec<&FoodItem> = safe_foods
                .iter()
                .copied()
                .filter(|food| role.allows(food.category))
                .collect();
            pool.sort_by_key(|food| food.id);
            pool.dedup_by_key(|food| food.id);
            let choice = pool.choose(rng).copied();
            if choice.is_none() {
                debug!("no safe {role} foods; omitting the role");
            }
            choice.map(|food| (role, food))
        })
        .collect()
}
