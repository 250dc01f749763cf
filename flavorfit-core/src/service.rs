//! Caller-facing operations over a catalogue store.
//!
//! [`FoodService`] bundles the derivations a front end needs: filtered food
//! listings, multi-condition recommendations, comparisons and nutrient rule
//! assessments. Condition codes arrive as raw strings and are validated here,
//! so every operation that needs conditions rejects an empty set.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    AggregatedVerdict, Allergen, AllergenExclusion, CatalogStore, Category, ConditionCode,
    ConditionRule, ConditionSet, DietaryFlags, FoodComparison, FoodId, FoodItem, FoodQuery,
    HealthCondition, InvalidInput, MealPlan, MealPlanError, MealPlanRequest, MealPlanner,
    NutritionFacts, RuleAssessment, RuleRanking, RuleShortlist, SafetyTier, SortKey, aggregate,
    aggregate_catalog, assess, compare, rank_catalog, search,
};

/// Filter accepted by [`FoodService::list_foods`].
///
/// `conditions` is optional: `None` lists foods without verdicts, while
/// `Some` must name at least one condition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FoodFilter {
    /// Keep only this category when set.
    pub category: Option<Category>,
    /// Free-text query.
    pub search_text: String,
    /// Allergens to avoid.
    pub exclude_allergens: AllergenExclusion,
    /// Result ordering.
    pub sort_key: SortKey,
    /// Condition codes used to compute verdicts.
    pub conditions: Option<Vec<String>>,
}

/// Nutrition figures shown in food listings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadlineNutrition {
    /// Energy in kilocalories.
    pub calories: f64,
    /// Protein in grams.
    pub protein_g: f64,
    /// Carbohydrates in grams.
    pub carbs_g: f64,
    /// Fat in grams.
    pub fat_g: f64,
    /// Sodium in milligrams.
    pub sodium_mg: f64,
    /// Fiber in grams.
    pub fiber_g: f64,
    /// Sugar in grams.
    pub sugar_g: f64,
}

impl From<&NutritionFacts> for HeadlineNutrition {
    fn from(facts: &NutritionFacts) -> Self {
        Self {
            calories: facts.calories,
            protein_g: facts.protein_g,
            carbs_g: facts.carbs_g,
            fat_g: facts.fat_g,
            sodium_mg: facts.sodium_mg,
            fiber_g: facts.fiber_g,
            sugar_g: facts.sugar_g,
        }
    }
}

/// One row of a food listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoodSummary {
    /// Food identifier.
    pub id: FoodId,
    /// Display name.
    pub name: String,
    /// Menu category.
    pub category: Category,
    /// Dietary flags.
    pub dietary: DietaryFlags,
    /// Headline nutrition when the catalogue has facts.
    pub nutrition: Option<HeadlineNutrition>,
    /// Codes of linked allergens.
    pub allergens: Vec<String>,
    /// Aggregated verdict when conditions were supplied.
    pub verdict: Option<AggregatedVerdict>,
}

/// Read-only operations over a catalogue.
///
/// # Examples
/// ```rust
/// use flavorfit_core::{FoodFilter, FoodService, MemoryCatalog, SortKey};
/// use flavorfit_core::{Category, FoodItem};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = MemoryCatalog::builder()
///     .food(FoodItem::new(1, "Green Tea", Category::Drink)?)
///     .food(FoodItem::new(2, "Garden Salad", Category::Vegetarian)?)
///     .build()?;
/// let service = FoodService::new(catalog);
///
/// let filter = FoodFilter {
///     sort_key: SortKey::Name,
///     ..FoodFilter::default()
/// };
/// let names: Vec<String> = service
///     .list_foods(&filter)?
///     .into_iter()
///     .map(|summary| summary.name)
///     .collect();
/// assert_eq!(names, vec!["Garden Salad", "Green Tea"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FoodService<S> {
    store: S,
}

impl<S: CatalogStore> FoodService<S> {
    /// Wrap a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// List foods after allergen, category and text filtering, in the
    /// requested order.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyConditionSet`] when `filter.conditions`
    /// is present but holds no usable code.
    pub fn list_foods(&self, filter: &FoodFilter) -> Result<Vec<FoodSummary>, InvalidInput> {
        let mut verdicts = filter
            .conditions
            .as_ref()
            .map(|codes| ConditionSet::new(codes).map(|set| aggregate_catalog(&self.store, &set)))
            .transpose()?;
        let query = FoodQuery {
            category: filter.category,
            text: filter.search_text.clone(),
            exclude_allergens: filter.exclude_allergens.clone(),
            sort: filter.sort_key,
        };
        let listing = search(&self.store, &query, verdicts.as_ref());
        debug!("food listing matched {} of the catalogue's foods", listing.len());
        Ok(listing
            .iter()
            .map(|food| {
                let verdict = verdicts.as_mut().and_then(|all| all.remove(&food.id));
                self.summarise(food, verdict)
            })
            .collect())
    }

    /// Aggregate every food for the given condition codes.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyConditionSet`] when no usable code is
    /// supplied.
    pub fn get_recommendations<I>(
        &self,
        codes: I,
    ) -> Result<BTreeMap<FoodId, AggregatedVerdict>, InvalidInput>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let conditions = ConditionSet::new(codes)?;
        Ok(aggregate_catalog(&self.store, &conditions))
    }

    /// Group food identifiers by their aggregated tier.
    ///
    /// Tiers without foods are omitted; identifiers are in ascending order.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyConditionSet`] when no usable code is
    /// supplied.
    pub fn recommendations_by_tier<I>(
        &self,
        codes: I,
    ) -> Result<BTreeMap<SafetyTier, Vec<FoodId>>, InvalidInput>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut groups: BTreeMap<SafetyTier, Vec<FoodId>> = BTreeMap::new();
        for (id, verdict) in self.get_recommendations(codes)? {
            groups.entry(verdict.tier).or_default().push(id);
        }
        Ok(groups)
    }

    /// Compare two foods, classifying both when condition codes are given.
    ///
    /// # Errors
    /// Returns [`InvalidInput`] for identical or unknown identifiers, or when
    /// `conditions` is present but empty.
    pub fn compare_foods(
        &self,
        first: FoodId,
        second: FoodId,
        conditions: Option<&[String]>,
    ) -> Result<FoodComparison, InvalidInput> {
        let set = conditions.map(ConditionSet::new).transpose()?;
        compare(&self.store, first, second, set.as_ref())
    }

    /// Generate a meal plan with the supplied planner.
    ///
    /// # Errors
    /// Propagates the planner's [`MealPlanError`].
    pub fn generate_meal_plan<P>(
        &self,
        planner: &P,
        request: &MealPlanRequest,
    ) -> Result<MealPlan, MealPlanError>
    where
        P: MealPlanner + ?Sized,
    {
        let plan = planner.plan(request)?;
        debug!(
            "meal plan for {} condition(s) has {} entries",
            request.conditions.len(),
            plan.len()
        );
        Ok(plan)
    }

    /// Foods passing the allergen filter whose aggregated tier is no worse
    /// than `ceiling`, in ascending id order.
    #[must_use]
    pub fn safe_foods(
        &self,
        conditions: &ConditionSet,
        exclusion: &AllergenExclusion,
        ceiling: SafetyTier,
    ) -> Vec<&FoodItem> {
        self.store
            .all_foods()
            .filter(|food| exclusion.passes(self.store.allergens_for(food.id)))
            .filter(|food| {
                aggregate(food.id, self.store.recommendations_for(food.id), conditions).tier
                    <= ceiling
            })
            .collect()
    }

    /// Evaluate a food against the built-in nutrient rule for a condition.
    ///
    /// Returns `Ok(None)` when the catalogue has no nutrition facts for the
    /// food. The outcome is advisory and never alters curated verdicts.
    ///
    /// # Errors
    /// Returns [`InvalidInput::UnknownFood`] for an unresolved identifier,
    /// [`InvalidInput::EmptyConditionSet`] for a blank code and
    /// [`InvalidInput::NoConditionRule`] when no rule exists for the code.
    pub fn assess_food(
        &self,
        id: FoodId,
        condition: &str,
    ) -> Result<Option<RuleAssessment>, InvalidInput> {
        let food = self.store.food(id).ok_or(InvalidInput::UnknownFood { id })?;
        let code = ConditionCode::new(condition);
        if code.is_blank() {
            return Err(InvalidInput::EmptyConditionSet);
        }
        let rule = ConditionRule::for_code(&code).ok_or(InvalidInput::NoConditionRule { code })?;
        Ok(self
            .store
            .nutrition_for(id)
            .map(|facts| assess(food, facts, self.store.allergens_for(id), &rule)))
    }

    /// Rank every food with nutrition facts against the built-in rule of
    /// each condition, in condition-code order.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyConditionSet`] when no usable code is
    /// supplied and [`InvalidInput::NoConditionRule`] for a code without a
    /// built-in rule.
    pub fn rule_rankings<I>(&self, codes: I) -> Result<Vec<RuleRanking>, InvalidInput>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let conditions = ConditionSet::new(codes)?;
        conditions
            .iter()
            .map(|code| {
                ConditionRule::for_code(code)
                    .map(|rule| rank_catalog(&self.store, &rule))
                    .ok_or_else(|| InvalidInput::NoConditionRule { code: code.clone() })
            })
            .collect()
    }

    /// The best `max_items` rule-safe foods per condition with band counts.
    ///
    /// # Errors
    /// As for [`FoodService::rule_rankings`].
    pub fn rule_shortlists<I>(
        &self,
        codes: I,
        max_items: usize,
    ) -> Result<Vec<RuleShortlist>, InvalidInput>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Ok(self
            .rule_rankings(codes)?
            .iter()
            .map(|ranking| ranking.shortlist(max_items))
            .collect())
    }

    /// Every catalogued health condition.
    #[must_use]
    pub fn conditions(&self) -> &[HealthCondition] {
        self.store.conditions()
    }

    /// Every catalogued allergen.
    #[must_use]
    pub fn allergens(&self) -> &[Allergen] {
        self.store.allergens()
    }

    /// Every menu category.
    #[expect(
        clippy::unused_self,
        reason = "categories are listed alongside the store-backed listings"
    )]
    #[must_use]
    pub const fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    fn summarise(&self, food: &FoodItem, verdict: Option<AggregatedVerdict>) -> FoodSummary {
        FoodSummary {
            id: food.id,
            name: food.name.clone(),
            category: food.category,
            dietary: food.dietary,
            nutrition: self.store.nutrition_for(food.id).map(HeadlineNutrition::from),
            allergens: self
                .store
                .allergens_for(food.id)
                .iter()
                .map(|link| link.code.clone())
                .collect(),
            verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        CHOCOLATE_CAKE, GARDEN_SALAD, GREEN_TEA, GRILLED_CHICKEN, HAMBURGER, MARGHERITA_PIZZA,
        MINERAL_WATER, sample_catalog,
    };
    use crate::{MealRole, MemoryCatalog, RuleStatus};
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> FoodService<MemoryCatalog> {
        FoodService::new(sample_catalog())
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[rstest]
    fn listing_without_conditions_has_no_verdicts(service: FoodService<MemoryCatalog>) {
        let summaries = service
            .list_foods(&FoodFilter::default())
            .expect("no conditions requested");
        assert_eq!(summaries.len(), 11);
        assert!(summaries.iter().all(|summary| summary.verdict.is_none()));
    }

    #[rstest]
    fn listing_with_blank_conditions_is_rejected(service: FoodService<MemoryCatalog>) {
        let filter = FoodFilter {
            conditions: Some(codes(&["  "])),
            ..FoodFilter::default()
        };
        assert_eq!(
            service.list_foods(&filter),
            Err(InvalidInput::EmptyConditionSet)
        );
    }

    #[rstest]
    fn listing_carries_verdicts_and_allergens(service: FoodService<MemoryCatalog>) {
        let filter = FoodFilter {
            search_text: "pizza".to_owned(),
            conditions: Some(codes(&["CD"])),
            ..FoodFilter::default()
        };
        let summaries = service.list_foods(&filter).expect("valid filter");
        let [pizza] = summaries.as_slice() else {
            panic!("expected one match, got {summaries:?}");
        };
        assert_eq!(pizza.id, MARGHERITA_PIZZA);
        assert_eq!(pizza.allergens, vec!["gluten", "dairy"]);
        let tier = pizza.verdict.as_ref().map(|verdict| verdict.tier);
        assert_eq!(tier, Some(SafetyTier::Avoid));
        assert!(pizza.nutrition.is_some());
    }

    #[rstest]
    fn hamburger_is_avoided_for_diabetes_and_hypertension(service: FoodService<MemoryCatalog>) {
        let verdicts = service
            .get_recommendations(["DM", "HTN"])
            .expect("valid codes");
        let burger = &verdicts[&HAMBURGER];
        assert_eq!(burger.tier, SafetyTier::Avoid);
        assert_eq!(burger.score.map(crate::SafetyScore::get), Some(2));
    }

    #[rstest]
    fn mineral_water_is_unrated(service: FoodService<MemoryCatalog>) {
        let verdicts = service.get_recommendations(["DM"]).expect("valid codes");
        assert_eq!(verdicts[&MINERAL_WATER].tier, SafetyTier::Unrated);
        assert_eq!(verdicts[&MINERAL_WATER].score, None);
    }

    #[rstest]
    fn recommendations_need_conditions(service: FoodService<MemoryCatalog>) {
        assert_eq!(
            service.get_recommendations(Vec::<String>::new()),
            Err(InvalidInput::EmptyConditionSet)
        );
    }

    #[rstest]
    fn tiers_group_every_food(service: FoodService<MemoryCatalog>) {
        let groups = service.recommendations_by_tier(["DM"]).expect("valid codes");
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, 11);
        assert!(groups[&SafetyTier::Avoid].contains(&CHOCOLATE_CAKE));
        assert!(groups[&SafetyTier::HighlyRecommended].contains(&GREEN_TEA));
    }

    #[rstest]
    fn compare_foods_validates_codes(service: FoodService<MemoryCatalog>) {
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            service.compare_foods(HAMBURGER, GRILLED_CHICKEN, Some(&empty)),
            Err(InvalidInput::EmptyConditionSet)
        );
        let comparison = service
            .compare_foods(HAMBURGER, GRILLED_CHICKEN, None)
            .expect("valid ids");
        assert_eq!(comparison.first.food.id, HAMBURGER);
    }

    #[rstest]
    fn safe_foods_respect_ceiling_and_allergens(service: FoodService<MemoryCatalog>) {
        let conditions = ConditionSet::new(["DM"]).expect("valid set");
        let exclusion = AllergenExclusion::new(["gluten"]);
        let ids: Vec<FoodId> = service
            .safe_foods(&conditions, &exclusion, SafetyTier::Recommended)
            .into_iter()
            .map(|food| food.id)
            .collect();
        assert!(ids.contains(&GARDEN_SALAD));
        assert!(!ids.contains(&MINERAL_WATER));
        assert!(!ids.contains(&HAMBURGER));
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    struct FirstSafeFood;

    impl MealPlanner for FirstSafeFood {
        fn plan(&self, _request: &MealPlanRequest) -> Result<MealPlan, MealPlanError> {
            Ok(MealPlan::new(vec![crate::MealPlanEntry {
                role: MealRole::Drink,
                food: crate::test_support::food(GREEN_TEA, "Green Tea", Category::Drink),
                calories: Some(2.0),
            }]))
        }
    }

    #[rstest]
    fn meal_plans_delegate_to_the_planner(service: FoodService<MemoryCatalog>) {
        let request = MealPlanRequest::from_codes(["DM"], Vec::<String>::new(), 3)
            .expect("valid request");
        let plan = service
            .generate_meal_plan(&FirstSafeFood, &request)
            .expect("plan");
        assert_eq!(plan.len(), 1);
    }

    #[rstest]
    fn assessment_uses_built_in_rules(service: FoodService<MemoryCatalog>) {
        let outcome = service
            .assess_food(HAMBURGER, "htn")
            .expect("valid request")
            .expect("hamburger has nutrition facts");
        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.status, RuleStatus::Caution);
        assert_eq!(outcome.violations.len(), 3);
    }

    #[rstest]
    #[case(HAMBURGER, "XYZ", InvalidInput::NoConditionRule { code: ConditionCode::new("XYZ") })]
    #[case(HAMBURGER, " ", InvalidInput::EmptyConditionSet)]
    #[case(404, "DM", InvalidInput::UnknownFood { id: 404 })]
    fn assessment_rejects_bad_input(
        service: FoodService<MemoryCatalog>,
        #[case] id: FoodId,
        #[case] code: &str,
        #[case] expected: InvalidInput,
    ) {
        assert_eq!(service.assess_food(id, code), Err(expected));
    }

    #[rstest]
    fn rule_rankings_follow_condition_order(service: FoodService<MemoryCatalog>) {
        let rankings = service.rule_rankings(["htn", "DM"]).expect("valid codes");
        let conditions: Vec<&str> = rankings
            .iter()
            .map(|ranking| ranking.condition.as_str())
            .collect();
        assert_eq!(conditions, vec!["DM", "HTN"]);
        let hypertension = &rankings[1];
        assert!(hypertension.band(RuleStatus::Caution).iter().any(|f| f.id == HAMBURGER));
    }

    #[rstest]
    fn rule_shortlists_cap_safe_foods(service: FoodService<MemoryCatalog>) {
        let shortlists = service.rule_shortlists(["DM"], 1).expect("valid codes");
        let [diabetes] = shortlists.as_slice() else {
            panic!("expected one shortlist, got {shortlists:?}");
        };
        assert!(diabetes.safe_foods.len() <= 1);
        assert!(diabetes.all_safe >= diabetes.safe_foods.len());
    }

    #[rstest]
    #[case(&["XYZ"], InvalidInput::NoConditionRule { code: ConditionCode::new("XYZ") })]
    #[case(&[" "], InvalidInput::EmptyConditionSet)]
    fn rule_rankings_reject_bad_codes(
        service: FoodService<MemoryCatalog>,
        #[case] codes: &[&str],
        #[case] expected: InvalidInput,
    ) {
        assert_eq!(service.rule_rankings(codes), Err(expected));
    }

    #[rstest]
    fn listings_expose_catalogue_reference_data(service: FoodService<MemoryCatalog>) {
        assert_eq!(service.conditions().len(), 7);
        assert_eq!(service.allergens().len(), 6);
        assert_eq!(service.categories().len(), 9);
    }
}
