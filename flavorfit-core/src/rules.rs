//! Nutrient threshold rules per health condition.
//!
//! Rules give a second opinion computed from nutrition facts alone. They are
//! advisory: curated recommendations stay authoritative and a missing
//! recommendation remains `Unrated` whatever the rules say.
//!
//! Each assessment starts at 100 points and deducts a fixed amount for every
//! violated check. Scores of 80 and above are `Safe`, 50 and above are
//! `Caution`, anything lower is `Avoid`. [`rank_catalog`] applies one rule to
//! every food and bands the results, best score first.

use std::cmp::Reverse;
use std::fmt;

use log::debug;

use crate::{AllergenLink, CatalogStore, ConditionCode, FoodId, FoodItem, NutritionFacts};

/// Starting score before deductions.
pub const FULL_SCORE: u8 = 100;

/// A single threshold or content check.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Check {
    /// Sugar must not exceed the limit in grams.
    MaxSugar(f64),
    /// Carbohydrates must not exceed the limit in grams.
    MaxCarbs(f64),
    /// Fibre must reach the limit in grams.
    MinFiber(f64),
    /// Calories must not exceed the limit.
    MaxCalories(f64),
    /// Sodium must not exceed the limit in milligrams.
    MaxSodium(f64),
    /// Fat must not exceed the limit in grams.
    MaxFat(f64),
    /// Protein must not exceed the limit in grams.
    MaxProtein(f64),
    /// The food must be free of gluten.
    ///
    /// Fails unless the food is flagged `gluten_free`, and also fails when an
    /// allergen link mentions gluten or wheat. A food whose flags were never
    /// filled in is therefore treated as containing gluten.
    NoGluten,
    /// The food must be free of lactose.
    ///
    /// Fails unless the food is flagged `dairy_free`, and also fails when an
    /// allergen link mentions dairy, lactose or milk.
    NoLactose,
    /// Purine content must be low or medium.
    LowPurine,
}

impl Check {
    /// Describe the violation, or return `None` when the food passes.
    fn violation(
        self,
        food: &FoodItem,
        facts: &NutritionFacts,
        links: &[AllergenLink],
    ) -> Option<String> {
        match self {
            Self::MaxSugar(limit) => (facts.sugar_g > limit)
                .then(|| format!("High sugar: {}g (max {limit}g)", facts.sugar_g)),
            Self::MaxCarbs(limit) => (facts.carbs_g > limit)
                .then(|| format!("High carbs: {}g (max {limit}g)", facts.carbs_g)),
            Self::MinFiber(limit) => (facts.fiber_g < limit)
                .then(|| format!("Low fiber: {}g (min {limit}g)", facts.fiber_g)),
            Self::MaxCalories(limit) => (facts.calories > limit)
                .then(|| format!("High calories: {} (max {limit})", facts.calories)),
            Self::MaxSodium(limit) => (facts.sodium_mg > limit)
                .then(|| format!("High sodium: {}mg (max {limit}mg)", facts.sodium_mg)),
            Self::MaxFat(limit) => {
                (facts.fat_g > limit).then(|| format!("High fat: {}g (max {limit}g)", facts.fat_g))
            }
            Self::MaxProtein(limit) => (facts.protein_g > limit)
                .then(|| format!("High protein: {}g (max {limit}g)", facts.protein_g)),
            Self::NoGluten => (!food.dietary.gluten_free || mentions(links, &["gluten", "wheat"]))
                .then(|| "Contains gluten".to_owned()),
            Self::NoLactose => (!food.dietary.dairy_free
                || mentions(links, &["dairy", "lactose", "milk"]))
            .then(|| "Contains lactose".to_owned()),
            Self::LowPurine => food
                .purine_level
                .filter(|level| level.is_high())
                .map(|level| format!("High purine level: {level}")),
        }
    }
}

fn mentions(links: &[AllergenLink], needles: &[&str]) -> bool {
    links.iter().any(|link| {
        let code = link.code.to_lowercase();
        let name = link.name.to_lowercase();
        needles
            .iter()
            .any(|needle| code.contains(needle) || name.contains(needle))
    })
}

/// A check paired with the points it costs when violated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleCheck {
    /// Condition to test.
    pub check: Check,
    /// Points deducted on violation.
    pub deduction: u8,
}

const fn rule(check: Check, deduction: u8) -> RuleCheck {
    RuleCheck { check, deduction }
}

/// The full set of checks for one health condition.
///
/// # Examples
/// ```
/// use flavorfit_core::{ConditionCode, ConditionRule};
///
/// let diabetes = ConditionRule::for_code(&ConditionCode::new("dm")).expect("built-in rule");
/// assert_eq!(diabetes.checks.len(), 4);
/// assert!(ConditionRule::for_code(&ConditionCode::new("XYZ")).is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionRule {
    /// Condition the rule applies to.
    pub condition: ConditionCode,
    /// Checks evaluated in order.
    pub checks: Vec<RuleCheck>,
}

impl ConditionRule {
    /// Built-in rules for the catalogue's standard conditions.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        ["DM", "CD", "HTN", "CKD", "LI", "GOUT", "IBS"]
            .into_iter()
            .filter_map(|code| Self::for_code(&ConditionCode::new(code)))
            .collect()
    }

    /// Built-in rule for a condition code, if one exists.
    #[must_use]
    pub fn for_code(code: &ConditionCode) -> Option<Self> {
        let checks = match code.as_str() {
            "DM" => vec![
                rule(Check::MaxSugar(15.0), 15),
                rule(Check::MaxCarbs(50.0), 20),
                rule(Check::MinFiber(2.0), 10),
                rule(Check::MaxCalories(400.0), 5),
            ],
            "CD" => vec![
                rule(Check::NoGluten, 50),
                rule(Check::MaxSodium(800.0), 10),
                rule(Check::MinFiber(3.0), 5),
            ],
            "HTN" => vec![
                rule(Check::MaxSodium(600.0), 25),
                rule(Check::MaxCalories(350.0), 10),
                rule(Check::MaxFat(15.0), 15),
            ],
            "CKD" => vec![
                rule(Check::MaxSodium(400.0), 25),
                rule(Check::MaxProtein(25.0), 20),
            ],
            "LI" => vec![rule(Check::NoLactose, 50)],
            "GOUT" => vec![
                rule(Check::LowPurine, 30),
                rule(Check::MaxSodium(700.0), 10),
            ],
            "IBS" => vec![rule(Check::MinFiber(5.0), 10), rule(Check::MaxFat(10.0), 20)],
            _ => return None,
        };
        Some(Self {
            condition: code.clone(),
            checks,
        })
    }
}

/// Outcome band of a rule assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RuleStatus {
    /// Score of at least 80.
    Safe,
    /// Score of at least 50.
    Caution,
    /// Score below 50.
    Avoid,
}

impl RuleStatus {
    /// Band a score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= 80 {
            Self::Safe
        } else if score >= 50 {
            Self::Caution
        } else {
            Self::Avoid
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Avoid => "avoid",
        })
    }
}

/// A violated check.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    /// The failed check.
    pub check: Check,
    /// Human-readable description.
    pub message: String,
    /// Points deducted.
    pub deduction: u8,
}

/// Result of evaluating one food against one condition rule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleAssessment {
    /// Condition evaluated.
    pub condition: ConditionCode,
    /// Outcome band.
    pub status: RuleStatus,
    /// Remaining score, never below zero.
    pub score: u8,
    /// First violation, or a note that every check passed.
    pub reason: String,
    /// Every violated check in rule order.
    pub violations: Vec<Violation>,
}

/// Evaluate a food against a condition rule.
///
/// # Examples
/// ```
/// use flavorfit_core::{
///     Category, ConditionCode, ConditionRule, FoodItem, NutritionFacts, RuleStatus, assess,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let burger = FoodItem::new(1, "Hamburger", Category::FastFood)?;
/// let facts = NutritionFacts {
///     sodium_mg: 1100.0,
///     calories: 520.0,
///     fat_g: 28.0,
///     ..NutritionFacts::default()
/// };
/// let rule = ConditionRule::for_code(&ConditionCode::new("HTN")).ok_or("missing rule")?;
///
/// let outcome = assess(&burger, &facts, &[], &rule);
/// assert_eq!(outcome.score, 50);
/// assert_eq!(outcome.status, RuleStatus::Caution);
/// assert!(outcome.reason.starts_with("High sodium"));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn assess(
    food: &FoodItem,
    nutrition: &NutritionFacts,
    links: &[AllergenLink],
    rule: &ConditionRule,
) -> RuleAssessment {
    let violations: Vec<Violation> = rule
        .checks
        .iter()
        .filter_map(|entry| {
            entry
                .check
                .violation(food, nutrition, links)
                .map(|message| Violation {
                    check: entry.check,
                    message,
                    deduction: entry.deduction,
                })
        })
        .collect();

    let score = violations
        .iter()
        .fold(FULL_SCORE, |score, violation| score.saturating_sub(violation.deduction));
    let reason = violations
        .first()
        .map_or_else(|| "Meets dietary requirements".to_owned(), |v| v.message.clone());

    RuleAssessment {
        condition: rule.condition.clone(),
        status: RuleStatus::from_score(score),
        score,
        reason,
        violations,
    }
}

/// One food's place in a condition ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedFood {
    /// Food identifier.
    pub id: FoodId,
    /// Display name.
    pub name: String,
    /// Rule score.
    pub score: u8,
    /// First violation, or the all-clear note.
    pub reason: String,
}

/// Every assessable food banded by rule status for one condition.
///
/// Each band is ordered by score descending, then name, then id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleRanking {
    /// Condition the rule applies to.
    pub condition: ConditionCode,
    /// Foods scoring 80 or more.
    pub safe: Vec<RankedFood>,
    /// Foods scoring 50 to 79.
    pub caution: Vec<RankedFood>,
    /// Foods scoring below 50.
    pub avoid: Vec<RankedFood>,
}

impl RuleRanking {
    /// Foods in one band.
    #[must_use]
    pub fn band(&self, status: RuleStatus) -> &[RankedFood] {
        match status {
            RuleStatus::Safe => &self.safe,
            RuleStatus::Caution => &self.caution,
            RuleStatus::Avoid => &self.avoid,
        }
    }

    /// The best `max_items` safe foods with the size of every band.
    #[must_use]
    pub fn shortlist(&self, max_items: usize) -> RuleShortlist {
        RuleShortlist {
            condition: self.condition.clone(),
            safe_foods: self.safe.iter().take(max_items).cloned().collect(),
            all_safe: self.safe.len(),
            total_caution: self.caution.len(),
            total_avoid: self.avoid.len(),
        }
    }
}

/// Top safe foods for a condition plus band counts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleShortlist {
    /// Condition the rule applies to.
    pub condition: ConditionCode,
    /// Best safe foods, at most the requested number.
    pub safe_foods: Vec<RankedFood>,
    /// Size of the whole safe band.
    pub all_safe: usize,
    /// Size of the caution band.
    pub total_caution: usize,
    /// Size of the avoid band.
    pub total_avoid: usize,
}

/// Assess every food with nutrition facts against `rule` and band the
/// outcomes.
///
/// Foods without nutrition facts cannot be assessed and are left out.
#[must_use]
pub fn rank_catalog<S>(store: &S, rule: &ConditionRule) -> RuleRanking
where
    S: CatalogStore + ?Sized,
{
    let mut ranking = RuleRanking {
        condition: rule.condition.clone(),
        safe: Vec::new(),
        caution: Vec::new(),
        avoid: Vec::new(),
    };
    let mut skipped = 0_usize;
    for food in store.all_foods() {
        let Some(facts) = store.nutrition_for(food.id) else {
            skipped = skipped.saturating_add(1);
            continue;
        };
        let outcome = assess(food, facts, store.allergens_for(food.id), rule);
        let entry = RankedFood {
            id: food.id,
            name: food.name.clone(),
            score: outcome.score,
            reason: outcome.reason,
        };
        match outcome.status {
            RuleStatus::Safe => ranking.safe.push(entry),
            RuleStatus::Caution => ranking.caution.push(entry),
            RuleStatus::Avoid => ranking.avoid.push(entry),
        }
    }
    if skipped > 0 {
        debug!(
            "{skipped} food(s) without nutrition facts left out of the {} ranking",
            rule.condition
        );
    }
    for band in [&mut ranking.safe, &mut ranking.caution, &mut ranking.avoid] {
        band.sort_by_cached_key(|entry| {
            (Reverse(entry.score), entry.name.to_lowercase(), entry.id)
        });
    }
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HAMBURGER, sample_catalog};
    use crate::{Category, DietaryFlags, MemoryCatalog, PurineLevel};
    use rstest::{fixture, rstest};

    #[fixture]
    fn gluten_free_food() -> FoodItem {
        FoodItem::new(1, "Green Tea", Category::Drink)
            .expect("valid food")
            .with_dietary(DietaryFlags {
                vegetarian: true,
                vegan: true,
                gluten_free: true,
                dairy_free: true,
            })
    }

    fn rule_for(code: &str) -> ConditionRule {
        ConditionRule::for_code(&ConditionCode::new(code)).expect("built-in rule")
    }

    #[rstest]
    fn clean_food_meets_requirements(gluten_free_food: FoodItem) {
        let facts = NutritionFacts {
            fiber_g: 6.0,
            ..NutritionFacts::default()
        };
        for rule in ConditionRule::defaults() {
            let outcome = assess(&gluten_free_food, &facts, &[], &rule);
            assert_eq!(outcome.score, FULL_SCORE, "{}", rule.condition);
            assert_eq!(outcome.reason, "Meets dietary requirements");
        }
    }

    #[rstest]
    fn diabetes_deductions_accumulate(gluten_free_food: FoodItem) {
        let facts = NutritionFacts {
            sugar_g: 45.0,
            carbs_g: 52.0,
            fiber_g: 2.0,
            calories: 380.0,
            ..NutritionFacts::default()
        };
        let outcome = assess(&gluten_free_food, &facts, &[], &rule_for("DM"));
        assert_eq!(outcome.score, 65);
        assert_eq!(outcome.status, RuleStatus::Caution);
        assert_eq!(outcome.violations.len(), 2);
        assert_eq!(outcome.reason, "High sugar: 45g (max 15g)");
    }

    #[rstest]
    fn gluten_is_detected_from_flags() {
        let pizza = FoodItem::new(3, "Margherita Pizza", Category::Italian).expect("valid food");
        let facts = NutritionFacts {
            sodium_mg: 920.0,
            fiber_g: 5.0,
            ..NutritionFacts::default()
        };
        let outcome = assess(&pizza, &facts, &[], &rule_for("CD"));
        assert_eq!(outcome.score, 40);
        assert_eq!(outcome.status, RuleStatus::Avoid);
        assert_eq!(outcome.reason, "Contains gluten");
    }

    #[rstest]
    fn high_purine_fails_gout(gluten_free_food: FoodItem) {
        let steak = gluten_free_food.with_purine_level(PurineLevel::VeryHigh);
        let outcome = assess(&steak, &NutritionFacts::default(), &[], &rule_for("GOUT"));
        assert_eq!(outcome.score, 70);
        assert_eq!(outcome.reason, "High purine level: very_high");
    }

    #[rstest]
    #[case(100, RuleStatus::Safe)]
    #[case(80, RuleStatus::Safe)]
    #[case(79, RuleStatus::Caution)]
    #[case(50, RuleStatus::Caution)]
    #[case(49, RuleStatus::Avoid)]
    #[case(0, RuleStatus::Avoid)]
    fn statuses_band_scores(#[case] score: u8, #[case] expected: RuleStatus) {
        assert_eq!(RuleStatus::from_score(score), expected);
    }

    #[rstest]
    fn scores_never_drop_below_zero(gluten_free_food: FoodItem) {
        let rule = ConditionRule {
            condition: ConditionCode::new("X"),
            checks: vec![rule(Check::MaxSugar(0.0), 90), rule(Check::MaxFat(0.0), 90)],
        };
        let facts = NutritionFacts {
            sugar_g: 1.0,
            fat_g: 1.0,
            ..NutritionFacts::default()
        };
        assert_eq!(assess(&gluten_free_food, &facts, &[], &rule).score, 0);
    }
    #[rstest]
    fn gluten_is_detected_from_allergen_links(gluten_free_food: FoodItem) {
        let catalog = MemoryCatalog::builder()
            .food(gluten_free_food)
            .allergen(crate::Allergen {
                id: 1,
                name: "Wheat".into(),
                code: "wheat".into(),
                severity_warning: String::new(),
            })
            .link_allergen(1, 1, crate::AllergenSeverity::Traces)
            .build()
            .expect("valid catalogue");
        let food = catalog.food(1).expect("food present");
        let facts = NutritionFacts {
            fiber_g: 5.0,
            ..NutritionFacts::default()
        };
        let outcome = assess(food, &facts, catalog.allergens_for(1), &rule_for("CD"));
        assert_eq!(outcome.reason, "Contains gluten");
    }

    #[rstest]
    fn unfilled_dietary_flags_count_as_containing_gluten_and_lactose() {
        let unknown = FoodItem::new(8, "House Special", Category::Indian).expect("valid food");
        let facts = NutritionFacts {
            fiber_g: 5.0,
            ..NutritionFacts::default()
        };
        assert_eq!(
            assess(&unknown, &facts, &[], &rule_for("CD")).reason,
            "Contains gluten"
        );
        assert_eq!(
            assess(&unknown, &facts, &[], &rule_for("LI")).reason,
            "Contains lactose"
        );
    }

    fn food_with(
        id: FoodId,
        name: &str,
        sodium_mg: f64,
        protein_g: f64,
    ) -> (FoodItem, NutritionFacts) {
        let food = FoodItem::new(id, name, Category::Protein).expect("valid food");
        let facts = NutritionFacts {
            sodium_mg,
            protein_g,
            ..NutritionFacts::default()
        };
        (food, facts)
    }

    #[rstest]
    fn ranking_bands_and_orders_by_score() {
        let mut builder = MemoryCatalog::builder();
        for (id, name, sodium, protein) in [
            (1, "Salted Fish", 900.0, 30.0),
            (2, "Broth", 450.0, 0.0),
            (3, "Apple", 0.0, 0.0),
            (4, "Almonds", 0.0, 0.0),
            (5, "Cured Ham", 1200.0, 0.0),
        ] {
            let (food, facts) = food_with(id, name, sodium, protein);
            builder = builder.food(food).nutrition(id, facts);
        }
        let catalog = builder
            .food(FoodItem::new(6, "Mystery Dish", Category::Protein).expect("valid food"))
            .build()
            .expect("valid catalogue");

        let ranking = rank_catalog(&catalog, &rule_for("CKD"));
        let ids = |band: &[RankedFood]| band.iter().map(|entry| entry.id).collect::<Vec<_>>();
        assert_eq!(ids(ranking.band(RuleStatus::Safe)), vec![4, 3]);
        assert_eq!(ids(ranking.band(RuleStatus::Caution)), vec![2, 5, 1]);
        assert!(ranking.avoid.is_empty());
        assert_eq!(ranking.caution[0].reason, "High sodium: 450mg (max 400mg)");
        assert_eq!(ranking.caution[2].score, 55);
    }

    #[rstest]
    fn shortlist_caps_safe_foods_and_counts_bands() {
        let catalog = sample_catalog();
        let ranking = rank_catalog(&catalog, &rule_for("HTN"));
        let shortlist = ranking.shortlist(2);
        assert!(shortlist.safe_foods.len() <= 2);
        assert_eq!(shortlist.all_safe, ranking.safe.len());
        assert_eq!(
            shortlist.all_safe + shortlist.total_caution + shortlist.total_avoid,
            ranking.safe.len() + ranking.caution.len() + ranking.avoid.len()
        );
        assert!(
            shortlist
                .safe_foods
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );
        assert!(ranking.caution.iter().any(|entry| entry.id == HAMBURGER));
    }
}
