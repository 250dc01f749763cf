//! Safety aggregation across several health conditions.
//!
//! A user may hold several conditions at once. Each condition contributes one
//! [`SafetyTier`] per food and the worst tier wins. The dominance order is
//!
//! `Avoid > Caution > Unrated > Recommended > HighlyRecommended`
//!
//! where `Unrated` stands for "no curated row for this condition". Missing data
//! is therefore never read as recommended, nor as a hard avoid.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use log::warn;

use crate::{
    CatalogStore, ConditionCode, ConditionSet, FoodId, Recommendation, RecommendationType,
    SafetyScore,
};

/// Severity tier used when combining conditions.
///
/// Ranks are explicit so the order never depends on string comparison:
/// `HighlyRecommended = 0`, `Recommended = 1`, `Unrated = 2`, `Caution = 3`,
/// `Avoid = 4`.
///
/// # Examples
/// ```
/// use flavorfit_core::SafetyTier;
///
/// assert!(SafetyTier::Avoid > SafetyTier::Caution);
/// assert!(SafetyTier::Caution > SafetyTier::Unrated);
/// assert!(SafetyTier::Unrated > SafetyTier::Recommended);
/// assert_eq!(SafetyTier::Unrated.rank(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SafetyTier {
    /// Every rated condition calls the food highly recommended.
    HighlyRecommended = 0,
    /// Recommended for the conditions considered.
    Recommended = 1,
    /// At least one condition has no curated rating.
    Unrated = 2,
    /// At least one condition advises caution.
    Caution = 3,
    /// At least one condition says to avoid the food.
    Avoid = 4,
}

impl SafetyTier {
    /// Every tier from least to most severe.
    pub const ALL: [Self; 5] = [
        Self::HighlyRecommended,
        Self::Recommended,
        Self::Unrated,
        Self::Caution,
        Self::Avoid,
    ];

    /// Integer rank; larger is more restrictive.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// `HighlyRecommended` or `Recommended`.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::HighlyRecommended | Self::Recommended)
    }

    /// `Caution` or `Avoid`.
    #[must_use]
    pub const fn is_unsafe(self) -> bool {
        matches!(self, Self::Caution | Self::Avoid)
    }

    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "Highly Recommended",
            Self::Recommended => "Recommended",
            Self::Unrated => "Unrated",
            Self::Caution => "Caution",
            Self::Avoid => "Avoid",
        }
    }
}

impl From<RecommendationType> for SafetyTier {
    fn from(value: RecommendationType) -> Self {
        match value {
            RecommendationType::HighlyRecommended => Self::HighlyRecommended,
            RecommendationType::Recommended => Self::Recommended,
            RecommendationType::Caution => Self::Caution,
            RecommendationType::Avoid => Self::Avoid,
        }
    }
}

impl fmt::Display for SafetyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse per-condition classification used for disclosure and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConditionSafety {
    /// Rated `HighlyRecommended` or `Recommended`.
    Safe,
    /// Rated `Caution` or `Avoid`.
    Unsafe,
    /// No curated rating.
    Unrated,
}

impl From<SafetyTier> for ConditionSafety {
    fn from(tier: SafetyTier) -> Self {
        if tier.is_safe() {
            Self::Safe
        } else if tier.is_unsafe() {
            Self::Unsafe
        } else {
            Self::Unrated
        }
    }
}

/// The rating a food received for one condition of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionVerdict {
    /// Condition the entry describes.
    pub condition: ConditionCode,
    /// Curated type, `None` when unrated.
    pub recommendation_type: Option<RecommendationType>,
    /// Curated score, `None` when unrated.
    pub score: Option<SafetyScore>,
    /// Curated reasoning, `None` when unrated.
    pub reasoning: Option<String>,
}

impl ConditionVerdict {
    fn rated(condition: ConditionCode, row: &Recommendation) -> Self {
        Self {
            condition,
            recommendation_type: Some(row.recommendation_type),
            score: Some(row.safety_score),
            reasoning: Some(row.reasoning.clone()),
        }
    }

    const fn unrated(condition: ConditionCode) -> Self {
        Self {
            condition,
            recommendation_type: None,
            score: None,
            reasoning: None,
        }
    }

    /// Tier contributed by this condition.
    #[must_use]
    pub fn tier(&self) -> SafetyTier {
        self.recommendation_type
            .map_or(SafetyTier::Unrated, SafetyTier::from)
    }

    /// Safe/unsafe/unrated classification.
    #[must_use]
    pub fn safety(&self) -> ConditionSafety {
        ConditionSafety::from(self.tier())
    }
}

/// Combined verdict for one food across a set of conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatedVerdict {
    /// Food the verdict describes.
    pub food_id: FoodId,
    /// Most restrictive tier across the set.
    pub tier: SafetyTier,
    /// Minimum score across rated conditions; `None` when none are rated.
    pub score: Option<SafetyScore>,
    /// Per-condition entries in condition-code order.
    pub conditions: Vec<ConditionVerdict>,
}

impl AggregatedVerdict {
    /// `Recommended` or better overall.
    #[must_use]
    pub const fn is_recommended(&self) -> bool {
        self.tier.is_safe()
    }

    /// Look up the entry for one condition.
    #[must_use]
    pub fn condition(&self, code: &ConditionCode) -> Option<&ConditionVerdict> {
        self.conditions.iter().find(|entry| &entry.condition == code)
    }

    /// Conditions for which the food is rated safe.
    pub fn safe_for(&self) -> impl Iterator<Item = &ConditionCode> {
        self.conditions
            .iter()
            .filter(|entry| entry.tier().is_safe())
            .map(|entry| &entry.condition)
    }

    /// Conditions for which the food is rated unsafe.
    pub fn unsafe_for(&self) -> impl Iterator<Item = &ConditionCode> {
        self.conditions
            .iter()
            .filter(|entry| entry.tier().is_unsafe())
            .map(|entry| &entry.condition)
    }
}

/// Combine a food's recommendation rows into one verdict.
///
/// Rows for conditions outside `conditions` are ignored. When a condition has
/// several rows the most restrictive one is kept and a warning is logged, so
/// each condition contributes exactly one entry.
///
/// # Examples
/// ```
/// use flavorfit_core::{
///     ConditionSet, Recommendation, RecommendationType, SafetyScore, SafetyTier, aggregate,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rows = vec![
///     Recommendation::new(1, "DM", RecommendationType::Avoid, SafetyScore::new(2)?),
///     Recommendation::new(1, "HTN", RecommendationType::Avoid, SafetyScore::new(2)?),
/// ];
/// let verdict = aggregate(1, &rows, &ConditionSet::new(["DM", "HTN"])?);
/// assert_eq!(verdict.tier, SafetyTier::Avoid);
/// assert_eq!(verdict.score.map(SafetyScore::get), Some(2));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn aggregate(
    food_id: FoodId,
    rows: &[Recommendation],
    conditions: &ConditionSet,
) -> AggregatedVerdict {
    let lookup = index_rows(food_id, rows, conditions);
    let entries: Vec<ConditionVerdict> = conditions
        .iter()
        .map(|code| {
            lookup.get(code).map_or_else(
                || ConditionVerdict::unrated(code.clone()),
                |row| ConditionVerdict::rated(code.clone(), row),
            )
        })
        .collect();

    let tier = entries
        .iter()
        .map(ConditionVerdict::tier)
        .max()
        .unwrap_or(SafetyTier::Unrated);
    let score = entries.iter().filter_map(|entry| entry.score).min();

    AggregatedVerdict {
        food_id,
        tier,
        score,
        conditions: entries,
    }
}

/// Aggregate every food in a catalogue for the same condition set.
#[must_use]
pub fn aggregate_catalog<S>(
    store: &S,
    conditions: &ConditionSet,
) -> BTreeMap<FoodId, AggregatedVerdict>
where
    S: CatalogStore + ?Sized,
{
    store
        .all_foods()
        .map(|food| {
            let verdict = aggregate(food.id, store.recommendations_for(food.id), conditions);
            (food.id, verdict)
        })
        .collect()
}

fn index_rows<'a>(
    food_id: FoodId,
    rows: &'a [Recommendation],
    conditions: &ConditionSet,
) -> BTreeMap<&'a ConditionCode, &'a Recommendation> {
    let mut lookup: BTreeMap<&ConditionCode, &Recommendation> = BTreeMap::new();
    for row in rows.iter().filter(|row| conditions.contains(&row.condition)) {
        match lookup.entry(&row.condition) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                warn!(
                    "food {food_id} has more than one recommendation for condition {}; keeping the most restrictive",
                    row.condition
                );
                if restrictiveness(row) > restrictiveness(slot.get()) {
                    slot.insert(row);
                }
            }
        }
    }
    lookup
}

fn restrictiveness(row: &Recommendation) -> (RecommendationType, std::cmp::Reverse<SafetyScore>) {
    (row.recommendation_type, std::cmp::Reverse(row.safety_score))
}
