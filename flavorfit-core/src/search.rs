//! Filtering and ordering of the food list.
//!
//! A search drops allergen-excluded foods first, then applies the optional
//! category filter and the text query, and finally sorts by the selected key.
//! Every key breaks ties on the case-insensitive name and then on the food id,
//! so the same inputs always reproduce the same order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{
    AggregatedVerdict, AllergenExclusion, CatalogStore, Category, ConditionCode, FoodId,
    FoodItem, SafetyTier,
};

/// Query text that matches recommended foods structurally.
pub const RECOMMENDED_TOKEN: &str = "recommended";
/// Query text that matches foods without allergen links.
pub const NO_ALLERGENS_TOKEN: &str = "no allergens";

/// Ordering applied to search results.
///
/// # Examples
/// ```
/// use flavorfit_core::SortKey;
///
/// assert_eq!("nameDesc".parse::<SortKey>(), Ok(SortKey::NameDesc));
/// assert_eq!("name_desc".parse::<SortKey>(), Ok(SortKey::NameDesc));
/// assert_eq!(SortKey::default(), SortKey::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SortKey {
    /// Most recommended first, then by name.
    #[default]
    Default,
    /// Alias of [`SortKey::Default`].
    Recommended,
    /// Name ascending.
    Name,
    /// Name descending; the exact reverse of [`SortKey::Name`].
    NameDesc,
    /// Category name ascending, then by name.
    Category,
}

impl SortKey {
    /// Every sort key.
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Recommended,
        Self::Name,
        Self::NameDesc,
        Self::Category,
    ];

    /// Return the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Recommended => "recommended",
            Self::Name => "name",
            Self::NameDesc => "nameDesc",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort key label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key '{0}'")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "default" | "" => Ok(Self::Default),
            "recommended" => Ok(Self::Recommended),
            "name" => Ok(Self::Name),
            "namedesc" => Ok(Self::NameDesc),
            "category" => Ok(Self::Category),
            _ => Err(UnknownSortKey(s.to_owned())),
        }
    }
}

/// Parameters of a food search.
///
/// # Examples
/// ```
/// use flavorfit_core::{Category, FoodQuery, SortKey};
///
/// let query = FoodQuery::default()
///     .with_category(Category::Drink)
///     .with_text("tea")
///     .excluding(["gluten"])
///     .sorted_by(SortKey::Name);
/// assert_eq!(query.sort, SortKey::Name);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FoodQuery {
    /// Keep only this category when set.
    pub category: Option<Category>,
    /// Free-text query; empty matches everything.
    pub text: String,
    /// Allergens the caller must avoid.
    pub exclude_allergens: AllergenExclusion,
    /// Result ordering.
    pub sort: SortKey,
}

impl FoodQuery {
    /// Restrict results to one category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the free-text query.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Exclude foods linked to any of the given allergen codes or names.
    #[must_use]
    pub fn excluding<I, S>(mut self, allergens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_allergens = AllergenExclusion::new(allergens);
        self
    }

    /// Select the ordering.
    #[must_use]
    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Ordered search results borrowed from the store.
///
/// The listing is computed once; [`FoodListing::iter`] may be called any
/// number of times and always yields the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodListing<'a> {
    foods: Vec<&'a FoodItem>,
}

impl<'a> FoodListing<'a> {
    /// Iterate over the matches in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a FoodItem> + '_ {
        self.foods.iter().copied()
    }

    /// Identifiers of the matches in order.
    #[must_use]
    pub fn ids(&self) -> Vec<FoodId> {
        self.foods.iter().map(|food| food.id).collect()
    }

    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    /// Report whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl<'a> IntoIterator for FoodListing<'a> {
    type Item = &'a FoodItem;
    type IntoIter = std::vec::IntoIter<&'a FoodItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.foods.into_iter()
    }
}

struct Candidate<'a> {
    food: &'a FoodItem,
    name_key: String,
    tier: SafetyTier,
}

impl Candidate<'_> {
    fn by_name(&self, other: &Self) -> Ordering {
        self.name_key
            .cmp(&other.name_key)
            .then_with(|| self.food.id.cmp(&other.food.id))
    }

    fn compare(&self, other: &Self, sort: SortKey) -> Ordering {
        match sort {
            SortKey::Default | SortKey::Recommended => self
                .tier
                .cmp(&other.tier)
                .then_with(|| self.by_name(other)),
            SortKey::Name => self.by_name(other),
            SortKey::NameDesc => other.by_name(self),
            SortKey::Category => self
                .food
                .category
                .as_str()
                .cmp(other.food.category.as_str())
                .then_with(|| self.by_name(other)),
        }
    }
}

/// Filter and order the store's foods.
///
/// `verdicts`, when present, enable condition tags in text matching, the
/// `recommended` token and tier ordering. Without them every food sorts as
/// [`SafetyTier::Unrated`].
///
/// # Examples
/// ```
/// use flavorfit_core::{CatalogStore, Category, FoodItem, FoodQuery, MemoryCatalog, SortKey, search};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = MemoryCatalog::builder()
///     .food(FoodItem::new(1, "Green Tea", Category::Drink)?)
///     .food(FoodItem::new(2, "Garden Salad", Category::Vegetarian)?)
///     .build()?;
///
/// let listing = search(&catalog, &FoodQuery::default().sorted_by(SortKey::Name), None);
/// assert_eq!(listing.ids(), vec![2, 1]);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn search<'a, S>(
    store: &'a S,
    query: &FoodQuery,
    verdicts: Option<&BTreeMap<FoodId, AggregatedVerdict>>,
) -> FoodListing<'a>
where
    S: CatalogStore + ?Sized,
{
    let matcher = TextMatcher::new(store, &query.text);
    let mut candidates: Vec<Candidate<'a>> = store
        .all_foods()
        .filter(|food| query.exclude_allergens.passes(store.allergens_for(food.id)))
        .filter(|food| query.category.is_none_or(|category| food.category == category))
        .filter(|food| {
            let verdict = verdicts.and_then(|all| all.get(&food.id));
            matcher.matches(store, food, verdict)
        })
        .map(|food| Candidate {
            food,
            name_key: food.sort_name(),
            tier: verdicts
                .and_then(|all| all.get(&food.id))
                .map_or(SafetyTier::Unrated, |verdict| verdict.tier),
        })
        .collect();

    candidates.sort_by(|a, b| a.compare(b, query.sort));
    FoodListing {
        foods: candidates.into_iter().map(|candidate| candidate.food).collect(),
    }
}

enum TextMatcher {
    Everything,
    Recommended,
    NoAllergens,
    Substring {
        needle: String,
        condition_names: BTreeMap<ConditionCode, String>,
    },
}

impl TextMatcher {
    fn new<S: CatalogStore + ?Sized>(store: &S, text: &str) -> Self {
        let needle = text.trim().to_lowercase();
        match needle.as_str() {
            "" => Self::Everything,
            RECOMMENDED_TOKEN => Self::Recommended,
            NO_ALLERGENS_TOKEN => Self::NoAllergens,
            _ => Self::Substring {
                condition_names: store
                    .conditions()
                    .iter()
                    .map(|condition| (condition.code.clone(), condition.name.to_lowercase()))
                    .collect(),
                needle,
            },
        }
    }

    fn matches<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        food: &FoodItem,
        verdict: Option<&AggregatedVerdict>,
    ) -> bool {
        match self {
            Self::Everything => true,
            Self::Recommended => verdict.is_some_and(AggregatedVerdict::is_recommended),
            Self::NoAllergens => store.allergens_for(food.id).is_empty(),
            Self::Substring {
                needle,
                condition_names,
            } => {
                food.sort_name().contains(needle.as_str())
                    || food.category.as_str().to_lowercase().contains(needle.as_str())
                    || verdict.is_some_and(|verdict| {
                        verdict
                            .safe_for()
                            .chain(verdict.unsafe_for())
                            .any(|code| tag_matches(code, condition_names, needle))
                    })
            }
        }
    }
}

fn tag_matches(
    code: &ConditionCode,
    condition_names: &BTreeMap<ConditionCode, String>,
    needle: &str,
) -> bool {
    code.as_str().to_lowercase().contains(needle)
        || condition_names
            .get(code)
            .is_some_and(|name| name.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        GREEN_TEA, HAMBURGER, MARGHERITA_PIZZA, MINERAL_WATER, sample_catalog,
    };
    use crate::{ConditionSet, MemoryCatalog, aggregate_catalog};
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalog() -> MemoryCatalog {
        sample_catalog()
    }

    fn names(listing: &FoodListing<'_>) -> Vec<String> {
        listing.iter().map(|food| food.name.clone()).collect()
    }

    #[rstest]
    #[case("default", SortKey::Default)]
    #[case("Recommended", SortKey::Recommended)]
    #[case("NAME", SortKey::Name)]
    #[case("name-desc", SortKey::NameDesc)]
    #[case("category", SortKey::Category)]
    fn parses_sort_keys(#[case] raw: &str, #[case] expected: SortKey) {
        assert_eq!(raw.parse::<SortKey>(), Ok(expected));
    }

    #[rstest]
    fn unknown_sort_key_is_rejected() {
        assert!("price".parse::<SortKey>().is_err());
    }

    #[rstest]
    fn excluded_allergens_are_dropped_first(catalog: MemoryCatalog) {
        let query = FoodQuery::default().with_text("pizza").excluding(["gluten"]);
        let listing = search(&catalog, &query, None);
        assert!(listing.is_empty());
    }

    #[rstest]
    fn name_desc_reverses_name(catalog: MemoryCatalog) {
        let ascending = search(&catalog, &FoodQuery::default().sorted_by(SortKey::Name), None);
        let descending =
            search(&catalog, &FoodQuery::default().sorted_by(SortKey::NameDesc), None);
        let mut reversed = ascending.ids();
        reversed.reverse();
        assert_eq!(descending.ids(), reversed);
    }

    #[rstest]
    fn category_filter_keeps_one_category(catalog: MemoryCatalog) {
        let query = FoodQuery::default()
            .with_category(Category::Drink)
            .sorted_by(SortKey::Name);
        let listing = search(&catalog, &query, None);
        assert_eq!(
            names(&listing),
            vec!["Fresh Orange Juice", "Green Tea", "Mineral Water"]
        );
    }

    #[rstest]
    fn text_matches_category_names(catalog: MemoryCatalog) {
        let listing = search(&catalog, &FoodQuery::default().with_text("ITALIAN"), None);
        assert_eq!(listing.ids(), vec![MARGHERITA_PIZZA]);
    }

    #[rstest]
    fn text_matches_condition_tags_when_verdicts_exist(catalog: MemoryCatalog) {
        let conditions = ConditionSet::new(["HTN"]).expect("valid set");
        let verdicts = aggregate_catalog(&catalog, &conditions);
        let query = FoodQuery::default().with_text("hypertension");

        assert!(search(&catalog, &query, None).is_empty());
        let listing = search(&catalog, &query, Some(&verdicts));
        assert!(listing.ids().contains(&HAMBURGER));
        assert!(listing.ids().contains(&GREEN_TEA));
        assert!(!listing.ids().contains(&MINERAL_WATER));
    }

    #[rstest]
    fn recommended_token_needs_verdicts(catalog: MemoryCatalog) {
        let query = FoodQuery::default().with_text(" Recommended ");
        assert!(search(&catalog, &query, None).is_empty());

        let conditions = ConditionSet::new(["DM"]).expect("valid set");
        let verdicts = aggregate_catalog(&catalog, &conditions);
        let listing = search(&catalog, &query, Some(&verdicts));
        assert!(!listing.is_empty());
        assert!(listing.iter().all(|food| verdicts[&food.id].is_recommended()));
    }

    #[rstest]
    fn no_allergens_token_matches_unlinked_foods(catalog: MemoryCatalog) {
        let listing = search(&catalog, &FoodQuery::default().with_text("no allergens"), None);
        assert!(listing.ids().contains(&MINERAL_WATER));
        assert!(listing.iter().all(|food| catalog.allergens_for(food.id).is_empty()));
    }

    #[rstest]
    fn default_sort_puts_recommended_first(catalog: MemoryCatalog) {
        let conditions = ConditionSet::new(["DM"]).expect("valid set");
        let verdicts = aggregate_catalog(&catalog, &conditions);
        let listing = search(&catalog, &FoodQuery::default(), Some(&verdicts));
        let tiers: Vec<SafetyTier> = listing.iter().map(|food| verdicts[&food.id].tier).collect();
        assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(listing.iter().last().map(|food| food.id), Some(HAMBURGER));
    }

    #[rstest]
    fn category_sort_orders_by_category_then_name(catalog: MemoryCatalog) {
        let listing = search(&catalog, &FoodQuery::default().sorted_by(SortKey::Category), None);
        let keys: Vec<(&str, String)> = listing
            .iter()
            .map(|food| (food.category.as_str(), food.sort_name()))
            .collect();
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]), "{keys:?}");
        assert_eq!(
            names(&listing)[..4],
            ["Chocolate Cake", "Fresh Orange Juice", "Green Tea", "Mineral Water"]
        );
    }

    #[rstest]
    fn listings_restart_with_the_same_order(catalog: MemoryCatalog) {
        let listing = search(&catalog, &FoodQuery::default().sorted_by(SortKey::Category), None);
        let first: Vec<FoodId> = listing.iter().map(|food| food.id).collect();
        let second: Vec<FoodId> = listing.iter().map(|food| food.id).collect();
        assert_eq!(first, second);
    }
}
