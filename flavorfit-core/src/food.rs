//! Food items and the fixed category enumeration.
//!
//! A [`FoodItem`] is immutable once a catalogue snapshot has been loaded.
//! Constructors validate the few invariants the rest of the engine relies on:
//! names are never blank and glycemic indices stay within `0..=100`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifier of a food item within a catalogue snapshot.
pub type FoodId = u64;

/// Menu category a food belongs to.
///
/// The set is closed; meal-plan role pools and category sorting depend on it.
///
/// # Examples
/// ```
/// use flavorfit_core::Category;
///
/// assert_eq!(Category::FastFood.as_str(), "FastFood");
/// assert_eq!("fast food".parse::<Category>(), Ok(Category::FastFood));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// Burgers, fries and similar quick-service dishes.
    FastFood,
    /// Indian cuisine.
    Indian,
    /// Italian cuisine.
    Italian,
    /// Lean protein dishes.
    Protein,
    /// Fish and shellfish.
    Seafood,
    /// Meat-free dishes.
    Vegetarian,
    /// Sweets and baked desserts.
    Dessert,
    /// Beverages, including water.
    Drink,
    /// Red meat and poultry mains.
    Meat,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Self; 9] = [
        Self::FastFood,
        Self::Indian,
        Self::Italian,
        Self::Protein,
        Self::Seafood,
        Self::Vegetarian,
        Self::Dessert,
        Self::Drink,
        Self::Meat,
    ];

    /// Return the canonical display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FastFood => "FastFood",
            Self::Indian => "Indian",
            Self::Italian => "Italian",
            Self::Protein => "Protein",
            Self::Seafood => "Seafood",
            Self::Vegetarian => "Vegetarian",
            Self::Dessert => "Dessert",
            Self::Drink => "Drink",
            Self::Meat => "Meat",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown food category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "fastfood" => Ok(Self::FastFood),
            "indian" => Ok(Self::Indian),
            "italian" => Ok(Self::Italian),
            "protein" => Ok(Self::Protein),
            "seafood" => Ok(Self::Seafood),
            "vegetarian" => Ok(Self::Vegetarian),
            "dessert" => Ok(Self::Dessert),
            "drink" => Ok(Self::Drink),
            "meat" => Ok(Self::Meat),
            _ => Err(UnknownCategory(s.to_owned())),
        }
    }
}

/// Purine content used by the gout rule in [`crate::rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PurineLevel {
    /// Little purine; safe for gout.
    Low,
    /// Moderate purine.
    Medium,
    /// High purine, e.g. red meat.
    High,
    /// Very high purine, e.g. organ meat.
    VeryHigh,
}

impl PurineLevel {
    /// Report whether the level should be avoided with gout.
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High | Self::VeryHigh)
    }

    /// Return the snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for PurineLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean dietary flags recorded for each food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DietaryFlags {
    /// Contains no meat or fish.
    pub vegetarian: bool,
    /// Contains no animal products.
    pub vegan: bool,
    /// Contains no gluten.
    pub gluten_free: bool,
    /// Contains no dairy.
    pub dairy_free: bool,
}

/// Glycemic index in the inclusive range `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct GlycemicIndex(u8);

impl GlycemicIndex {
    /// Upper bound of the scale.
    pub const MAX: u8 = 100;

    /// Validate and wrap a glycemic index.
    ///
    /// # Errors
    /// Returns [`FoodItemError::GlycemicIndexOutOfRange`] above 100.
    pub const fn new(value: u8) -> Result<Self, FoodItemError> {
        if value > Self::MAX {
            return Err(FoodItemError::GlycemicIndexOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Return the raw value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for GlycemicIndex {
    type Error = FoodItemError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GlycemicIndex> for u8 {
    fn from(index: GlycemicIndex) -> Self {
        index.0
    }
}

/// Errors returned while constructing a [`FoodItem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoodItemError {
    /// The food name was empty or whitespace.
    #[error("food {id} must have a non-empty name")]
    BlankName {
        /// Identifier of the rejected food.
        id: FoodId,
    },
    /// The glycemic index exceeded 100.
    #[error("glycemic index {value} is outside 0..=100")]
    GlycemicIndexOutOfRange {
        /// Rejected value.
        value: u8,
    },
}

/// A dish or drink offered by the catalogue.
///
/// # Examples
/// ```
/// use flavorfit_core::{Category, FoodItem};
///
/// # fn main() -> Result<(), flavorfit_core::FoodItemError> {
/// let tea = FoodItem::new(12, "Green Tea", Category::Drink)?.with_serving(240.0, "ml");
/// assert_eq!(tea.category, Category::Drink);
/// assert_eq!(tea.serving_unit, "ml");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoodItem {
    /// Unique identifier.
    pub id: FoodId,
    /// Display name.
    pub name: String,
    /// Menu category.
    pub category: Category,
    /// Optional free-form description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Serving size expressed in `serving_unit`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub serving_size: f64,
    /// Unit for `serving_size`, e.g. `g` or `ml`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub serving_unit: String,
    /// Dietary flags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dietary: DietaryFlags,
    /// Glycemic index when known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub glycemic_index: Option<GlycemicIndex>,
    /// Purine content when known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub purine_level: Option<PurineLevel>,
}

impl FoodItem {
    /// Construct a food with a validated name and default optional fields.
    ///
    /// # Errors
    /// Returns [`FoodItemError::BlankName`] when `name` is blank.
    pub fn new(
        id: FoodId,
        name: impl Into<String>,
        category: Category,
    ) -> Result<Self, FoodItemError> {
        let item = Self {
            id,
            name: name.into(),
            category,
            description: None,
            serving_size: 0.0,
            serving_unit: String::new(),
            dietary: DietaryFlags::default(),
            glycemic_index: None,
            purine_level: None,
        };
        item.validate()?;
        Ok(item)
    }

    /// Check invariants that deserialised records bypass.
    ///
    /// # Errors
    /// Returns [`FoodItemError::BlankName`] when the name is blank.
    pub fn validate(&self) -> Result<(), FoodItemError> {
        if self.name.trim().is_empty() {
            return Err(FoodItemError::BlankName { id: self.id });
        }
        Ok(())
    }

    /// Set the serving size and unit.
    #[must_use]
    pub fn with_serving(mut self, size: f64, unit: impl Into<String>) -> Self {
        self.serving_size = size;
        self.serving_unit = unit.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the dietary flags.
    #[must_use]
    pub fn with_dietary(mut self, dietary: DietaryFlags) -> Self {
        self.dietary = dietary;
        self
    }

    /// Set the glycemic index.
    #[must_use]
    pub fn with_glycemic_index(mut self, index: GlycemicIndex) -> Self {
        self.glycemic_index = Some(index);
        self
    }

    /// Set the purine level.
    #[must_use]
    pub fn with_purine_level(mut self, level: PurineLevel) -> Self {
        self.purine_level = Some(level);
        self
    }

    /// Lower-cased name used for case-insensitive ordering and matching.
    #[must_use]
    pub fn sort_name(&self) -> String {
        self.name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("FastFood", Category::FastFood)]
    #[case("fast_food", Category::FastFood)]
    #[case("Fast Food", Category::FastFood)]
    #[case("SEAFOOD", Category::Seafood)]
    #[case("drink", Category::Drink)]
    fn parses_category_names(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(raw.parse::<Category>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_category() {
        let err = "Sushi".parse::<Category>().expect_err("unknown category");
        assert!(err.to_string().contains("Sushi"));
    }

    #[rstest]
    fn display_round_trips_for_every_category() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn food_requires_name(#[case] name: &str) {
        let err = FoodItem::new(3, name, Category::Dessert).expect_err("blank name");
        assert_eq!(err, FoodItemError::BlankName { id: 3 });
    }

    #[rstest]
    #[case(0, true)]
    #[case(100, true)]
    #[case(101, false)]
    fn glycemic_index_is_bounded(#[case] value: u8, #[case] valid: bool) {
        assert_eq!(GlycemicIndex::new(value).is_ok(), valid);
    }

    #[rstest]
    fn purine_levels_flag_high_values() {
        assert!(!PurineLevel::Medium.is_high());
        assert!(PurineLevel::VeryHigh.is_high());
    }
}
