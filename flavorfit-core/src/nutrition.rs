//! Per-serving nutrition facts owned by a single food.

use thiserror::Error;

/// Nutrition facts for one serving of a food.
///
/// Every field is finite and non-negative once [`NutritionFacts::validate`]
/// has succeeded. Zero calories are allowed (water).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NutritionFacts {
    /// Energy in kilocalories.
    pub calories: f64,
    /// Protein in grams.
    pub protein_g: f64,
    /// Carbohydrate in grams.
    pub carbs_g: f64,
    /// Total fat in grams.
    pub fat_g: f64,
    /// Saturated fat in grams.
    pub saturated_fat_g: f64,
    /// Trans fat in grams.
    pub trans_fat_g: f64,
    /// Cholesterol in milligrams.
    pub cholesterol_mg: f64,
    /// Sodium in milligrams.
    pub sodium_mg: f64,
    /// Potassium in milligrams.
    pub potassium_mg: f64,
    /// Dietary fibre in grams.
    pub fiber_g: f64,
    /// Sugar in grams.
    pub sugar_g: f64,
    /// Vitamin A in international units.
    pub vitamin_a_iu: f64,
    /// Vitamin C in milligrams.
    pub vitamin_c_mg: f64,
    /// Calcium in milligrams.
    pub calcium_mg: f64,
    /// Iron in milligrams.
    pub iron_mg: f64,
}

/// Errors returned by [`NutritionFacts::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    /// A field held a negative value.
    #[error("nutrient {field} must be non-negative, found {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A field was NaN or infinite.
    #[error("nutrient {field} must be finite")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl NutritionFacts {
    /// Return every field paired with its name, in declaration order.
    #[must_use]
    pub const fn fields(&self) -> [(&'static str, f64); 15] {
        [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
            ("saturated_fat_g", self.saturated_fat_g),
            ("trans_fat_g", self.trans_fat_g),
            ("cholesterol_mg", self.cholesterol_mg),
            ("sodium_mg", self.sodium_mg),
            ("potassium_mg", self.potassium_mg),
            ("fiber_g", self.fiber_g),
            ("sugar_g", self.sugar_g),
            ("vitamin_a_iu", self.vitamin_a_iu),
            ("vitamin_c_mg", self.vitamin_c_mg),
            ("calcium_mg", self.calcium_mg),
            ("iron_mg", self.iron_mg),
        ]
    }

    /// Check that every field is finite and non-negative.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), NutritionError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(NutritionError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(NutritionError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Return `self` after validation, for use in builder chains.
    ///
    /// # Errors
    /// See [`NutritionFacts::validate`].
    pub fn validated(self) -> Result<Self, NutritionError> {
        self.validate()?;
        Ok(self)
    }
}

/// Headline differences between two foods' nutrition, `second - first`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NutrientDifference {
    /// Calorie difference.
    pub calories: f64,
    /// Protein difference in grams.
    pub protein_g: f64,
    /// Carbohydrate difference in grams.
    pub carbs_g: f64,
    /// Fat difference in grams.
    pub fat_g: f64,
    /// Sodium difference in milligrams.
    pub sodium_mg: f64,
    /// Fibre difference in grams.
    pub fiber_g: f64,
    /// Sugar difference in grams.
    pub sugar_g: f64,
    /// Saturated fat difference in grams.
    pub saturated_fat_g: f64,
}

impl NutrientDifference {
    /// Subtract `first` from `second` for each headline nutrient.
    #[expect(
        clippy::float_arithmetic,
        reason = "nutrient deltas are plain floating-point subtraction"
    )]
    #[must_use]
    pub fn between(first: &NutritionFacts, second: &NutritionFacts) -> Self {
        Self {
            calories: second.calories - first.calories,
            protein_g: second.protein_g - first.protein_g,
            carbs_g: second.carbs_g - first.carbs_g,
            fat_g: second.fat_g - first.fat_g,
            sodium_mg: second.sodium_mg - first.sodium_mg,
            fiber_g: second.fiber_g - first.fiber_g,
            sugar_g: second.sugar_g - first.sugar_g,
            saturated_fat_g: second.saturated_fat_g - first.saturated_fat_g,
        }
    }
}
