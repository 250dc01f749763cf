//! SQLite-backed catalogue snapshot.
//!
//! The database is opened read-only and every table is loaded once into a
//! [`MemoryCatalog`]. Later lookups never touch the connection.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

use crate::{
    Allergen, AllergenSeverity, Category, CatalogStore, DietaryFlags, FoodId, FoodItem,
    FoodItemError, HealthCondition, NutritionFacts, Recommendation, RecommendationError,
    RecommendationType, SafetyScore, UnknownCategory,
};

use super::{CatalogError, MemoryCatalog, MemoryCatalogBuilder};

const FOODS_QUERY: &str = "SELECT fi.food_id, fi.food_name, fc.category_name, fi.description, \
     fi.serving_size, fi.serving_unit, fi.is_vegetarian, fi.is_vegan, fi.is_gluten_free, \
     fi.is_dairy_free \
     FROM food_items fi JOIN food_categories fc ON fi.category_id = fc.category_id \
     ORDER BY fi.food_id";

const NUTRITION_QUERY: &str = "SELECT food_id, calories, protein_g, carbs_g, fat_g, \
     saturated_fat_g, trans_fat_g, cholesterol_mg, sodium_mg, potassium_mg, fiber_g, sugar_g, \
     vitamin_a_iu, vitamin_c_mg, calcium_mg, iron_mg \
     FROM nutrition_facts ORDER BY food_id";

const ALLERGENS_QUERY: &str =
    "SELECT allergen_id, allergen_name FROM allergens ORDER BY allergen_id";

const FOOD_ALLERGENS_QUERY: &str =
    "SELECT food_id, allergen_id, severity_level FROM food_allergens ORDER BY food_id, allergen_id";

const CONDITIONS_QUERY: &str = "SELECT condition_id, condition_name, condition_code, description \
     FROM health_conditions ORDER BY condition_id";

const RECOMMENDATIONS_QUERY: &str = "SELECT fr.food_id, hc.condition_code, \
     fr.recommendation_type, fr.safety_score, fr.reasoning \
     FROM food_recommendations fr \
     JOIN health_conditions hc ON fr.condition_id = hc.condition_id \
     ORDER BY fr.food_id, hc.condition_code";

/// Error raised when loading a catalogue from SQLite.
#[derive(Debug, Error)]
pub enum SqliteCatalogError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A food row named a category outside the closed set.
    #[error("food {food_id} has an invalid category: {source}")]
    InvalidCategory {
        /// Identifier of the offending food.
        food_id: FoodId,
        /// Parse failure.
        #[source]
        source: UnknownCategory,
    },
    /// A food row failed validation.
    #[error("food {food_id} is invalid: {source}")]
    InvalidFood {
        /// Identifier of the offending food.
        food_id: FoodId,
        /// Validation failure.
        #[source]
        source: FoodItemError,
    },
    /// A recommendation row held an unknown type or an out-of-range score.
    #[error("recommendation for food {food_id} and condition {condition} is invalid: {source}")]
    InvalidRecommendation {
        /// Rated food.
        food_id: FoodId,
        /// Condition code of the row.
        condition: String,
        /// Validation failure.
        #[source]
        source: RecommendationError,
    },
    /// The loaded rows were inconsistent with each other.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Generic SQLite error when reading rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only catalogue loaded from an existing SQLite database.
///
/// # Examples
///
/// ```no_run
/// use flavorfit_core::{CatalogStore, SqliteCatalog};
///
/// # fn main() -> Result<(), flavorfit_core::SqliteCatalogError> {
/// let catalog = SqliteCatalog::open("food_menu.db")?;
/// println!("{} conditions", catalog.conditions().len());
/// # Ok(())
/// # }
/// ```
pub struct SqliteCatalog {
    catalog: MemoryCatalog,
}

impl fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCatalog")
            .field("foods", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl SqliteCatalog {
    /// Open a database and load every catalogue table.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError`] when the database cannot be opened or
    /// queried, or when a row fails validation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteCatalogError> {
        let database_path = path.as_ref();
        let connection =
            Connection::open_with_flags(database_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
                |source| SqliteCatalogError::OpenDatabase {
                    path: database_path.to_path_buf(),
                    source,
                },
            )?;

        let catalog = load_catalog(&connection)?;
        debug!(
            "loaded {} foods from {}",
            catalog.len(),
            database_path.display()
        );
        Ok(Self { catalog })
    }

    /// Borrow the loaded snapshot.
    #[must_use]
    pub const fn as_memory(&self) -> &MemoryCatalog {
        &self.catalog
    }

    /// Take ownership of the loaded snapshot.
    #[must_use]
    pub fn into_memory(self) -> MemoryCatalog {
        self.catalog
    }
}

impl CatalogStore for SqliteCatalog {
    fn all_foods(&self) -> Box<dyn Iterator<Item = &FoodItem> + Send + '_> {
        self.catalog.all_foods()
    }

    fn food(&self, id: FoodId) -> Option<&FoodItem> {
        self.catalog.food(id)
    }

    fn recommendations_for(&self, id: FoodId) -> &[Recommendation] {
        self.catalog.recommendations_for(id)
    }

    fn allergens_for(&self, id: FoodId) -> &[crate::AllergenLink] {
        self.catalog.allergens_for(id)
    }

    fn nutrition_for(&self, id: FoodId) -> Option<&NutritionFacts> {
        self.catalog.nutrition_for(id)
    }

    fn conditions(&self) -> &[HealthCondition] {
        self.catalog.conditions()
    }

    fn allergens(&self) -> &[Allergen] {
        self.catalog.allergens()
    }
}

fn load_catalog(connection: &Connection) -> Result<MemoryCatalog, SqliteCatalogError> {
    let mut builder = MemoryCatalog::builder();
    builder = load_foods(connection, builder)?;
    builder = load_nutrition(connection, builder)?;
    builder = load_allergens(connection, builder)?;
    builder = load_conditions(connection, builder)?;
    builder = load_recommendations(connection, builder)?;
    Ok(builder.build()?)
}

fn load_foods(
    connection: &Connection,
    mut builder: MemoryCatalogBuilder,
) -> Result<MemoryCatalogBuilder, SqliteCatalogError> {
    let mut statement = connection.prepare(FOODS_QUERY)?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let food_id: FoodId = row.get(0)?;
        let name: String = row.get(1)?;
        let category_name: String = row.get(2)?;
        let description: Option<String> = row.get(3)?;
        let serving_size: Option<f64> = row.get(4)?;
        let serving_unit: Option<String> = row.get(5)?;
        let dietary = DietaryFlags {
            vegetarian: flag(row, 6)?,
            vegan: flag(row, 7)?,
            gluten_free: flag(row, 8)?,
            dairy_free: flag(row, 9)?,
        };

        let category: Category = category_name
            .parse()
            .map_err(|source| SqliteCatalogError::InvalidCategory { food_id, source })?;
        let mut food = FoodItem::new(food_id, name, category)
            .map_err(|source| SqliteCatalogError::InvalidFood { food_id, source })?
            .with_serving(
                serving_size.unwrap_or_default(),
                serving_unit.unwrap_or_default(),
            )
            .with_dietary(dietary);
        if let Some(text) = description.filter(|text| !text.trim().is_empty()) {
            food = food.with_description(text);
        }
        builder = builder.food(food);
    }
    Ok(builder)
}

fn load_nutrition(
    connection: &Connection,
    mut builder: MemoryCatalogBuilder,
) -> Result<MemoryCatalogBuilder, SqliteCatalogError> {
    let mut statement = connection.prepare(NUTRITION_QUERY)?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let food_id: FoodId = row.get(0)?;
        let facts = NutritionFacts {
            calories: nutrient(row, 1)?,
            protein_g: nutrient(row, 2)?,
            carbs_g: nutrient(row, 3)?,
            fat_g: nutrient(row, 4)?,
            saturated_fat_g: nutrient(row, 5)?,
            trans_fat_g: nutrient(row, 6)?,
            cholesterol_mg: nutrient(row, 7)?,
            sodium_mg: nutrient(row, 8)?,
            potassium_mg: nutrient(row, 9)?,
            fiber_g: nutrient(row, 10)?,
            sugar_g: nutrient(row, 11)?,
            vitamin_a_iu: nutrient(row, 12)?,
            vitamin_c_mg: nutrient(row, 13)?,
            calcium_mg: nutrient(row, 14)?,
            iron_mg: nutrient(row, 15)?,
        };
        builder = builder.nutrition(food_id, facts);
    }
    Ok(builder)
}

fn load_allergens(
    connection: &Connection,
    mut builder: MemoryCatalogBuilder,
) -> Result<MemoryCatalogBuilder, SqliteCatalogError> {
    let mut statement = connection.prepare(ALLERGENS_QUERY)?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let id = row.get(0)?;
        let name: String = row.get(1)?;
        builder = builder.allergen(Allergen {
            id,
            code: allergen_code(&name),
            name,
            severity_warning: String::new(),
        });
    }

    let mut statement = connection.prepare(FOOD_ALLERGENS_QUERY)?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let food_id: FoodId = row.get(0)?;
        let allergen_id = row.get(1)?;
        let severity_label: Option<String> = row.get(2)?;
        let severity = match severity_label.as_deref().map(str::parse::<AllergenSeverity>) {
            Some(Ok(severity)) => severity,
            Some(Err(err)) => {
                warn!("food {food_id}: {err}; treating the allergen as present");
                AllergenSeverity::Contains
            }
            None => AllergenSeverity::Contains,
        };
        builder = builder.link_allergen(food_id, allergen_id, severity);
    }
    Ok(builder)
}

fn load_conditions(
    connection: &Connection,
    mut builder: MemoryCatalogBuilder,
) -> Result<MemoryCatalogBuilder, SqliteCatalogError> {
    let mut statement = connection.prepare(CONDITIONS_QUERY)?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let code: String = row.get(2)?;
        let description: Option<String> = row.get(3)?;
        builder = builder.condition(HealthCondition {
            id: row.get(0)?,
            name: row.get(1)?,
            code: code.into(),
            description: description.unwrap_or_default(),
        });
    }
    Ok(builder)
}

fn load_recommendations(
    connection: &Connection,
    mut builder: MemoryCatalogBuilder,
) -> Result<MemoryCatalogBuilder, SqliteCatalogError> {
    let mut statement = connection.prepare(RECOMMENDATIONS_QUERY)?;
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        let food_id: FoodId = row.get(0)?;
        let condition: String = row.get(1)?;
        let kind: String = row.get(2)?;
        let score: i64 = row.get(3)?;
        let reasoning: Option<String> = row.get(4)?;

        let invalid = |source| SqliteCatalogError::InvalidRecommendation {
            food_id,
            condition: condition.clone(),
            source,
        };
        let recommendation_type: RecommendationType = kind.parse().map_err(invalid)?;
        let safety_score = SafetyScore::new(score).map_err(invalid)?;
        let recommendation = Recommendation::new(
            food_id,
            condition.as_str(),
            recommendation_type,
            safety_score,
        )
        .with_reasoning(reasoning.unwrap_or_default());
        builder = builder.recommendation(recommendation);
    }
    Ok(builder)
}

fn flag(row: &Row<'_>, index: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, Option<bool>>(index)?.unwrap_or(false))
}

fn nutrient(row: &Row<'_>, index: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(index)?.unwrap_or(0.0))
}

fn allergen_code(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_catalog, write_sqlite_catalog};
    use rstest::{fixture, rstest};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[fixture]
    fn database() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("food_menu.db");
        write_sqlite_catalog(&path, &sample_catalog()).expect("write database");
        (dir, path)
    }

    #[rstest]
    fn loads_every_table(database: (TempDir, PathBuf)) {
        let (_dir, path) = database;
        let catalog = SqliteCatalog::open(&path).expect("open catalogue");
        let expected = sample_catalog();
        assert_eq!(catalog.as_memory().len(), expected.len());
        assert_eq!(catalog.conditions().len(), expected.conditions().len());
        assert_eq!(catalog.allergens().len(), expected.allergens().len());
        for food in expected.all_foods() {
            assert_eq!(catalog.food(food.id).map(|f| &f.name), Some(&food.name));
            assert_eq!(
                catalog.recommendations_for(food.id).len(),
                expected.recommendations_for(food.id).len()
            );
            assert_eq!(
                catalog.allergens_for(food.id).len(),
                expected.allergens_for(food.id).len()
            );
        }
    }

    #[rstest]
    fn missing_database_is_reported() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("absent.db");
        let err = SqliteCatalog::open(&path).expect_err("missing database must fail");
        assert!(matches!(err, SqliteCatalogError::OpenDatabase { .. }));
    }

    #[rstest]
    fn out_of_range_score_is_reported(database: (TempDir, PathBuf)) {
        let (_dir, path) = database;
        let connection = Connection::open(&path).expect("open for write");
        connection
            .execute("UPDATE food_recommendations SET safety_score = 42", [])
            .expect("corrupt scores");
        drop(connection);

        let err = SqliteCatalog::open(&path).expect_err("invalid score must fail");
        assert!(matches!(
            err,
            SqliteCatalogError::InvalidRecommendation {
                source: RecommendationError::ScoreOutOfRange { value: 42 },
                ..
            }
        ));
    }

    #[rstest]
    fn unknown_category_is_reported(database: (TempDir, PathBuf)) {
        let (_dir, path) = database;
        let connection = Connection::open(&path).expect("open for write");
        connection
            .execute(
                "UPDATE food_categories SET category_name = 'Soup' WHERE category_name = 'Drink'",
                [],
            )
            .expect("rename category");
        drop(connection);

        let err = SqliteCatalog::open(&path).expect_err("unknown category must fail");
        assert!(matches!(err, SqliteCatalogError::InvalidCategory { .. }));
    }

    #[rstest]
    #[case("Tree Nuts", "tree_nuts")]
    #[case(" Gluten ", "gluten")]
    fn allergen_codes_derive_from_names(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(allergen_code(name), expected);
    }
}
