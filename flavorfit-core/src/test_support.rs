//! Test-only catalogue fixtures used by unit, behaviour and property tests.
//!
//! The sample catalogue mirrors a small restaurant menu with curated ratings
//! for seven health conditions. Mineral Water deliberately has no ratings.

#![expect(
    clippy::expect_used,
    reason = "fixture rows are static and known to be valid"
)]

use crate::{
    Allergen, AllergenId, AllergenSeverity, Category, DietaryFlags, FoodId, FoodItem,
    GlycemicIndex, HealthCondition, MemoryCatalog, NutritionFacts, PurineLevel, Recommendation,
    RecommendationType, SafetyScore,
};

/// Identifier of Hamburger in [`sample_catalog`].
pub const HAMBURGER: FoodId = 1;
/// Identifier of Mineral Water in [`sample_catalog`].
pub const MINERAL_WATER: FoodId = 2;
/// Identifier of Margherita Pizza in [`sample_catalog`].
pub const MARGHERITA_PIZZA: FoodId = 3;
/// Identifier of Grilled Chicken in [`sample_catalog`].
pub const GRILLED_CHICKEN: FoodId = 4;
/// Identifier of Vegetable Biryani in [`sample_catalog`].
pub const VEGETABLE_BIRYANI: FoodId = 5;
/// Identifier of Green Tea in [`sample_catalog`].
pub const GREEN_TEA: FoodId = 6;
/// Identifier of Grilled Salmon in [`sample_catalog`].
pub const GRILLED_SALMON: FoodId = 7;
/// Identifier of Chocolate Cake in [`sample_catalog`].
pub const CHOCOLATE_CAKE: FoodId = 8;
/// Identifier of Garden Salad in [`sample_catalog`].
pub const GARDEN_SALAD: FoodId = 9;
/// Identifier of Lamb Rogan Josh in [`sample_catalog`].
pub const LAMB_ROGAN_JOSH: FoodId = 10;
/// Identifier of Fresh Orange Juice in [`sample_catalog`].
pub const ORANGE_JUICE: FoodId = 11;

struct FoodRow {
    id: FoodId,
    name: &'static str,
    category: Category,
    // calories, protein, carbs, fat, saturated fat, sodium, fiber, sugar
    nutrition: [f64; 8],
    // vegetarian, vegan, gluten free, dairy free
    flags: [bool; 4],
}

const FOODS: [FoodRow; 11] = [
    FoodRow {
        id: HAMBURGER,
        name: "Hamburger",
        category: Category::FastFood,
        nutrition: [540.0, 25.0, 40.0, 29.0, 11.0, 1040.0, 2.0, 9.0],
        flags: [false, false, false, false],
    },
    FoodRow {
        id: MINERAL_WATER,
        name: "Mineral Water",
        category: Category::Drink,
        nutrition: [0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0],
        flags: [true, true, true, true],
    },
    FoodRow {
        id: MARGHERITA_PIZZA,
        name: "Margherita Pizza",
        category: Category::Italian,
        nutrition: [266.0, 11.0, 33.0, 10.0, 4.8, 598.0, 2.3, 3.6],
        flags: [true, false, false, false],
    },
    FoodRow {
        id: GRILLED_CHICKEN,
        name: "Grilled Chicken",
        category: Category::Protein,
        nutrition: [165.0, 31.0, 0.0, 3.6, 1.0, 74.0, 0.0, 0.0],
        flags: [false, false, true, true],
    },
    FoodRow {
        id: VEGETABLE_BIRYANI,
        name: "Vegetable Biryani",
        category: Category::Indian,
        nutrition: [290.0, 7.0, 50.0, 7.0, 1.5, 480.0, 5.0, 4.0],
        flags: [true, true, true, true],
    },
    FoodRow {
        id: GREEN_TEA,
        name: "Green Tea",
        category: Category::Drink,
        nutrition: [2.0, 0.0, 0.5, 0.0, 0.0, 2.0, 0.0, 0.0],
        flags: [true, true, true, true],
    },
    FoodRow {
        id: GRILLED_SALMON,
        name: "Grilled Salmon",
        category: Category::Seafood,
        nutrition: [208.0, 22.0, 0.0, 13.0, 3.0, 59.0, 0.0, 0.0],
        flags: [false, false, true, true],
    },
    FoodRow {
        id: CHOCOLATE_CAKE,
        name: "Chocolate Cake",
        category: Category::Dessert,
        nutrition: [371.0, 5.0, 50.0, 17.0, 7.0, 300.0, 2.0, 36.0],
        flags: [true, false, false, false],
    },
    FoodRow {
        id: GARDEN_SALAD,
        name: "Garden Salad",
        category: Category::Vegetarian,
        nutrition: [35.0, 2.0, 7.0, 0.3, 0.0, 30.0, 3.0, 3.0],
        flags: [true, true, true, true],
    },
    FoodRow {
        id: LAMB_ROGAN_JOSH,
        name: "Lamb Rogan Josh",
        category: Category::Meat,
        nutrition: [350.0, 28.0, 8.0, 22.0, 9.0, 720.0, 2.0, 4.0],
        flags: [false, false, true, false],
    },
    FoodRow {
        id: ORANGE_JUICE,
        name: "Fresh Orange Juice",
        category: Category::Drink,
        nutrition: [112.0, 1.7, 26.0, 0.5, 0.0, 2.0, 0.5, 21.0],
        flags: [true, true, true, true],
    },
];

const ALLERGENS: [(AllergenId, &str, &str); 6] = [
    (1, "Gluten", "gluten"),
    (2, "Dairy", "dairy"),
    (3, "Eggs", "eggs"),
    (4, "Fish", "fish"),
    (5, "Tree Nuts", "tree_nuts"),
    (6, "Soy", "soy"),
];

const LINKS: [(FoodId, AllergenId, AllergenSeverity); 11] = [
    (HAMBURGER, 1, AllergenSeverity::Contains),
    (HAMBURGER, 2, AllergenSeverity::MayContain),
    (HAMBURGER, 6, AllergenSeverity::Traces),
    (MARGHERITA_PIZZA, 1, AllergenSeverity::Contains),
    (MARGHERITA_PIZZA, 2, AllergenSeverity::Contains),
    (VEGETABLE_BIRYANI, 5, AllergenSeverity::Traces),
    (GRILLED_SALMON, 4, AllergenSeverity::Contains),
    (CHOCOLATE_CAKE, 1, AllergenSeverity::Contains),
    (CHOCOLATE_CAKE, 2, AllergenSeverity::Contains),
    (CHOCOLATE_CAKE, 3, AllergenSeverity::Contains),
    (LAMB_ROGAN_JOSH, 2, AllergenSeverity::MayContain),
];

const CONDITIONS: [(u64, &str, &str); 7] = [
    (1, "Diabetes", "DM"),
    (2, "Celiac Disease", "CD"),
    (3, "Hypertension", "HTN"),
    (4, "Chronic Kidney Disease", "CKD"),
    (5, "Lactose Intolerance", "LI"),
    (6, "Gout", "GOUT"),
    (7, "Irritable Bowel Syndrome", "IBS"),
];

const RECOMMENDATIONS: [(FoodId, &str, RecommendationType, i64, &str); 35] = [
    (HAMBURGER, "DM", RecommendationType::Avoid, 2, "Refined bun and high saturated fat"),
    (HAMBURGER, "HTN", RecommendationType::Avoid, 2, "Very high sodium"),
    (HAMBURGER, "CD", RecommendationType::Avoid, 1, "Wheat bun contains gluten"),
    (HAMBURGER, "CKD", RecommendationType::Avoid, 2, "Sodium and phosphorus load"),
    (MARGHERITA_PIZZA, "DM", RecommendationType::Caution, 4, "Refined flour crust"),
    (MARGHERITA_PIZZA, "CD", RecommendationType::Avoid, 1, "Wheat crust contains gluten"),
    (MARGHERITA_PIZZA, "LI", RecommendationType::Avoid, 2, "Mozzarella contains lactose"),
    (MARGHERITA_PIZZA, "HTN", RecommendationType::Caution, 4, "Cheese adds sodium"),
    (GRILLED_CHICKEN, "DM", RecommendationType::HighlyRecommended, 9, "Lean protein, no carbs"),
    (GRILLED_CHICKEN, "HTN", RecommendationType::Recommended, 8, "Low sodium when unsalted"),
    (GRILLED_CHICKEN, "CKD", RecommendationType::Caution, 5, "High protein load"),
    (GRILLED_CHICKEN, "GOUT", RecommendationType::Caution, 5, "Moderate purines"),
    (GRILLED_CHICKEN, "CD", RecommendationType::HighlyRecommended, 9, "Naturally gluten free"),
    (VEGETABLE_BIRYANI, "DM", RecommendationType::Caution, 5, "Rice raises blood sugar"),
    (VEGETABLE_BIRYANI, "HTN", RecommendationType::Recommended, 7, "Moderate sodium"),
    (VEGETABLE_BIRYANI, "CD", RecommendationType::Recommended, 8, "Rice based"),
    (GREEN_TEA, "DM", RecommendationType::HighlyRecommended, 10, "No sugar, antioxidants"),
    (GREEN_TEA, "HTN", RecommendationType::HighlyRecommended, 9, "May lower blood pressure"),
    (GREEN_TEA, "CKD", RecommendationType::Recommended, 8, "Low potassium drink"),
    (GRILLED_SALMON, "DM", RecommendationType::HighlyRecommended, 9, "Omega-3 rich protein"),
    (GRILLED_SALMON, "HTN", RecommendationType::HighlyRecommended, 9, "Heart healthy fats"),
    (GRILLED_SALMON, "GOUT", RecommendationType::Avoid, 3, "High purine fish"),
    (CHOCOLATE_CAKE, "DM", RecommendationType::Avoid, 1, "Very high sugar"),
    (CHOCOLATE_CAKE, "LI", RecommendationType::Avoid, 2, "Butter and cream"),
    (CHOCOLATE_CAKE, "CD", RecommendationType::Avoid, 1, "Wheat flour"),
    (GARDEN_SALAD, "DM", RecommendationType::HighlyRecommended, 9, "High fibre, low carb"),
    (GARDEN_SALAD, "HTN", RecommendationType::HighlyRecommended, 10, "Potassium rich"),
    (GARDEN_SALAD, "CD", RecommendationType::HighlyRecommended, 9, "Gluten free"),
    (GARDEN_SALAD, "CKD", RecommendationType::Recommended, 7, "Watch potassium dressing"),
    (LAMB_ROGAN_JOSH, "DM", RecommendationType::Recommended, 7, "Low carbohydrate curry"),
    (LAMB_ROGAN_JOSH, "HTN", RecommendationType::Caution, 4, "Salted gravy"),
    (LAMB_ROGAN_JOSH, "GOUT", RecommendationType::Avoid, 2, "Red meat purines"),
    (ORANGE_JUICE, "DM", RecommendationType::Caution, 3, "Fast acting sugar"),
    (ORANGE_JUICE, "HTN", RecommendationType::Recommended, 8, "Potassium source"),
    (ORANGE_JUICE, "IBS", RecommendationType::Caution, 5, "Acidic"),
];

/// Build a food with default optional fields.
///
/// # Panics
/// Panics when `name` is blank.
#[must_use]
pub fn food(id: FoodId, name: &str, category: Category) -> FoodItem {
    FoodItem::new(id, name, category).expect("fixture foods have names")
}

/// Build a recommendation row with a fixture score.
///
/// # Panics
/// Panics when `score` is outside `1..=10`.
#[must_use]
pub fn recommendation(
    food_id: FoodId,
    condition: &str,
    recommendation_type: RecommendationType,
    score: i64,
) -> Recommendation {
    Recommendation::new(
        food_id,
        condition,
        recommendation_type,
        SafetyScore::new(score).expect("fixture scores are in range"),
    )
}

fn sample_food(row: &FoodRow) -> FoodItem {
    let [vegetarian, vegan, gluten_free, dairy_free] = row.flags;
    let mut item = food(row.id, row.name, row.category)
        .with_serving(1.0, "serving")
        .with_dietary(DietaryFlags {
            vegetarian,
            vegan,
            gluten_free,
            dairy_free,
        });
    item = match row.id {
        HAMBURGER => item
            .with_purine_level(PurineLevel::Medium)
            .with_glycemic_index(glycemic(66)),
        GRILLED_CHICKEN => item.with_purine_level(PurineLevel::Medium),
        GRILLED_SALMON | LAMB_ROGAN_JOSH => item.with_purine_level(PurineLevel::High),
        VEGETABLE_BIRYANI => item.with_glycemic_index(glycemic(58)),
        ORANGE_JUICE => item.with_glycemic_index(glycemic(50)),
        _ => item,
    };
    item
}

fn glycemic(value: u8) -> GlycemicIndex {
    GlycemicIndex::new(value).expect("fixture glycemic index is in range")
}

const fn sample_nutrition(row: &FoodRow) -> NutritionFacts {
    let [calories, protein_g, carbs_g, fat_g, saturated_fat_g, sodium_mg, fiber_g, sugar_g] =
        row.nutrition;
    NutritionFacts {
        calories,
        protein_g,
        carbs_g,
        fat_g,
        saturated_fat_g,
        trans_fat_g: 0.0,
        cholesterol_mg: 0.0,
        sodium_mg,
        potassium_mg: 0.0,
        fiber_g,
        sugar_g,
        vitamin_a_iu: 0.0,
        vitamin_c_mg: 0.0,
        calcium_mg: 0.0,
        iron_mg: 0.0,
    }
}

/// Build the sample menu used throughout the test suites.
///
/// # Panics
/// Panics if the fixture tables are inconsistent.
#[must_use]
pub fn sample_catalog() -> MemoryCatalog {
    let mut builder = MemoryCatalog::builder();
    for row in &FOODS {
        builder = builder
            .food(sample_food(row))
            .nutrition(row.id, sample_nutrition(row));
    }
    for (id, name, code) in ALLERGENS {
        builder = builder.allergen(Allergen {
            id,
            name: name.to_owned(),
            code: code.to_owned(),
            severity_warning: format!("Contains {}", name.to_lowercase()),
        });
    }
    for (food_id, allergen_id, severity) in LINKS {
        builder = builder.link_allergen(food_id, allergen_id, severity);
    }
    for (id, name, code) in CONDITIONS {
        builder = builder.condition(HealthCondition {
            id,
            name: name.to_owned(),
            code: code.into(),
            description: String::new(),
        });
    }
    for (food_id, condition, kind, score, reasoning) in RECOMMENDATIONS {
        let mut row = recommendation(food_id, condition, kind, score).with_reasoning(reasoning);
        if food_id == GRILLED_CHICKEN && condition == "DM" {
            row = row.with_guidance("150 g", "daily");
        }
        builder = builder.recommendation(row);
    }
    builder.build().expect("sample catalogue is consistent")
}

#[cfg(feature = "store-sqlite")]
mod sqlite {
    use std::path::Path;

    use rusqlite::{Connection, params};

    use crate::{CatalogStore, Category, MemoryCatalog};

    const SCHEMA: &str = "
        CREATE TABLE food_categories (
            category_id INTEGER PRIMARY KEY,
            category_name TEXT NOT NULL UNIQUE,
            description TEXT
        );
        CREATE TABLE food_items (
            food_id INTEGER PRIMARY KEY,
            food_name TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES food_categories(category_id),
            description TEXT,
            image_path TEXT,
            serving_size REAL,
            serving_unit TEXT,
            is_vegetarian BOOLEAN DEFAULT 0,
            is_vegan BOOLEAN DEFAULT 0,
            is_gluten_free BOOLEAN DEFAULT 0,
            is_dairy_free BOOLEAN DEFAULT 0
        );
        CREATE TABLE nutrition_facts (
            food_id INTEGER PRIMARY KEY REFERENCES food_items(food_id),
            calories REAL, protein_g REAL, carbs_g REAL, fat_g REAL,
            saturated_fat_g REAL, trans_fat_g REAL, cholesterol_mg REAL,
            sodium_mg REAL, potassium_mg REAL, fiber_g REAL, sugar_g REAL,
            vitamin_a_iu REAL, vitamin_c_mg REAL, calcium_mg REAL, iron_mg REAL
        );
        CREATE TABLE allergens (
            allergen_id INTEGER PRIMARY KEY,
            allergen_name TEXT NOT NULL UNIQUE,
            description TEXT
        );
        CREATE TABLE food_allergens (
            food_id INTEGER NOT NULL REFERENCES food_items(food_id),
            allergen_id INTEGER NOT NULL REFERENCES allergens(allergen_id),
            severity_level TEXT
        );
        CREATE TABLE health_conditions (
            condition_id INTEGER PRIMARY KEY,
            condition_name TEXT NOT NULL,
            condition_code TEXT NOT NULL UNIQUE,
            description TEXT
        );
        CREATE TABLE food_recommendations (
            food_id INTEGER NOT NULL REFERENCES food_items(food_id),
            condition_id INTEGER NOT NULL REFERENCES health_conditions(condition_id),
            recommendation_type TEXT NOT NULL,
            safety_score INTEGER NOT NULL,
            reasoning TEXT
        );
    ";

    fn category_id(category: Category) -> usize {
        Category::ALL
            .iter()
            .position(|candidate| *candidate == category)
            .map_or(0, |index| index + 1)
    }

    /// Persist a catalogue using the relational menu schema.
    ///
    /// Allergen codes are not stored; the loader derives them from names.
    pub fn write_sqlite_catalog(path: &Path, catalog: &MemoryCatalog) -> rusqlite::Result<()> {
        let mut connection = Connection::open(path)?;
        connection.execute_batch(SCHEMA)?;
        let tx = connection.transaction()?;

        for category in Category::ALL {
            tx.execute(
                "INSERT INTO food_categories (category_id, category_name) VALUES (?1, ?2)",
                params![category_id(category), category.as_str()],
            )?;
        }
        for food in catalog.all_foods() {
            tx.execute(
                "INSERT INTO food_items (food_id, food_name, category_id, description, \
                 serving_size, serving_unit, is_vegetarian, is_vegan, is_gluten_free, \
                 is_dairy_free) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    food.id,
                    food.name,
                    category_id(food.category),
                    food.description,
                    food.serving_size,
                    food.serving_unit,
                    food.dietary.vegetarian,
                    food.dietary.vegan,
                    food.dietary.gluten_free,
                    food.dietary.dairy_free,
                ],
            )?;
            if let Some(facts) = catalog.nutrition_for(food.id) {
                tx.execute(
                    "INSERT INTO nutrition_facts (food_id, calories, protein_g, carbs_g, fat_g, \
                     saturated_fat_g, trans_fat_g, cholesterol_mg, sodium_mg, potassium_mg, \
                     fiber_g, sugar_g, vitamin_a_iu, vitamin_c_mg, calcium_mg, iron_mg) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                    params![
                        food.id,
                        facts.calories,
                        facts.protein_g,
                        facts.carbs_g,
                        facts.fat_g,
                        facts.saturated_fat_g,
                        facts.trans_fat_g,
                        facts.cholesterol_mg,
                        facts.sodium_mg,
                        facts.potassium_mg,
                        facts.fiber_g,
                        facts.sugar_g,
                        facts.vitamin_a_iu,
                        facts.vitamin_c_mg,
                        facts.calcium_mg,
                        facts.iron_mg,
                    ],
                )?;
            }
            for link in catalog.allergens_for(food.id) {
                tx.execute(
                    "INSERT INTO food_allergens (food_id, allergen_id, severity_level) \
                     VALUES (?1, ?2, ?3)",
                    params![link.food_id, link.allergen_id, link.severity.as_str()],
                )?;
            }
        }
        for allergen in catalog.allergens() {
            tx.execute(
                "INSERT INTO allergens (allergen_id, allergen_name) VALUES (?1, ?2)",
                params![allergen.id, allergen.name],
            )?;
        }
        for condition in catalog.conditions() {
            tx.execute(
                "INSERT INTO health_conditions (condition_id, condition_name, condition_code, \
                 description) VALUES (?1, ?2, ?3, ?4)",
                params![
                    condition.id,
                    condition.name,
                    condition.code.as_str(),
                    condition.description,
                ],
            )?;
        }
        for food in catalog.all_foods() {
            for row in catalog.recommendations_for(food.id) {
                tx.execute(
                    "INSERT INTO food_recommendations (food_id, condition_id, \
                     recommendation_type, safety_score, reasoning) \
                     SELECT ?1, condition_id, ?2, ?3, ?4 FROM health_conditions \
                     WHERE condition_code = ?5",
                    params![
                        row.food_id,
                        row.recommendation_type.as_str(),
                        row.safety_score.get(),
                        row.reasoning,
                        row.condition.as_str(),
                    ],
                )?;
            }
        }
        tx.commit()
    }
}

#[cfg(feature = "store-sqlite")]
pub use sqlite::write_sqlite_catalog;
