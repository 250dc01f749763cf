//! Unit tests running each command against the sample menu snapshot.

use super::helpers::{CatalogFiles, output_json};
use super::*;
use crate::assess::AssessArgs;
use crate::catalog::CatalogArgs;
use crate::compare::CompareArgs;
use crate::foods::FoodsArgs;
use crate::meal_plan::MealPlanArgs;
use crate::recommend::RecommendArgs;
use flavorfit_core::InvalidInput;
use flavorfit_core::test_support::{GREEN_TEA, HAMBURGER, MARGHERITA_PIZZA, MINERAL_WATER};
use rstest::{fixture, rstest};
use serde_json::Value;

#[fixture]
fn files() -> CatalogFiles {
    CatalogFiles::new()
}

fn ids(listing: &Value) -> Vec<u64> {
    listing
        .as_array()
        .expect("listing array")
        .iter()
        .map(|food| food["id"].as_u64().expect("numeric id"))
        .collect()
}

#[rstest]
fn foods_lists_drinks_by_name(files: CatalogFiles) {
    let args = FoodsArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        category: Some("drink".to_owned()),
        sort: Some("name".to_owned()),
        ..FoodsArgs::default()
    };
    let mut buffer = Vec::new();
    run_foods_with(args, &mut buffer).expect("foods should succeed");

    let listing = output_json(&buffer);
    let names: Vec<&str> = listing
        .as_array()
        .expect("listing array")
        .iter()
        .map(|food| food["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Fresh Orange Juice", "Green Tea", "Mineral Water"]);
    assert!(listing[0]["verdict"].is_null());
}

#[rstest]
fn foods_excludes_allergens_by_name(files: CatalogFiles) {
    let args = FoodsArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        search: Some("pizza".to_owned()),
        exclude_allergens: vec!["Gluten".to_owned()],
        ..FoodsArgs::default()
    };
    let mut buffer = Vec::new();
    run_foods_with(args, &mut buffer).expect("foods should succeed");
    assert!(!ids(&output_json(&buffer)).contains(&MARGHERITA_PIZZA));
}

#[rstest]
fn foods_attaches_verdicts_for_conditions(files: CatalogFiles) {
    let args = FoodsArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        search: Some("hamburger".to_owned()),
        conditions: vec!["DM".to_owned(), "HTN".to_owned()],
        ..FoodsArgs::default()
    };
    let mut buffer = Vec::new();
    run_foods_with(args, &mut buffer).expect("foods should succeed");

    let listing = output_json(&buffer);
    assert_eq!(ids(&listing), vec![HAMBURGER]);
    assert_eq!(listing[0]["verdict"]["tier"], "Avoid");
    assert_eq!(listing[0]["verdict"]["score"], 2);
}

#[rstest]
fn recommend_prints_verdicts_keyed_by_food(files: CatalogFiles) {
    let args = RecommendArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        conditions: vec!["DM".to_owned()],
        ..RecommendArgs::default()
    };
    let mut buffer = Vec::new();
    run_recommend_with(args, &mut buffer).expect("recommend should succeed");

    let verdicts = output_json(&buffer);
    assert_eq!(verdicts.as_object().expect("map").len(), 11);
    assert_eq!(verdicts[MINERAL_WATER.to_string()]["tier"], "Unrated");
    assert!(verdicts[MINERAL_WATER.to_string()]["score"].is_null());
}

#[rstest]
fn recommend_groups_by_tier(files: CatalogFiles) {
    let args = RecommendArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        conditions: vec!["DM".to_owned()],
        by_tier: true,
        ..RecommendArgs::default()
    };
    let mut buffer = Vec::new();
    run_recommend_with(args, &mut buffer).expect("recommend should succeed");

    let groups = output_json(&buffer);
    assert!(ids_of(&groups["HighlyRecommended"]).contains(&GREEN_TEA));
    assert!(ids_of(&groups["Avoid"]).contains(&HAMBURGER));
}

fn ids_of(group: &Value) -> Vec<u64> {
    group
        .as_array()
        .expect("id array")
        .iter()
        .map(|id| id.as_u64().expect("numeric id"))
        .collect()
}

#[rstest]
fn recommend_rejects_empty_condition_sets(files: CatalogFiles) {
    let args = RecommendArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        ..RecommendArgs::default()
    };
    let mut buffer = Vec::new();
    let err = run_recommend_with(args, &mut buffer).expect_err("empty set should error");
    match err {
        CliError::InvalidInput(InvalidInput::EmptyConditionSet) => {}
        other => panic!("expected EmptyConditionSet, found {other:?}"),
    }
    assert!(buffer.is_empty());
}

#[rstest]
fn compare_reports_differences(files: CatalogFiles) {
    let args = CompareArgs {
        first: Some(HAMBURGER),
        second: Some(GREEN_TEA),
        catalog: Some(files.snapshot().to_path_buf()),
        conditions: vec!["HTN".to_owned()],
        ..CompareArgs::default()
    };
    let mut buffer = Vec::new();
    run_compare_with(args, &mut buffer).expect("compare should succeed");

    let comparison = output_json(&buffer);
    assert_eq!(comparison["first"]["food"]["id"], HAMBURGER);
    assert_eq!(comparison["second"]["food"]["id"], GREEN_TEA);
    assert!(comparison["difference"].is_object());
}

#[rstest]
fn compare_rejects_identical_foods(files: CatalogFiles) {
    let args = CompareArgs {
        first: Some(HAMBURGER),
        second: Some(HAMBURGER),
        catalog: Some(files.snapshot().to_path_buf()),
        ..CompareArgs::default()
    };
    let mut buffer = Vec::new();
    let err = run_compare_with(args, &mut buffer).expect_err("identical ids should error");
    match err {
        CliError::InvalidInput(InvalidInput::IdenticalFoods { id }) => assert_eq!(id, HAMBURGER),
        other => panic!("expected IdenticalFoods, found {other:?}"),
    }
}

#[rstest]
fn assess_scores_the_hamburger_for_hypertension(files: CatalogFiles) {
    let args = AssessArgs {
        food: Some(HAMBURGER),
        condition: Some("HTN".to_owned()),
        catalog: Some(files.snapshot().to_path_buf()),
        ..AssessArgs::default()
    };
    let mut buffer = Vec::new();
    run_assess_with(args, &mut buffer).expect("assess should succeed");

    let assessment = output_json(&buffer);
    assert_eq!(assessment["score"], 50);
    assert_eq!(assessment["status"], "caution");
    assert_eq!(assessment["violations"].as_array().map(Vec::len), Some(3));
}

#[rstest]
fn assess_rejects_unknown_foods(files: CatalogFiles) {
    let args = AssessArgs {
        food: Some(999),
        condition: Some("HTN".to_owned()),
        catalog: Some(files.snapshot().to_path_buf()),
        ..AssessArgs::default()
    };
    let mut buffer = Vec::new();
    let err = run_assess_with(args, &mut buffer).expect_err("unknown food should error");
    match err {
        CliError::InvalidInput(InvalidInput::UnknownFood { id }) => assert_eq!(id, 999),
        other => panic!("expected UnknownFood, found {other:?}"),
    }
}

#[rstest]
fn assess_without_a_food_ranks_the_catalogue(files: CatalogFiles) {
    let args = AssessArgs {
        condition: Some("htn".to_owned()),
        catalog: Some(files.snapshot().to_path_buf()),
        ..AssessArgs::default()
    };
    let mut buffer = Vec::new();
    run_assess_with(args, &mut buffer).expect("ranking should succeed");

    let rankings = output_json(&buffer);
    let [ranking] = rankings.as_array().expect("rankings array").as_slice() else {
        panic!("expected one ranking, got {rankings}");
    };
    assert_eq!(ranking["condition"], "HTN");
    assert!(ids(&ranking["caution"]).contains(&HAMBURGER));
    let safe_scores: Vec<u64> = ranking["safe"]
        .as_array()
        .expect("safe band")
        .iter()
        .map(|food| food["score"].as_u64().expect("score"))
        .collect();
    assert!(safe_scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[rstest]
fn assess_shortlists_the_top_safe_foods(files: CatalogFiles) {
    let args = AssessArgs {
        condition: Some("DM".to_owned()),
        max_items: Some(1),
        catalog: Some(files.snapshot().to_path_buf()),
        ..AssessArgs::default()
    };
    let mut buffer = Vec::new();
    run_assess_with(args, &mut buffer).expect("shortlist should succeed");

    let shortlists = output_json(&buffer);
    let shortlist = &shortlists[0];
    assert!(shortlist["safe_foods"].as_array().map(Vec::len) <= Some(1));
    assert!(shortlist["all_safe"].is_u64());
    assert!(shortlist["total_caution"].is_u64());
    assert!(shortlist["total_avoid"].is_u64());
}

#[rstest]
fn catalog_lists_conditions_allergens_and_categories(files: CatalogFiles) {
    let args = CatalogArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        ..CatalogArgs::default()
    };
    let mut buffer = Vec::new();
    run_catalog_with(args, &mut buffer).expect("catalog should succeed");

    let overview = output_json(&buffer);
    assert_eq!(overview["conditions"].as_array().map(Vec::len), Some(7));
    assert_eq!(overview["allergens"].as_array().map(Vec::len), Some(6));
    assert_eq!(overview["categories"].as_array().map(Vec::len), Some(9));
}

#[rstest]
fn meal_plan_prints_the_seed_with_the_plan(files: CatalogFiles) {
    let args = MealPlanArgs {
        catalog: Some(files.snapshot().to_path_buf()),
        conditions: vec!["DM".to_owned()],
        seed: Some(7),
        ..MealPlanArgs::default()
    };
    let mut buffer = Vec::new();
    run_meal_plan_with(args, &DefaultMealPlannerBuilder, &mut buffer)
        .expect("meal plan should succeed");

    let output = output_json(&buffer);
    assert_eq!(output["seed"], 7);
    let roles: Vec<&str> = output["plan"]["entries"]
        .as_array()
        .expect("entries")
        .iter()
        .map(|entry| entry["role"].as_str().expect("role"))
        .collect();
    assert_eq!(roles, vec!["Protein", "Side", "Drink"]);
    assert!(output["plan"]["total_calories"].as_f64().expect("total") > 0.0);
}

#[cfg(feature = "store-sqlite")]
#[rstest]
fn foods_reads_sqlite_catalogues(files: CatalogFiles) {
    let args = FoodsArgs {
        database: Some(files.database()),
        search: Some("tea".to_owned()),
        ..FoodsArgs::default()
    };
    let mut buffer = Vec::new();
    run_foods_with(args, &mut buffer).expect("foods should succeed");
    assert_eq!(ids(&output_json(&buffer)), vec![GREEN_TEA]);
}
