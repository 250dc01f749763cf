//! Seeded random meal planning for FlavorFit.
//!
//! This crate provides [`RandomMealPlanner`], the default implementation of
//! the [`MealPlanner`](flavorfit_core::MealPlanner) trait. For each request it
//! builds the set of foods that are safe for every requested condition and
//! free of the excluded allergens, then picks one food per meal role with a
//! `ChaCha8Rng` seeded from the request. The same request over the same
//! catalogue therefore always yields the same plan.
//!
//! [`select_meal`] exposes the per-role selection on its own for callers that
//! already hold a safe-food set and their own random number generator.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod planner;

pub use planner::{MealPlannerConfig, RandomMealPlanner, select_meal};
