//! Allergens, food-allergen links and the allergen exclusion filter.
//!
//! Exclusion is deliberately conservative: a food linked to an excluded
//! allergen fails the filter whatever the link's severity, so `Traces` and
//! `May Contain` exclude exactly like `Contains`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::FoodId;

/// Identifier of an allergen.
pub type AllergenId = u64;

/// A catalogued allergen such as gluten or dairy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allergen {
    /// Unique identifier.
    pub id: AllergenId,
    /// Display name, e.g. `Gluten`.
    pub name: String,
    /// Short code, e.g. `gluten`.
    pub code: String,
    /// Warning text shown alongside foods that contain it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub severity_warning: String,
}

/// How strongly a food is associated with an allergen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllergenSeverity {
    /// The allergen is an ingredient.
    Contains,
    /// Cross-contact is possible.
    MayContain,
    /// Trace amounts may be present.
    Traces,
}

impl AllergenSeverity {
    /// Return the label used by the catalogue.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "Contains",
            Self::MayContain => "May Contain",
            Self::Traces => "Traces",
        }
    }
}

impl fmt::Display for AllergenSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown allergen severity '{0}'")]
pub struct UnknownSeverity(pub String);

impl FromStr for AllergenSeverity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "contains" => Ok(Self::Contains),
            "may contain" | "maycontain" => Ok(Self::MayContain),
            "traces" | "trace" => Ok(Self::Traces),
            _ => Err(UnknownSeverity(s.to_owned())),
        }
    }
}

/// Link between a food and one allergen.
///
/// The allergen's code and name are carried on the link so filters and
/// comparisons need no second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllergenLink {
    /// Linked food.
    pub food_id: FoodId,
    /// Linked allergen.
    pub allergen_id: AllergenId,
    /// Allergen code, e.g. `gluten`.
    pub code: String,
    /// Allergen display name, e.g. `Gluten`.
    pub name: String,
    /// Severity of the association.
    pub severity: AllergenSeverity,
}

impl AllergenLink {
    /// Build a link from an allergen record.
    #[must_use]
    pub fn new(food_id: FoodId, allergen: &Allergen, severity: AllergenSeverity) -> Self {
        Self {
            food_id,
            allergen_id: allergen.id,
            code: allergen.code.clone(),
            name: allergen.name.clone(),
            severity,
        }
    }
}

/// Set of allergens a caller wants to avoid.
///
/// Entries are trimmed and lower-cased; blank entries are dropped. An entry
/// matches a link when it equals the link's code or name, ignoring case.
/// Unknown entries never match anything.
///
/// # Examples
/// ```
/// use flavorfit_core::{AllergenExclusion, AllergenLink, AllergenSeverity};
///
/// let link = AllergenLink {
///     food_id: 1,
///     allergen_id: 1,
///     code: "gluten".into(),
///     name: "Gluten".into(),
///     severity: AllergenSeverity::Traces,
/// };
/// let exclusion = AllergenExclusion::new(["GLUTEN"]);
/// assert!(!exclusion.passes(&[link]));
/// assert!(exclusion.passes(&[]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllergenExclusion {
    excluded: BTreeSet<String>,
}

impl AllergenExclusion {
    /// Build an exclusion set from codes or names.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { excluded }
    }

    /// An exclusion set that lets every food through.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            excluded: BTreeSet::new(),
        }
    }

    /// Report whether nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Iterate over the normalised entries.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    /// Report whether a single link references an excluded allergen.
    #[must_use]
    pub fn excludes(&self, link: &AllergenLink) -> bool {
        self.excluded.contains(&link.code.to_lowercase())
            || self.excluded.contains(&link.name.to_lowercase())
    }

    /// Return `true` when none of a food's links is excluded.
    ///
    /// A food with no links always passes.
    #[must_use]
    pub fn passes(&self, links: &[AllergenLink]) -> bool {
        if self.excluded.is_empty() {
            return true;
        }
        !links.iter().any(|link| self.excludes(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn link(code: &str, name: &str, severity: AllergenSeverity) -> AllergenLink {
        AllergenLink {
            food_id: 4,
            allergen_id: 1,
            code: code.to_owned(),
            name: name.to_owned(),
            severity,
        }
    }

    #[fixture]
    fn pizza_links() -> Vec<AllergenLink> {
        vec![
            link("gluten", "Gluten", AllergenSeverity::Contains),
            link("dairy", "Dairy", AllergenSeverity::Contains),
        ]
    }

    #[rstest]
    fn excluded_gluten_rejects_pizza(pizza_links: Vec<AllergenLink>) {
        let exclusion = AllergenExclusion::new(["gluten"]);
        assert!(!exclusion.passes(&pizza_links));
    }

    #[rstest]
    #[case(AllergenSeverity::Contains)]
    #[case(AllergenSeverity::MayContain)]
    #[case(AllergenSeverity::Traces)]
    fn every_severity_excludes(#[case] severity: AllergenSeverity) {
        let exclusion = AllergenExclusion::new(["nuts"]);
        assert!(!exclusion.passes(&[link("nuts", "Tree Nuts", severity)]));
    }

    #[rstest]
    fn matches_on_name_ignoring_case() {
        let exclusion = AllergenExclusion::new(["  DAIRY "]);
        assert!(!exclusion.passes(&[link("milk", "Dairy", AllergenSeverity::Traces)]));
    }

    #[rstest]
    fn unknown_codes_never_match(pizza_links: Vec<AllergenLink>) {
        let exclusion = AllergenExclusion::new(["sesame"]);
        assert!(exclusion.passes(&pizza_links));
    }

    #[rstest]
    fn foods_without_links_always_pass() {
        let exclusion = AllergenExclusion::new(["gluten", "dairy", "eggs"]);
        assert!(exclusion.passes(&[]));
    }

    #[rstest]
    fn blank_entries_are_dropped() {
        let exclusion = AllergenExclusion::new(["", "   "]);
        assert!(exclusion.is_empty());
    }

    #[rstest]
    #[case("Contains", AllergenSeverity::Contains)]
    #[case("May Contain", AllergenSeverity::MayContain)]
    #[case("may_contain", AllergenSeverity::MayContain)]
    #[case("TRACES", AllergenSeverity::Traces)]
    fn parses_severity_labels(#[case] raw: &str, #[case] expected: AllergenSeverity) {
        assert_eq!(raw.parse::<AllergenSeverity>(), Ok(expected));
    }
}
