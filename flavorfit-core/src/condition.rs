//! Health conditions and validated condition sets.

use std::collections::BTreeSet;
use std::fmt;

use crate::InvalidInput;

/// Identifier of a health condition.
pub type ConditionId = u64;

/// Normalised health condition code such as `DM` or `HTN`.
///
/// Codes are trimmed and upper-cased so lookups ignore case.
///
/// # Examples
/// ```
/// use flavorfit_core::ConditionCode;
///
/// assert_eq!(ConditionCode::new(" htn ").as_str(), "HTN");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub struct ConditionCode(String);

impl ConditionCode {
    /// Normalise and wrap a code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Borrow the normalised code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Report whether the code is blank after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConditionCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for ConditionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<ConditionCode> for String {
    fn from(code: ConditionCode) -> Self {
        code.0
    }
}

/// A catalogued health condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthCondition {
    /// Unique identifier.
    pub id: ConditionId,
    /// Display name, e.g. `Diabetes`.
    pub name: String,
    /// Short code, e.g. `DM`.
    pub code: ConditionCode,
    /// Dietary guidance for the condition.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

/// Non-empty, de-duplicated set of condition codes held by one user.
///
/// Codes iterate in lexicographic order, which fixes the order of
/// per-condition entries in verdicts.
///
/// # Examples
/// ```
/// use flavorfit_core::{ConditionSet, InvalidInput};
///
/// let set = ConditionSet::new(["htn", "DM", "HTN"]).expect("valid codes");
/// assert_eq!(set.len(), 2);
/// assert_eq!(ConditionSet::new(Vec::<String>::new()), Err(InvalidInput::EmptyConditionSet));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    codes: BTreeSet<ConditionCode>,
}

impl ConditionSet {
    /// Validate and collect condition codes.
    ///
    /// # Errors
    /// Returns [`InvalidInput::EmptyConditionSet`] when no non-blank code is
    /// supplied.
    pub fn new<I, S>(codes: I) -> Result<Self, InvalidInput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes: BTreeSet<ConditionCode> = codes
            .into_iter()
            .map(ConditionCode::new)
            .filter(|code| !code.is_blank())
            .collect();
        if codes.is_empty() {
            return Err(InvalidInput::EmptyConditionSet);
        }
        Ok(Self { codes })
    }

    /// Iterate over the codes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &ConditionCode> {
        self.codes.iter()
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Report whether a code belongs to the set.
    #[must_use]
    pub fn contains(&self, code: &ConditionCode) -> bool {
        self.codes.contains(code)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ConditionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.codes.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ConditionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let codes = <Vec<String> as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(codes).map_err(serde::de::Error::custom)
    }
}
