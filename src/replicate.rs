//! Replicate keys
//!
//! Runs that share the same nominal condition share a replicate key. The key
//! is a display/grouping aid, never a storage identity.
//!
//! Canonical form: factor/value pairs sorted by field id, rendered as
//! `v:<id>=<value>;...` followed by `|r:<recipe>` (empty when recipe is not
//! a blocking variable), hashed with xxh3-64 and printed as 16 hex digits.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::experiment::{FieldId, RecipeId};

/// Fingerprint of a run's nominal condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicateKey(String);

impl ReplicateKey {
    /// Compute the key for a factor-value set.
    ///
    /// `recipe` should be `Some` only when recipe is a blocking variable.
    #[must_use]
    pub fn compute<I>(values: I, recipe: Option<RecipeId>) -> Self
    where
        I: IntoIterator<Item = (FieldId, f64)>,
    {
        let canonical = canonical_form(values, recipe);
        Self(format!("{:016x}", xxh3_64(canonical.as_bytes())))
    }

    /// Key as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical_form<I>(values: I, recipe: Option<RecipeId>) -> String
where
    I: IntoIterator<Item = (FieldId, f64)>,
{
    let mut pairs: Vec<(FieldId, f64)> = values.into_iter().collect();
    pairs.sort_by_key(|(field, _)| *field);

    let mut out = String::from("v:");
    for (i, (field, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        // -0.0 and 0.0 are the same setting
        let value = if *value == 0.0 { 0.0 } else { *value };
        let _ = write!(out, "{}={value:?}", field.0);
    }
    out.push_str("|r:");
    if let Some(recipe) = recipe {
        let _ = write!(out, "{}", recipe.0);
    }
    out
}
