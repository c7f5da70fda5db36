//! Strongly-typed patch identifier.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Prefix shared by every patch branch.
pub const PATCH_BRANCH_PREFIX: &str = "ho-patch/";

const MAX_PATCH_ID_LEN: usize = 100;

/// Strongly-typed wrapper for patch identifiers.
///
/// A patch id is an opaque, human-chosen slug such as `42-add-users`. It ends
/// up in branch names, directory names and stage files, so the accepted
/// alphabet is deliberately narrow: ASCII alphanumerics plus `-`, `_` and `.`,
/// starting with an alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PatchId(String);

impl PatchId {
    /// Validate and wrap a patch id.
    pub fn parse(id: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("must not be empty")
        } else if id.len() > MAX_PATCH_ID_LEN {
            Some("must be at most 100 characters")
        } else if !id.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            Some("must start with a letter or digit")
        } else if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            Some("may only contain letters, digits, '-', '_' and '.'")
        } else if id.contains("..") {
            Some("must not contain '..'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidPatchId {
                id,
                reason: reason.to_string(),
            }),
            None => Ok(Self(id)),
        }
    }

    /// Return the underlying id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Name of the branch that carries this patch's work.
    pub fn branch_name(&self) -> String {
        format!("{PATCH_BRANCH_PREFIX}{}", self.0)
    }

    /// Recover a patch id from a branch name, if it is a patch branch.
    pub fn from_branch(branch: &str) -> Option<Self> {
        branch
            .strip_prefix(PATCH_BRANCH_PREFIX)
            .and_then(|id| Self::parse(id).ok())
    }
}

impl<'de> Deserialize<'de> for PatchId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatchId::parse(s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for PatchId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for PatchId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PatchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PatchId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PatchId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "patch_id_test.rs"]
mod tests;
