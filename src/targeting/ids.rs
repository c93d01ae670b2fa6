//! Explicit ID lists
//!
//! Editors store ID lists as one delimited string, e.g. `"HH-1, HH-2"`.
//! Parsing accepts commas and any whitespace; rendering always uses `", "`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered list of unicef IDs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IdList(Vec<String>);

impl IdList {
    /// Split a delimited string, dropping empty entries
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for IdList {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for IdList {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<IdList> for String {
    fn from(list: IdList) -> Self {
        list.to_string()
    }
}

impl<S: Into<String>> FromIterator<S> for IdList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
