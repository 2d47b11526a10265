//! Diagnosis categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Diagnosis category, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Normal,
    /// Common cold
    Resfriado,
    /// Influenza
    Gripe,
}

impl Category {
    /// All categories, least severe first
    pub const ALL: [Category; 3] = [Category::Normal, Category::Resfriado, Category::Gripe];

    /// Label used for output terms, rule facts and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Resfriado => "Resfriado",
            Category::Gripe => "Gripe",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}
