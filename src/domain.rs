use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::OraError;

/// Adjusted p-value at or below which a term counts as significant.
pub const SIGNIFICANCE_CUTOFF: f64 = 0.05;

/// Number of rows charted after every successful analysis.
pub const DEFAULT_TOP_RESULTS: usize = 10;

/// Upper bound on charted rows; keeps the bitmap at a sane size.
pub const MAX_TOP_RESULTS: usize = 100;

pub const DEFAULT_LIBRARIES: [&str; 3] = [
    "GO_Biological_Process_2021",
    "KEGG_2021_Human",
    "Reactome_2022",
];

pub fn default_libraries() -> Vec<Library> {
    DEFAULT_LIBRARIES
        .iter()
        .map(|name| Library(name.to_string()))
        .collect()
}

/// Name of an Enrichr gene-set library, e.g. `KEGG_2021_Human`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Library(String);

impl Library {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Library {
    type Err = OraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '+'));
        if !is_valid {
            return Err(OraError::InvalidLibrary(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

impl TryFrom<String> for Library {
    type Error = OraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Library> for String {
    fn from(value: Library) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Organism {
    #[default]
    Human,
    Mouse,
    Fly,
    Yeast,
    Worm,
    Fish,
}

impl Organism {
    /// Enrichr deployment serving this organism's libraries.
    pub fn enrichr_url(&self) -> &'static str {
        match self {
            Organism::Human | Organism::Mouse => "https://maayanlab.cloud/Enrichr",
            Organism::Fly => "https://maayanlab.cloud/FlyEnrichr",
            Organism::Yeast => "https://maayanlab.cloud/YeastEnrichr",
            Organism::Worm => "https://maayanlab.cloud/WormEnrichr",
            Organism::Fish => "https://maayanlab.cloud/FishEnrichr",
        }
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Organism::Human => write!(f, "human"),
            Organism::Mouse => write!(f, "mouse"),
            Organism::Fly => write!(f, "fly"),
            Organism::Yeast => write!(f, "yeast"),
            Organism::Worm => write!(f, "worm"),
            Organism::Fish => write!(f, "fish"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeneCase {
    #[default]
    Upper,
    Preserve,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_library_valid() {
        let library: Library = " KEGG_2021_Human ".parse().unwrap();
        assert_eq!(library.as_str(), "KEGG_2021_Human");
    }

    #[test]
    fn parse_library_invalid() {
        let err = "KEGG 2021".parse::<Library>().unwrap_err();
        assert_matches!(err, OraError::InvalidLibrary(_));

        let err = "".parse::<Library>().unwrap_err();
        assert_matches!(err, OraError::InvalidLibrary(_));
    }

    #[test]
    fn default_library_set() {
        let names: Vec<String> = default_libraries()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            names,
            vec!["GO_Biological_Process_2021", "KEGG_2021_Human", "Reactome_2022"]
        );
    }

    #[test]
    fn organism_routing() {
        assert_eq!(Organism::Human.enrichr_url(), Organism::Mouse.enrichr_url());
        assert!(Organism::Fly.enrichr_url().ends_with("/FlyEnrichr"));
        assert_eq!(Organism::default(), Organism::Human);
    }
}
