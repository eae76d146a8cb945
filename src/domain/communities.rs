// src/domain/communities.rs

use std::collections::HashSet;

const EMBEDDED: &str = include_str!("../../data/la_neighborhoods.txt");

/// Lower-cased community and neighborhood names, used as a membership test on
/// a listing's city field.
#[derive(Debug, Clone, Default)]
pub struct Communities {
    names: HashSet<String>,
}

impl Communities {
    /// One name per line; blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(normalize)
            .collect();
        Self { names }
    }

    /// City of Los Angeles communities shipped with the binary.
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED)
    }

    pub fn contains(&self, city: Option<&str>) -> bool {
        city.is_some_and(|c| self.names.contains(&normalize(c)))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
