use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Fixed vocabulary of the `technologies` lookup table. Declaration order is the seed order,
/// so the variant index + 1 is the seeded id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Technology {
    JavaScript,
    Python,
    React,
    #[serde(rename = "Express.js")]
    ExpressJs,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    Django,
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    #[serde(rename = "MongoDB")]
    MongoDb,
}

impl Technology {
    pub const ALL: [Technology; 9] = [
        Technology::JavaScript,
        Technology::Python,
        Technology::React,
        Technology::ExpressJs,
        Technology::Html,
        Technology::Css,
        Technology::Django,
        Technology::PostgreSql,
        Technology::MongoDb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Technology::JavaScript => "JavaScript",
            Technology::Python => "Python",
            Technology::React => "React",
            Technology::ExpressJs => "Express.js",
            Technology::Html => "HTML",
            Technology::Css => "CSS",
            Technology::Django => "Django",
            Technology::PostgreSql => "PostgreSQL",
            Technology::MongoDb => "MongoDB",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names match exactly (case-sensitive).
impl FromStr for Technology {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(AppError::UnsupportedTechnology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_listed_name() {
        for name in Technology::names() {
            let tech: Technology = name.parse().unwrap();
            assert_eq!(tech.as_str(), name);
        }
    }

    #[test]
    fn rejects_unknown_and_differently_cased_names() {
        assert!(matches!("Rust".parse::<Technology>(), Err(AppError::UnsupportedTechnology)));
        assert!(matches!("python".parse::<Technology>(), Err(AppError::UnsupportedTechnology)));
        assert!("".parse::<Technology>().is_err());
    }

    #[test]
    fn serializes_as_display_name() {
        assert_eq!(serde_json::to_value(Technology::ExpressJs).unwrap(), "Express.js");
        assert_eq!(Technology::PostgreSql.to_string(), "PostgreSQL");
    }
}
