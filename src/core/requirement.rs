//! Dependency requirements declared in the manifest (`name~=1.0.0`).

use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

const REQUIREMENT_PATTERN: &str =
    r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:(===|~=|==|!=|<=|>=|<|>)\s*([A-Za-z0-9*+!._-]+))?$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "~=")]
    Compatible,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "===")]
    Arbitrary,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Compatible => "~=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Arbitrary => "===",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "~=" => Some(Operator::Compatible),
            "==" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            "<=" => Some(Operator::LessOrEqual),
            ">=" => Some(Operator::GreaterOrEqual),
            "<" => Some(Operator::Less),
            ">" => Some(Operator::Greater),
            "===" => Some(Operator::Arbitrary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub operator: Operator,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
}

impl Requirement {
    pub fn parse(raw: &str) -> Result<Self> {
        let re = Regex::new(REQUIREMENT_PATTERN)
            .map_err(|e| Error::internal_unexpected(e.to_string()))?;

        let trimmed = raw.trim();
        let caps = re.captures(trimmed).ok_or_else(|| {
            Error::config_invalid_value(
                "installRequires",
                Some(raw.to_string()),
                "Expected '<name>' or '<name><op><version>' with op one of ~= == != <= >= < > ===",
            )
        })?;

        let name = caps[1].to_string();
        let constraint = match (caps.get(2), caps.get(3)) {
            (Some(op), Some(version)) => Some(Constraint {
                operator: Operator::from_symbol(op.as_str()).ok_or_else(|| {
                    Error::config_invalid_value(
                        "installRequires",
                        Some(raw.to_string()),
                        format!("Unknown operator '{}'", op.as_str()),
                    )
                })?,
                version: version.as_str().to_string(),
            }),
            _ => None,
        };

        Ok(Self { name, constraint })
    }

    pub fn parse_all(raw: &[String]) -> Result<Vec<Self>> {
        raw.iter().map(|r| Self::parse(r)).collect()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}{}{}", self.name, c.operator.as_str(), c.version),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compatible_release() {
        let req = Requirement::parse("absl-py~=1.0.0").unwrap();
        assert_eq!(req.name, "absl-py");
        let c = req.constraint.unwrap();
        assert_eq!(c.operator, Operator::Compatible);
        assert_eq!(c.version, "1.0.0");
    }

    #[test]
    fn parses_bare_name() {
        let req = Requirement::parse("dm-tree").unwrap();
        assert_eq!(req.name, "dm-tree");
        assert!(req.constraint.is_none());
        assert_eq!(req.to_string(), "dm-tree");
    }

    #[test]
    fn tolerates_spaces_around_operator() {
        let req = Requirement::parse("  tensorflow >= 2.4 ").unwrap();
        assert_eq!(req.to_string(), "tensorflow>=2.4");
    }

    #[test]
    fn distinguishes_arbitrary_equality() {
        let req = Requirement::parse("scipy===1.5.0").unwrap();
        assert_eq!(req.constraint.unwrap().operator, Operator::Arbitrary);
    }

    #[test]
    fn display_is_canonical() {
        for raw in ["numpy~=1.21.5", "pandas==1.1.4", "attrs!=21.1.0", "scikit-learn<2"] {
            assert_eq!(Requirement::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = Requirement::parse("numpy=>1.0").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["value"], "numpy=>1.0");
    }

    #[test]
    fn rejects_empty_entry() {
        assert!(Requirement::parse("").is_err());
    }

    #[test]
    fn parse_all_keeps_order() {
        let raw = vec!["b~=1.0".to_string(), "a~=2.0".to_string()];
        let reqs = Requirement::parse_all(&raw).unwrap();
        assert_eq!(reqs[0].name, "b");
        assert_eq!(reqs[1].name, "a");
    }
}
