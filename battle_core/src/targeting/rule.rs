//! Target rule parsing

use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Whose roster a rule draws from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The acting combatant only
    #[serde(rename = "self")]
    Actor,
    /// Live members of the actor's side, the actor included
    Mate,
    /// Live members of the opposing side
    Enemy,
}

/// How many targets a rule selects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Count(usize),
    All,
}

/// How targets are picked from the pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Random,
    Highest(Attribute),
    Lowest(Attribute),
}

/// A parsed target rule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub scope: Scope,
    pub quantity: Quantity,
    pub method: Method,
}

/// Why a target rule did not parse
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("target rule is empty")]
    Empty,
    #[error("unknown scope '{0}'")]
    UnknownScope(String),
    #[error("missing quantity")]
    MissingQuantity,
    #[error("quantity '{0}' is not a positive integer or 'all'")]
    InvalidQuantity(String),
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
    #[error("method '{0}' requires an attribute parameter")]
    MissingParam(String),
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    #[error("unexpected trailing segment '{0}'")]
    TrailingSegment(String),
}

impl TargetSpec {
    /// Parse a rule such as `enemy:2:highest:damage`
    pub fn parse(rule: &str) -> Result<TargetSpec, TargetParseError> {
        if rule.is_empty() {
            return Err(TargetParseError::Empty);
        }

        let mut segments = rule.split(':');

        let scope = match segments.next() {
            Some("self") => Scope::Actor,
            Some("mate") => Scope::Mate,
            Some("enemy") => Scope::Enemy,
            Some(other) => return Err(TargetParseError::UnknownScope(other.to_string())),
            None => return Err(TargetParseError::Empty),
        };

        let quantity = match segments.next() {
            Some("all") => Quantity::All,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 && raw.bytes().all(|b| b.is_ascii_digit()) => Quantity::Count(n),
                _ => return Err(TargetParseError::InvalidQuantity(raw.to_string())),
            },
            None => return Err(TargetParseError::MissingQuantity),
        };

        let method_name = segments.next();
        let param = segments
            .next()
            .map(|name| {
                Attribute::from_name(name)
                    .ok_or_else(|| TargetParseError::UnknownAttribute(name.to_string()))
            })
            .transpose()?;

        if let Some(extra) = segments.next() {
            return Err(TargetParseError::TrailingSegment(extra.to_string()));
        }

        let method = match (method_name, param) {
            (None, _) | (Some("random"), _) => Method::Random,
            (Some("highest"), Some(attribute)) => Method::Highest(attribute),
            (Some("lowest"), Some(attribute)) => Method::Lowest(attribute),
            (Some(name @ ("highest" | "lowest")), None) => {
                return Err(TargetParseError::MissingParam(name.to_string()))
            }
            (Some(other), _) => return Err(TargetParseError::UnknownMethod(other.to_string())),
        };

        Ok(TargetSpec {
            scope,
            quantity,
            method,
        })
    }

    /// The rule every basic attack uses
    pub fn single_random_enemy() -> TargetSpec {
        TargetSpec {
            scope: Scope::Enemy,
            quantity: Quantity::Count(1),
            method: Method::Random,
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetSpec::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            Scope::Actor => "self",
            Scope::Mate => "mate",
            Scope::Enemy => "enemy",
        };
        write!(f, "{}:", scope)?;
        match self.quantity {
            Quantity::Count(n) => write!(f, "{}", n)?,
            Quantity::All => write!(f, "all")?,
        }
        match self.method {
            Method::Random => write!(f, ":random"),
            Method::Highest(attr) => write!(f, ":highest:{}", attribute_name(attr)),
            Method::Lowest(attr) => write!(f, ":lowest:{}", attribute_name(attr)),
        }
    }
}

fn attribute_name(attribute: Attribute) -> &'static str {
    match attribute {
        Attribute::Damage => "damage",
        Attribute::Vitality => "vitality",
        Attribute::Speed => "speed",
        Attribute::Resistance => "resistance",
        Attribute::Evasion => "evasion",
        Attribute::Health => "health",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_rule() {
        let spec = TargetSpec::parse("mate:all").unwrap();
        assert_eq!(spec.scope, Scope::Mate);
        assert_eq!(spec.quantity, Quantity::All);
        assert_eq!(spec.method, Method::Random);
    }

    #[test]
    fn test_parse_full_rule() {
        let spec = TargetSpec::parse("enemy:2:highest:damage").unwrap();
        assert_eq!(spec.scope, Scope::Enemy);
        assert_eq!(spec.quantity, Quantity::Count(2));
        assert_eq!(spec.method, Method::Highest(Attribute::Damage));
    }

    #[test]
    fn test_parse_self_and_lowest() {
        assert_eq!(TargetSpec::parse("self:1").unwrap().scope, Scope::Actor);
        assert_eq!(
            TargetSpec::parse("mate:1:lowest:health").unwrap().method,
            Method::Lowest(Attribute::Health)
        );
        assert_eq!(
            TargetSpec::parse("enemy:1:random").unwrap(),
            TargetSpec::single_random_enemy()
        );
    }

    #[test]
    fn test_parse_failures() {
        let cases = [
            ("", TargetParseError::Empty),
            ("ally:1", TargetParseError::UnknownScope("ally".to_string())),
            ("enemy", TargetParseError::MissingQuantity),
            ("enemy:two", TargetParseError::InvalidQuantity("two".to_string())),
            ("enemy:0", TargetParseError::InvalidQuantity("0".to_string())),
            ("enemy:-1", TargetParseError::InvalidQuantity("-1".to_string())),
            ("enemy:+1", TargetParseError::InvalidQuantity("+1".to_string())),
            ("enemy:1:strongest", TargetParseError::UnknownMethod("strongest".to_string())),
            ("enemy:1:highest", TargetParseError::MissingParam("highest".to_string())),
            ("enemy:1:lowest:luck", TargetParseError::UnknownAttribute("luck".to_string())),
            ("enemy:1:highest:damage:x", TargetParseError::TrailingSegment("x".to_string())),
            ("Enemy:1", TargetParseError::UnknownScope("Enemy".to_string())),
        ];
        for (rule, expected) in cases {
            assert_eq!(TargetSpec::parse(rule), Err(expected), "rule: {:?}", rule);
        }
    }

    #[test]
    fn test_display_round_trips() {
        for rule in ["enemy:2:highest:damage", "mate:all:random", "self:1:random"] {
            let spec: TargetSpec = rule.parse().unwrap();
            assert_eq!(spec.to_string(), rule);
        }
    }
}
