//! Ordered rule storage and first-match lookup.
//!
//! # Responsibilities
//! - Hold compiled rules in configured order
//! - Return the first present output whose rule matches a candidate
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - O(n) scan in declaration order; earlier rules win on overlap
//! - A rule with no output for a destination is invisible to that destination

use serde_json::Value;

use crate::config::schema::MappingConfig;
use crate::config::validation::ValidationError;
use crate::ipmap::matcher::{InvalidInput, RuleInput, ZonedAddr};

/// One compiled mapping: an input rule plus one optional output per destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub input: RuleInput,
    pub outputs: Vec<Option<String>>,
}

impl Rule {
    /// Compile a configured mapping.
    pub fn from_config(mapping: &MappingConfig) -> Result<Self, InvalidInput> {
        Ok(Self {
            input: RuleInput::parse(&mapping.input)?,
            outputs: mapping
                .outputs
                .iter()
                .map(|out| out.as_ref().and_then(output_text))
                .collect(),
        })
    }
}

/// Textual form of a configured output. `null` stays absent.
fn output_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Rules in the order they were configured.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    rules: Vec<Rule>,
}

impl MappingTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile every configured mapping, stopping at the first bad input.
    pub fn from_config(mappings: &[MappingConfig]) -> Result<Self, ValidationError> {
        let rules = mappings
            .iter()
            .enumerate()
            .map(|(index, m)| {
                Rule::from_config(m).map_err(|InvalidInput(input)| {
                    ValidationError::InvalidRuleInput { index, input }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Find the output of the first rule that has a value at `destination`
    /// and matches `candidate`.
    pub fn lookup(&self, candidate: &ZonedAddr, destination: usize) -> Option<&str> {
        self.rules.iter().find_map(|rule| {
            let output = rule.outputs.get(destination)?.as_deref()?;
            rule.input.matches(candidate).then_some(output)
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ip(s: &str) -> ZonedAddr {
        s.parse().unwrap()
    }

    fn rule(input: &str, outputs: &[Option<&str>]) -> Rule {
        Rule {
            input: RuleInput::parse(input).unwrap(),
            outputs: outputs.iter().map(|o| o.map(str::to_string)).collect(),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let table = MappingTable::new(vec![
            rule("10.0.0.0/24", &[Some("narrow")]),
            rule("10.0.0.0/8", &[Some("wide")]),
        ]);
        assert_eq!(table.lookup(&ip("10.0.0.5"), 0), Some("narrow"));
        assert_eq!(table.lookup(&ip("10.9.0.5"), 0), Some("wide"));
        assert_eq!(table.lookup(&ip("11.0.0.1"), 0), None);
    }

    #[test]
    fn test_declaration_order_not_prefix_length() {
        let table = MappingTable::new(vec![
            rule("10.0.0.0/8", &[Some("wide")]),
            rule("10.0.0.0/24", &[Some("narrow")]),
        ]);
        assert_eq!(table.lookup(&ip("10.0.0.5"), 0), Some("wide"));
    }

    #[test]
    fn test_absent_output_is_transparent() {
        let table = MappingTable::new(vec![
            rule("10.0.0.1", &[None, Some("first-b")]),
            rule("10.0.0.0/8", &[Some("second-a"), Some("second-b")]),
        ]);
        assert_eq!(table.lookup(&ip("10.0.0.1"), 0), Some("second-a"));
        assert_eq!(table.lookup(&ip("10.0.0.1"), 1), Some("first-b"));
    }

    #[test]
    fn test_all_matching_rules_absent() {
        let table = MappingTable::new(vec![
            rule("10.0.0.1", &[None]),
            rule("10.0.0.0/8", &[None]),
        ]);
        assert_eq!(table.lookup(&ip("10.0.0.1"), 0), None);
    }

    #[test]
    fn test_empty_string_is_present() {
        let table = MappingTable::new(vec![
            rule("10.0.0.1", &[Some("")]),
            rule("10.0.0.0/8", &[Some("fallthrough")]),
        ]);
        assert_eq!(table.lookup(&ip("10.0.0.1"), 0), Some(""));
    }

    #[test]
    fn test_empty_table() {
        let table = MappingTable::from_config(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.lookup(&ip("10.0.0.1"), 0), None);

        let table = MappingTable::new(vec![rule("10.0.0.1", &[Some("a")])]);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_out_of_range_destination() {
        let table = MappingTable::new(vec![rule("10.0.0.1", &[Some("a")])]);
        assert_eq!(table.lookup(&ip("10.0.0.1"), 3), None);
    }

    #[test]
    fn test_from_config_output_text() {
        let mappings = vec![MappingConfig {
            input: "192.168.0.0/16".into(),
            outputs: vec![
                Some(json!("text")),
                Some(json!(42)),
                Some(json!(true)),
                None,
                Some(Value::Null),
                Some(json!(["a", 1])),
            ],
        }];
        let table = MappingTable::from_config(&mappings).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rules()[0].outputs,
            vec![
                Some("text".to_string()),
                Some("42".to_string()),
                Some("true".to_string()),
                None,
                None,
                Some(r#"["a",1]"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_from_config_rejects_bad_input() {
        let mappings = vec![MappingConfig {
            input: "not-an-ip".into(),
            outputs: vec![Some(json!("x"))],
        }];
        assert_eq!(
            MappingTable::from_config(&mappings).unwrap_err(),
            ValidationError::InvalidRuleInput {
                index: 0,
                input: "not-an-ip".into()
            }
        );
    }
}
