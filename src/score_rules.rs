use regex::Regex;
use std::num::ParseFloatError;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreRuleError {
    #[error("The modify score rule {rule:?} must have the form: <pattern> <operator> <value>")]
    Malformed { rule: String },

    #[error("The modify score pattern {pattern:?} is invalid: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("The modify score operator {operator:?} in rule {rule:?} is unknown")]
    Operator { rule: String, operator: String },

    #[error("The modify score value {value:?} in rule {rule:?} is invalid: {source}")]
    Operand {
        rule: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOp {
    Multiply,
    Add,
    Subtract,
    Divide,
}

impl ScoreOp {
    pub fn apply(self, score: f64, operand: f64) -> f64 {
        match self {
            ScoreOp::Multiply => score * operand,
            ScoreOp::Add => score + operand,
            ScoreOp::Subtract => score - operand,
            ScoreOp::Divide => score / operand,
        }
    }
}

impl FromStr for ScoreOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*=" => Ok(ScoreOp::Multiply),
            "+=" => Ok(ScoreOp::Add),
            "-=" => Ok(ScoreOp::Subtract),
            "/=" => Ok(ScoreOp::Divide),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoreRule {
    pub pattern: Regex,
    pub op: ScoreOp,
    pub operand: f64,
}

impl ScoreRule {
    /// Parse `"<pattern> <operator> <value>"`. The operator and value are the
    /// last two whitespace-separated tokens, so the pattern may contain spaces.
    pub fn parse(rule: &str) -> Result<Self, ScoreRuleError> {
        let malformed = || ScoreRuleError::Malformed {
            rule: rule.to_string(),
        };
        let mut parts = rule.trim().rsplitn(3, char::is_whitespace);
        let value = parts.next().filter(|v| !v.is_empty()).ok_or_else(malformed)?;
        let operator = parts.next().ok_or_else(malformed)?;
        let pattern = parts.next().map(str::trim_end).ok_or_else(malformed)?;
        if pattern.is_empty() {
            return Err(malformed());
        }

        let pattern = Regex::new(pattern).map_err(|source| ScoreRuleError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let op = operator.parse().map_err(|()| ScoreRuleError::Operator {
            rule: rule.to_string(),
            operator: operator.to_string(),
        })?;
        let operand = value.parse().map_err(|source| ScoreRuleError::Operand {
            rule: rule.to_string(),
            value: value.to_string(),
            source,
        })?;
        Ok(ScoreRule {
            pattern,
            op,
            operand,
        })
    }
}

/// Ordered score modifiers applied to every ranked match.
#[derive(Debug, Clone, Default)]
pub struct ScoreRules {
    rules: Vec<ScoreRule>,
}

impl ScoreRules {
    pub fn compile<S: AsRef<str>>(rules: &[S]) -> Result<Self, ScoreRuleError> {
        let rules = rules
            .iter()
            .map(|rule| ScoreRule::parse(rule.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScoreRules { rules })
    }

    pub fn apply(&self, text: &str, score: f64) -> f64 {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(text))
            .fold(score, |acc, rule| rule.op.apply(acc, rule.operand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_in_declaration_order() {
        let rules = ScoreRules::compile(&["a.* *= 2", "b.* += 1"]).unwrap();
        assert_eq!(rules.apply("abc", 5.0), 11.0);
        assert_eq!(rules.apply("acd", 5.0), 10.0);
        assert_eq!(rules.apply("xyz", 5.0), 5.0);

        let reversed = ScoreRules::compile(&["b.* += 1", "a.* *= 2"]).unwrap();
        assert_eq!(reversed.apply("abc", 5.0), 12.0);
    }

    #[test]
    fn all_operators() {
        let rules = ScoreRules::compile(&["x -= 3", "x /= 4"]).unwrap();
        assert_eq!(rules.apply("x", 11.0), 2.0);
    }

    #[test]
    fn default_hidden_rule() {
        let rules = ScoreRules::compile(&[r"(^|/)\.[^/]+(/|$) *= 0.5"]).unwrap();
        assert_eq!(rules.apply(".git/config", 8.0), 4.0);
        assert_eq!(rules.apply("src/.hidden", 8.0), 4.0);
        assert_eq!(rules.apply("src/main.rs", 8.0), 8.0);
    }

    #[test]
    fn pattern_may_contain_spaces() {
        let rules = ScoreRules::compile(&["my docs  *= 3"]).unwrap();
        assert_eq!(rules.apply("my docs/a.txt", 1.0), 3.0);
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = ScoreRules::compile(&["foo %= 2"]).unwrap_err();
        assert!(matches!(err, ScoreRuleError::Operator { ref operator, .. } if operator == "%="));
        assert!(err.to_string().contains("foo %= 2"));
    }

    #[test]
    fn rejects_bad_pattern() {
        let err = ScoreRules::compile(&["(unclosed *= 2"]).unwrap_err();
        assert!(matches!(err, ScoreRuleError::Pattern { .. }));
    }

    #[test]
    fn rejects_bad_operand() {
        let err = ScoreRules::compile(&["foo *= lots"]).unwrap_err();
        assert!(matches!(err, ScoreRuleError::Operand { ref value, .. } if value == "lots"));
    }

    #[test]
    fn rejects_missing_parts() {
        for rule in ["", "foo", "foo *=", "*= 2"] {
            assert!(
                matches!(ScoreRule::parse(rule), Err(ScoreRuleError::Malformed { .. })),
                "{rule:?}"
            );
        }
    }

    #[test]
    fn failure_stops_at_first_bad_rule() {
        assert!(ScoreRules::compile(&["a *= 2", "b ^= 1", "c += 1"]).is_err());
        assert_eq!(ScoreRules::compile::<&str>(&[]).unwrap().apply("abc", 5.0), 5.0);
    }
}
