use crate::Error;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join: JoinType,
    pub table: String,
    pub on: Option<String>,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Default,
    Inner,
    Outer,
    Left,
    Right,
    Cross,
    Natural,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Default => "JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Outer => "OUTER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Cross => "CROSS JOIN",
            JoinType::Natural => "NATURAL JOIN",
        }
    }
}

/// Parses the keyword sequence preceding a joined table, `JOIN` optional.
impl FromStr for JoinType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let words = value
            .split_whitespace()
            .map(str::to_ascii_uppercase)
            .collect::<Vec<_>>();
        let patterns: &[(&[&str], JoinType)] = &[
            (&[], JoinType::Default),
            (&["JOIN"], JoinType::Default),
            (&["INNER"], JoinType::Inner),
            (&["FULL", "OUTER"], JoinType::Outer),
            (&["OUTER"], JoinType::Outer),
            (&["LEFT", "OUTER"], JoinType::Left),
            (&["LEFT"], JoinType::Left),
            (&["RIGHT", "OUTER"], JoinType::Right),
            (&["RIGHT"], JoinType::Right),
            (&["CROSS"], JoinType::Cross),
            (&["NATURAL"], JoinType::Natural),
        ];
        let keywords = match words.split_last() {
            Some((last, rest)) if last == "JOIN" && !rest.is_empty() => rest,
            _ => &words[..],
        };
        patterns
            .iter()
            .find_map(|(pattern, join_type)| {
                keywords
                    .iter()
                    .map(String::as_str)
                    .eq(pattern.iter().copied())
                    .then_some(*join_type)
            })
            .ok_or_else(|| Error::InvalidArgument(format!("unknown join type `{value}`")))
    }
}
