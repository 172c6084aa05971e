use std::fmt::{self, Display};

/// Logical operator joining the members of a condition group.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glue {
    #[default]
    And,
    Or,
}

impl Glue {
    pub fn keyword(&self) -> &'static str {
        match self {
            Glue::And => "AND",
            Glue::Or => "OR",
        }
    }
}

impl Display for Glue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// WHERE / HAVING content: raw SQL leaves combined by groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Expr(String),
    Group { glue: Glue, items: Vec<Condition> },
}

impl Condition {
    pub fn group(glue: Glue, items: impl IntoIterator<Item = String>) -> Self {
        Condition::Group {
            glue,
            items: items.into_iter().map(Condition::Expr).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Expr(v) => v.trim().is_empty(),
            Condition::Group { items, .. } => items.iter().all(Condition::is_empty),
        }
    }

    /// Appends leaves to a group, keeping the group's glue. A leaf becomes a
    /// group first, with `glue` only if it had no siblings yet.
    pub(crate) fn append(&mut self, glue: Glue, conditions: Vec<String>) {
        match self {
            Condition::Group { items, .. } => items.extend(conditions.into_iter().map(Condition::Expr)),
            Condition::Expr(..) => {
                let current = std::mem::replace(self, Condition::Group { glue, items: vec![] });
                if let Condition::Group { items, .. } = self {
                    items.push(current);
                    items.extend(conditions.into_iter().map(Condition::Expr));
                }
            }
        }
    }

    /// Rewrites the text of every leaf.
    pub(crate) fn map_leaves(&mut self, f: &impl Fn(&str) -> String) {
        match self {
            Condition::Expr(text) => *text = f(text),
            Condition::Group { items, .. } => items.iter_mut().for_each(|v| v.map_leaves(f)),
        }
    }

    /// Wraps `self` and a new group under an outer group.
    pub(crate) fn extend(self, outer: Glue, conditions: Vec<String>, inner: Glue) -> Self {
        Condition::Group {
            glue: outer,
            items: vec![self, Condition::group(inner, conditions)],
        }
    }
}

/// Binding strength of a raw leaf: the loosest operator at nesting level zero,
/// outside of string literals. `None` when the leaf is atomic.
pub(crate) fn leaf_glue(text: &str) -> Option<Glue> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) if c == b'\\' && q != b'`' => i += 1,
            Some(q) if c == q => quote = None,
            Some(..) => {}
            None => match c {
                b'\'' | b'"' | b'`' => quote = Some(c),
                b'(' => depth += 1,
                b')' => depth -= 1,
                c if depth == 0 && c.is_ascii_whitespace() => {
                    let rest = &bytes[i + 1..];
                    if is_keyword(rest, b"OR") {
                        return Some(Glue::Or);
                    }
                    if is_keyword(rest, b"AND") {
                        found = Some(Glue::And);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    found
}

/// `text` starts with `keyword` followed by whitespace.
fn is_keyword(text: &[u8], keyword: &[u8]) -> bool {
    text.len() > keyword.len()
        && text[..keyword.len()].eq_ignore_ascii_case(keyword)
        && text[keyword.len()].is_ascii_whitespace()
}
