/// Anything accepted where a builder method takes one or many SQL fragments.
pub trait IntoElements {
    fn into_elements(self) -> Vec<String>;
}

impl IntoElements for &str {
    fn into_elements(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl IntoElements for String {
    fn into_elements(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoElements for &String {
    fn into_elements(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: Into<String>> IntoElements for Vec<S> {
    fn into_elements(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoElements for [S; N] {
    fn into_elements(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: AsRef<str>> IntoElements for &[S] {
    fn into_elements(self) -> Vec<String> {
        self.iter().map(|v| v.as_ref().to_owned()).collect()
    }
}

/// Slot of a query that can be reset with [`Query::clear`](crate::Query::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    Delete,
    Update,
    Insert,
    Call,
    Exec,
    /// Members appended with `union` / `union_all`.
    Union,
    /// The first member of a query set.
    QuerySet,
    From,
    Join,
    Set,
    Where,
    Group,
    Having,
    Order,
    Columns,
    Values,
    Limit,
    Offset,
    Bounded,
}
