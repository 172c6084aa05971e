#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlCall,
    SqlDelete,
    SqlDeleteWhere,
    SqlExec,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlJoin,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectHaving,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUnion,
    SqlUpdate,
    SqlUpdateSet,
    SqlUpdateWhere,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub fragment: Fragment,
    /// Number of enclosing statements, 0 for the outermost one.
    pub depth: u32,
    /// Row count a `TOP` prefix must use instead of the query's own limit.
    pub top: Option<u64>,
    /// Rows are numbered by a `ROW_NUMBER()` column over the query's ORDER BY,
    /// which is then left out of the statement.
    pub windowed: bool,
}

impl Context {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            ..Default::default()
        }
    }

    pub fn switch_fragment(&self, fragment: Fragment) -> Context {
        Context { fragment, ..*self }
    }

    /// Context for a statement rendered inside the current one.
    pub fn nested(&self, fragment: Fragment) -> Context {
        Context {
            fragment,
            depth: self.depth + 1,
            top: None,
            windowed: false,
        }
    }
}
