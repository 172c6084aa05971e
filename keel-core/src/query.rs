use crate::{
    BoundParameter, Clause, Condition, Dialect, Error, Glue, IntoElements, Join, JoinType,
    ParameterKey, ParameterType, Result, Value,
    dialect::GENERIC,
    shift_placeholders,
    writer::{Context, DatePart, SharedWriter, SqlWriter},
};
use indexmap::IndexMap;
use std::{
    fmt::{self, Debug, Display},
    sync::Arc,
};

/// Key prefix of the parameters bound by `where_in` and `bind_array`.
pub const ARRAY_PLACEHOLDER: &str = ":preparedArray";

/// Statement kind a [`Query`] renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// Query set, the first member followed by UNION members.
    Union,
    Call,
    Exec,
}

impl QueryType {
    pub fn name(&self) -> &'static str {
        match self {
            QueryType::Select => "select",
            QueryType::Insert => "insert",
            QueryType::Update => "update",
            QueryType::Delete => "delete",
            QueryType::Union => "union",
            QueryType::Call => "call",
            QueryType::Exec => "exec",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnionMember {
    pub query: Box<Query>,
    pub distinct: bool,
}

/// In memory SQL statement, rendered for the dialect of its writer.
///
/// Clause slots append; `limit`, `offset` and the statement targets replace.
/// The statement type is fixed by the first statement method called on it.
///
/// ```rust
/// use keel_core::{Query, dialect::MYSQLI};
/// let mut query = Query::for_dialect(MYSQLI);
/// query
///     .select(["a.id", "a.title"])
///     .unwrap()
///     .from("#__content AS a")
///     .where_("a.state = 1")
///     .order("a.id DESC")
///     .set_limit(10, 20);
/// assert_eq!(
///     query.to_string(),
///     "SELECT a.id, a.title\nFROM #__content AS a\nWHERE a.state = 1\nORDER BY a.id DESC\nLIMIT 20, 10"
/// );
/// ```
#[derive(Clone)]
pub struct Query {
    pub(crate) writer: SharedWriter,
    pub(crate) kind: Option<QueryType>,
    pub(crate) select: Vec<String>,
    pub(crate) from: Vec<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_: Option<Condition>,
    pub(crate) group: Vec<String>,
    pub(crate) having: Option<Condition>,
    pub(crate) order: Vec<String>,
    /// Table of INSERT and UPDATE, explicit table of DELETE.
    pub(crate) target: Vec<String>,
    /// Routines of CALL and EXEC.
    pub(crate) routines: Vec<String>,
    pub(crate) columns: Vec<String>,
    pub(crate) values: Vec<String>,
    pub(crate) set: Vec<String>,
    pub(crate) query_set: Option<Box<Query>>,
    pub(crate) unions: Vec<UnionMember>,
    pub(crate) limit: u64,
    pub(crate) offset: u64,
    pub(crate) bounded: IndexMap<ParameterKey, BoundParameter>,
    pub(crate) bind_counter: u32,
}

impl Query {
    pub fn new(writer: SharedWriter) -> Self {
        Self {
            writer,
            kind: None,
            select: Vec::new(),
            from: Vec::new(),
            joins: Vec::new(),
            where_: None,
            group: Vec::new(),
            having: None,
            order: Vec::new(),
            target: Vec::new(),
            routines: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
            set: Vec::new(),
            query_set: None,
            unions: Vec::new(),
            limit: 0,
            offset: 0,
            bounded: IndexMap::new(),
            bind_counter: 0,
        }
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(Arc::new(dialect))
    }

    /// Builder for the dialect-neutral writer.
    pub fn generic() -> Self {
        Self::for_dialect(GENERIC)
    }

    /// Empty query sharing this query's writer.
    pub fn sibling(&self) -> Self {
        Self::new(self.writer.clone())
    }

    pub fn writer(&self) -> &dyn SqlWriter {
        self.writer.as_dyn()
    }

    pub fn dialect(&self) -> &Dialect {
        self.writer.dialect()
    }

    pub fn kind(&self) -> Option<QueryType> {
        self.kind
    }

    pub fn get_limit(&self) -> u64 {
        self.limit
    }

    pub fn get_offset(&self) -> u64 {
        self.offset
    }

    fn set_type(&mut self, requested: QueryType) -> Result<()> {
        match self.kind {
            Some(current) if current != requested => Err(Error::QueryTypeAlreadyDefined {
                current: current.name(),
                requested: requested.name(),
            }),
            _ => {
                self.kind = Some(requested);
                Ok(())
            }
        }
    }

    /// Appends columns to the projection and makes this a SELECT.
    pub fn select(&mut self, columns: impl IntoElements) -> Result<&mut Self> {
        self.set_type(QueryType::Select)?;
        self.select.extend(columns.into_elements());
        Ok(self)
    }

    pub fn from(&mut self, tables: impl IntoElements) -> &mut Self {
        self.from.extend(tables.into_elements());
        self
    }

    /// Appends a derived table, its bound parameters are copied over.
    pub fn from_subquery(&mut self, query: &Query, alias: &str) -> &mut Self {
        let query = self.adopt(query.clone());
        let table = format!("(\n{}\n) AS {}", query.render(), self.quote_name(alias));
        self.from.push(table);
        self
    }

    pub fn join(&mut self, join: JoinType, table: impl Into<String>, on: Option<&str>) -> &mut Self {
        self.joins.push(Join {
            join,
            table: table.into(),
            on: on.map(str::to_owned),
        });
        self
    }

    pub fn inner_join(&mut self, table: impl Into<String>, on: &str) -> &mut Self {
        self.join(JoinType::Inner, table, Some(on))
    }

    pub fn left_join(&mut self, table: impl Into<String>, on: &str) -> &mut Self {
        self.join(JoinType::Left, table, Some(on))
    }

    pub fn right_join(&mut self, table: impl Into<String>, on: &str) -> &mut Self {
        self.join(JoinType::Right, table, Some(on))
    }

    pub fn outer_join(&mut self, table: impl Into<String>, on: &str) -> &mut Self {
        self.join(JoinType::Outer, table, Some(on))
    }

    /// AND-combines conditions with the current WHERE.
    pub fn where_(&mut self, conditions: impl IntoElements) -> &mut Self {
        self.where_glue(conditions, Glue::And)
    }

    /// Appends conditions to the WHERE clause. The glue of the first call sticks.
    pub fn where_glue(&mut self, conditions: impl IntoElements, glue: Glue) -> &mut Self {
        let conditions = conditions.into_elements();
        match &mut self.where_ {
            Some(current) => current.append(glue, conditions),
            None => self.where_ = Some(Condition::group(glue, conditions)),
        }
        self
    }

    /// `(current) OR (conditions joined by AND)`.
    pub fn or_where(&mut self, conditions: impl IntoElements) -> &mut Self {
        self.extend_where(Glue::Or, conditions, Glue::And)
    }

    /// `(current) AND (conditions joined by OR)`.
    pub fn and_where(&mut self, conditions: impl IntoElements) -> &mut Self {
        self.extend_where(Glue::And, conditions, Glue::Or)
    }

    /// Wraps the current WHERE and a new group of conditions under `outer`.
    pub fn extend_where(&mut self, outer: Glue, conditions: impl IntoElements, inner: Glue) -> &mut Self {
        let conditions = conditions.into_elements();
        self.where_ = Some(match self.where_.take() {
            Some(current) if !current.is_empty() => current.extend(outer, conditions, inner),
            _ => Condition::group(inner, conditions),
        });
        self
    }

    /// `key IN (:preparedArray1, ...)` with every value bound.
    pub fn where_in(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
        data_type: ParameterType,
    ) -> Result<&mut Self> {
        let placeholders = self.bind_array(values, data_type)?;
        Ok(self.where_(format!("{key} IN ({})", placeholders.join(","))))
    }

    pub fn where_not_in(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
        data_type: ParameterType,
    ) -> Result<&mut Self> {
        let placeholders = self.bind_array(values, data_type)?;
        Ok(self.where_(format!("{key} NOT IN ({})", placeholders.join(","))))
    }

    pub fn group(&mut self, columns: impl IntoElements) -> &mut Self {
        self.group.extend(columns.into_elements());
        self
    }

    pub fn having(&mut self, conditions: impl IntoElements) -> &mut Self {
        self.having_glue(conditions, Glue::And)
    }

    pub fn having_glue(&mut self, conditions: impl IntoElements, glue: Glue) -> &mut Self {
        let conditions = conditions.into_elements();
        match &mut self.having {
            Some(current) => current.append(glue, conditions),
            None => self.having = Some(Condition::group(glue, conditions)),
        }
        self
    }

    pub fn order(&mut self, columns: impl IntoElements) -> &mut Self {
        self.order.extend(columns.into_elements());
        self
    }

    pub fn insert(&mut self, table: impl Into<String>) -> Result<&mut Self> {
        self.set_type(QueryType::Insert)?;
        self.target = vec![table.into()];
        Ok(self)
    }

    pub fn update(&mut self, table: impl Into<String>) -> Result<&mut Self> {
        self.set_type(QueryType::Update)?;
        self.target = vec![table.into()];
        Ok(self)
    }

    /// Makes this a DELETE, from `table` or else from the FROM clause.
    pub fn delete(&mut self, table: Option<&str>) -> Result<&mut Self> {
        self.set_type(QueryType::Delete)?;
        if let Some(table) = table {
            self.target = vec![table.to_owned()];
        }
        Ok(self)
    }

    pub fn call(&mut self, routines: impl IntoElements) -> Result<&mut Self> {
        self.set_type(QueryType::Call)?;
        self.routines.extend(routines.into_elements());
        Ok(self)
    }

    pub fn exec(&mut self, procedures: impl IntoElements) -> Result<&mut Self> {
        self.set_type(QueryType::Exec)?;
        self.routines.extend(procedures.into_elements());
        Ok(self)
    }

    /// Makes this a query set whose first member is `query`.
    pub fn query_set(&mut self, query: Query) -> Result<&mut Self> {
        self.set_type(QueryType::Union)?;
        let query = self.adopt(query);
        self.query_set = Some(Box::new(query));
        Ok(self)
    }

    /// Appends a UNION member, `UNION ALL` when not `distinct`.
    pub fn union(&mut self, query: Query, distinct: bool) -> &mut Self {
        let query = self.adopt(query);
        self.unions.push(UnionMember {
            query: Box::new(query),
            distinct,
        });
        self
    }

    pub fn union_all(&mut self, query: Query) -> &mut Self {
        self.union(query, false)
    }

    /// New query set having this query as its first member.
    pub fn to_query_set(self) -> Query {
        let mut query = self.sibling();
        query.bounded = self.bounded.clone();
        query.bind_counter = self.bind_counter;
        query.kind = Some(QueryType::Union);
        query.query_set = Some(Box::new(self));
        query
    }

    pub fn columns(&mut self, columns: impl IntoElements) -> &mut Self {
        self.columns.extend(columns.into_elements());
        self
    }

    /// Appends rows to an INSERT, each element is the comma separated content of one row.
    pub fn values(&mut self, rows: impl IntoElements) -> &mut Self {
        self.values.extend(rows.into_elements());
        self
    }

    pub fn set(&mut self, assignments: impl IntoElements) -> &mut Self {
        self.set.extend(assignments.into_elements());
        self
    }

    /// Binds a value, its data type inferred from the value.
    pub fn bind(&mut self, key: impl Into<ParameterKey>, value: impl Into<Value>) -> Result<&mut Self> {
        let value = value.into();
        let data_type = ParameterType::infer(&value);
        self.bind_as(key, value, data_type, 0)
    }

    /// Binds a value with an explicit data type. Rebinding a key replaces it in place.
    pub fn bind_as(
        &mut self,
        key: impl Into<ParameterKey>,
        value: impl Into<Value>,
        data_type: ParameterType,
        length: usize,
    ) -> Result<&mut Self> {
        let dialect = self.dialect();
        let Some(native_type) = dialect.native_type(data_type) else {
            return Err(Error::UnknownType {
                tag: data_type.tag().to_owned(),
                dialect: dialect.name,
            });
        };
        let key = key.into();
        self.bounded.insert(
            key.clone(),
            BoundParameter {
                key,
                value: value.into(),
                data_type,
                length,
                native_type: Some(native_type),
            },
        );
        Ok(self)
    }

    /// Binds a value with a textual type tag (`"int"`, `"string"`, ...).
    pub fn bind_tagged(
        &mut self,
        key: impl Into<ParameterKey>,
        value: impl Into<Value>,
        tag: &str,
    ) -> Result<&mut Self> {
        let data_type = tag.parse::<ParameterType>().map_err(|_| Error::UnknownType {
            tag: tag.to_owned(),
            dialect: self.dialect().name,
        })?;
        self.bind_as(key, value, data_type, 0)
    }

    /// Binds every value under a generated `:preparedArrayN` key and returns the keys.
    pub fn bind_array(
        &mut self,
        values: impl IntoIterator<Item = impl Into<Value>>,
        data_type: ParameterType,
    ) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for value in values {
            self.bind_counter += 1;
            let key = format!("{}{}", ARRAY_PLACEHOLDER, self.bind_counter);
            self.bind_as(key.as_str(), value, data_type, 0)?;
            keys.push(key);
        }
        Ok(keys)
    }

    pub fn unbind(&mut self, key: impl Into<ParameterKey>) -> &mut Self {
        self.bounded.shift_remove(&key.into());
        self
    }

    pub fn bounded(&self) -> &IndexMap<ParameterKey, BoundParameter> {
        &self.bounded
    }

    /// Snapshot of the bound parameters, in binding order.
    pub fn parameters(&self) -> Vec<BoundParameter> {
        self.bounded.values().cloned().collect()
    }

    /// Takes over the parameters of a member query. Its generated array keys
    /// are renumbered past the ones of this query so that none collide.
    fn adopt(&mut self, mut query: Query) -> Query {
        let offset = self.bind_counter;
        self.bind_counter += query.bind_counter;
        query.shift_generated(offset);
        for (key, parameter) in &query.bounded {
            self.bounded.insert(key.clone(), parameter.clone());
        }
        query
    }

    /// Adds `offset` to the number of every generated array placeholder, in
    /// the clauses, in the members and in the bound keys.
    fn shift_generated(&mut self, offset: u32) {
        if offset == 0 || self.bind_counter == 0 {
            return;
        }
        let shift = |text: &str| shift_placeholders(text, ARRAY_PLACEHOLDER, offset);
        for slot in [
            &mut self.select,
            &mut self.from,
            &mut self.group,
            &mut self.order,
            &mut self.target,
            &mut self.routines,
            &mut self.columns,
            &mut self.values,
            &mut self.set,
        ] {
            for item in slot.iter_mut() {
                *item = shift(item);
            }
        }
        for join in &mut self.joins {
            join.table = shift(&join.table);
            if let Some(on) = &mut join.on {
                *on = shift(on);
            }
        }
        for condition in [&mut self.where_, &mut self.having].into_iter().flatten() {
            condition.map_leaves(&shift);
        }
        if let Some(first) = &mut self.query_set {
            first.shift_generated(offset);
        }
        for member in &mut self.unions {
            member.query.shift_generated(offset);
        }
        self.bounded = std::mem::take(&mut self.bounded)
            .into_iter()
            .map(|(key, mut parameter)| match key {
                ParameterKey::Named(name) => {
                    let key = ParameterKey::Named(shift(&name));
                    parameter.key = key.clone();
                    (key, parameter)
                }
                key => (key, parameter),
            })
            .collect();
        self.bind_counter += offset;
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn set_limit(&mut self, limit: u64, offset: u64) -> &mut Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    fn reset_type(&mut self, kind: QueryType) {
        if self.kind == Some(kind) {
            self.kind = None;
        }
    }

    /// Resets one slot. Clearing the slot that defines the statement type resets the type.
    pub fn clear(&mut self, clause: Clause) -> &mut Self {
        match clause {
            Clause::Select => {
                self.select.clear();
                self.reset_type(QueryType::Select);
            }
            Clause::Delete => {
                self.target.clear();
                self.reset_type(QueryType::Delete);
            }
            Clause::Update => {
                self.target.clear();
                self.reset_type(QueryType::Update);
            }
            Clause::Insert => {
                self.target.clear();
                self.reset_type(QueryType::Insert);
            }
            Clause::Call => {
                self.routines.clear();
                self.reset_type(QueryType::Call);
            }
            Clause::Exec => {
                self.routines.clear();
                self.reset_type(QueryType::Exec);
            }
            Clause::QuerySet => {
                self.query_set = None;
                self.reset_type(QueryType::Union);
            }
            Clause::Union => self.unions.clear(),
            Clause::From => self.from.clear(),
            Clause::Join => self.joins.clear(),
            Clause::Set => self.set.clear(),
            Clause::Where => self.where_ = None,
            Clause::Group => self.group.clear(),
            Clause::Having => self.having = None,
            Clause::Order => self.order.clear(),
            Clause::Columns => self.columns.clear(),
            Clause::Values => self.values.clear(),
            Clause::Limit => self.limit = 0,
            Clause::Offset => self.offset = 0,
            Clause::Bounded => {
                self.bounded.clear();
                self.bind_counter = 0;
            }
        }
        self
    }

    /// Resets every slot, the statement type and the bound parameters.
    pub fn clear_all(&mut self) -> &mut Self {
        *self = self.sibling();
        self
    }

    /// String literal with the content escaped for the dialect.
    pub fn quote(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        self.writer
            .write_value_string(&mut Context::default(), &mut out, text);
        out
    }

    /// SQL literal for a value.
    pub fn quote_value(&self, value: &Value) -> String {
        let mut out = String::new();
        self.writer.write_value(&mut Context::default(), &mut out, value);
        out
    }

    /// Quotes every dot separated segment of an identifier, an embedded
    /// ` AS alias` is quoted as well and `*` is left alone.
    pub fn quote_name(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        self.writer.write_name(&mut Context::default(), &mut out, name);
        out
    }

    pub fn quote_name_as(&self, name: &str, alias: &str) -> String {
        let mut out = String::with_capacity(name.len() + alias.len() + 8);
        let context = &mut Context::default();
        self.writer.write_name(context, &mut out, name);
        out.push_str(" AS ");
        self.writer.write_name(context, &mut out, alias);
        out
    }

    /// String content escaped for the dialect, LIKE wildcards too when `extra`.
    pub fn escape(&self, text: &str, extra: bool) -> String {
        let mut out = String::with_capacity(text.len());
        self.writer
            .write_string_content(&mut Context::default(), &mut out, text, extra);
        out
    }

    pub fn is_null_datetime(&self, text: &str) -> bool {
        self.dialect().is_null_datetime(text)
    }

    /// The dialect's canonical zero date, as a literal when `quoted`.
    pub fn null_date(&self, quoted: bool) -> String {
        let value = self.dialect().null_datetimes.first().copied().unwrap_or_default();
        if quoted {
            self.quote(value)
        } else {
            value.to_owned()
        }
    }

    pub fn cast_as_char(&self, value: &str, length: Option<u32>) -> String {
        self.function(|w, c, out| w.write_cast_as_char(c, out, value, length))
    }

    /// `CHAR_LENGTH(field)`, followed by ` operator condition` when both are given.
    pub fn char_length(&self, field: &str, comparison: Option<(&str, &str)>) -> String {
        self.function(|w, c, out| w.write_char_length(c, out, field, comparison))
    }

    /// Concatenation of SQL expressions, optionally separated by a literal.
    pub fn concatenate(&self, values: &[&str], separator: Option<&str>) -> String {
        self.function(|w, c, out| w.write_concatenate(c, out, values, separator))
    }

    pub fn current_timestamp(&self) -> String {
        self.dialect().current_timestamp.to_owned()
    }

    pub fn length(&self, value: &str) -> String {
        format!("{}({value})", self.dialect().length)
    }

    pub fn rand(&self) -> String {
        self.dialect().random.to_owned()
    }

    /// Regular expression operator followed by `value`.
    pub fn regexp(&self, value: &str) -> String {
        format!("{}{value}", self.dialect().regexp)
    }

    /// Condition true when `value` is one of the comma separated entries of `set`.
    pub fn find_in_set(&self, value: &str, set: &str) -> String {
        self.function(|w, c, out| w.write_find_in_set(c, out, value, set))
    }

    pub fn year(&self, date: &str) -> String {
        self.date_part(DatePart::Year, date)
    }

    pub fn month(&self, date: &str) -> String {
        self.date_part(DatePart::Month, date)
    }

    pub fn day(&self, date: &str) -> String {
        self.date_part(DatePart::Day, date)
    }

    pub fn hour(&self, date: &str) -> String {
        self.date_part(DatePart::Hour, date)
    }

    pub fn minute(&self, date: &str) -> String {
        self.date_part(DatePart::Minute, date)
    }

    pub fn second(&self, date: &str) -> String {
        self.date_part(DatePart::Second, date)
    }

    pub fn date_part(&self, part: DatePart, date: &str) -> String {
        self.function(|w, c, out| w.write_date_part(c, out, part, date))
    }

    /// `date` moved by `interval` units, a leading `-` moves it back.
    pub fn date_add(&self, date: &str, interval: &str, unit: &str) -> String {
        self.function(|w, c, out| w.write_date_add(c, out, date, interval, unit))
    }

    fn function(&self, f: impl FnOnce(&dyn SqlWriter, &mut Context, &mut String)) -> String {
        let mut out = String::new();
        f(self.writer.as_dyn(), &mut Context::default(), &mut out);
        out
    }

    /// SQL text for the dialect, empty when no statement type is set.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(128);
        self.writer.write_query(&mut out, self);
        out
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("dialect", &self.dialect().name)
            .field("kind", &self.kind)
            .field("sql", &self.render())
            .field("bounded", &self.bounded)
            .finish()
    }
}
