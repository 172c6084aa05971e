use crate::{
    Condition, Dialect, Glue, Join, Query, QueryType, Value,
    condition::leaf_glue,
    dialect::{
        ConcatSyntax, DateAddSyntax, DatePartSyntax, EscapeStyle, FindInSetSyntax, LimitSyntax,
    },
    find_ignore_ascii_case, possibly_parenthesized, separated_by,
    writer::{Context, Fragment},
};
use std::{fmt::Write, sync::Arc};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        let value = $value;
        if value.is_infinite() {
            let text = if value.is_sign_negative() {
                "-Infinity"
            } else {
                "Infinity"
            };
            $this.write_value_string($context, $out, text);
        } else if value.is_nan() {
            $this.write_value_string($context, $out, "NaN");
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format(value));
        }
    }};
}

/// Writer shared by every query of a driver.
pub type SharedWriter = Arc<dyn SqlWriter + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl DatePart {
    pub fn keyword(&self) -> &'static str {
        match self {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAY",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
        }
    }

    fn strftime(&self) -> &'static str {
        match self {
            DatePart::Year => "%Y",
            DatePart::Month => "%m",
            DatePart::Day => "%d",
            DatePart::Hour => "%H",
            DatePart::Minute => "%M",
            DatePart::Second => "%S",
        }
    }
}

/// `value` without a leading keyword, case-insensitive.
fn strip_keyword<'a>(value: &'a str, keyword: &str) -> Option<&'a str> {
    let value = value.trim_start();
    value
        .get(..keyword.len())
        .filter(|v| v.eq_ignore_ascii_case(keyword))
        .map(|_| value[keyword.len()..].trim_start())
}

fn write_joined(out: &mut String, values: &[String], separator: &str) {
    separated_by(out, values, |out, v| out.push_str(v), separator);
}

/// Dialect printer turning a [`Query`] into SQL text.
///
/// Every method has a default implementation driven by [`SqlWriter::dialect`].
/// A writer for a database with unusual syntax overrides the few methods that
/// differ and keeps the rest.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn dialect(&self) -> &Dialect;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Content of a string literal, without delimiters. LIKE wildcards are
    /// escaped too when `extra`.
    fn write_string_content(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        extra: bool,
    ) {
        match self.dialect().escape {
            EscapeStyle::Backslash => {
                for c in value.chars() {
                    match c {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x1a' => out.push_str("\\Z"),
                        '%' | '_' if extra => {
                            out.push('\\');
                            out.push(c);
                        }
                        _ => out.push(c),
                    }
                }
            }
            EscapeStyle::DoubledQuote => {
                for c in value.chars() {
                    match c {
                        '\'' => out.push_str("''"),
                        '%' | '_' if extra => {
                            out.push('\\');
                            out.push(c);
                        }
                        _ => out.push(c),
                    }
                }
            }
            EscapeStyle::Transact => {
                for c in value.chars() {
                    match c {
                        '\'' => out.push_str("''"),
                        '\0' => out.push_str("' + CHAR(0) + N'"),
                        '[' if extra => out.push_str("[[]"),
                        '_' if extra => out.push_str("[_]"),
                        '%' if extra => out.push_str("[%]"),
                        _ => out.push(c),
                    }
                }
            }
        }
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        if self.dialect().escape == EscapeStyle::Transact {
            out.push('N');
        }
        out.push('\'');
        self.write_string_content(context, out, value, false);
        out.push('\'');
    }

    /// Quote one identifier, doubling the closing quote inside it.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        let (open, close) = self.dialect().name_quote;
        let doubled: String = [close, close].iter().collect();
        out.push(open);
        self.write_escaped(context, out, value, close, &doubled);
        out.push(close);
    }

    /// Quote a possibly qualified name, with an optional ` AS alias`.
    fn write_name(&self, context: &mut Context, out: &mut String, name: &str) {
        if let Some(position) = find_ignore_ascii_case(name, " AS ") {
            self.write_name_segments(context, out, name[..position].trim());
            out.push_str(" AS ");
            self.write_name_segments(context, out, name[position + 4..].trim());
        } else {
            self.write_name_segments(context, out, name);
        }
    }

    fn write_name_segments(&self, context: &mut Context, out: &mut String, name: &str) {
        separated_by(
            out,
            name.split('.'),
            |out, segment| {
                if segment == "*" {
                    out.push('*');
                } else {
                    self.write_identifier_quoted(context, out, segment);
                }
            },
            ".",
        );
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..)
            | Value::Uuid(..) => self.write_value_string(context, out, &value.to_string()),
            _ => log::error!("Cannot write {:?}", value),
        }
    }

    /// Render NULL literal.
    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        let (f, t) = self.dialect().booleans;
        out.push_str(if value { t } else { f });
    }

    /// Render a blob literal using hex digits.
    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        let (prefix, suffix) = self.dialect().blob_literal;
        out.push_str(prefix);
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push_str(suffix);
    }

    /// Precedence table for condition glues.
    fn condition_precedence(&self, glue: Glue) -> i32 {
        match glue {
            Glue::Or => 100,
            Glue::And => 200,
        }
    }

    /// Render a condition tree. Nested groups with more than one member are
    /// parenthesised, a raw leaf only when it binds looser than its parent.
    fn write_condition(
        &self,
        context: &mut Context,
        out: &mut String,
        condition: &Condition,
        parent: Option<Glue>,
    ) {
        match condition {
            Condition::Expr(text) => {
                let text = text.trim();
                let parenthesized = match (parent, leaf_glue(text)) {
                    (Some(parent), Some(own)) => {
                        self.condition_precedence(own) < self.condition_precedence(parent)
                    }
                    _ => false,
                };
                possibly_parenthesized!(out, parenthesized, out.push_str(text));
            }
            Condition::Group { glue, items } => {
                let items = items.iter().filter(|v| !v.is_empty()).collect::<Vec<_>>();
                if let [item] = items.as_slice() {
                    return self.write_condition(context, out, item, parent);
                }
                let separator = match glue {
                    Glue::And => " AND ",
                    Glue::Or => " OR ",
                };
                possibly_parenthesized!(
                    out,
                    parent.is_some() && items.len() > 1,
                    separated_by(
                        out,
                        items,
                        |out, v| self.write_condition(context, out, v, Some(*glue)),
                        separator,
                    )
                );
            }
        }
    }

    /// `\n{keyword} condition` unless the condition is absent or empty.
    fn write_condition_clause(
        &self,
        context: &mut Context,
        out: &mut String,
        keyword: &str,
        condition: Option<&Condition>,
    ) {
        if let Some(condition) = condition.filter(|v| !v.is_empty()) {
            out.push('\n');
            out.push_str(keyword);
            out.push(' ');
            self.write_condition(context, out, condition, None);
        }
    }

    fn write_join(&self, _context: &mut Context, out: &mut String, join: &Join) {
        out.push_str(join.join.keyword());
        out.push(' ');
        out.push_str(&join.table);
        if let Some(on) = &join.on {
            out.push_str(" ON ");
            out.push_str(on);
        }
    }

    fn write_joins(&self, context: &mut Context, out: &mut String, query: &Query) {
        let mut context = context.switch_fragment(Fragment::SqlJoin);
        for join in &query.joins {
            out.push('\n');
            self.write_join(&mut context, out, join);
        }
    }

    /// Entry point, renders nothing for a query without a statement type.
    fn write_query(&self, out: &mut String, query: &Query) {
        self.write_statement(&mut Context::default(), out, query);
    }

    fn write_statement(&self, context: &mut Context, out: &mut String, query: &Query) {
        let Some(kind) = query.kind else {
            return;
        };
        match kind {
            QueryType::Select => self.write_select(context, out, query),
            QueryType::Insert => self.write_insert(context, out, query),
            QueryType::Update => self.write_update(context, out, query),
            QueryType::Delete => self.write_delete(context, out, query),
            QueryType::Union => self.write_query_set(context, out, query),
            QueryType::Call => self.write_routine(context, out, "CALL", query),
            QueryType::Exec => self.write_routine(context, out, "EXEC", query),
        }
    }

    /// Emit SELECT statement. `TOP` dialects page through offsets with a
    /// `ROW_NUMBER()` column over the query's ORDER BY.
    fn write_select(&self, context: &mut Context, out: &mut String, query: &Query) {
        let top = self.dialect().limit == LimitSyntax::Top;
        let mut context = context.switch_fragment(Fragment::SqlSelect);
        if top && query.offset > 0 {
            context.top = None;
            context.windowed = true;
            out.push_str("SELECT * FROM (\n");
            self.write_select_body(&mut context, out, query);
            let _ = write!(out, "\n) AS A WHERE RowNumber > {}", query.offset);
            if query.limit > 0 {
                let _ = write!(out, " AND RowNumber <= {}", query.limit + query.offset);
            }
            out.push_str("\nORDER BY RowNumber");
            return;
        }
        if top && query.limit > 0 {
            context.top = Some(query.limit);
        }
        self.write_select_body(&mut context, out, query);
        self.write_limit(&mut context, out, query.limit, query.offset);
    }

    fn write_select_body(&self, context: &mut Context, out: &mut String, query: &Query) {
        out.push_str("SELECT ");
        let mut columns = query.select.iter().map(String::as_str).collect::<Vec<_>>();
        if let Some(top) = context.top {
            if let Some(first) = columns.first_mut()
                && let Some(rest) = strip_keyword(*first, "DISTINCT ")
            {
                out.push_str("DISTINCT ");
                *first = rest;
            }
            let _ = write!(out, "TOP {} ", top);
        }
        if columns.is_empty() {
            out.push('*');
        } else {
            separated_by(out, columns, |out, v| out.push_str(v), ", ");
        }
        if context.windowed {
            out.push_str(", ROW_NUMBER() OVER (ORDER BY ");
            if query.order.is_empty() {
                out.push_str("(SELECT 0)");
            } else {
                write_joined(out, &query.order, ", ");
            }
            out.push_str(") AS RowNumber");
        }
        if !query.from.is_empty() {
            out.push_str("\nFROM ");
            write_joined(out, &query.from, ", ");
        }
        self.write_joins(context, out, query);
        self.write_condition_clause(
            &mut context.switch_fragment(Fragment::SqlSelectWhere),
            out,
            "WHERE",
            query.where_.as_ref(),
        );
        if !query.group.is_empty() {
            out.push_str("\nGROUP BY ");
            write_joined(out, &query.group, ", ");
        }
        self.write_condition_clause(
            &mut context.switch_fragment(Fragment::SqlSelectHaving),
            out,
            "HAVING",
            query.having.as_ref(),
        );
        self.write_unions(context, out, query);
        self.write_order(context, out, query);
    }

    fn write_order(&self, context: &mut Context, out: &mut String, query: &Query) {
        if !context.windowed && !query.order.is_empty() {
            out.push_str("\nORDER BY ");
            write_joined(out, &query.order, ", ");
        }
    }

    fn write_unions(&self, context: &mut Context, out: &mut String, query: &Query) {
        for member in &query.unions {
            out.push_str(if member.distinct {
                "\nUNION ("
            } else {
                "\nUNION ALL ("
            });
            self.write_statement(&mut context.nested(Fragment::SqlUnion), out, &member.query);
            out.push(')');
        }
    }

    /// Emit a query set: the first member, parenthesised when it orders or
    /// limits itself, then the UNION members and the set's own ORDER BY and LIMIT.
    fn write_query_set(&self, context: &mut Context, out: &mut String, query: &Query) {
        let Some(first) = &query.query_set else {
            return;
        };
        let parenthesized = !first.order.is_empty() || first.limit > 0 || first.offset > 0;
        possibly_parenthesized!(
            out,
            parenthesized,
            self.write_statement(&mut context.nested(Fragment::SqlUnion), out, first)
        );
        self.write_unions(context, out, query);
        self.write_order(context, out, query);
        if self.dialect().limit == LimitSyntax::Top {
            if query.limit > 0 || query.offset > 0 {
                log::warn!(
                    "The {} dialect cannot limit a query set, the limit is ignored",
                    self.dialect().name
                );
            }
        } else {
            self.write_limit(context, out, query.limit, query.offset);
        }
    }

    /// Trailing LIMIT / OFFSET of a SELECT. `TOP` dialects write nothing here.
    fn write_limit(&self, _context: &mut Context, out: &mut String, limit: u64, offset: u64) {
        match self.dialect().limit {
            LimitSyntax::LimitOffset => {
                if limit > 0 {
                    out.push_str("\nLIMIT ");
                    write_integer!(out, limit);
                }
                if offset > 0 {
                    out.push_str(if limit > 0 { " OFFSET " } else { "\nOFFSET " });
                    write_integer!(out, offset);
                }
            }
            LimitSyntax::OffsetComma { unbounded } => {
                if limit == 0 && offset == 0 {
                    return;
                }
                out.push_str("\nLIMIT ");
                if offset > 0 {
                    write_integer!(out, offset);
                    out.push_str(", ");
                }
                if limit > 0 {
                    write_integer!(out, limit);
                } else {
                    out.push_str(unbounded);
                }
            }
            LimitSyntax::Top => {}
        }
    }

    /// `TOP (n) ` after UPDATE / DELETE.
    fn write_modify_top(&self, _context: &mut Context, out: &mut String, query: &Query) {
        let dialect = self.dialect();
        if dialect.limit_modify && dialect.limit == LimitSyntax::Top && query.limit > 0 {
            let _ = write!(out, "TOP ({}) ", query.limit);
        }
    }

    /// Trailing `LIMIT n` of UPDATE / DELETE, the offset does not apply.
    fn write_modify_limit(&self, _context: &mut Context, out: &mut String, query: &Query) {
        let dialect = self.dialect();
        if dialect.limit_modify && dialect.limit != LimitSyntax::Top && query.limit > 0 {
            out.push_str("\nLIMIT ");
            write_integer!(out, query.limit);
        }
    }

    /// Emit INSERT, multi-row VALUES or a SET list.
    fn write_insert(&self, context: &mut Context, out: &mut String, query: &Query) {
        let _context = context.switch_fragment(Fragment::SqlInsertInto);
        out.push_str("INSERT INTO ");
        write_joined(out, &query.target, ", ");
        if query.values.is_empty() && !query.set.is_empty() {
            out.push_str("\nSET ");
            write_joined(out, &query.set, ", ");
            return;
        }
        if !query.columns.is_empty() {
            out.push_str(" (");
            write_joined(out, &query.columns, ", ");
            out.push(')');
        }
        if !query.values.is_empty() {
            out.push_str(" VALUES\n");
            separated_by(
                out,
                &query.values,
                |out, row| {
                    out.push('(');
                    out.push_str(row);
                    out.push(')');
                },
                ",\n",
            );
        }
    }

    fn write_update(&self, context: &mut Context, out: &mut String, query: &Query) {
        let mut context = context.switch_fragment(Fragment::SqlUpdate);
        out.push_str("UPDATE ");
        self.write_modify_top(&mut context, out, query);
        write_joined(out, &query.target, ", ");
        self.write_joins(&mut context, out, query);
        if !query.set.is_empty() {
            out.push_str("\nSET ");
            write_joined(out, &query.set, ", ");
        }
        self.write_condition_clause(
            &mut context.switch_fragment(Fragment::SqlUpdateWhere),
            out,
            "WHERE",
            query.where_.as_ref(),
        );
        self.write_modify_limit(&mut context, out, query);
    }

    fn write_delete(&self, context: &mut Context, out: &mut String, query: &Query) {
        let mut context = context.switch_fragment(Fragment::SqlDelete);
        out.push_str("DELETE ");
        self.write_modify_top(&mut context, out, query);
        out.push_str("FROM ");
        let tables = if query.target.is_empty() {
            &query.from
        } else {
            &query.target
        };
        write_joined(out, tables, ", ");
        self.write_joins(&mut context, out, query);
        self.write_condition_clause(
            &mut context.switch_fragment(Fragment::SqlDeleteWhere),
            out,
            "WHERE",
            query.where_.as_ref(),
        );
        self.write_modify_limit(&mut context, out, query);
    }

    /// `CALL` / `EXEC` followed by the routines.
    fn write_routine(&self, context: &mut Context, out: &mut String, keyword: &str, query: &Query) {
        let _context = context.switch_fragment(if keyword == "CALL" {
            Fragment::SqlCall
        } else {
            Fragment::SqlExec
        });
        out.push_str(keyword);
        out.push(' ');
        write_joined(out, &query.routines, ", ");
    }

    fn write_cast_as_char(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        length: Option<u32>,
    ) {
        let dialect = self.dialect();
        let _ = write!(out, "CAST({} AS ", value);
        match length {
            Some(length) => {
                out.push_str(&dialect.char_type_sized.replace("{}", &length.to_string()))
            }
            None => out.push_str(dialect.char_type),
        }
        out.push(')');
    }

    fn write_char_length(
        &self,
        _context: &mut Context,
        out: &mut String,
        field: &str,
        comparison: Option<(&str, &str)>,
    ) {
        let _ = write!(out, "{}({})", self.dialect().char_length, field);
        if let Some((operator, condition)) = comparison {
            let _ = write!(out, " {} {}", operator, condition);
        }
    }

    fn write_concatenate(
        &self,
        context: &mut Context,
        out: &mut String,
        values: &[&str],
        separator: Option<&str>,
    ) {
        match self.dialect().concat {
            ConcatSyntax::Function => {
                if let Some(separator) = separator {
                    out.push_str("CONCAT_WS(");
                    self.write_value_string(context, out, separator);
                    out.push_str(", ");
                } else {
                    out.push_str("CONCAT(");
                }
                separated_by(out, values, |out, v| out.push_str(v), ", ");
                out.push(')');
            }
            ConcatSyntax::Operator {
                operator,
                parenthesized,
            } => {
                let mut glue = operator.to_owned();
                if let Some(separator) = separator {
                    self.write_value_string(context, &mut glue, separator);
                    glue.push_str(operator);
                }
                possibly_parenthesized!(
                    out,
                    parenthesized,
                    separated_by(out, values, |out, v| out.push_str(v), &glue)
                );
            }
        }
    }

    fn write_date_part(&self, _context: &mut Context, out: &mut String, part: DatePart, date: &str) {
        match self.dialect().date_part {
            DatePartSyntax::Function => {
                let _ = write!(out, "{}({})", part.keyword(), date);
            }
            DatePartSyntax::Extract => {
                let _ = write!(out, "EXTRACT ({} FROM {})", part.keyword(), date);
            }
            DatePartSyntax::Strftime => {
                let _ = write!(out, "CAST(strftime('{}', {}) AS INTEGER)", part.strftime(), date);
            }
            DatePartSyntax::DatePart => match part {
                DatePart::Year | DatePart::Month | DatePart::Day => {
                    let _ = write!(out, "{}({})", part.keyword(), date);
                }
                _ => {
                    let _ = write!(out, "DATEPART({}, {})", part.keyword(), date);
                }
            },
        }
    }

    fn write_date_add(
        &self,
        _context: &mut Context,
        out: &mut String,
        date: &str,
        interval: &str,
        unit: &str,
    ) {
        let interval = interval.trim();
        let (negative, magnitude) = match interval.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, interval.trim_start_matches('+')),
        };
        match self.dialect().date_add {
            DateAddSyntax::Interval => {
                let _ = write!(out, "DATE_ADD({}, INTERVAL {} {})", date, interval, unit);
            }
            DateAddSyntax::TimestampInterval => {
                let sign = if negative { '-' } else { '+' };
                let _ = write!(
                    out,
                    "timestamp {} {} interval '{} {}'",
                    date, sign, magnitude, unit
                );
            }
            DateAddSyntax::Modifier => {
                let sign = if negative { '-' } else { '+' };
                let _ = write!(out, "datetime({}, '{}{} {}')", date, sign, magnitude, unit);
            }
            DateAddSyntax::DateAdd => {
                let _ = write!(out, "DATEADD({}, {}, {})", unit, interval, date);
            }
        }
    }

    fn write_find_in_set(&self, _context: &mut Context, out: &mut String, value: &str, set: &str) {
        let _ = match self.dialect().find_in_set {
            FindInSetSyntax::Function => write!(out, "FIND_IN_SET({}, {})", value, set),
            FindInSetSyntax::AnyArray => write!(
                out,
                "CAST({} AS TEXT) = ANY (string_to_array({}, ','))",
                value, set
            ),
            FindInSetSyntax::Like => write!(out, "(',' || {} || ',') LIKE ('%,' || {} || ',%')", set, value),
            FindInSetSyntax::CharIndex => write!(
                out,
                "CHARINDEX(',' + {} + ',', ',' + {} + ',') > 0",
                value, set
            ),
        };
    }
}

impl SqlWriter for Dialect {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> &Dialect {
        self
    }
}
