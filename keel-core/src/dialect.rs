use crate::ParameterType;

/// How LIMIT / OFFSET are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSyntax {
    /// Trailing `LIMIT n OFFSET m`.
    LimitOffset,
    /// Trailing `LIMIT m, n`; `unbounded` is the row count used when only an offset is set.
    OffsetComma { unbounded: &'static str },
    /// `SELECT TOP n` prefix, offsets through a `ROW_NUMBER()` window.
    Top,
}

/// Escaping applied to string literal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStyle {
    /// Backslash escapes for quotes and control characters.
    Backslash,
    /// Single quotes doubled, nothing else touched.
    DoubledQuote,
    /// Single quotes doubled, NUL spliced in with `CHAR(0)`, LIKE wildcards bracketed.
    Transact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatSyntax {
    /// `CONCAT(a, b)` and `CONCAT_WS(sep, a, b)`.
    Function,
    /// Infix operator, `(a + b)` when `parenthesized`.
    Operator {
        operator: &'static str,
        parenthesized: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePartSyntax {
    /// `YEAR(d)`, `HOUR(d)`, ...
    Function,
    /// `EXTRACT (YEAR FROM d)`.
    Extract,
    /// `CAST(strftime('%Y', d) AS INTEGER)`.
    Strftime,
    /// `YEAR(d)` for dates, `DATEPART(hour, d)` for time parts.
    DatePart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateAddSyntax {
    /// `DATE_ADD(d, INTERVAL n unit)`.
    Interval,
    /// `timestamp 'd' + interval 'n unit'`.
    TimestampInterval,
    /// `datetime(d, '+n unit')`.
    Modifier,
    /// `DATEADD(unit, n, d)`.
    DateAdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindInSetSyntax {
    /// `FIND_IN_SET(v, set)`.
    Function,
    /// `v = ANY (string_to_array(set, ','))`.
    AnyArray,
    /// `(',' || set || ',') LIKE ('%,' || v || ',%')`.
    Like,
    /// `CHARINDEX(',' + v + ',', ',' + set + ',') > 0`.
    CharIndex,
}

/// SQL dialect description consumed by the generic writer.
///
/// Related dialects are expressed by struct update:
/// `Dialect { name: "sqlazure", ..SQLSRV }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    /// Opening and closing identifier quote.
    pub name_quote: (char, char),
    pub escape: EscapeStyle,
    pub limit: LimitSyntax,
    /// UPDATE and DELETE accept a row limit.
    pub limit_modify: bool,
    /// Zero / null datetime literals, the first one is the canonical null date.
    pub null_datetimes: &'static [&'static str],
    /// Wire type name for each supported parameter type.
    pub parameter_types: &'static [(ParameterType, &'static str)],
    pub concat: ConcatSyntax,
    pub random: &'static str,
    pub regexp: &'static str,
    pub char_length: &'static str,
    pub length: &'static str,
    pub current_timestamp: &'static str,
    /// Target type of `cast_as_char` without a length.
    pub char_type: &'static str,
    /// Target type of `cast_as_char` with a length, substituted for `{}`.
    pub char_type_sized: &'static str,
    pub date_part: DatePartSyntax,
    pub date_add: DateAddSyntax,
    pub find_in_set: FindInSetSyntax,
    /// Literals for `false` and `true`.
    pub booleans: (&'static str, &'static str),
    /// Prefix and suffix around the hex digits of a binary literal.
    pub blob_literal: (&'static str, &'static str),
}

impl Dialect {
    pub fn native_type(&self, data_type: ParameterType) -> Option<&'static str> {
        self.parameter_types
            .iter()
            .find_map(|(t, native)| (*t == data_type).then_some(*native))
    }

    pub fn is_null_datetime(&self, value: &str) -> bool {
        self.null_datetimes.iter().any(|v| *v == value)
    }
}

/// Dialect-neutral defaults, close to standard SQL.
pub const GENERIC: Dialect = Dialect {
    name: "generic",
    name_quote: ('"', '"'),
    escape: EscapeStyle::DoubledQuote,
    limit: LimitSyntax::LimitOffset,
    limit_modify: false,
    null_datetimes: &["0000-00-00 00:00:00"],
    parameter_types: &[
        (ParameterType::Boolean, "bool"),
        (ParameterType::Integer, "int"),
        (ParameterType::LargeObject, "lob"),
        (ParameterType::Null, "null"),
        (ParameterType::String, "str"),
    ],
    concat: ConcatSyntax::Operator {
        operator: " || ",
        parenthesized: false,
    },
    random: "RANDOM()",
    regexp: " REGEXP ",
    char_length: "CHAR_LENGTH",
    length: "LENGTH",
    current_timestamp: "CURRENT_TIMESTAMP",
    char_type: "CHAR",
    char_type_sized: "CHAR({})",
    date_part: DatePartSyntax::Extract,
    date_add: DateAddSyntax::TimestampInterval,
    find_in_set: FindInSetSyntax::Like,
    booleans: ("FALSE", "TRUE"),
    blob_literal: ("X'", "'"),
};

pub const MYSQLI: Dialect = Dialect {
    name: "mysqli",
    name_quote: ('`', '`'),
    escape: EscapeStyle::Backslash,
    limit: LimitSyntax::OffsetComma {
        unbounded: "18446744073709551615",
    },
    limit_modify: true,
    null_datetimes: &["0000-00-00 00:00:00", "1000-01-01 00:00:00"],
    parameter_types: &[
        (ParameterType::Boolean, "TINY"),
        (ParameterType::Integer, "LONGLONG"),
        (ParameterType::LargeObject, "BLOB"),
        (ParameterType::Null, "NULL"),
        (ParameterType::String, "VAR_STRING"),
    ],
    concat: ConcatSyntax::Function,
    random: "RAND()",
    regexp: " REGEXP ",
    char_length: "CHAR_LENGTH",
    length: "LENGTH",
    current_timestamp: "CURRENT_TIMESTAMP()",
    char_type: "CHAR",
    char_type_sized: "CHAR({})",
    date_part: DatePartSyntax::Function,
    date_add: DateAddSyntax::Interval,
    find_in_set: FindInSetSyntax::Function,
    booleans: ("0", "1"),
    blob_literal: ("X'", "'"),
};

/// MySQL reached through a generic client rather than the native one, same SQL.
pub const MYSQL: Dialect = Dialect {
    name: "mysql",
    ..MYSQLI
};

pub const PGSQL: Dialect = Dialect {
    name: "pgsql",
    name_quote: ('"', '"'),
    escape: EscapeStyle::DoubledQuote,
    limit: LimitSyntax::LimitOffset,
    limit_modify: false,
    null_datetimes: &["1970-01-01 00:00:00"],
    parameter_types: &[
        (ParameterType::Boolean, "bool"),
        (ParameterType::Integer, "int8"),
        (ParameterType::LargeObject, "bytea"),
        (ParameterType::Null, "unknown"),
        (ParameterType::String, "text"),
    ],
    concat: ConcatSyntax::Operator {
        operator: " || ",
        parenthesized: false,
    },
    random: "RANDOM()",
    regexp: " ~* ",
    char_length: "CHAR_LENGTH",
    length: "LENGTH",
    current_timestamp: "NOW()",
    char_type: "text",
    char_type_sized: "CHAR({})",
    date_part: DatePartSyntax::Extract,
    date_add: DateAddSyntax::TimestampInterval,
    find_in_set: FindInSetSyntax::AnyArray,
    booleans: ("FALSE", "TRUE"),
    blob_literal: ("'\\x", "'"),
};

pub const SQLITE: Dialect = Dialect {
    name: "sqlite",
    name_quote: ('`', '`'),
    escape: EscapeStyle::DoubledQuote,
    limit: LimitSyntax::OffsetComma { unbounded: "-1" },
    limit_modify: false,
    null_datetimes: &["0000-00-00 00:00:00"],
    parameter_types: &[
        (ParameterType::Boolean, "INTEGER"),
        (ParameterType::Integer, "INTEGER"),
        (ParameterType::LargeObject, "BLOB"),
        (ParameterType::Null, "NULL"),
        (ParameterType::String, "TEXT"),
    ],
    concat: ConcatSyntax::Operator {
        operator: " || ",
        parenthesized: false,
    },
    random: "RANDOM()",
    regexp: " REGEXP ",
    char_length: "length",
    length: "length",
    current_timestamp: "CURRENT_TIMESTAMP",
    char_type: "TEXT",
    char_type_sized: "TEXT",
    date_part: DatePartSyntax::Strftime,
    date_add: DateAddSyntax::Modifier,
    find_in_set: FindInSetSyntax::Like,
    booleans: ("0", "1"),
    blob_literal: ("X'", "'"),
};

pub const SQLSRV: Dialect = Dialect {
    name: "sqlsrv",
    name_quote: ('[', ']'),
    escape: EscapeStyle::Transact,
    limit: LimitSyntax::Top,
    limit_modify: true,
    null_datetimes: &["1900-01-01 00:00:00"],
    parameter_types: &[
        (ParameterType::Boolean, "bit"),
        (ParameterType::Integer, "bigint"),
        (ParameterType::LargeObject, "varbinary(max)"),
        (ParameterType::Null, "NULL"),
        (ParameterType::String, "nvarchar(max)"),
    ],
    concat: ConcatSyntax::Operator {
        operator: " + ",
        parenthesized: true,
    },
    random: "NEWID()",
    regexp: " LIKE ",
    char_length: "DATALENGTH",
    length: "LEN",
    current_timestamp: "GETDATE()",
    char_type: "NVARCHAR(10)",
    char_type_sized: "NVARCHAR({})",
    date_part: DatePartSyntax::DatePart,
    date_add: DateAddSyntax::DateAdd,
    find_in_set: FindInSetSyntax::CharIndex,
    booleans: ("0", "1"),
    blob_literal: ("0x", ""),
};

pub const SQLAZURE: Dialect = Dialect {
    name: "sqlazure",
    ..SQLSRV
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_dialect_inherits() {
        assert_eq!(SQLAZURE.name, "sqlazure");
        assert_eq!(SQLAZURE.name_quote, SQLSRV.name_quote);
        assert_eq!(SQLAZURE.limit, LimitSyntax::Top);
        assert_eq!(MYSQL.name_quote, ('`', '`'));
        assert_eq!(MYSQL.native_type(ParameterType::Integer), Some("LONGLONG"));
        assert_eq!(PGSQL.native_type(ParameterType::LargeObject), Some("bytea"));
    }

    #[test]
    fn null_datetimes() {
        assert!(MYSQLI.is_null_datetime("0000-00-00 00:00:00"));
        assert!(MYSQLI.is_null_datetime("1000-01-01 00:00:00"));
        assert!(!MYSQLI.is_null_datetime("2024-01-01 00:00:00"));
        assert!(PGSQL.is_null_datetime("1970-01-01 00:00:00"));
        assert!(!PGSQL.is_null_datetime("0000-00-00 00:00:00"));
        assert!(SQLSRV.is_null_datetime("1900-01-01 00:00:00"));
    }
}
