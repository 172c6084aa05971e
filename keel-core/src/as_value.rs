use crate::{Error, Result, Value, truncate_long};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::{any, borrow::Cow, rc::Rc, sync::Arc};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and [`Value`].
///
/// Used on the way in when binding parameters and on the way out when
/// decoding columns of a fetched row.
///
/// # Conversion contract
/// - The canonical variant for the type is always accepted.
/// - Integers accept any other integer variant that fits after a range check.
/// - Many clients return every column as text: numeric, temporal and uuid
///   targets fall back to parsing a `Value::Varchar`.
///
/// ```rust
/// use keel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::conversion(format!(
        "Cannot convert {:?} into {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_failed<T>(input: &str) -> Error {
    Error::conversion(format!(
        "Cannot parse `{}` as {}",
        truncate_long!(input),
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let converted = match &value {
                    Value::Int8(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Int16(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Int32(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Int64(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt8(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt16(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt32(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::UInt64(Some(v)) => <$source>::try_from(*v).ok(),
                    Value::Boolean(Some(v)) => Some(*v as $source),
                    Value::Varchar(Some(v)) => {
                        return v.trim().parse::<$source>().map_err(|_| parse_failed::<$source>(v));
                    }
                    _ => None,
                };
                converted.ok_or_else(|| mismatch::<$source>(&value))
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Value::Boolean(Some(v)) = value {
            return Ok(v);
        }
        if let Value::Varchar(Some(v)) = &value {
            return match v.trim() {
                "1" | "true" | "TRUE" | "t" => Ok(true),
                "0" | "false" | "FALSE" | "f" => Ok(false),
                _ => Err(parse_failed::<bool>(v)),
            };
        }
        value
            .as_i64()
            .map(|v| v != 0)
            .ok_or_else(|| mismatch::<bool>(&value))
    }
}

macro_rules! impl_as_value_float {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float32(Some(v)) => Ok(v as $source),
                    Value::Float64(Some(v)) => Ok(v as $source),
                    Value::Varchar(Some(v)) => v
                        .trim()
                        .parse::<$source>()
                        .map_err(|_| parse_failed::<$source>(&v)),
                    v => v
                        .as_i64()
                        .map(|i| i as $source)
                        .ok_or_else(|| mismatch::<$source>(&v)),
                }
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => Decimal::from_f32(v).ok_or_else(|| mismatch::<Decimal>(&value)),
            Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| mismatch::<Decimal>(&value)),
            Value::Varchar(Some(v)) => v
                .trim()
                .parse::<Decimal>()
                .map_err(|_| parse_failed::<Decimal>(&v)),
            v => v
                .as_i64()
                .map(Decimal::from)
                .ok_or_else(|| mismatch::<Decimal>(&v)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            v if v.is_null() => Err(mismatch::<String>(&v)),
            Value::Blob(Some(v)) => {
                String::from_utf8(v.into_vec()).map_err(|e| Error::conversion(e.to_string()))
            }
            v => Ok(v.to_string()),
        }
    }
}

impl AsValue for &str {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.to_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(mismatch::<&str>(&value))
    }
}

impl AsValue for Cow<'_, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            v => Err(mismatch::<Box<[u8]>>(&v)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

macro_rules! impl_as_value_parsed {
    ($source:ty, $variant:path, $parse:expr) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $variant(Some(v)) => Ok(v),
                    Value::Varchar(Some(v)) => {
                        let parse: fn(&str) -> Option<$source> = $parse;
                        parse(v.trim()).ok_or_else(|| parse_failed::<$source>(&v))
                    }
                    v => Err(mismatch::<$source>(&v)),
                }
            }
        }
    };
}

impl_as_value_parsed!(Date, Value::Date, |v| {
    Date::parse(v, format_description!("[year]-[month]-[day]")).ok()
});
impl_as_value_parsed!(Time, Value::Time, |v| {
    Time::parse(v, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(v, format_description!("[hour]:[minute]:[second].[subsecond]")))
        .ok()
});
impl_as_value_parsed!(PrimitiveDateTime, Value::Timestamp, |v| {
    PrimitiveDateTime::parse(
        v,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            v,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .ok()
});
impl_as_value_parsed!(OffsetDateTime, Value::TimestampWithTimezone, |v| {
    OffsetDateTime::parse(v, &time::format_description::well_known::Rfc3339).ok()
});
impl_as_value_parsed!(Uuid, Value::Uuid, |v| Uuid::parse_str(v).ok());

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}

macro_rules! impl_as_value_wrapper {
    ($wrapper:ident) => {
        impl<T: AsValue + Clone> AsValue for $wrapper<T> {
            fn as_empty_value() -> Value {
                T::as_empty_value()
            }
            fn as_value(self) -> Value {
                T::clone(&self).as_value()
            }
            fn try_from_value(value: Value) -> Result<Self> {
                T::try_from_value(value).map($wrapper::new)
            }
        }
    };
}
impl_as_value_wrapper!(Rc);
impl_as_value_wrapper!(Arc);

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}
