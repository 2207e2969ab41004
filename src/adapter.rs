//! Type adapters (spec §6's "programmatic surface" / AMBIENT 6.B): typed
//! views over a materialized [`Value`], each returning "absent" for null,
//! missing, or wrong-category input rather than failing, plus an
//! `*_or_throw` family for callers who want a single fault kind instead.

use num_bigint::BigInt;
use smol_str::SmolStr;

use crate::err::{ConfigError, ConfigResult};
use crate::model::value::{Element, Timestamp, Value};

/// Typed-view accessors over the result of a field lookup
/// (`Option<&Value>`, the shape `HashMap::get` naturally returns).
///
/// A category mismatch (e.g. calling `as_i64` on a string) is absence, not
/// an error — the same "wrong category ⇒ absent" rule spec §6 states for
/// type adapters in general.
pub trait ValueAdapter {
    fn as_i64(&self) -> Option<i64>;
    fn as_big_int(&self) -> Option<&BigInt>;
    fn as_decimal(&self) -> Option<&bigdecimal::BigDecimal>;
    fn as_f64(&self) -> Option<f64>;
    fn as_bool(&self) -> Option<bool>;
    fn as_str(&self) -> Option<&str>;
    fn as_symbol(&self) -> Option<&str>;
    fn as_timestamp(&self) -> Option<&Timestamp>;
    fn as_blob(&self) -> Option<&[u8]>;
    fn as_list(&self) -> Option<&[Element]>;
    fn as_struct(&self) -> Option<&[(SmolStr, Element)]>;

    fn as_i64_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<i64> {
        require(self.as_i64(), namespace, field)
    }
    fn as_big_int_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&BigInt> {
        require(self.as_big_int(), namespace, field)
    }
    fn as_decimal_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&bigdecimal::BigDecimal> {
        require(self.as_decimal(), namespace, field)
    }
    fn as_f64_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<f64> {
        require(self.as_f64(), namespace, field)
    }
    fn as_bool_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<bool> {
        require(self.as_bool(), namespace, field)
    }
    fn as_str_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&str> {
        require(self.as_str(), namespace, field)
    }
    fn as_symbol_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&str> {
        require(self.as_symbol(), namespace, field)
    }
    fn as_timestamp_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&Timestamp> {
        require(self.as_timestamp(), namespace, field)
    }
    fn as_blob_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&[u8]> {
        require(self.as_blob(), namespace, field)
    }
    fn as_list_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&[Element]> {
        require(self.as_list(), namespace, field)
    }
    fn as_struct_or_throw(&self, namespace: &str, field: &str) -> ConfigResult<&[(SmolStr, Element)]> {
        require(self.as_struct(), namespace, field)
    }
}

fn require<T>(opt: Option<T>, namespace: &str, field: &str) -> ConfigResult<T> {
    opt.ok_or_else(|| ConfigError::ValueAbsent {
        namespace: SmolStr::new(namespace),
        field: SmolStr::new(field),
    })
}

impl ValueAdapter for Option<&Value> {
    fn as_i64(&self) -> Option<i64> {
        use num_traits::ToPrimitive;
        self.and_then(|v| v.as_int()).and_then(|i| i.to_i64())
    }
    fn as_big_int(&self) -> Option<&BigInt> {
        self.and_then(|v| v.as_int())
    }
    fn as_decimal(&self) -> Option<&bigdecimal::BigDecimal> {
        self.and_then(|v| v.as_decimal())
    }
    fn as_f64(&self) -> Option<f64> {
        self.and_then(|v| v.as_float())
    }
    fn as_bool(&self) -> Option<bool> {
        self.and_then(|v| v.as_bool())
    }
    fn as_str(&self) -> Option<&str> {
        self.and_then(|v| match v {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
    }
    fn as_symbol(&self) -> Option<&str> {
        self.and_then(|v| match v {
            Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        })
    }
    fn as_timestamp(&self) -> Option<&Timestamp> {
        self.and_then(|v| v.as_timestamp())
    }
    fn as_blob(&self) -> Option<&[u8]> {
        self.and_then(|v| v.as_blob())
    }
    fn as_list(&self) -> Option<&[Element]> {
        self.and_then(|v| v.as_list())
    }
    fn as_struct(&self) -> Option<&[(SmolStr, Element)]> {
        self.and_then(|v| v.as_struct())
    }
}

/// Deserialize a materialized [`Value`] into a user-defined type.
///
/// The crate ships this trait and nothing else — no derive macro — keeping
/// "deserialization of struct values into user-defined record types" the
/// genuinely pluggable external concern spec §1 describes it as. Implement
/// it by hand against [`Value::as_struct`] and the [`ValueAdapter`] methods
/// above.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        use num_traits::ToPrimitive;
        value.as_int().and_then(|i| i.to_i64())
    }
}

impl FromValue for BigInt {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_int().cloned()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_owned)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::value::Value;

    #[test]
    fn category_mismatch_is_absent_not_error() {
        let value = Value::Bool(true);
        let as_ref: Option<&Value> = Some(&value);
        assert_eq!(as_ref.as_i64(), None);
        assert_eq!(as_ref.as_bool(), Some(true));
    }

    #[test]
    fn missing_field_is_absent() {
        let as_ref: Option<&Value> = None;
        assert_eq!(as_ref.as_str(), None);
    }

    #[test]
    fn or_throw_promotes_absence_to_value_absent() {
        let as_ref: Option<&Value> = None;
        let err = as_ref.as_i64_or_throw("Products", "myField").unwrap_err();
        assert!(matches!(err, ConfigError::ValueAbsent { .. }));
    }

    #[test]
    fn or_throw_succeeds_when_present() {
        let value = Value::Int(BigInt::from(42));
        let as_ref: Option<&Value> = Some(&value);
        assert_eq!(as_ref.as_i64_or_throw("Products", "myField").unwrap(), 42);
    }

    #[test]
    fn from_value_bridges_scalars() {
        assert_eq!(i64::from_value(&Value::Int(BigInt::from(7))), Some(7));
        assert_eq!(bool::from_value(&Value::Bool(false)), Some(false));
        assert_eq!(String::from_value(&Value::String(SmolStr::new("x"))), Some("x".to_string()));
    }
}
