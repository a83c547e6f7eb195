//! Type-erased return payloads and their typed resolution.
//!
//! A [`Value`] is a tagged variant covering the primitive types hardware APIs
//! return (flags, byte counts, signed status codes, strings, buffers) plus an
//! [`Value::Opaque`] escape hatch for arbitrary `Any` types such as enums or
//! address structs. Resolution goes through [`FromValue`]; a failed cast is
//! reported as `None` so the engine can surface a typed mismatch instead of
//! guessing.
//!
//! Integral targets accept either integer variant as long as the stored number
//! fits, so `returns("read", 10)` resolves as `usize`, `i32` or `u8` alike.

#![allow(missing_docs)]

use std::any::Any;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One type-erased return payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    #[serde(rename = "uint")]
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Arbitrary Rust value; never serialized.
    #[serde(skip)]
    Opaque(OpaqueValue),
}

/// Shared handle to an arbitrary `Any` payload.
#[derive(Clone)]
pub struct OpaqueValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueValue {
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque<{}>", self.type_name)
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Value {
    /// Wrap an arbitrary value.
    #[must_use]
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(OpaqueValue::new(value))
    }

    /// Borrow an opaque payload as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(opaque) => opaque.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Short name of the stored variant, used in mismatch diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Opaque(opaque) => opaque.type_name(),
        }
    }

    /// Resolve as `T`, `None` when the stored variant cannot become `T`.
    #[must_use]
    pub fn resolve<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::Opaque(opaque) => write!(f, "<{}>", opaque.type_name()),
        }
    }
}

/// Conversion from a stored [`Value`] into a concrete return type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Option<Self> {
        matches!(value, Value::Unit).then_some(())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Addresses travel as strings so scenario files can declare them.
impl FromValue for IpAddr {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => v.parse().ok(),
            Value::Opaque(opaque) => opaque.downcast_ref::<Self>().copied(),
            _ => None,
        }
    }
}

macro_rules! integral_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(v) => <$t>::try_from(*v).ok(),
                        Value::UInt(v) => <$t>::try_from(*v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integral_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! signed_into_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

macro_rules! unsigned_into_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::UInt(u64::from(v))
                }
            }
        )*
    };
}

signed_into_value!(i8, i16, i32, i64);
unsigned_into_value!(u8, u16, u32, u64);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        u64::try_from(v).map_or(Self::UInt(u64::MAX), Self::UInt)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        i64::try_from(v).map_or(Self::Int(i64::MAX), Self::Int)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<IpAddr> for Value {
    fn from(v: IpAddr) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<OpaqueValue> for Value {
    fn from(v: OpaqueValue) -> Self {
        Self::Opaque(v)
    }
}

/// Let a `Clone + Send + Sync + 'static` type travel through the engine as an
/// opaque value: implements [`FromValue`] for it and `From<T> for Value`.
///
/// ```rust
/// #[derive(Debug, Clone, PartialEq)]
/// struct Ip([u8; 4]);
/// hw_emulator::opaque_value!(Ip);
///
/// let value = hw_emulator::engine::value::Value::from(Ip([10, 0, 0, 1]));
/// assert_eq!(value.resolve::<Ip>(), Some(Ip([10, 0, 0, 1])));
/// ```
#[macro_export]
macro_rules! opaque_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::engine::value::FromValue for $t {
                fn from_value(value: &$crate::engine::value::Value) -> Option<Self> {
                    value.downcast_ref::<$t>().cloned()
                }
            }

            impl From<$t> for $crate::engine::value::Value {
                fn from(v: $t) -> Self {
                    $crate::engine::value::Value::opaque(v)
                }
            }
        )+
    };
}

/// Build a `Vec<Value>` argument snapshot from heterogeneous expressions.
///
/// ```rust
/// let args = hw_emulator::args!["GPRS", 3_u32, true];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::engine::value::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::engine::value::Value::from($arg)),+]
    };
}
