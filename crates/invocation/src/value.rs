//! Tagged argument values carried in invocation slots.
//!
//! Every positional argument, captured value and result travels as an
//! [`ArgValue`]. Rust types enter and leave that representation through
//! [`IntoArg`] and [`FromArg`], which check the tag instead of casting.

use std::fmt;

use serde::{Deserialize, Serialize};

mod de;

/// Deepest list nesting accepted when decoding untrusted values.
pub const MAX_VALUE_DEPTH: usize = 64;

/// One positional value in an invocation payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArgValue {
	/// Unit value (no payload).
	Unit,
	/// Boolean value.
	Bool(bool),
	/// Signed integer value.
	Int(i64),
	/// Floating point value.
	Float(f64),
	/// UTF-8 string value.
	Str(String),
	/// Opaque byte string.
	Bytes(Vec<u8>),
	/// Ordered list of values.
	List(Vec<ArgValue>),
}

impl ArgValue {
	/// Returns the tag of this value.
	pub const fn kind(&self) -> ArgKind {
		match self {
			Self::Unit => ArgKind::Unit,
			Self::Bool(_) => ArgKind::Bool,
			Self::Int(_) => ArgKind::Int,
			Self::Float(_) => ArgKind::Float,
			Self::Str(_) => ArgKind::Str,
			Self::Bytes(_) => ArgKind::Bytes,
			Self::List(_) => ArgKind::List,
		}
	}

	/// Returns true if this value carries the given tag.
	pub fn matches_kind(&self, kind: ArgKind) -> bool {
		self.kind() == kind
	}

	/// Nesting depth: `0` for scalars, one more than the deepest element for lists.
	pub fn depth(&self) -> usize {
		let mut deepest = 0;
		let mut pending = vec![(self, 0usize)];
		while let Some((value, depth)) = pending.pop() {
			if let Self::List(items) = value {
				deepest = deepest.max(depth + 1);
				pending.extend(items.iter().map(|item| (item, depth + 1)));
			}
		}
		deepest
	}
}

impl From<bool> for ArgValue {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for ArgValue {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<f64> for ArgValue {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<String> for ArgValue {
	fn from(v: String) -> Self {
		Self::Str(v)
	}
}

impl From<&str> for ArgValue {
	fn from(v: &str) -> Self {
		Self::Str(v.to_string())
	}
}

impl From<Bytes> for ArgValue {
	fn from(v: Bytes) -> Self {
		Self::Bytes(v.0)
	}
}

/// The tag of an [`ArgValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgKind {
	Unit,
	Bool,
	Int,
	Float,
	Str,
	Bytes,
	List,
}

impl ArgKind {
	/// Stable lower-case name used in error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unit => "unit",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::Str => "str",
			Self::Bytes => "bytes",
			Self::List => "list",
		}
	}
}

impl fmt::Display for ArgKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Byte string argument.
///
/// `Vec<u8>` already maps to a list of integers through the blanket
/// `Vec<T>` conversion, so raw bytes go through this wrapper instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
	fn from(v: Vec<u8>) -> Self {
		Self(v)
	}
}

/// Failure converting one [`ArgValue`] into a Rust type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
	/// The value carries a different tag than the target type.
	#[error("expected {expected}, found {found}")]
	Kind { expected: ArgKind, found: ArgKind },
	/// The integer does not fit the target type.
	#[error("{value} is out of range for {target}")]
	OutOfRange { value: i64, target: &'static str },
}

/// Types that can be extracted from an [`ArgValue`].
pub trait FromArg: Sized {
	/// Returns the tag this type is decoded from.
	fn kind() -> ArgKind;

	/// Extracts the value, failing if the tag or range does not match.
	fn from_arg(value: ArgValue) -> Result<Self, ConvertError>;
}

/// Types that can be stored as an [`ArgValue`].
pub trait IntoArg {
	/// Converts `self` into its tagged representation.
	fn into_arg(self) -> ArgValue;
}

fn mismatch(expected: ArgKind, value: &ArgValue) -> ConvertError {
	ConvertError::Kind {
		expected,
		found: value.kind(),
	}
}

impl IntoArg for ArgValue {
	fn into_arg(self) -> ArgValue {
		self
	}
}

impl FromArg for () {
	fn kind() -> ArgKind {
		ArgKind::Unit
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::Unit => Ok(()),
			other => Err(mismatch(ArgKind::Unit, &other)),
		}
	}
}

impl IntoArg for () {
	fn into_arg(self) -> ArgValue {
		ArgValue::Unit
	}
}

impl FromArg for bool {
	fn kind() -> ArgKind {
		ArgKind::Bool
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::Bool(v) => Ok(v),
			other => Err(mismatch(ArgKind::Bool, &other)),
		}
	}
}

impl IntoArg for bool {
	fn into_arg(self) -> ArgValue {
		ArgValue::Bool(self)
	}
}

impl FromArg for i64 {
	fn kind() -> ArgKind {
		ArgKind::Int
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::Int(v) => Ok(v),
			other => Err(mismatch(ArgKind::Int, &other)),
		}
	}
}

impl IntoArg for i64 {
	fn into_arg(self) -> ArgValue {
		ArgValue::Int(self)
	}
}

macro_rules! narrow_int {
	($($ty:ty),* $(,)?) => {
		$(
			impl FromArg for $ty {
				fn kind() -> ArgKind {
					ArgKind::Int
				}

				fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
					match value {
						ArgValue::Int(v) => <$ty>::try_from(v).map_err(|_| ConvertError::OutOfRange {
							value: v,
							target: stringify!($ty),
						}),
						other => Err(mismatch(ArgKind::Int, &other)),
					}
				}
			}

			impl IntoArg for $ty {
				fn into_arg(self) -> ArgValue {
					ArgValue::Int(i64::from(self))
				}
			}
		)*
	};
}

narrow_int!(i32, u32);

impl FromArg for f64 {
	fn kind() -> ArgKind {
		ArgKind::Float
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::Float(v) => Ok(v),
			other => Err(mismatch(ArgKind::Float, &other)),
		}
	}
}

impl IntoArg for f64 {
	fn into_arg(self) -> ArgValue {
		ArgValue::Float(self)
	}
}

impl FromArg for String {
	fn kind() -> ArgKind {
		ArgKind::Str
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::Str(v) => Ok(v),
			other => Err(mismatch(ArgKind::Str, &other)),
		}
	}
}

impl IntoArg for String {
	fn into_arg(self) -> ArgValue {
		ArgValue::Str(self)
	}
}

impl IntoArg for &str {
	fn into_arg(self) -> ArgValue {
		ArgValue::Str(self.to_string())
	}
}

impl FromArg for Bytes {
	fn kind() -> ArgKind {
		ArgKind::Bytes
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::Bytes(v) => Ok(Bytes(v)),
			other => Err(mismatch(ArgKind::Bytes, &other)),
		}
	}
}

impl IntoArg for Bytes {
	fn into_arg(self) -> ArgValue {
		ArgValue::Bytes(self.0)
	}
}

impl<T: FromArg> FromArg for Vec<T> {
	fn kind() -> ArgKind {
		ArgKind::List
	}

	fn from_arg(value: ArgValue) -> Result<Self, ConvertError> {
		match value {
			ArgValue::List(items) => items.into_iter().map(T::from_arg).collect(),
			other => Err(mismatch(ArgKind::List, &other)),
		}
	}
}

impl<T: IntoArg> IntoArg for Vec<T> {
	fn into_arg(self) -> ArgValue {
		ArgValue::List(self.into_iter().map(IntoArg::into_arg).collect())
	}
}
