//! Serializable references to registered functions.
//!
//! A closure cannot cross a process boundary, so a remote callable is a
//! function name plus the state it captured, written out explicitly.

use serde::{Deserialize, Serialize};

use crate::shape::Shape;
use crate::tuple::ValueTuple;
use crate::value::{ArgValue, ConvertError, FromArg, IntoArg};

/// Named function reference with an explicit captured-state record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRef {
	name: String,
	shape: Shape,
	captured: Captured,
}

impl FunctionRef {
	/// Creates a reference to `name` expecting the given shape.
	pub fn new(name: impl Into<String>, shape: Shape) -> Self {
		Self {
			name: name.into(),
			shape,
			captured: Captured::default(),
		}
	}

	/// Creates a reference whose shape is derived from the argument and result types.
	pub fn of<A: ValueTuple, R: ValueTuple>(name: impl Into<String>) -> Self {
		Self::new(name, Shape::of::<A, R>())
	}

	/// Appends one captured value.
	pub fn capture(mut self, value: impl IntoArg) -> Self {
		self.captured.0.push(value.into_arg());
		self
	}

	/// Registered function name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Shape the caller expects the function to have.
	pub fn shape(&self) -> Shape {
		self.shape
	}

	/// Captured state handed to the function.
	pub fn captured(&self) -> &Captured {
		&self.captured
	}

	/// Splits the reference into name, shape and captured state.
	pub fn into_parts(self) -> (String, Shape, Captured) {
		(self.name, self.shape, self.captured)
	}
}

/// Failure reading a captured value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
	#[error("captured value {index} is missing ({len} captured)")]
	Missing { index: usize, len: usize },
	#[error("captured value {index}: {source}")]
	Value {
		index: usize,
		#[source]
		source: ConvertError,
	},
}

/// Captured state of a [`FunctionRef`], in capture order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Captured(Vec<ArgValue>);

impl Captured {
	/// Wraps already-tagged values.
	pub fn new(values: Vec<ArgValue>) -> Self {
		Self(values)
	}

	/// Number of captured values.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Raw captured values.
	pub fn values(&self) -> &[ArgValue] {
		&self.0
	}

	/// Reads captured value `index` as `T`.
	pub fn get<T: FromArg>(&self, index: usize) -> Result<T, CaptureError> {
		let value = self.0.get(index).cloned().ok_or(CaptureError::Missing { index, len: self.0.len() })?;
		T::from_arg(value).map_err(|source| CaptureError::Value { index, source })
	}
}
