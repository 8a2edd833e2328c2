//! Errors shared by every invocation entry point.

use crate::shape::Shape;
use crate::tuple::SlotError;
use crate::value::ConvertError;

/// Boxed error returned by a failing remote function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Callable bytes or slot layout could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	/// The callable buffer is empty.
	#[error("callable payload is empty")]
	Empty,
	/// The callable was written by an incompatible encoder.
	#[error("unsupported callable format version {0}")]
	UnsupportedVersion(u8),
	/// The callable body is corrupt or truncated.
	#[error("malformed callable payload: {0}")]
	Malformed(#[from] postcard::Error),
	/// Bytes remain after the callable body.
	#[error("{0} trailing bytes after callable payload")]
	TrailingBytes(usize),
	/// The slot array does not follow the invocation layout.
	#[error("invalid slot layout: {0}")]
	Layout(&'static str),
}

/// A payload could not be built on the caller side.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
	#[error("failed to serialize callable: {0}")]
	Serialize(#[from] postcard::Error),
	/// The function reference declares a different shape than the call.
	#[error("function `{function}` is declared as {declared}, call has shape {requested}")]
	ShapeMismatch {
		function: String,
		declared: Shape,
		requested: Shape,
	},
}

/// Failure of a single invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
	/// The payload names a different handler than the one executing it.
	#[error("routing error: handler `{expected}` received payload for `{found}`")]
	Routing { expected: String, found: String },
	#[error(transparent)]
	Decode(#[from] DecodeError),
	#[error(transparent)]
	Encode(#[from] EncodeError),
	/// Slot, argument or result count differs from the declared shape.
	#[error("expected {expected} {what}, found {found}")]
	Arity { what: &'static str, expected: usize, found: usize },
	/// A positional argument has the wrong kind or range.
	#[error("argument {slot}: {source}")]
	Argument {
		slot: usize,
		#[source]
		source: ConvertError,
	},
	/// A function produced a result of the wrong kind or range.
	#[error("result {slot} of `{function}`: {source}")]
	Return {
		function: String,
		slot: usize,
		#[source]
		source: ConvertError,
	},
	/// Callable or registered shape differs from the handler's shape.
	#[error("function `{function}` has shape {found}, handler expects {expected}")]
	ShapeMismatch { function: String, expected: Shape, found: Shape },
	#[error("unknown function `{0}`")]
	UnknownFunction(String),
	/// A configured limit was exceeded before decoding.
	#[error("{what} exceeds limit of {limit} (found {found})")]
	Limit { what: &'static str, limit: usize, found: usize },
	/// The function itself failed; `source` is its original error.
	#[error("function `{function}` failed: {source}")]
	Invocation {
		function: String,
		#[source]
		source: BoxError,
	},
}

impl InvokeError {
	/// Maps an argument tuple decode failure.
	pub fn from_args(err: SlotError) -> Self {
		match err {
			SlotError::Count { expected, found } => Self::Arity {
				what: "arguments",
				expected,
				found,
			},
			SlotError::Value { slot, source } => Self::Argument { slot, source },
		}
	}

	/// Maps a result tuple decode failure for `function`.
	pub fn from_returns(function: &str, err: SlotError) -> Self {
		match err {
			SlotError::Count { expected, found } => Self::Arity {
				what: "results",
				expected,
				found,
			},
			SlotError::Value { slot, source } => Self::Return {
				function: function.to_string(),
				slot,
				source,
			},
		}
	}

	/// Returns `true` for failures raised by the function rather than the envelope.
	pub fn is_invocation(&self) -> bool {
		matches!(self, Self::Invocation { .. })
	}
}

/// Invocation limits could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LimitsError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: std::path::PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid limits: {0}")]
	Parse(#[from] toml::de::Error),
}
