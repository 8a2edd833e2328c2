//! Wire codec for callable bytes.
//!
//! Layout: one format version byte followed by the postcard encoding of a
//! [`FunctionRef`]. The whole buffer must be consumed.

use crate::error::{DecodeError, EncodeError};
use crate::function_ref::FunctionRef;

/// Current callable format version.
pub const CALLABLE_FORMAT_VERSION: u8 = 1;

/// Serializes a function reference into callable bytes.
pub fn encode_callable(function: &FunctionRef) -> Result<Vec<u8>, EncodeError> {
	let body = postcard::to_stdvec(function)?;
	let mut out = Vec::with_capacity(body.len() + 1);
	out.push(CALLABLE_FORMAT_VERSION);
	out.extend_from_slice(&body);
	Ok(out)
}

/// Reconstructs a function reference from callable bytes.
pub fn decode_callable(bytes: &[u8]) -> Result<FunctionRef, DecodeError> {
	let Some((&version, body)) = bytes.split_first() else {
		return Err(DecodeError::Empty);
	};
	if version != CALLABLE_FORMAT_VERSION {
		return Err(DecodeError::UnsupportedVersion(version));
	}
	let (function, rest) = postcard::take_from_bytes::<FunctionRef>(body)?;
	if !rest.is_empty() {
		return Err(DecodeError::TrailingBytes(rest.len()));
	}
	Ok(function)
}
