//! Validation limits applied to payloads before they are decoded.

use std::path::Path;

use serde::Deserialize;

use crate::error::{InvokeError, LimitsError};
use crate::function_ref::FunctionRef;
use crate::payload::Payload;
use crate::value::ArgValue;

/// Validation limits for invocation payloads.
///
/// Loaded from TOML; keys that are left out keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvocationLimits {
	/// Max positional args per invocation.
	pub max_args: usize,
	/// Max encoded callable length in bytes.
	pub max_callable_bytes: usize,
	/// Max captured values per function reference.
	pub max_captured: usize,
	/// Max length of function names and handler identities.
	pub max_string_len: usize,
	/// Max list nesting of any argument or captured value.
	///
	/// Callable decoding stops at [`crate::MAX_VALUE_DEPTH`] regardless.
	pub max_depth: usize,
}

/// Default limits.
pub const DEFAULT_LIMITS: InvocationLimits = InvocationLimits {
	max_args: 64,
	max_callable_bytes: 64 * 1024,
	max_captured: 64,
	max_string_len: 4096,
	max_depth: 32,
};

impl Default for InvocationLimits {
	fn default() -> Self {
		DEFAULT_LIMITS
	}
}

impl InvocationLimits {
	/// Parses limits from a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, LimitsError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads and parses a TOML limits file.
	pub fn from_path(path: &Path) -> Result<Self, LimitsError> {
		let source = std::fs::read_to_string(path).map_err(|source| LimitsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Checks the envelope before the callable is decoded.
	pub fn check_payload(&self, payload: &Payload) -> Result<(), InvokeError> {
		check("handler identity length", self.max_string_len, payload.handler.len())?;
		check("argument count", self.max_args, payload.args.len())?;
		check("callable size", self.max_callable_bytes, payload.callable.len())?;
		check_depth("argument nesting", self.max_depth, &payload.args)
	}

	/// Checks a decoded function reference.
	pub fn check_function(&self, function: &FunctionRef) -> Result<(), InvokeError> {
		check("function name length", self.max_string_len, function.name().len())?;
		check("captured value count", self.max_captured, function.captured().len())?;
		check_depth("captured value nesting", self.max_depth, function.captured().values())
	}
}

fn check(what: &'static str, limit: usize, found: usize) -> Result<(), InvokeError> {
	if found > limit {
		return Err(InvokeError::Limit { what, limit, found });
	}
	Ok(())
}

fn check_depth(what: &'static str, limit: usize, values: &[ArgValue]) -> Result<(), InvokeError> {
	let deepest = values.iter().map(ArgValue::depth).max().unwrap_or(0);
	check(what, limit, deepest)
}
