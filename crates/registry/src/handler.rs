//! Function static registration via `inventory`.
//!
//! Each `remote_fn!` invocation creates a `FunctionStatic` and submits it via
//! `inventory::submit!`. [`crate::FUNCTIONS`] collects every submission the
//! first time it is accessed.

use crate::function::Function;

/// Static registration entry collected via `inventory`.
pub struct FunctionStatic {
	/// Registered function name.
	pub name: &'static str,
	/// Crate that defined this function.
	pub crate_name: &'static str,
	/// Builds the registry entry.
	pub build: fn() -> Function,
}

/// Wrapper for `inventory::collect!`.
pub struct FunctionReg(pub &'static FunctionStatic);

inventory::collect!(FunctionReg);

/// Iterates every statically submitted function.
pub fn submitted() -> impl Iterator<Item = &'static FunctionStatic> {
	inventory::iter::<FunctionReg>.into_iter().map(|reg| reg.0)
}
