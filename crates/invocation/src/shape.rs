//! Call shapes and the handler identities derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tuple::ValueTuple;

/// Prefix shared by every handler identity.
pub const HANDLER_PREFIX: &str = "remcall::RemoteFn_";

/// Argument count and result count of a remote function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
	/// Number of positional arguments.
	pub args: u8,
	/// Number of result values.
	pub returns: u8,
}

impl Shape {
	/// Creates a shape from explicit counts.
	pub const fn new(args: u8, returns: u8) -> Self {
		Self { args, returns }
	}

	/// Shape of a function taking `A` and producing `R`.
	pub fn of<A: ValueTuple, R: ValueTuple>() -> Self {
		// Tuple lengths are bounded by `MAX_TUPLE_LEN`.
		Self::new(A::LEN as u8, R::LEN as u8)
	}

	/// Fully-qualified identity of the handler serving this shape.
	///
	/// Payloads carry this string so a handler can reject invocations that
	/// were routed to it by mistake.
	pub fn handler(self) -> String {
		format!("{HANDLER_PREFIX}{}_{}", self.args, self.returns)
	}

	/// Parses a handler identity back into its shape.
	///
	/// Only the canonical form produced by [`Shape::handler`] is accepted.
	pub fn from_handler(identity: &str) -> Option<Self> {
		let counts = identity.strip_prefix(HANDLER_PREFIX)?;
		let (args, returns) = counts.split_once('_')?;
		let shape = Self::new(args.parse().ok()?, returns.parse().ok()?);
		(shape.handler() == identity).then_some(shape)
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.args, self.returns)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn handler_identity_names_both_counts() {
		let shape = Shape::of::<(i64, i64, i64, i64, i64, i64), (i64, String)>();
		assert_eq!(shape, Shape::new(6, 2));
		assert_eq!(shape.handler(), "remcall::RemoteFn_6_2");
		assert_eq!(shape.to_string(), "6x2");
	}

	#[test]
	fn from_handler_accepts_canonical_identities_only() {
		assert_eq!(Shape::from_handler("remcall::RemoteFn_6_2"), Some(Shape::new(6, 2)));
		assert_eq!(Shape::from_handler("remcall::RemoteFn_0_0"), Some(Shape::new(0, 0)));
		assert_eq!(Shape::from_handler("remcall::RemoteFn_06_2"), None);
		assert_eq!(Shape::from_handler("remcall::RemoteFn_+6_2"), None);
		assert_eq!(Shape::from_handler("remcall::RemoteFn_6"), None);
		assert_eq!(Shape::from_handler("org.ray.api.funcs.RayFunc_6_2"), None);
		assert_eq!(Shape::from_handler("remcall::RemoteFn_300_1"), None);
	}
}
