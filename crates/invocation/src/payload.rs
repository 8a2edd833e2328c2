//! Invocation payloads in envelope and flat-slot form.
//!
//! The flat form is the ordered slot sequence a dispatch layer hands to a
//! handler: the positional arguments, then the handler identity as a
//! string, then the callable bytes.

use crate::codec::encode_callable;
use crate::error::{DecodeError, EncodeError};
use crate::function_ref::FunctionRef;
use crate::shape::Shape;
use crate::tuple::ValueTuple;
use crate::value::ArgValue;

/// Number of trailing slots after the positional arguments.
pub const TRAILER_SLOTS: usize = 2;

/// One invocation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
	/// Positional arguments.
	pub args: Vec<ArgValue>,
	/// Identity of the handler the payload is routed to.
	pub handler: String,
	/// Encoded [`FunctionRef`].
	pub callable: Vec<u8>,
}

impl Payload {
	/// Builds the payload for calling `function` with `args`.
	///
	/// The handler identity is taken from the argument and result types, and
	/// must agree with the shape declared by `function`.
	pub fn prepare<A: ValueTuple, R: ValueTuple>(function: &FunctionRef, args: A) -> Result<Self, EncodeError> {
		let shape = Shape::of::<A, R>();
		if function.shape() != shape {
			return Err(EncodeError::ShapeMismatch {
				function: function.name().to_string(),
				declared: function.shape(),
				requested: shape,
			});
		}
		Ok(Self {
			args: args.encode(),
			handler: shape.handler(),
			callable: encode_callable(function)?,
		})
	}

	/// Shape named by the handler identity, if it is one.
	pub fn shape(&self) -> Option<Shape> {
		Shape::from_handler(&self.handler)
	}

	/// Flattens the payload into `[args.., Str(handler), Bytes(callable)]`.
	pub fn into_slots(self) -> Vec<ArgValue> {
		let mut slots = self.args;
		slots.reserve(TRAILER_SLOTS);
		slots.push(ArgValue::Str(self.handler));
		slots.push(ArgValue::Bytes(self.callable));
		slots
	}

	/// Splits a flat slot sequence back into a payload.
	pub fn from_slots(mut slots: Vec<ArgValue>) -> Result<Self, DecodeError> {
		let callable = match slots.pop() {
			Some(ArgValue::Bytes(bytes)) => bytes,
			Some(_) => return Err(DecodeError::Layout("last slot must hold the callable bytes")),
			None => return Err(DecodeError::Layout("missing callable slot")),
		};
		let handler = match slots.pop() {
			Some(ArgValue::Str(name)) => name,
			Some(_) => return Err(DecodeError::Layout("second-to-last slot must hold the handler identity")),
			None => return Err(DecodeError::Layout("missing handler slot")),
		};
		Ok(Self { args: slots, handler, callable })
	}
}
