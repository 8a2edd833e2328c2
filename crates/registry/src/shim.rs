//! Typed invocation shims.
//!
//! A [`Shim`] is the handler for one shape. It accepts the flat slot layout,
//! rejects payloads addressed to any other handler, and returns the
//! function's results as a typed tuple.

use std::marker::PhantomData;

use remcall_invocation::{ArgValue, FunctionRef, InvokeError, Payload, Shape, TRAILER_SLOTS, ValueTuple};

use crate::dispatcher::Dispatcher;

/// Handler for functions taking `A` and returning `R`.
pub struct Shim<A, R> {
	dispatcher: Dispatcher,
	_marker: PhantomData<fn(A) -> R>,
}

/// Shim for six arguments and two results.
pub type Shim6x2<T0, T1, T2, T3, T4, T5, R0, R1> = Shim<(T0, T1, T2, T3, T4, T5), (R0, R1)>;

impl<A, R> Clone for Shim<A, R> {
	fn clone(&self) -> Self {
		Self {
			dispatcher: self.dispatcher.clone(),
			_marker: PhantomData,
		}
	}
}

impl<A, R> std::fmt::Debug for Shim<A, R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Shim")
			.field("args", &std::any::type_name::<A>())
			.field("returns", &std::any::type_name::<R>())
			.finish_non_exhaustive()
	}
}

impl<A: ValueTuple, R: ValueTuple> Shim<A, R> {
	/// Creates a shim executing through `dispatcher`.
	pub fn new(dispatcher: Dispatcher) -> Self {
		Self {
			dispatcher,
			_marker: PhantomData,
		}
	}

	/// Shape served by this shim.
	pub fn shape() -> Shape {
		Shape::of::<A, R>()
	}

	/// Identity payloads must carry to be accepted by this shim.
	pub fn handler() -> String {
		Self::shape().handler()
	}

	/// Executes `[a0 .. aN-1, .., handler, callable]` and returns the typed results.
	///
	/// The first `N` slots are the arguments and the last two the trailer;
	/// anything in between is ignored. The handler identity is checked before
	/// anything is decoded.
	pub fn execute(&self, slots: Vec<ArgValue>) -> Result<R, InvokeError> {
		let expected = A::LEN + TRAILER_SLOTS;
		if slots.len() < expected {
			return Err(InvokeError::Arity {
				what: "slots",
				expected,
				found: slots.len(),
			});
		}

		let payload = Payload::from_slots(slots)?;
		let handler = Self::handler();
		if payload.handler != handler {
			tracing::debug!(expected = %handler, found = %payload.handler, "invoke.reject");
			return Err(InvokeError::Routing {
				expected: handler,
				found: payload.handler,
			});
		}

		let done = self.dispatcher.run(Self::shape(), payload)?;
		R::decode(done.results).map_err(|err| InvokeError::from_returns(&done.function, err))
	}

	/// Builds the payload for `function` and executes it.
	pub fn call(&self, function: &FunctionRef, args: A) -> Result<R, InvokeError> {
		let payload = Payload::prepare::<A, R>(function, args)?;
		self.execute(payload.into_slots())
	}
}

impl<A: ValueTuple, R: ValueTuple> Default for Shim<A, R> {
	fn default() -> Self {
		Self::new(Dispatcher::builtin())
	}
}
