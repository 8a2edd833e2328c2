//! Arity-generic invocation path.
//!
//! The dispatcher serves every shape: it reads the shape from the handler
//! identity in the payload, resolves the function named by the callable and
//! invokes it with tagged values. [`crate::Shim`] layers a typed front end
//! for one fixed shape on top of it.

use remcall_invocation::{ArgValue, Captured, HANDLER_PREFIX, InvocationLimits, InvokeError, Payload, Shape, decode_callable};

use crate::function::Function;
use crate::registry::{FUNCTIONS, FunctionRegistry};


/// Executes invocation payloads against a function registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
	registry: FunctionRegistry,
	limits: InvocationLimits,
}

/// Output of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Completed {
	pub function: String,
	pub results: Vec<ArgValue>,
}

impl Default for Dispatcher {
	fn default() -> Self {
		Self::builtin()
	}
}

impl Dispatcher {
	/// Creates a dispatcher over `registry` with default limits.
	pub fn new(registry: FunctionRegistry) -> Self {
		Self {
			registry,
			limits: InvocationLimits::default(),
		}
	}

	/// Creates a dispatcher over the functions submitted through `remote_fn!`.
	pub fn builtin() -> Self {
		Self::new(FUNCTIONS.clone())
	}

	/// Replaces the validation limits.
	pub fn with_limits(mut self, limits: InvocationLimits) -> Self {
		self.limits = limits;
		self
	}

	pub fn registry(&self) -> &FunctionRegistry {
		&self.registry
	}

	pub fn limits(&self) -> &InvocationLimits {
		&self.limits
	}

	/// Executes a flat slot sequence `[args.., handler, callable]`.
	pub fn execute(&self, slots: Vec<ArgValue>) -> Result<Vec<ArgValue>, InvokeError> {
		let payload = Payload::from_slots(slots).map_err(InvokeError::from).inspect_err(log_reject)?;
		self.execute_payload(payload)
	}

	/// Executes an invocation envelope.
	pub fn execute_payload(&self, payload: Payload) -> Result<Vec<ArgValue>, InvokeError> {
		let Some(shape) = payload.shape() else {
			let err = InvokeError::Routing {
				expected: format!("{HANDLER_PREFIX}<args>_<returns>"),
				found: payload.handler,
			};
			log_reject(&err);
			return Err(err);
		};
		self.run(shape, payload).map(|done| done.results)
	}

	/// Validates `args` against the signature of the function registered as `name`.
	///
	/// Lets a caller reject a bad call before building a payload.
	pub fn check_arguments(&self, name: &str, args: &[ArgValue]) -> Result<(), InvokeError> {
		let function = self.registry.get(name).ok_or_else(|| InvokeError::UnknownFunction(name.to_string()))?;
		function.signature().check_args(args)
	}

	/// Runs a payload already routed to `shape`.
	///
	/// Values between the leading arguments and the trailer are ignored.
	pub(crate) fn run(&self, shape: Shape, mut payload: Payload) -> Result<Completed, InvokeError> {
		let (function, captured) = self.resolve(shape, &mut payload).inspect_err(log_reject)?;
		let name = function.name();

		tracing::trace!(handler = %payload.handler, function = name, args = payload.args.len(), "invoke.execute");
		let results = function.call(&captured, payload.args)?;
		tracing::trace!(function = name, results = results.len(), "invoke.complete");
		Ok(Completed {
			function: name.to_string(),
			results,
		})
	}

	/// Validates the envelope and resolves the function it names.
	fn resolve(&self, shape: Shape, payload: &mut Payload) -> Result<(&Function, Captured), InvokeError> {
		self.limits.check_payload(payload)?;
		let expected = usize::from(shape.args);
		if payload.args.len() < expected {
			return Err(InvokeError::Arity {
				what: "arguments",
				expected,
				found: payload.args.len(),
			});
		}
		if payload.args.len() > expected {
			tracing::trace!(handler = %payload.handler, ignored = payload.args.len() - expected, "invoke.extra_slots");
			payload.args.truncate(expected);
		}

		let callable = decode_callable(&payload.callable)?;
		self.limits.check_function(&callable)?;
		let (name, declared, captured) = callable.into_parts();
		if declared != shape {
			return Err(InvokeError::ShapeMismatch {
				function: name,
				expected: shape,
				found: declared,
			});
		}

		let function = self.registry.get(&name).ok_or_else(|| InvokeError::UnknownFunction(name.clone()))?;
		if !function.signature().accepts(shape) {
			return Err(InvokeError::ShapeMismatch {
				function: name,
				expected: shape,
				found: function.shape(),
			});
		}
		Ok((function, captured))
	}
}

fn log_reject(err: &InvokeError) {
	tracing::debug!(error = %err, "invoke.reject");
}
