//! Registered function entries.
//!
//! A [`Function`] wraps a typed Rust function behind an erased handler that
//! takes and returns tagged values. Argument decoding happens inside the
//! handler, so every slot is checked against the function's declared types.

use std::fmt;
use std::sync::Arc;

use remcall_invocation::{ArgKind, ArgValue, BoxError, Captured, ConvertError, InvokeError, Shape, ValueTuple};

/// Erased calling convention shared by every registered function.
pub type ErasedHandler = dyn Fn(&Captured, Vec<ArgValue>) -> Result<Vec<ArgValue>, InvokeError> + Send + Sync;

/// Declared argument and result kinds of a function.
///
/// With a `rest` kind the function is variadic: it takes at least
/// `args.len()` arguments, and every argument past them has kind `rest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
	pub args: Vec<ArgKind>,
	pub rest: Option<ArgKind>,
	pub returns: Vec<ArgKind>,
}

impl Signature {
	/// Fixed-arity signature.
	pub fn new(args: Vec<ArgKind>, returns: Vec<ArgKind>) -> Self {
		Self { args, rest: None, returns }
	}

	/// Signature of a function taking `A` and producing `R`.
	pub fn of<A: ValueTuple, R: ValueTuple>() -> Self {
		Self::new(A::kinds(), R::kinds())
	}

	/// Accepts any number of trailing arguments of kind `kind`.
	pub fn with_rest(mut self, kind: ArgKind) -> Self {
		self.rest = Some(kind);
		self
	}

	/// Smallest accepted arity and the result count.
	pub fn shape(&self) -> Shape {
		Shape::new(saturating_u8(self.args.len()), saturating_u8(self.returns.len()))
	}

	/// Returns `true` if a handler of `shape` can invoke this function.
	pub fn accepts(&self, shape: Shape) -> bool {
		self.accepts_count(usize::from(shape.args)) && usize::from(shape.returns) == self.returns.len()
	}

	fn accepts_count(&self, found: usize) -> bool {
		match self.rest {
			Some(_) => found >= self.args.len(),
			None => found == self.args.len(),
		}
	}

	/// Checks the count and kinds of an argument list.
	pub fn check_args(&self, args: &[ArgValue]) -> Result<(), InvokeError> {
		if !self.accepts_count(args.len()) {
			return Err(InvokeError::Arity {
				what: "arguments",
				expected: self.args.len(),
				found: args.len(),
			});
		}
		let kinds = self.args.iter().copied().chain(self.rest.into_iter().cycle());
		check_kinds(kinds, args).map_err(|(slot, expected, found)| InvokeError::Argument {
			slot,
			source: ConvertError::Kind { expected, found },
		})
	}

	fn check_returns(&self, function: &str, returns: &[ArgValue]) -> Result<(), InvokeError> {
		if returns.len() != self.returns.len() {
			return Err(InvokeError::Arity {
				what: "results",
				expected: self.returns.len(),
				found: returns.len(),
			});
		}
		check_kinds(self.returns.iter().copied(), returns).map_err(|(slot, expected, found)| InvokeError::Return {
			function: function.to_string(),
			slot,
			source: ConvertError::Kind { expected, found },
		})
	}
}

fn saturating_u8(n: usize) -> u8 {
	u8::try_from(n).unwrap_or(u8::MAX)
}

/// Returns the first `(slot, expected, found)` mismatch. Count mismatches
/// are reported through [`InvokeError::Arity`] directly.
fn check_kinds(kinds: impl Iterator<Item = ArgKind>, values: &[ArgValue]) -> Result<(), (usize, ArgKind, ArgKind)> {
	for (slot, (kind, value)) in kinds.zip(values).enumerate() {
		if !value.matches_kind(kind) {
			return Err((slot, kind, value.kind()));
		}
	}
	Ok(())
}

/// One entry of the function registry.
#[derive(Clone)]
pub struct Function {
	name: String,
	crate_name: &'static str,
	signature: Signature,
	handler: Arc<ErasedHandler>,
}

impl Function {
	/// Wraps a typed function that reads captured state.
	pub fn new<A, R, E, F>(name: impl Into<String>, f: F) -> Self
	where
		A: ValueTuple + 'static,
		R: ValueTuple + 'static,
		E: Into<BoxError>,
		F: Fn(&Captured, A) -> Result<R, E> + Send + Sync + 'static,
	{
		let name = name.into();
		let label = name.clone();
		let handler = move |captured: &Captured, args: Vec<ArgValue>| -> Result<Vec<ArgValue>, InvokeError> {
			let args = A::decode(args).map_err(InvokeError::from_args)?;
			let results = f(captured, args).map_err(|err| InvokeError::Invocation {
				function: label.clone(),
				source: err.into(),
			})?;
			Ok(results.encode())
		};
		Self {
			name,
			crate_name: env!("CARGO_PKG_NAME"),
			signature: Signature::of::<A, R>(),
			handler: Arc::new(handler),
		}
	}

	/// Wraps a typed function without captured state.
	pub fn pure<A, R, E, F>(name: impl Into<String>, f: F) -> Self
	where
		A: ValueTuple + 'static,
		R: ValueTuple + 'static,
		E: Into<BoxError>,
		F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
	{
		Self::new(name, move |_: &Captured, args: A| f(args))
	}

	/// Wraps an untyped handler with an explicit signature.
	///
	/// Arguments and results are checked against `signature` around every
	/// call.
	pub fn raw<F>(name: impl Into<String>, signature: Signature, f: F) -> Self
	where
		F: Fn(&Captured, Vec<ArgValue>) -> Result<Vec<ArgValue>, BoxError> + Send + Sync + 'static,
	{
		let name = name.into();
		let label = name.clone();
		let checked = signature.clone();
		let handler = move |captured: &Captured, args: Vec<ArgValue>| -> Result<Vec<ArgValue>, InvokeError> {
			checked.check_args(&args)?;
			let results = f(captured, args).map_err(|source| InvokeError::Invocation {
				function: label.clone(),
				source,
			})?;
			checked.check_returns(&label, &results)?;
			Ok(results)
		};
		Self {
			name,
			crate_name: env!("CARGO_PKG_NAME"),
			signature,
			handler: Arc::new(handler),
		}
	}

	/// Records the crate that defined this function.
	pub fn with_crate(mut self, crate_name: &'static str) -> Self {
		self.crate_name = crate_name;
		self
	}

	/// Registered name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Crate that defined this function.
	pub fn crate_name(&self) -> &'static str {
		self.crate_name
	}

	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	/// Arity and result count.
	pub fn shape(&self) -> Shape {
		self.signature.shape()
	}

	/// Invokes the function with tagged arguments.
	pub fn call(&self, captured: &Captured, args: Vec<ArgValue>) -> Result<Vec<ArgValue>, InvokeError> {
		(self.handler)(captured, args)
	}
}

impl fmt::Debug for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Function")
			.field("name", &self.name)
			.field("crate_name", &self.crate_name)
			.field("signature", &self.signature)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use remcall_invocation::{FromArg, IntoArg};

	use super::*;

	#[derive(Debug, thiserror::Error)]
	#[error("divide by zero")]
	struct DivideByZero;

	fn divide() -> Function {
		Function::pure("math.divide", |(a, b): (i64, i64)| {
			if b == 0 {
				return Err(DivideByZero);
			}
			Ok((a / b, a % b))
		})
	}

	#[test]
	fn typed_function_declares_its_signature() {
		let f = divide();
		assert_eq!(f.shape(), Shape::new(2, 2));
		assert_eq!(
			f.signature(),
			&Signature::new(vec![ArgKind::Int, ArgKind::Int], vec![ArgKind::Int, ArgKind::Int])
		);
		assert_eq!(
			f.call(&Captured::default(), vec![ArgValue::Int(7), ArgValue::Int(2)]).expect("call"),
			vec![ArgValue::Int(3), ArgValue::Int(1)]
		);
	}

	#[test]
	fn function_error_is_preserved_as_source() {
		let err = divide()
			.call(&Captured::default(), vec![ArgValue::Int(7), ArgValue::Int(0)])
			.expect_err("division by zero");
		let InvokeError::Invocation { function, source } = err else {
			panic!("expected an invocation error");
		};
		assert_eq!(function, "math.divide");
		assert!(source.downcast_ref::<DivideByZero>().is_some());
	}

	#[test]
	fn wrong_argument_kind_names_the_slot() {
		let err = divide()
			.call(&Captured::default(), vec![ArgValue::Int(7), ArgValue::Str("2".into())])
			.expect_err("string divisor");
		assert!(matches!(
			err,
			InvokeError::Argument {
				slot: 1,
				source: ConvertError::Kind {
					expected: ArgKind::Int,
					found: ArgKind::Str
				}
			}
		));
	}

	#[test]
	fn captured_state_reaches_the_function() {
		let scale = Function::new("math.scale", |captured: &Captured, (x,): (i64,)| -> Result<(i64,), BoxError> {
			Ok((x * captured.get::<i64>(0)?,))
		});
		let captured = Captured::new(vec![4i64.into_arg()]);
		assert_eq!(scale.call(&captured, vec![ArgValue::Int(5)]).expect("call"), vec![ArgValue::Int(20)]);

		let err = scale.call(&Captured::default(), vec![ArgValue::Int(5)]).expect_err("nothing captured");
		assert!(err.is_invocation());
	}

	#[test]
	fn raw_function_results_are_checked() {
		let signature = Signature::new(vec![ArgKind::Str], vec![ArgKind::Int, ArgKind::Int]);
		let short = Function::raw("text.len", signature.clone(), |_, args| Ok(vec![ArgValue::Int(args.len() as i64)]));
		assert!(matches!(
			short.call(&Captured::default(), vec![ArgValue::Str("abc".into())]),
			Err(InvokeError::Arity { what: "results", expected: 2, found: 1 })
		));

		let mistyped = Function::raw("text.len", signature, |_, _| Ok(vec![ArgValue::Int(1), ArgValue::Bool(true)]));
		assert!(matches!(
			mistyped.call(&Captured::default(), vec![ArgValue::Str("abc".into())]),
			Err(InvokeError::Return { slot: 1, .. })
		));
		assert!(matches!(
			mistyped.call(&Captured::default(), vec![ArgValue::Unit]),
			Err(InvokeError::Argument { slot: 0, .. })
		));
	}

	fn join() -> Function {
		let signature = Signature::new(vec![ArgKind::Str], vec![ArgKind::Str]).with_rest(ArgKind::Str);
		Function::raw("text.join", signature, |_, args| {
			let mut parts = args.into_iter().map(String::from_arg).collect::<Result<Vec<_>, _>>()?;
			let separator = parts.remove(0);
			Ok(vec![ArgValue::Str(parts.join(&separator))])
		})
	}

	#[test]
	fn variadic_tail_takes_any_number_of_trailing_arguments() {
		let join = join();
		let strs = |items: &[&str]| items.iter().map(|s| ArgValue::Str(s.to_string())).collect::<Vec<_>>();

		assert_eq!(join.call(&Captured::default(), strs(&["-"])).expect("separator only"), strs(&[""]));
		assert_eq!(join.call(&Captured::default(), strs(&["-", "a", "b", "c"])).expect("three parts"), strs(&["a-b-c"]));

		assert!(matches!(
			join.call(&Captured::default(), Vec::new()),
			Err(InvokeError::Arity { what: "arguments", expected: 1, found: 0 })
		));
		let mut mixed = strs(&["-", "a", "b"]);
		mixed.push(ArgValue::Int(4));
		assert!(matches!(
			join.call(&Captured::default(), mixed),
			Err(InvokeError::Argument {
				slot: 3,
				source: ConvertError::Kind {
					expected: ArgKind::Str,
					found: ArgKind::Int
				}
			})
		));
	}

	#[test]
	fn variadic_signature_accepts_wider_shapes() {
		let signature = join().signature().clone();
		assert_eq!(signature.shape(), Shape::new(1, 1));
		assert!(signature.accepts(Shape::new(1, 1)));
		assert!(signature.accepts(Shape::new(6, 1)));
		assert!(!signature.accepts(Shape::new(0, 1)));
		assert!(!signature.accepts(Shape::new(6, 2)));

		let fixed = Signature::new(vec![ArgKind::Int], vec![]);
		assert!(fixed.accepts(Shape::new(1, 0)));
		assert!(!fixed.accepts(Shape::new(2, 0)));
	}
}
