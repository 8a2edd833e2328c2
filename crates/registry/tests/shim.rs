//! Integration tests for the typed invocation shim.
//!
//! Functions are submitted through `remote_fn!` and resolved through the
//! process-wide registry, the way a host process wires them up.

use std::convert::Infallible;

use proptest::prelude::*;

use remcall_invocation::{ArgKind, BoxError, ConvertError, DecodeError, HANDLER_PREFIX};
use remcall_registry::{
	ArgValue, Captured, Dispatcher, FUNCTIONS, Function, FunctionRef, FunctionRegistry, InvokeError, Payload, RegistryError, Shim6x2,
};

type Args = (i64, i64, i64, i64, i64, i64);
type Rets = (i64, i64);
type AddMul = Shim6x2<i64, i64, i64, i64, i64, i64, i64, i64>;

#[derive(Debug, thiserror::Error)]
#[error("overflow in {0}")]
struct Overflow(&'static str);

fn add_mul(_: &Captured, (a, b, c, d, _, _): Args) -> Result<Rets, Infallible> {
	Ok((a + b, c * d))
}

fn checked_add_mul((a, b, c, d, _, _): Args) -> Result<Rets, Overflow> {
	let sum = a.checked_add(b).ok_or(Overflow("sum"))?;
	let product = c.checked_mul(d).ok_or(Overflow("product"))?;
	Ok((sum, product))
}

fn offset_sum(captured: &Captured, (a, b, c, d, e, f): Args) -> Result<Rets, BoxError> {
	let base = captured.get::<i64>(0)?;
	let scale = captured.get::<i64>(1)?;
	Ok((base + a + b + c, scale * (d + e + f)))
}

remcall_registry::remote_fn!("test.add_mul" => add_mul);
remcall_registry::remote_fn!(pure "test.checked_add_mul" => checked_add_mul);
fn labels((a, b, ..): Args) -> Result<(String, String), Infallible> {
	Ok((a.to_string(), b.to_string()))
}

remcall_registry::remote_fn!("test.offset_sum" => offset_sum);
remcall_registry::remote_fn!(pure "test.labels" => labels);

fn init() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn slots(function: &FunctionRef, args: Args) -> Vec<ArgValue> {
	Payload::prepare::<Args, Rets>(function, args).expect("prepare").into_slots()
}

#[test]
fn add_mul_returns_sum_and_product() {
	init();
	let shim = AddMul::new(Dispatcher::builtin());
	let function = FunctionRef::of::<Args, Rets>("test.add_mul");

	assert_eq!(shim.execute(slots(&function, (1, 2, 3, 4, 0, 0))).expect("execute"), (3, 12));
	assert_eq!(shim.call(&function, (-5, 5, 7, 0, 9, 9)).expect("call"), (0, 0));
}

#[test]
fn submitted_functions_are_registered() {
	init();
	for name in ["test.add_mul", "test.checked_add_mul", "test.offset_sum"] {
		let function = FUNCTIONS.get(name).expect("submitted");
		assert_eq!(function.crate_name(), "remcall-registry");
		assert_eq!(function.shape(), AddMul::shape());
	}
	assert_eq!(AddMul::handler(), format!("{HANDLER_PREFIX}6_2"));
}

#[test]
fn builder_collects_builtins_and_rejects_shadowing() {
	init();
	let mut builder = FunctionRegistry::builder();
	builder.register_builtins().expect("builtins are unique");
	assert!(builder.len() >= 3);

	let err = builder
		.register(Function::pure("test.add_mul", |(): ()| Ok::<_, Infallible>(())).with_crate("downstream"))
		.expect_err("name already taken");
	assert_eq!(
		err,
		RegistryError::Duplicate {
			name: "test.add_mul".into(),
			existing: "remcall-registry",
			new: "downstream",
		}
	);

	let shim = AddMul::new(Dispatcher::new(builder.build()));
	let function = FunctionRef::of::<Args, Rets>("test.add_mul");
	assert_eq!(shim.call(&function, (1, 2, 3, 4, 0, 0)).expect("call"), (3, 12));
}

#[test]
fn foreign_handler_is_rejected_before_decoding() {
	init();
	let shim = AddMul::default();
	let mut slots = slots(&FunctionRef::of::<Args, Rets>("test.add_mul"), (1, 2, 3, 4, 0, 0));
	slots[6] = ArgValue::Str(format!("{HANDLER_PREFIX}6_1"));
	slots[7] = ArgValue::Bytes(vec![0xff; 3]);

	let err = shim.execute(slots).expect_err("routed elsewhere");
	assert!(matches!(err, InvokeError::Routing { expected, .. } if expected == AddMul::handler()));
}

#[test]
fn slots_past_the_arguments_are_skipped() {
	init();
	let shim = AddMul::default();
	let mut slots = slots(&FunctionRef::of::<Args, Rets>("test.add_mul"), (1, 2, 3, 4, 0, 0));
	slots.insert(6, ArgValue::Int(99));
	slots.insert(6, ArgValue::Bool(false));

	assert_eq!(shim.execute(slots).expect("ten slots"), (3, 12));
}

#[test]
fn too_few_slots_is_an_arity_error() {
	init();
	let shim = AddMul::default();
	let mut slots = slots(&FunctionRef::of::<Args, Rets>("test.add_mul"), (1, 2, 3, 4, 0, 0));
	slots.remove(0);

	let err = shim.execute(slots).expect_err("seven slots");
	assert!(matches!(err, InvokeError::Arity { what: "slots", expected: 8, found: 7 }));
}

#[test]
fn corrupted_callable_is_a_decode_error() {
	init();
	let shim = AddMul::default();
	let good = slots(&FunctionRef::of::<Args, Rets>("test.add_mul"), (1, 2, 3, 4, 0, 0));
	let ArgValue::Bytes(bytes) = &good[7] else {
		panic!("last slot must be bytes");
	};

	let mut truncated = good.clone();
	truncated[7] = ArgValue::Bytes(bytes[..bytes.len() / 2].to_vec());
	assert!(matches!(shim.execute(truncated), Err(InvokeError::Decode(_))));

	let mut garbage = good.clone();
	garbage[7] = ArgValue::Bytes(vec![1, 0xde, 0xad, 0xbe, 0xef]);
	assert!(matches!(shim.execute(garbage), Err(InvokeError::Decode(_))));

	let mut bumped = bytes.clone();
	let mut versioned = good;
	bumped[0] = 0x7f;
	versioned[7] = ArgValue::Bytes(bumped);
	assert!(matches!(
		shim.execute(versioned),
		Err(InvokeError::Decode(DecodeError::UnsupportedVersion(0x7f)))
	));
}

#[test]
fn function_errors_keep_their_source() {
	init();
	let shim = AddMul::default();
	let function = FunctionRef::of::<Args, Rets>("test.checked_add_mul");

	assert_eq!(shim.call(&function, (1, 2, 3, 4, 0, 0)).expect("no overflow"), (3, 12));

	let err = shim.call(&function, (i64::MAX, 1, 0, 0, 0, 0)).expect_err("overflow");
	assert!(err.is_invocation());
	let InvokeError::Invocation { function, source } = err else {
		panic!("expected an invocation error");
	};
	assert_eq!(function, "test.checked_add_mul");
	let overflow = source.downcast_ref::<Overflow>().expect("source is preserved");
	assert_eq!(overflow.0, "sum");
}

#[test]
fn captured_values_travel_with_the_callable() {
	init();
	let shim = AddMul::default();
	let function = FunctionRef::of::<Args, Rets>("test.offset_sum").capture(100i64).capture(2i64);
	assert_eq!(shim.call(&function, (1, 2, 3, 4, 5, 6)).expect("call"), (106, 30));

	let bare = FunctionRef::of::<Args, Rets>("test.offset_sum");
	assert!(shim.call(&bare, (1, 2, 3, 4, 5, 6)).expect_err("nothing captured").is_invocation());
}

#[test]
fn wrong_argument_kind_names_the_slot() {
	init();
	let shim = AddMul::default();
	let mut slots = slots(&FunctionRef::of::<Args, Rets>("test.add_mul"), (1, 2, 3, 4, 0, 0));
	slots[4] = ArgValue::Float(0.5);

	let err = shim.execute(slots).expect_err("float argument");
	assert!(matches!(
		err,
		InvokeError::Argument {
			slot: 4,
			source: ConvertError::Kind {
				expected: ArgKind::Int,
				found: ArgKind::Float
			}
		}
	));
}

#[test]
fn result_kinds_are_checked_against_the_shim() {
	init();
	let shim = AddMul::default();
	let err = shim
		.call(&FunctionRef::of::<Args, Rets>("test.labels"), (1, 2, 0, 0, 0, 0))
		.expect_err("strings where ints are expected");
	assert!(matches!(
		err,
		InvokeError::Return {
			ref function,
			slot: 0,
			source: ConvertError::Kind {
				expected: ArgKind::Int,
				found: ArgKind::Str
			}
		} if function == "test.labels"
	));

	let strings = Shim6x2::<i64, i64, i64, i64, i64, i64, String, String>::default();
	let function = FunctionRef::of::<Args, (String, String)>("test.labels");
	assert_eq!(strings.call(&function, (1, 2, 0, 0, 0, 0)).expect("call"), ("1".into(), "2".into()));
}

#[test]
fn unknown_function_is_reported_by_name() {
	init();
	let shim = AddMul::default();
	let err = shim
		.call(&FunctionRef::of::<Args, Rets>("test.missing"), (0, 0, 0, 0, 0, 0))
		.expect_err("not registered");
	assert!(matches!(err, InvokeError::UnknownFunction(name) if name == "test.missing"));
}

proptest! {
	#[test]
	fn shim_agrees_with_direct_call(args in any::<Args>()) {
		init();
		let shim = AddMul::default();
		let function = FunctionRef::of::<Args, Rets>("test.checked_add_mul");
		match (shim.call(&function, args), checked_add_mul(args)) {
			(Ok(remote), Ok(local)) => prop_assert_eq!(remote, local),
			(Err(InvokeError::Invocation { source, .. }), Err(local)) => {
				let remote = source.downcast_ref::<Overflow>().expect("overflow source");
				prop_assert_eq!(remote.0, local.0);
			}
			(remote, local) => prop_assert!(false, "remote {remote:?} vs local {local:?}"),
		}
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_are_independent() {
	init();
	let shim = AddMul::default();
	let function = FunctionRef::of::<Args, Rets>("test.add_mul");

	let tasks: Vec<_> = (0..32i64)
		.map(|i| {
			let shim = shim.clone();
			let function = function.clone();
			tokio::task::spawn_blocking(move || shim.call(&function, (i, 1, i, 2, 0, 0)).map(|r| (i, r)))
		})
		.collect();

	for task in tasks {
		let (i, result) = task.await.expect("join").expect("call");
		assert_eq!(result, (i + 1, i * 2));
	}
}
