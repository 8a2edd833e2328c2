/// Registers a remote function with the process-wide registry.
///
/// `$func` takes `(&Captured, args_tuple)`; use the `pure` form for functions
/// that only take the argument tuple. Both return `Result<results_tuple, E>`.
///
/// ```ignore
/// fn add_mul(_: &Captured, (a, b, c, d, _, _): (i64, i64, i64, i64, i64, i64)) -> Result<(i64, i64), Infallible> {
///     Ok((a + b, c * d))
/// }
///
/// remcall_registry::remote_fn!("math.add_mul" => add_mul);
/// ```
#[macro_export]
macro_rules! remote_fn {
	(@submit $name:literal, $build:expr) => {
		const _: () = {
			static FUNCTION: $crate::FunctionStatic = $crate::FunctionStatic {
				name: $name,
				crate_name: env!("CARGO_PKG_NAME"),
				build: $build,
			};
			$crate::inventory::submit! { $crate::FunctionReg(&FUNCTION) }
		};
	};
	(pure $name:literal => $func:path) => {
		$crate::remote_fn!(@submit $name, || $crate::Function::pure($name, $func).with_crate(env!("CARGO_PKG_NAME")));
	};
	($name:literal => $func:path) => {
		$crate::remote_fn!(@submit $name, || $crate::Function::new($name, $func).with_crate(env!("CARGO_PKG_NAME")));
	};
}
