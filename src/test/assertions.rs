/// Asserts that two floating-point values are approximately equal.
///
/// This is useful for comparing computed values where exact equality is not expected due to
/// rounding errors.
/// - Without a tolerance, uses [`crate::test::default_tolerance`]: a few machine epsilons,
///   relative to the magnitude of the values.
/// - With `tol = <value>`, uses that absolute tolerance.
///
/// # Syntax
/// `assert_close!(<a>, <b> [, tol = <tolerance>] [, <message>, <args>...])`
///
/// # Panics
/// Panics if the values differ by more than the tolerance, or either of them is NaN.
///
/// # Examples
/// ```
/// # use basisfit::assert_close;
/// assert_close!(0.1 + 0.2, 0.3);
/// assert_close!(13.2199, 13.22, tol = 1e-3);
/// assert_close!(1.0, 1.0, "Value {} must match", 1);
/// ```
#[macro_export]
macro_rules! assert_close {
    ($a:expr, $b:expr, tol = $tol:expr $(, $msg:literal $(, $($args:tt),*)?)?) => { #[allow(clippy::float_cmp)] {
        let (a, b) = ($a, $b);
        let tol = $tol;

        #[allow(unused_mut, unused_assignments)] let mut msg = "Values not close".to_string();
        $( msg = format!($msg, $($($args)?)?); )?

        assert!(
            a == b || $crate::value::Value::abs_sub(a, b) <= tol,
            "{msg}: {a} != {b} (tolerance {tol})"
        );
    }};

    ($a:expr, $b:expr $(, $msg:literal $(, $($args:tt),*)?)?) => {{
        let (a, b) = ($a, $b);
        $crate::assert_close!(a, b, tol = $crate::test::default_tolerance(a, b) $(, $msg $(, $($args),*)?)?);
    }};
}

/// Asserts that two slices of floating-point values are approximately equal element-wise.
///
/// - Element-wise [`crate::assert_close`], with the same optional `tol = <value>`.
///
/// # Parameters
/// - `$src`: Source slice (implements `iter()`).
/// - `$dst`: Destination slice (same length as `$src`).
/// - `$msg`: *(optional)* Custom failure message. Defaults to `"{len} elements"`.
///   Supports formatting arguments just like `format!`.
///
/// # Panics
/// - If the lengths differ.
/// - If any pair of elements is not close.
///
/// # Examples
/// ```
/// # use basisfit::assert_all_close;
/// let a = vec![1.0, 2.0, 3.0];
/// let b = vec![1.0 + 1e-16, 2.0, 3.0];
///
/// assert_all_close!(a, b); // OK
/// assert_all_close!(a, [1.001, 2.0, 3.0], tol = 1e-2); // OK
/// assert_all_close!(a, b, "Vectors must match"); // Custom message
/// ```
#[macro_export]
macro_rules! assert_all_close {
    ($src:expr, $dst:expr, tol = $tol:expr $(, $msg:literal $(, $($args:tt),*)?)?) => {{
        let (src, dst) = (&$src, &$dst);

        #[allow(unused_assignments, unused_mut)]
        let mut msg = format!("{} elements", src.len());
        $( msg = format!($msg, $($($args)?)?); )?

        assert_eq!(src.len(), dst.len(), "{msg} - length mismatch");
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            $crate::assert_close!(*s, *d, tol = $tol, "{msg} - src[{i}]");
        }
    }};

    ($src:expr, $dst:expr $(, $msg:literal $(, $($args:tt),*)?)?) => {{
        let (src, dst) = (&$src, &$dst);

        #[allow(unused_assignments, unused_mut)]
        let mut msg = format!("{} elements", src.len());
        $( msg = format!($msg, $($($args)?)?); )?

        assert_eq!(src.len(), dst.len(), "{msg} - length mismatch");
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            $crate::assert_close!(*s, *d, "{msg} - src[{i}]");
        }
    }};
}

/// Asserts that a fit explains its source data with at least a given r².
///
/// Works with anything exposing `r_squared() -> T`, such as [`crate::BasisFit`] or one channel
/// of a [`crate::ChannelFits`].
/// See [`crate::statistics::r_squared`] for more details.
///
/// # Syntax
///
/// `assert_r_squared!(<fit>, <threshold> [, msg = <custom message>])`
///
/// - `fit`: The fit to test.
/// - `threshold`: Minimum acceptable r² value (between 0.0 and 1.0). Defaults to `0.9` if omitted.
/// - `msg`: *(optional)* Custom message to include on failure, supports formatting arguments.
///
/// # Example
/// ```rust
/// # use basisfit::{MonomialFit, config::{DegreeRange, FitConfig}, assert_r_squared};
/// let samples: Vec<[f64; 1]> = (0..20).map(|i| [f64::from(i) / 19.0]).collect();
/// let targets: Vec<f64> = samples.iter().map(|[x]| 3.0 * x * x - x + 0.5).collect();
///
/// let fit = MonomialFit::new(&samples, &targets, 2, DegreeRange::CURVE, FitConfig::default()).unwrap();
/// assert_r_squared!(fit, 0.999);
/// ```
#[macro_export]
macro_rules! assert_r_squared {
    ($fit:expr $(, msg = $msg:literal $(, $($args:tt),*)?)?) => {
        $crate::assert_r_squared!(
            $fit,
            0.9
            $(, msg = $msg $(, $($args),*)?)?
        )
    };

    ($fit:expr, $r2:expr $(, msg = $msg:literal $(, $($args:tt),*)?)?) => {
        #[allow(clippy::toplevel_ref_arg)]
        {
            let ref fit = $fit;
            let threshold = $r2;
            let r2 = fit.r_squared();

            if !(r2 > threshold) {
                #[allow(unused_mut)] let mut msg = format!("R² = {r2} is below {threshold}");
                $( msg = format!("{msg}: {}", format!($msg, $($($args)?)?)); )?
                panic!("{msg}");
            }
        }
    };
}

/// Asserts that every residual of a fit is at most a given absolute value.
///
/// Works with anything exposing `residuals() -> Vec<T>`, such as [`crate::BasisFit`].
///
/// # Syntax
///
/// `assert_max_residual!(<fit>, <max> [, msg = <custom message>])`
///
/// # Panics
/// Panics on the first residual whose magnitude exceeds `max`, or that is not finite.
#[macro_export]
macro_rules! assert_max_residual {
    ($fit:expr, $max:expr $(, msg = $msg:literal $(, $($args:tt),*)?)?) => {
        #[allow(clippy::toplevel_ref_arg)]
        {
            let ref fit = $fit;
            let max = $max;

            for (i, r) in fit.residuals().into_iter().enumerate() {
                let magnitude = $crate::value::Value::abs(r);
                if !(magnitude <= max) {
                    #[allow(unused_mut)] let mut msg = format!("Residual {i} = {r} exceeds {max}");
                    $( msg = format!("{msg}: {}", format!($msg, $($($args)?)?)); )?
                    panic!("{msg}");
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_close() {
        assert_close!(0.1 + 0.2, 0.3);
        assert_close!(1e6 + 1e-10, 1e6);
        assert_close!(1.0_f32, 1.0_f32 + f32::EPSILON);
        assert_close!(2.0, 2.05, tol = 0.1);
        assert_close!(2.0, 2.0, "exact {}", 2);
    }

    #[test]
    #[should_panic(expected = "Values not close")]
    fn test_assert_close_fails() {
        assert_close!(1.0, 1.01);
    }

    #[test]
    #[should_panic(expected = "Values not close")]
    fn test_assert_close_nan() {
        assert_close!(f64::NAN, 1.0, tol = 1.0);
    }

    #[test]
    fn test_assert_all_close() {
        let a = vec![1.0, 2.0, 3.0];
        assert_all_close!(a, [1.0, 2.0, 3.0 + 1e-15]);
        assert_all_close!(a, [1.01, 2.0, 3.0], tol = 0.1, "loose");
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn test_assert_all_close_length() {
        assert_all_close!([1.0, 2.0], [1.0]);
    }
}
