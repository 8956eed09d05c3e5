//! Arithmetic and validation helpers shared by the parser, the roll evaluator, and the roll log.
//!
//! Values coming out of imported data are loosely typed, so most helpers accept anything implementing [`Numeric`]
//! and coerce it the same lenient way: strings are read with leading-numeric semantics (`"12abc"` is 12), and
//! anything that cannot be read as a number is treated as absent.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::notation::Operator;

/// Values that can be coerced into a number for arithmetic and comparisons.
pub trait Numeric {
	/// Reads the value as a finite number, if it can be read as one at all.
	fn to_number(&self) -> Option<f64>;
}

impl Numeric for f64 {
	#[inline]
	fn to_number(&self) -> Option<f64> {
		self.is_finite().then_some(*self)
	}
}

macro_rules! numeric_int_impl {
	($($ty:ty),*) => {
		$(
			impl Numeric for $ty {
				#[inline]
				fn to_number(&self) -> Option<f64> {
					Some(f64::from(*self))
				}
			}
		)*
	};
}

macro_rules! numeric_wide_int_impl {
	($($ty:ty),*) => {
		$(
			impl Numeric for $ty {
				#[inline]
				#[expect(clippy::cast_precision_loss, reason = "roll values are far below 2^53")]
				fn to_number(&self) -> Option<f64> {
					Some(*self as f64)
				}
			}
		)*
	};
}

numeric_int_impl!(i32, u32);
numeric_wide_int_impl!(i64, u64);

impl Numeric for str {
	/// Strings are numeric when they start with an integer; their value is then read as a float.
	fn to_number(&self) -> Option<f64> {
		parse_int(self)?;
		parse_float(self)
	}
}

impl Numeric for String {
	#[inline]
	fn to_number(&self) -> Option<f64> {
		self.as_str().to_number()
	}
}

impl Numeric for Value {
	/// Numbers and numeric strings are numeric. Arrays, objects, booleans and null never are.
	fn to_number(&self) -> Option<f64> {
		match self {
			Self::Number(num) => num.as_f64().and_then(|num| num.to_number()),
			Self::String(text) => text.to_number(),
			Self::Null | Self::Bool(..) | Self::Array(..) | Self::Object(..) => None,
		}
	}
}

impl<T: Numeric + ?Sized> Numeric for &T {
	#[inline]
	fn to_number(&self) -> Option<f64> {
		(**self).to_number()
	}
}

/// Checks whether a value can be read as a number.
///
/// # Examples
/// ```
/// use dice_log::util::is_numeric;
///
/// assert!(is_numeric("42"));
/// assert!(is_numeric("12abc"));
/// assert!(!is_numeric("abc"));
/// assert!(!is_numeric(&serde_json::json!([1, 2])));
/// ```
#[must_use]
pub fn is_numeric(value: &(impl Numeric + ?Sized)) -> bool {
	value.to_number().is_some()
}

/// Reads the leading integer from a string, ignoring leading whitespace and anything after the digits.
/// Values too large for an `i64` saturate.
#[must_use]
pub fn parse_int(text: &str) -> Option<i64> {
	let text = text.trim_start();
	let (negative, rest) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};

	let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
	if digits == 0 {
		return None;
	}

	let mut val: i64 = 0;
	for digit in rest.bytes().take(digits) {
		val = val.saturating_mul(10).saturating_add(i64::from(digit - b'0'));
	}

	Some(if negative { -val } else { val })
}

/// Reads the leading decimal number (with an optional exponent) from a string, ignoring leading whitespace and
/// anything after it.
#[must_use]
pub fn parse_float(text: &str) -> Option<f64> {
	let text = text.trim_start();
	let bytes = text.as_bytes();
	let mut end = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));

	let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
	end += int_digits;

	let mut frac_digits = 0;
	if bytes.get(end) == Some(&b'.') {
		frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
		if frac_digits > 0 || int_digits > 0 {
			end += 1 + frac_digits;
		}
	}

	if int_digits == 0 && frac_digits == 0 {
		return None;
	}

	// An exponent only counts when at least one digit follows it
	if matches!(bytes.get(end), Some(b'e' | b'E')) {
		let sign = usize::from(matches!(bytes.get(end + 1), Some(b'-' | b'+')));
		let exp_digits = bytes[end + 1 + sign..].iter().take_while(|b| b.is_ascii_digit()).count();
		if exp_digits > 0 {
			end += 1 + sign + exp_digits;
		}
	}

	text[..end].parse::<f64>().ok().filter(|num| num.is_finite())
}

/// Checks whether a string is canonical standard base64: decoding and re-encoding it must reproduce it exactly.
/// Empty strings and decode failures are never base64.
///
/// # Examples
/// ```
/// use dice_log::util::is_base64;
///
/// assert!(is_base64("eyJsb2ciOltdfQ=="));
/// assert!(!is_base64("not base64!"));
/// assert!(!is_base64(""));
/// ```
#[must_use]
pub fn is_base64(value: &str) -> bool {
	!value.is_empty()
		&& STANDARD
			.decode(value)
			.is_ok_and(|bytes| STANDARD.encode(bytes) == value)
}

/// Checks whether a string is JSON text for an object or array. Scalars and invalid JSON are not.
///
/// # Examples
/// ```
/// use dice_log::util::is_json;
///
/// assert!(is_json(r#"{"log": []}"#));
/// assert!(is_json("[1, 2]"));
/// assert!(!is_json("42"));
/// assert!(!is_json("{oops"));
/// ```
#[must_use]
pub fn is_json(value: &str) -> bool {
	serde_json::from_str::<Value>(value).is_ok_and(|parsed| parsed.is_object() || parsed.is_array())
}

/// Resolves the bounds used by [`generate_number`]: a missing or zero `min` becomes 1, and a missing or zero `max`
/// becomes `min`. Returns `None` when there is nothing to randomise (`max <= min`).
fn resolve_bounds(min: Option<i64>, max: Option<i64>) -> (i64, Option<i64>) {
	let min = min.filter(|&min| min != 0).unwrap_or(1);
	let max = max.filter(|&max| max != 0).unwrap_or(min);
	(min, (max > min).then_some(max))
}

/// Generates a random integer between `min` and `max`, inclusive, using the thread-local [fastrand] generator.
///
/// A missing or zero `min` defaults to 1 and a missing or zero `max` defaults to `min`. When `max <= min`, `min` is
/// returned as-is; reversed bounds are not swapped.
///
/// # Examples
/// ```
/// use dice_log::util::generate_number;
///
/// assert_eq!(generate_number(Some(5), Some(5)), 5);
/// assert_eq!(generate_number(Some(5), Some(3)), 5);
///
/// let rolled = generate_number(Some(1), Some(6));
/// assert!((1..=6).contains(&rolled));
/// ```
#[cfg(feature = "fastrand")]
#[must_use]
pub fn generate_number(min: Option<i64>, max: Option<i64>) -> i64 {
	match resolve_bounds(min, max) {
		(min, Some(max)) => fastrand::i64(min..=max),
		(min, None) => min,
	}
}

/// Same as [`generate_number`], but draws from a specific [`fastrand::Rng`].
#[cfg(feature = "fastrand")]
#[must_use]
pub fn generate_number_using(rng: &mut fastrand::Rng, min: Option<i64>, max: Option<i64>) -> i64 {
	match resolve_bounds(min, max) {
		(min, Some(max)) => rng.i64(min..=max),
		(min, None) => min,
	}
}

/// Adds together all numeric values in a slice. Values that aren't numeric count as 0.
#[must_use]
pub fn sum<T: Numeric>(numbers: &[T]) -> f64 {
	numbers.iter().filter_map(|num| num.to_number()).sum()
}

/// Adds together all numeric elements of a JSON value. Anything that isn't an array sums to 0.
///
/// # Examples
/// ```
/// use dice_log::util::sum_array;
/// use serde_json::json;
///
/// assert_eq!(sum_array(&json!([1, "2", "x", 3.5])), 6.5);
/// assert_eq!(sum_array(&json!({"a": 1})), 0.0);
/// ```
#[must_use]
pub fn sum_array(numbers: &Value) -> f64 {
	numbers.as_array().map_or(0.0, |numbers| sum(numbers.as_slice()))
}

/// Applies an arithmetic operator to two values. Non-numeric operands are treated as 0, and dividing by zero results
/// in 0 rather than an infinite value.
///
/// # Examples
/// ```
/// use dice_log::{notation::Operator, util::equate_numbers};
///
/// assert_eq!(equate_numbers(10, 4, Operator::Sub), 6.0);
/// assert_eq!(equate_numbers(10, 0, Operator::Div), 0.0);
/// assert_eq!(equate_numbers("abc", 3, Operator::Add), 3.0);
/// ```
#[must_use]
pub fn equate_numbers(a: impl Numeric, b: impl Numeric, operator: Operator) -> f64 {
	let a = a.to_number().unwrap_or(0.0);
	let b = b.to_number().unwrap_or(0.0);

	match operator {
		Operator::Mul => a * b,
		Operator::Div if b == 0.0 => 0.0,
		Operator::Div => a / b,
		Operator::Sub => a - b,
		Operator::Add => a + b,
	}
}

/// Checks `a` against `b` using a comparison operator symbol (`=`, `==`, `<`, `>`, `<=`, `>=`, `!`, `!=`).
/// Unknown operators never match. Values that aren't numeric never compare equal to anything.
///
/// # Examples
/// ```
/// use dice_log::util::compare_numbers;
///
/// assert!(compare_numbers(6, 5, ">="));
/// assert!(compare_numbers(3, 4, "!="));
/// assert!(!compare_numbers(3, 3, "==="));
/// ```
#[must_use]
#[expect(clippy::float_cmp, reason = "values being compared are whole roll values and thresholds")]
pub fn compare_numbers(a: impl Numeric, b: impl Numeric, operator: &str) -> bool {
	let a = a.to_number().unwrap_or(f64::NAN);
	let b = b.to_number().unwrap_or(f64::NAN);

	match operator {
		"=" | "==" => a == b,
		"<" => a < b,
		">" => a > b,
		"<=" => a <= b,
		">=" => a >= b,
		"!" | "!=" => a != b,
		_ => false,
	}
}
