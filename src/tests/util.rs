use proptest::prelude::*;
use serde_json::{json, Value};

use crate::{
	notation::Operator,
	util::{
		compare_numbers, equate_numbers, generate_number, is_base64, is_json, is_numeric, parse_float, parse_int, sum,
		sum_array,
	},
};

#[test]
fn parse_int_reads_leading_digits() {
	assert_eq!(parse_int("12abc"), Some(12));
	assert_eq!(parse_int("  -7"), Some(-7));
	assert_eq!(parse_int("+3d6"), Some(3));
	assert_eq!(parse_int("abc"), None);
	assert_eq!(parse_int("-"), None);
	assert_eq!(parse_int(""), None);
}

#[test]
fn parse_int_saturates() {
	assert_eq!(parse_int("99999999999999999999999"), Some(i64::MAX));
}

#[test]
fn parse_float_reads_leading_number() {
	assert_eq!(parse_float("3.5x"), Some(3.5));
	assert_eq!(parse_float(".5"), Some(0.5));
	assert_eq!(parse_float("7."), Some(7.0));
	assert_eq!(parse_float("-2.25"), Some(-2.25));
	assert_eq!(parse_float("."), None);
	assert_eq!(parse_float("x1"), None);
	assert_eq!(parse_float("1.5e3"), Some(1500.0));
	assert_eq!(parse_float("2E-2x"), Some(0.02));
	assert_eq!(parse_float("4e+1"), Some(40.0));
	assert_eq!(parse_float("3e"), Some(3.0));
	assert_eq!(parse_float("3e+"), Some(3.0));
	assert_eq!(parse_float(".5e1"), Some(5.0));
	assert_eq!(parse_float("1e400"), None);
}

#[test]
fn numeric_values() {
	assert!(is_numeric("42"));
	assert!(is_numeric("  4"));
	assert!(is_numeric("12abc"));
	assert!(is_numeric(&7_i64));
	assert!(is_numeric(&json!(3.5)));
	assert!(is_numeric(&json!("8")));

	assert!(!is_numeric("abc"));
	assert!(!is_numeric(".5"));
	assert!(!is_numeric(&f64::NAN));
	assert!(!is_numeric(&f64::INFINITY));
	assert!(!is_numeric(&Value::Null));
	assert!(!is_numeric(&json!(true)));
	assert!(!is_numeric(&json!([1])));
	assert!(!is_numeric(&json!({"value": 1})));
}

#[test]
fn base64_must_be_canonical() {
	assert!(is_base64("abcd"));
	assert!(is_base64("eyJsb2ciOltdfQ=="));

	assert!(!is_base64(""));
	assert!(!is_base64("abc"));
	assert!(!is_base64("hello world"));
	assert!(!is_base64("{\"log\":[]}"));
}

#[test]
fn json_must_be_object_or_array() {
	assert!(is_json("{}"));
	assert!(is_json("[]"));
	assert!(is_json(r#"{"log": [{"notation": "1d6"}]}"#));

	assert!(!is_json("null"));
	assert!(!is_json("\"text\""));
	assert!(!is_json("12"));
	assert!(!is_json("[1, 2"));
	assert!(!is_json(""));
}

#[test]
fn generate_number_degenerate_bounds() {
	assert_eq!(generate_number(Some(5), Some(5)), 5);
	assert_eq!(generate_number(Some(5), Some(3)), 5);
	assert_eq!(generate_number(None, None), 1);
	assert_eq!(generate_number(Some(0), Some(0)), 1);
	assert_eq!(generate_number(Some(9), None), 9);
}

#[test]
fn generate_number_defaults_min_to_one() {
	for _ in 0..200 {
		let val = generate_number(Some(0), Some(6));
		assert!((1..=6).contains(&val));
	}
}

#[test]
fn sums() {
	assert_eq!(sum(&[1_i64, 2, 3]), 6.0);
	assert_eq!(sum::<i64>(&[]), 0.0);
	assert_eq!(sum(&["1", "x", "2.5"]), 3.5);

	assert_eq!(sum_array(&json!([1, "2", null, [3], 4.5])), 7.5);
	assert_eq!(sum_array(&json!("12")), 0.0);
	assert_eq!(sum_array(&Value::Null), 0.0);
	assert_eq!(sum_array(&json!(["1.5e3"])), 1500.0);
	assert_eq!(sum(&["2e2", "1"]), 201.0);
}

#[test]
fn equate_numbers_operators() {
	assert_eq!(equate_numbers(10, 4, Operator::Add), 14.0);
	assert_eq!(equate_numbers(10, 4, Operator::Sub), 6.0);
	assert_eq!(equate_numbers(10, 4, Operator::Mul), 40.0);
	assert_eq!(equate_numbers(10, 4, Operator::Div), 2.5);
	assert_eq!(equate_numbers(10, 0, Operator::Div), 0.0);
	assert_eq!(equate_numbers("5", "x", Operator::Mul), 0.0);
	assert_eq!(equate_numbers("2e2", 1, Operator::Add), 201.0);
}

#[test]
fn compare_numbers_operators() {
	assert!(compare_numbers(3, 3, "="));
	assert!(compare_numbers(3, 3, "=="));
	assert!(compare_numbers(2, 3, "<"));
	assert!(compare_numbers(4, 3, ">"));
	assert!(compare_numbers(3, 3, "<="));
	assert!(compare_numbers(3, 3, ">="));
	assert!(compare_numbers(2, 3, "!"));
	assert!(compare_numbers(2, 3, "!="));

	assert!(!compare_numbers(3, 3, "!="));
	assert!(!compare_numbers(4, 3, "<="));
	assert!(!compare_numbers(3, 3, "==="));
	assert!(!compare_numbers(3, 3, ""));
	assert!(!compare_numbers("x", "x", "="));
	assert!(compare_numbers("x", 3, "!="));
}

proptest! {
	#[test]
	fn generate_number_stays_in_bounds(min in 1..1000_i64, span in 1..1000_i64) {
		let max = min + span;
		let val = generate_number(Some(min), Some(max));
		prop_assert!((min..=max).contains(&val));
	}

	#[test]
	fn equate_numbers_matches_arithmetic(a in -1000..1000_i64, b in 1..1000_i64) {
		let (af, bf) = (a as f64, b as f64);
		prop_assert_eq!(equate_numbers(a, b, Operator::Add), af + bf);
		prop_assert_eq!(equate_numbers(a, b, Operator::Sub), af - bf);
		prop_assert_eq!(equate_numbers(a, b, Operator::Mul), af * bf);
		prop_assert_eq!(equate_numbers(a, b, Operator::Div), af / bf);
	}

	#[test]
	fn numeric_strings_round_trip(val in any::<i32>()) {
		prop_assert_eq!(parse_int(&val.to_string()), Some(i64::from(val)));
		prop_assert!(is_numeric(val.to_string().as_str()));
	}
}
