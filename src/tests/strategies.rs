use proptest::prelude::*;

use crate::notation::{Addition, AdditionValue, ComparePoint, Die, Fudge, Operator, Sides};

pub(crate) fn operator_strategy() -> impl Strategy<Value = Operator> {
	prop_oneof![
		Just(Operator::Add),
		Just(Operator::Sub),
		Just(Operator::Mul),
		Just(Operator::Div),
	]
}

pub(crate) fn sides_strategy() -> impl Strategy<Value = Sides> {
	prop_oneof![
		4 => (1..=1000_u32).prop_map(Sides::Numeric),
		1 => Just(Sides::Percentile),
		1 => Just(Sides::Fudge(Fudge::Standard)),
		1 => (1..=2_u8).prop_map(|variant| Sides::Fudge(Fudge::Variant(variant))),
	]
}

/// Compare points that can't be mistaken for an exploding marker (`!=` would be).
pub(crate) fn compare_point_strategy() -> impl Strategy<Value = ComparePoint> {
	(
		prop::sample::select(vec!["=", "==", "===", "<", ">", "<=", ">=", "<==", ">=="]),
		0..=1000_i64,
	)
		.prop_map(|(operator, value)| ComparePoint::new(operator, value))
}

pub(crate) fn addition_strategy() -> impl Strategy<Value = Addition> {
	let value = prop_oneof![
		3 => "[1-9]{1,3}0?".prop_map(|digits| AdditionValue::Number(digits.parse().unwrap_or(1.0))),
		1 => Just(AdditionValue::Highest),
		1 => Just(AdditionValue::Lowest),
	];

	(operator_strategy(), value).prop_map(|(operator, value)| Addition { operator, value })
}

pub(crate) fn die_strategy() -> impl Strategy<Value = Die> {
	(
		operator_strategy(),
		1..=999_u32,
		sides_strategy(),
		0..5_u8,
		compare_point_strategy(),
		any::<bool>(),
		prop::collection::vec(addition_strategy(), 0..4),
	)
		.prop_map(
			|(operator, quantity, sides, explode_type, compare_point, with_compare_point, additions)| {
				let (explode, compound, penetrate) = match explode_type {
					0 => (false, false, false),
					1 => (true, false, false),
					2 => (true, true, false),
					3 => (true, false, true),
					_ => (true, true, true),
				};

				Die {
					operator,
					quantity,
					sides,
					explode,
					penetrate,
					compound,
					// Exploding dice always end up with a compare point when parsed
					compare_point: (explode || with_compare_point).then_some(compare_point),
					additions,
				}
			},
		)
}

pub(crate) fn notation_strategy() -> impl Strategy<Value = Vec<Die>> {
	prop::collection::vec(die_strategy(), 1..5)
}
