use proptest::prelude::*;

use super::strategies::{die_strategy, notation_strategy};
use crate::notation::{
	format_notation, parse_die, parse_notation, Addition, AdditionValue, ComparePoint, Die, Fudge, Operator, Sides,
};

#[test]
fn empty_notations() {
	assert!(parse_notation("").is_empty());
	assert!(parse_notation(None).is_empty());
	assert!(parse_notation("hello there").is_empty());
	assert!(parse_die("").is_none());
}

#[test]
fn plain_dice() {
	assert_eq!(parse_notation("3d6"), [Die::new(3, Sides::Numeric(6))]);
	assert_eq!(parse_notation("d20"), [Die::new(1, Sides::Numeric(20))]);
	assert_eq!(parse_notation("2d%"), [Die::new(2, Sides::Percentile)]);
}

#[test]
fn fudge_dice() {
	let die = parse_die("1dF").unwrap();
	assert_eq!(die.sides, Sides::Fudge(Fudge::Standard));
	assert!(die.is_fudge());
	assert!(!die.is_percentile());

	assert_eq!(parse_die("4dF.1").unwrap().fudge(), Some(Fudge::Variant(1)));
	assert_eq!(parse_die("4dF.2").unwrap().fudge(), Some(Fudge::Variant(2)));
	assert_eq!(parse_die("3d6").unwrap().fudge(), None);
}

#[test]
fn exploding_with_compare_point() {
	let dice = parse_notation("2d20!>=15+1d6");
	assert_eq!(dice.len(), 2);

	assert_eq!(
		dice[0],
		Die {
			explode: true,
			compare_point: Some(ComparePoint::new(">=", 15)),
			..Die::new(2, Sides::Numeric(20))
		}
	);
	assert_eq!(dice[1], Die::new(1, Sides::Numeric(6)));
}

#[test]
fn explode_markers() {
	let die = parse_die("3d6!").unwrap();
	assert!(die.explode && !die.compound && !die.penetrate);

	let die = parse_die("3d6!!").unwrap();
	assert!(die.explode && die.compound && !die.penetrate);

	let die = parse_die("3d6!p").unwrap();
	assert!(die.explode && !die.compound && die.penetrate);

	let die = parse_die("3d6!!p").unwrap();
	assert!(die.explode && die.compound && die.penetrate);
	assert_eq!(die.explode_marker(), "!!p");
}

#[test]
fn default_compare_points() {
	assert_eq!(parse_die("3d6!").unwrap().compare_point, Some(ComparePoint::new("=", 6)));
	assert_eq!(parse_die("d%!").unwrap().compare_point, Some(ComparePoint::new("=", 100)));
	assert_eq!(parse_die("4dF!").unwrap().compare_point, Some(ComparePoint::new("=", 1)));
	assert_eq!(parse_die("3d6").unwrap().compare_point, None);
}

#[test]
fn compare_point_without_explode() {
	let die = parse_die("5d10>=8").unwrap();
	assert!(!die.explode);
	assert_eq!(die.compare_point, Some(ComparePoint::new(">=", 8)));
}

#[test]
fn additions() {
	let die = parse_die("2d6+2-L*H/10").unwrap();
	assert_eq!(
		die.additions,
		[
			Addition {
				operator: Operator::Add,
				value: AdditionValue::Number(2.0),
			},
			Addition {
				operator: Operator::Sub,
				value: AdditionValue::Lowest,
			},
			Addition {
				operator: Operator::Mul,
				value: AdditionValue::Highest,
			},
			Addition {
				operator: Operator::Div,
				value: AdditionValue::Number(10.0),
			},
		]
	);
}

#[test]
fn next_term_isnt_an_addition() {
	let dice = parse_notation("1d6+2+10d4");
	assert_eq!(dice.len(), 2);
	assert_eq!(dice[0].additions.len(), 1);
	assert_eq!(dice[1].quantity, 10);
	assert_eq!(dice[1].operator, Operator::Add);
}

#[test]
fn term_operators() {
	let operators = parse_notation("-1d4*2d6/3d8+d10")
		.into_iter()
		.map(|die| die.operator)
		.collect::<Vec<_>>();
	assert_eq!(operators, [Operator::Sub, Operator::Mul, Operator::Div, Operator::Add]);
}

#[test]
fn surrounding_text_is_ignored() {
	let dice = parse_notation("roll 2d6 then 1d4, please");
	assert_eq!(dice, [Die::new(2, Sides::Numeric(6)), Die::new(1, Sides::Numeric(4))]);
}

#[test]
fn huge_quantities_saturate() {
	assert_eq!(parse_die("99999999999d6").unwrap().quantity, u32::MAX);
}

#[test]
fn parse_die_takes_first_term() {
	assert_eq!(parse_die("4d8+2d6"), Some(Die::new(4, Sides::Numeric(8))));
}

#[test]
fn formatting() {
	assert_eq!(parse_die("3d6").unwrap().to_string(), "+3d6");
	assert_eq!(parse_die("d20!").unwrap().to_string(), "+1d20!=20");
	assert_eq!(format_notation(&parse_notation("4dF.1-2d%>=90+H")), "4dF.1-2d%>=90+H");
	assert_eq!(format_notation(&parse_notation("-1d4")), "-1d4");
	assert_eq!(format_notation(&[]), "");
}

#[test]
fn operator_symbols() {
	for operator in [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div] {
		assert_eq!(operator.symbol().to_string().parse::<Operator>().ok(), Some(operator));
	}
	assert!("%".parse::<Operator>().is_err());
	assert_eq!(Operator::default(), Operator::Add);
}

#[test]
fn sides_markers() {
	assert_eq!(Sides::from_marker("12"), Sides::Numeric(12));
	assert_eq!(Sides::from_marker("%"), Sides::Percentile);
	assert_eq!(Sides::from_marker("F"), Sides::Fudge(Fudge::Standard));
	assert_eq!(Sides::from_marker("F.2"), Sides::Fudge(Fudge::Variant(2)));
	assert_eq!(Sides::from_marker("F.3"), Sides::Other("F.3".to_owned()));

	assert_eq!((Sides::Numeric(8).min_face(), Sides::Numeric(8).max_face()), (1, 8));
	assert_eq!((Sides::Percentile.min_face(), Sides::Percentile.max_face()), (1, 100));
	assert_eq!((Sides::Fudge(Fudge::Standard).min_face(), Sides::Fudge(Fudge::Standard).max_face()), (-1, 1));
}

#[test]
fn compare_point_checks() {
	let cp = ComparePoint::new("<=", 3);
	assert!(cp.check(3));
	assert!(cp.check(-1));
	assert!(!cp.check(4));
	assert_eq!(cp.to_string(), "<=3");
}

proptest! {
	#[test]
	fn die_round_trips(die in die_strategy()) {
		let text = die.to_string();
		prop_assert_eq!(parse_notation(text.as_str()), vec![die], "{}", text);
	}

	#[test]
	fn notation_round_trips(dice in notation_strategy()) {
		let text = format_notation(&dice);
		prop_assert_eq!(parse_notation(text.as_str()), dice, "{}", text);
	}

	#[test]
	fn parsing_never_panics(text in "\\PC{0,40}") {
		let _ = parse_notation(text.as_str());
	}
}
