use std::sync::Arc;

use crate::notation::grammar::{self, Error, Flags, Fragment, Grammar};

#[test]
fn unknown_and_missing_names() {
	let grammar = Grammar::new();
	assert!(matches!(grammar.get("", Flags::NONE, false), Err(Error::MissingName)));
	assert!(matches!(
		grammar.get("nope", Flags::NONE, false),
		Err(Error::UnknownFragment(name)) if name == "nope"
	));
	assert!(grammar.is_empty());
}

#[test]
fn every_fragment_compiles() {
	let grammar = Grammar::new();
	for fragment in Fragment::ALL {
		assert!(grammar.fragment(fragment, Flags::NONE, false).is_ok(), "{fragment} failed");
		assert!(grammar.fragment(fragment, Flags::GLOBAL, true).is_ok(), "{fragment} failed");
		assert_eq!(fragment.name().parse::<Fragment>().ok(), Some(fragment));
	}
	assert_eq!(grammar.len(), Fragment::ALL.len() * 2);
}

#[test]
fn fragments_depend_on_earlier_fragments() {
	for (idx, fragment) in Fragment::ALL.into_iter().enumerate() {
		for dependency in fragment.dependencies() {
			assert!(Fragment::ALL[..idx].contains(dependency));
		}
	}
}

#[test]
fn flags_from_letters() {
	assert_eq!("".parse::<Flags>().ok(), Some(Flags::NONE));
	assert_eq!("g".parse::<Flags>().ok(), Some(Flags::GLOBAL));
	assert_eq!(
		"ig".parse::<Flags>().ok(),
		Some(Flags {
			global: true,
			ignore_case: true
		})
	);
	assert!(matches!("gm".parse::<Flags>(), Err(Error::UnknownFlag('m'))));
	assert_eq!(Flags::GLOBAL.to_string(), "g");
}

#[test]
fn patterns_are_cached() {
	let grammar = Grammar::new();
	let first = grammar.get("dice", Flags::NONE, false).unwrap();
	let second = grammar.get("dice", Flags::NONE, false).unwrap();
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(grammar.len(), 1);

	let whole = grammar.get("dice", Flags::NONE, true).unwrap();
	let global = grammar.get("dice", Flags::GLOBAL, false).unwrap();
	assert!(!Arc::ptr_eq(&first, &whole));
	assert!(!Arc::ptr_eq(&first, &global));
	assert_eq!(grammar.len(), 3);
}

#[test]
fn process_wide_grammar() {
	let first = grammar::get("notation", Flags::GLOBAL, false).unwrap();
	let second = grammar::patterns().fragment(Fragment::Notation, Flags::GLOBAL, false).unwrap();
	assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn whole_match_anchors_every_alternative() {
	let pattern = grammar::get("comparisonOperators", Flags::NONE, true).unwrap();
	assert!(pattern.is_match("<"));
	assert!(pattern.is_match(">="));
	assert!(pattern.is_match("!=="));
	assert!(!pattern.is_match("<x"));
	assert!(!pattern.is_match("x<"));
	assert!(!pattern.is_match("=>"));
}

#[test]
fn dice_fragment() {
	let pattern = grammar::get("dice", Flags::NONE, true).unwrap();
	assert!(pattern.is_match("2d6"));
	assert!(pattern.is_match("d%"));
	assert!(pattern.is_match("4dF.2"));
	assert!(!pattern.is_match("0d6"));
	assert!(!pattern.is_match("2d0"));
	assert!(!pattern.is_match("2D6"));
	assert!(!pattern.is_match("2d6x"));

	let caps = pattern.captures("12d20").unwrap();
	assert_eq!(caps.get(1), Some("12"));
	assert_eq!(caps.get(2), Some("20"));

	let caps = pattern.captures("dF.1").unwrap();
	assert_eq!(caps.get(1), None);
	assert_eq!(caps.get(2), Some("F.1"));
	assert_eq!(caps.get(3), Some("1"));
}

#[test]
fn ignore_case_flag() {
	let pattern = grammar::get("dice", "i".parse().unwrap(), true).unwrap();
	assert!(pattern.is_match("2D6"));
	assert!(pattern.is_match("df"));
}

#[test]
fn addition_skips_dice_quantities() {
	let pattern = grammar::get("addition", Flags::GLOBAL, false).unwrap();
	let found = pattern.captures_iter("+2+1d6-L*10").map(|caps| caps.as_str()).collect::<Vec<_>>();
	assert_eq!(found, ["+2", "-L", "*10"]);

	assert!(!pattern.is_match("+12d6"));
	assert!(pattern.is_match("+12+d6"));
}

#[test]
fn non_global_patterns_yield_once() {
	let pattern = grammar::get("addition", Flags::NONE, false).unwrap();
	assert_eq!(pattern.captures_iter("+1+2+3").count(), 1);
}

#[test]
fn notation_captures_trailing_additions() {
	let pattern = grammar::get("notation", Flags::GLOBAL, false).unwrap();
	let matches = pattern.captures_iter("2d20!>=15-L+2+1d6*2").collect::<Vec<_>>();
	assert_eq!(matches.len(), 2);

	let first = &matches[0];
	assert_eq!(first.as_str(), "2d20!>=15-L+2");
	assert_eq!(first.len(), 9);
	assert_eq!(first.get(1), None);
	assert_eq!(first.get(2), Some("2"));
	assert_eq!(first.get(3), Some("20"));
	assert_eq!(first.get(5), Some("!"));
	assert_eq!(first.get(6), Some(">="));
	assert_eq!(first.get(7), Some("15"));
	assert_eq!(first.get(8), Some("-L+2"));

	let second = &matches[1];
	assert_eq!(second.as_str(), "+1d6*2");
	assert_eq!(second.get(1), Some("+"));
	assert_eq!(second.get(8), Some("*2"));
	assert_eq!(second.range(), 13..19);
}

#[test]
fn whole_notation_includes_additions() {
	let pattern = grammar::get("notation", Flags::NONE, true).unwrap();
	assert!(pattern.is_match("3d6+2"));
	assert!(pattern.is_match("-4d20-L"));
	assert!(!pattern.is_match("3d6+2x"));
	assert!(!pattern.is_match("3d6+1d4"));
}
