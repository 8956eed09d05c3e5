//! Parsing of dice notation (e.g. `3d6!p>=5+2d4-L`) into structured [`Die`] specifications.
//!
//! A notation is a sequence of dice terms. Each term has an optional leading [`Operator`] (joining it to the terms
//! before it), an optional quantity, the die's [`Sides`], an optional exploding marker, an optional [`ComparePoint`],
//! and any number of trailing [`Addition`]s.
//!
//! Parsing never fails: text that doesn't contain any dice terms results in an empty list, and anything between or
//! around recognised terms is ignored. Callers that need stricter validation must check the result themselves.

pub mod grammar;

use std::{fmt, str::FromStr};

use tracing::{debug, warn};

use self::grammar::{patterns, Captures, Flags, Fragment};
use crate::util::{compare_numbers, is_numeric, parse_float, parse_int, Numeric};

/// Parses a dice notation, returning each dice term found in the order they appear.
/// Empty or missing notations produce no terms.
///
/// # Examples
/// ```
/// use dice_log::notation::{parse_notation, ComparePoint, Operator, Sides};
///
/// let dice = parse_notation("2d20!>=15+1d6");
/// assert_eq!(dice.len(), 2);
///
/// assert!(dice[0].explode);
/// assert_eq!(dice[0].compare_point, Some(ComparePoint::new(">=", 15)));
///
/// assert_eq!(dice[1].operator, Operator::Add);
/// assert_eq!(dice[1].quantity, 1);
/// assert_eq!(dice[1].sides, Sides::Numeric(6));
///
/// assert!(parse_notation(None).is_empty());
/// ```
#[must_use]
pub fn parse_notation<'a>(notation: impl Into<Option<&'a str>>) -> Vec<Die> {
	let Some(notation) = notation.into().filter(|notation| !notation.is_empty()) else {
		return Vec::new();
	};

	let pattern = match patterns().fragment(Fragment::Notation, Flags::GLOBAL, false) {
		Ok(pattern) => pattern,
		Err(err) => {
			warn!(%err, notation, "unable to build the notation pattern");
			return Vec::new();
		}
	};

	let dice = pattern.captures_iter(notation).map(|caps| Die::from_captures(&caps)).collect::<Vec<_>>();
	debug!(notation, terms = dice.len(), "parsed dice notation");
	dice
}

/// Parses a notation for a single die, returning only the first dice term found (if any).
/// Any further terms in the notation are discarded.
///
/// # Examples
/// ```
/// use dice_log::notation::{parse_die, Fudge, Sides};
///
/// let die = parse_die("4dF.1").unwrap();
/// assert_eq!(die.quantity, 4);
/// assert_eq!(die.sides, Sides::Fudge(Fudge::Variant(1)));
/// assert!(die.is_fudge());
///
/// assert!(parse_die("nothing here").is_none());
/// ```
#[must_use]
pub fn parse_die<'a>(notation: impl Into<Option<&'a str>>) -> Option<Die> {
	parse_notation(notation).into_iter().next()
}

/// Renders dice terms back into notation text. The operator of the first term is left out when it is `+`.
///
/// # Examples
/// ```
/// use dice_log::notation::{format_notation, parse_notation};
///
/// let dice = parse_notation("3d6!!p+2d4-L");
/// assert_eq!(format_notation(&dice), "3d6!!p=6+2d4-L");
/// ```
#[must_use]
pub fn format_notation(dice: &[Die]) -> String {
	let text = dice.iter().map(ToString::to_string).collect::<String>();
	match text.strip_prefix('+') {
		Some(stripped) => stripped.to_owned(),
		None => text,
	}
}

/// Converts a parsed integer into a `u32`, saturating at its bounds.
fn saturating_u32(val: i64) -> u32 {
	u32::try_from(val.max(0)).unwrap_or(u32::MAX)
}

/// A single dice term of a notation and all of its modifiers
#[derive(Debug, Clone, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "Fields map directly to the notation grammar")]
pub struct Die {
	/// Operator combining this term's result with the running total
	pub operator: Operator,

	/// Number of dice to roll
	pub quantity: u32,

	/// Sides of each die
	pub sides: Sides,

	/// Whether dice that meet the compare point are rolled again
	pub explode: bool,

	/// Whether each additional roll from exploding has 1 subtracted from it
	pub penetrate: bool,

	/// Whether each die's explosions are combined into a single value
	pub compound: bool,

	/// Threshold for exploding, or for counting successes when not exploding
	pub compare_point: Option<ComparePoint>,

	/// Arithmetic applied to this term's result, in order
	pub additions: Vec<Addition>,
}

impl Die {
	/// Creates a plain die term (`+{quantity}d{sides}`) without any modifiers.
	#[must_use]
	pub const fn new(quantity: u32, sides: Sides) -> Self {
		Self {
			operator: Operator::Add,
			quantity,
			sides,
			explode: false,
			penetrate: false,
			compound: false,
			compare_point: None,
			additions: Vec::new(),
		}
	}

	/// Builds a die term from a match of the [`Fragment::Notation`] pattern.
	fn from_captures(caps: &Captures<'_>) -> Self {
		let explode_marker = caps.get(5);
		let explode = explode_marker.is_some_and(|marker| !marker.is_empty());

		let mut die = Self {
			operator: caps.get(1).and_then(|op| op.parse().ok()).unwrap_or_default(),
			quantity: caps.get(2).and_then(parse_int).map_or(1, saturating_u32),
			sides: Sides::from_marker(caps.get(3).unwrap_or_default()),
			explode,
			penetrate: matches!(explode_marker, Some("!p" | "!!p")),
			compound: matches!(explode_marker, Some("!!" | "!!p")),
			compare_point: None,
			additions: Vec::new(),
		};

		die.compare_point = match (caps.get(6), caps.get(7)) {
			(Some(operator), Some(value)) if !operator.is_empty() => Some(ComparePoint {
				operator: operator.to_owned(),
				value: parse_int(value).unwrap_or_default(),
			}),
			_ if die.explode => Some(die.default_compare_point()),
			_ => None,
		};

		if let Some(additions) = caps.get(8).filter(|additions| !additions.is_empty()) {
			die.additions = Addition::parse_all(additions);
		}

		die
	}

	/// Gets the compare point used when exploding without one given explicitly: equal to the highest face of the die
	/// (1 for fudge dice, 100 for percentile dice).
	#[must_use]
	pub fn default_compare_point(&self) -> ComparePoint {
		ComparePoint {
			operator: "=".to_owned(),
			value: self.sides.max_face(),
		}
	}

	/// Gets the fudge die variant, if this is a fudge die.
	#[must_use]
	pub const fn fudge(&self) -> Option<Fudge> {
		match &self.sides {
			Sides::Fudge(fudge) => Some(*fudge),
			_ => None,
		}
	}

	/// Checks whether this is a fudge die.
	#[must_use]
	#[inline]
	pub const fn is_fudge(&self) -> bool {
		self.fudge().is_some()
	}

	/// Checks whether this is a percentile die.
	#[must_use]
	#[inline]
	pub const fn is_percentile(&self) -> bool {
		matches!(self.sides, Sides::Percentile)
	}

	/// Gets the exploding marker for the die's explode flags (`!`, `!!`, `!p`, `!!p`), or an empty string.
	#[must_use]
	pub const fn explode_marker(&self) -> &'static str {
		match (self.explode, self.compound, self.penetrate) {
			(false, ..) => "",
			(true, false, false) => "!",
			(true, true, false) => "!!",
			(true, false, true) => "!p",
			(true, true, true) => "!!p",
		}
	}
}

impl fmt::Display for Die {
	/// Formats the die term as notation text that parses back into an equal term. The operator is always included,
	/// and so is the compare point when exploding (even when it's the default one).
	///
	/// # Examples
	/// ```
	/// use dice_log::notation::parse_die;
	///
	/// assert_eq!(parse_die("d20").unwrap().to_string(), "+1d20");
	/// assert_eq!(parse_die("-2d%!p>90*2").unwrap().to_string(), "-2d%!p>90*2");
	/// ```
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{}d{}{}",
			self.operator,
			self.quantity,
			self.sides,
			self.explode_marker()
		)?;

		if let Some(compare_point) = &self.compare_point {
			write!(f, "{compare_point}")?;
		}

		self.additions.iter().try_for_each(|addition| write!(f, "{addition}"))
	}
}

/// Arithmetic operator joining a term or addition to the value before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[expect(clippy::exhaustive_enums, reason = "The grammar only has four arithmetic operators")]
pub enum Operator {
	/// Addition: `+`
	#[default]
	Add,

	/// Subtraction: `-`
	Sub,

	/// Multiplication: `*`
	Mul,

	/// Division: `/`
	Div,
}

impl Operator {
	/// Gets the symbol that represents the operator.
	#[must_use]
	pub const fn symbol(self) -> char {
		match self {
			Self::Add => '+',
			Self::Sub => '-',
			Self::Mul => '*',
			Self::Div => '/',
		}
	}
}

impl FromStr for Operator {
	type Err = ParseOperatorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"+" => Ok(Self::Add),
			"-" => Ok(Self::Sub),
			"*" => Ok(Self::Mul),
			"/" => Ok(Self::Div),
			_ => Err(ParseOperatorError(s.to_owned())),
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// The text given isn't an arithmetic operator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown arithmetic operator: {0}")]
pub struct ParseOperatorError(String);

/// Sides of a die
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Sides {
	/// Standard die numbered from 1 to the given number
	Numeric(u32),

	/// Percentile die (`%`), numbered from 1 to 100
	Percentile,

	/// Fudge die (`F`), with faces -1, 0, and +1
	Fudge(Fudge),

	/// Unrecognised marker, kept as-is
	Other(String),
}

impl Sides {
	/// Reads the sides from the marker following the `d` of a die.
	/// Numeric markers are read as integers, fudge markers are detected by matching the whole marker against the
	/// [`Fragment::Fudge`] pattern, and anything else is kept as-is.
	#[must_use]
	pub fn from_marker(marker: &str) -> Self {
		if is_numeric(marker) {
			return Self::Numeric(parse_int(marker).map_or(0, saturating_u32));
		}

		let fudge = patterns()
			.fragment(Fragment::Fudge, Flags::NONE, true)
			.ok()
			.and_then(|pattern| pattern.captures(marker).map(|caps| Fudge::from_variant(caps.get(1))));

		match fudge {
			Some(fudge) => Self::Fudge(fudge),
			None if marker == "%" => Self::Percentile,
			None => Self::Other(marker.to_owned()),
		}
	}

	/// Gets the lowest value a die with these sides can roll.
	#[must_use]
	pub const fn min_face(&self) -> i64 {
		match self {
			Self::Numeric(..) | Self::Percentile => 1,
			Self::Fudge(..) => -1,
			Self::Other(..) => 0,
		}
	}

	/// Gets the highest value a die with these sides can roll.
	#[must_use]
	pub fn max_face(&self) -> i64 {
		match self {
			Self::Numeric(sides) => i64::from(*sides),
			Self::Percentile => 100,
			Self::Fudge(..) => 1,
			Self::Other(..) => 0,
		}
	}
}

impl fmt::Display for Sides {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Numeric(sides) => write!(f, "{sides}"),
			Self::Percentile => f.write_str("%"),
			Self::Fudge(fudge) => write!(f, "{fudge}"),
			Self::Other(marker) => f.write_str(marker),
		}
	}
}

/// Variant of a fudge die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change")]
pub enum Fudge {
	/// Plain fudge die (`F`): -1, 0, and +1 are equally likely
	Standard,

	/// Numbered fudge die (`F.1`, `F.2`). `F.2` behaves like the standard die, while `F.1` only rolls -1 or +1 on
	/// one face each, with 0 on the other four.
	Variant(u8),
}

impl Fudge {
	/// Creates the fudge variant from the number captured after `F.`, if any.
	fn from_variant(variant: Option<&str>) -> Self {
		variant
			.and_then(|variant| variant.parse().ok())
			.map_or(Self::Standard, Self::Variant)
	}
}

impl fmt::Display for Fudge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Standard => f.write_str("F"),
			Self::Variant(variant) => write!(f, "F.{variant}"),
		}
	}
}

/// Comparison that roll values can be checked against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "Fields map directly to the notation grammar")]
pub struct ComparePoint {
	/// Comparison operator symbol, as written in the notation
	pub operator: String,

	/// Value to compare against
	pub value: i64,
}

impl ComparePoint {
	/// Creates a compare point from an operator symbol and value.
	#[must_use]
	pub fn new(operator: &str, value: i64) -> Self {
		Self {
			operator: operator.to_owned(),
			value,
		}
	}

	/// Checks a value against the compare point. Operators that aren't understood never match.
	///
	/// # Examples
	/// ```
	/// use dice_log::notation::ComparePoint;
	///
	/// let cp = ComparePoint::new(">=", 5);
	/// assert!(cp.check(5));
	/// assert!(!cp.check(4));
	/// assert!(!ComparePoint::new("<==", 5).check(1));
	/// ```
	#[must_use]
	pub fn check(&self, val: impl Numeric) -> bool {
		compare_numbers(val, self.value, &self.operator)
	}
}

impl fmt::Display for ComparePoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.operator, self.value)
	}
}

/// Arithmetic applied to the result of a dice term
#[derive(Debug, Clone, Copy, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "Fields map directly to the notation grammar")]
pub struct Addition {
	/// Operator to apply
	pub operator: Operator,

	/// Value to apply it with
	pub value: AdditionValue,
}

impl Addition {
	/// Parses every addition found in a run of additions (e.g. `+2-L*3`).
	fn parse_all(text: &str) -> Vec<Self> {
		let Ok(pattern) = patterns().fragment(Fragment::Addition, Flags::GLOBAL, false) else {
			return Vec::new();
		};

		pattern
			.captures_iter(text)
			.filter_map(|caps| {
				let operator = caps.get(1)?.parse().ok()?;
				let value = match caps.get(2)? {
					"H" => AdditionValue::Highest,
					"L" => AdditionValue::Lowest,
					value => AdditionValue::Number(parse_float(value)?),
				};
				Some(Self { operator, value })
			})
			.collect()
	}
}

impl fmt::Display for Addition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.operator, self.value)
	}
}

/// Value of an [`Addition`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[expect(clippy::exhaustive_enums, reason = "The grammar only has numbers, H, and L")]
pub enum AdditionValue {
	/// A plain number
	Number(f64),

	/// The highest roll of the term (`H`)
	Highest,

	/// The lowest roll of the term (`L`)
	Lowest,
}

impl fmt::Display for AdditionValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(num) => write!(f, "{num}"),
			Self::Highest => f.write_str("H"),
			Self::Lowest => f.write_str("L"),
		}
	}
}
