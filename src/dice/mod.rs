//! Rolling parsed dice notation and working with the resulting rolls.
//!
//! A [`DiceRoll`] is the result of rolling every term of a notation. Each term's rolls are kept as a [`Rolled`],
//! which knows how to total itself (summing, or counting successes for dice pools) and apply its additions.

pub mod modifier;
pub mod roller;

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

pub use self::roller::Roller;
use crate::{
	notation::{parse_notation, Die, Operator},
	util::{equate_numbers, sum},
};

/// Maximum number of dice a single term can roll
pub const MAX_QUANTITY: u32 = 999;

/// Single die value produced from rolling a die, along with markers for how it came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawDieRoll")]
#[expect(clippy::exhaustive_structs, reason = "Markers map directly to the exploding modifiers")]
pub struct DieRoll {
	/// Value that was rolled
	pub value: i64,

	/// Whether this roll met the compare point and caused another die to be rolled
	#[serde(skip_serializing_if = "is_false")]
	pub exploded: bool,

	/// Whether this roll is a compounded chain of exploded rolls
	#[serde(skip_serializing_if = "is_false")]
	pub compounded: bool,

	/// Whether this roll is part of a penetrating chain
	#[serde(skip_serializing_if = "is_false")]
	pub penetrated: bool,
}

impl DieRoll {
	/// Creates a plain die roll with the given value.
	#[must_use]
	pub const fn new(value: i64) -> Self {
		Self {
			value,
			exploded: false,
			compounded: false,
			penetrated: false,
		}
	}
}

impl fmt::Display for DieRoll {
	/// Formats the roll value followed by its markers: `!!` when compounded (or `!` when exploded), then `p` when
	/// penetrated.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::DieRoll;
	///
	/// assert_eq!(DieRoll::new(4).to_string(), "4");
	///
	/// let roll = DieRoll { exploded: true, penetrated: true, ..DieRoll::new(6) };
	/// assert_eq!(roll.to_string(), "6!p");
	/// ```
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let marker = if self.compounded {
			"!!"
		} else if self.exploded {
			"!"
		} else {
			""
		};
		write!(f, "{}{marker}{}", self.value, if self.penetrated { "p" } else { "" })
	}
}

/// Serialized forms a die roll can be read from: a bare value, or a full object with markers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDieRoll {
	/// Bare number
	Value(i64),

	/// Object with a value and optional markers
	Full {
		/// Value that was rolled
		value: i64,

		/// Exploded marker
		#[serde(default)]
		exploded: bool,

		/// Compounded marker
		#[serde(default)]
		compounded: bool,

		/// Penetrated marker
		#[serde(default)]
		penetrated: bool,
	},
}

impl From<RawDieRoll> for DieRoll {
	fn from(raw: RawDieRoll) -> Self {
		match raw {
			RawDieRoll::Value(value) => Self::new(value),
			RawDieRoll::Full {
				value,
				exploded,
				compounded,
				penetrated,
			} => Self {
				value,
				exploded,
				compounded,
				penetrated,
			},
		}
	}
}

/// Used to leave unset markers out of serialized rolls.
#[expect(clippy::trivially_copy_pass_by_ref, reason = "serde passes fields by reference")]
const fn is_false(val: &bool) -> bool {
	!*val
}

/// All of the rolls made for a single dice term
#[derive(Debug, Clone, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Rolled {
	/// Dice term that was rolled
	pub die: Die,

	/// Each individual die roll that was made, including those added by exploding
	pub rolls: Vec<DieRoll>,
}

impl Rolled {
	/// Gets the value of every roll.
	#[must_use]
	pub fn values(&self) -> Vec<i64> {
		self.rolls.iter().map(|roll| roll.value).collect()
	}

	/// Gets the highest roll value, if there are any rolls.
	#[must_use]
	pub fn highest(&self) -> Option<i64> {
		self.rolls.iter().map(|roll| roll.value).max()
	}

	/// Gets the lowest roll value, if there are any rolls.
	#[must_use]
	pub fn lowest(&self) -> Option<i64> {
		self.rolls.iter().map(|roll| roll.value).min()
	}

	/// Checks whether the term is a dice pool: it has a compare point but doesn't explode, so its value is the
	/// number of successful rolls rather than their sum.
	#[must_use]
	pub const fn is_pool(&self) -> bool {
		self.die.compare_point.is_some() && !self.die.explode
	}

	/// Checks whether a roll counts as a success for a dice pool. Rolls are never successes outside of pools.
	#[must_use]
	pub fn is_success(&self, roll: &DieRoll) -> bool {
		self.is_pool()
			&& self
				.die
				.compare_point
				.as_ref()
				.is_some_and(|cond| cond.check(roll.value))
	}

	/// Calculates the term's value: the number of successes for dice pools or the sum of the rolls otherwise,
	/// with the term's additions then applied in order.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Iter as IterRoller, DiceRoll};
	///
	/// let rolled = DiceRoll::new("4d10>=8", &mut IterRoller::new([9, 3, 8, 10]))?;
	/// assert_eq!(rolled.rolls()[0].total(), 3.0);
	///
	/// let rolled = DiceRoll::new("3d6-L", &mut IterRoller::new([4, 1, 5]))?;
	/// assert_eq!(rolled.rolls()[0].total(), 9.0);
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	#[must_use]
	pub fn total(&self) -> f64 {
		let base = if self.is_pool() {
			let successes = self.rolls.iter().filter(|roll| self.is_success(roll)).count();
			f64::from(u32::try_from(successes).unwrap_or(u32::MAX))
		} else {
			sum(self.values().as_slice())
		};

		modifier::apply_additions(self, base)
	}
}

impl fmt::Display for Rolled {
	/// Formats the rolls as a list (`[6!,3,2]`), marking pool successes with `*`, followed by the term's additions.
	/// The term's operator isn't included.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let rolls = self
			.rolls
			.iter()
			.map(|roll| {
				if self.is_success(roll) {
					format!("{roll}*")
				} else {
					roll.to_string()
				}
			})
			.collect::<Vec<_>>()
			.join(",");

		write!(f, "[{rolls}]")?;
		self.die.additions.iter().try_for_each(|addition| write!(f, "{addition}"))
	}
}

impl Serialize for Rolled {
	/// Serializes as the plain list of rolls.
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_seq(&self.rolls)
	}
}

/// The result of rolling a full dice notation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiceRoll {
	/// Notation that was rolled, as given
	notation: String,

	/// Rolls for each term of the notation
	rolls: Vec<Rolled>,

	/// Combined value of all terms
	total: f64,
}

impl DiceRoll {
	/// Parses and rolls a dice notation.
	///
	/// # Errors
	/// If the notation doesn't contain any dice terms, a term has more than [`MAX_QUANTITY`] dice, or a term would
	/// explode forever, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Iter as IterRoller, DiceRoll, Error};
	///
	/// let rolled = DiceRoll::new("2d20+1d6", &mut IterRoller::new([20, 2, 2]))?;
	/// assert_eq!(rolled.total(), 24.0);
	/// assert_eq!(rolled.to_string(), "2d20+1d6: [20,2]+[2] = 24");
	///
	/// assert!(matches!(DiceRoll::new("no dice", &mut IterRoller::new(Vec::new())), Err(Error::InvalidNotation(..))));
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	pub fn new(notation: &str, rng: &mut impl Roller) -> Result<Self, Error> {
		let dice = parse_notation(notation);
		if dice.is_empty() {
			return Err(Error::InvalidNotation(notation.to_owned()));
		}

		let rolls = dice.iter().map(|die| rng.roll(die)).collect::<Result<Vec<_>, _>>()?;
		let roll = Self::from_rolled(notation, rolls);
		debug!(notation, total = roll.total, "rolled dice notation");
		Ok(roll)
	}

	/// Builds a roll for a notation from rolls that were already made, one set of rolls per term.
	///
	/// # Errors
	/// If the notation doesn't contain any dice terms, or the number of roll sets doesn't match the number of terms,
	/// an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{DiceRoll, DieRoll, Error};
	///
	/// let rolled = DiceRoll::from_rolls("2d6*2", vec![vec![DieRoll::new(3), DieRoll::new(4)]])?;
	/// assert_eq!(rolled.total(), 14.0);
	///
	/// let mismatch = DiceRoll::from_rolls("1d6+1d4", vec![vec![DieRoll::new(3)]]);
	/// assert!(matches!(mismatch, Err(Error::RollCountMismatch { expected: 2, found: 1, .. })));
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	pub fn from_rolls(notation: &str, rolls: Vec<Vec<DieRoll>>) -> Result<Self, Error> {
		let dice = parse_notation(notation);
		if dice.is_empty() {
			return Err(Error::InvalidNotation(notation.to_owned()));
		}

		if dice.len() != rolls.len() {
			return Err(Error::RollCountMismatch {
				notation: notation.to_owned(),
				expected: dice.len(),
				found: rolls.len(),
			});
		}

		let rolled = dice
			.into_iter()
			.zip(rolls)
			.map(|(die, rolls)| Rolled { die, rolls })
			.collect();
		Ok(Self::from_rolled(notation, rolled))
	}

	/// Creates a roll from a previously exported or hand-written value.
	///
	/// Strings are treated as notations and rolled fresh. Objects must have a `notation`; when they also have `rolls`
	/// (one list per term, with each roll either a bare value or a roll object) those are used as-is and the total is
	/// recalculated, otherwise the notation is rolled fresh. Any `total` given is ignored.
	///
	/// # Errors
	/// If the value is any other shape, or it fails as described for [`Self::new`] or [`Self::from_rolls`], an error
	/// variant is returned.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Max as MaxRoller, DiceRoll, Error};
	/// use serde_json::json;
	///
	/// let rolled = DiceRoll::import(&json!({"notation": "1d6+2", "rolls": [[4]], "total": 99}), &mut MaxRoller)?;
	/// assert_eq!(rolled.total(), 6.0);
	///
	/// let rolled = DiceRoll::import(&json!("2d4"), &mut MaxRoller)?;
	/// assert_eq!(rolled.total(), 8.0);
	///
	/// assert!(matches!(DiceRoll::import(&json!(42), &mut MaxRoller), Err(Error::InvalidData(..))));
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	pub fn import(data: &Value, rng: &mut impl Roller) -> Result<Self, Error> {
		match data {
			Value::String(notation) => Self::new(notation, rng),
			Value::Object(..) => {
				let imported = Imported::deserialize(data).map_err(|err| Error::InvalidData(err.to_string()))?;
				debug!(notation = imported.notation.as_str(), with_rolls = imported.rolls.is_some(), "importing roll");
				match imported.rolls {
					Some(rolls) => Self::from_rolls(&imported.notation, rolls),
					None => Self::new(&imported.notation, rng),
				}
			}
			other => Err(Error::InvalidData(format!("expected a notation or roll object, found {other}"))),
		}
	}

	/// Combines the rolled terms into a full roll, calculating its total.
	fn from_rolled(notation: &str, rolls: Vec<Rolled>) -> Self {
		let total = rolls
			.iter()
			.fold(0.0, |total, rolled| equate_numbers(total, rolled.total(), rolled.die.operator));

		Self {
			notation: notation.to_owned(),
			rolls,
			total,
		}
	}

	/// Gets the notation that was rolled.
	#[must_use]
	#[inline]
	pub fn notation(&self) -> &str {
		&self.notation
	}

	/// Gets the rolls for each term of the notation.
	#[must_use]
	#[inline]
	pub fn rolls(&self) -> &[Rolled] {
		&self.rolls
	}

	/// Gets the combined value of all terms.
	#[must_use]
	#[inline]
	pub const fn total(&self) -> f64 {
		self.total
	}
}

impl fmt::Display for DiceRoll {
	/// Formats the roll as `{notation}: {rolls} = {total}`, with the total rounded to 2 decimal places.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: ", self.notation)?;

		for (idx, rolled) in self.rolls.iter().enumerate() {
			if idx > 0 || rolled.die.operator != Operator::Add {
				write!(f, "{}", rolled.die.operator)?;
			}
			write!(f, "{rolled}")?;
		}

		// Adding 0.0 turns -0 into 0
		let total = (self.total * 100.0).round() / 100.0 + 0.0;
		write!(f, " = {total}")
	}
}

/// Shape of an object-form roll being imported
#[derive(Deserialize)]
struct Imported {
	/// Notation that was rolled
	notation: String,

	/// Rolls made for each term, if any
	#[serde(default)]
	rolls: Option<Vec<Vec<DieRoll>>>,
}

/// An error resulting from rolling dice
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The notation doesn't contain any dice terms.
	#[error("no dice found in notation: {0:?}")]
	InvalidNotation(String),

	/// Rolling the dice term would result in infinite rolls, since every face of the die explodes.
	#[error("{0} would result in infinite rolls")]
	InfiniteRolls(String),

	/// The dice term has more dice than can be rolled at once.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Max as MaxRoller, DiceRoll, Error};
	///
	/// assert!(matches!(DiceRoll::new("1000d6", &mut MaxRoller), Err(Error::TooManyDice { max: 999, .. })));
	/// ```
	#[error("{die} rolls more than {max} dice")]
	TooManyDice {
		/// Dice term that was rolled
		die: String,

		/// Maximum number of dice allowed
		max: u32,
	},

	/// The number of roll sets given doesn't match the number of terms in the notation.
	#[error("{notation} has {expected} dice terms, but {found} sets of rolls were given")]
	RollCountMismatch {
		/// Notation the rolls were for
		notation: String,

		/// Number of terms in the notation
		expected: usize,

		/// Number of roll sets given
		found: usize,
	},

	/// Imported roll data isn't in a recognised shape.
	#[error("invalid roll data: {0}")]
	InvalidData(String),
}
