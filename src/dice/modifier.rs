//! Dice modifiers: exploding dice and the additions applied to a term's result.

use std::fmt;

use super::{roller::Roller, DieRoll, Error, Rolled};
use crate::{
	notation::{AdditionValue, ComparePoint, Die},
	util::{equate_numbers, Numeric},
};

/// Maximum number of additional rolls a single die can explode into
pub const MAX_EXPLOSIONS: usize = 1000;

/// Ways a die can explode (roll again when it meets its compare point)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Every combination of the explode flags is covered")]
pub enum Explode {
	/// Each additional roll is kept as a separate roll (`!`).
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Iter as IterRoller, DiceRoll};
	///
	/// // The 6 meets the default compare point (=6), so another die is rolled: a 6 again, then a 2
	/// let mut rng = IterRoller::new([6, 6, 2, 3]);
	/// let rolled = DiceRoll::new("2d6!", &mut rng)?;
	/// assert_eq!(rolled.to_string(), "2d6!: [6!,6!,2,3] = 17");
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	Standard,

	/// All of a die's rolls are combined into a single roll (`!!`).
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Iter as IterRoller, DiceRoll};
	///
	/// let mut rng = IterRoller::new([6, 6, 2, 3]);
	/// let rolled = DiceRoll::new("2d6!!", &mut rng)?;
	/// assert_eq!(rolled.to_string(), "2d6!!: [14!!,3] = 17");
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	Compound,

	/// Each additional roll has 1 subtracted from it (`!p`).
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Iter as IterRoller, DiceRoll};
	///
	/// let mut rng = IterRoller::new([6, 6, 2, 3]);
	/// let rolled = DiceRoll::new("2d6!p", &mut rng)?;
	/// assert_eq!(rolled.to_string(), "2d6!p: [6!p,5!p,1,3] = 15");
	/// # Ok::<(), dice_log::dice::Error>(())
	/// ```
	Penetrate,

	/// Both [`Self::Compound`] and [`Self::Penetrate`] (`!!p`).
	CompoundPenetrate,
}

impl Explode {
	/// Gets the exploding behaviour of a die term, if it explodes.
	#[must_use]
	pub const fn of(die: &Die) -> Option<Self> {
		match (die.explode, die.compound, die.penetrate) {
			(false, ..) => None,
			(true, false, false) => Some(Self::Standard),
			(true, true, false) => Some(Self::Compound),
			(true, false, true) => Some(Self::Penetrate),
			(true, true, true) => Some(Self::CompoundPenetrate),
		}
	}

	/// Checks whether the additional rolls are combined into one.
	#[must_use]
	pub const fn compounds(self) -> bool {
		matches!(self, Self::Compound | Self::CompoundPenetrate)
	}

	/// Checks whether the additional rolls have 1 subtracted from them.
	#[must_use]
	pub const fn penetrates(self) -> bool {
		matches!(self, Self::Penetrate | Self::CompoundPenetrate)
	}

	/// Gets the compare point a die term explodes on: its own, or the default one for its sides.
	fn compare_point(die: &Die) -> ComparePoint {
		die.compare_point.clone().unwrap_or_else(|| die.default_compare_point())
	}

	/// Ensures that exploding the die term would eventually stop, i.e. that at least one face of the die doesn't
	/// meet the compare point.
	///
	/// # Errors
	/// If every face of the die meets the compare point, [`Error::InfiniteRolls`] is returned.
	///
	/// # Examples
	/// ```
	/// use dice_log::dice::{roller::Max as MaxRoller, DiceRoll, Error};
	///
	/// assert!(matches!(DiceRoll::new("4d1!", &mut MaxRoller), Err(Error::InfiniteRolls(..))));
	/// assert!(matches!(DiceRoll::new("2d6!>=1", &mut MaxRoller), Err(Error::InfiniteRolls(..))));
	/// ```
	pub fn check_finite(self, die: &Die) -> Result<(), Error> {
		let cond = Self::compare_point(die);
		let (min, max) = (die.sides.min_face(), die.sides.max_face());

		let endless = match cond.operator.as_str() {
			"=" | "==" => min == max && cond.check(min),
			"<" | "<=" | ">" | ">=" => cond.check(min) && cond.check(max),
			"!" | "!=" => cond.value < min || cond.value > max,
			_ => false,
		};

		if endless {
			Err(Error::InfiniteRolls(die.to_string()))
		} else {
			Ok(())
		}
	}

	/// Rolls a single die of the term, rolling again for as long as the last roll meets the compare point.
	/// Returns the die's rolls: one compounded roll, or each roll of the chain.
	pub fn roll(self, die: &Die, rng: &mut impl Roller) -> Vec<DieRoll> {
		let cond = Self::compare_point(die);
		let penetrates = self.penetrates();

		let mut raw = rng.roll_die(&die.sides);
		let mut chain = vec![DieRoll::new(raw)];

		while cond.check(raw) && chain.len() <= MAX_EXPLOSIONS {
			if let Some(last) = chain.last_mut() {
				last.exploded = true;
				last.penetrated = penetrates;
			}

			raw = rng.roll_die(&die.sides);
			chain.push(DieRoll::new(if penetrates { raw.saturating_sub(1) } else { raw }));
		}

		if self.compounds() && chain.len() > 1 {
			vec![DieRoll {
				value: chain.iter().map(|roll| roll.value).sum(),
				exploded: false,
				compounded: true,
				penetrated: penetrates,
			}]
		} else {
			chain
		}
	}
}

impl fmt::Display for Explode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Standard => "!",
			Self::Compound => "!!",
			Self::Penetrate => "!p",
			Self::CompoundPenetrate => "!!p",
		})
	}
}

/// Applies a term's additions, in order, to its value.
/// `H` and `L` additions use the highest and lowest of the term's roll values (0 when there are none).
#[must_use]
pub fn apply_additions(rolled: &Rolled, value: f64) -> f64 {
	rolled.die.additions.iter().fold(value, |acc, addition| {
		let operand = match addition.value {
			AdditionValue::Number(num) => Some(num),
			AdditionValue::Highest => rolled.highest().and_then(|val| val.to_number()),
			AdditionValue::Lowest => rolled.lowest().and_then(|val| val.to_number()),
		};
		equate_numbers(acc, operand.unwrap_or(0.0), addition.operator)
	})
}
