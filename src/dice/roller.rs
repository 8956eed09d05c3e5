//! Abstractions for rolling die values using various means.

use core::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

use super::{modifier::Explode, DieRoll, Error, Rolled, MAX_QUANTITY};
use crate::notation::{Die, Fudge, Sides};

/// Rolls dice - what else is there to say?
pub trait Roller {
	/// Rolls a value between `min` and `max`, inclusive.
	#[must_use]
	fn roll_range(&mut self, min: i64, max: i64) -> i64;

	/// Rolls a single die with the given sides.
	///
	/// Numeric dice roll from 1 to their number of sides and percentile dice from 1 to 100. Standard fudge dice (and
	/// `F.2`) roll -1, 0, or +1 evenly; `F.1` rolls a d6 where a 1 is -1, a 6 is +1, and anything else is 0.
	#[must_use]
	fn roll_die(&mut self, sides: &Sides) -> i64 {
		match sides {
			Sides::Numeric(sides) => self.roll_range(1, i64::from(*sides)),
			Sides::Percentile => self.roll_range(1, 100),
			Sides::Fudge(Fudge::Variant(1)) => match self.roll_range(1, 6) {
				1 => -1,
				6 => 1,
				_ => 0,
			},
			Sides::Fudge(..) => self.roll_range(-1, 1),
			Sides::Other(..) => 0,
		}
	}

	/// Rolls every die of a dice term, exploding them as the term specifies.
	///
	/// # Errors
	/// If the term has too many dice, or exploding it would never end, an error variant is returned.
	fn roll(&mut self, die: &Die) -> Result<Rolled, Error>
	where
		Self: Sized,
	{
		if die.quantity > MAX_QUANTITY {
			return Err(Error::TooManyDice {
				die: die.to_string(),
				max: MAX_QUANTITY,
			});
		}

		let explode = Explode::of(die);
		if let Some(explode) = explode {
			explode.check_finite(die)?;
		}

		let mut rolls = Vec::with_capacity(die.quantity as usize);
		for _ in 0..die.quantity {
			match explode {
				Some(explode) => rolls.extend(explode.roll(die, self)),
				None => rolls.push(DieRoll::new(self.roll_die(&die.sides))),
			}
		}

		Ok(Rolled {
			die: die.clone(),
			rolls,
		})
	}
}

/// Generates rolls with random values using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use dice_log::dice::{roller::FastRand as FastRandRoller, DiceRoll};
///
/// let mut roller = FastRandRoller::default();
/// let _ = DiceRoll::new("4d6", &mut roller)?;
/// let _ = DiceRoll::new("4d6", &mut roller)?;
/// # Ok::<(), dice_log::dice::Error>(())
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use dice_log::dice::{roller::FastRand as FastRandRoller, DiceRoll};
///
/// let first = DiceRoll::new("4d6+2d8", &mut FastRandRoller::with_seed(0x750c38d574400))?;
/// let second = DiceRoll::new("4d6+2d8", &mut FastRandRoller::with_seed(0x750c38d574400))?;
/// assert_eq!(first, second);
/// # Ok::<(), dice_log::dice::Error>(())
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	/// Rolls a value using the [`fastrand::Rng`] the roller was created with.
	/// See [`generate_number`](crate::util::generate_number) for how the bounds are treated.
	#[inline]
	fn roll_range(&mut self, min: i64, max: i64) -> i64 {
		crate::util::generate_number_using(&mut self.0, Some(min), Some(max))
	}
}

/// Generates rolls that always have a specific value.
///
/// # Examples
/// ```
/// use dice_log::dice::{roller::Val as ValRoller, DiceRoll};
///
/// let rolled = DiceRoll::new("4d6", &mut ValRoller(3))?;
/// assert_eq!(rolled.total(), 12.0);
/// # Ok::<(), dice_log::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub i64);

impl Roller for Val {
	/// Rolls a value, always the one the roller was created with.
	#[inline]
	fn roll_range(&mut self, _min: i64, _max: i64) -> i64 {
		self.0
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use dice_log::dice::{roller::Max as MaxRoller, DiceRoll};
///
/// let mut roller = MaxRoller;
///
/// let rolled = DiceRoll::new("4d6", &mut roller)?;
/// assert_eq!(rolled.total(), 24.0);
///
/// let rolled = DiceRoll::new("2d20+1dF", &mut roller)?;
/// assert_eq!(rolled.total(), 41.0);
/// # Ok::<(), dice_log::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Rolls a value, always the max value.
	#[inline]
	fn roll_range(&mut self, _min: i64, max: i64) -> i64 {
		max
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// The values are used as-is for each die roll, so fudge dice take values from -1 to 1 (or 1 to 6 for `F.1`).
///
/// # Examples
/// ```
/// use dice_log::dice::{roller::Iter as IterRoller, DiceRoll};
///
/// let mut roller = IterRoller::new(vec![1, 2, 3, 4, 10]);
/// let rolled = DiceRoll::new("5d6", &mut roller)?;
/// assert_eq!(rolled.to_string(), "5d6: [1,2,3,4,10] = 20");
/// # Ok::<(), dice_log::dice::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = i64>>(Peekable<I>);

impl<I: Iterator<Item = i64>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = i64>> Roller for Iter<I> {
	/// Rolls a value from the next iteration.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn roll_range(&mut self, _min: i64, _max: i64) -> i64 {
		self.0.next().expect("iterator is finished")
	}
}
