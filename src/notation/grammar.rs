//! Named pattern fragments that compose into the full dice notation grammar, and the cache of compiled patterns
//! built from them.
//!
//! Each [`Fragment`] produces a pattern string, built from the fragments it depends on. Fragments are compiled on
//! request with a set of [`Flags`], optionally anchored to match a whole string, and cached for the rest of the
//! process lifetime.
//!
//! Two rules cannot be expressed by a linear-time regex engine and are enforced by [`Pattern`] while matching:
//! - an [`Fragment::Addition`] with a numeric value never matches when the value is followed by more digits and a
//!   `d`, so that `+1d6` in `2d20+1d6` is left for the next dice term rather than read as `+1`
//! - a [`Fragment::Notation`] match is extended with every [`Fragment::Addition`] that directly follows it, and that
//!   run of additions is exposed as the final capture group

use std::{
	collections::HashMap,
	fmt,
	ops::Range,
	str::FromStr,
	sync::{Arc, PoisonError, RwLock},
};

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::trace;

/// Process-wide grammar used by the notation parser.
static PATTERNS: Lazy<Grammar> = Lazy::new(Grammar::new);

/// Gets the process-wide [`Grammar`].
#[must_use]
#[inline]
pub fn patterns() -> &'static Grammar {
	&PATTERNS
}

/// Looks up a compiled pattern by fragment name from the process-wide [`Grammar`].
/// See [`Grammar::get()`].
///
/// # Errors
/// If the name is empty or isn't a known fragment, or the fragment fails to compile, an error variant is returned.
#[inline]
pub fn get(name: &str, flags: Flags, match_whole: bool) -> Result<Arc<Pattern>, Error> {
	PATTERNS.get(name, flags, match_whole)
}

/// A named building block of the dice notation grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[expect(clippy::exhaustive_enums, reason = "The grammar is fixed")]
pub enum Fragment {
	/// A basic arithmetic operator: `+`, `-`, `*`, `/`
	ArithmeticOperator,

	/// A comparison operator, such as `=`, `<=`, `>`, `!=`
	ComparisonOperators,

	/// The sides of a fudge die, optionally with a variant: `F`, `F.1`, `F.2`
	Fudge,

	/// A comparison operator followed by an integer, such as `<=4`, `=5`, `!=1`
	NumberComparison,

	/// An exploding die marker: `!`, `!!`, `!p`, `!!p`
	Explode,

	/// A die with an optional quantity: `2d6`, `d10`, `d%`, `dF`, `dF.2`
	Dice,

	/// A die with an optional exploding marker and compare point: `2d6!`, `4d10!!p>8`
	DiceFull,

	/// An addition applied to a die term's result: `+4`, `-10`, `*2`, `-L`, `+H`
	Addition,

	/// A complete dice term with an optional leading operator and any number of trailing additions:
	/// `3d10-2`, `-4d20-L`, `/2d3+4-1`
	Notation,
}

impl Fragment {
	/// All fragments, in dependency order
	pub const ALL: [Self; 9] = [
		Self::ArithmeticOperator,
		Self::ComparisonOperators,
		Self::Fudge,
		Self::NumberComparison,
		Self::Explode,
		Self::Dice,
		Self::DiceFull,
		Self::Addition,
		Self::Notation,
	];

	/// Gets the name the fragment is looked up by.
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::ArithmeticOperator => "arithmeticOperator",
			Self::ComparisonOperators => "comparisonOperators",
			Self::Fudge => "fudge",
			Self::NumberComparison => "numberComparison",
			Self::Explode => "explode",
			Self::Dice => "dice",
			Self::DiceFull => "diceFull",
			Self::Addition => "addition",
			Self::Notation => "notation",
		}
	}

	/// Gets the fragments this one is composed from.
	#[must_use]
	pub const fn dependencies(self) -> &'static [Self] {
		match self {
			Self::ArithmeticOperator | Self::ComparisonOperators | Self::Fudge | Self::Explode => &[],
			Self::NumberComparison => &[Self::ComparisonOperators],
			Self::Dice => &[Self::Fudge],
			Self::DiceFull => &[Self::Dice, Self::Explode, Self::NumberComparison],
			Self::Addition => &[Self::ArithmeticOperator],
			Self::Notation => &[Self::ArithmeticOperator, Self::DiceFull, Self::Addition],
		}
	}

	/// Builds the pattern string for the fragment.
	///
	/// For [`Self::Notation`], this is the pattern of the dice term itself. The trailing additions are matched by
	/// [`Pattern`] (see the [module docs](self)).
	///
	/// # Examples
	/// ```
	/// use dice_log::notation::grammar::Fragment;
	///
	/// assert_eq!(Fragment::NumberComparison.source(), "([<>!]?={1,3}|[<>])([0-9]+)");
	/// ```
	#[must_use]
	pub fn source(self) -> String {
		match self {
			Self::ArithmeticOperator => r"[+\-*/]".to_owned(),
			Self::ComparisonOperators => "[<>!]?={1,3}|[<>]".to_owned(),
			Self::Fudge => r"F(?:\.([12]))?".to_owned(),
			Self::NumberComparison => format!("({})([0-9]+)", Self::ComparisonOperators.source()),
			Self::Explode => "(!{1,2}p?)".to_owned(),
			Self::Dice => format!("([1-9][0-9]*)?d([1-9][0-9]*|%|{})", Self::Fudge.source()),
			Self::DiceFull => format!(
				"{}{}?(?:{})?",
				Self::Dice.source(),
				Self::Explode.source(),
				Self::NumberComparison.source()
			),
			Self::Addition => format!("({})([1-9]+0?|H|L)", Self::ArithmeticOperator.source()),
			Self::Notation => format!("({})?{}", Self::ArithmeticOperator.source(), Self::DiceFull.source()),
		}
	}

	/// Fragment that is matched repeatedly after this one and captured as one trailing group, if any.
	const fn trailer(self) -> Option<Self> {
		match self {
			Self::Notation => Some(Self::Addition),
			_ => None,
		}
	}

	/// Whether a numeric value captured by this fragment must not be the quantity of a following die.
	const fn rejects_dice_quantity(self) -> bool {
		matches!(self, Self::Addition)
	}
}

impl FromStr for Fragment {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Err(Error::MissingName);
		}

		Self::ALL
			.into_iter()
			.find(|fragment| fragment.name() == s)
			.ok_or_else(|| Error::UnknownFragment(s.to_owned()))
	}
}

impl fmt::Display for Fragment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Options for compiling and matching a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[expect(clippy::exhaustive_structs, reason = "Mirrors the flag letters accepted by FromStr")]
pub struct Flags {
	/// Find every match rather than only the first one (`g`)
	pub global: bool,

	/// Match letters regardless of case (`i`)
	pub ignore_case: bool,
}

impl Flags {
	/// No flags
	pub const NONE: Self = Self {
		global: false,
		ignore_case: false,
	};

	/// Only the global flag
	pub const GLOBAL: Self = Self {
		global: true,
		ignore_case: false,
	};
}

impl FromStr for Flags {
	type Err = Error;

	/// Reads flags from their letters, e.g. `"g"`, `"gi"`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.chars().try_fold(Self::NONE, |flags, letter| match letter {
			'g' => Ok(Self { global: true, ..flags }),
			'i' => Ok(Self {
				ignore_case: true,
				..flags
			}),
			_ => Err(Error::UnknownFlag(letter)),
		})
	}
}

impl fmt::Display for Flags {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{}",
			if self.global { "g" } else { "" },
			if self.ignore_case { "i" } else { "" }
		)
	}
}

/// Key identifying a compiled pattern in a [`Grammar`]'s cache
type CacheKey = (Fragment, Flags, bool);

/// Compiles grammar fragments into [`Pattern`]s and caches them.
///
/// The cache only ever grows: once a pattern has been compiled for a given fragment, flag set, and anchoring, every
/// later request for the same combination returns that same pattern.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use dice_log::notation::grammar::{Flags, Grammar};
///
/// let grammar = Grammar::new();
/// let fudge = grammar.get("fudge", Flags::NONE, true)?;
/// assert!(fudge.is_match("F.2"));
/// assert!(!fudge.is_match("xF"));
/// assert!(Arc::ptr_eq(&fudge, &grammar.get("fudge", Flags::NONE, true)?));
/// # Ok::<(), dice_log::notation::grammar::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Grammar {
	/// Compiled patterns
	cache: RwLock<HashMap<CacheKey, Arc<Pattern>>>,
}

impl Grammar {
	/// Creates a grammar with an empty cache.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Gets the compiled pattern for a fragment by name (see [`Fragment::name()`]).
	/// When `match_whole` is set, the pattern only matches an entire string.
	///
	/// # Errors
	/// If the name is empty or isn't a known fragment, or the fragment fails to compile, an error variant is returned.
	pub fn get(&self, name: &str, flags: Flags, match_whole: bool) -> Result<Arc<Pattern>, Error> {
		self.fragment(name.parse()?, flags, match_whole)
	}

	/// Gets the compiled pattern for a fragment. See [`Self::get()`].
	///
	/// # Errors
	/// If the fragment fails to compile, an error variant is returned.
	pub fn fragment(&self, fragment: Fragment, flags: Flags, match_whole: bool) -> Result<Arc<Pattern>, Error> {
		let key = (fragment, flags, match_whole);

		if let Some(pattern) = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
			return Ok(Arc::clone(pattern));
		}

		let pattern = Arc::new(Pattern::compile(fragment, flags, match_whole)?);
		trace!(%fragment, %flags, match_whole, "compiled notation pattern");

		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		Ok(Arc::clone(cache.entry(key).or_insert(pattern)))
	}

	/// Gets the number of compiled patterns in the cache.
	#[must_use]
	pub fn len(&self) -> usize {
		self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	/// Checks whether nothing has been compiled yet.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A compiled grammar fragment
#[derive(Debug)]
pub struct Pattern {
	/// Fragment the pattern was compiled from
	fragment: Fragment,

	/// Flags the pattern was compiled with
	flags: Flags,

	/// Whether the pattern only matches whole strings
	whole: bool,

	/// Compiled fragment source
	regex: Regex,

	/// Compiled trailer fragment, anchored to the start of the text it's run on
	trailer: Option<Regex>,
}

impl Pattern {
	/// Compiles a fragment.
	fn compile(fragment: Fragment, flags: Flags, whole: bool) -> Result<Self, Error> {
		let build = |source: String| {
			RegexBuilder::new(&source)
				.case_insensitive(flags.ignore_case)
				.build()
		};

		let trailer = fragment.trailer();
		let source = match (whole, trailer) {
			// The end anchor is checked after consuming the trailer
			(true, Some(..)) => format!("^(?:{})", fragment.source()),
			(true, None) => format!("^(?:{})$", fragment.source()),
			(false, _) => fragment.source(),
		};

		Ok(Self {
			fragment,
			flags,
			whole,
			regex: build(source)?,
			trailer: trailer
				.map(|trailer| build(format!("^(?:{})", trailer.source())))
				.transpose()?,
		})
	}

	/// Gets the fragment the pattern was compiled from.
	#[must_use]
	#[inline]
	pub const fn fragment(&self) -> Fragment {
		self.fragment
	}

	/// Gets the flags the pattern was compiled with.
	#[must_use]
	#[inline]
	pub const fn flags(&self) -> Flags {
		self.flags
	}

	/// Gets the source of the compiled regex.
	#[must_use]
	#[inline]
	pub fn as_str(&self) -> &str {
		self.regex.as_str()
	}

	/// Checks whether the pattern matches anywhere in the text (or the whole text, if anchored).
	#[must_use]
	pub fn is_match(&self, text: &str) -> bool {
		self.captures_at(text, 0).is_some()
	}

	/// Gets the first match in the text along with its capture groups.
	#[must_use]
	pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
		self.captures_at(text, 0)
	}

	/// Iterates over matches in the text. A pattern compiled with [`Flags::global`] yields every non-overlapping
	/// match from left to right; otherwise only the first match is yielded.
	#[must_use]
	pub const fn captures_iter<'p, 't>(&'p self, text: &'t str) -> CapturesIter<'p, 't> {
		CapturesIter {
			pattern: self,
			text,
			at: 0,
			done: false,
		}
	}

	/// Finds the first match starting at or after `at`.
	fn captures_at<'t>(&self, text: &'t str, mut at: usize) -> Option<Captures<'t>> {
		while at <= text.len() {
			let caps = self.regex.captures_at(text, at)?;
			let full = caps.get(0)?.range();

			let value = caps.get(2).map(|m| m.as_str());
			if self.fragment.rejects_dice_quantity() && self.precedes_die(value, &text[full.end..]) {
				at = next_boundary(text, full.start);
				continue;
			}

			let mut groups = caps.iter().map(|m| m.map(|m| m.range())).collect::<Vec<_>>();

			if let Some(trailer) = &self.trailer {
				let end = self.consume_trailer(trailer, text, full.end);
				if self.whole && end != text.len() {
					return None;
				}

				groups[0] = Some(full.start..end);
				groups.push(Some(full.end..end));
			}

			return Some(Captures { text, groups });
		}

		None
	}

	/// Matches the trailer fragment repeatedly from `start`, returning where the run of trailers ends.
	fn consume_trailer(&self, trailer: &Regex, text: &str, start: usize) -> usize {
		let mut end = start;

		while let Some(caps) = trailer.captures(&text[end..]) {
			let Some(full) = caps.get(0) else { break };
			let next = end + full.end();
			if full.is_empty() || self.precedes_die(caps.get(2).map(|m| m.as_str()), &text[next..]) {
				break;
			}
			end = next;
		}

		end
	}

	/// Checks whether a captured numeric value is directly followed by (more digits and) a die marker in `rest`,
	/// meaning the value is actually the start of a following dice term.
	fn precedes_die(&self, value: Option<&str>, rest: &str) -> bool {
		let numeric = value.is_some_and(|value| value.starts_with(|c: char| c.is_ascii_digit()));
		if !numeric {
			return false;
		}

		let after_digits = rest.trim_start_matches(|c: char| c.is_ascii_digit());
		after_digits.starts_with('d') || (self.flags.ignore_case && after_digits.starts_with('D'))
	}
}

/// Gets the byte index of the character boundary after `index`.
fn next_boundary(text: &str, index: usize) -> usize {
	text[index..]
		.chars()
		.next()
		.map_or(index + 1, |c| index + c.len_utf8())
}

/// Capture groups of a single [`Pattern`] match.
/// Group 0 is the whole match; the rest are numbered by the order of their opening parentheses, followed by the
/// trailer group for patterns that have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures<'t> {
	/// Text that was matched against
	text: &'t str,

	/// Byte ranges of each group, if it participated in the match
	groups: Vec<Option<Range<usize>>>,
}

impl<'t> Captures<'t> {
	/// Gets the text of a capture group, if the group participated in the match.
	#[must_use]
	pub fn get(&self, group: usize) -> Option<&'t str> {
		self.groups
			.get(group)
			.cloned()
			.flatten()
			.and_then(|range| self.text.get(range))
	}

	/// Gets the byte range of the whole match.
	#[must_use]
	pub fn range(&self) -> Range<usize> {
		self.groups.first().cloned().flatten().unwrap_or_default()
	}

	/// Gets the text of the whole match.
	#[must_use]
	pub fn as_str(&self) -> &'t str {
		self.get(0).unwrap_or_default()
	}

	/// Gets the number of groups, including group 0.
	#[must_use]
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	/// Always false, since group 0 is always present.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}
}

/// Iterator over the matches of a [`Pattern`]. See [`Pattern::captures_iter()`].
#[derive(Debug)]
pub struct CapturesIter<'p, 't> {
	/// Pattern being matched
	pattern: &'p Pattern,

	/// Text being searched
	text: &'t str,

	/// Byte index to resume searching from
	at: usize,

	/// Whether iteration has finished
	done: bool,
}

impl<'t> Iterator for CapturesIter<'_, 't> {
	type Item = Captures<'t>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done || self.at > self.text.len() {
			return None;
		}

		let Some(caps) = self.pattern.captures_at(self.text, self.at) else {
			self.done = true;
			return None;
		};

		let range = caps.range();
		self.done = !self.pattern.flags.global;
		self.at = if range.is_empty() {
			next_boundary(self.text, range.end)
		} else {
			range.end
		};

		Some(caps)
	}
}

/// An error resulting from looking up or compiling a grammar pattern
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// No fragment name was given.
	#[error("notation pattern name not defined")]
	MissingName,

	/// The fragment name doesn't match any known fragment.
	///
	/// # Examples
	/// ```
	/// use dice_log::notation::grammar::{get, Error, Flags};
	///
	/// assert!(matches!(get("nonsense", Flags::NONE, false), Err(Error::UnknownFragment(..))));
	/// ```
	#[error("notation pattern name not found: {0}")]
	UnknownFragment(String),

	/// The flag letter isn't supported.
	#[error("unknown notation pattern flag: {0}")]
	UnknownFlag(char),

	/// The fragment's pattern failed to compile.
	#[error("invalid notation pattern: {0}")]
	Regex(#[from] regex::Error),
}
