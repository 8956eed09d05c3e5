//! A roll log: rolls notations, keeps every result in order, and exports/imports the whole history.

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{ser::SerializeStruct as _, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

#[cfg(feature = "fastrand")]
use crate::dice::roller::FastRand;
use crate::{
	dice::{self, DiceRoll, Roller},
	util::{is_base64, is_json},
};

/// Rolls dice notations and keeps a log of every roll made.
///
/// # Examples
/// ```
/// use dice_log::{dice::roller::Iter as IterRoller, DiceRoller};
///
/// let mut roller = DiceRoller::with_roller(IterRoller::new([20, 2, 2, 6]));
/// roller.roll("2d20+1d6")?;
/// roller.roll("1d8")?;
/// assert_eq!(roller.output(), "2d20+1d6: [20,2]+[2] = 24; 1d8: [6] = 6");
/// # Ok::<(), dice_log::dice_roller::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DiceRoller<R> {
	/// Every roll made or imported, oldest first
	log: Vec<DiceRoll>,

	/// Roller used for new rolls
	roller: R,
}

#[cfg(feature = "fastrand")]
impl DiceRoller<FastRand> {
	/// Creates a roll log with an empty history that rolls using [fastrand].
	#[must_use]
	pub fn new() -> Self {
		Self::with_roller(FastRand::default())
	}

	/// Creates a roll log seeded with the entries of `data.log`. See [`Self::from_data_with_roller`].
	///
	/// # Errors
	/// If `log` is present but isn't an array, or any of its entries can't be imported, an error variant is returned.
	pub fn from_data(data: &Value) -> Result<Self, Error> {
		Self::from_data_with_roller(data, FastRand::default())
	}

	/// Creates a roll log and imports the given data into it. See [`Self::import`].
	///
	/// # Errors
	/// If the import fails, an error variant is returned.
	pub fn from_import(data: impl Into<Value>) -> Result<Self, Error> {
		Self::from_import_with_roller(data, FastRand::default())
	}
}

#[cfg(feature = "fastrand")]
impl Default for DiceRoller<FastRand> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<R: Roller> DiceRoller<R> {
	/// Creates a roll log with an empty history that rolls using the given roller.
	#[must_use]
	pub const fn with_roller(roller: R) -> Self {
		Self {
			log: Vec::new(),
			roller,
		}
	}

	/// Creates a roll log seeded from existing data. When `data` is an object with a `log` array, each entry is
	/// imported in order (see [`DiceRoll::import`]). Any other data starts with an empty history.
	///
	/// # Errors
	/// If `log` is present but isn't an array, or any of its entries can't be imported, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dice_log::{dice::roller::Max as MaxRoller, dice_roller::Error, DiceRoller};
	/// use serde_json::json;
	///
	/// let roller = DiceRoller::from_data_with_roller(&json!({"log": ["1d6", "2d4"]}), MaxRoller)?;
	/// assert_eq!(roller.output(), "1d6: [6] = 6; 2d4: [4,4] = 8");
	///
	/// let bad = DiceRoller::from_data_with_roller(&json!({"log": "1d6"}), MaxRoller);
	/// assert!(matches!(bad, Err(Error::LogNotSequence)));
	/// # Ok::<(), dice_log::dice_roller::Error>(())
	/// ```
	pub fn from_data_with_roller(data: &Value, roller: R) -> Result<Self, Error> {
		let mut dice_roller = Self::with_roller(roller);

		match data.get("log") {
			Some(Value::Array(entries)) => dice_roller.append(entries)?,
			Some(log) if is_truthy(log) => return Err(Error::LogNotSequence),
			_ => {}
		}

		Ok(dice_roller)
	}

	/// Creates a roll log and imports the given data into it. See [`Self::import`].
	///
	/// # Errors
	/// If the import fails, an error variant is returned.
	pub fn from_import_with_roller(data: impl Into<Value>, roller: R) -> Result<Self, Error> {
		let mut dice_roller = Self::with_roller(roller);
		dice_roller.import(data)?;
		Ok(dice_roller)
	}

	/// Gets every roll in the history, oldest first.
	#[must_use]
	#[inline]
	pub fn log(&self) -> &[DiceRoll] {
		&self.log
	}

	/// Renders every roll in the history, joined with `"; "`.
	#[must_use]
	pub fn output(&self) -> String {
		self.log.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
	}

	/// Rolls a notation, appending the result to the history.
	///
	/// # Errors
	/// If the notation can't be rolled, an error variant is returned and the history is left as-is.
	pub fn roll(&mut self, notation: &str) -> Result<&DiceRoll, Error> {
		let roll = DiceRoll::new(notation, &mut self.roller)?;
		debug!(%roll, "appending roll to log");
		let idx = self.log.len();
		self.log.push(roll);
		Ok(&self.log[idx])
	}

	/// Rolls each notation in order, appending all of the results to the history.
	///
	/// # Errors
	/// If any of the notations can't be rolled, an error variant is returned and none of the results are appended.
	///
	/// # Examples
	/// ```
	/// use dice_log::{dice::roller::Val as ValRoller, DiceRoller};
	///
	/// let mut roller = DiceRoller::with_roller(ValRoller(2));
	/// let rolls = roller.roll_many(&["1d6", "3d6"])?;
	/// assert_eq!(rolls.iter().map(|roll| roll.total()).collect::<Vec<_>>(), [2.0, 6.0]);
	///
	/// assert!(roller.roll_many(&["1d6", "nope"]).is_err());
	/// assert_eq!(roller.log().len(), 2);
	/// # Ok::<(), dice_log::dice_roller::Error>(())
	/// ```
	pub fn roll_many<S: AsRef<str>>(&mut self, notations: &[S]) -> Result<Vec<DiceRoll>, Error> {
		let rolls = notations
			.iter()
			.map(|notation| DiceRoll::new(notation.as_ref(), &mut self.roller))
			.collect::<Result<Vec<_>, _>>()?;

		debug!(count = rolls.len(), "appending rolls to log");
		self.log.extend_from_slice(&rolls);
		Ok(rolls)
	}

	/// Removes every roll from the history.
	#[inline]
	pub fn clear_log(&mut self) {
		self.log.clear();
	}

	/// Exports the history as text.
	///
	/// # Errors
	/// If the format can't be exported to, or serialization fails, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dice_log::{dice::roller::Max as MaxRoller, dice_roller::Error, DiceRoller, ExportFormat};
	///
	/// let mut roller = DiceRoller::with_roller(MaxRoller);
	/// roller.roll("1d6")?;
	///
	/// assert_eq!(
	/// 	roller.export(ExportFormat::Json)?,
	/// 	r#"{"log":[{"notation":"1d6","rolls":[[{"value":6}]],"total":6.0}]}"#
	/// );
	/// assert!(matches!(roller.export(ExportFormat::Object), Err(Error::UnimplementedExportFormat(..))));
	/// # Ok::<(), dice_log::dice_roller::Error>(())
	/// ```
	pub fn export(&self, format: ExportFormat) -> Result<String, Error> {
		match format {
			ExportFormat::Json => Ok(serde_json::to_string(self)?),
			ExportFormat::Base64 => Ok(STANDARD.encode(self.export(ExportFormat::Json)?)),
			ExportFormat::Object => Err(Error::UnimplementedExportFormat(format)),
		}
	}

	/// Imports roll data, appending every roll in it to the history. Returns the updated history.
	///
	/// The data is examined in order as JSON text (parsed, then examined again), base64 text (decoded, then examined
	/// again), an object with a `log` array, or a bare array of rolls. Each roll is imported with
	/// [`DiceRoll::import`].
	///
	/// # Errors
	/// If the data is empty, isn't in a recognised format, has a `log` that isn't an array, or contains a roll that
	/// can't be imported, an error variant is returned and nothing is appended.
	///
	/// # Examples
	/// ```
	/// use dice_log::{dice::roller::Max as MaxRoller, DiceRoller};
	///
	/// let mut source = DiceRoller::with_roller(MaxRoller);
	/// source.roll_many(&["1d6", "2d4+1"])?;
	/// let exported = source.export(Default::default())?;
	///
	/// let mut target = DiceRoller::with_roller(MaxRoller);
	/// target.import(exported)?;
	/// assert_eq!(target.output(), source.output());
	/// # Ok::<(), dice_log::dice_roller::Error>(())
	/// ```
	pub fn import(&mut self, data: impl Into<Value>) -> Result<&[DiceRoll], Error> {
		let entries = sniff(data.into())?;
		self.append(&entries)?;
		Ok(&self.log)
	}

	/// Imports every entry as a roll, appending them all to the history only if every one succeeds.
	fn append(&mut self, entries: &[Value]) -> Result<(), Error> {
		let rolls = entries
			.iter()
			.map(|entry| DiceRoll::import(entry, &mut self.roller))
			.collect::<Result<Vec<_>, _>>()?;

		debug!(count = rolls.len(), "imported rolls into log");
		self.log.extend(rolls);
		Ok(())
	}
}

impl<R> Serialize for DiceRoller<R> {
	/// Serializes as the export envelope, `{"log": [...]}`.
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_struct("DiceRoller", 1)?;
		state.serialize_field("log", &self.log)?;
		state.end()
	}
}

impl<R: Roller> fmt::Display for DiceRoller<R> {
	/// Formats the roll log the same as [`DiceRoller::output`].
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.output())
	}
}

/// Result of examining import data with one of the [`DETECTORS`]
enum Detected {
	/// The data was decoded into another value that needs examining again
	Reparse(Value),

	/// The data is a list of rolls to import
	Entries(Vec<Value>),

	/// The detector doesn't recognise the data
	Unchanged,
}

/// A step of the import pipeline
type Detector = fn(&Value) -> Result<Detected, Error>;

/// Every step of the import pipeline, in the order they're tried
const DETECTORS: [Detector; 4] = [detect_json, detect_base64, detect_composite, detect_array];

/// Runs import data through the pipeline until it produces a list of rolls.
fn sniff(mut data: Value) -> Result<Vec<Value>, Error> {
	'sniff: loop {
		if !is_truthy(&data) {
			return Err(Error::NoImportData);
		}

		for detect in DETECTORS {
			match detect(&data)? {
				Detected::Reparse(value) => {
					data = value;
					continue 'sniff;
				}
				Detected::Entries(entries) => return Ok(entries),
				Detected::Unchanged => {}
			}
		}

		return Err(Error::UnrecognisedImportFormat(data.to_string()));
	}
}

/// JSON text for an object or array is parsed.
fn detect_json(data: &Value) -> Result<Detected, Error> {
	match data {
		Value::String(text) if is_json(text) => Ok(Detected::Reparse(serde_json::from_str(text)?)),
		_ => Ok(Detected::Unchanged),
	}
}

/// Base64 text is decoded into a string.
fn detect_base64(data: &Value) -> Result<Detected, Error> {
	match data {
		Value::String(text) if is_base64(text) => {
			let decoded = STANDARD
				.decode(text)
				.ok()
				.and_then(|bytes| String::from_utf8(bytes).ok())
				.ok_or_else(|| Error::UnrecognisedImportFormat(text.clone()))?;
			Ok(Detected::Reparse(Value::String(decoded)))
		}
		_ => Ok(Detected::Unchanged),
	}
}

/// Objects have their `log` array imported. Objects without a `log` have nothing to import.
fn detect_composite(data: &Value) -> Result<Detected, Error> {
	let Value::Object(object) = data else {
		return Ok(Detected::Unchanged);
	};

	match object.get("log") {
		Some(Value::Array(entries)) => Ok(Detected::Entries(entries.clone())),
		Some(log) if is_truthy(log) => Err(Error::LogNotSequence),
		_ => Ok(Detected::Entries(Vec::new())),
	}
}

/// Bare arrays are a list of rolls.
fn detect_array(data: &Value) -> Result<Detected, Error> {
	match data {
		Value::Array(entries) => Ok(Detected::Entries(entries.clone())),
		_ => Ok(Detected::Unchanged),
	}
}

/// Checks whether a value counts as present: `null`, `false`, `0`, and `""` don't.
fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(val) => *val,
		Value::Number(num) => num.as_f64().is_some_and(|num| num != 0.0 && !num.is_nan()),
		Value::String(text) => !text.is_empty(),
		Value::Array(..) | Value::Object(..) => true,
	}
}

/// Formats the roll log can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ExportFormat {
	/// JSON text of `{"log": [...]}`
	#[default]
	Json,

	/// Standard base64 of the JSON text
	Base64,

	/// Structured object (not currently supported for export)
	Object,
}

impl FromStr for ExportFormat {
	type Err = Error;

	/// Reads a format name, ignoring case: `json`, `base64` (or `base_64`), or `object`.
	///
	/// # Examples
	/// ```
	/// use dice_log::ExportFormat;
	///
	/// assert_eq!("JSON".parse::<ExportFormat>()?, ExportFormat::Json);
	/// assert_eq!("base_64".parse::<ExportFormat>()?, ExportFormat::Base64);
	/// assert!("yaml".parse::<ExportFormat>().is_err());
	/// # Ok::<(), dice_log::dice_roller::Error>(())
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"json" => Ok(Self::Json),
			"base64" | "base_64" => Ok(Self::Base64),
			"object" => Ok(Self::Object),
			_ => Err(Error::UnrecognisedExportFormat(s.to_owned())),
		}
	}
}

impl fmt::Display for ExportFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Json => "JSON",
			Self::Base64 => "BASE_64",
			Self::Object => "OBJECT",
		})
	}
}

/// An error resulting from a roll log operation
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The `log` of seed or import data is present but isn't an array.
	#[error("roll log must be a sequence")]
	LogNotSequence,

	/// There was no data to import.
	#[error("no data to import")]
	NoImportData,

	/// The import data isn't in any recognised format.
	#[error("unrecognised import format for data: {0}")]
	UnrecognisedImportFormat(String),

	/// The export format name isn't known.
	#[error("unrecognised export format: {0}")]
	UnrecognisedExportFormat(String),

	/// The export format is known, but exporting to it isn't supported.
	#[error("export format {0} is not implemented")]
	UnimplementedExportFormat(ExportFormat),

	/// Rolling or importing a notation failed.
	#[error(transparent)]
	Dice(#[from] dice::Error),

	/// JSON text couldn't be produced or parsed.
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
