use std::{env, io};

use dice_log::{DiceRoller, ExportFormat};
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(io::stderr)
		.init();

	let args = env::args();
	let notations = if args.len() > 1 {
		// Each argument is its own notation. The first argument is ignored since it is typically the name of the
		// executable itself.
		args.skip(1).collect::<Vec<String>>()
	} else {
		// Grab the first line available from stdin
		match io::stdin().lines().next() {
			Some(Ok(line)) => line.split_whitespace().map(str::to_owned).collect(),
			Some(Err(err)) => {
				eprintln!("Unable to read stdin: {err}");
				return;
			}
			None => Vec::new(),
		}
	};

	if notations.is_empty() {
		eprintln!("No dice notations given");
		return;
	}

	let mut roller = DiceRoller::new();
	for notation in &notations {
		match roller.roll(notation) {
			Ok(roll) => println!("{roll}"),
			Err(err) => eprintln!("Roll error: {err}"),
		}
	}

	println!();
	println!("Log: {roller}");
	match roller.export(ExportFormat::Base64) {
		Ok(exported) => println!("Export: {exported}"),
		Err(err) => eprintln!("Export error: {err}"),
	}
}
