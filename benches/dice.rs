#![feature(test)]

extern crate test;

use test::Bencher;

use dice_log::{
	dice::{roller::FastRand, DiceRoll},
	DiceRoller, ExportFormat,
};

#[bench]
fn roll_4d8(b: &mut Bencher) {
	let mut rng = FastRand::default();
	b.iter(|| DiceRoll::new("4d8", &mut rng).unwrap());
}

#[bench]
fn roll_8d6_exploding(b: &mut Bencher) {
	let mut rng = FastRand::default();
	b.iter(|| DiceRoll::new("8d6!", &mut rng).unwrap());
}

#[bench]
fn roll_100d20(b: &mut Bencher) {
	let mut rng = FastRand::default();
	b.iter(|| DiceRoll::new("100d20", &mut rng).unwrap());
}

#[bench]
fn roll_pool(b: &mut Bencher) {
	let mut rng = FastRand::default();
	b.iter(|| DiceRoll::new("20d10>=8+5d10>=8", &mut rng).unwrap());
}

#[bench]
fn log_export_import(b: &mut Bencher) {
	let mut roller = DiceRoller::new();
	roller.roll_many(&["4d6!!p>=5*2-L", "2d20+1d6", "4dF"]).unwrap();
	let exported = roller.export(ExportFormat::Base64).unwrap();
	b.iter(|| DiceRoller::from_import(exported.as_str()).unwrap());
}
