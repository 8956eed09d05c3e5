mod grammar;
mod notation;
mod strategies;
mod util;
