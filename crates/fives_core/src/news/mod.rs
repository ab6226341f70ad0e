//! Club news feed

mod generator;

pub use generator::NewsGenerator;
