pub mod filter;
pub mod interpolate;
pub mod process;
pub mod track;
pub mod tracker;
