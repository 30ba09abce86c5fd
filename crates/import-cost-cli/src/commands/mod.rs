pub mod scenarios;
pub mod simulate;
