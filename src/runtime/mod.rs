pub mod coerce;
pub mod evaluator;
pub mod value;
