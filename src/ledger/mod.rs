pub mod aggregator;
pub mod bankroll;
pub mod cascade;
pub mod entry;
pub mod makeup_tracker;
pub mod mutation;
pub mod result_calculator;
pub mod transaction;
