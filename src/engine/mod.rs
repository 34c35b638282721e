pub mod engine;
pub mod protocol;
pub mod ledger;

pub mod intent_parser;
pub mod cup_chart;
