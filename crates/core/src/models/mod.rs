pub mod calculator;
pub mod entry;
pub mod investor;
pub mod ledger;
pub mod series;
pub mod session;
pub mod settings;
