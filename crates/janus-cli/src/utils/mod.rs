pub mod report;
pub mod signal;
