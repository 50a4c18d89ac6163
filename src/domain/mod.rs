pub mod classifier;
pub mod logs;
pub mod report;
pub mod signature;
