pub mod fee_schedule;
pub mod loader;

pub use fee_schedule::FeeScheduleStore;
