pub mod booking;
pub mod notifier;
