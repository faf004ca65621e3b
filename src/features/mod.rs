pub mod activity_logs;
pub mod notifications;
pub mod reports;
