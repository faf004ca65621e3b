mod alert;
mod notification;

pub use alert::{AlertSeverity, TrafficAlert, UrgentReportAlert, WeatherAlert};
pub use notification::{
    BatchItem, BatchItemResult, BatchSummary, NotificationMessage, SubscriptionPreferences,
};
