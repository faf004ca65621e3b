//! Push notification transport
//!
//! Delivers notifications to device tokens and topics through an HTTP push
//! gateway. Without a configured gateway, a logging transport is used so the
//! service still runs end to end.

mod http_transport;
mod log_transport;
#[cfg(test)]
mod recording;
mod transport;

pub use http_transport::HttpPushTransport;
pub use log_transport::LogPushTransport;
#[cfg(test)]
pub use recording::{RecordedPush, RecordingTransport};
pub use transport::{MulticastReceipt, PushError, PushMessage, PushTransport};
