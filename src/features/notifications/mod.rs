//! Push notification dispatch.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/notifications/send` | Send to explicit device tokens |
//! | POST | `/api/notifications/batch` | Mixed token/topic batch |
//! | POST | `/api/notifications/subscriptions` | Subscribe a device by preferences |
//! | DELETE | `/api/notifications/subscriptions` | Unsubscribe a device from topics |
//! | POST | `/api/notifications/alerts/traffic` | Traffic alert |
//! | POST | `/api/notifications/alerts/weather` | Weather alert |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{NotificationDispatcher, NotificationError};
