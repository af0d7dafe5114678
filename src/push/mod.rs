//! Push-notification gateway client (legacy FCM send API)

pub mod gateway;

pub use gateway::{high_ph_body, FcmClient, PushError, PushGateway, PushMessage, HIGH_PH_TITLE};
