pub mod message;
pub mod notification_headers;
