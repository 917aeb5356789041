pub mod envelope;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod normalize;
pub mod sanitize;

pub use error::GatewayError;
pub use gateway::{GatewayConfig, SearchGateway};
pub use normalize::normalize;
pub use sanitize::{sanitize, sanitize_youtube_body, sanitizer_for, BodySanitizer, SanitizeOptions};
