pub mod cors;
pub mod rate_limit;
pub mod security_headers;

pub use cors::{answer_options, cors_layer};
pub use rate_limit::rate_limit;
pub use security_headers::add_security_headers;
