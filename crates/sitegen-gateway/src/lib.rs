//! HTML generation gateways for sitegen.
//!
//! A gateway turns a section name and the current form values into a sanitized
//! HTML fragment. Failures are reported as [`GatewayError`] and kept distinct
//! from a successful call that produced nothing ([`Generated::Empty`]).

pub mod fixture;
pub mod http;
pub mod prompts;
pub mod sanitize;
pub mod traits;

pub use fixture::FixtureGateway;
pub use http::{GatewayConfig, HttpGateway};
pub use prompts::PromptSet;
pub use sanitize::sanitize_html;
pub use traits::{Gateway, GatewayError, Generated};
