// Core modules implementing destination checks, field binding, and decoding.
pub mod capability;
pub mod error;
mod lazy_quote;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod shape;
