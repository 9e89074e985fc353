//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the static handler: conditional-request
//! validation, Range parsing, and response builders. Nothing in here knows
//! about the asset store.

pub mod cache;
pub mod range;
pub mod response;

pub use range::{parse_range_header, RangeOutcome};
pub use response::{
    build_304_response, build_400_response, build_404_response, build_405_response,
    build_416_response, build_options_response,
};
