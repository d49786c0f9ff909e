//! Record normalization
//!
//! Every record is passed through [`normalize`] before it is emitted:
//!
//! 1. keys are rewritten to snake_case, recursively ([`rewrite_keys`])
//! 2. nested mappings are hoisted one level into compound keys ([`denest`])
//!
//! The order is fixed. Both steps are total; any JSON value is accepted.
//!
//! ```rust,ignore
//! let record = json!({"lastModified": 1, "customer": {"$uri": "c/1", "firstName": "Ann"}});
//! assert_eq!(
//!     normalize(record),
//!     json!({"last_modified": 1, "customer_uri": "c/1", "customer_first_name": "Ann"})
//! );
//! ```

mod denest;
mod keys;

pub use denest::denest;
pub use keys::{convert_key, rewrite_keys};

use crate::types::JsonValue;

/// Rewrite keys, then denest one level
pub fn normalize(value: JsonValue) -> JsonValue {
    denest(rewrite_keys(value))
}
