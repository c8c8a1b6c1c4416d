//! Working memory - the facts the rule engine reasons over.
//!
//! Working memory consists of:
//! - **Facts**: immutable, content-keyed records from a closed set of kinds
//! - **Fields and values**: the uniform view conditions match against
//! - **Fact store**: the set of asserted facts, indexed by field

mod fact;
mod store;

pub use fact::*;
pub use store::*;
