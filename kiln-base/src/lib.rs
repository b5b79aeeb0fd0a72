//! Lowest level crate of `kiln`. Hashable float wrappers used to key pipeline
//! and sampler state caches.

mod decimal;
pub use decimal::DecimalF32;
pub use decimal::DecimalF64;
