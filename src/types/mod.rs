//! Public types shared across the proxy, policy and stores.

mod tag;

pub use tag::TagSet;
