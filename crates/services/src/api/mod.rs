pub mod cache;
pub mod client;
pub mod endpoints;

pub use cache::{CacheStamp, CacheTag, QueryCache};
pub use client::ApiClient;
pub use endpoints::{ImportReport, LoginResponse, SignupRequest};
