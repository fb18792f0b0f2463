#![forbid(unsafe_code)]

pub mod countdown;
pub mod model;
pub mod routing;
pub mod time;
pub mod validation;

pub use countdown::Countdown;
pub use time::Clock;
