//! Application module containing the demo driver.

mod demo;

pub use demo::run_demo;
