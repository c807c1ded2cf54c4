//! Test infrastructure for external services
//!
//! Only Redis needs a harness: a real server when one is reachable, with
//! tests skipping themselves otherwise.


pub use self::redis::*;
