//! Authentication core
//!
//! Stateless token issuance/verification and password hashing. Nothing here
//! touches the network; the HTTP gate lives in `middleware::auth`.

pub mod password;
pub mod token;

pub use self::token::{Claims, Clock, FixedClock, SystemClock, TokenError, TokenService};
