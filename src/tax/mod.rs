//! Tax calculators. Everything in here is a pure function over static tables; nothing touches the
//! store or the network.

pub mod corporate;
pub mod ecommerce;
pub mod hkd;
pub mod pit;
pub mod quick;
pub mod roadmap;
