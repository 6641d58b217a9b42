//! Ports for the consent contract.

pub mod inbound;
pub mod outbound;
