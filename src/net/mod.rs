//! Connection to the external lobby service

pub mod framing;
pub mod protocol;
pub mod transport;
