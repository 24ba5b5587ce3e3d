//! Wire protocol: request bodies, reply structs, and their interpretation.

pub mod interpret;
pub mod models;
pub mod request;
