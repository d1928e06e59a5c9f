pub(crate) mod cache;
pub mod client;
pub mod climate;
pub mod filter;
pub mod snotel;
pub mod streamflow;
pub mod teleconnections;
