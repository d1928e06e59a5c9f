pub mod error;
pub mod projection;
pub mod selection;
pub mod station;
