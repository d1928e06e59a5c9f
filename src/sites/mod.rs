pub mod error;
pub mod geospatial;
pub mod metadata;
pub mod store;
