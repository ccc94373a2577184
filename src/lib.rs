pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod logging;
pub mod model;
pub mod table;
pub mod transform;
