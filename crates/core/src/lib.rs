pub mod config;
pub mod response;
pub mod upload;

pub use config::Config;
pub use response::*;
pub use upload::*;
