pub mod addresses;
pub mod config;
pub mod display;
pub mod routing;
pub mod session;
pub mod util;
