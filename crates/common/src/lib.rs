pub mod config;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "storage")]
pub mod storage;
