//! Weathervane — a weather lookup proxy.
//!
//! Proxies `GET /weather` to an OpenWeatherMap-compatible provider,
//! choosing the response unit system from an explicit request header or a
//! remote feature-flag decision.

pub mod config;
pub mod flags;
pub mod server;
pub mod units;
pub mod weather;
