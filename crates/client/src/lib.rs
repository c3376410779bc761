//! REST adapter and command-line front end for the dine-in ordering client.
//!
//! [`HttpBackend`] implements [`ordering::RestaurantBackend`] over the
//! restaurant's REST API, translating its wire format in [`wire`]. The `dine`
//! binary wires it to a file-backed session and the [`cli`] commands.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod wire;

pub use cli::{App, Cli, Command};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
