//! CGI Application Bridge
//!
//! Runs an [`Application`] inside a process-per-request CGI environment.
//!
//! - [`Responder`] response bridge, validates headers and enforces the
//!   declared `Content-Length`
//! - [`body::pump`] drives the application body through the bridge
//! - [`resolve()`] maps a redirected subrequest path to an existing script
//! - [`cgi`] process entry points
//!
//! # Usage
//!
//! ```no_run
//! use cgi_bridge::{app, body, cgi, Config};
//!
//! let app = app::from_fn(|environ, start| {
//!     let scheme = environ.url_scheme().to_owned();
//!     start.start_response("200 OK", [("Content-Type", "text/plain")], None)?;
//!     Ok(body::once(scheme.into_bytes()))
//! });
//!
//! cgi::run(&app, &Config::from_env()).unwrap();
//! ```
#![warn(missing_debug_implementations)]

mod log;

pub mod error;
pub mod value;
pub mod headers;
pub mod body;
pub mod response;
pub mod environ;
pub mod app;
pub mod resolve;
pub mod config;
pub mod cgi;

pub use app::{Application, Provider, Registry};
pub use body::Body;
pub use config::Config;
pub use environ::Environ;
pub use error::{Error, ErrorKind, Failure, Result};
pub use headers::Header;
pub use resolve::{PathSegments, resolve};
pub use response::{Responder, Writer};
pub use value::Value;
