//! CGI host.
//!
//! Entry points of a CGI process. The process environment becomes the
//! request attributes, standard input the request body, standard output the
//! response, and standard error the diagnostics stream.
//!
//! Standard output is only ever handed to the [`Responder`], so nothing in
//! the application can corrupt the response by writing to it directly.
use std::io::{self, Write};
use std::path::Path;

use crate::app::{Application, Provider};
use crate::body::pump;
use crate::config::Config;
use crate::environ::{Environ, keys};
use crate::error::{Error, Result};
use crate::log::{debug, error};
use crate::resolve::resolve;
use crate::response::Responder;

/// Handle one request with `app`, writing the response into `output`.
///
/// # Errors
///
/// Returns error if the application fails, or violates the response
/// protocol, or if writing the response fails.
pub fn handle_request<A>(app: &A, environ: &mut Environ<'_>, output: &mut dyn Write) -> Result<()>
where
    A: Application + ?Sized,
{
    let mut responder = Responder::new(output);
    let body = app.call(environ, &mut responder)?;
    pump(&mut responder, body)
}

/// Serve the application registered for `SCRIPT_FILENAME`.
///
/// # Errors
///
/// Returns [`Error::Host`] if `SCRIPT_FILENAME` is missing, [`Error::NotFound`]
/// if no application is registered for it, or any error of [`handle_request`].
pub fn serve_script<P>(provider: &P, environ: &mut Environ<'_>, output: &mut dyn Write) -> Result<()>
where
    P: Provider + ?Sized,
{
    let filename = environ
        .get_str(keys::SCRIPT_FILENAME)
        .ok_or_else(|| Error::Host(format!("{} is not set", keys::SCRIPT_FILENAME)))?
        .to_owned();

    let app = provider
        .provide(&filename)
        .ok_or_else(|| Error::NotFound(filename.clone().into()))?;

    debug!("serving script {filename}");
    handle_request(app, environ, output)
}

/// Serve a request redirected to the bridge by the web server.
///
/// `PATH_INFO` and `PATH_TRANSLATED` are resolved to an existing script file
/// and the remaining path info, `SCRIPT_NAME` and `PATH_INFO` are rewritten,
/// then the application registered for the script file is served.
///
/// # Errors
///
/// Returns [`Error::Host`] if `REDIRECT_HANDLER` does not match
/// [`Config::handler`] or a path variable is missing, [`Error::NotFound`] if
/// resolution fails or no application is registered, or any error of
/// [`handle_request`].
pub fn serve_redirect<P>(
    provider: &P,
    config: &Config,
    environ: &mut Environ<'_>,
    output: &mut dyn Write,
) -> Result<()>
where
    P: Provider + ?Sized,
{
    match environ.get_str(keys::REDIRECT_HANDLER) {
        Some(handler) if handler == config.handler => {}
        found => {
            return Err(Error::Host(format!(
                "{} is {found:?}, expected {:?}",
                keys::REDIRECT_HANDLER,
                config.handler
            )));
        }
    }

    let path_info = require(environ, keys::PATH_INFO)?;
    let translated = require(environ, keys::PATH_TRANSLATED)?;

    let segments = resolve(&path_info, Path::new(&translated))?;
    segments.apply(environ);

    let filename = segments.matched_prefix.to_string_lossy().into_owned();
    let app = provider
        .provide(&filename)
        .ok_or_else(|| Error::NotFound(segments.matched_prefix.clone()))?;

    debug!("serving redirected script {filename}, path info {:?}", segments.path_info);
    handle_request(app, environ, output)
}

fn require(environ: &Environ<'_>, key: &str) -> Result<String> {
    environ
        .get_str(key)
        .map(str::to_owned)
        .ok_or_else(|| Error::Host(format!("{key} is not set")))
}

// ===== Process entry points =====

/// Run `app` as a CGI process.
///
/// # Errors
///
/// See [`handle_request`].
pub fn run<A>(app: &A, config: &Config) -> Result<()>
where
    A: Application + ?Sized,
{
    with_process(config, |environ, output| handle_request(app, environ, output))
}

/// Run a CGI process serving the application registered for `SCRIPT_FILENAME`.
///
/// # Errors
///
/// See [`serve_script`].
pub fn run_script<P>(provider: &P, config: &Config) -> Result<()>
where
    P: Provider + ?Sized,
{
    with_process(config, |environ, output| serve_script(provider, environ, output))
}

/// Run a CGI process serving a redirected request.
///
/// # Errors
///
/// See [`serve_redirect`].
pub fn run_redirect<P>(provider: &P, config: &Config) -> Result<()>
where
    P: Provider + ?Sized,
{
    with_process(config, |environ, output| {
        serve_redirect(provider, config, environ, output)
    })
}

fn with_process<F>(config: &Config, f: F) -> Result<()>
where
    F: FnOnce(&mut Environ<'_>, &mut dyn Write) -> Result<()>,
{
    let mut environ = Environ::from_process();
    environ.prepare(io::stdin(), io::stderr(), config);

    let stdout = io::stdout();
    let mut output = stdout.lock();

    let result = f(&mut environ, &mut output);
    if let Err(err) = &result {
        error!("request failed: {err}");
    }
    result
}
