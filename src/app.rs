//! Application calling convention.
//!
//! An [`Application`] is called with the request attributes and the response
//! bridge. It starts the response through [`Responder::start_response`], and
//! returns a [`Body`] which is then pumped through the same bridge.
//!
//! Applications are looked up by identifier through a [`Provider`].
use fnv::FnvHashMap;

use crate::body::{Body, BoxBody};
use crate::environ::Environ;
use crate::error::Failure;
use crate::response::Responder;

// ===== Application =====

/// A request handler.
pub trait Application {
    type Body: Body;

    /// Handle the request.
    ///
    /// # Errors
    ///
    /// Returning a failure aborts the request. If the response head was not
    /// flushed yet, nothing is written to the output.
    fn call(&self, environ: &mut Environ<'_>, start: &mut Responder<'_>)
        -> Result<Self::Body, Failure>;
}

/// Type erased [`Application`].
pub type BoxApplication = Box<dyn Application<Body = BoxBody>>;

impl<A: Application + ?Sized> Application for Box<A> {
    type Body = A::Body;

    #[inline]
    fn call(&self, environ: &mut Environ<'_>, start: &mut Responder<'_>) -> Result<A::Body, Failure> {
        (**self).call(environ, start)
    }
}

impl<A: Application + ?Sized> Application for &A {
    type Body = A::Body;

    #[inline]
    fn call(&self, environ: &mut Environ<'_>, start: &mut Responder<'_>) -> Result<A::Body, Failure> {
        (**self).call(environ, start)
    }
}

/// Erase the application type.
pub fn boxed<A>(app: A) -> BoxApplication
where
    A: Application + 'static,
    A::Body: 'static,
{
    Box::new(Boxed(app))
}

struct Boxed<A>(A);

impl<A> Application for Boxed<A>
where
    A: Application,
    A::Body: 'static,
{
    type Body = BoxBody;

    fn call(&self, environ: &mut Environ<'_>, start: &mut Responder<'_>) -> Result<BoxBody, Failure> {
        self.0.call(environ, start).map(Body::boxed)
    }
}

// ===== FromFn =====

/// Create [`Application`] from a function.
///
/// ```
/// use cgi_bridge::{app, body};
///
/// let app = app::from_fn(|_, start| {
///     start.start_response("200 OK", [("Content-Type", "text/plain")], None)?;
///     Ok(body::once(&b"Hello World"[..]))
/// });
/// # let _ = app;
/// ```
pub fn from_fn<F, B>(f: F) -> FromFn<F>
where
    F: Fn(&mut Environ<'_>, &mut Responder<'_>) -> Result<B, Failure>,
    B: Body,
{
    FromFn { f }
}

/// Application returned by [`from_fn`].
#[derive(Debug)]
pub struct FromFn<F> {
    f: F,
}

impl<F, B> Application for FromFn<F>
where
    F: Fn(&mut Environ<'_>, &mut Responder<'_>) -> Result<B, Failure>,
    B: Body,
{
    type Body = B;

    #[inline]
    fn call(&self, environ: &mut Environ<'_>, start: &mut Responder<'_>) -> Result<B, Failure> {
        (self.f)(environ, start)
    }
}

// ===== Provider =====

/// Looks up applications by identifier.
///
/// For the CGI entry points the identifier is the script file path.
pub trait Provider {
    /// Returns the application registered for `id`.
    fn provide(&self, id: &str) -> Option<&BoxApplication>;
}

/// In memory [`Provider`].
#[derive(Default)]
pub struct Registry {
    apps: FnvHashMap<String, BoxApplication>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register application for `id`, replacing any previous one.
    pub fn register<A>(&mut self, id: impl Into<String>, app: A) -> &mut Self
    where
        A: Application + 'static,
        A::Body: 'static,
    {
        self.apps.insert(id.into(), boxed(app));
        self
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl Provider for Registry {
    fn provide(&self, id: &str) -> Option<&BoxApplication> {
        self.apps.get(id)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.apps.keys()).finish()
    }
}
