//! Request attributes.
use fnv::FnvHashMap;
use std::io::{self, Read, Write};

use crate::body::{DEFAULT_BLOCK_SIZE, FileWrapper};
use crate::config::Config;
use crate::log::trace;
use crate::value::Value;

/// Attribute keys.
pub mod keys {
    /// Bridge protocol version, a `(major, minor)` tuple.
    pub const VERSION: &str = "bridge.version";
    /// Always `false`, requests are handled by a single thread.
    pub const MULTITHREAD: &str = "bridge.multithread";
    /// Always `true`, each request runs in its own process.
    pub const MULTIPROCESS: &str = "bridge.multiprocess";
    /// Always `true`, no state survives between requests.
    pub const RUN_ONCE: &str = "bridge.run_once";
    /// `"https"` or `"http"`.
    pub const URL_SCHEME: &str = "bridge.url_scheme";
    /// Block size used by [`Environ::file_wrapper`].
    ///
    /// [`Environ::file_wrapper`]: super::Environ::file_wrapper
    pub const FILE_BLOCK_SIZE: &str = "bridge.file_wrapper.block_size";

    pub const HTTPS: &str = "HTTPS";
    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
    pub const PATH_INFO: &str = "PATH_INFO";
    pub const PATH_TRANSLATED: &str = "PATH_TRANSLATED";
    pub const QUERY_STRING: &str = "QUERY_STRING";
    pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
    pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
    pub const SCRIPT_FILENAME: &str = "SCRIPT_FILENAME";
    pub const REDIRECT_HANDLER: &str = "REDIRECT_HANDLER";
}

/// Bridge protocol version.
pub const VERSION: (i64, i64) = (1, 0);

/// Request attributes of the current request.
///
/// Holds the attribute mapping together with the request input stream and
/// the diagnostics stream. Owned by a single request and dropped at its end.
pub struct Environ<'a> {
    vars: FnvHashMap<String, Value>,
    input: Box<dyn Read + 'a>,
    errors: Box<dyn Write + 'a>,
}

impl Default for Environ<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Environ<'a> {
    /// Create empty attributes, with empty input and discarded errors.
    pub fn new() -> Self {
        Self {
            vars: FnvHashMap::default(),
            input: Box::new(io::empty()),
            errors: Box::new(io::sink()),
        }
    }

    /// Create attributes from string variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut environ = Self::new();
        environ.vars.extend(
            vars.into_iter()
                .map(|(k, v)| (k.into(), Value::Str(v.into()))),
        );
        environ
    }

    /// Create attributes from a copy of the process environment.
    ///
    /// Variables that are not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    /// Inject the bridge attributes and request streams.
    ///
    /// The `HTTPS` variable is consumed to derive [`keys::URL_SCHEME`].
    pub fn prepare<R, W>(&mut self, input: R, errors: W, config: &Config)
    where
        R: Read + 'a,
        W: Write + 'a,
    {
        self.input = Box::new(input);
        self.errors = Box::new(errors);

        self.insert(keys::VERSION, VERSION);
        self.insert(keys::MULTITHREAD, false);
        self.insert(keys::MULTIPROCESS, true);
        self.insert(keys::RUN_ONCE, true);

        let https = match self.remove(keys::HTTPS) {
            Some(Value::Str(value)) => value.eq_ignore_ascii_case("on") || value == "1",
            Some(Value::Bool(value)) => value,
            _ => false,
        };
        self.insert(keys::URL_SCHEME, if https { "https" } else { "http" });

        self.insert(
            keys::FILE_BLOCK_SIZE,
            i64::try_from(config.block_size).unwrap_or(i64::MAX),
        );

        trace!("request attributes prepared, {} entries", self.vars.len());
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Returns attribute as `str`, if present and a string.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(Value::as_str)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Insert attribute, returning the previous value.
    #[inline]
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.vars.insert(key.into(), value.into())
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.vars.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over attributes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Request body input.
    #[inline]
    pub fn input(&mut self) -> &mut (dyn Read + 'a) {
        &mut *self.input
    }

    /// Diagnostics output.
    #[inline]
    pub fn errors(&mut self) -> &mut (dyn Write + 'a) {
        &mut *self.errors
    }

    /// Returns the url scheme, `"http"` if not prepared.
    pub fn url_scheme(&self) -> &str {
        self.get_str(keys::URL_SCHEME).unwrap_or("http")
    }

    /// Wrap reader as a body producing fixed size chunks.
    pub fn file_wrapper<R: Read>(&self, reader: R) -> FileWrapper<R> {
        let block_size = match self.get(keys::FILE_BLOCK_SIZE) {
            Some(Value::Int(size)) => usize::try_from(*size).unwrap_or(DEFAULT_BLOCK_SIZE),
            _ => DEFAULT_BLOCK_SIZE,
        };
        FileWrapper::with_block_size(reader, block_size)
    }
}

impl std::fmt::Debug for Environ<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environ")
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn prepared(vars: &[(&str, &str)]) -> Environ<'static> {
        let mut environ = Environ::from_vars(vars.iter().copied());
        environ.prepare(io::empty(), io::sink(), &Config::default());
        environ
    }

    #[test]
    fn injects_bridge_attributes() {
        let environ = prepared(&[(keys::REQUEST_METHOD, "GET")]);

        assert_eq!(environ.get_str(keys::REQUEST_METHOD), Some("GET"));
        assert_eq!(environ.get(keys::VERSION), Some(&Value::from(VERSION)));
        assert_eq!(environ.get(keys::MULTITHREAD), Some(&Value::Bool(false)));
        assert_eq!(environ.get(keys::MULTIPROCESS), Some(&Value::Bool(true)));
        assert_eq!(environ.get(keys::RUN_ONCE), Some(&Value::Bool(true)));
        assert_eq!(environ.get(keys::FILE_BLOCK_SIZE), Some(&Value::Int(8192)));
    }

    #[test]
    fn url_scheme_from_https() {
        macro_rules! test {
            ($https:expr => $scheme:literal) => {
                let environ = prepared(&[(keys::HTTPS, $https)]);
                assert_eq!(environ.url_scheme(), $scheme);
                assert!(!environ.contains_key(keys::HTTPS));
            };
        }

        test!("on" => "https");
        test!("ON" => "https");
        test!("1" => "https");
        test!("off" => "http");
        test!("yes" => "http");

        let environ = prepared(&[]);
        assert_eq!(environ.url_scheme(), "http");
        assert_eq!(Environ::new().url_scheme(), "http");
    }

    #[test]
    fn streams_are_injected() {
        let mut errors = Vec::new();
        {
            let mut environ = Environ::new();
            environ.prepare(&b"name=value"[..], &mut errors, &Config::default());

            let mut body = String::new();
            environ.input().read_to_string(&mut body).unwrap();
            assert_eq!(body, "name=value");

            environ.errors().write_all(b"oops").unwrap();
        }
        assert_eq!(errors, b"oops");
    }

    #[test]
    fn file_wrapper_uses_configured_block_size() {
        let mut environ = Environ::new();
        let config = Config { block_size: 4, ..Config::default() };
        environ.prepare(io::empty(), io::sink(), &config);

        let wrapper = environ.file_wrapper(&b"0123456789"[..]);
        assert_eq!(wrapper.block_size(), 4);

        assert_eq!(Environ::new().file_wrapper(io::empty()).block_size(), DEFAULT_BLOCK_SIZE);
    }
}
