//! Bridge configuration.
use crate::body::DEFAULT_BLOCK_SIZE;
use crate::log::warning;

/// Environment variable for [`Config::block_size`].
pub const BLOCK_SIZE_VAR: &str = "CGI_BRIDGE_BLOCK_SIZE";

/// Environment variable for [`Config::handler`].
pub const HANDLER_VAR: &str = "CGI_BRIDGE_HANDLER";

/// Default [`Config::handler`].
pub const DEFAULT_HANDLER: &str = "cgi-bridge";

/// Bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Chunk size of file wrappers created through the request attributes.
    pub block_size: usize,
    /// Expected value of `REDIRECT_HANDLER` for redirected subrequests.
    pub handler: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            handler: DEFAULT_HANDLER.to_owned(),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// Missing or invalid values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration using a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(BLOCK_SIZE_VAR) {
            match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.block_size = size,
                _ => {
                    warning!("invalid {BLOCK_SIZE_VAR} {value:?}, using {}", config.block_size);
                }
            }
        }

        if let Some(handler) = lookup(HANDLER_VAR) {
            if !handler.is_empty() {
                config.handler = handler;
            }
        }

        config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
        assert_eq!(Config::default().block_size, 8192);
        assert_eq!(Config::default().handler, "cgi-bridge");
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            (BLOCK_SIZE_VAR, " 1024 "),
            (HANDLER_VAR, "bridge"),
        ]));
        assert_eq!(config.block_size, 1024);
        assert_eq!(config.handler, "bridge");
    }

    #[test]
    fn invalid_falls_back() {
        let config = Config::from_lookup(lookup(&[(BLOCK_SIZE_VAR, "0"), (HANDLER_VAR, "")]));
        assert_eq!(config, Config::default());

        let config = Config::from_lookup(lookup(&[(BLOCK_SIZE_VAR, "lots")]));
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
    }
}
