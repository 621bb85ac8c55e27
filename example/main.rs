use std::io::Read;

use cgi_bridge::environ::keys;
use cgi_bridge::{Config, Failure, Registry, app, body, cgi};

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    // scripts are looked up by their path on disk
    let mut registry = Registry::new();
    registry.register("/var/www/cgi-bin/hello.cgi", app::from_fn(hello));
    registry.register("/var/www/cgi-bin/echo.cgi", app::from_fn(echo));
    registry.register("/var/www/cgi-bin/file.cgi", app::from_fn(file));

    let result = if std::env::var_os(keys::REDIRECT_HANDLER).is_some() {
        cgi::run_redirect(&registry, &config)
    } else if std::env::var_os(keys::SCRIPT_FILENAME).is_some() {
        cgi::run_script(&registry, &config)
    } else {
        cgi::run(&app::from_fn(hello), &config)
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn hello(
    environ: &mut cgi_bridge::Environ<'_>,
    start: &mut cgi_bridge::Responder<'_>,
) -> Result<body::Once<Vec<u8>>, Failure> {
    let body = format!(
        "Hello from {} over {}\n",
        environ.get_str(keys::SCRIPT_NAME).unwrap_or("/"),
        environ.url_scheme(),
    );
    let len = body.len().to_string();
    start.start_response(
        "200 OK",
        vec![("Content-Type", "text/plain".to_owned()), ("Content-Length", len)],
        None,
    )?;
    Ok(body::once(body.into_bytes()))
}

fn echo(
    environ: &mut cgi_bridge::Environ<'_>,
    start: &mut cgi_bridge::Responder<'_>,
) -> Result<body::Empty, Failure> {
    let mut input = Vec::new();
    environ.input().read_to_end(&mut input)?;

    let content_type = environ
        .get_str(keys::CONTENT_TYPE)
        .unwrap_or("application/octet-stream")
        .to_owned();

    let mut write = start.start_response("200 OK", vec![("Content-Type", content_type)], None)?;
    write.write(input)?;
    Ok(body::empty())
}

fn file(
    environ: &mut cgi_bridge::Environ<'_>,
    start: &mut cgi_bridge::Responder<'_>,
) -> Result<body::FileWrapper<std::fs::File>, Failure> {
    let path = environ.get_str(keys::PATH_TRANSLATED).unwrap_or("/etc/hostname");

    match std::fs::File::open(path) {
        Ok(file) => {
            start.start_response("200 OK", vec![("Content-Type", "text/plain")], None)?;
            Ok(environ.file_wrapper(file))
        }
        Err(err) => {
            log::warn!("cannot open {path}: {err}");
            Err(err.into())
        }
    }
}
