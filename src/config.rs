//! Process configuration, sourced from the environment.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "sqlite:gazette.db";

/// Runtime configuration.
///
/// Read once at startup via [`Config::from_env`]:
///
/// - `PORT` — listen port (default 3000, bound on `0.0.0.0`).
/// - `DATABASE_URL` — sqlx connection string (default `sqlite:gazette.db`,
///   created on first run).
/// - `GAZETTE_PATCH_MERGE` — set to `1`/`true` to let a PATCH carrying both
///   `title` and `content` update both, instead of the compatibility
///   behavior where the title rename wins and content is dropped.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub patch_merges_content: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid PORT: {raw:?}")))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let patch_merges_content = env::var("GAZETTE_PATCH_MERGE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
            database_url,
            patch_merges_content,
        })
    }
}
