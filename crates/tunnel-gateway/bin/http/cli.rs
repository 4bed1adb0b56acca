use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "TUNNEL_GATEWAY_LISTEN_ADDR";
pub const LOG_PATH_ENV: &str = "TUNNEL_GATEWAY_LOG_PATH";
pub const BASE_URL_ENV: &str = "TUNNEL_GATEWAY_BASE_URL";
pub const CODE_LENGTH_ENV: &str = "TUNNEL_GATEWAY_CODE_LENGTH";
pub const FSYNC_ENV: &str = "TUNNEL_GATEWAY_FSYNC";
pub const LOG_FORMAT_ENV: &str = "TUNNEL_GATEWAY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG_PATH: &str = "data/links.log";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CODE_LENGTH: &str = "8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tunnel-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Append-only link log; parent directories are created on startup.
    #[arg(long, env = LOG_PATH_ENV, default_value = DEFAULT_LOG_PATH)]
    pub log_path: PathBuf,

    /// Public URL prefix used to build short links.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Length of generated codes.
    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value = DEFAULT_CODE_LENGTH,
        value_parser = clap::value_parser!(u8).range(4..=12),
    )]
    pub code_length: u8,

    /// fdatasync the link log after every append.
    #[arg(long, env = FSYNC_ENV)]
    pub fsync: bool,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,
}
