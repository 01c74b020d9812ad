use clap::Parser;

use crate::extract::FetchOptions;

#[derive(Debug, Parser)]
#[command(version, about = "Fetch a web page and extract structured fields from its markup", long_about = None)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "PAGE_FETCH_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "PAGE_FETCH_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Accept invalid TLS certificates from fetched sites
    #[arg(long, env = "PAGE_FETCH_INSECURE_TLS")]
    pub insecure_tls: bool,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            insecure_tls: self.insecure_tls,
        }
    }
}
