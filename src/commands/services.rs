//! Service factory for building command dependencies.
//!
//! Services (HTTP client, package index) are built from configuration
//! values but are not part of the configuration itself.

use anyhow::Result;
use reqwest::Client;

use crate::{http::HttpClient, index::PyPiIndex};

use super::config::Config;

pub const USER_AGENT: &str = "piton-cli";

pub fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    Ok(HttpClient::new(client))
}

/// Build the package index client from configuration
pub fn build_index(config: &Config) -> Result<PyPiIndex> {
    Ok(PyPiIndex::from_http_client(
        build_http_client()?,
        &config.index_url,
    ))
}
