//! PyPI JSON API implementation of [`PackageIndex`].

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use reqwest::Client;

use crate::http::{HttpClient, NonRetryableError};

use super::{Lookup, PackageIndex, VersionRecord};

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// PyPI JSON API response types (internal).
mod api {
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize, Debug)]
    pub struct Project {
        #[serde(default)]
        pub releases: BTreeMap<String, Vec<ReleaseFile>>,
    }

    #[derive(Deserialize, Debug)]
    pub struct ReleaseFile {
        #[serde(default)]
        pub yanked: bool,
    }
}

/// PyPI (or any index serving the `/pypi/<name>/json` API).
pub struct PyPiIndex {
    http_client: HttpClient,
    index_url: String,
}

impl PyPiIndex {
    #[cfg(test)]
    pub fn new(client: Client) -> Self {
        Self::from_http_client(HttpClient::new(client), DEFAULT_INDEX_URL)
    }

    pub fn from_http_client(http_client: HttpClient, index_url: &str) -> Self {
        Self {
            http_client,
            index_url: index_url.trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, name: &str) -> String {
        format!("{}/pypi/{}/json", self.index_url, name)
    }
}

#[async_trait]
impl PackageIndex for PyPiIndex {
    #[tracing::instrument(skip(self))]
    async fn available_versions(&self, name: &str) -> Result<Lookup> {
        let url = self.project_url(name);
        debug!("Fetching versions of {} from {}...", name, url);

        let project: api::Project = match self.http_client.get_json(&url).await {
            Ok(project) => project,
            Err(e)
                if e.downcast_ref::<NonRetryableError>()
                    .is_some_and(NonRetryableError::is_not_found) =>
            {
                debug!("{} is not on the index", name);
                return Ok(Lookup::NotFound);
            }
            Err(e) => return Err(e),
        };

        let records = project
            .releases
            .into_iter()
            .map(|(version, files)| files_to_record(version, &files))
            .collect::<Vec<_>>();

        debug!("Found {} release(s) of {}", records.len(), name);
        Ok(Lookup::from_records(records))
    }
}

fn files_to_record(version: String, files: &[api::ReleaseFile]) -> VersionRecord {
    VersionRecord {
        version,
        yanked: !files.is_empty() && files.iter().all(|f| f.yanked),
    }
}
