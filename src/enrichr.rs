use std::time::Duration;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::domain::Library;
use crate::error::OraError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Handle of a gene list stored by Enrichr.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserList {
    #[serde(rename = "userListId")]
    pub user_list_id: u64,
    #[serde(rename = "shortId")]
    pub short_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LibraryInfo {
    #[serde(rename = "libraryName")]
    pub name: String,
    #[serde(rename = "numTerms", default)]
    pub terms: Option<u64>,
    #[serde(rename = "geneCoverage", default)]
    pub gene_coverage: Option<u64>,
    #[serde(rename = "genesPerTerm", default)]
    pub genes_per_term: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DatasetStatistics {
    statistics: Vec<LibraryInfo>,
}

pub trait EnrichrClient: Send + Sync {
    fn add_list(&self, genes: &[String], description: &str) -> Result<UserList, OraError>;

    /// Raw tab-separated enrichment table of `list` against `library`.
    fn export(&self, list: &UserList, library: &Library) -> Result<String, OraError>;

    fn libraries(&self) -> Result<Vec<LibraryInfo>, OraError>;
}

#[derive(Clone)]
pub struct EnrichrHttpClient {
    client: Client,
    base_url: String,
}

impl EnrichrHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-ora/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| OraError::EnrichrHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| OraError::EnrichrHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn send_with_retries<F>(&self, mut make_req: F) -> Result<Response, OraError>
    where
        F: FnMut() -> RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 500;
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        tracing::debug!(status, attempt, "retrying Enrichr request");
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        std::thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        tracing::debug!(error = %err, attempt, "retrying Enrichr request");
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        std::thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(OraError::EnrichrHttp(err.to_string()));
                }
            }
        }
    }

    fn handle_status(response: Response) -> Result<Response, OraError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Enrichr request failed".to_string());
        Err(OraError::EnrichrStatus { status, message })
    }
}

impl EnrichrClient for EnrichrHttpClient {
    fn add_list(&self, genes: &[String], description: &str) -> Result<UserList, OraError> {
        let url = self.endpoint("addList");
        let payload = genes.join("\n");
        tracing::debug!(%url, genes = genes.len(), "submitting gene list");

        // a multipart Form is consumed by send(); rebuild it per attempt
        let response = self.send_with_retries(|| {
            let form = Form::new()
                .text("list", payload.clone())
                .text("description", description.to_string());
            self.client.post(&url).multipart(form)
        })?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| OraError::EnrichrHttp(err.to_string()))?;
        parse_user_list(&body)
    }

    fn export(&self, list: &UserList, library: &Library) -> Result<String, OraError> {
        let url = self.endpoint("export");
        let user_list_id = list.user_list_id.to_string();
        tracing::debug!(%url, %library, %user_list_id, "exporting enrichment table");

        let response = self.send_with_retries(|| {
            self.client.get(&url).query(&[
                ("userListId", user_list_id.as_str()),
                ("filename", "kira-ora"),
                ("backgroundType", library.as_str()),
            ])
        })?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| OraError::EnrichrHttp(err.to_string()))
    }

    fn libraries(&self) -> Result<Vec<LibraryInfo>, OraError> {
        let url = self.endpoint("datasetStatistics");
        tracing::debug!(%url, "listing gene-set libraries");

        let response = self.send_with_retries(|| self.client.get(&url))?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| OraError::EnrichrHttp(err.to_string()))?;
        parse_libraries(&body)
    }
}

pub fn parse_user_list(body: &str) -> Result<UserList, OraError> {
    serde_json::from_str(body).map_err(|err| OraError::EnrichrPayload(format!("addList: {err}")))
}

pub fn parse_libraries(body: &str) -> Result<Vec<LibraryInfo>, OraError> {
    let stats: DatasetStatistics = serde_json::from_str(body)
        .map_err(|err| OraError::EnrichrPayload(format!("datasetStatistics: {err}")))?;
    Ok(stats.statistics)
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_list_response() {
        let list = parse_user_list(r#"{"shortId": "3a1b7c", "userListId": 74319}"#).unwrap();
        assert_eq!(list.user_list_id, 74319);
        assert_eq!(list.short_id, "3a1b7c");
    }

    #[test]
    fn parse_add_list_rejects_html() {
        let err = parse_user_list("<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, OraError::EnrichrPayload(_)));
    }

    #[test]
    fn parse_dataset_statistics() {
        let body = r#"{"statistics": [
            {"libraryName": "KEGG_2021_Human", "numTerms": 320, "geneCoverage": 8078, "genesPerTerm": 84.3, "link": "https://www.kegg.jp/"},
            {"libraryName": "Reactome_2022"}
        ]}"#;
        let libraries = parse_libraries(body).unwrap();
        assert_eq!(libraries.len(), 2);
        assert_eq!(libraries[0].name, "KEGG_2021_Human");
        assert_eq!(libraries[0].terms, Some(320));
        assert_eq!(libraries[1].gene_coverage, None);
    }

    #[test]
    fn endpoints_ignore_trailing_slash() {
        let client = EnrichrHttpClient::new(
            "https://maayanlab.cloud/Enrichr/",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("addList"),
            "https://maayanlab.cloud/Enrichr/addList"
        );
    }
}
