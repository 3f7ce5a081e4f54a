//! S3-compatible object store client
//!
//! Blocking client over `ureq`, using path-style addressing so a custom
//! endpoint (MinIO and friends) works unchanged. Existence checks use
//! ListObjectsV2 with the probe key as a prefix: the first listed key is
//! the matched object, which is how partial restore keys find the most
//! recent full key that extends them.

use crate::error::{CachePullError, CachePullResult};
use crate::store::sigv4::{self, RequestSigner, EMPTY_PAYLOAD_SHA256};
use crate::store::{ObjectId, ObjectStore};
use chrono::Utc;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings for an S3-compatible store.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Override for S3-compatible servers; defaults to AWS for `region`.
    pub endpoint: Option<String>,
}

impl S3Config {
    fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", self.region),
        }
    }
}

/// S3 implementation of [`ObjectStore`]
pub struct S3Store {
    agent: Agent,
    config: S3Config,
}

impl S3Store {
    pub fn new(config: S3Config) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();

        Self {
            agent: Agent::new_with_config(agent_config),
            config,
        }
    }

    fn host(&self) -> CachePullResult<String> {
        host_of(&self.config.endpoint_url())
    }

    fn signer(&self) -> RequestSigner<'_> {
        RequestSigner {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: &self.config.region,
            service: "s3",
        }
    }

    /// Signed GET against `canonical_uri` (+ optional canonical query).
    fn signed_get(
        &self,
        canonical_uri: &str,
        canonical_query: &str,
        context: &str,
    ) -> CachePullResult<ureq::http::Response<ureq::Body>> {
        let host = self.host()?;
        let now = Utc::now();
        let amz_date = sigv4::format_amz_date(now);
        let authorization = self.signer().authorization(
            "GET",
            canonical_uri,
            canonical_query,
            &[
                ("host", host.as_str()),
                ("x-amz-content-sha256", EMPTY_PAYLOAD_SHA256),
                ("x-amz-date", amz_date.as_str()),
            ],
            EMPTY_PAYLOAD_SHA256,
            now,
        );

        let mut url = format!("{}{}", self.config.endpoint_url(), canonical_uri);
        if !canonical_query.is_empty() {
            url.push('?');
            url.push_str(canonical_query);
        }
        debug!("GET {}", url);

        self.agent
            .get(&url)
            .header("x-amz-content-sha256", EMPTY_PAYLOAD_SHA256)
            .header("x-amz-date", &amz_date)
            .header("authorization", &authorization)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => CachePullError::StoreStatus {
                    context: context.to_string(),
                    status,
                },
                other => CachePullError::store_request(context, other),
            })
    }
}

impl ObjectStore for S3Store {
    fn exists(&self, key: &str) -> CachePullResult<Option<ObjectId>> {
        let canonical_uri = format!("/{}", self.config.bucket);
        let canonical_query = format!(
            "list-type=2&max-keys=1&prefix={}",
            sigv4::uri_encode(key, true)
        );

        let mut response = self.signed_get(
            &canonical_uri,
            &canonical_query,
            &format!("listing objects with prefix '{}'", key),
        )?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| CachePullError::store_request("reading listing response", e))?;

        Ok(first_listed_key(&body)?.map(ObjectId::new))
    }

    fn download(&self, id: &ObjectId, dest: &Path) -> CachePullResult<u64> {
        let canonical_uri = format!(
            "/{}/{}",
            self.config.bucket,
            sigv4::uri_encode(id.as_str(), false)
        );

        let mut response = self.signed_get(
            &canonical_uri,
            "",
            &format!("downloading object '{}'", id),
        )?;

        let mut file = File::create(dest)
            .map_err(|e| CachePullError::io(format!("creating {}", dest.display()), e))?;
        let size = std::io::copy(&mut response.body_mut().as_reader(), &mut file)
            .map_err(|e| CachePullError::io(format!("writing {}", dest.display()), e))?;

        Ok(size)
    }
}

fn host_of(endpoint: &str) -> CachePullResult<String> {
    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| CachePullError::EndpointInvalid {
            endpoint: endpoint.to_string(),
            reason: "missing http:// or https:// scheme".to_string(),
        })?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(CachePullError::EndpointInvalid {
            endpoint: endpoint.to_string(),
            reason: "empty host".to_string(),
        });
    }

    Ok(host.to_string())
}

/// Pull the first `<Key>` out of a ListObjectsV2 response.
///
/// The listing is requested with `max-keys=1`, so the first key is the
/// only one. An absent `<Contents>` block is a miss, not an error.
fn first_listed_key(xml: &str) -> CachePullResult<Option<String>> {
    let Some(start) = xml.find("<Key>") else {
        return Ok(None);
    };
    let after = &xml[start + "<Key>".len()..];
    let end = after
        .find("</Key>")
        .ok_or_else(|| CachePullError::ListingMalformed {
            reason: "unterminated <Key> element".to_string(),
        })?;

    Ok(Some(unescape_xml(&after[..end])))
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
