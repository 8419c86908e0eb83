use async_trait::async_trait;
use nebulagen::topology::TopologyDocument;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::OpenStackCredentials;
use crate::error::{FetcherError, Result};
use crate::models::{
    CatalogEntry, ImageDto, ImagePage, KeypairDto, KeypairPage, Page, ServerDto, ServerPage,
    SnapshotDto, SnapshotPage, TokenResponse, VolumeDto, VolumePage,
};

const TOKEN_HEADER: &str = "X-Auth-Token";
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const PAGE_LIMIT: usize = 1000;

const IMAGE_SERVICE: &[&str] = &["image"];
const COMPUTE_SERVICE: &[&str] = &["compute"];
const VOLUME_SERVICE: &[&str] = &["volumev3", "block-storage"];
const RCA_SERVICE: &[&str] = &["rca"];

/// The OpenStack calls the graph needs, as a seam for fixtures and tests.
#[async_trait]
pub trait CloudService: Send + Sync {
    async fn list_images(&self) -> Result<Vec<ImageDto>>;

    async fn list_keypairs(&self) -> Result<Vec<KeypairDto>>;

    /// Volumes of all tenants.
    async fn list_volumes(&self) -> Result<Vec<VolumeDto>>;

    async fn list_volume_snapshots(&self) -> Result<Vec<SnapshotDto>>;

    async fn list_servers(&self) -> Result<Vec<ServerDto>>;

    /// Vitrage entity graph of all tenants.
    async fn topology(&self) -> Result<TopologyDocument>;
}

/// `CloudService` backed by the live REST APIs, authenticated with a
/// Keystone v3 project-scoped token.
pub struct OpenStackService {
    http: reqwest::Client,
    token: HeaderValue,
    catalog: Vec<CatalogEntry>,
    interface: String,
    region: Option<String>,
}

impl OpenStackService {
    pub async fn connect(credentials: &OpenStackCredentials) -> Result<Self> {
        let http = reqwest::Client::new();
        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": credentials.username,
                            "domain": { "id": credentials.user_domain_id },
                            "password": credentials.password,
                        }
                    }
                },
                "scope": {
                    "project": {
                        "name": credentials.project_name,
                        "domain": { "id": credentials.project_domain_id },
                    }
                }
            }
        });

        let url = credentials.token_url();
        log::info!("Authenticating against {}", url);
        let response = http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(FetcherError::Auth(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .cloned()
            .ok_or_else(|| FetcherError::Auth("response carried no token".into()))?;
        let issued: TokenResponse = response.json().await?;
        log::debug!("Service catalog has {} entries", issued.token.catalog.len());

        Ok(Self {
            http,
            token,
            catalog: issued.token.catalog,
            interface: credentials.interface.clone(),
            region: credentials.region_name.clone(),
        })
    }

    fn endpoint(&self, service_types: &[&str]) -> Result<String> {
        catalog_url(
            &self.catalog,
            service_types,
            &self.interface,
            self.region.as_deref(),
        )
        .ok_or_else(|| FetcherError::MissingEndpoint(service_types.join("/")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, self.token.clone())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetcherError::Api(format!(
                "GET {} returned HTTP {}: {}",
                url,
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }
        Ok(response.json().await?)
    }

    /// Follows `next` links from `first` until a page has none.
    async fn collect_pages<P>(&self, root: &str, first: String) -> Result<Vec<P::Item>>
    where
        P: Page + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            let page: P = self.get_json(&url).await?;
            let (batch, link) = page.into_parts();
            let exhausted = batch.is_empty();
            items.extend(batch);
            next = link
                .map(|link| absolute_url(root, &link))
                .filter(|link| *link != url && !exhausted);
        }
        Ok(items)
    }
}

#[async_trait]
impl CloudService for OpenStackService {
    async fn list_images(&self) -> Result<Vec<ImageDto>> {
        let root = self.endpoint(IMAGE_SERVICE)?;
        let first = format!("{}/v2/images?limit={}", root, PAGE_LIMIT);
        self.collect_pages::<ImagePage>(&root, first).await
    }

    async fn list_keypairs(&self) -> Result<Vec<KeypairDto>> {
        let root = self.endpoint(COMPUTE_SERVICE)?;
        let first = format!("{}/os-keypairs", root);
        self.collect_pages::<KeypairPage>(&root, first).await
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeDto>> {
        let root = self.endpoint(VOLUME_SERVICE)?;
        let first = format!("{}/volumes/detail?all_tenants=1&limit={}", root, PAGE_LIMIT);
        self.collect_pages::<VolumePage>(&root, first).await
    }

    async fn list_volume_snapshots(&self) -> Result<Vec<SnapshotDto>> {
        let root = self.endpoint(VOLUME_SERVICE)?;
        let first = format!("{}/snapshots/detail?limit={}", root, PAGE_LIMIT);
        self.collect_pages::<SnapshotPage>(&root, first).await
    }

    async fn list_servers(&self) -> Result<Vec<ServerDto>> {
        let root = self.endpoint(COMPUTE_SERVICE)?;
        let first = format!("{}/servers/detail?limit={}", root, PAGE_LIMIT);
        self.collect_pages::<ServerPage>(&root, first).await
    }

    async fn topology(&self) -> Result<TopologyDocument> {
        let root = self.endpoint(RCA_SERVICE)?;
        let url = format!("{}/v1/topology/", root);
        let body = json!({ "graph_type": "graph", "all_tenants": true });

        log::debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .header(TOKEN_HEADER, self.token.clone())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetcherError::Api(format!(
                "POST {} returned HTTP {}: {}",
                url,
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }
        Ok(response.json().await?)
    }
}

/// Picks the endpoint URL for the first matching service type, honouring the
/// interface and, when set, the region.
pub fn catalog_url(
    catalog: &[CatalogEntry],
    service_types: &[&str],
    interface: &str,
    region: Option<&str>,
) -> Option<String> {
    service_types.iter().find_map(|service_type| {
        catalog
            .iter()
            .filter(|entry| entry.service_type == *service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .find(|endpoint| {
                endpoint.interface == interface
                    && region.map_or(true, |region| {
                        endpoint.region_id.as_deref() == Some(region)
                            || endpoint.region.as_deref() == Some(region)
                    })
            })
            .map(|endpoint| endpoint.url.trim_end_matches('/').to_string())
    })
}

/// Resolves a pagination link; Glance returns paths relative to the endpoint root.
pub fn absolute_url(root: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!(
            "{}/{}",
            root.trim_end_matches('/'),
            link.trim_start_matches('/')
        )
    }
}
