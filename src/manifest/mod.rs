use std::path::Path;

use log::{debug, info, warn};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use crate::error::{ManifestError, RunError};

pub mod models;

pub use models::{Link, Links, ManifestRecord, ManifestSet, Platform};

/// Name given to the single entry of an `ApiLinks` document, which never carries one.
pub const API_MANIFEST_NAME: &str = "Modding API";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentShape {
    /// `<ModLinks>` root with any number of named manifests.
    Distribution,
    /// `<ApiLinks>` root wrapping exactly one unnamed manifest.
    Api,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "Manifest", default)]
    manifests: Vec<RawManifest>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Link")]
    link: Option<RawLink>,
    #[serde(rename = "Links")]
    links: Option<RawLinks>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Dependencies")]
    dependencies: Option<RawDependencies>,
}

#[derive(Debug, Deserialize)]
struct RawLinks {
    #[serde(rename = "Windows")]
    windows: Option<RawLink>,
    #[serde(rename = "Mac")]
    mac: Option<RawLink>,
    #[serde(rename = "Linux")]
    linux: Option<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(rename = "@SHA256")]
    sha256: Option<String>,
    #[serde(rename = "$text", default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawDependencies {
    #[serde(rename = "Dependency", default)]
    items: Vec<String>,
}

/// Read and parse a manifest document from disk.
pub async fn load_file(path: &Path) -> Result<ManifestSet, RunError> {
    let xml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RunError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let set = parse_document(&xml).map_err(|source| RunError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    if set.is_empty() {
        warn!("loader: no manifests in {}", path.display());
    } else {
        info!("loader: {} manifests in {}", set.len(), path.display());
    }
    Ok(set)
}

/// Parse either document shape into a manifest set, keeping document order.
pub fn parse_document(xml: &str) -> Result<ManifestSet, ManifestError> {
    let xml = xml.trim_start_matches('\u{feff}');
    let shape = detect_shape(xml)?;
    let document: RawDocument = quick_xml::de::from_str(xml)?;
    debug!(
        "loader: {:?} document with {} manifest elements",
        shape,
        document.manifests.len()
    );

    match shape {
        DocumentShape::Api => {
            let count = document.manifests.len();
            let mut manifests = document.manifests.into_iter();
            match (manifests.next(), manifests.next()) {
                (Some(raw), None) => {
                    let record = into_record(raw, Some(API_MANIFEST_NAME))?;
                    ManifestSet::from_records([record])
                }
                _ => Err(ManifestError::ApiManifestCount { count }),
            }
        }
        DocumentShape::Distribution => {
            let records = document
                .manifests
                .into_iter()
                .map(|raw| into_record(raw, None))
                .collect::<Result<Vec<_>, _>>()?;
            ManifestSet::from_records(records)
        }
    }
}

/// Classify a document by its root element.
pub fn detect_shape(xml: &str) -> Result<DocumentShape, ManifestError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(root) | Event::Empty(root) => {
                let shape = if root.local_name().as_ref() == b"ApiLinks" {
                    DocumentShape::Api
                } else {
                    DocumentShape::Distribution
                };
                return Ok(shape);
            }
            Event::Eof => return Err(ManifestError::MissingRoot),
            _ => {}
        }
    }
}

fn into_record(
    raw: RawManifest,
    forced_name: Option<&str>,
) -> Result<ManifestRecord, ManifestError> {
    let name = match forced_name {
        Some(name) => name.to_owned(),
        None => raw
            .name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| API_MANIFEST_NAME.to_owned()),
    };

    let links = match (raw.link, raw.links) {
        (Some(link), None) => Links::single(into_link(link, &name)?),
        (None, Some(group)) => into_links(group, &name)?,
        (Some(_), Some(_)) => return Err(ManifestError::AmbiguousLinks { name }),
        (None, None) => return Err(ManifestError::MissingLinks { name }),
    };

    Ok(ManifestRecord {
        name,
        links,
        description: raw.description,
        dependencies: raw.dependencies.map(|deps| deps.items),
    })
}

fn into_links(group: RawLinks, name: &str) -> Result<Links, ManifestError> {
    let Some(windows) = group.windows else {
        if group.mac.is_none() && group.linux.is_none() {
            return Err(ManifestError::MissingLinks { name: name.to_owned() });
        }
        return Err(ManifestError::MissingPrimaryLink { name: name.to_owned() });
    };
    let mac = group.mac.map(|link| into_link(link, name)).transpose()?;
    let linux = group.linux.map(|link| into_link(link, name)).transpose()?;
    Ok(Links::new(into_link(windows, name)?, mac, linux))
}

fn into_link(raw: RawLink, name: &str) -> Result<Link, ManifestError> {
    let digest = raw
        .sha256
        .filter(|digest| !digest.trim().is_empty())
        .ok_or_else(|| ManifestError::MissingDigest { name: name.to_owned() })?;
    if raw.url.trim().is_empty() {
        return Err(ManifestError::MissingLocator { name: name.to_owned() });
    }
    Ok(Link::new(digest, raw.url))
}
