use std::collections::HashMap;
use std::fmt;

use crate::error::ManifestError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Mac,
    Linux,
}

impl Platform {
    /// The slot a legacy single `<Link>` is stored in.
    pub const PRIMARY: Platform = Platform::Windows;

    pub fn label(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Mac => "Mac",
            Platform::Linux => "Linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A declared SHA256 digest and the URL it should hash to.
#[derive(Clone, Debug)]
pub struct Link {
    digest: String,
    locator: String,
}

impl Link {
    pub fn new(digest: impl AsRef<str>, locator: impl AsRef<str>) -> Self {
        Self {
            digest: digest.as_ref().trim().to_owned(),
            locator: locator.as_ref().trim().to_owned(),
        }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    #[must_use]
    pub fn matches_digest(&self, actual: &str) -> bool {
        self.digest.eq_ignore_ascii_case(actual.trim())
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.digest.eq_ignore_ascii_case(&other.digest)
            && self.locator.trim() == other.locator.trim()
    }
}

impl Eq for Link {}

/// Platform-keyed links of one manifest. The primary slot is always populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Links {
    primary: Link,
    mac: Option<Link>,
    linux: Option<Link>,
}

impl Links {
    pub fn single(link: Link) -> Self {
        Self {
            primary: link,
            mac: None,
            linux: None,
        }
    }

    pub fn new(windows: Link, mac: Option<Link>, linux: Option<Link>) -> Self {
        Self {
            primary: windows,
            mac,
            linux,
        }
    }

    #[allow(dead_code)]
    pub fn primary(&self) -> &Link {
        &self.primary
    }

    pub fn get(&self, platform: Platform) -> Option<&Link> {
        match platform {
            Platform::Windows => Some(&self.primary),
            Platform::Mac => self.mac.as_ref(),
            Platform::Linux => self.linux.as_ref(),
        }
    }

    /// Present links in Windows, Mac, Linux order.
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &Link)> + '_ {
        [Platform::PRIMARY, Platform::Mac, Platform::Linux]
            .into_iter()
            .filter_map(move |platform| self.get(platform).map(|link| (platform, link)))
    }

    /// Number of populated platform slots, at least one.
    pub fn count(&self) -> usize {
        1 + usize::from(self.mac.is_some()) + usize::from(self.linux.is_some())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestRecord {
    pub name: String,
    pub links: Links,
    pub description: Option<String>,
    pub dependencies: Option<Vec<String>>,
}

impl ManifestRecord {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, links: Links) -> Self {
        Self {
            name: name.into(),
            links,
            description: None,
            dependencies: None,
        }
    }
}

/// Records of one document, in document order, indexed by name.
#[derive(Clone, Debug, Default)]
pub struct ManifestSet {
    records: Vec<ManifestRecord>,
    index: HashMap<String, usize>,
}

impl ManifestSet {
    pub fn from_records(
        records: impl IntoIterator<Item = ManifestRecord>,
    ) -> Result<Self, ManifestError> {
        let mut set = Self::default();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    fn insert(&mut self, record: ManifestRecord) -> Result<(), ManifestError> {
        if self.index.contains_key(&record.name) {
            return Err(ManifestError::DuplicateName { name: record.name });
        }
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ManifestRecord> {
        self.index.get(name).map(|&pos| &self.records[pos])
    }

    pub fn links(&self, name: &str) -> Option<&Links> {
        self.get(name).map(|record| &record.links)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestRecord> + '_ {
        self.records.iter()
    }

    #[allow(dead_code)]
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|record| record.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
