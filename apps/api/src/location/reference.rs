use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use super::filters::{filter_amphures_by_province, filter_tambons_by_amphure, zip_code_from_tambon};
use super::models::{find_by_name, Amphure, Province, Tambon};

pub const PROVINCES_FILE: &str = "provinces.json";
pub const AMPHURES_FILE: &str = "amphures.json";
pub const TAMBONS_FILE: &str = "tambons.json";

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} contains no records", .0.display())]
    Empty(PathBuf),
}

/// The three immutable administrative tables, loaded once per process.
///
/// `revision` identifies this particular table set. Two bundles built from the
/// same files still get distinct revisions, which is what the profile loader
/// keys its at-most-once fetch on.
#[derive(Debug)]
pub struct ReferenceData {
    pub provinces: Vec<Province>,
    pub amphures: Vec<Amphure>,
    pub tambons: Vec<Tambon>,
    revision: u64,
}

impl ReferenceData {
    pub fn from_tables(provinces: Vec<Province>, amphures: Vec<Amphure>, tambons: Vec<Tambon>) -> Self {
        Self {
            provinces,
            amphures,
            tambons,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Loads `provinces.json`, `amphures.json` and `tambons.json` from `dir`.
    /// Each file must hold a non-empty JSON array.
    pub fn load_dir(dir: &Path) -> Result<Self, ReferenceDataError> {
        let provinces: Vec<Province> = read_table(&dir.join(PROVINCES_FILE))?;
        let amphures: Vec<Amphure> = read_table(&dir.join(AMPHURES_FILE))?;
        let tambons: Vec<Tambon> = read_table(&dir.join(TAMBONS_FILE))?;

        info!(
            "Loaded reference data from {}: {} provinces, {} amphures, {} tambons",
            dir.display(),
            provinces.len(),
            amphures.len(),
            tambons.len()
        );

        Ok(Self::from_tables(provinces, amphures, tambons))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True once every table holds at least one record.
    pub fn is_ready(&self) -> bool {
        !self.provinces.is_empty() && !self.amphures.is_empty() && !self.tambons.is_empty()
    }

    pub fn province(&self, name: &str) -> Option<&Province> {
        find_by_name(&self.provinces, name)
    }

    pub fn amphures_of(&self, province_name: &str) -> Vec<&Amphure> {
        filter_amphures_by_province(&self.amphures, &self.provinces, province_name)
    }

    pub fn tambons_of(&self, amphure_name: &str) -> Vec<&Tambon> {
        filter_tambons_by_amphure(&self.tambons, &self.amphures, amphure_name)
    }

    /// The district named `amphure_name` among the children of `province_name`.
    pub fn amphure_in(&self, province_name: &str, amphure_name: &str) -> Option<&Amphure> {
        self.amphures_of(province_name)
            .into_iter()
            .find(|a| a.name_th == amphure_name)
    }

    /// Subdistricts of a district, with the district resolved inside its
    /// province. District names repeat across provinces, so children are
    /// matched on the resolved district's id.
    pub fn tambons_in(&self, province_name: &str, amphure_name: &str) -> Vec<&Tambon> {
        match self.amphure_in(province_name, amphure_name) {
            Some(amphure) => self
                .tambons
                .iter()
                .filter(|t| t.amphure_id == amphure.id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Zip code for a subdistrict of the selected province and district, or `""`.
    pub fn resolve_zip_code(&self, province_name: &str, amphure_name: &str, tambon_name: &str) -> String {
        let scoped = self.tambons_in(province_name, amphure_name);
        zip_code_from_tambon(&self.tambons, tambon_name, &scoped)
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ReferenceDataError> {
    let raw = fs::read_to_string(path).map_err(|source| ReferenceDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<T> = serde_json::from_str(&raw).map_err(|source| ReferenceDataError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if rows.is_empty() {
        return Err(ReferenceDataError::Empty(path.to_path_buf()));
    }
    Ok(rows)
}
