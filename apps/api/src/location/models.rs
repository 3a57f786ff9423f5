use serde::{Deserialize, Serialize};

/// A changwat. `name_th` is the key the selector passes around.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Province {
    pub id: i64,
    pub name_th: String,
    pub name_en: String,
    pub geography_id: i64,
}

/// A district, owned by one province through `province_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amphure {
    pub id: i64,
    pub name_th: String,
    pub name_en: String,
    pub province_id: i64,
}

/// A subdistrict, owned by one amphure. Carries the postal code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tambon {
    pub id: i64,
    pub name_th: String,
    pub name_en: String,
    pub amphure_id: i64,
    pub zip_code: i64,
}

/// Anything addressable by its Thai display name.
pub trait NamedRegion {
    fn name_th(&self) -> &str;
}

impl NamedRegion for Province {
    fn name_th(&self) -> &str {
        &self.name_th
    }
}

impl NamedRegion for Amphure {
    fn name_th(&self) -> &str {
        &self.name_th
    }
}

impl NamedRegion for Tambon {
    fn name_th(&self) -> &str {
        &self.name_th
    }
}

/// First region in list order whose `name_th` matches exactly.
pub fn find_by_name<'a, T: NamedRegion>(regions: &'a [T], name: &str) -> Option<&'a T> {
    regions.iter().find(|r| r.name_th() == name)
}
