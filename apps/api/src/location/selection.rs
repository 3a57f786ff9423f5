use std::fmt;

use serde::{Deserialize, Serialize};

use super::reference::ReferenceData;

/// Per-session address selection. Empty strings mean "unset".
///
/// The plain setters accept anything, so the parent/child invariant can be
/// broken transiently. Run [`SelectionState::validate`] or
/// [`SelectionState::revalidate`] before the state is shown or persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionState {
    pub selected_province: String,
    pub selected_amphure: String,
    pub selected_tambon: String,
    pub zip_code: String,
}

/// Outcome of checking a selection against the reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SelectionCheck {
    Consistent,
    UnknownProvince { province: String },
    AmphureOutsideProvince { amphure: String, province: String },
    TambonOutsideAmphure { tambon: String, amphure: String },
    ZipMismatch { expected: String, found: String },
}

impl SelectionCheck {
    pub fn is_consistent(&self) -> bool {
        matches!(self, SelectionCheck::Consistent)
    }
}

impl fmt::Display for SelectionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionCheck::Consistent => write!(f, "selection is consistent"),
            SelectionCheck::UnknownProvince { province } => {
                write!(f, "province '{province}' does not exist")
            }
            SelectionCheck::AmphureOutsideProvince { amphure, province } => {
                write!(f, "district '{amphure}' is not in province '{province}'")
            }
            SelectionCheck::TambonOutsideAmphure { tambon, amphure } => {
                write!(f, "subdistrict '{tambon}' is not in district '{amphure}'")
            }
            SelectionCheck::ZipMismatch { expected, found } => {
                write!(f, "zip code '{found}' does not match subdistrict zip '{expected}'")
            }
        }
    }
}

impl SelectionState {
    pub fn set_province(&mut self, name: impl Into<String>) {
        self.selected_province = name.into();
    }

    pub fn set_amphure(&mut self, name: impl Into<String>) {
        self.selected_amphure = name.into();
    }

    pub fn set_tambon(&mut self, name: impl Into<String>) {
        self.selected_tambon = name.into();
    }

    pub fn set_zip_code(&mut self, zip: impl Into<String>) {
        self.zip_code = zip.into();
    }

    /// Province, district and subdistrict are all chosen.
    pub fn is_complete(&self) -> bool {
        !self.selected_province.is_empty()
            && !self.selected_amphure.is_empty()
            && !self.selected_tambon.is_empty()
    }

    /// Selects a province; a change clears the dependent district, subdistrict and zip.
    #[allow(dead_code)] // interactive selector
    pub fn select_province(&mut self, name: &str) {
        if self.selected_province != name {
            self.selected_province = name.to_string();
            self.selected_amphure.clear();
            self.selected_tambon.clear();
            self.zip_code.clear();
        }
    }

    /// Selects a district; a change clears the dependent subdistrict and zip.
    #[allow(dead_code)] // interactive selector
    pub fn select_amphure(&mut self, name: &str) {
        if self.selected_amphure != name {
            self.selected_amphure = name.to_string();
            self.selected_tambon.clear();
            self.zip_code.clear();
        }
    }

    /// Selects a subdistrict and derives its zip code within the current
    /// province and district.
    #[allow(dead_code)] // interactive selector
    pub fn select_tambon(&mut self, reference: &ReferenceData, name: &str) {
        self.selected_tambon = name.to_string();
        self.zip_code = reference.resolve_zip_code(&self.selected_province, &self.selected_amphure, name);
    }

    /// Fills an empty zip code from the selected subdistrict, if it resolves.
    pub fn derive_zip_code(&mut self, reference: &ReferenceData) {
        if self.zip_code.is_empty() && !self.selected_tambon.is_empty() {
            self.zip_code = reference.resolve_zip_code(
                &self.selected_province,
                &self.selected_amphure,
                &self.selected_tambon,
            );
        }
    }

    /// Reports the first violation of the parent/child invariant, top down.
    pub fn validate(&self, reference: &ReferenceData) -> SelectionCheck {
        if !self.selected_province.is_empty() && reference.province(&self.selected_province).is_none() {
            return SelectionCheck::UnknownProvince {
                province: self.selected_province.clone(),
            };
        }

        if !self.selected_amphure.is_empty()
            && reference
                .amphure_in(&self.selected_province, &self.selected_amphure)
                .is_none()
        {
            return SelectionCheck::AmphureOutsideProvince {
                amphure: self.selected_amphure.clone(),
                province: self.selected_province.clone(),
            };
        }

        if !self.selected_tambon.is_empty() {
            let expected = reference.resolve_zip_code(
                &self.selected_province,
                &self.selected_amphure,
                &self.selected_tambon,
            );
            if expected.is_empty() {
                return SelectionCheck::TambonOutsideAmphure {
                    tambon: self.selected_tambon.clone(),
                    amphure: self.selected_amphure.clone(),
                };
            }
            if !self.zip_code.is_empty() && self.zip_code != expected {
                return SelectionCheck::ZipMismatch {
                    expected,
                    found: self.zip_code.clone(),
                };
            }
        }

        SelectionCheck::Consistent
    }

    /// Clears every field that breaks the invariant, leaving valid parents in place.
    #[allow(dead_code)] // interactive selector
    pub fn revalidate(&mut self, reference: &ReferenceData) -> SelectionCheck {
        let check = self.validate(reference);
        match &check {
            SelectionCheck::Consistent => {}
            SelectionCheck::UnknownProvince { .. } => *self = SelectionState::default(),
            SelectionCheck::AmphureOutsideProvince { .. } => {
                self.selected_amphure.clear();
                self.selected_tambon.clear();
                self.zip_code.clear();
            }
            SelectionCheck::TambonOutsideAmphure { .. } => {
                self.selected_tambon.clear();
                self.zip_code.clear();
            }
            SelectionCheck::ZipMismatch { expected, .. } => self.zip_code = expected.clone(),
        }
        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::reference::test_fixtures::fixture_reference;

    fn chatuchak() -> SelectionState {
        SelectionState {
            selected_province: "กรุงเทพ".into(),
            selected_amphure: "จตุจักร".into(),
            selected_tambon: "จตุจักร".into(),
            zip_code: "10900".into(),
        }
    }

    #[test]
    fn test_select_province_clears_children_on_change() {
        let mut state = chatuchak();
        state.select_province("ขอนแก่น");
        assert_eq!(state.selected_province, "ขอนแก่น");
        assert!(state.selected_amphure.is_empty());
        assert!(state.selected_tambon.is_empty());
        assert!(state.zip_code.is_empty());
    }

    #[test]
    fn test_select_same_province_keeps_children() {
        let mut state = chatuchak();
        state.select_province("กรุงเทพ");
        assert_eq!(state, chatuchak());
    }

    #[test]
    fn test_select_amphure_clears_tambon_and_zip() {
        let mut state = chatuchak();
        state.select_amphure("พระนคร");
        assert_eq!(state.selected_province, "กรุงเทพ");
        assert!(state.selected_tambon.is_empty());
        assert!(state.zip_code.is_empty());
    }

    #[test]
    fn test_select_tambon_derives_scoped_zip() {
        let reference = fixture_reference();
        let mut state = SelectionState::default();
        state.select_province("นครราชสีมา");
        state.select_amphure("เมืองนครราชสีมา");
        state.select_tambon(&reference, "ในเมือง");
        assert_eq!(state.zip_code, "30000");
    }

    fn chaloem_phra_kiat_buriram() -> SelectionState {
        SelectionState {
            selected_province: "บุรีรัมย์".into(),
            selected_amphure: "เฉลิมพระเกียรติ".into(),
            selected_tambon: "ถาวร".into(),
            zip_code: "31170".into(),
        }
    }

    #[test]
    fn test_select_tambon_in_district_name_shared_across_provinces() {
        let reference = fixture_reference();
        let mut state = SelectionState::default();
        state.select_province("บุรีรัมย์");
        state.select_amphure("เฉลิมพระเกียรติ");
        state.select_tambon(&reference, "ถาวร");
        assert_eq!(state.zip_code, "31170");
    }

    #[test]
    fn test_validate_accepts_district_name_shared_across_provinces() {
        let reference = fixture_reference();
        assert!(chaloem_phra_kiat_buriram().validate(&reference).is_consistent());

        let mut derived = chaloem_phra_kiat_buriram();
        derived.set_zip_code("");
        derived.derive_zip_code(&reference);
        assert_eq!(derived.zip_code, "31170");
    }

    #[test]
    fn test_validate_flags_tambon_from_same_named_district_elsewhere() {
        let reference = fixture_reference();
        let mut state = chaloem_phra_kiat_buriram();
        state.set_province("นครราชสีมา");
        assert_eq!(
            state.validate(&reference),
            SelectionCheck::TambonOutsideAmphure {
                tambon: "ถาวร".into(),
                amphure: "เฉลิมพระเกียรติ".into(),
            }
        );
    }

    #[test]
    fn test_validate_accepts_consistent_selection() {
        let reference = fixture_reference();
        assert!(chatuchak().validate(&reference).is_consistent());
        assert!(SelectionState::default().validate(&reference).is_consistent());
    }

    #[test]
    fn test_validate_flags_amphure_from_other_province() {
        let reference = fixture_reference();
        let mut state = chatuchak();
        state.set_province("ขอนแก่น");
        assert_eq!(
            state.validate(&reference),
            SelectionCheck::AmphureOutsideProvince {
                amphure: "จตุจักร".into(),
                province: "ขอนแก่น".into(),
            }
        );
    }

    #[test]
    fn test_validate_flags_zip_mismatch() {
        let reference = fixture_reference();
        let mut state = chatuchak();
        state.set_zip_code("40000");
        assert!(matches!(
            state.validate(&reference),
            SelectionCheck::ZipMismatch { .. }
        ));
    }

    #[test]
    fn test_revalidate_clears_only_invalid_levels() {
        let reference = fixture_reference();
        let mut state = chatuchak();
        state.set_tambon("ในเมือง");

        let check = state.revalidate(&reference);

        assert!(matches!(check, SelectionCheck::TambonOutsideAmphure { .. }));
        assert_eq!(state.selected_province, "กรุงเทพ");
        assert_eq!(state.selected_amphure, "จตุจักร");
        assert!(state.selected_tambon.is_empty());
        assert!(state.zip_code.is_empty());
    }

    #[test]
    fn test_revalidate_resets_unknown_province() {
        let reference = fixture_reference();
        let mut state = chatuchak();
        state.set_province("ไม่มี");
        state.revalidate(&reference);
        assert_eq!(state, SelectionState::default());
    }

    #[test]
    fn test_derive_zip_code_fills_only_when_empty() {
        let reference = fixture_reference();
        let mut state = chatuchak();
        state.set_zip_code("");
        state.derive_zip_code(&reference);
        assert_eq!(state.zip_code, "10900");
    }
}
