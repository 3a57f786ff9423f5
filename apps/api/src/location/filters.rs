//! Cascading filters over the reference tables.
//!
//! All functions are pure and never fail: an unresolvable name yields an
//! empty list (or an empty zip code), which callers treat as "no valid
//! children".

use super::models::{find_by_name, Amphure, Province, Tambon};

/// Amphures belonging to the province named `province_name`, in input order.
pub fn filter_amphures_by_province<'a>(
    amphures: &'a [Amphure],
    provinces: &[Province],
    province_name: &str,
) -> Vec<&'a Amphure> {
    match find_by_name(provinces, province_name) {
        Some(province) => amphures
            .iter()
            .filter(|a| a.province_id == province.id)
            .collect(),
        None => Vec::new(),
    }
}

/// Tambons belonging to the amphure named `amphure_name`, in input order.
pub fn filter_tambons_by_amphure<'a>(
    tambons: &'a [Tambon],
    amphures: &[Amphure],
    amphure_name: &str,
) -> Vec<&'a Tambon> {
    match find_by_name(amphures, amphure_name) {
        Some(amphure) => tambons
            .iter()
            .filter(|t| t.amphure_id == amphure.id)
            .collect(),
        None => Vec::new(),
    }
}

/// Postal code of `tambon_name`, as text, or `""` when it cannot be resolved.
///
/// The match must exist in the full list and also be a member of
/// `filtered_tambons` (the children of the currently selected amphure).
/// Subdistrict names repeat across districts, so membership is checked per
/// record rather than by name alone.
pub fn zip_code_from_tambon(
    tambons: &[Tambon],
    tambon_name: &str,
    filtered_tambons: &[&Tambon],
) -> String {
    tambons
        .iter()
        .filter(|t| t.name_th == tambon_name)
        .find(|t| {
            filtered_tambons
                .iter()
                .any(|f| f.id == t.id && f.name_th == t.name_th)
        })
        .map(|t| t.zip_code.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::reference::test_fixtures::fixture_tables;

    #[test]
    fn test_amphures_match_exactly_the_province_children_in_order() {
        let (provinces, amphures, _) = fixture_tables();
        for province in &provinces {
            let got: Vec<i64> =
                filter_amphures_by_province(&amphures, &provinces, &province.name_th)
                    .iter()
                    .map(|a| a.id)
                    .collect();
            let expected: Vec<i64> = amphures
                .iter()
                .filter(|a| a.province_id == province.id)
                .map(|a| a.id)
                .collect();
            assert_eq!(got, expected, "province {}", province.name_th);
        }
    }

    #[test]
    fn test_amphures_empty_on_unknown_province() {
        let (provinces, amphures, _) = fixture_tables();
        assert!(filter_amphures_by_province(&amphures, &provinces, "nonexistent").is_empty());
        assert!(filter_amphures_by_province(&amphures, &provinces, "").is_empty());
    }

    #[test]
    fn test_tambon_filter_is_idempotent() {
        let (_, amphures, tambons) = fixture_tables();
        let first = filter_tambons_by_amphure(&tambons, &amphures, "จตุจักร");
        let second = filter_tambons_by_amphure(&tambons, &amphures, "จตุจักร");
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_tambons_empty_on_unknown_amphure() {
        let (_, amphures, tambons) = fixture_tables();
        assert!(filter_tambons_by_amphure(&tambons, &amphures, "nonexistent").is_empty());
    }

    #[test]
    fn test_zip_code_is_scoped_to_filtered_set() {
        let (_, amphures, tambons) = fixture_tables();
        // "ในเมือง" exists under both เมืองขอนแก่น (40000) and เมืองนครราชสีมา (30000).
        let khon_kaen = filter_tambons_by_amphure(&tambons, &amphures, "เมืองขอนแก่น");
        let korat = filter_tambons_by_amphure(&tambons, &amphures, "เมืองนครราชสีมา");

        assert_eq!(zip_code_from_tambon(&tambons, "ในเมือง", &khon_kaen), "40000");
        assert_eq!(zip_code_from_tambon(&tambons, "ในเมือง", &korat), "30000");
    }

    #[test]
    fn test_zip_code_rejects_tambon_outside_selected_amphure() {
        let (_, amphures, tambons) = fixture_tables();
        let chatuchak = filter_tambons_by_amphure(&tambons, &amphures, "จตุจักร");
        assert_eq!(zip_code_from_tambon(&tambons, "ในเมือง", &chatuchak), "");
        assert_eq!(zip_code_from_tambon(&tambons, "ไม่มีตำบลนี้", &chatuchak), "");
        assert_eq!(zip_code_from_tambon(&tambons, "จตุจักร", &[]), "");
    }

    #[test]
    fn test_zip_code_found_for_valid_selection() {
        let (_, amphures, tambons) = fixture_tables();
        let chatuchak = filter_tambons_by_amphure(&tambons, &amphures, "จตุจักร");
        assert_eq!(zip_code_from_tambon(&tambons, "จตุจักร", &chatuchak), "10900");
    }
}
