use crate::model::BusinessSector;
use serde::{Deserialize, Serialize};

/// The taxpayer's details, used to pre-fill the declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub tax_code: String,
    /// Personal identification number (CCCD). Mandatory on declarations from 14/10/2025.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_id: Option<String>,
    pub name: String,
    pub address: String,
    pub district: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub tax_department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hkd_sector: Option<BusinessSector>,
}

impl UserProfile {
    pub fn has_tax_code(&self) -> bool {
        !self.tax_code.trim().is_empty()
    }

    pub fn has_personal_id(&self) -> bool {
        self.personal_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    /// Address, district and city joined with commas, skipping blanks.
    pub fn full_address(&self) -> String {
        [&self.address, &self.district, &self.city]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Overwrites every field that is present in `update`.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            tax_code,
            personal_id,
            name,
            address,
            district,
            city,
            phone,
            email,
            tax_department,
            hkd_sector,
        } = update;
        set(&mut self.tax_code, tax_code);
        set(&mut self.name, name);
        set(&mut self.address, address);
        set(&mut self.district, district);
        set(&mut self.city, city);
        set(&mut self.phone, phone);
        set(&mut self.email, email);
        set(&mut self.tax_department, tax_department);
        if let Some(id) = personal_id {
            let id = id.trim().to_string();
            self.personal_id = if id.is_empty() { None } else { Some(id) };
        }
        if hkd_sector.is_some() {
            self.hkd_sector = hkd_sector;
        }
    }
}

fn set(field: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *field = v.trim().to_string();
    }
}

/// A partial profile. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub tax_code: Option<String>,
    pub personal_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_department: Option<String>,
    pub hkd_sector: Option<BusinessSector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overwrites_only_given_fields() {
        let mut profile = UserProfile {
            tax_code: "8001234567".to_string(),
            name: "Nguyễn Văn A".to_string(),
            ..UserProfile::default()
        };
        profile.apply(ProfileUpdate {
            city: Some(" Hà Nội ".to_string()),
            personal_id: Some("001090000001".to_string()),
            ..ProfileUpdate::default()
        });
        assert_eq!(profile.tax_code, "8001234567");
        assert_eq!(profile.city, "Hà Nội");
        assert!(profile.has_personal_id());
    }

    #[test]
    fn test_blank_personal_id_clears() {
        let mut profile = UserProfile {
            personal_id: Some("001090000001".to_string()),
            ..UserProfile::default()
        };
        profile.apply(ProfileUpdate {
            personal_id: Some("  ".to_string()),
            ..ProfileUpdate::default()
        });
        assert!(!profile.has_personal_id());
    }

    #[test]
    fn test_full_address() {
        let profile = UserProfile {
            address: "12 Lý Thường Kiệt".to_string(),
            district: String::new(),
            city: "Hà Nội".to_string(),
            ..UserProfile::default()
        };
        assert_eq!(profile.full_address(), "12 Lý Thường Kiệt, Hà Nội");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"taxCode":"0101","hkdSector":"services"}"#).unwrap();
        assert!(profile.has_tax_code());
        assert_eq!(profile.hkd_sector, Some(BusinessSector::Services));
        assert!(profile.name.is_empty());
    }
}
