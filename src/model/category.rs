use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The revenue category of a household business transaction. Each category carries its own VAT
/// and PIT rates, see `tax::hkd::rates`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BusinessCategory {
    /// Retail, wholesale and grocery.
    #[default]
    Distribution,
    /// Restaurants, hotels, cafes.
    LodgingAndCatering,
    /// Repairs, spa, hairdressing, laundry.
    ConsumerServices,
    /// Construction without supplying materials.
    ConstructionNoMaterials,
    /// Construction including materials.
    ConstructionWithMaterials,
    /// Renting out houses, premises, vehicles.
    AssetRental,
    /// Production, transport and goods-related services.
    ProductionTransport,
    /// Agents and brokers.
    Brokerage,
    Other,
}

serde_plain::derive_display_from_serialize!(BusinessCategory);
serde_plain::derive_fromstr_from_deserialize!(BusinessCategory);

impl BusinessCategory {
    /// Every category, in declaration order.
    pub const ALL: [BusinessCategory; 9] = [
        BusinessCategory::Distribution,
        BusinessCategory::LodgingAndCatering,
        BusinessCategory::ConsumerServices,
        BusinessCategory::ConstructionNoMaterials,
        BusinessCategory::ConstructionWithMaterials,
        BusinessCategory::AssetRental,
        BusinessCategory::ProductionTransport,
        BusinessCategory::Brokerage,
        BusinessCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BusinessCategory::Distribution => {
                "Phân phối, cung cấp hàng hóa (bán lẻ, bán buôn, tạp hóa)"
            }
            BusinessCategory::LodgingAndCatering => {
                "Dịch vụ lưu trú, ăn uống (nhà hàng, khách sạn, quán ăn, cafe)"
            }
            BusinessCategory::ConsumerServices => {
                "Dịch vụ khác (sửa chữa, spa, cắt tóc, giặt là, cho thuê LĐ)"
            }
            BusinessCategory::ConstructionNoMaterials => {
                "Xây dựng (không bao thầu nguyên vật liệu)"
            }
            BusinessCategory::ConstructionWithMaterials => "Xây dựng (có bao thầu nguyên vật liệu)",
            BusinessCategory::AssetRental => "Cho thuê tài sản (nhà, mặt bằng, xe, tài sản khác)",
            BusinessCategory::ProductionTransport => {
                "Sản xuất, vận tải, dịch vụ có gắn với hàng hóa"
            }
            BusinessCategory::Brokerage => "Đại lý, môi giới",
            BusinessCategory::Other => "Hoạt động kinh doanh khác",
        }
    }

    /// The broad sector a household business lands in when this is its primary category.
    pub fn sector(&self) -> BusinessSector {
        match self {
            BusinessCategory::Distribution
            | BusinessCategory::LodgingAndCatering
            | BusinessCategory::ConsumerServices => BusinessSector::RetailRestaurant,
            BusinessCategory::AssetRental
            | BusinessCategory::ConstructionNoMaterials
            | BusinessCategory::Brokerage => BusinessSector::Services,
            BusinessCategory::ProductionTransport | BusinessCategory::ConstructionWithMaterials => {
                BusinessSector::Manufacturing
            }
            BusinessCategory::Other => BusinessSector::Other,
        }
    }
}

/// The broad sector of a household business. Stored on the profile and used for the e-invoice
/// warning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BusinessSector {
    RetailRestaurant,
    Manufacturing,
    Services,
    Other,
}

serde_plain::derive_display_from_serialize!(BusinessSector);
serde_plain::derive_fromstr_from_deserialize!(BusinessSector);

impl BusinessSector {
    pub fn label(&self) -> &'static str {
        match self {
            BusinessSector::RetailRestaurant => "Bán lẻ, Ăn uống, Khách sạn, Dịch vụ tiêu dùng",
            BusinessSector::Manufacturing => "Sản xuất, Xây dựng, Vận tải",
            BusinessSector::Services => "Dịch vụ chuyên nghiệp, Cho thuê tài sản",
            BusinessSector::Other => "Ngành nghề khác",
        }
    }
}

/// The category of an input (expense) invoice.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseCategory {
    #[default]
    RawMaterials,
    ToolsAndSupplies,
    Rent,
    Staff,
    Marketing,
    OfficeSupplies,
    Utilities,
    Transportation,
    Other,
}

serde_plain::derive_display_from_serialize!(ExpenseCategory);
serde_plain::derive_fromstr_from_deserialize!(ExpenseCategory);

impl ExpenseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::RawMaterials => "Nguyên vật liệu, hàng hóa",
            ExpenseCategory::ToolsAndSupplies => "Công cụ, dụng cụ",
            ExpenseCategory::Rent => "Chi phí thuê mặt bằng",
            ExpenseCategory::Staff => "Chi phí nhân viên",
            ExpenseCategory::Marketing => "Chi phí marketing, quảng cáo",
            ExpenseCategory::OfficeSupplies => "Chi phí văn phòng phẩm",
            ExpenseCategory::Utilities => "Điện, nước, internet",
            ExpenseCategory::Transportation => "Chi phí vận chuyển, đi lại",
            ExpenseCategory::Other => "Chi phí khác",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_string_forms() {
        assert_eq!(
            BusinessCategory::LodgingAndCatering.to_string(),
            "lodging-and-catering"
        );
        assert_eq!(
            "asset-rental".parse::<BusinessCategory>().unwrap(),
            BusinessCategory::AssetRental
        );
        assert!("farming".parse::<BusinessCategory>().is_err());
    }

    #[test]
    fn test_all_is_complete_and_ordered() {
        let mut sorted = BusinessCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, BusinessCategory::ALL);
        assert_eq!(BusinessCategory::ALL.len(), BusinessCategory::value_variants().len());
    }

    #[test]
    fn test_sector_mapping() {
        assert_eq!(
            BusinessCategory::ConsumerServices.sector(),
            BusinessSector::RetailRestaurant
        );
        assert_eq!(
            BusinessCategory::ConstructionNoMaterials.sector(),
            BusinessSector::Services
        );
        assert_eq!(
            BusinessCategory::ConstructionWithMaterials.sector(),
            BusinessSector::Manufacturing
        );
        assert_eq!(BusinessCategory::Other.sector(), BusinessSector::Other);
    }

    #[test]
    fn test_expense_category_serde() {
        let json = serde_json::to_string(&ExpenseCategory::OfficeSupplies).unwrap();
        assert_eq!(json, "\"office-supplies\"");
        assert_eq!(ExpenseCategory::Utilities.label(), "Điện, nước, internet");
    }
}
