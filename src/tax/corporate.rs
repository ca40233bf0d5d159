//! Corporate income tax (CIT): sector incentives and the basic estimate.

use crate::model::Vnd;
use clap::ValueEnum;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const STANDARD_RATE: Decimal = dec!(0.20);

/// Declares `CorporateSector` along with its display label and the heading it is listed under.
macro_rules! corporate_sectors {
    ($( $group:literal => { $( $variant:ident => $label:literal ),+ $(,)? } ),+ $(,)?) => {
        /// The business sector of a company, covering the incentivized sectors and the VSIC
        /// sections.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
        )]
        #[serde(rename_all = "kebab-case")]
        pub enum CorporateSector {
            $( $( $variant, )+ )+
        }

        impl CorporateSector {
            pub const ALL: &'static [CorporateSector] = &[ $( $( CorporateSector::$variant, )+ )+ ];

            pub fn label(&self) -> &'static str {
                match self {
                    $( $( CorporateSector::$variant => $label, )+ )+
                }
            }

            /// The heading this sector is grouped under when listed.
            pub fn group(&self) -> &'static str {
                match self {
                    $( $( CorporateSector::$variant => $group, )+ )+
                }
            }
        }
    };
}

corporate_sectors! {
    "Doanh nghiệp Nhỏ & Vừa (SME), Startup" => {
        SmeTier1 => "SME - Doanh thu <= 3 tỷ/năm",
        SmeTier2 => "SME - Doanh thu > 3 tỷ đến 50 tỷ/năm",
        Startup => "Doanh nghiệp Khởi nghiệp Sáng tạo",
    },
    "Lĩnh vực Ưu đãi Đặc biệt khác" => {
        Software => "Sản xuất phần mềm",
        HighTech => "Công nghệ cao, Công nghiệp hỗ trợ",
        HighTechAgriculture => "Nông nghiệp ứng dụng công nghệ cao",
        SocialEnterprise => "Doanh nghiệp xã hội",
    },
    "Ngành nghề Thông thường" => {
        Standard => "Ngành nghề thông thường (không ưu đãi)",
    },
    "Nông, Lâm nghiệp và Thủy sản" => {
        CropAndAnimalProduction => "Nông nghiệp và hoạt động dịch vụ có liên quan",
        ForestryAndLogging => "Lâm nghiệp và hoạt động dịch vụ có liên quan",
        FishingAndAquaculture => "Khai thác, nuôi trồng thủy sản",
    },
    "Khai khoáng" => {
        MiningOfCoal => "Khai thác than cứng và than non",
        MiningOfCrudePetroleumAndNaturalGas => "Khai thác dầu thô và khí đốt tự nhiên",
        MiningOfMetalOres => "Khai thác quặng kim loại",
        OtherMiningAndQuarrying => "Khai khoáng khác (đá, cát, sỏi, đất sét...)",
        MiningSupportServiceActivities => "Hoạt động dịch vụ hỗ trợ khai khoáng",
    },
    "Công nghiệp Chế biến, Chế tạo" => {
        FoodProcessing => "Chế biến thực phẩm",
        BeverageProduction => "Sản xuất đồ uống",
        TextileProduction => "Sản xuất vải, trang phục, da",
        WoodProcessing => "Chế biến gỗ và sản phẩm từ gỗ, tre, nứa",
        PaperProduction => "Sản xuất giấy và sản phẩm từ giấy",
        PrintingAndReproduction => "In, sao chép bản ghi các loại",
        CokeAndRefinedPetroleum => "Sản xuất than cốc, sản phẩm dầu mỏ tinh chế",
        ChemicalProduction => "Sản xuất hóa chất và sản phẩm hóa chất",
        PharmaceuticalProduction => "Sản xuất thuốc, hóa dược và dược liệu",
        RubberAndPlastic => "Sản xuất sản phẩm từ cao su và plastic",
        NonMetallicMineral => "Sản xuất sản phẩm từ khoáng phi kim loại khác",
        BasicMetalProduction => "Sản xuất kim loại",
        FabricatedMetal => "Sản xuất sản phẩm từ kim loại đúc sẵn",
        ElectronicsAndOptics => "Sản xuất sản phẩm điện tử, máy vi tính và sản phẩm quang học",
        ElectricalEquipment => "Sản xuất thiết bị điện",
        MachineryAndEquipment => "Sản xuất máy móc, thiết bị chưa được phân vào đâu",
        MotorVehicleProduction => "Sản xuất ô tô, xe máy, xe có động cơ khác",
        OtherTransportEquipment => "Sản xuất phương tiện vận tải khác",
        FurnitureProduction => "Sản xuất giường, tủ, bàn, ghế",
        OtherManufacturing => "Công nghiệp chế biến, chế tạo khác",
        RepairAndInstallationOfMachinery => "Sửa chữa, bảo dưỡng và lắp đặt máy móc và thiết bị",
    },
    "Cung cấp Nước, Năng lượng & Xử lý rác thải" => {
        ElectricitySupply => "Sản xuất và phân phối điện, khí đốt, nước nóng, hơi nước",
        WaterCollectionAndSupply => "Khai thác, xử lý và cung cấp nước",
        WasteCollectionAndTreatment => "Hoạt động thu gom và xử lý rác thải",
    },
    "Xây dựng" => {
        BuildingConstruction => "Xây dựng nhà các loại",
        CivilEngineeringConstruction => "Xây dựng công trình kỹ thuật dân dụng",
        SpecializedConstructionActivities => "Hoạt động xây dựng chuyên dụng",
    },
    "Thương mại, Bán buôn, Bán lẻ" => {
        WholesaleTrade => "Bán buôn (trừ ô tô, mô tô, xe máy)",
        RetailTrade => "Bán lẻ (trừ ô tô, mô tô, xe máy)",
        RepairOfMotorVehicles => "Bán, sửa chữa ô tô, mô tô, xe máy và xe có động cơ khác",
    },
    "Vận tải & Kho bãi" => {
        LandTransport => "Vận tải đường bộ, đường sắt",
        WaterwayTransport => "Vận tải đường thủy",
        AirTransport => "Vận tải hàng không",
        WarehousingAndSupport => "Kho bãi và các hoạt động hỗ trợ cho vận tải",
        PostalAndCourier => "Bưu chính và chuyển phát",
    },
    "Dịch vụ Lưu trú và Ăn uống" => {
        Accommodation => "Dịch vụ lưu trú",
        FoodAndBeverageService => "Dịch vụ ăn uống",
    },
    "Thông tin và Truyền thông" => {
        PublishingActivities => "Hoạt động xuất bản",
        FilmAndBroadcasting => "Hoạt động điện ảnh, sản xuất chương trình truyền hình, ghi âm",
        Telecommunications => "Hoạt động viễn thông",
        ItAndComputerServices => "Lập trình máy vi tính, dịch vụ tư vấn và các hoạt động khác liên quan đến máy vi tính",
        InformationService => "Hoạt động dịch vụ thông tin",
    },
    "Tài chính, Ngân hàng và Bảo hiểm" => {
        FinancialService => "Hoạt động tài chính, ngân hàng và bảo hiểm",
    },
    "Kinh doanh Bất động sản" => {
        RealEstate => "Hoạt động kinh doanh bất động sản",
    },
    "Dịch vụ Chuyên môn, Khoa học & Công nghệ" => {
        LegalAndAccounting => "Hoạt động pháp luật, kế toán và kiểm toán",
        ManagementConsultancy => "Hoạt động của trụ sở văn phòng; hoạt động tư vấn quản lý",
        ArchitecturalAndEngineering => "Hoạt động kiến trúc; kiểm tra và phân tích kỹ thuật",
        ScientificResearch => "Nghiên cứu khoa học và phát triển",
        AdvertisingAndMarketResearch => "Quảng cáo, nghiên cứu thị trường",
        OtherProfessionalScientific => "Hoạt động chuyên môn, khoa học và công nghệ khác",
        VeterinaryActivities => "Hoạt động thú y",
    },
    "Dịch vụ Hành chính và Hỗ trợ" => {
        RentalOfMachinery => "Cho thuê máy móc, thiết bị, đồ dùng",
        EmploymentActivities => "Hoạt động dịch vụ lao động và việc làm",
        TravelAgency => "Hoạt động của các đại lý du lịch, kinh doanh tour du lịch",
        SecurityAndInvestigation => "Dịch vụ bảo vệ và điều tra",
        BuildingAndLandscape => "Dịch vụ vệ sinh nhà cửa và các công trình khác",
        OfficeAdminAndSupport => "Dịch vụ hành chính và hỗ trợ văn phòng",
    },
    "Giáo dục và Đào tạo" => {
        Education => "Giáo dục và đào tạo",
    },
    "Y tế và Hoạt động Xã hội" => {
        HumanHealth => "Hoạt động y tế",
        ResidentialCare => "Hoạt động chăm sóc, điều dưỡng tập trung",
        SocialWork => "Hoạt động trợ giúp xã hội",
    },
    "Nghệ thuật, Vui chơi và Giải trí" => {
        ArtsAndEntertainment => "Hoạt động sáng tác, nghệ thuật và giải trí",
        LibrariesAndMuseums => "Hoạt động của thư viện, lưu trữ, bảo tàng",
        GamblingAndBetting => "Hoạt động xổ số, cá cược và đánh bạc",
        SportsAndRecreation => "Hoạt động thể thao, vui chơi và giải trí",
    },
    "Dịch vụ khác" => {
        MembershipOrganizations => "Hoạt động của các hiệp hội, tổ chức khác",
        RepairOfComputers => "Sửa chữa máy vi tính, đồ dùng cá nhân và gia đình",
        OtherPersonalServices => "Hoạt động dịch vụ phục vụ cá nhân khác (giặt là, cắt tóc, gội đầu...)",
    },
}

serde_plain::derive_display_from_serialize!(CorporateSector);
serde_plain::derive_fromstr_from_deserialize!(CorporateSector);

impl Default for CorporateSector {
    fn default() -> Self {
        CorporateSector::SmeTier1
    }
}

/// A preferential treatment available to one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxIncentive {
    pub sector: CorporateSector,
    /// `None` when the incentive is exemption-based only and the standard rate applies.
    pub preferential_rate: Option<Decimal>,
    pub exemption_years: u32,
    /// Years, after the exemption, in which tax is halved.
    pub reduction_years: u32,
    pub conditions: &'static str,
}

impl TaxIncentive {
    pub fn schedule(&self) -> IncentiveSchedule {
        IncentiveSchedule {
            exemption_years: self.exemption_years,
            reduction_years: self.reduction_years,
        }
    }
}

const INCENTIVES: [TaxIncentive; 7] = [
    TaxIncentive {
        sector: CorporateSector::Software,
        preferential_rate: Some(dec!(0.10)),
        exemption_years: 4,
        reduction_years: 9,
        conditions: "Dự án mới sản xuất phần mềm. Miễn 4 năm, giảm 50% trong 9 năm tiếp theo kể từ khi có thu nhập chịu thuế.",
    },
    TaxIncentive {
        sector: CorporateSector::HighTech,
        preferential_rate: Some(dec!(0.10)),
        exemption_years: 4,
        reduction_years: 9,
        conditions: "Dự án mới trong lĩnh vực CNC, công nghiệp hỗ trợ. Miễn 4 năm, giảm 50% trong 9 năm tiếp theo.",
    },
    TaxIncentive {
        sector: CorporateSector::HighTechAgriculture,
        preferential_rate: Some(dec!(0.10)),
        exemption_years: 4,
        reduction_years: 9,
        conditions: "Dự án tại địa bàn KTXH đặc biệt khó khăn, khu công nghệ cao. Miễn 4 năm, giảm 50% trong 9 năm tiếp theo.",
    },
    TaxIncentive {
        sector: CorporateSector::SocialEnterprise,
        preferential_rate: Some(dec!(0.10)),
        exemption_years: 4,
        reduction_years: 9,
        conditions: "Doanh nghiệp xã hội sử dụng >51% lợi nhuận để tái đầu tư. Miễn/giảm thuế áp dụng cho phần lợi nhuận này.",
    },
    TaxIncentive {
        sector: CorporateSector::Startup,
        preferential_rate: None,
        exemption_years: 2,
        reduction_years: 4,
        conditions: "Doanh nghiệp Khởi nghiệp Sáng tạo được miễn thuế 02 năm đầu và giảm 50% trong 04 năm tiếp theo.",
    },
    TaxIncentive {
        sector: CorporateSector::SmeTier1,
        preferential_rate: Some(dec!(0.15)),
        exemption_years: 3,
        reduction_years: 0,
        conditions: "Doanh nghiệp Nhỏ và Vừa (SME) có doanh thu năm không quá 3 tỷ đồng được miễn thuế 03 năm đầu và áp dụng thuế suất 15% (thay vì 20%) từ 01/10/2025.",
    },
    TaxIncentive {
        sector: CorporateSector::SmeTier2,
        preferential_rate: Some(dec!(0.17)),
        exemption_years: 3,
        reduction_years: 0,
        conditions: "Doanh nghiệp Nhỏ và Vừa (SME) có doanh thu năm trên 3 tỷ đến 50 tỷ đồng được miễn thuế 03 năm đầu và áp dụng thuế suất 17% (thay vì 20%) từ 01/10/2025.",
    },
];

pub fn incentives() -> &'static [TaxIncentive] {
    &INCENTIVES
}

pub fn incentive(sector: CorporateSector) -> Option<&'static TaxIncentive> {
    INCENTIVES.iter().find(|i| i.sector == sector)
}

/// The preferential rate when the sector has one, otherwise the standard rate.
pub fn rate(sector: CorporateSector) -> Decimal {
    incentive(sector)
        .and_then(|i| i.preferential_rate)
        .unwrap_or(STANDARD_RATE)
}

/// Exemption and reduction years counted from the first year with taxable income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveSchedule {
    pub exemption_years: u32,
    pub reduction_years: u32,
}

impl IncentiveSchedule {
    /// Tax due in the `year`th year of taxable income (1-based). Zero during the exemption, half
    /// during the reduction, `base_tax` afterwards.
    pub fn tax_for_year(&self, year: u32, base_tax: Vnd) -> Vnd {
        if year == 0 || year <= self.exemption_years {
            Vnd::ZERO
        } else if year <= self.exemption_years + self.reduction_years {
            base_tax * dec!(0.5)
        } else {
            base_tax
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateEstimate {
    pub sector: CorporateSector,
    pub revenue: Vnd,
    pub expenses: Vnd,
    pub taxable_income: Vnd,
    pub rate: Decimal,
    pub tax: Vnd,
    pub incentive: Option<TaxIncentive>,
}

impl CorporateEstimate {
    /// Applies the sector's exemption schedule to the estimate for the given year of income.
    pub fn tax_for_year(&self, year: u32) -> Vnd {
        self.incentive
            .map(|i| i.schedule())
            .unwrap_or_default()
            .tax_for_year(year, self.tax)
    }
}

pub fn estimate(revenue: Vnd, expenses: Vnd, sector: CorporateSector) -> CorporateEstimate {
    let taxable_income = (revenue - expenses).non_negative();
    let rate = rate(sector);
    CorporateEstimate {
        sector,
        revenue,
        expenses,
        taxable_income,
        rate,
        tax: taxable_income * rate,
        incentive: incentive(sector).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        assert_eq!(rate(CorporateSector::SmeTier1), dec!(0.15));
        assert_eq!(rate(CorporateSector::SmeTier2), dec!(0.17));
        assert_eq!(rate(CorporateSector::Software), dec!(0.10));
        // exemption-only incentive keeps the standard rate
        assert_eq!(rate(CorporateSector::Startup), STANDARD_RATE);
        assert_eq!(rate(CorporateSector::RetailTrade), STANDARD_RATE);
        assert!(incentive(CorporateSector::Education).is_none());
    }

    #[test]
    fn test_estimate() {
        let e = estimate(
            Vnd::from(2_500_000_000),
            Vnd::from(1_800_000_000),
            CorporateSector::SmeTier1,
        );
        assert_eq!(e.taxable_income, Vnd::from(700_000_000));
        assert_eq!(e.tax, Vnd::from(105_000_000));
        assert_eq!(e.tax_for_year(1), Vnd::ZERO);
        assert_eq!(e.tax_for_year(4), Vnd::from(105_000_000));
    }

    #[test]
    fn test_estimate_loss_is_zero() {
        let e = estimate(Vnd::from(1), Vnd::from(2), CorporateSector::Standard);
        assert_eq!(e.taxable_income, Vnd::ZERO);
        assert_eq!(e.tax, Vnd::ZERO);
        assert_eq!(e.tax_for_year(1), Vnd::ZERO);
    }

    #[test]
    fn test_schedule() {
        let s = incentive(CorporateSector::Startup).unwrap().schedule();
        let base = Vnd::from(1_000);
        assert_eq!(s.tax_for_year(1, base), Vnd::ZERO);
        assert_eq!(s.tax_for_year(2, base), Vnd::ZERO);
        assert_eq!(s.tax_for_year(3, base), Vnd::from(500));
        assert_eq!(s.tax_for_year(6, base), Vnd::from(500));
        assert_eq!(s.tax_for_year(7, base), base);
        assert_eq!(IncentiveSchedule::default().tax_for_year(1, base), base);
    }

    #[test]
    fn test_sector_listing() {
        assert_eq!(CorporateSector::ALL[0], CorporateSector::SmeTier1);
        assert_eq!(CorporateSector::Education.group(), "Giáo dục và Đào tạo");
        assert_eq!(CorporateSector::SmeTier1.to_string(), "sme-tier1");
        assert_eq!(CorporateSector::default(), CorporateSector::SmeTier1);
    }
}
