//! The 2025-2026 reform timeline.

use serde::Serialize;

/// What one audience should do at a milestone, and the command that helps them do it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub audience: &'static str,
    pub items: &'static [&'static str],
    /// The `taxhelper` subcommand to use.
    pub command: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub date: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub actions: &'static [Action],
}

const MILESTONES: [Milestone; 3] = [
    Milestone {
        date: "01/07/2025",
        title: "Bán hàng Online & Hóa đơn Doanh nghiệp",
        description: "Quy định mới ảnh hưởng trực tiếp đến cách các chủ doanh nghiệp chi tiêu và cách người bán hàng trên Shopee, Lazada được quản lý thuế.",
        actions: &[
            Action {
                audience: "Nếu bạn là Chủ Doanh nghiệp nhỏ (SME):",
                items: &[
                    "CỰC KỲ QUAN TRỌNG: Mọi chi phí của công ty, dù chỉ vài nghìn đồng, đều phải CHUYỂN KHOẢN. Nếu trả bằng tiền mặt, chi phí đó sẽ không được khấu trừ thuế GTGT, làm tăng số thuế phải nộp.",
                ],
                command: "corporate",
            },
            Action {
                audience: "Nếu bạn bán hàng trên Shopee, Lazada, TikTok Shop:",
                items: &[
                    "Các sàn sẽ tự động giữ lại 1.5% tiền hàng của bạn để nộp thay thuế. Hãy tính toán lại giá bán để đảm bảo bạn vẫn có lãi.",
                    "Nếu tổng doanh thu của bạn dưới 200 triệu/năm, bạn có thể yêu cầu nhà nước hoàn lại số tiền thuế này vào cuối năm.",
                ],
                command: "ecommerce",
            },
        ],
    },
    Milestone {
        date: "01/10/2025",
        title: "Ưu đãi Thuế cho Doanh nghiệp nhỏ",
        description: "Luật mới giúp các doanh nghiệp nhỏ và vừa (SME) và các công ty khởi nghiệp (Startup) giảm bớt gánh nặng thuế.",
        actions: &[Action {
            audience: "Nếu bạn là Chủ Doanh nghiệp:",
            items: &[
                "Kiểm tra doanh thu năm trước để xem công ty bạn có được hưởng mức thuế TNDN ưu đãi (15% hoặc 17% thay vì 20%) hay không.",
                "Nếu là công ty khởi nghiệp sáng tạo, hãy tìm hiểu về gói miễn/giảm thuế đặc biệt kéo dài tới 6 năm.",
            ],
            command: "corporate",
        }],
    },
    Milestone {
        date: "01/01/2026",
        title: "Lương cao hơn & Hết thời Thuế Khoán",
        description: "Cách tính thuế cho người đi làm thay đổi có lợi hơn. Các hộ kinh doanh không còn đóng thuế khoán mà sẽ kê khai theo doanh thu thực tế.",
        actions: &[
            Action {
                audience: "Nếu bạn là Hộ kinh doanh (quán ăn, tạp hóa...):",
                items: &[
                    "Không còn thuế khoán. Bạn phải ghi chép doanh thu để xác định mình thuộc nhóm nào.",
                    "Doanh thu dưới 200 triệu/năm: Được miễn thuế, nhưng vẫn phải khai báo.",
                    "Doanh thu trên 200 triệu/năm: Phải nộp thuế theo % doanh thu và sử dụng hóa đơn điện tử.",
                ],
                command: "hkd",
            },
            Action {
                audience: "Nếu bạn là Người đi làm hưởng lương:",
                items: &[
                    "Bạn sẽ được trừ nhiều tiền hơn từ thu nhập trước khi tính thuế (giảm trừ gia cảnh), giúp tăng lương thực nhận hàng tháng.",
                    "Rà soát lại những người phụ thuộc (cha mẹ, con cái) mà bạn đang đăng ký giảm trừ để đảm bảo họ vẫn đủ điều kiện.",
                ],
                command: "pit",
            },
        ],
    },
];

/// The milestones in date order.
pub fn milestones() -> &'static [Milestone] {
    &MILESTONES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_points_at_a_command() {
        let known = ["corporate", "ecommerce", "hkd", "pit"];
        for m in milestones() {
            assert!(!m.actions.is_empty());
            for a in m.actions {
                assert!(known.contains(&a.command), "{}", a.command);
                assert!(!a.items.is_empty());
            }
        }
        assert_eq!(milestones()[2].date, "01/01/2026");
    }
}
