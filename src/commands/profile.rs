use crate::args::ProfileSetArgs;
use crate::commands::{profile, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::UserProfile;
use crate::store::{self, Key};
use crate::{Config, Result};

/// Prints the stored profile. A missing profile is shown as empty.
pub async fn profile_show(config: &Config) -> Result<Out<UserProfile>> {
    let stored = profile(config.store())
        .await
        .pub_result(ErrorType::Database)?;
    let Some(p) = stored else {
        return Ok(Out::new(
            "Chưa có hồ sơ. Dùng 'taxhelper profile set' để cập nhật.",
            UserProfile::default(),
        ));
    };
    Ok(Out::new(describe(&p), p))
}

/// Merges the given fields into the stored profile.
pub async fn profile_set(config: &Config, args: &ProfileSetArgs) -> Result<Out<UserProfile>> {
    let store = config.store();
    let mut p = profile(store)
        .await
        .pub_result(ErrorType::Database)?
        .unwrap_or_default();
    p.apply(args.update());
    store::save(store, Key::UserProfile, &p)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Đã lưu hồ sơ.\n{}", describe(&p)), p))
}

fn describe(p: &UserProfile) -> String {
    let or_dash = |s: &str| {
        if s.trim().is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };
    let sector = p.hkd_sector.map(|s| s.label()).unwrap_or("-");
    [
        format!("Họ tên:             {}", or_dash(&p.name)),
        format!("Mã số thuế:         {}", or_dash(&p.tax_code)),
        format!(
            "Định danh cá nhân:  {}",
            or_dash(p.personal_id.as_deref().unwrap_or_default())
        ),
        format!("Địa chỉ:            {}", or_dash(&p.full_address())),
        format!("Điện thoại:         {}", or_dash(&p.phone)),
        format!("Email:              {}", or_dash(&p.email)),
        format!("Cơ quan thuế:       {}", or_dash(&p.tax_department)),
        format!("Lĩnh vực HKD:       {sector}"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BusinessSector;
    use crate::test::TestEnv;
    use clap::Parser;

    #[tokio::test]
    async fn test_set_merges_fields() {
        let env = TestEnv::new().await;
        let config = env.config();

        let out = profile_show(&config).await.unwrap();
        assert!(out.message().contains("Chưa có hồ sơ"));

        let args = ProfileSetArgs::parse_from([
            "set",
            "--tax-code",
            "8001234567",
            "--city",
            "Hà Nội",
            "--hkd-sector",
            "services",
        ]);
        profile_set(&config, &args).await.unwrap();

        let args = ProfileSetArgs::parse_from(["set", "--personal-id", "001090000001"]);
        let out = profile_set(&config, &args).await.unwrap();
        let p = out.structure().unwrap();
        assert_eq!(p.tax_code, "8001234567");
        assert_eq!(p.city, "Hà Nội");
        assert_eq!(p.hkd_sector, Some(BusinessSector::Services));
        assert!(p.has_personal_id());

        let shown = profile_show(&config).await.unwrap();
        assert_eq!(shown.structure(), Some(p));
        assert!(shown.message().contains("001090000001"));
    }
}
