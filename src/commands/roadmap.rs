use crate::commands::Out;
use crate::tax::roadmap::{self, Milestone};
use crate::Result;

/// The reform timeline with what to do at each step.
pub async fn roadmap() -> Result<Out<Vec<Milestone>>> {
    let milestones = roadmap::milestones().to_vec();
    let mut lines = Vec::new();
    for m in &milestones {
        lines.push(format!("{}  {}", m.date, m.title));
        lines.push(format!("  {}", m.description));
        for a in m.actions {
            lines.push(format!("  {} (taxhelper {})", a.audience, a.command));
            for item in a.items {
                lines.push(format!("    - {item}"));
            }
        }
    }
    Ok(Out::new(lines.join("\n"), milestones))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roadmap() {
        let out = roadmap().await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 3);
        assert!(out.message().starts_with("01/07/2025"));
        assert!(out.message().contains("(taxhelper hkd)"));
    }
}
