//! Plan document output.

use crate::engine::Plan;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Plan file name for `date` (`YYYY-MM-DD`).
pub fn plan_file_name(date: &str) -> String {
    format!("plan_{date}.json")
}

/// Write `plan` as pretty JSON into `dir`, returning the file path.
pub fn write_plan(plan: &Plan, dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let path = Path::new(dir).join(plan_file_name(&today));

    std::fs::create_dir_all(dir).map_err(|e| format!("Error creating plan dir {dir}: {e}"))?;
    let json =
        serde_json::to_string_pretty(plan).map_err(|e| format!("Error serializing plan: {e}"))?;
    std::fs::write(&path, json)
        .map_err(|e| format!("Error writing plan file {}: {e}", path.display()))?;

    log::info!(
        "Wrote plan with {} resources to {}",
        plan.resources.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ExportValue;
    use std::collections::BTreeMap;

    #[test]
    fn test_write_plan() {
        let dir = std::env::temp_dir().join(format!("vpc-topology-plan-{}", std::process::id()));
        let dir = dir.to_string_lossy().to_string();
        let plan = Plan {
            generated_at: "2026-10-17T00:00:00Z".to_string(),
            region: "us-west-2".to_string(),
            resources: Vec::new(),
            exports: BTreeMap::from([(
                "dev_vpc_id".to_string(),
                ExportValue::Id("vpc-00000001".to_string()),
            )]),
        };

        let path = write_plan(&plan, &dir).expect("Error writing plan");
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["exports"]["dev_vpc_id"], "vpc-00000001");
        assert_eq!(written["region"], "us-west-2");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
