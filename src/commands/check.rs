//! The referential-integrity report.

use crate::commands::{load, Out};
use crate::model::Issue;
use crate::{Config, Result};
use tracing::warn;

/// Reports units referenced by rates, accounts or transactions that are not in the registry, and
/// pairs of units connected by more than one rate. Problems are reported, not repaired.
pub async fn check(config: Config) -> Result<Out<Vec<Issue>>> {
    let data = load(&config).await?;
    let issues = data.check();
    for issue in &issues {
        warn!("{issue}");
    }
    let message = if issues.is_empty() {
        format!("{} is consistent", config.data_path().display())
    } else {
        format!(
            "Found {} problem(s) in {}",
            issues.len(),
            config.data_path().display()
        )
    };
    let output = issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    let out = Out::new(message, issues);
    Ok(if output.is_empty() {
        out
    } else {
        out.with_output(output)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_check_clean() {
        let env = TestEnv::new().await;
        env.insert_sample_accounts().await;
        let out = check(env.config()).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert!(out.message().ends_with("is consistent"));
        assert!(out.output().is_none());
    }

    #[tokio::test]
    async fn test_check_reports_issues() {
        let env = TestEnv::new().await;
        let json = r#"{
            "units": [{"code": "USD", "name": "US Dollar", "symbol": "$"}],
            "exchangeRates": [
                {"id": 1, "from": "EUR", "to": "USD", "value": 1.09, "updated": "2025-11-25"}
            ],
            "baseUnit": "EUR"
        }"#;
        tokio::fs::write(env.config().data_path(), json)
            .await
            .unwrap();
        let out = check(env.config()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);
        assert!(out.message().starts_with("Found 2 problem(s)"));
        assert!(out
            .output()
            .unwrap()
            .contains("- rate 1 references unknown unit 'EUR'"));
    }
}
