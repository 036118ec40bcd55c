//! CSV export of leaderboards and distribution reports.

use anyhow::Result;
use std::path::Path;

use crate::leaderboard::LeaderboardResult;
use crate::reports::DistributionReport;

pub fn write_leaderboard_csv(path: impl AsRef<Path>, result: &LeaderboardResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["rank", "username", "test_count"])?;
    for entry in &result.rankings {
        writer.write_record([
            entry.rank.to_string(),
            entry.username.clone(),
            entry.test_count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_distribution_csv(path: impl AsRef<Path>, report: &DistributionReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["label", "count", "percentage"])?;
    for bucket in &report.buckets {
        writer.write_record([
            bucket.label.clone(),
            bucket.count.to_string(),
            format!("{:.1}", bucket.percentage),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
