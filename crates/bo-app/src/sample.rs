//! Generate a sample campaign export for trying the dashboard

use std::path::Path;

use anyhow::{Context, Result};
use bo_data::sources::DailyRecord;
use chrono::{Duration, NaiveDate};

const CAMPAIGNS: &[(&str, &str)] = &[
    ("Brand - Exact", "SP"),
    ("Brand - Phrase", "SP"),
    ("Generic - Broad", "SP"),
    ("Competitor - Exact", "SP"),
    ("Auto - Discovery", "SP"),
    ("Headline - Brand", "SB"),
    ("Video - Awareness", "SB"),
    ("Display - Retargeting", "SD"),
    ("Display - Audiences", "SD"),
    ("Long Tail - Exact", "SP"),
    ("Seasonal - Holiday", "SP"),
    ("Clearance - Broad", "SP"),
];

/// Write `days` days of records ending on `end` for a fixed set of campaigns.
/// Returns the number of records written.
pub fn write_sample_csv(path: &Path, profile_id: &str, end: NaiveDate, days: i64) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut rng = 42u32;
    let mut written = 0;
    for day in (0..days).rev() {
        let date = end - Duration::days(day);
        for (index, (name, ad_type)) in CAMPAIGNS.iter().enumerate() {
            let scale = 1.0 + index as f64 * 0.35;
            let impressions = (800.0 * scale * (0.6 + random_float(&mut rng))) as u64;
            let clicks = (impressions as f64 * (0.004 + 0.01 * random_float(&mut rng))) as u64;
            let orders = (clicks as f64 * (0.05 + 0.15 * random_float(&mut rng))) as u64;
            let spend = round2(clicks as f64 * (0.45 + random_float(&mut rng)));
            let sales = round2(orders as f64 * (18.0 + 12.0 * random_float(&mut rng)));

            let record = DailyRecord {
                date,
                profile_id: Some(profile_id.to_string()),
                campaign_id: format!("{}", 100_000 + index),
                campaign_name: name.to_string(),
                ad_type: ad_type.to_string(),
                state: if index % 5 == 4 { "paused" } else { "enabled" }.to_string(),
                opt_group: (index % 3 == 0).then(|| "Core".to_string()),
                budget: 25.0 * (1 + index % 4) as f64,
                bid: round2(0.5 + 0.15 * index as f64),
                start_date: Some((end - Duration::days(days + index as i64 * 7)).to_string()),
                end_date: None,
                last_optimized: (index % 2 == 0)
                    .then(|| (end - Duration::days(index as i64)).to_string()),
                impressions,
                clicks,
                orders,
                units: orders + orders / 4,
                spend,
                sales,
            };
            writer.serialize(&record)?;
            written += 1;
        }
    }

    writer.flush()?;
    Ok(written)
}

fn random_float(seed: &mut u32) -> f64 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    (*seed as f64) / (u32::MAX as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::DateRange;
    use bo_data::{CampaignSource, CsvSource, ReportRequest};

    #[tokio::test]
    async fn test_sample_loads_through_csv_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        let written = write_sample_csv(&path, "demo", end, 14).unwrap();
        assert_eq!(written, 14 * CAMPAIGNS.len());

        let source = CsvSource::open(&path).await.unwrap();
        let range = DateRange::parse("2025-03-25", "2025-03-31").unwrap();
        let report = source
            .fetch(&ReportRequest::new("demo", &range, Vec::new()), Default::default())
            .await
            .unwrap();
        assert_eq!(report.campaigns.len(), CAMPAIGNS.len());
        assert_eq!(report.daily_performance.len(), 7);
    }
}
