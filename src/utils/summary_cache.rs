use anyhow::Result;
use chrono::{Datelike, Local};
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::attendance::presence::{MonthlyPresenceSummary, PresenceRules};

/// (employee_id, year, month)
pub type SummaryKey = (u64, i32, u32);

/// Read-through cache for monthly presence summaries. Purely a read
/// optimization: correctness never depends on a hit. Entries expire by
/// TTL and are invalidated whenever a new event lands for the employee.
#[derive(Clone)]
pub struct SummaryCache {
    cache: Cache<SummaryKey, MonthlyPresenceSummary>,
}

impl SummaryCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &SummaryKey) -> Option<MonthlyPresenceSummary> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: SummaryKey, summary: MonthlyPresenceSummary) {
        self.cache.insert(key, summary).await;
    }

    /// Drops the cached month a freshly appended event belongs to.
    pub async fn invalidate(&self, key: &SummaryKey) {
        self.cache.invalidate(key).await;
    }
}

/// Pre-computes current-month summaries for active employees in batches,
/// so the first admin dashboard load after a restart is warm.
pub async fn warmup_summary_cache(
    pool: &MySqlPool,
    cache: &SummaryCache,
    rules: PresenceRules,
    batch_size: usize,
) -> Result<()> {
    let today = Local::now().date_naive();
    let (year, month) = (today.year(), today.month());

    let mut stream = sqlx::query_as::<_, (u64,)>(
        r#"
        SELECT id
        FROM employees
        WHERE status = 'active'
        ORDER BY id
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (employee_id,) = row?;
        batch.push(employee_id);
        total_count += 1;

        if batch.len() >= batch_size {
            warm_batch(pool, cache, rules, year, month, today, &batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        warm_batch(pool, cache, rules, year, month, today, &batch).await;
    }

    log::info!(
        "Summary cache warmup complete: {} employees for {}-{:02}",
        total_count,
        year,
        month
    );

    Ok(())
}

async fn warm_batch(
    pool: &MySqlPool,
    cache: &SummaryCache,
    rules: PresenceRules,
    year: i32,
    month: u32,
    today: chrono::NaiveDate,
    employee_ids: &[u64],
) {
    let futures: Vec<_> = employee_ids
        .iter()
        .map(|&employee_id| async move {
            match crate::api::attendance::load_monthly_summary(
                pool,
                rules,
                employee_id,
                year,
                month,
                today,
            )
            .await
            {
                Ok(summary) => {
                    cache.insert((employee_id, year, month), summary).await;
                }
                Err(e) => {
                    log::warn!(
                        "Summary warmup skipped employee {}: {}",
                        employee_id,
                        e
                    );
                }
            }
        })
        .collect();

    futures::future::join_all(futures).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn insert_get_invalidate_round_trip() {
        let cache = SummaryCache::new(16, Duration::from_secs(60));
        let key = (1000u64, 2026, 8u32);
        let summary = MonthlyPresenceSummary {
            total_days: 5,
            working_days: 5,
            present_days: 4,
            absent_days: 1,
            ..Default::default()
        };

        assert!(cache.get(&key).await.is_none());

        cache.insert(key, summary).await;
        assert_eq!(cache.get(&key).await, Some(summary));

        cache.invalidate(&key).await;
        // moka invalidation is applied on the read path, so a fresh get
        // must miss.
        assert!(cache.get(&key).await.is_none());
    }
}
