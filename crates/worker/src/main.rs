//! Gymstack Background Worker
//!
//! The API service only creates and cancels subscriptions; moving them to
//! `expired` when their end date passes is this worker's job. Scheduled
//! jobs:
//! - Platform subscription expiry sweep (hourly at :05)
//! - Member subscription expiry sweep (hourly at :10)
//! - Billing invariant check (daily at 03:00 UTC)
//! - Heartbeat (every 5 minutes)

use std::time::Duration;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

use gymstack_billing::BillingInvariants;

async fn create_db_pool() -> anyhow::Result<PgPool> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    Ok(gymstack_shared::create_pool(&database_url, max_connections).await?)
}

/// Flip platform subscriptions past their end date to `expired` and mirror
/// the status onto gyms still marked active. One transaction per sweep.
async fn sweep_platform_subscriptions(pool: &PgPool) -> anyhow::Result<u64> {
    let mut tx = pool.begin().await?;

    let expired: Vec<(Uuid, Uuid)> = sqlx::query_as(
        r#"
        UPDATE gym_subscriptions SET status = 'expired', updated_at = NOW()
        WHERE status = 'active' AND end_date < NOW()
        RETURNING id, gym_id
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    if !expired.is_empty() {
        let gym_ids: Vec<Uuid> = expired.iter().map(|(_, gym_id)| *gym_id).collect();
        sqlx::query(
            r#"
            UPDATE gym_managers SET subscription_status = 'expired', updated_at = NOW()
            WHERE id = ANY($1)
              AND subscription_status = 'active'
              AND NOT EXISTS (
                  SELECT 1 FROM gym_subscriptions s
                  WHERE s.gym_id = gym_managers.id
                    AND s.status = 'active' AND s.end_date >= NOW()
              )
            "#,
        )
        .bind(&gym_ids)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(expired.len() as u64)
}

/// Flip member subscriptions past their end date to `expired`. No
/// tenant-level mirror exists for these.
async fn sweep_member_subscriptions(pool: &PgPool) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE member_subscriptions SET status = 'expired', updated_at = NOW()
        WHERE status = 'active' AND end_date < NOW()
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    info!("Starting Gymstack Worker");

    let pool = create_db_pool().await?;
    info!("Database pool created");

    let scheduler = JobScheduler::new().await?;

    // Job 1: platform subscription expiry sweep (hourly at :05)
    let platform_pool = pool.clone();
    scheduler
        .add(Job::new_async("0 5 * * * *", move |_uuid, _l| {
            let pool = platform_pool.clone();
            Box::pin(async move {
                match sweep_platform_subscriptions(&pool).await {
                    Ok(0) => info!("Platform expiry sweep: nothing to expire"),
                    Ok(count) => info!(count, "Platform expiry sweep: subscriptions expired"),
                    Err(e) => error!(error = %e, "Platform expiry sweep failed"),
                }
            })
        })?)
        .await?;
    info!("Scheduled: platform subscription expiry sweep (hourly)");

    // Job 2: member subscription expiry sweep (hourly at :10)
    let member_pool = pool.clone();
    scheduler
        .add(Job::new_async("0 10 * * * *", move |_uuid, _l| {
            let pool = member_pool.clone();
            Box::pin(async move {
                match sweep_member_subscriptions(&pool).await {
                    Ok(0) => info!("Member expiry sweep: nothing to expire"),
                    Ok(count) => info!(count, "Member expiry sweep: subscriptions expired"),
                    Err(e) => error!(error = %e, "Member expiry sweep failed"),
                }
            })
        })?)
        .await?;
    info!("Scheduled: member subscription expiry sweep (hourly)");

    // Job 3: billing invariant check (daily at 03:00 UTC)
    let invariant_pool = pool.clone();
    scheduler
        .add(Job::new_async("0 0 3 * * *", move |_uuid, _l| {
            let pool = invariant_pool.clone();
            Box::pin(async move {
                match BillingInvariants::new(pool).run_all().await {
                    Ok(summary) if summary.healthy => {
                        info!(checks = summary.checks_run, "Billing invariants healthy")
                    }
                    Ok(summary) => {
                        for violation in &summary.violations {
                            warn!(
                                invariant = %violation.invariant,
                                severity = %violation.severity,
                                gyms = violation.gym_ids.len(),
                                "{}",
                                violation.description
                            );
                        }
                    }
                    Err(e) => error!(error = %e, "Invariant check failed"),
                }
            })
        })?)
        .await?;
    info!("Scheduled: billing invariant check (daily at 03:00 UTC)");

    // Job 4: heartbeat (every 5 minutes)
    scheduler
        .add(Job::new_async("0 */5 * * * *", |_uuid, _l| {
            Box::pin(async move {
                info!("Worker heartbeat - all systems operational");
            })
        })?)
        .await?;
    info!("Scheduled: heartbeat (every 5 minutes)");

    scheduler.start().await?;
    info!("Scheduler started");

    // Run the initial sweeps immediately so a restart doesn't wait an hour.
    match sweep_platform_subscriptions(&pool).await {
        Ok(count) => info!(count, "Initial platform expiry sweep complete"),
        Err(e) => error!(error = %e, "Initial platform expiry sweep failed"),
    }
    match sweep_member_subscriptions(&pool).await {
        Ok(count) => info!(count, "Initial member expiry sweep complete"),
        Err(e) => error!(error = %e, "Initial member expiry sweep failed"),
    }

    loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}
