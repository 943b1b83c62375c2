// Test file - these are expected patterns in test code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Edge case tests for the subscription lifecycle and revenue pools
//!
//! These tests need a running Postgres with the migrations applied; point
//! DATABASE_URL at it and run with `cargo test -- --ignored`.

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use sqlx::PgPool;
    use uuid::Uuid;

    use gymstack_shared::pagination::PageQuery;
    use gymstack_shared::types::{MemberPaymentMethod, PlatformPaymentMethod};

    use crate::error::BillingError;
    use crate::member_subscriptions::{
        MemberSubscriptionService, NewMemberSubscription,
    };
    use crate::payments::{PaymentFilters, PaymentService};
    use crate::plans::{NewPlan, PlanService};
    use crate::subscriptions::{NewGymSubscription, SubscriptionService};
    use crate::tenant::TenantScope;

    async fn setup_test_pool() -> PgPool {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/gymstack_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    /// Create a tenant account; subscription_status starts as the schema
    /// default, 'expired'.
    async fn create_test_gym(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO gym_managers (id, name, email, password_hash, gym_name)
            VALUES ($1, 'Test Owner', $2, 'TEST_HASH', 'Test Gym')
            "#,
        )
        .bind(id)
        .bind(format!("owner-{}@example.com", id))
        .execute(pool)
        .await
        .expect("Failed to create test gym");
        id
    }

    async fn create_test_member(pool: &PgPool, gym_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO gym_members (id, gym_id, name, phone)
            VALUES ($1, $2, 'Test Member', '0100000000')
            "#,
        )
        .bind(id)
        .bind(gym_id)
        .execute(pool)
        .await
        .expect("Failed to create test member");
        id
    }

    async fn cleanup_gym(pool: &PgPool, gym_id: Uuid) {
        sqlx::query("DELETE FROM gym_managers WHERE id = $1")
            .bind(gym_id)
            .execute(pool)
            .await
            .ok();
    }

    // =========================================================================
    // Tenant isolation: a scoped lookup from another tenant is NotFound,
    // never the record
    // =========================================================================
    #[tokio::test]
    #[ignore]
    async fn cross_tenant_member_subscription_lookup_is_not_found() {
        let pool = setup_test_pool().await;
        let gym_a = create_test_gym(&pool).await;
        let gym_b = create_test_gym(&pool).await;
        let member = create_test_member(&pool, gym_a).await;

        let service = MemberSubscriptionService::new(pool.clone());
        let subscription = service
            .create(
                TenantScope::new(gym_a),
                NewMemberSubscription {
                    member_id: member,
                    plan_id: None,
                    plan_name: Some("Trial".to_string()),
                    price: Some(50.0),
                    duration: Some(1),
                    payment_method: MemberPaymentMethod::Cash,
                    auto_renew: false,
                },
            )
            .await
            .unwrap();

        // Same id, wrong tenant.
        let result = service.get(TenantScope::new(gym_b), subscription.id).await;
        assert!(matches!(result, Err(BillingError::NotFound(_))));

        // Right tenant still sees it.
        assert!(service.get(TenantScope::new(gym_a), subscription.id).await.is_ok());

        cleanup_gym(&pool, gym_a).await;
        cleanup_gym(&pool, gym_b).await;
    }

    // =========================================================================
    // Platform subscription creation: calendar end date, gym activation,
    // settled payment - all or nothing
    // =========================================================================
    #[tokio::test]
    #[ignore]
    async fn platform_subscription_activates_gym_with_calendar_end_date() {
        let pool = setup_test_pool().await;
        let gym = create_test_gym(&pool).await;

        let plans = PlanService::new(pool.clone());
        let plan = plans
            .create(NewPlan {
                name: "Monthly".to_string(),
                description: None,
                price: 100.0,
                duration: 1,
                duration_unit: gymstack_shared::types::DurationUnit::Months,
                features: vec![],
                max_members: None,
            })
            .await
            .unwrap();

        let service = SubscriptionService::new(pool.clone());
        let subscription = service
            .create(NewGymSubscription {
                gym_id: gym,
                plan_id: plan.id,
                payment_method: PlatformPaymentMethod::Local,
                payment_gateway_id: None,
                auto_renew: false,
            })
            .await
            .unwrap();

        // One calendar month, not 30 fixed days.
        let months_apart = (subscription.end_date.year() - subscription.start_date.year()) * 12
            + (subscription.end_date.month() as i32 - subscription.start_date.month() as i32);
        assert_eq!(months_apart, 1);

        let (status, current): (String, Option<Uuid>) = sqlx::query_as(
            "SELECT subscription_status, current_subscription_id FROM gym_managers WHERE id = $1",
        )
        .bind(gym)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(status, "active");
        assert_eq!(current, Some(subscription.id));

        let payment_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payments WHERE related_id = $1 AND kind = 'gym_manager_subscription' AND status = 'completed'",
        )
        .bind(subscription.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(payment_count, 1);

        cleanup_gym(&pool, gym).await;
        plans.delete(plan.id).await.ok();
    }

    // =========================================================================
    // Manual member subscriptions bill in months: duration 7 is 7 months
    // =========================================================================
    #[tokio::test]
    #[ignore]
    async fn manual_member_subscription_duration_is_months() {
        let pool = setup_test_pool().await;
        let gym = create_test_gym(&pool).await;
        let member = create_test_member(&pool, gym).await;

        let service = MemberSubscriptionService::new(pool.clone());
        let subscription = service
            .create(
                TenantScope::new(gym),
                NewMemberSubscription {
                    member_id: member,
                    plan_id: None,
                    plan_name: Some("Trial".to_string()),
                    price: Some(50.0),
                    duration: Some(7),
                    payment_method: MemberPaymentMethod::Cash,
                    auto_renew: false,
                },
            )
            .await
            .unwrap();

        let months_apart = (subscription.end_date.year() - subscription.start_date.year()) * 12
            + (subscription.end_date.month() as i32 - subscription.start_date.month() as i32);
        assert_eq!(months_apart, 7, "manual duration 7 must be seven months");

        cleanup_gym(&pool, gym).await;
    }

    // =========================================================================
    // Revenue pools stay disjoint even for the same tenant
    // =========================================================================
    #[tokio::test]
    #[ignore]
    async fn revenue_pools_never_mix() {
        let pool = setup_test_pool().await;
        let gym = create_test_gym(&pool).await;
        let member = create_test_member(&pool, gym).await;

        let plans = PlanService::new(pool.clone());
        let plan = plans
            .create(NewPlan {
                name: "Monthly".to_string(),
                description: None,
                price: 100.0,
                duration: 1,
                duration_unit: gymstack_shared::types::DurationUnit::Months,
                features: vec![],
                max_members: None,
            })
            .await
            .unwrap();

        // One 100 platform payment and one 50 tenant payment.
        SubscriptionService::new(pool.clone())
            .create(NewGymSubscription {
                gym_id: gym,
                plan_id: plan.id,
                payment_method: PlatformPaymentMethod::Local,
                payment_gateway_id: None,
                auto_renew: false,
            })
            .await
            .unwrap();
        MemberSubscriptionService::new(pool.clone())
            .create(
                TenantScope::new(gym),
                NewMemberSubscription {
                    member_id: member,
                    plan_id: None,
                    plan_name: Some("Trial".to_string()),
                    price: Some(50.0),
                    duration: Some(1),
                    payment_method: MemberPaymentMethod::Cash,
                    auto_renew: false,
                },
            )
            .await
            .unwrap();

        let payments = PaymentService::new(pool.clone());

        // Tenant pool sees exactly the 50.
        let (_, _, tenant_total) = payments
            .list_for_tenant(
                TenantScope::new(gym),
                PaymentFilters::default(),
                PageQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(tenant_total, 50.0);

        // Platform pool for this gym sees exactly the 100.
        let (_, _, platform_total) = payments
            .list_all(
                PaymentFilters {
                    gym_id: Some(gym),
                    ..Default::default()
                },
                PageQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(platform_total, 100.0);

        cleanup_gym(&pool, gym).await;
        plans.delete(plan.id).await.ok();
    }

    // =========================================================================
    // Cancellation mirrors onto the gym and is terminal
    // =========================================================================
    #[tokio::test]
    #[ignore]
    async fn cancel_mirrors_status_onto_gym() {
        let pool = setup_test_pool().await;
        let gym = create_test_gym(&pool).await;

        let plans = PlanService::new(pool.clone());
        let plan = plans
            .create(NewPlan {
                name: "Monthly".to_string(),
                description: None,
                price: 100.0,
                duration: 1,
                duration_unit: gymstack_shared::types::DurationUnit::Months,
                features: vec![],
                max_members: None,
            })
            .await
            .unwrap();

        let service = SubscriptionService::new(pool.clone());
        let subscription = service
            .create(NewGymSubscription {
                gym_id: gym,
                plan_id: plan.id,
                payment_method: PlatformPaymentMethod::Local,
                payment_gateway_id: None,
                auto_renew: false,
            })
            .await
            .unwrap();

        service.cancel(subscription.id).await.unwrap();

        let status: String =
            sqlx::query_scalar("SELECT subscription_status FROM gym_managers WHERE id = $1")
                .bind(gym)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "cancelled");

        cleanup_gym(&pool, gym).await;
        plans.delete(plan.id).await.ok();
    }
}
