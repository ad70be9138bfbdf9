//! Coach account surface against a live database, including the admin share
//! of the gate.

mod common;

use mindwell::auth::UserRole;
use mindwell::models::CoachProfileUpsert;
use mindwell::services::CoachService;

fn profile_payload() -> CoachProfileUpsert {
    CoachProfileUpsert {
        qualifications: Some("MSc Psychology".to_string()),
        specialization: Some("anxiety".to_string()),
        experience_years: Some(5),
        charges_per_slot: Some(80.0),
        availability_status: None,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn profile_upsert_creates_then_patches() {
    let pool = common::pool().await;
    let coach_id = common::seed_user(&pool, UserRole::Coach).await;
    let coaches = CoachService::new(pool.clone());

    let created = coaches
        .upsert_profile(coach_id, profile_payload())
        .await
        .unwrap();
    assert_eq!(created.specialization.as_deref(), Some("anxiety"));
    assert!(created.availability_status);

    let updated = coaches
        .upsert_profile(
            coach_id,
            CoachProfileUpsert {
                qualifications: None,
                specialization: Some("depression".to_string()),
                experience_years: None,
                charges_per_slot: None,
                availability_status: Some(false),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.specialization.as_deref(), Some("depression"));
    assert_eq!(updated.experience_years, Some(5));
    assert!(!updated.availability_status);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn admins_reach_the_coach_account_surface() {
    let pool = common::pool().await;
    let admin_id = common::seed_user(&pool, UserRole::Admin).await;
    let coaches = CoachService::new(pool.clone());

    let account = coaches.get_coach_me(admin_id).await.unwrap();
    assert!(account.coach_profile.is_none());

    let profile = coaches
        .upsert_profile(admin_id, profile_payload())
        .await
        .unwrap();
    assert_eq!(profile.user_id, admin_id);
}
