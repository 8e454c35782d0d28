//! Integration tests for the MySQL repositories.
//!
//! These tests run against a real MySQL database using testcontainers and
//! need Docker, so they are ignored by default:
//! `cargo test -p gymdesk-repository -- --ignored`.

mod common;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::TestDatabase;
use gymdesk_core::{
    AttendanceOutcome, AttendanceStatus, AttendanceWindow, Email, EnrollmentOutcome, Exercise, GymClass, Membership,
    MembershipType, PageRequest, Payment, PaymentMethod, PaymentStatus, Trainer, TrainerProfile, User, UserRole,
    WorkoutPlan,
};
use gymdesk_repository::{
    AttendanceRepository, ClassRepository, DatabasePool, EnrollmentRepository, HealthProbe, MarkAttendance,
    MembershipRenewal, MembershipRepository, MySqlAttendanceRepository, MySqlClassRepository,
    MySqlEnrollmentRepository, MySqlMembershipRepository, MySqlPaymentRepository, MySqlTrainerRepository,
    MySqlUserRepository, MySqlWorkoutPlanRepository, PaymentRepository, PlanFilter, TrainerRepository, UserFilter,
    UserRepository, WorkoutPlanRepository,
};
use std::sync::Arc;

fn user(email: &str, role: UserRole) -> User {
    User::new(
        "Test".to_string(),
        "User".to_string(),
        Email::new_unchecked(email),
        "$argon2id$v=19$m=65536,t=3,p=1$c2FsdA$aGFzaA".to_string(),
        role,
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn create_trainer(pool: &Arc<DatabasePool>, email: &str) -> TrainerProfile {
    let coach = user(email, UserRole::Trainer);
    let profile = TrainerProfile {
        trainer: Trainer::new(coach.id, "Strength".to_string(), 5),
        user: coach,
    };
    MySqlTrainerRepository::new(Arc::clone(pool))
        .create(&profile)
        .await
        .expect("Failed to create trainer")
}

async fn create_class(pool: &Arc<DatabasePool>, trainer: &TrainerProfile, capacity: u32) -> GymClass {
    let starts_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let class = GymClass::new(
        "Power Lifting".to_string(),
        trainer.trainer.id,
        starts_at,
        starts_at + Duration::hours(1),
        capacity,
    )
    .unwrap();
    MySqlClassRepository::new(Arc::clone(pool))
        .save(&class)
        .await
        .expect("Failed to save class")
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check() {
    let db = TestDatabase::new().await;
    db.pool().health_check().await.expect("Database should answer");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_register_and_find_by_email() {
    let db = TestDatabase::new().await;
    let repo = MySqlUserRepository::new(db.pool());

    let member = user("Ana@Gym.test", UserRole::Member);
    let membership = Membership::start(member.id, MembershipType::Monthly, date(2024, 1, 31)).unwrap();
    repo.register(&member, Some(&membership)).await.expect("Failed to register");

    let found = repo
        .find_by_email("ana@gym.test")
        .await
        .expect("Query failed")
        .expect("User not found");
    assert_eq!(found.id, member.id);
    assert!(repo.exists_by_email("ANA@GYM.TEST").await.unwrap());

    let stored = MySqlMembershipRepository::new(db.pool())
        .find_by_user(member.id)
        .await
        .unwrap()
        .expect("Membership not found");
    assert_eq!(stored.expiry_date, date(2024, 2, 29));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = MySqlUserRepository::new(db.pool());

    repo.save(&user("dup@gym.test", UserRole::Member)).await.unwrap();
    let err = repo.save(&user("dup@gym.test", UserRole::Member)).await.unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_all_with_role_filter() {
    let db = TestDatabase::new().await;
    let repo = MySqlUserRepository::new(db.pool());
    for i in 0..3 {
        repo.save(&user(&format!("m{i}@gym.test"), UserRole::Member)).await.unwrap();
    }
    create_trainer(&db.pool(), "coach@gym.test").await;

    let filter = UserFilter {
        role: Some(UserRole::Member),
        search: None,
    };
    let page = repo.find_all(&filter, PageRequest::new(1, 2)).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.total_elements(), 3);
    assert!(page.has_next());
    assert_eq!(repo.count_by_role(UserRole::Trainer).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_enroll_respects_capacity() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let users = MySqlUserRepository::new(Arc::clone(&pool));
    let enrollments = MySqlEnrollmentRepository::new(Arc::clone(&pool));

    let trainer = create_trainer(&pool, "coach@gym.test").await;
    let class = create_class(&pool, &trainer, 1).await;
    let first = user("first@gym.test", UserRole::Member);
    let second = user("second@gym.test", UserRole::Member);
    users.save(&first).await.unwrap();
    users.save(&second).await.unwrap();

    let outcome = enrollments.enroll(class.id, first.id, None).await.unwrap();
    assert!(matches!(outcome, EnrollmentOutcome::Enrolled(_)));
    let again = enrollments.enroll(class.id, first.id, None).await.unwrap();
    assert!(matches!(again, EnrollmentOutcome::AlreadyEnrolled));
    let full = enrollments.enroll(class.id, second.id, None).await.unwrap();
    assert!(matches!(full, EnrollmentOutcome::ClassFull { capacity: 1 }));
    let coach = enrollments.enroll(class.id, trainer.user.id, None).await.unwrap();
    assert!(matches!(coach, EnrollmentOutcome::NotAMember));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_mark_attendance_upserts() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let trainer = create_trainer(&pool, "coach@gym.test").await;
    let class = create_class(&pool, &trainer, 10).await;
    let member = user("member@gym.test", UserRole::Member);
    MySqlUserRepository::new(Arc::clone(&pool)).save(&member).await.unwrap();
    MySqlEnrollmentRepository::new(Arc::clone(&pool))
        .enroll(class.id, member.id, None)
        .await
        .unwrap();

    let repo = MySqlAttendanceRepository::new(Arc::clone(&pool));
    let request = |status| MarkAttendance {
        class_id: class.id,
        member_id: member.id,
        date: date(2024, 6, 3),
        status,
        marked_by: trainer.user.id,
        window: AttendanceWindow::ending_on(date(2024, 6, 10), 30),
    };

    let first = repo.mark(&request(AttendanceStatus::Absent)).await.unwrap();
    assert!(matches!(first, AttendanceOutcome::Recorded(_)));
    let second = repo.mark(&request(AttendanceStatus::Late)).await.unwrap();
    assert!(matches!(second, AttendanceOutcome::Updated(_)));

    let marks = repo.find_by_class_and_date(class.id, date(2024, 6, 3)).await.unwrap();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].status, AttendanceStatus::Late);

    let summary = repo.summary(member.id, Some(class.id)).await.unwrap();
    assert_eq!(summary.total, 1);
    assert!((summary.attendance_percentage - 100.0).abs() < f64::EPSILON);

    let mut future = request(AttendanceStatus::Present);
    future.date = date(2024, 6, 11);
    assert!(matches!(
        repo.mark(&future).await.unwrap(),
        AttendanceOutcome::DateOutOfRange(_)
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_process_payment_extends_membership() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let member = user("payer@gym.test", UserRole::Member);
    MySqlUserRepository::new(Arc::clone(&pool)).save(&member).await.unwrap();
    let repo = MySqlPaymentRepository::new(Arc::clone(&pool));
    let renewal = MembershipRenewal {
        membership_type: MembershipType::Quarterly,
        today: date(2024, 1, 15),
    };

    let mut payment = Payment::completed(member.id, 12_000, PaymentMethod::Card).unwrap();
    payment.membership_type = Some(MembershipType::Quarterly);
    let processed = repo.process(&payment, Some(renewal)).await.unwrap();
    assert_eq!(processed.membership.unwrap().expiry_date, date(2024, 4, 15));

    let second = Payment::completed(member.id, 12_000, PaymentMethod::Cash).unwrap();
    let processed = repo.process(&second, Some(renewal)).await.unwrap();
    assert_eq!(processed.membership.unwrap().expiry_date, date(2024, 7, 15));

    let mut refunded = processed.payment;
    refunded.transition_to(PaymentStatus::Refunded).unwrap();
    repo.update(&refunded).await.unwrap();
    assert_eq!(repo.revenue_cents(None, None).await.unwrap(), 12_000);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_renew_and_payment_serialize_on_membership_row() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let member = user("renewer@gym.test", UserRole::Member);
    let membership = Membership::start(member.id, MembershipType::Monthly, date(2024, 1, 15)).unwrap();
    MySqlUserRepository::new(Arc::clone(&pool))
        .register(&member, Some(&membership))
        .await
        .unwrap();

    let memberships = MySqlMembershipRepository::new(Arc::clone(&pool));
    let payments = MySqlPaymentRepository::new(Arc::clone(&pool));
    let mut payment = Payment::completed(member.id, 4_500, PaymentMethod::Card).unwrap();
    payment.membership_type = Some(MembershipType::Monthly);
    let renewal = MembershipRenewal {
        membership_type: MembershipType::Monthly,
        today: date(2024, 1, 20),
    };

    let (renewed, paid) = tokio::join!(
        memberships.renew(member.id, None, 2, date(2024, 1, 20)),
        payments.process(&payment, Some(renewal)),
    );
    renewed.unwrap();
    paid.unwrap();

    // 2024-02-15 plus three months, whichever transaction locked first.
    let stored = memberships.find_by_user(member.id).await.unwrap().unwrap();
    assert_eq!(stored.expiry_date, date(2024, 5, 15));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_trainer_delete_cascades() {
    let db = TestDatabase::new().await;
    let pool = db.pool();
    let trainer = create_trainer(&pool, "coach@gym.test").await;
    let class = create_class(&pool, &trainer, 10).await;
    let member = user("member@gym.test", UserRole::Member);
    MySqlUserRepository::new(Arc::clone(&pool)).save(&member).await.unwrap();
    MySqlEnrollmentRepository::new(Arc::clone(&pool))
        .enroll(class.id, member.id, None)
        .await
        .unwrap();

    let plans = MySqlWorkoutPlanRepository::new(Arc::clone(&pool));
    let mut plan = WorkoutPlan::new(
        member.id,
        "Base building".to_string(),
        8,
        vec![Exercise {
            name: "Deadlift".to_string(),
            sets: 5,
            reps: 3,
            rest_seconds: Some(180),
        }],
    );
    plan.trainer_id = Some(trainer.trainer.id);
    plans.save(&plan).await.unwrap();

    let trainers = MySqlTrainerRepository::new(Arc::clone(&pool));
    assert!(trainers.delete(trainer.trainer.id).await.unwrap());

    assert!(trainers.find_by_id(trainer.trainer.id).await.unwrap().is_none());
    assert!(MySqlClassRepository::new(Arc::clone(&pool))
        .find_by_id(class.id)
        .await
        .unwrap()
        .is_none());
    let detached = plans.find_by_id(plan.id).await.unwrap().expect("Plan should survive");
    assert_eq!(detached.trainer_id, None);
    assert_eq!(detached.exercises[0].name, "Deadlift");

    let by_member = plans
        .find_all(
            &PlanFilter {
                member_id: Some(member.id),
                trainer_id: None,
            },
            PageRequest::first(),
        )
        .await
        .unwrap();
    assert_eq!(by_member.total_elements(), 1);
}
