//! Classes, enrollments and attendance.

use super::{matches_search, paginate, MemoryStore};
use crate::traits::{AttendanceRepository, ClassFilter, ClassRepository, EnrollmentRepository, MarkAttendance};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{
    Attendance, AttendanceOutcome, AttendanceSummary, ClassId, ClassUpdateOutcome, Enrollment, EnrollmentOutcome,
    GymClass, GymdeskError, GymdeskResult, Page, PageRequest, TrainerId, UserId, UserRole,
};

#[async_trait]
impl ClassRepository for MemoryStore {
    async fn find_by_id(&self, id: ClassId) -> GymdeskResult<Option<GymClass>> {
        Ok(self.tables.lock().classes.get(&id).cloned())
    }

    async fn find_all(&self, filter: &ClassFilter, page: PageRequest) -> GymdeskResult<Page<GymClass>> {
        let tables = self.tables.lock();
        let mut classes: Vec<GymClass> = tables
            .classes
            .values()
            .filter(|c| filter.trainer_id.map_or(true, |t| c.trainer_id == t))
            .filter(|c| filter.from.map_or(true, |from| c.starts_at >= from))
            .filter(|c| filter.to.map_or(true, |to| c.starts_at < to))
            .filter(|c| {
                matches_search(
                    filter.search.as_deref(),
                    &[c.name.as_str(), c.location.as_deref().unwrap_or_default()],
                )
            })
            .cloned()
            .collect();
        classes.sort_by_key(|c| c.starts_at);
        Ok(paginate(&classes, page))
    }

    async fn has_overlap(
        &self,
        trainer_id: TrainerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<ClassId>,
    ) -> GymdeskResult<bool> {
        Ok(self
            .tables
            .lock()
            .classes
            .values()
            .any(|c| c.trainer_id == trainer_id && Some(c.id) != exclude && c.overlaps(starts_at, ends_at)))
    }

    async fn save(&self, class: &GymClass) -> GymdeskResult<GymClass> {
        let mut tables = self.tables.lock();
        if !tables.trainers.contains_key(&class.trainer_id) {
            return Err(GymdeskError::Database("foreign key classes.trainer_id violated".to_string()));
        }
        tables.classes.insert(class.id, class.clone());
        Ok(class.clone())
    }

    async fn update(&self, class: &GymClass) -> GymdeskResult<ClassUpdateOutcome> {
        let mut tables = self.tables.lock();
        if !tables.classes.contains_key(&class.id) {
            return Ok(ClassUpdateOutcome::NotFound);
        }

        let enrolled = tables.enrolled_count(class.id);
        if u64::from(class.capacity) < enrolled {
            return Ok(ClassUpdateOutcome::CapacityBelowEnrolled { enrolled });
        }
        let busy = tables.classes.values().any(|c| {
            c.trainer_id == class.trainer_id && c.id != class.id && c.overlaps(class.starts_at, class.ends_at)
        });
        if busy {
            return Ok(ClassUpdateOutcome::TrainerBusy);
        }

        tables.classes.insert(class.id, class.clone());
        Ok(ClassUpdateOutcome::Updated {
            class: class.clone(),
            enrolled,
        })
    }

    async fn delete(&self, id: ClassId) -> GymdeskResult<bool> {
        let mut tables = self.tables.lock();
        if tables.classes.remove(&id).is_none() {
            return Ok(false);
        }
        let enrollment_ids: Vec<_> = tables
            .enrollments
            .iter()
            .filter(|e| e.class_id == id)
            .map(|e| e.id)
            .collect();
        tables.drop_attendance_of(&enrollment_ids);
        tables.enrollments.retain(|e| e.class_id != id);
        Ok(true)
    }

    async fn enrolled_count(&self, id: ClassId) -> GymdeskResult<u64> {
        Ok(self.tables.lock().enrolled_count(id))
    }

    async fn count(&self) -> GymdeskResult<u64> {
        Ok(self.tables.lock().classes.len() as u64)
    }

    async fn count_upcoming(&self, now: DateTime<Utc>) -> GymdeskResult<u64> {
        Ok(self.tables.lock().classes.values().filter(|c| c.starts_at >= now).count() as u64)
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryStore {
    async fn enroll(
        &self,
        class_id: ClassId,
        member_id: UserId,
        membership_required_on: Option<NaiveDate>,
    ) -> GymdeskResult<EnrollmentOutcome> {
        let mut tables = self.tables.lock();

        let Some(capacity) = tables.classes.get(&class_id).map(|c| c.capacity) else {
            return Ok(EnrollmentOutcome::ClassNotFound);
        };
        if !tables.users.get(&member_id).is_some_and(|u| u.role == UserRole::Member) {
            return Ok(EnrollmentOutcome::NotAMember);
        }
        if let Some(today) = membership_required_on {
            let active = tables
                .memberships
                .get(&member_id)
                .is_some_and(|m| m.is_active_on(today));
            if !active {
                return Ok(EnrollmentOutcome::MembershipInactive);
            }
        }
        if tables
            .enrollments
            .iter()
            .any(|e| e.class_id == class_id && e.member_id == member_id)
        {
            return Ok(EnrollmentOutcome::AlreadyEnrolled);
        }
        if tables.enrolled_count(class_id) >= u64::from(capacity) {
            return Ok(EnrollmentOutcome::ClassFull { capacity });
        }

        let enrollment = Enrollment::new(class_id, member_id);
        tables.enrollments.push(enrollment.clone());
        Ok(EnrollmentOutcome::Enrolled(enrollment))
    }

    async fn unenroll(&self, class_id: ClassId, member_id: UserId) -> GymdeskResult<bool> {
        let mut tables = self.tables.lock();
        let Some(enrollment_id) = tables
            .enrollments
            .iter()
            .find(|e| e.class_id == class_id && e.member_id == member_id)
            .map(|e| e.id)
        else {
            return Ok(false);
        };
        tables.drop_attendance_of(&[enrollment_id]);
        tables.enrollments.retain(|e| e.id != enrollment_id);
        Ok(true)
    }

    async fn find(&self, class_id: ClassId, member_id: UserId) -> GymdeskResult<Option<Enrollment>> {
        Ok(self
            .tables
            .lock()
            .enrollments
            .iter()
            .find(|e| e.class_id == class_id && e.member_id == member_id)
            .cloned())
    }

    async fn find_by_class(&self, class_id: ClassId, page: PageRequest) -> GymdeskResult<Page<Enrollment>> {
        let tables = self.tables.lock();
        let mut enrollments: Vec<Enrollment> = tables
            .enrollments
            .iter()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect();
        enrollments.sort_by_key(|e| e.enrolled_at);
        Ok(paginate(&enrollments, page))
    }

    async fn find_by_member(&self, member_id: UserId, page: PageRequest) -> GymdeskResult<Page<Enrollment>> {
        let tables = self.tables.lock();
        let mut enrollments: Vec<Enrollment> = tables
            .enrollments
            .iter()
            .filter(|e| e.member_id == member_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        Ok(paginate(&enrollments, page))
    }
}

#[async_trait]
impl AttendanceRepository for MemoryStore {
    async fn mark(&self, request: &MarkAttendance) -> GymdeskResult<AttendanceOutcome> {
        let mut tables = self.tables.lock();

        let Some(enrollment) = tables
            .enrollments
            .iter()
            .find(|e| e.class_id == request.class_id && e.member_id == request.member_id)
            .cloned()
        else {
            return Ok(AttendanceOutcome::EnrollmentNotFound);
        };
        let Some(starts_on) = tables.classes.get(&request.class_id).map(|c| c.starts_at.date_naive()) else {
            return Ok(AttendanceOutcome::EnrollmentNotFound);
        };
        if let Err(reason) = request.window.check(request.date, starts_on) {
            return Ok(AttendanceOutcome::DateOutOfRange(reason));
        }

        if let Some(existing) = tables
            .attendance
            .iter_mut()
            .find(|a| a.enrollment_id == enrollment.id && a.attendance_date == request.date)
        {
            existing.remark(request.status, request.marked_by);
            return Ok(AttendanceOutcome::Updated(existing.clone()));
        }

        let attendance = Attendance::new(&enrollment, request.date, request.status, request.marked_by);
        tables.attendance.push(attendance.clone());
        Ok(AttendanceOutcome::Recorded(attendance))
    }

    async fn find_by_class_and_date(&self, class_id: ClassId, date: NaiveDate) -> GymdeskResult<Vec<Attendance>> {
        let tables = self.tables.lock();
        let mut marks: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|a| a.class_id == class_id && a.attendance_date == date)
            .cloned()
            .collect();
        marks.sort_by_key(|a| a.marked_at);
        Ok(marks)
    }

    async fn find_by_member(
        &self,
        member_id: UserId,
        class_id: Option<ClassId>,
        page: PageRequest,
    ) -> GymdeskResult<Page<Attendance>> {
        let tables = self.tables.lock();
        let mut marks: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|a| a.member_id == member_id && class_id.map_or(true, |c| a.class_id == c))
            .cloned()
            .collect();
        marks.sort_by(|a, b| b.attendance_date.cmp(&a.attendance_date));
        Ok(paginate(&marks, page))
    }

    async fn summary(&self, member_id: UserId, class_id: Option<ClassId>) -> GymdeskResult<AttendanceSummary> {
        let tables = self.tables.lock();
        Ok(AttendanceSummary::from_statuses(
            tables
                .attendance
                .iter()
                .filter(|a| a.member_id == member_id && class_id.map_or(true, |c| a.class_id == c))
                .map(|a| a.status),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MembershipRepository, TrainerRepository, UserRepository};
    use chrono::{Duration, TimeZone};
    use gymdesk_core::{
        AttendanceStatus, AttendanceWindow, Email, Membership, MembershipType, Trainer, TrainerProfile, User,
    };

    struct Fixture {
        store: MemoryStore,
        class: GymClass,
        member: User,
        coach: User,
    }

    fn user(email: &str, role: UserRole) -> User {
        User::new(
            "Test".to_string(),
            "User".to_string(),
            Email::new_unchecked(email),
            "hash".to_string(),
            role,
        )
    }

    async fn fixture(capacity: u32) -> Fixture {
        let store = MemoryStore::new();
        let coach = user("coach@gym.test", UserRole::Trainer);
        let trainer = Trainer::new(coach.id, "HIIT".to_string(), 3);
        TrainerRepository::create(
            &store,
            &TrainerProfile {
                trainer: trainer.clone(),
                user: coach.clone(),
            },
        )
        .await
        .unwrap();

        let starts_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let class = GymClass::new(
            "Morning HIIT".to_string(),
            trainer.id,
            starts_at,
            starts_at + Duration::hours(1),
            capacity,
        )
        .unwrap();
        ClassRepository::save(&store, &class).await.unwrap();

        let member = user("member@gym.test", UserRole::Member);
        UserRepository::save(&store, &member).await.unwrap();

        Fixture {
            store,
            class,
            member,
            coach,
        }
    }

    fn mark(f: &Fixture, date: NaiveDate, status: AttendanceStatus) -> MarkAttendance {
        MarkAttendance {
            class_id: f.class.id,
            member_id: f.member.id,
            date,
            status,
            marked_by: f.coach.id,
            window: AttendanceWindow::ending_on(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), 30),
        }
    }

    #[tokio::test]
    async fn test_enroll_until_full() {
        let f = fixture(1).await;
        let outcome = f.store.enroll(f.class.id, f.member.id, None).await.unwrap();
        assert!(matches!(outcome, EnrollmentOutcome::Enrolled(_)));

        let again = f.store.enroll(f.class.id, f.member.id, None).await.unwrap();
        assert!(matches!(again, EnrollmentOutcome::AlreadyEnrolled));

        let other = user("other@gym.test", UserRole::Member);
        UserRepository::save(&f.store, &other).await.unwrap();
        let full = f.store.enroll(f.class.id, other.id, None).await.unwrap();
        assert!(matches!(full, EnrollmentOutcome::ClassFull { capacity: 1 }));
        assert_eq!(f.store.enrolled_count(f.class.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_enroll_checks_role_then_membership() {
        let f = fixture(5).await;
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let as_coach = f.store.enroll(f.class.id, f.coach.id, Some(today)).await.unwrap();
        assert!(matches!(as_coach, EnrollmentOutcome::NotAMember));

        let no_membership = f.store.enroll(f.class.id, f.member.id, Some(today)).await.unwrap();
        assert!(matches!(no_membership, EnrollmentOutcome::MembershipInactive));

        let membership = Membership::start(f.member.id, MembershipType::Monthly, today).unwrap();
        MembershipRepository::save(&f.store, &membership).await.unwrap();
        let enrolled = f.store.enroll(f.class.id, f.member.id, Some(today)).await.unwrap();
        assert!(matches!(enrolled, EnrollmentOutcome::Enrolled(_)));

        let missing = f.store.enroll(ClassId::new(), f.member.id, None).await.unwrap();
        assert!(matches!(missing, EnrollmentOutcome::ClassNotFound));
    }

    #[tokio::test]
    async fn test_mark_records_then_updates() {
        let f = fixture(5).await;
        f.store.enroll(f.class.id, f.member.id, None).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let first = f.store.mark(&mark(&f, day, AttendanceStatus::Late)).await.unwrap();
        assert!(matches!(first, AttendanceOutcome::Recorded(_)));
        let second = f.store.mark(&mark(&f, day, AttendanceStatus::Present)).await.unwrap();
        assert!(matches!(second, AttendanceOutcome::Updated(ref a) if a.status == AttendanceStatus::Present));

        let marks = f.store.find_by_class_and_date(f.class.id, day).await.unwrap();
        assert_eq!(marks.len(), 1);
        let summary = f.store.summary(f.member.id, None).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.present, 1);
    }

    #[tokio::test]
    async fn test_mark_rejects_dates_outside_window() {
        let f = fixture(5).await;
        f.store.enroll(f.class.id, f.member.id, None).await.unwrap();

        let future = f
            .store
            .mark(&mark(&f, NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(), AttendanceStatus::Present))
            .await
            .unwrap();
        assert!(matches!(future, AttendanceOutcome::DateOutOfRange(_)));

        let before_start = f
            .store
            .mark(&mark(&f, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(), AttendanceStatus::Present))
            .await
            .unwrap();
        assert!(matches!(before_start, AttendanceOutcome::DateOutOfRange(ref r) if r.contains("does not start")));
    }

    #[tokio::test]
    async fn test_mark_requires_enrollment() {
        let f = fixture(5).await;
        let outcome = f
            .store
            .mark(&mark(&f, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), AttendanceStatus::Present))
            .await
            .unwrap();
        assert!(matches!(outcome, AttendanceOutcome::EnrollmentNotFound));
    }

    #[tokio::test]
    async fn test_class_delete_cascades() {
        let f = fixture(5).await;
        f.store.enroll(f.class.id, f.member.id, None).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        f.store.mark(&mark(&f, day, AttendanceStatus::Present)).await.unwrap();

        assert!(ClassRepository::delete(&f.store, f.class.id).await.unwrap());
        assert!(f.store.find(f.class.id, f.member.id).await.unwrap().is_none());
        assert_eq!(f.store.summary(f.member.id, None).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_has_overlap_is_half_open() {
        let f = fixture(5).await;
        let ends = f.class.ends_at;
        let trainer = f.class.trainer_id;

        assert!(!f.store.has_overlap(trainer, ends, ends + Duration::hours(1), None).await.unwrap());
        assert!(f
            .store
            .has_overlap(trainer, ends - Duration::minutes(1), ends + Duration::hours(1), None)
            .await
            .unwrap());
        assert!(!f
            .store
            .has_overlap(trainer, f.class.starts_at, ends, Some(f.class.id))
            .await
            .unwrap());
    }
}
