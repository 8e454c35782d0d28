//! Attendance service.

use crate::dto::{
    AttendanceResponse, BulkAttendanceRequest, BulkAttendanceResponse, BulkAttendanceResult, BulkMarkOutcome,
    MarkAttendanceRequest, MarkedAttendance,
};
use crate::mappers::PageResponse;
use async_trait::async_trait;
use chrono::NaiveDate;
use gymdesk_config::GymConfig;
use gymdesk_core::{
    AttendanceOutcome, AttendanceSummary, AttendanceWindow, ClassId, Clock, ErrorResponse, GymdeskError,
    GymdeskResult, PageRequest, UserId, ValidateExt,
};
use gymdesk_repository::{AttendanceRepository, ClassRepository, MarkAttendance};
use gymdesk_security::{guards, Principal};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attendance service trait.
#[async_trait]
pub trait AttendanceService: Send + Sync {
    /// Records or overwrites one mark (staff only).
    async fn mark(&self, principal: &Principal, request: MarkAttendanceRequest) -> GymdeskResult<MarkedAttendance>;

    /// Marks several members of one class for one date. Each record is
    /// written on its own; failures are reported per record.
    async fn mark_bulk(
        &self,
        principal: &Principal,
        request: BulkAttendanceRequest,
    ) -> GymdeskResult<BulkAttendanceResponse>;

    /// All marks of a class on a date (staff only).
    async fn class_attendance(
        &self,
        principal: &Principal,
        class_id: ClassId,
        date: NaiveDate,
    ) -> GymdeskResult<Vec<AttendanceResponse>>;

    /// A member's marks, optionally for one class (self or staff).
    async fn member_attendance(
        &self,
        principal: &Principal,
        member_id: UserId,
        class_id: Option<ClassId>,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<AttendanceResponse>>;

    /// Attendance totals for a member (self or staff).
    async fn member_summary(
        &self,
        principal: &Principal,
        member_id: UserId,
        class_id: Option<ClassId>,
    ) -> GymdeskResult<AttendanceSummary>;
}

/// Attendance service implementation.
pub struct AttendanceServiceImpl {
    attendance_repository: Arc<dyn AttendanceRepository>,
    class_repository: Arc<dyn ClassRepository>,
    gym: GymConfig,
    clock: Arc<dyn Clock>,
}

impl AttendanceServiceImpl {
    pub fn new(
        attendance_repository: Arc<dyn AttendanceRepository>,
        class_repository: Arc<dyn ClassRepository>,
        gym: GymConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            attendance_repository,
            class_repository,
            gym,
            clock,
        }
    }

    fn window(&self) -> AttendanceWindow {
        AttendanceWindow::ending_on(self.clock.today(), self.gym.max_attendance_backdate_days)
    }

    async fn ensure_class_exists(&self, class_id: ClassId) -> GymdeskResult<()> {
        if self.class_repository.find_by_id(class_id).await?.is_none() {
            return Err(GymdeskError::not_found("Class", class_id));
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceService for AttendanceServiceImpl {
    async fn mark(&self, principal: &Principal, request: MarkAttendanceRequest) -> GymdeskResult<MarkedAttendance> {
        debug!(
            "Marking {} for member {} in class {} on {}",
            request.status, request.member_id, request.class_id, request.date
        );

        guards::attendance_marking().check(principal, None)?;
        request.validate_request()?;

        let mark = MarkAttendance {
            class_id: request.class_id,
            member_id: request.member_id,
            date: request.date,
            status: request.status,
            marked_by: principal.user_id,
            window: self.window(),
        };

        match self.attendance_repository.mark(&mark).await? {
            AttendanceOutcome::Recorded(attendance) => {
                info!("Attendance recorded: {}", attendance.id);
                Ok(MarkedAttendance {
                    created: true,
                    attendance: attendance.into(),
                })
            }
            AttendanceOutcome::Updated(attendance) => {
                info!("Attendance updated: {}", attendance.id);
                Ok(MarkedAttendance {
                    created: false,
                    attendance: attendance.into(),
                })
            }
            AttendanceOutcome::EnrollmentNotFound => Err(GymdeskError::not_found(
                "Enrollment",
                format!("{}/{}", request.class_id, request.member_id),
            )),
            AttendanceOutcome::DateOutOfRange(reason) => Err(GymdeskError::Validation(reason)),
        }
    }

    async fn mark_bulk(
        &self,
        principal: &Principal,
        request: BulkAttendanceRequest,
    ) -> GymdeskResult<BulkAttendanceResponse> {
        debug!(
            "Marking {} records for class {} on {}",
            request.records.len(),
            request.class_id,
            request.date
        );

        guards::attendance_marking().check(principal, None)?;
        request.validate_request()?;
        if request.records.len() > self.gym.max_bulk_attendance {
            return Err(GymdeskError::validation(format!(
                "At most {} records may be marked at once",
                self.gym.max_bulk_attendance
            )));
        }

        let window = self.window();
        let mut results = Vec::with_capacity(request.records.len());
        for record in &request.records {
            let mark = MarkAttendance {
                class_id: request.class_id,
                member_id: record.member_id,
                date: request.date,
                status: record.status,
                marked_by: principal.user_id,
                window,
            };
            let (outcome, message) = match self.attendance_repository.mark(&mark).await {
                Ok(AttendanceOutcome::Recorded(_)) => (BulkMarkOutcome::Recorded, None),
                Ok(AttendanceOutcome::Updated(_)) => (BulkMarkOutcome::Updated, None),
                Ok(AttendanceOutcome::EnrollmentNotFound) => (
                    BulkMarkOutcome::EnrollmentNotFound,
                    Some("member is not enrolled in this class".to_string()),
                ),
                Ok(AttendanceOutcome::DateOutOfRange(reason)) => (BulkMarkOutcome::DateOutOfRange, Some(reason)),
                Err(e) => {
                    warn!("Failed to mark attendance for member {}: {}", record.member_id, e);
                    (BulkMarkOutcome::Failed, Some(ErrorResponse::from_error(&e).message))
                }
            };
            results.push(BulkAttendanceResult {
                member_id: record.member_id,
                outcome,
                message,
            });
        }

        let response = BulkAttendanceResponse::from_results(results);
        info!(
            "Bulk attendance for class {}: {} recorded, {} updated, {} failed",
            request.class_id, response.recorded, response.updated, response.failed
        );
        Ok(response)
    }

    async fn class_attendance(
        &self,
        principal: &Principal,
        class_id: ClassId,
        date: NaiveDate,
    ) -> GymdeskResult<Vec<AttendanceResponse>> {
        guards::staff().check(principal, None)?;
        self.ensure_class_exists(class_id).await?;

        let marks = self.attendance_repository.find_by_class_and_date(class_id, date).await?;
        Ok(marks.into_iter().map(AttendanceResponse::from).collect())
    }

    async fn member_attendance(
        &self,
        principal: &Principal,
        member_id: UserId,
        class_id: Option<ClassId>,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<AttendanceResponse>> {
        guards::owner_or_staff().check(principal, Some(member_id))?;

        let marks = self
            .attendance_repository
            .find_by_member(member_id, class_id, page)
            .await?;
        Ok(PageResponse::from_page(marks, AttendanceResponse::from))
    }

    async fn member_summary(
        &self,
        principal: &Principal,
        member_id: UserId,
        class_id: Option<ClassId>,
    ) -> GymdeskResult<AttendanceSummary> {
        guards::owner_or_staff().check(principal, Some(member_id))?;

        self.attendance_repository.summary(member_id, class_id).await
    }
}

impl std::fmt::Debug for AttendanceServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceServiceImpl")
            .field("gym", &self.gym)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::BulkAttendanceRecord;
    use crate::testing::Fixture;
    use chrono::Duration;
    use gymdesk_core::{AttendanceStatus, GymClass, User};
    use gymdesk_repository::EnrollmentRepository;

    fn service(fx: &Fixture) -> AttendanceServiceImpl {
        AttendanceServiceImpl::new(
            Arc::clone(&fx.repos.attendance),
            Arc::clone(&fx.repos.classes),
            fx.gym.clone(),
            fx.clock(),
        )
    }

    /// A class that started a week ago with `ana` enrolled.
    async fn running_class(fx: &Fixture) -> (User, GymClass, User) {
        let coach = fx.trainer("coach@gym.test").await;
        let class = fx.class(&coach, -Duration::days(7), 10).await;
        let ana = fx.member("ana@gym.test").await;
        fx.repos.enrollments.enroll(class.id, ana.id, None).await.unwrap();
        (coach.user, class, ana)
    }

    fn request(class: &GymClass, member: &User, days_ago: i64, status: AttendanceStatus) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            class_id: class.id,
            member_id: member.id,
            date: Fixture::today() - Duration::days(days_ago),
            status,
        }
    }

    #[tokio::test]
    async fn test_mark_then_remark() {
        let fx = Fixture::new();
        let attendance = service(&fx);
        let (coach, class, ana) = running_class(&fx).await;
        let staff = Fixture::principal(&coach);

        let first = attendance
            .mark(&staff, request(&class, &ana, 1, AttendanceStatus::Absent))
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.attendance.marked_by, coach.id);

        let second = attendance
            .mark(&staff, request(&class, &ana, 1, AttendanceStatus::Late))
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.attendance.id, first.attendance.id);
        assert_eq!(second.attendance.status, AttendanceStatus::Late);
    }

    #[tokio::test]
    async fn test_mark_rejections() {
        let fx = Fixture::new();
        let attendance = service(&fx);
        let (coach, class, ana) = running_class(&fx).await;
        let bob = fx.member("bob@gym.test").await;
        let staff = Fixture::principal(&coach);

        let err = attendance
            .mark(&Fixture::principal(&ana), request(&class, &ana, 0, AttendanceStatus::Present))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = attendance
            .mark(&staff, request(&class, &bob, 0, AttendanceStatus::Present))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        // Tomorrow, and before the class started.
        for days_ago in [-1, 8] {
            let err = attendance
                .mark(&staff, request(&class, &ana, days_ago, AttendanceStatus::Present))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
    }

    #[tokio::test]
    async fn test_mark_bulk_reports_each_record() {
        let fx = Fixture::new();
        let attendance = service(&fx);
        let (coach, class, ana) = running_class(&fx).await;
        let bob = fx.member("bob@gym.test").await;

        let bulk = BulkAttendanceRequest {
            class_id: class.id,
            date: Fixture::today(),
            records: vec![
                BulkAttendanceRecord {
                    member_id: ana.id,
                    status: AttendanceStatus::Present,
                },
                BulkAttendanceRecord {
                    member_id: bob.id,
                    status: AttendanceStatus::Present,
                },
            ],
        };
        let response = attendance.mark_bulk(&Fixture::principal(&coach), bulk).await.unwrap();
        assert_eq!(response.recorded, 1);
        assert_eq!(response.failed, 1);
        assert_eq!(response.results[1].outcome, BulkMarkOutcome::EnrollmentNotFound);
        assert!(response.results[1].message.is_some());
    }

    /// Delegates to the memory store but fails every write for one member.
    struct FailingFor {
        inner: Arc<dyn AttendanceRepository>,
        member_id: UserId,
    }

    #[async_trait]
    impl AttendanceRepository for FailingFor {
        async fn mark(&self, request: &MarkAttendance) -> GymdeskResult<AttendanceOutcome> {
            if request.member_id == self.member_id {
                return Err(GymdeskError::Database("Deadlock found when trying to get lock".to_string()));
            }
            self.inner.mark(request).await
        }

        async fn find_by_class_and_date(
            &self,
            class_id: ClassId,
            date: NaiveDate,
        ) -> GymdeskResult<Vec<gymdesk_core::Attendance>> {
            self.inner.find_by_class_and_date(class_id, date).await
        }

        async fn find_by_member(
            &self,
            member_id: UserId,
            class_id: Option<ClassId>,
            page: PageRequest,
        ) -> GymdeskResult<gymdesk_core::Page<gymdesk_core::Attendance>> {
            self.inner.find_by_member(member_id, class_id, page).await
        }

        async fn summary(&self, member_id: UserId, class_id: Option<ClassId>) -> GymdeskResult<AttendanceSummary> {
            self.inner.summary(member_id, class_id).await
        }
    }

    #[tokio::test]
    async fn test_mark_bulk_continues_past_store_errors() {
        let fx = Fixture::new();
        let (coach, class, ana) = running_class(&fx).await;
        let bob = fx.member("bob@gym.test").await;
        let cid = fx.member("cid@gym.test").await;
        for member in [&bob, &cid] {
            fx.repos.enrollments.enroll(class.id, member.id, None).await.unwrap();
        }

        let attendance = AttendanceServiceImpl::new(
            Arc::new(FailingFor {
                inner: Arc::clone(&fx.repos.attendance),
                member_id: bob.id,
            }),
            Arc::clone(&fx.repos.classes),
            fx.gym.clone(),
            fx.clock(),
        );

        let records = [&ana, &bob, &cid]
            .iter()
            .map(|member| BulkAttendanceRecord {
                member_id: member.id,
                status: AttendanceStatus::Present,
            })
            .collect();
        let bulk = BulkAttendanceRequest {
            class_id: class.id,
            date: Fixture::today(),
            records,
        };
        let response = attendance.mark_bulk(&Fixture::principal(&coach), bulk).await.unwrap();

        assert_eq!(response.recorded, 2);
        assert_eq!(response.failed, 1);
        assert_eq!(response.results[1].member_id, bob.id);
        assert_eq!(response.results[1].outcome, BulkMarkOutcome::Failed);
        let message = response.results[1].message.as_deref().unwrap();
        assert!(!message.contains("Deadlock"));
        assert_eq!(response.results[2].outcome, BulkMarkOutcome::Recorded);

        let day = fx
            .repos
            .attendance
            .find_by_class_and_date(class.id, Fixture::today())
            .await
            .unwrap();
        assert_eq!(day.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_bulk_limit() {
        let mut fx = Fixture::new();
        fx.gym.max_bulk_attendance = 1;
        let attendance = service(&fx);
        let (coach, class, ana) = running_class(&fx).await;

        let record = BulkAttendanceRecord {
            member_id: ana.id,
            status: AttendanceStatus::Present,
        };
        let bulk = BulkAttendanceRequest {
            class_id: class.id,
            date: Fixture::today(),
            records: vec![record, record],
        };
        let err = attendance.mark_bulk(&Fixture::principal(&coach), bulk).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_summary_counts_late_as_attended() {
        let fx = Fixture::new();
        let attendance = service(&fx);
        let (coach, class, ana) = running_class(&fx).await;
        let staff = Fixture::principal(&coach);

        for (days_ago, status) in [
            (3, AttendanceStatus::Present),
            (2, AttendanceStatus::Late),
            (1, AttendanceStatus::Absent),
        ] {
            attendance
                .mark(&staff, request(&class, &ana, days_ago, status))
                .await
                .unwrap();
        }

        let summary = attendance
            .member_summary(&Fixture::principal(&ana), ana.id, Some(class.id))
            .await
            .unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.late, 1);
        assert!((summary.attendance_percentage - 66.67).abs() < f64::EPSILON);

        let history = attendance
            .member_attendance(&Fixture::principal(&ana), ana.id, None, PageRequest::first())
            .await
            .unwrap();
        assert_eq!(history.items.len(), 3);
        assert!(history.items[0].attendance_date > history.items[2].attendance_date);

        let day = attendance
            .class_attendance(&staff, class.id, Fixture::today() - Duration::days(2))
            .await
            .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].status, AttendanceStatus::Late);
    }

    #[tokio::test]
    async fn test_member_cannot_read_other_summary() {
        let fx = Fixture::new();
        let attendance = service(&fx);
        let (_, _, ana) = running_class(&fx).await;
        let bob = fx.member("bob@gym.test").await;

        let err = attendance
            .member_summary(&Fixture::principal(&bob), ana.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
