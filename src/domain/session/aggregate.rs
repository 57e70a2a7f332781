//! Session aggregate entity.
//!
//! A session is one scheduled meeting between a teacher and one or more
//! students. All three session kinds share this aggregate; kind-specific
//! behavior (absence marking) branches on `SessionKind`.
//!
//! # Concurrency
//!
//! `version` increments on every successful mutation. Repositories use
//! the previous version together with the expected status as the
//! compare-and-set key, so racing writers lose cleanly instead of
//! overwriting each other.

use crate::domain::foundation::{
    AcademyId, DomainError, ErrorCode, RoomName, SessionId, SessionKind, SessionStatus,
    Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

/// Maximum session length in minutes.
pub const MAX_DURATION_MINUTES: u32 = 480;

/// Session aggregate - one scheduled tutoring meeting.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `duration_minutes` is 1-480
/// - `participant_ids` is non-empty and never contains the teacher
/// - status changes only along `SessionStatus::can_transition_to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,

    /// Academy (tenant) this session belongs to.
    academy_id: AcademyId,

    /// Session kind (drives absence and settlement behavior).
    kind: SessionKind,

    /// Teacher delivering the session.
    teacher_id: UserId,

    /// Students expected to attend.
    participant_ids: Vec<UserId>,

    /// Planned start time.
    scheduled_at: Timestamp,

    /// Planned length in minutes.
    duration_minutes: u32,

    /// Current lifecycle status.
    status: SessionStatus,

    /// Meeting room name on the provider, once provisioned.
    meeting_room_name: Option<RoomName>,

    /// Join link handed to participants, once provisioned.
    meeting_link: Option<String>,

    /// When the session actually started (first accepted join).
    started_at: Option<Timestamp>,

    /// When the session ended (completion or absence marking).
    ended_at: Option<Timestamp>,

    /// Actual delivered length, recorded at completion.
    actual_duration_minutes: Option<u32>,

    /// Free-form cancellation reason.
    cancellation_reason: Option<String>,

    /// Who cancelled the session.
    cancelled_by: Option<UserId>,

    /// When the session was cancelled.
    cancelled_at: Option<Timestamp>,

    /// Optimistic concurrency counter.
    version: u64,
}

impl Session {
    /// Create a new scheduled session.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if duration is out of range or no participants given
    pub fn new(
        id: SessionId,
        academy_id: AcademyId,
        kind: SessionKind,
        teacher_id: UserId,
        participant_ids: Vec<UserId>,
        scheduled_at: Timestamp,
        duration_minutes: u32,
    ) -> Result<Self, DomainError> {
        if duration_minutes == 0 || duration_minutes > MAX_DURATION_MINUTES {
            return Err(DomainError::validation(
                "duration_minutes",
                format!(
                    "Duration must be between 1 and {} minutes",
                    MAX_DURATION_MINUTES
                ),
            ));
        }
        if participant_ids.is_empty() {
            return Err(DomainError::validation(
                "participant_ids",
                "Session requires at least one participant",
            ));
        }
        if participant_ids.contains(&teacher_id) {
            return Err(DomainError::validation(
                "participant_ids",
                "Teacher cannot be listed as a participant",
            ));
        }

        Ok(Self {
            id,
            academy_id,
            kind,
            teacher_id,
            participant_ids,
            scheduled_at,
            duration_minutes,
            status: SessionStatus::Scheduled,
            meeting_room_name: None,
            meeting_link: None,
            started_at: None,
            ended_at: None,
            actual_duration_minutes: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            version: 0,
        })
    }

    /// Reconstitute a session from persistence (no validation, no events).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        academy_id: AcademyId,
        kind: SessionKind,
        teacher_id: UserId,
        participant_ids: Vec<UserId>,
        scheduled_at: Timestamp,
        duration_minutes: u32,
        status: SessionStatus,
        meeting_room_name: Option<RoomName>,
        meeting_link: Option<String>,
        started_at: Option<Timestamp>,
        ended_at: Option<Timestamp>,
        actual_duration_minutes: Option<u32>,
        cancellation_reason: Option<String>,
        cancelled_by: Option<UserId>,
        cancelled_at: Option<Timestamp>,
        version: u64,
    ) -> Self {
        Self {
            id,
            academy_id,
            kind,
            teacher_id,
            participant_ids,
            scheduled_at,
            duration_minutes,
            status,
            meeting_room_name,
            meeting_link,
            started_at,
            ended_at,
            actual_duration_minutes,
            cancellation_reason,
            cancelled_by,
            cancelled_at,
            version,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the academy ID.
    pub fn academy_id(&self) -> &AcademyId {
        &self.academy_id
    }

    /// Returns the session kind.
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Returns the teacher's user ID.
    pub fn teacher_id(&self) -> &UserId {
        &self.teacher_id
    }

    /// Returns the expected participants.
    pub fn participant_ids(&self) -> &[UserId] {
        &self.participant_ids
    }

    /// Returns the planned start time.
    pub fn scheduled_at(&self) -> &Timestamp {
        &self.scheduled_at
    }

    /// Returns the planned length in minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Returns the planned end time.
    pub fn scheduled_end(&self) -> Timestamp {
        self.scheduled_at.plus_minutes(self.duration_minutes as i64)
    }

    /// Returns the current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the meeting room name, if provisioned.
    pub fn meeting_room_name(&self) -> Option<&RoomName> {
        self.meeting_room_name.as_ref()
    }

    /// Returns the participant join link, if provisioned.
    pub fn meeting_link(&self) -> Option<&str> {
        self.meeting_link.as_deref()
    }

    /// Returns when the session actually started.
    pub fn started_at(&self) -> Option<&Timestamp> {
        self.started_at.as_ref()
    }

    /// Returns when the session ended.
    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    /// Returns the delivered length recorded at completion.
    pub fn actual_duration_minutes(&self) -> Option<u32> {
        self.actual_duration_minutes
    }

    /// Returns the cancellation reason.
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Returns who cancelled the session.
    pub fn cancelled_by(&self) -> Option<&UserId> {
        self.cancelled_by.as_ref()
    }

    /// Returns when the session was cancelled.
    pub fn cancelled_at(&self) -> Option<&Timestamp> {
        self.cancelled_at.as_ref()
    }

    /// Returns the optimistic concurrency counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns true for one-on-one session kinds.
    pub fn is_individual(&self) -> bool {
        self.kind.is_individual()
    }

    /// Returns true if the given user is expected in this session.
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.teacher_id == user_id || self.participant_ids.contains(user_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark the session Ready (room provisioned, waiting for participants).
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless currently Scheduled
    pub fn mark_ready(&mut self, _now: Timestamp) -> Result<(), DomainError> {
        self.ensure_can_transition(SessionStatus::Ready)?;
        self.status = SessionStatus::Ready;
        self.version += 1;
        Ok(())
    }

    /// Begin the session (first accepted participant join).
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless currently Ready
    pub fn begin(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_can_transition(SessionStatus::Ongoing)?;
        self.status = SessionStatus::Ongoing;
        self.started_at = Some(now);
        self.version += 1;
        Ok(())
    }

    /// Complete the session, recording end time and delivered length.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless currently Ongoing
    pub fn complete(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_can_transition(SessionStatus::Completed)?;
        self.status = SessionStatus::Completed;
        self.ended_at = Some(now);
        let delivered = match self.started_at {
            Some(started) => {
                let minutes = now.seconds_since(&started).max(0) / 60;
                minutes.min(MAX_DURATION_MINUTES as i64) as u32
            }
            None => self.duration_minutes,
        };
        self.actual_duration_minutes = Some(delivered);
        self.version += 1;
        Ok(())
    }

    /// Mark the session Absent (teacher or student no-show).
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for non-individual kinds
    /// - `InvalidStateTransition` unless currently Ready or Ongoing
    pub fn mark_absent(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if !self.is_individual() {
            return Err(DomainError::validation(
                "kind",
                "Absence marking applies only to individual sessions",
            ));
        }
        self.ensure_can_transition(SessionStatus::Absent)?;
        self.status = SessionStatus::Absent;
        self.ended_at = Some(now);
        self.version += 1;
        Ok(())
    }

    /// Cancel the session, recording reason and actor.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless currently Scheduled or Ready
    pub fn cancel(
        &mut self,
        reason: String,
        cancelled_by: UserId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.ensure_can_transition(SessionStatus::Cancelled)?;
        self.status = SessionStatus::Cancelled;
        self.cancellation_reason = Some(reason);
        self.cancelled_by = Some(cancelled_by);
        self.cancelled_at = Some(now);
        self.version += 1;
        Ok(())
    }

    /// Attach a provisioned meeting room to the session.
    ///
    /// # Errors
    ///
    /// - `SessionTerminal` if the session already ended
    pub fn attach_room(
        &mut self,
        room_name: RoomName,
        meeting_link: Option<String>,
    ) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::SessionTerminal,
                format!("Session {} is {}, cannot attach a room", self.id, self.status),
            ));
        }
        self.meeting_room_name = Some(room_name);
        self.meeting_link = meeting_link;
        self.version += 1;
        Ok(())
    }

    fn ensure_can_transition(&self, target: SessionStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(&target) {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(self.status, target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher() -> UserId {
        UserId::new("teacher-1").unwrap()
    }

    fn student() -> UserId {
        UserId::new("student-1").unwrap()
    }

    fn individual_session(scheduled_at: Timestamp) -> Session {
        Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            teacher(),
            vec![student()],
            scheduled_at,
            60,
        )
        .unwrap()
    }

    #[test]
    fn new_session_starts_scheduled() {
        let session = individual_session(Timestamp::from_unix_secs(1_700_000_000));
        assert_eq!(session.status(), SessionStatus::Scheduled);
        assert_eq!(session.version(), 0);
        assert!(session.meeting_room_name().is_none());
    }

    #[test]
    fn new_rejects_zero_duration() {
        let result = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::AcademicIndividual,
            teacher(),
            vec![student()],
            Timestamp::now(),
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_rejects_empty_participants() {
        let result = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::InteractiveCourse,
            teacher(),
            vec![],
            Timestamp::now(),
            60,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_rejects_teacher_as_participant() {
        let result = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            teacher(),
            vec![teacher()],
            Timestamp::now(),
            60,
        );
        assert!(result.is_err());
    }

    #[test]
    fn scheduled_end_adds_duration() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let session = individual_session(start);
        assert_eq!(session.scheduled_end(), start.plus_minutes(60));
    }

    #[test]
    fn happy_path_transitions_succeed_and_bump_version() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = individual_session(start);

        session.mark_ready(start.minus_minutes(10)).unwrap();
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.version(), 1);

        session.begin(start).unwrap();
        assert_eq!(session.status(), SessionStatus::Ongoing);
        assert_eq!(session.started_at(), Some(&start));

        session.complete(start.plus_minutes(55)).unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.actual_duration_minutes(), Some(55));
        assert_eq!(session.version(), 3);
    }

    #[test]
    fn complete_without_start_falls_back_to_planned_duration() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        // Ongoing row with no started_at, as older data may carry.
        let mut legacy = Session::reconstitute(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            teacher(),
            vec![student()],
            start,
            60,
            SessionStatus::Ongoing,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            2,
        );
        legacy.complete(start.plus_minutes(70)).unwrap();
        assert_eq!(legacy.actual_duration_minutes(), Some(60));
    }

    #[test]
    fn completed_session_rejects_further_transitions() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = individual_session(start);
        session.mark_ready(start).unwrap();
        session.begin(start).unwrap();
        session.complete(start.plus_minutes(60)).unwrap();

        assert!(session.mark_ready(start).is_err());
        assert!(session.begin(start).is_err());
        assert!(session.mark_absent(start).is_err());
        assert!(session
            .cancel("late".to_string(), teacher(), start)
            .is_err());
    }

    #[test]
    fn mark_absent_rejected_for_course_sessions() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::InteractiveCourse,
            teacher(),
            vec![student()],
            start,
            60,
        )
        .unwrap();
        session.mark_ready(start).unwrap();
        assert!(session.mark_absent(start.plus_minutes(20)).is_err());
    }

    #[test]
    fn mark_absent_allowed_from_ready_and_ongoing() {
        let start = Timestamp::from_unix_secs(1_700_000_000);

        let mut from_ready = individual_session(start);
        from_ready.mark_ready(start).unwrap();
        from_ready.mark_absent(start.plus_minutes(20)).unwrap();
        assert_eq!(from_ready.status(), SessionStatus::Absent);
        assert!(from_ready.ended_at().is_some());

        let mut from_ongoing = individual_session(start);
        from_ongoing.mark_ready(start).unwrap();
        from_ongoing.begin(start).unwrap();
        from_ongoing.mark_absent(start.plus_minutes(20)).unwrap();
        assert_eq!(from_ongoing.status(), SessionStatus::Absent);
    }

    #[test]
    fn cancel_records_reason_actor_and_time() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = individual_session(start);
        let when = start.minus_minutes(60);

        session
            .cancel("Student request".to_string(), student(), when)
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert_eq!(session.cancellation_reason(), Some("Student request"));
        assert_eq!(session.cancelled_by(), Some(&student()));
        assert_eq!(session.cancelled_at(), Some(&when));
    }

    #[test]
    fn cancel_rejected_once_ongoing() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = individual_session(start);
        session.mark_ready(start).unwrap();
        session.begin(start).unwrap();
        assert!(session
            .cancel("too late".to_string(), teacher(), start)
            .is_err());
    }

    #[test]
    fn attach_room_rejected_on_terminal_session() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = individual_session(start);
        session
            .cancel("no show".to_string(), teacher(), start)
            .unwrap();

        let room = RoomName::for_session(session.id());
        assert!(session.attach_room(room, None).is_err());
    }

    #[test]
    fn attach_room_sets_name_and_link() {
        let start = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = individual_session(start);
        let room = RoomName::for_session(session.id());

        session
            .attach_room(room.clone(), Some("https://meet.example/j/abc".to_string()))
            .unwrap();
        assert_eq!(session.meeting_room_name(), Some(&room));
        assert_eq!(session.meeting_link(), Some("https://meet.example/j/abc"));
    }
}
