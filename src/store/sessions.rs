//! Configuration dialog sessions.
//!
//! One in-progress settings edit per admin. Step transitions live here so
//! they can be tested without a bot; the handlers in `dialog` only decide
//! what to render and when to call the Telegram API.

use dashmap::DashMap;
use std::sync::Arc;

/// Which limit the admin is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Timeout,
    Ban,
}

impl LimitKind {
    pub fn label(self) -> &'static str {
        match self {
            LimitKind::Timeout => "Time Out",
            LimitKind::Ban => "Ban",
        }
    }
}

/// Current step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ChooseGroup,
    ChooseLimit,
    Confirm,
}

/// An admin's in-progress settings edit.
#[derive(Debug, Clone)]
pub struct ConfigSession {
    pub step: Step,
    pub action: LimitKind,
    pub group_id: Option<i64>,
    pub limit: Option<u32>,
}

/// Input rejected for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// The session is not at the step this input belongs to.
    WrongStep,
    /// Limit outside [1, 100].
    LimitOutOfRange,
}

impl ConfigSession {
    /// Fresh session collecting the group id first.
    pub fn new(action: LimitKind) -> Self {
        Self {
            step: Step::ChooseGroup,
            action,
            group_id: None,
            limit: None,
        }
    }

    /// Session pre-bound to a group (deep-link entry); skips ChooseGroup.
    pub fn for_group(action: LimitKind, group_id: i64) -> Self {
        Self {
            step: Step::ChooseLimit,
            action,
            group_id: Some(group_id),
            limit: None,
        }
    }

    /// Store the chosen group and advance. The caller must have already
    /// verified the admin's membership in that group.
    pub fn choose_group(&mut self, group_id: i64) -> Result<(), StepError> {
        if self.step != Step::ChooseGroup {
            return Err(StepError::WrongStep);
        }
        self.group_id = Some(group_id);
        self.step = Step::ChooseLimit;
        Ok(())
    }

    /// Store the chosen limit and advance to confirmation.
    pub fn choose_limit(&mut self, limit: u32) -> Result<(), StepError> {
        if self.step != Step::ChooseLimit {
            return Err(StepError::WrongStep);
        }
        if !(1..=100).contains(&limit) {
            return Err(StepError::LimitOutOfRange);
        }
        self.limit = Some(limit);
        self.step = Step::Confirm;
        Ok(())
    }

    /// Step back to an earlier state (from a Back button).
    pub fn back_to(&mut self, step: Step) {
        self.step = step;
    }
}

/// Live sessions keyed by admin user id.
///
/// Starting a new configuration silently replaces any prior session for the
/// same admin.
#[derive(Clone)]
pub struct SessionStore {
    data: Arc<DashMap<u64, ConfigSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub fn start(&self, admin_id: u64, session: ConfigSession) {
        self.data.insert(admin_id, session);
    }

    pub fn get(&self, admin_id: u64) -> Option<ConfigSession> {
        self.data.get(&admin_id).map(|s| s.clone())
    }

    /// Mutate a session in place. Returns `None` when no session exists.
    pub fn with_session<R>(
        &self,
        admin_id: u64,
        f: impl FnOnce(&mut ConfigSession) -> R,
    ) -> Option<R> {
        self.data.get_mut(&admin_id).map(|mut s| f(&mut s))
    }

    /// Remove a session (completion or cancellation).
    pub fn end(&self, admin_id: u64) -> Option<ConfigSession> {
        self.data.remove(&admin_id).map(|(_, s)| s)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut s = ConfigSession::new(LimitKind::Timeout);
        assert_eq!(s.step, Step::ChooseGroup);

        s.choose_group(-100).unwrap();
        assert_eq!(s.step, Step::ChooseLimit);
        assert_eq!(s.group_id, Some(-100));

        s.choose_limit(5).unwrap();
        assert_eq!(s.step, Step::Confirm);
        assert_eq!(s.limit, Some(5));
    }

    #[test]
    fn test_pre_bound_session_skips_group_step() {
        let s = ConfigSession::for_group(LimitKind::Ban, -100);
        assert_eq!(s.step, Step::ChooseLimit);
        assert_eq!(s.group_id, Some(-100));
    }

    #[test]
    fn test_inputs_for_wrong_step_are_rejected() {
        let mut s = ConfigSession::new(LimitKind::Ban);
        assert_eq!(s.choose_limit(5), Err(StepError::WrongStep));
        assert_eq!(s.step, Step::ChooseGroup);

        s.choose_group(-100).unwrap();
        assert_eq!(s.choose_group(-200), Err(StepError::WrongStep));
        assert_eq!(s.group_id, Some(-100));
    }

    #[test]
    fn test_limit_range() {
        let mut s = ConfigSession::for_group(LimitKind::Timeout, -100);
        assert_eq!(s.choose_limit(0), Err(StepError::LimitOutOfRange));
        assert_eq!(s.choose_limit(101), Err(StepError::LimitOutOfRange));
        assert_eq!(s.step, Step::ChooseLimit);
        s.choose_limit(100).unwrap();
    }

    #[test]
    fn test_back_transition() {
        let mut s = ConfigSession::new(LimitKind::Timeout);
        s.choose_group(-100).unwrap();
        s.choose_limit(3).unwrap();
        s.back_to(Step::ChooseLimit);
        assert_eq!(s.step, Step::ChooseLimit);
        // Previously entered values survive going back.
        assert_eq!(s.group_id, Some(-100));
    }

    #[test]
    fn test_new_session_replaces_prior() {
        let store = SessionStore::new();
        store.start(7, ConfigSession::new(LimitKind::Timeout));
        store.start(7, ConfigSession::new(LimitKind::Ban));
        assert_eq!(store.get(7).unwrap().action, LimitKind::Ban);
    }
}
