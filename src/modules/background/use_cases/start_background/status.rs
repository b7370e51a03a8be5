use crate::shared::core::session_id::SessionId;

/// Lifecycle of the background runner, published on a watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerStatus {
    Idle,
    Migrating,
    Running { session_id: SessionId },
    /// Migration failed or never finished; nothing that depends on the session is active.
    Degraded { reason: String },
}

impl RunnerStatus {
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            RunnerStatus::Running { session_id } => Some(*session_id),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RunnerStatus::Degraded { .. })
    }
}

#[cfg(test)]
mod runner_status_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_expose_the_session_only_while_running() {
        let session_id = SessionId::generate();
        assert_eq!(
            RunnerStatus::Running { session_id }.session_id(),
            Some(session_id)
        );
        assert_eq!(RunnerStatus::Migrating.session_id(), None);
    }

    #[rstest]
    #[case(RunnerStatus::Idle, false)]
    #[case(RunnerStatus::Migrating, false)]
    #[case(RunnerStatus::Degraded { reason: "offline".into() }, true)]
    fn it_should_flag_degraded_mode(#[case] status: RunnerStatus, #[case] degraded: bool) {
        assert_eq!(status.is_degraded(), degraded);
    }
}
