/// Pipeline phases. Each phase has exactly one successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Drop,
    Create,
    Load,
    Transform,
    Complete,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Drop => Some(Phase::Create),
            Phase::Create => Some(Phase::Load),
            Phase::Load => Some(Phase::Transform),
            Phase::Transform => Some(Phase::Complete),
            Phase::Complete => None,
        }
    }

    /// Whether a run may begin at this phase.
    /// `Load` assumes the tables were just recreated by an earlier run.
    pub fn is_entry(self) -> bool {
        matches!(self, Phase::Drop | Phase::Load)
    }

    pub fn can_follow(self, previous: Phase) -> bool {
        previous.next() == Some(self)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Drop => write!(f, "Dropping tables"),
            Phase::Create => write!(f, "Creating tables"),
            Phase::Load => write!(f, "Loading staging tables"),
            Phase::Transform => write!(f, "Building star schema"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_successors() {
        let mut phase = Phase::Drop;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next.can_follow(phase));
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            [
                Phase::Drop,
                Phase::Create,
                Phase::Load,
                Phase::Transform,
                Phase::Complete
            ]
        );
    }

    #[test]
    fn test_no_skipping() {
        assert!(!Phase::Load.can_follow(Phase::Drop));
        assert!(!Phase::Drop.can_follow(Phase::Transform));
        assert!(!Phase::Create.is_entry());
    }
}
