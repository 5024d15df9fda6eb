//! Scope event log for inspecting how a compilation nested its scopes.

use quill_core::ScopeKind;

/// One push or pop on the compiler stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEvent {
    Push {
        serial: u32,
        kind: ScopeKind,
        /// Stack height after the push.
        height: usize,
    },
    Pop {
        serial: u32,
        kind: ScopeKind,
    },
}

impl ScopeEvent {
    pub fn kind(&self) -> ScopeKind {
        match self {
            ScopeEvent::Push { kind, .. } | ScopeEvent::Pop { kind, .. } => *kind,
        }
    }

    pub fn serial(&self) -> u32 {
        match self {
            ScopeEvent::Push { serial, .. } | ScopeEvent::Pop { serial, .. } => *serial,
        }
    }
}

/// Counters kept by every compiler stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub pushes: u32,
    pub pops: u32,
    /// Deepest frame nesting reached.
    pub max_height: usize,
}

impl ScopeStats {
    /// Whether every pushed frame has been popped.
    pub fn is_balanced(&self) -> bool {
        self.pushes == self.pops
    }
}

/// Check that `events` nest properly: every pop closes the most recent
/// unclosed push.
pub fn is_well_nested(events: &[ScopeEvent]) -> bool {
    let mut open: Vec<u32> = Vec::new();
    for event in events {
        match *event {
            ScopeEvent::Push { serial, .. } => open.push(serial),
            ScopeEvent::Pop { serial, .. } => {
                if open.pop() != Some(serial) {
                    return false;
                }
            }
        }
    }
    open.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(serial: u32) -> ScopeEvent {
        ScopeEvent::Push {
            serial,
            kind: ScopeKind::Block,
            height: 0,
        }
    }

    fn pop(serial: u32) -> ScopeEvent {
        ScopeEvent::Pop {
            serial,
            kind: ScopeKind::Block,
        }
    }

    #[test]
    fn nested_events_are_well_nested() {
        assert!(is_well_nested(&[push(0), push(1), pop(1), pop(0)]));
        assert!(is_well_nested(&[]));
    }

    #[test]
    fn crossed_or_open_events_are_not() {
        assert!(!is_well_nested(&[push(0), push(1), pop(0), pop(1)]));
        assert!(!is_well_nested(&[push(0)]));
        assert!(!is_well_nested(&[pop(0)]));
    }
}
