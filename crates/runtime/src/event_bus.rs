use std::fmt;

/// What happened during a reconciliation pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PassEvent {
    Deferred,
    Superseded,
    Interrupted,
    Added,
    Adopted,
    Removed,
    UnknownPlace,
    LoadFailed,
    InstallFailed,
    RemoveFailed,
    Settled,
}

impl PassEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            PassEvent::Deferred => "deferred",
            PassEvent::Superseded => "superseded",
            PassEvent::Interrupted => "interrupted",
            PassEvent::Added => "added",
            PassEvent::Adopted => "adopted",
            PassEvent::Removed => "removed",
            PassEvent::UnknownPlace => "unknown_place",
            PassEvent::LoadFailed => "load_failed",
            PassEvent::InstallFailed => "install_failed",
            PassEvent::RemoveFailed => "remove_failed",
            PassEvent::Settled => "settled",
        }
    }

    /// Worth surfacing to the user's console.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            PassEvent::Interrupted
                | PassEvent::LoadFailed
                | PassEvent::InstallFailed
                | PassEvent::RemoveFailed
        )
    }
}

impl fmt::Display for PassEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traced step, tagged with the pass generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub pass: u64,
    pub kind: PassEvent,
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[pass {}] {}: {}", self.pass, self.kind, self.message)
    }
}

/// Append-only trace of reconciliation, drained by the UI.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, pass: u64, kind: PassEvent, message: impl Into<String>) {
        self.events.push(Event {
            pass,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: PassEvent) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, PassEvent};

    #[test]
    fn events_keep_their_pass() {
        let mut bus = EventBus::new();
        bus.emit(2, PassEvent::Added, "sp");
        bus.emit(3, PassEvent::LoadFailed, "rj: 404");
        assert_eq!(bus.events()[0].pass, 2);
        assert_eq!(bus.count(PassEvent::LoadFailed), 1);
        assert_eq!(bus.events()[1].to_string(), "[pass 3] load_failed: rj: 404");
    }

    #[test]
    fn drain_empties_the_trace() {
        let mut bus = EventBus::new();
        bus.emit(0, PassEvent::Settled, "+0 -0");
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn only_failures_are_flagged() {
        assert!(PassEvent::RemoveFailed.is_failure());
        assert!(!PassEvent::Superseded.is_failure());
        assert!(!PassEvent::Added.is_failure());
    }
}
