use std::time::Duration;

use crate::cancel::CancellationToken;

/// Ticket for one debounced pass.
///
/// The holder waits out the debounce window, then runs only if the token is
/// still live.
#[derive(Debug, Clone)]
pub struct PassTicket {
    pub generation: u64,
    pub delay: Duration,
    pub token: CancellationToken,
}

impl PassTicket {
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }
}

/// Collapses bursts of triggers into a single pass.
///
/// Every [`Debouncer::trigger`] cancels the previous ticket and issues a new
/// one with a higher generation, so at most one ticket is live at any time.
/// Waiting is left to the caller's executor (tokio timer natively, a browser
/// timeout in wasm).
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    current: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            current: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn trigger(&mut self) -> PassTicket {
        self.cancel_pending();
        self.generation = self.generation.wrapping_add(1);
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        PassTicket {
            generation: self.generation,
            delay: self.delay,
            token,
        }
    }

    /// Cancels the live ticket, if any, without issuing a new one.
    pub fn cancel_pending(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    pub fn is_current(&self, ticket: &PassTicket) -> bool {
        ticket.generation == self.generation && ticket.is_live()
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::Duration;

    #[test]
    fn later_trigger_supersedes_earlier() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let first = d.trigger();
        let second = d.trigger();
        assert!(!first.is_live());
        assert!(second.is_live());
        assert!(!d.is_current(&first));
        assert!(d.is_current(&second));
        assert_eq!(second.generation, first.generation + 1);
    }

    #[test]
    fn cancel_pending_leaves_no_live_ticket() {
        let mut d = Debouncer::new(Duration::from_millis(10));
        let t = d.trigger();
        d.cancel_pending();
        assert!(!t.is_live());
        assert!(!d.is_current(&t));
    }

    #[test]
    fn ticket_carries_configured_delay() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        assert_eq!(d.trigger().delay, Duration::from_millis(100));
    }
}
