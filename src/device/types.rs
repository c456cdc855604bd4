use futures::channel::mpsc::Sender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

impl SessionState {
    /**
     * Whether a new connect attempt may be started from this state. While an
     * attempt is in flight (or a session is live) further requests are
     * rejected.
     */
    pub fn can_connect(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Disconnected)
    }
}

#[derive(Debug, Clone)]
pub enum SessionCommand {
    Connect,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    // sent once at startup so the GUI can reach the session engine
    Ready(Sender<SessionCommand>),
    StateChange(SessionState),
    Measurement(f32), // meters
    ConnectFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_allowed_when_no_session() {
        assert!(SessionState::Idle.can_connect());
        assert!(SessionState::Disconnected.can_connect());
    }

    #[test]
    fn connect_rejected_while_busy() {
        assert!(!SessionState::Connecting.can_connect());
        assert!(!SessionState::Connected.can_connect());
    }
}
