use std::fmt;

/// Debugger lifecycle events recorded by the debug bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionEvent {
    Started { identity: String, explanation: String },
    Stopped,
}

impl SessionEvent {
    pub fn started(identity: impl Into<String>, explanation: impl Into<String>) -> Self {
        SessionEvent::Started {
            identity: identity.into(),
            explanation: explanation.into(),
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Started {
                identity,
                explanation,
            } => write!(f, "started({identity}, \"{explanation}\")"),
            SessionEvent::Stopped => write!(f, "stopped"),
        }
    }
}

/// Append-only sink for [`SessionEvent`]s.
pub trait SessionLog {
    fn log(&mut self, event: SessionEvent);
}

impl SessionLog for Vec<SessionEvent> {
    fn log(&mut self, event: SessionEvent) {
        self.push(event);
    }
}
