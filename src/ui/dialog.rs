use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertIcon {
    Error,
    Warning,
    Info,
    Success,
}

/// A modal message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub text: String,
    pub icon: AlertIcon,
}

impl Alert {
    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            icon: AlertIcon::Error,
        }
    }
}

/// Alerts waiting to be shown. The front one is on screen until dismissed.
#[derive(Debug, Default, Clone)]
pub struct DialogQueue {
    alerts: VecDeque<Alert>,
}

impl DialogQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alert: Alert) {
        log::debug!("dialog queued: {} - {}", alert.title, alert.text);
        self.alerts.push_back(alert);
    }

    /// The alert currently on screen
    pub fn current(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    /// Closes the alert on screen and returns it
    pub fn dismiss(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
