use iced::Event;

use crate::device::types::SessionEvent;

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    ConnectPressed,
    ConnectRequested(()),
    AlertDismissed(()),
    SessionEvent(SessionEvent),
}
