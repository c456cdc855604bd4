use iced::Color;
use iced::theme;

use crate::device::types::SessionState;

const CONNECTED_GREEN: Color = Color { r: 0.13, g: 0.55, b: 0.13, a: 1.0 };

pub fn status_style(state: &SessionState) -> theme::Text {
    match state {
        SessionState::Connected => theme::Text::Color(CONNECTED_GREEN),
        _ => theme::Text::Default,
    }
}
