use futures::channel::mpsc::Sender;
use futures::SinkExt;
use iced::{Alignment, Application, Command, Element, Length, Settings, Size, Subscription, window};
use iced::event::{self, Event};
use iced::executor;
use iced::theme::Theme;
use iced::widget::{button, column, container, horizontal_rule, text};
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::device::session::session_subscription;
use crate::device::types::{SessionCommand, SessionEvent, SessionState};
use crate::error::AppRunError;
use crate::gui::alert::error_alert;
use crate::gui::style::status_style;
use crate::gui::types::Message;

/** Shown in place of a reading when there is none (not yet connected, or the
 * session ended). */
const NO_READING: &str = "--";

pub fn reading_text(reading: Option<f32>) -> String {
    match reading {
        None => NO_READING.to_string(),
        Some(meters) => format!("{:.3}", meters),
    }
}

fn status_label(state: &SessionState) -> &'static str {
    match state {
        SessionState::Idle => "Not connected",
        SessionState::Connecting => "Connecting…",
        SessionState::Connected => "Connected",
        SessionState::Disconnected => "Disconnected",
    }
}

pub struct ApplicationFlags;

pub struct DistoApp {
    // this token is cancelled upon exit
    app_cancel: CancellationToken,

    // handle to the session engine, delivered by SessionEvent::Ready
    session_commands: Option<Sender<SessionCommand>>,

    // latest state from the session engine
    session_state: SessionState,
    reading: Option<f32>,
}

impl DistoApp {
    fn before_close(&mut self) {
        self.app_cancel.cancel();
    }

    fn request_connect(&mut self) -> Command<Message> {
        if !self.session_state.can_connect() {
            return Command::none();
        }

        let Some(sender) = &self.session_commands else {
            return Command::none();
        };

        // Flip to Connecting right away so that a rapid second click is
        // rejected before the command even reaches the engine.
        self.session_state = SessionState::Connecting;

        let mut sender = sender.clone();
        let fut = async move {
            sender.send(SessionCommand::Connect).await
                .expect("Failed to send SessionCommand");
        };

        Command::perform(fut, Message::ConnectRequested)
    }
}

impl Application for DistoApp {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ApplicationFlags;

    fn new(_flags: ApplicationFlags) -> (DistoApp, Command<Self::Message>) {
        let app = DistoApp {
            app_cancel: CancellationToken::new(),
            session_commands: None,
            session_state: SessionState::Idle,
            reading: None,
        };

        (app, Command::none())
    }

    fn title(&self) -> String {
        String::from(concat!("DISTO Live ", env!("CARGO_PKG_VERSION")))
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        match message {
            Message::ConnectPressed => {
                return self.request_connect();
            },
            Message::ConnectRequested(()) => {},
            Message::AlertDismissed(()) => {},
            Message::SessionEvent(SessionEvent::Ready(sender)) => {
                self.session_commands = Some(sender);
            },
            Message::SessionEvent(SessionEvent::StateChange(state)) => {
                if state != SessionState::Connected {
                    self.reading = None;
                }
                self.session_state = state;
            },
            Message::SessionEvent(SessionEvent::Measurement(meters)) => {
                self.reading = Some(meters);
            },
            Message::SessionEvent(SessionEvent::ConnectFailed(reason)) => {
                error!("Connection error: {}", reason);
                let message = format!("Failed to connect: {}", reason);
                return Command::perform(error_alert(message), Message::AlertDismissed);
            },
            Message::EventOccurred(Event::Window(id, window::Event::CloseRequested)) => {
                info!("Close requested");
                self.before_close();
                return window::close(id);
            },
            _ => {}
        }

        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            event::listen().map(Message::EventOccurred),
            session_subscription(self.app_cancel.clone()).map(Message::SessionEvent),
        ])
    }

    fn view(&self) -> Element<Message> {
        let mut content = column![
            text(status_label(&self.session_state)).style(status_style(&self.session_state)),

            horizontal_rule(10),

            text(reading_text(self.reading)).size(56),
            text("meters").size(16),
        ]
            .align_items(Alignment::Center)
            .spacing(20);

        if self.session_state.can_connect() {
            content = content.push(
                button(text("Connect"))
                    .on_press(Message::ConnectPressed)
            );
        }

        container(content)
            .width(Length::Fill)
            .padding(20)
            .into()
    }
}

pub fn run_application() -> Result<(), AppRunError> {
    let flags = ApplicationFlags;
    let mut settings = Settings::with_flags(flags);

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("disto-live".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(360.0, 300.0);
    settings.window.resizable = false;

    // this function will call process::exit() unless there was a startup error
    DistoApp::run(settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_app() -> DistoApp {
        DistoApp::new(ApplicationFlags).0
    }

    fn send(app: &mut DistoApp, event: SessionEvent) {
        let _ = app.update(Message::SessionEvent(event));
    }

    #[test]
    fn formats_readings_to_three_decimals() {
        assert_eq!(reading_text(Some(2.4)), "2.400");
        assert_eq!(reading_text(Some(1.0)), "1.000");
        assert_eq!(reading_text(None), "--");
    }

    #[test]
    fn later_measurement_overwrites_earlier() {
        let mut app = make_app();
        send(&mut app, SessionEvent::StateChange(SessionState::Connected));
        send(&mut app, SessionEvent::Measurement(2.4));
        send(&mut app, SessionEvent::Measurement(3.25));
        assert_eq!(app.reading, Some(3.25));
    }

    #[test]
    fn connect_affordance_hidden_while_busy() {
        let mut app = make_app();
        assert!(app.session_state.can_connect());
        send(&mut app, SessionEvent::StateChange(SessionState::Connecting));
        assert!(!app.session_state.can_connect());
        send(&mut app, SessionEvent::StateChange(SessionState::Connected));
        assert!(!app.session_state.can_connect());
    }

    #[test]
    fn failed_connect_restores_affordance() {
        let mut app = make_app();
        send(&mut app, SessionEvent::StateChange(SessionState::Connecting));
        send(&mut app, SessionEvent::StateChange(SessionState::Disconnected));
        assert_eq!(app.session_state, SessionState::Disconnected);
        assert!(app.session_state.can_connect());
    }

    #[test]
    fn remote_disconnect_resets_reading() {
        let mut app = make_app();
        send(&mut app, SessionEvent::StateChange(SessionState::Connected));
        send(&mut app, SessionEvent::Measurement(7.125));
        send(&mut app, SessionEvent::StateChange(SessionState::Disconnected));
        assert_eq!(app.reading, None);
        assert_eq!(app.session_state, SessionState::Disconnected);
    }

    #[test]
    fn repeated_disconnects_are_idempotent() {
        let mut app = make_app();
        send(&mut app, SessionEvent::StateChange(SessionState::Connected));
        send(&mut app, SessionEvent::StateChange(SessionState::Disconnected));
        send(&mut app, SessionEvent::StateChange(SessionState::Disconnected));
        assert_eq!(app.session_state, SessionState::Disconnected);
        assert_eq!(app.reading, None);
    }

    #[test]
    fn connect_press_ignored_while_connecting() {
        let mut app = make_app();
        send(&mut app, SessionEvent::StateChange(SessionState::Connecting));
        let _ = app.update(Message::ConnectPressed);
        assert_eq!(app.session_state, SessionState::Connecting);
    }
}
