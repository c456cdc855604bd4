use log::warn;
use msgbox::IconType;
use tokio::task::spawn_blocking;

/**
 * Show a blocking error alert without stalling the GUI thread.
 */
pub async fn error_alert(message: String) {
    spawn_blocking(move || {
        if let Err(err) = msgbox::create(concat!("DISTO Live ", env!("CARGO_PKG_VERSION")), &message, IconType::Error) {
            warn!("Failed to create msgbox: {:?}", err);
        }
    }).await.expect("Failed to join error_alert task");
}
