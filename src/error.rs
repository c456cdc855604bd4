use thiserror::Error;
use msgbox::IconType;
use std::fmt::Display;
use btleplug;
use iced;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Error communicating with device (btleplug): {source}")]
    Btle { #[from] source: btleplug::Error },

    #[error("No usable bluetooth adapter is available")]
    NoAdapter,

    #[error("No DISTO device was found before the scan deadline")]
    DeviceNotFound,

    #[error("The measurement service is not available on this device")]
    MissingService,

    #[error("The measurement characteristic is not available on this device")]
    MissingCharacteristic,
}

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start application (iced): {source}")]
    Iced { #[from] source: iced::Error },
}

pub fn error_msgbox<T: Display>(message: &'static str, error: &T) {
    let message = format!("{}: {}", message, error);
    eprintln!("{}", &message);
    if let Err(err) = msgbox::create(concat!("DISTO Live ", env!("CARGO_PKG_VERSION")), &message, IconType::Error) {
        eprintln!("Failed to create msgbox: {:?}", err);
    }
}
