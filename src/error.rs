use serde::{Serialize, Serializer};
use std::fmt::Display;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    CustomError(String),
    #[error("{0}")]
    CsvError(::csv::Error),
    #[error("{0}")]
    SerdeError(serde_json::Error),
    #[error("{0}")]
    IoError(std::io::Error),
    #[error("Input Error: {0}")]
    InputError(String),
    #[error("Output Error: {0}")]
    OutputError(String),
}

impl Error {
    pub fn input<E: Display>(e: E) -> Error {
        Error::InputError(e.to_string())
    }

    pub fn output<E: Display>(e: E) -> Error {
        Error::OutputError(e.to_string())
    }

    /// Whether the failure was caused by what the caller fed us rather than
    /// by the environment.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::CustomError(_)
                | Error::CsvError(_)
                | Error::InputError(_)
                | Error::OutputError(_)
        )
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Error {
        Error::CustomError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::SerdeError(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IoError(e)
    }
}

impl From<::csv::Error> for Error {
    fn from(e: ::csv::Error) -> Error {
        Error::CsvError(e)
    }
}

#[test]
fn error_display() {
    assert_eq!(Error::input("bad token").to_string(), "Input Error: bad token");
    assert_eq!(Error::output("no rows").to_string(), "Output Error: no rows");
    assert_eq!(Error::from("plain").to_string(), "plain");
}

#[test]
fn error_serializes_as_message() {
    let json = serde_json::to_string(&Error::input("oops")).unwrap();
    assert_eq!(json, r#""Input Error: oops""#);
}

#[test]
fn parse_error_classification() {
    assert!(Error::input("x").is_parse_error());
    assert!(!Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).is_parse_error());
}
