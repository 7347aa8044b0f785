use std::borrow::Cow;
use tether_derive::tether_error;

#[tether_error(user_message = "Storage unavailable")]
pub enum StoreError {
    #[user_message("Could not read the activation file")]
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Record tampered{}: {message}", format_context(.context))]
    RecordTampered { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[tether_error]
pub enum PlainError {
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_missing() -> Result<Vec<u8>, StoreError> {
    std::fs::read("/definitely/not/here").context("Reading activation file")
}

fn main() {
    let err = read_missing().unwrap_err();
    assert_eq!(err.code(), "io");
    assert!(err.to_string().contains("(Reading activation file)"));
    assert_eq!(err.user_message(), "Could not read the activation file");

    let err = StoreError::from("boom");
    assert_eq!(err.code(), "internal");
    assert_eq!(err.user_message(), "Storage unavailable");

    let tampered = StoreError::RecordTampered { message: "tag".into(), context: None };
    assert_eq!(tampered.code(), "record_tampered");

    assert_eq!(PlainError::from(String::from("x")).code(), "internal");
}
