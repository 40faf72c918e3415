use satchel_derive::satchel_error;
use std::borrow::Cow;

#[satchel_error]
pub enum ProbeError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal probe error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
}

#[test]
fn satchel_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/satchel_error_pass.rs");
}

#[test]
fn context_is_attached_to_source_errors() {
    let err = failing_io().context("Probing backend").expect_err("io should fail");

    match &err {
        ProbeError::Io { context, .. } => assert_eq!(context.as_deref(), Some("Probing backend")),
        ProbeError::Internal { .. } => panic!("expected io variant"),
    }
    assert!(err.to_string().contains("(Probing backend)"));
}

#[test]
fn question_mark_converts_source_errors() {
    fn run() -> Result<(), ProbeError> {
        failing_io()?;
        Ok(())
    }

    let err = run().expect_err("io should fail");
    assert!(matches!(err, ProbeError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "I/O failure: denied");
}

#[test]
fn internal_variant_accepts_strings() {
    let from_static: ProbeError = "boom".into();
    let from_owned: ProbeError = String::from("bang").into();

    assert_eq!(from_static.to_string(), "Internal probe error: boom");
    assert_eq!(from_owned.to_string(), "Internal probe error: bang");
}

#[test]
fn context_overrides_on_own_result() {
    let result: Result<(), ProbeError> = Err("broken".into());
    let err = result.context("while flushing").expect_err("should stay an error");

    assert_eq!(err.to_string(), "Internal probe error (while flushing): broken");
}
