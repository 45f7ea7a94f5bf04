use super::*;
use crate::error::CoreError;

#[test]
fn test_empty_has_no_message() {
    let errs: MultiError<CoreError> = MultiError::new();
    assert!(errs.is_empty());
    assert_eq!(errs.len(), 0);
    assert_eq!(errs.to_string(), "");
    assert!(errs.into_result().is_ok());
}

#[test]
fn test_single_error_displays_as_itself() {
    let mut errs = MultiError::new();
    errs.push(CoreError::ConfigInvalid {
        message: "bad".to_string(),
    });
    assert_eq!(errs.len(), 1);
    assert_eq!(errs.to_string(), "[E003] Invalid config: bad");
}

#[test]
fn test_multiple_errors_are_indented() {
    let errs: MultiError<std::io::Error> = vec![
        std::io::Error::other("My first error"),
        std::io::Error::other("My second error"),
    ]
    .into();

    assert_eq!(errs.len(), 2);
    assert_eq!(
        errs.to_string(),
        "Multiple Errors:\n  My first error\n  My second error"
    );
}

#[test]
fn test_into_result_returns_collected_errors() {
    let errs: MultiError<std::io::Error> =
        std::iter::once(std::io::Error::other("boom")).collect();
    let err = errs.into_result().unwrap_err();
    assert_eq!(err.into_inner().len(), 1);
}
