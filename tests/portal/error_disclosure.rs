//! Error bodies must not leak server internals.

use koliwada::Error;
use hyper::StatusCode;

fn body_of(err: Error) -> (StatusCode, String) {
    let resp = err.into_response();
    let status = resp.status();
    let bytes = tokio_test::block_on(http_body_util::BodyExt::collect(resp.into_body()))
        .unwrap()
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[test]
fn io_error_hides_paths() {
    let err = Error::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "cannot write /var/lib/koliwada/profiles/7.json",
    ));
    let (status, body) = body_of(err);
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("/var/lib"), "path leaked: {body}");
    assert!(body.contains("Internal server error"));
}

/// Stored-profile problems that reach the client are opaque.
#[test]
fn configuration_error_is_opaque() {
    let (status, body) = body_of(Error::Configuration(
        "stored admin profile is unreadable: expected value at line 1".into(),
    ));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("profile"), "detail leaked: {body}");
}

/// Client errors keep their message so the portal can show it.
#[test]
fn client_errors_keep_their_message() {
    let (status, body) = body_of(Error::Validation("Please Select Role".into()));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Please Select Role"));

    let (status, body) = body_of(Error::Forbidden {
        action: "update".into(),
        subject: "Responsibility".into(),
    });
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("cannot update Responsibility"));
}
