//! Unit tests for cubrid-backend error translation

use cubrid_backend::error::{translate, Error, ErrorKind, NativeError};
use cubrid_backend::types::Value;

#[test]
fn test_every_driver_class_maps_one_to_one() {
    let classes = [
        ("Error", ErrorKind::Error),
        ("InterfaceError", ErrorKind::Interface),
        ("DatabaseError", ErrorKind::Database),
        ("DataError", ErrorKind::Data),
        ("OperationalError", ErrorKind::Operational),
        ("IntegrityError", ErrorKind::Integrity),
        ("InternalError", ErrorKind::Internal),
        ("ProgrammingError", ErrorKind::Programming),
        ("NotSupportedError", ErrorKind::NotSupported),
    ];

    for (name, kind) in classes {
        assert_eq!(translate(NativeError::new(name, vec![])).kind(), kind);
        assert_eq!(kind.class_name(), name);
    }
}

#[test]
fn test_unknown_class_falls_back_to_generic() {
    let err = translate(NativeError::new("Warning", vec![Value::from("w")]));
    assert_eq!(err.kind(), ErrorKind::Error);
    assert_eq!(err.args(), &[Value::from("w")]);
}

#[test]
fn test_args_preserved_verbatim() {
    let args = vec![
        Value::Int32(-493),
        Value::from("Syntax: In line 1, column 8 before ' FROM t'"),
        Value::Null,
    ];
    let err: Error = NativeError::new("ProgrammingError", args.clone()).into();

    assert_eq!(err.args(), args.as_slice());
    assert!(matches!(err, Error::Driver { kind: ErrorKind::Programming, .. }));
}

#[test]
fn test_error_display() {
    let err = translate(NativeError::with_code("DataError", -181, "Cannot coerce"));
    assert_eq!(err.to_string(), "DataError: -181, Cannot coerce");

    let err = Error::data("Unexpected value: 1010");
    assert_eq!(err.to_string(), "data error: Unexpected value: 1010");
}

#[test]
fn test_connection_error_keeps_source() {
    use std::error::Error as _;

    let native = NativeError::with_code("OperationalError", -353, "Cannot make connection");
    let err = Error::connection_with_source("cannot connect to CUBRID:localhost:33000:demodb:::", native);

    assert_eq!(err.kind(), ErrorKind::Operational);
    let source = err.source().unwrap();
    assert_eq!(
        source.to_string(),
        "OperationalError(-353, Cannot make connection)"
    );
    assert!(err.args().is_empty());
}
