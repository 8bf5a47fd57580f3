//! Integration tests for Value

use astrolabe_foundation::{ObjectId, Value};

#[test]
fn type_names() {
    assert_eq!(Value::Nil.type_name(), "nil");
    assert_eq!(Value::Bool(true).type_name(), "bool");
    assert_eq!(Value::Float(1.5).type_name(), "float");
    assert_eq!(Value::from(ObjectId::new(2)).type_name(), "object");
}

#[test]
fn numbers_widen_but_do_not_narrow() {
    assert_eq!(Value::Int(4).as_number(), Some(4.0));
    assert_eq!(Value::Bool(true).as_int(), Some(1));
    assert_eq!(Value::Float(4.0).as_int(), None);
    assert_eq!(Value::from("4").as_number(), None);
}

#[test]
fn object_references() {
    let v = Value::from(ObjectId::new(9));
    assert_eq!(v.as_object(), Some(ObjectId::new(9)));
    assert_eq!(v.as_int(), Some(9));
    assert_eq!(Value::Int(9).as_object(), None);
}

#[test]
fn strings_share_storage_on_clone() {
    let v = Value::from("Sol");
    let w = v.clone();
    assert_eq!(v, w);
    assert_eq!(w.as_str(), Some("Sol"));
    assert_eq!(format!("{w}"), "\"Sol\"");
}

#[test]
fn missing_properties_are_nil() {
    assert!(Value::from(None::<f64>).is_nil());
    assert_eq!(Value::from(Some(2.5)), Value::Float(2.5));
}
