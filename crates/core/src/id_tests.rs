use super::*;

define_id! {
    pub struct TestId;
}

#[test]
fn new_wraps_any_into_string() {
    let id = TestId::new("backend");
    assert_eq!(id.as_str(), "backend");
}

#[test]
fn short_truncates_longer_strings() {
    let id = TestId::new("backend-0001");
    assert_eq!(id.short(7), "backend");
}

#[test]
fn short_is_noop_on_shorter_strings() {
    let id = TestId::new("be");
    assert_eq!(id.short(7), "be");
}

#[test]
fn equality_against_str_works() {
    let id = TestId::new("backend");
    assert_eq!(id, "backend");
    assert_eq!(id, "backend");
}

#[test]
fn uuid_idgen_produces_distinct_ids() {
    let gen = UuidIdGen;
    assert_ne!(gen.next(), gen.next());
}
