use super::*;

#[test]
fn exit_codes_follow_severity_order() {
    assert_eq!(VerdictClass::Pass.exit_code(), 0);
    assert_eq!(VerdictClass::Warn.exit_code(), 1);
    assert_eq!(VerdictClass::Violation.exit_code(), 2);
    assert_eq!(VerdictClass::Dissolution.exit_code(), 3);
}

#[test]
fn severity_ordering_is_monotone() {
    assert!(VerdictClass::Pass < VerdictClass::Warn);
    assert!(VerdictClass::Warn < VerdictClass::Violation);
    assert!(VerdictClass::Violation < VerdictClass::Dissolution);
}

#[test]
fn pass_verdict_has_no_breaches() {
    let v = Verdict::pass(1);
    assert!(v.breaches.is_empty());
    assert_eq!(v.class, VerdictClass::Pass);
}
