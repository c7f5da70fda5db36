use super::*;

#[test]
fn test_valid_ids() {
    for id in ["1-first-patch", "42_add_users", "v2.schema", "A"] {
        assert!(PatchId::parse(id).is_ok(), "{id} should be accepted");
    }
}

#[test]
fn test_invalid_ids() {
    for id in ["", "-lead", ".hidden", "has/slash", "has space", "a..b", "é"] {
        let err = PatchId::parse(id).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidPatchId { .. }),
            "{id} should be rejected, got {err}"
        );
    }
}

#[test]
fn test_too_long_id_rejected() {
    let id = "a".repeat(101);
    assert!(PatchId::parse(id).is_err());
    assert!(PatchId::parse("a".repeat(100)).is_ok());
}

#[test]
fn test_branch_name_round_trip() {
    let id = PatchId::parse("1-first-patch").unwrap();
    assert_eq!(id.branch_name(), "ho-patch/1-first-patch");
    assert_eq!(PatchId::from_branch("ho-patch/1-first-patch"), Some(id));
    assert_eq!(PatchId::from_branch("ho-prod"), None);
}

#[test]
fn test_deserialize_rejects_invalid() {
    let ok: PatchId = serde_json::from_str("\"7-x\"").unwrap();
    assert_eq!(ok, "7-x");
    assert!(serde_json::from_str::<PatchId>("\"bad/id\"").is_err());
}
