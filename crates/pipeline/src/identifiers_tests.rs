use super::*;

fn spotify() -> Platform {
    Platform::new("Spotify").unwrap()
}

#[test]
fn test_platform_is_lowercased_and_trimmed() {
    assert_eq!(Platform::new("  SpOtIfY ").unwrap().as_str(), "spotify");
    assert!(Platform::new("   ").is_none());
}

#[test]
fn test_platform_id_strips_redundant_platform_prefix() {
    let id = PlatformId::normalize(&spotify(), "spotify:6CrsGj3Zj4gIM3rQSU7DeW").unwrap();
    assert_eq!(id.as_str(), "6CrsGj3Zj4gIM3rQSU7DeW");
}

#[test]
fn test_platform_id_prefix_match_ignores_case() {
    let id = PlatformId::normalize(&spotify(), "Spotify:abc").unwrap();
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn test_platform_id_strips_full_artist_uri() {
    let id = PlatformId::normalize(&spotify(), "spotify:artist:abc").unwrap();
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn test_platform_id_keeps_bare_identifier() {
    let id = PlatformId::normalize(&spotify(), "abc").unwrap();
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn test_platform_id_does_not_strip_other_platform_prefix() {
    let id = PlatformId::normalize(&spotify(), "youtube:abc").unwrap();
    assert_eq!(id.as_str(), "youtube:abc");
}

#[test]
fn test_platform_id_rejects_prefix_only() {
    assert!(PlatformId::normalize(&spotify(), "spotify:").is_none());
    assert!(PlatformId::normalize(&spotify(), "").is_none());
}

#[test]
fn test_platform_id_survives_multibyte_input() {
    let id = PlatformId::normalize(&spotify(), "ü").unwrap();
    assert_eq!(id.as_str(), "ü");
}

#[test]
fn test_subject_keys_from_prefixed_and_bare_ids_are_equal() {
    let a = SubjectKey::from_raw("spotify", "spotify:X").unwrap();
    let b = SubjectKey::from_raw("Spotify", "X").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "spotify:X");
}

#[test]
fn test_repository_id_requires_owner_and_name() {
    assert_eq!(RepositoryId::new("owner/repo").unwrap().as_str(), "owner/repo");
    assert!(RepositoryId::new("owner").is_none());
    assert!(RepositoryId::new("/repo").is_none());
    assert!(RepositoryId::new("owner/").is_none());
    assert!(RepositoryId::new("a/b/c").is_none());
}

#[test]
fn test_reporter_login_rejects_blank() {
    assert!(ReporterLogin::new(" ").is_none());
    assert_eq!(ReporterLogin::new("alice").unwrap().as_str(), "alice");
}

#[test]
fn test_issue_number_displays_with_hash() {
    assert_eq!(IssueNumber::new(42).to_string(), "#42");
}
