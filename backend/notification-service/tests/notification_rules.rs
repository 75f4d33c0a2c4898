//! Notification template and preference-gate rules
use notification_service::models::{NotificationKind, NotificationPreference};
use notification_service::services::notification_service::{
    aggregated_body, aggregated_title, excerpt,
};

#[test]
fn like_and_follow_kinds_never_aggregate() {
    // Only the comment pair participates in aggregation selection
    for kind in [NotificationKind::Like, NotificationKind::Follow] {
        assert!(!matches!(
            kind,
            NotificationKind::Comment | NotificationKind::CommentAggregated
        ));
    }
}

#[test]
fn aggregated_templates_match_the_product_copy() {
    assert_eq!(aggregated_title(2), "2 novos comentários");
    assert_eq!(aggregated_body(2), "2 pessoas comentaram no seu post");
    assert_eq!(aggregated_title(17), "17 novos comentários");
}

#[test]
fn disabling_one_kind_leaves_the_others_enabled() {
    let prefs = NotificationPreference {
        likes_enabled: false,
        ..NotificationPreference::defaults_for("u1")
    };

    assert!(!prefs.allows(NotificationKind::Like));
    assert!(prefs.allows(NotificationKind::Comment));
    assert!(prefs.allows(NotificationKind::CommentAggregated));
    assert!(prefs.allows(NotificationKind::Follow));
}

#[test]
fn push_gate_is_independent_of_kind_gates() {
    let prefs = NotificationPreference {
        push_enabled: false,
        ..NotificationPreference::defaults_for("u1")
    };

    // Store-side creation is still allowed for every kind
    assert!(prefs.allows(NotificationKind::Like));
    assert!(prefs.allows(NotificationKind::Comment));
    assert!(!prefs.push_enabled);
}

#[test]
fn comment_bodies_are_excerpted_to_a_hundred_chars() {
    let comment = "x".repeat(300);
    assert_eq!(excerpt(&comment, 100).chars().count(), 100);

    let short = "ótimo post!";
    assert_eq!(excerpt(short, 100), short);
}

#[test]
fn kinds_serialize_as_snake_case_strings() {
    let json = serde_json::to_string(&NotificationKind::CommentAggregated).unwrap();
    assert_eq!(json, "\"comment_aggregated\"");
    let json = serde_json::to_string(&NotificationKind::Like).unwrap();
    assert_eq!(json, "\"like\"");
}
