use super::*;
use crate::platform::Platform;

fn rec(platform: Platform, username: &str, followers: f64) -> CanonicalInfluencer {
    let mut r = CanonicalInfluencer::empty(platform);
    r.username = username.to_owned();
    r.followers = followers;
    r
}

// -----------------------------------------------------------------------
// dedupe
// -----------------------------------------------------------------------

#[test]
fn keeps_higher_follower_count_on_collision() {
    let out = dedupe(vec![
        rec(Platform::Instagram, "alice", 50.0),
        rec(Platform::Instagram, "Alice", 100.0),
    ]);
    assert_eq!(out.len(), 1);
    assert!((out[0].followers - 100.0).abs() < f64::EPSILON);
}

#[test]
fn verified_outranks_follower_count() {
    let mut verified = rec(Platform::YouTube, "chan", 10.0);
    verified.is_verified = true;
    let unverified = rec(Platform::YouTube, "chan", 1_000_000.0);

    let out = dedupe(vec![unverified, verified]);
    assert_eq!(out.len(), 1);
    assert!(out[0].is_verified);
    assert!((out[0].followers - 10.0).abs() < f64::EPSILON);
}

#[test]
fn engagement_rate_breaks_follower_tie() {
    let mut a = rec(Platform::TikTok, "x", 100.0);
    a.engagement_rate = 0.01;
    let mut b = rec(Platform::TikTok, "x", 100.0);
    b.engagement_rate = 0.05;
    let out = dedupe(vec![a, b]);
    assert!((out[0].engagement_rate - 0.05).abs() < f64::EPSILON);
}

#[test]
fn engagement_count_breaks_rate_tie() {
    let a = rec(Platform::TikTok, "x", 100.0);
    let mut b = rec(Platform::TikTok, "x", 100.0);
    b.engagements = Some(40.0);
    let out = dedupe(vec![a, b]);
    assert_eq!(out[0].engagements, Some(40.0));
}

#[test]
fn url_presence_then_picture_presence_break_ties() {
    let mut with_pic = rec(Platform::Instagram, "x", 1.0);
    with_pic.picture = Some("https://cdn/p.jpg".to_owned());
    let mut with_url = rec(Platform::Instagram, "x", 1.0);
    with_url.url = Some("https://instagram.com/x".to_owned());

    let out = dedupe(vec![with_pic.clone(), with_url.clone()]);
    assert_eq!(out[0], with_url);

    let plain = rec(Platform::Instagram, "x", 1.0);
    let out = dedupe(vec![plain, with_pic.clone()]);
    assert_eq!(out[0], with_pic);
}

#[test]
fn exact_tie_keeps_first_seen() {
    let mut first = rec(Platform::Instagram, "x", 1.0);
    first.fullname = "First".to_owned();
    let mut second = rec(Platform::Instagram, "x", 1.0);
    second.fullname = "Second".to_owned();
    let out = dedupe(vec![first, second]);
    assert_eq!(out[0].fullname, "First");
}

#[test]
fn drops_records_without_identity() {
    let anonymous = CanonicalInfluencer::empty(Platform::Instagram);
    let out = dedupe(vec![anonymous, rec(Platform::Instagram, "a", 1.0)]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].username, "a");
}

#[test]
fn preserves_first_occurrence_order() {
    let out = dedupe(vec![
        rec(Platform::Instagram, "b", 1.0),
        rec(Platform::Instagram, "a", 1.0),
        rec(Platform::Instagram, "b", 9.0),
        rec(Platform::TikTok, "b", 1.0),
    ]);
    let names: Vec<_> = out
        .iter()
        .map(|r| format!("{}:{}", r.platform, r.username))
        .collect();
    assert_eq!(names, ["instagram:b", "instagram:a", "tiktok:b"]);
    assert!((out[0].followers - 9.0).abs() < f64::EPSILON);
}

#[test]
fn is_idempotent() {
    let mut v = rec(Platform::YouTube, "c", 5.0);
    v.is_verified = true;
    let input = vec![
        rec(Platform::YouTube, "c", 50.0),
        v,
        rec(Platform::Instagram, "c", 5.0),
        CanonicalInfluencer::empty(Platform::TikTok),
        rec(Platform::Instagram, "d", 5.0),
    ];
    let once = dedupe(input);
    let twice = dedupe(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn user_id_and_username_keys_do_not_collide() {
    let mut by_id = rec(Platform::Instagram, "alice", 1.0);
    by_id.user_id = Some("42".to_owned());
    let by_name = rec(Platform::Instagram, "alice", 1.0);
    assert_eq!(dedupe(vec![by_id, by_name]).len(), 2);
}

// -----------------------------------------------------------------------
// merge_first_seen
// -----------------------------------------------------------------------

#[test]
fn merge_never_evicts_existing_entries() {
    let mut existing = vec![rec(Platform::Instagram, "a", 1.0)];
    let mut better = rec(Platform::Instagram, "a", 999.0);
    better.is_verified = true;

    merge_first_seen(
        &mut existing,
        vec![better, rec(Platform::Instagram, "b", 2.0)],
    );

    assert_eq!(existing.len(), 2);
    assert!((existing[0].followers - 1.0).abs() < f64::EPSILON);
    assert_eq!(existing[1].username, "b");
}

#[test]
fn merge_dedupes_within_the_batch() {
    let mut existing = Vec::new();
    merge_first_seen(
        &mut existing,
        vec![
            rec(Platform::TikTok, "z", 10.0),
            rec(Platform::TikTok, "z", 20.0),
        ],
    );
    assert_eq!(existing.len(), 1);
    assert!((existing[0].followers - 20.0).abs() < f64::EPSILON);
}
