//! Normalization from raw upstream records to [`CanonicalInfluencer`].
//!
//! Every canonical field is read through an ordered list of alternate keys.
//! The lists below are the whole mapping; there is no per-platform branching.
//! For each key in order the nested `profile` object is consulted before the
//! record itself, and the first present value wins.

use creatorscope_core::{CanonicalInfluencer, Platform};
use serde_json::{Map, Value};

use crate::fields::{flag, id_string, is_present, non_empty_str, strict_number};

pub const USER_ID_KEYS: &[&str] = &["userId", "id", "channelId", "profileId", "user_id"];
pub const USERNAME_KEYS: &[&str] = &["username", "handle", "channelHandle", "slug", "customUrl"];
pub const FULLNAME_KEYS: &[&str] = &["fullname", "fullName", "name", "title", "displayName"];
pub const FOLLOWERS_KEYS: &[&str] = &[
    "followers",
    "followersCount",
    "followerCount",
    "subscribers",
    "subscriberCount",
];
pub const ENGAGEMENT_RATE_KEYS: &[&str] = &["engagementRate", "engagement_rate", "er"];
pub const ENGAGEMENTS_KEYS: &[&str] = &["engagements", "avgEngagements", "averageEngagements"];
pub const AVERAGE_VIEWS_KEYS: &[&str] = &["averageViews", "avgViews", "averageViewsCount"];
pub const PICTURE_KEYS: &[&str] = &["picture", "avatar", "profilePicUrl", "thumbnail"];
pub const URL_KEYS: &[&str] = &["url", "profileUrl", "channelUrl", "link"];
pub const VERIFIED_KEYS: &[&str] = &["isVerified", "verified", "is_verified"];
pub const PRIVATE_KEYS: &[&str] = &["isPrivate", "private", "is_private"];

/// Normalizes one raw search record from `platform`.
///
/// Never fails: missing or malformed fields degrade to `None` or a zero/false
/// default. A record without any identity field is still returned; dropping
/// it is left to deduplication.
#[must_use]
pub fn normalize(raw: &Value, platform: Platform) -> CanonicalInfluencer {
    let record = Sources::new(raw);

    CanonicalInfluencer {
        platform,
        user_id: record.first(USER_ID_KEYS).and_then(id_string),
        username: record
            .first(USERNAME_KEYS)
            .and_then(non_empty_str)
            .unwrap_or_default(),
        fullname: record
            .first(FULLNAME_KEYS)
            .and_then(non_empty_str)
            .unwrap_or_default(),
        followers: record
            .first(FOLLOWERS_KEYS)
            .and_then(strict_number)
            .unwrap_or(0.0),
        engagement_rate: record
            .first(ENGAGEMENT_RATE_KEYS)
            .and_then(strict_number)
            .unwrap_or(0.0),
        engagements: record.first(ENGAGEMENTS_KEYS).and_then(strict_number),
        average_views: record.first(AVERAGE_VIEWS_KEYS).and_then(strict_number),
        picture: record.first(PICTURE_KEYS).and_then(non_empty_str),
        url: record.first(URL_KEYS).and_then(non_empty_str),
        is_verified: record.first(VERIFIED_KEYS).and_then(flag).unwrap_or(false),
        is_private: record.first(PRIVATE_KEYS).and_then(flag).unwrap_or(false),
    }
}

/// The lookup scopes of one raw record: `profile` first, then the record.
struct Sources<'a> {
    scopes: [Option<&'a Map<String, Value>>; 2],
}

impl<'a> Sources<'a> {
    fn new(raw: &'a Value) -> Self {
        let record = raw.as_object();
        let profile = record
            .and_then(|r| r.get("profile"))
            .and_then(Value::as_object);
        Self {
            scopes: [profile, record],
        }
    }

    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().find_map(|key| {
            self.scopes
                .into_iter()
                .flatten()
                .find_map(|scope| scope.get(*key).filter(|v| is_present(v)))
        })
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
