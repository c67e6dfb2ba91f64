// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of public message links (`https://t.me/...`) into post references.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::HeraldError;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?:t|telegram)\.me/(?:c/(?P<internal>\d+)|(?P<username>[A-Za-z][A-Za-z0-9_]{3,31}))/(?:(?P<topic>\d+)/)?(?P<msg>\d+)/?(?:\?\S*)?$",
    )
    .expect("link pattern is valid")
});

/// Offset Telegram applies to internal channel/supergroup ids in the Bot API.
const SUPERGROUP_ID_OFFSET: i64 = 1_000_000_000_000;

/// Largest internal id whose Bot API chat id still fits in an `i64`.
const MAX_INTERNAL_ID: i64 = i64::MAX - SUPERGROUP_ID_OFFSET;

/// The chat part of a message link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChat {
    /// `t.me/c/<internal>/...` links of private supergroups.
    Internal(i64),
    /// `t.me/<username>/...` links of public chats.
    Public(String),
}

/// A parsed message link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLink {
    pub chat: LinkChat,
    pub topic_id: Option<i32>,
    pub message_id: i32,
}

impl PostLink {
    /// Bot API chat id for internal links; `None` for public usernames.
    pub fn chat_id(&self) -> Option<i64> {
        match self.chat {
            LinkChat::Internal(internal) => SUPERGROUP_ID_OFFSET
                .checked_add(internal)
                .and_then(i64::checked_neg),
            LinkChat::Public(_) => None,
        }
    }
}

/// Public URL of a message in a private supergroup, or `None` for other chats.
pub fn message_url(chat_id: i64, message_id: i32) -> Option<String> {
    let internal = chat_id
        .checked_neg()
        .and_then(|id| id.checked_sub(SUPERGROUP_ID_OFFSET))?;
    (internal > 0).then(|| format!("https://t.me/c/{internal}/{message_id}"))
}

impl FromStr for PostLink {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            HeraldError::Validation(
                "That does not look like a post link. Send a link like https://t.me/c/123456/789"
                    .into(),
            )
        };

        let caps = LINK_RE.captures(s.trim()).ok_or_else(invalid)?;

        let chat = match (caps.name("internal"), caps.name("username")) {
            (Some(internal), _) => {
                let internal: i64 = internal.as_str().parse().map_err(|_| invalid())?;
                if !(1..=MAX_INTERNAL_ID).contains(&internal) {
                    return Err(invalid());
                }
                LinkChat::Internal(internal)
            }
            (None, Some(username)) => LinkChat::Public(username.as_str().to_string()),
            (None, None) => return Err(invalid()),
        };

        let topic_id = caps
            .name("topic")
            .map(|t| t.as_str().parse::<i32>())
            .transpose()
            .map_err(|_| invalid())?;

        let message_id = caps["msg"].parse::<i32>().map_err(|_| invalid())?;
        if message_id == 0 {
            return Err(invalid());
        }

        Ok(Self {
            chat,
            topic_id,
            message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_private_supergroup_link() {
        let link: PostLink = "https://t.me/c/1234567890/789".parse().unwrap();
        assert_eq!(link.chat, LinkChat::Internal(1234567890));
        assert_eq!(link.topic_id, None);
        assert_eq!(link.message_id, 789);
        assert_eq!(link.chat_id(), Some(-1001234567890));
    }

    #[test]
    fn parses_topic_link() {
        let link: PostLink = "t.me/c/1234567890/55/789".parse().unwrap();
        assert_eq!(link.topic_id, Some(55));
        assert_eq!(link.message_id, 789);
    }

    #[test]
    fn parses_public_link_with_query() {
        let link: PostLink = "https://t.me/herald_news/42?single".parse().unwrap();
        assert_eq!(link.chat, LinkChat::Public("herald_news".into()));
        assert_eq!(link.chat_id(), None);
        assert_eq!(link.message_id, 42);
    }

    #[test]
    fn message_url_inverts_chat_id() {
        assert_eq!(
            message_url(-1001234567890, 789).as_deref(),
            Some("https://t.me/c/1234567890/789")
        );
        let link: PostLink = message_url(-1001234567890, 789).unwrap().parse().unwrap();
        assert_eq!(link.chat_id(), Some(-1001234567890));
        assert_eq!(message_url(-4242, 1), None);
        assert_eq!(message_url(42, 1), None);
        assert_eq!(message_url(i64::MIN, 1), None);
    }

    #[test]
    fn out_of_range_internal_ids_are_rejected() {
        for input in [
            "https://t.me/c/9223372036854775807/5",
            "https://t.me/c/9223372036854775808/5",
            "https://t.me/c/0/5",
        ] {
            let err = input.parse::<PostLink>().unwrap_err();
            assert!(err.is_validation(), "{input:?} should be a validation error");
        }

        let largest = format!("https://t.me/c/{MAX_INTERNAL_ID}/5");
        let link: PostLink = largest.parse().unwrap();
        assert_eq!(link.chat_id(), Some(i64::MIN + 1));
    }

    #[test]
    fn chat_id_never_overflows() {
        let link = PostLink {
            chat: LinkChat::Internal(i64::MAX),
            topic_id: None,
            message_id: 5,
        };
        assert_eq!(link.chat_id(), None);
    }

    #[test]
    fn rejects_garbage() {
        for input in [
            "",
            "hello",
            "https://example.com/c/1/2",
            "https://t.me/c/123",
            "https://t.me/c/abc/12",
            "https://t.me/c/1/0",
            "https://t.me/c/1/99999999999",
        ] {
            let err = input.parse::<PostLink>().unwrap_err();
            assert!(err.is_validation(), "{input:?} should be a validation error");
        }
    }

    proptest! {
        #[test]
        fn internal_links_roundtrip(internal in 1i64..9_999_999_999, topic in proptest::option::of(1i32..100_000), msg in 1i32..i32::MAX) {
            let text = match topic {
                Some(t) => format!("https://t.me/c/{internal}/{t}/{msg}"),
                None => format!("https://t.me/c/{internal}/{msg}"),
            };
            let link: PostLink = text.parse().unwrap();
            prop_assert_eq!(link.chat, LinkChat::Internal(internal));
            prop_assert_eq!(link.topic_id, topic);
            prop_assert_eq!(link.message_id, msg);
        }
    }
}
