// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update routing and conversion into [`AdminEvent`]s.
//!
//! Private-chat messages and button presses become admin events regardless of
//! the sender; the conversation engine's guard decides whether they are
//! acted upon. In groups only `/setforum` is an event; other group messages
//! are candidates for reply tracking.

use teloxide::prelude::*;
use teloxide::types::{ChatKind, MessageEntity};
use tracing::debug;

use herald_admin::{Action, AdminEvent, Command, Payload};
use herald_core::{AdminId, Entity};

/// Checks whether the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

fn sender(msg: &Message) -> Option<AdminId> {
    msg.from.as_ref().and_then(user_id)
}

/// Telegram user ids fit in 52 bits; anything larger is dropped, never wrapped.
fn user_id(user: &teloxide::types::User) -> Option<AdminId> {
    i64::try_from(user.id.0).ok().map(AdminId)
}

/// Converts Bot API entities into stored entities, dropping any that do not map.
pub fn entities_from(raw: Option<&[MessageEntity]>) -> Vec<Entity> {
    raw.unwrap_or_default()
        .iter()
        .filter_map(|entity| {
            serde_json::to_value(entity)
                .and_then(serde_json::from_value)
                .map_err(|e| debug!(error = %e, "skipping unconvertible entity"))
                .ok()
        })
        .collect()
}

/// Builds the payload of a text or photo message.
///
/// Returns `None` for stickers, documents and other unsupported content.
pub fn payload_from(msg: &Message) -> Option<Payload> {
    if let Some(text) = msg.text() {
        return Some(match Command::parse(text) {
            Some(command) => Payload::Command(command),
            None => Payload::Text {
                text: text.to_string(),
                entities: entities_from(msg.entities()),
            },
        });
    }

    if let Some(photos) = msg.photo() {
        // Telegram provides multiple sizes; the last one is the largest.
        let largest = photos.last()?;
        return Some(Payload::Photo {
            file_id: largest.file.id.0.clone(),
            caption: msg.caption().unwrap_or_default().to_string(),
            entities: entities_from(msg.caption_entities()),
        });
    }

    None
}

/// Maps a message to an admin event, if it is one.
pub fn event_from_message(msg: &Message) -> Option<AdminEvent> {
    let admin_id = sender(msg)?;
    let payload = payload_from(msg)?;

    if !is_dm(msg) && !matches!(payload, Payload::Command(Command::SetForum(_))) {
        return None;
    }

    Some(AdminEvent {
        admin_id,
        chat_id: msg.chat.id.0,
        thread_id: msg.thread_id.map(|thread| thread.0.0),
        origin_message_id: None,
        payload,
    })
}

/// Maps a button press to an admin event.
///
/// Presses with unknown callback data or on messages Telegram no longer
/// exposes are dropped.
pub fn event_from_callback(q: &CallbackQuery) -> Option<AdminEvent> {
    let message = q.message.as_ref()?;
    let admin_id = user_id(&q.from)?;
    let action: Action = match q.data.as_deref()?.parse() {
        Ok(action) => action,
        Err(e) => {
            debug!(error = %e, "ignoring unknown callback data");
            return None;
        }
    };

    Some(AdminEvent {
        admin_id,
        chat_id: message.chat().id.0,
        thread_id: None,
        origin_message_id: Some(message.id().0),
        payload: Payload::Action(action),
    })
}

/// A group message that replies to another message: `(replied-to id, author, text)`.
pub fn reply_from_message(msg: &Message) -> Option<(i32, i64, String)> {
    if is_dm(msg) {
        return None;
    }
    let parent = msg.reply_to_message()?;
    let author = sender(msg)?;
    let text = msg
        .text()
        .or_else(|| msg.caption())
        .unwrap_or_default()
        .to_string();
    Some((parent.id.0, author.0, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64) -> serde_json::Value {
        serde_json::json!({ "id": id, "is_bot": false, "first_name": "Test" })
    }

    fn private_chat(id: i64) -> serde_json::Value {
        serde_json::json!({ "id": id, "type": "private", "first_name": "Test" })
    }

    fn forum_chat() -> serde_json::Value {
        serde_json::json!({ "id": -1001234567890i64, "type": "supergroup", "title": "Forum", "is_forum": true })
    }

    fn message(fields: serde_json::Value) -> Message {
        let mut json = serde_json::json!({ "message_id": 1, "date": 1700000000i64 });
        for (key, value) in fields.as_object().unwrap() {
            json[key] = value.clone();
        }
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    #[test]
    fn private_text_becomes_text_payload_with_entities() {
        let msg = message(serde_json::json!({
            "chat": private_chat(42),
            "from": user(42),
            "text": "hello world",
            "entities": [{ "type": "bold", "offset": 0, "length": 5 }],
        }));

        let event = event_from_message(&msg).unwrap();
        assert_eq!(event.admin_id, AdminId(42));
        assert_eq!(event.chat_id, 42);
        assert_eq!(event.origin_message_id, None);
        assert_eq!(
            event.payload,
            Payload::Text {
                text: "hello world".into(),
                entities: vec![Entity::new("bold", 0, 5)],
            }
        );
    }

    #[test]
    fn text_link_keeps_its_url() {
        let entities = entities_from(Some(&[serde_json::from_value::<MessageEntity>(
            serde_json::json!({ "type": "text_link", "offset": 1, "length": 2, "url": "https://example.com/" }),
        )
        .unwrap()]));
        assert_eq!(entities[0].kind, "text_link");
        assert_eq!(entities[0].extra["url"], "https://example.com/");
    }

    #[test]
    fn commands_are_parsed() {
        let msg = message(serde_json::json!({
            "chat": private_chat(42),
            "from": user(42),
            "text": "/newpost",
        }));
        assert_eq!(
            event_from_message(&msg).unwrap().payload,
            Payload::Command(Command::NewPost)
        );
    }

    #[test]
    fn photo_uses_largest_size_and_caption() {
        let msg = message(serde_json::json!({
            "chat": private_chat(42),
            "from": user(42),
            "photo": [
                { "file_id": "small", "file_unique_id": "s", "width": 90, "height": 90 },
                { "file_id": "large", "file_unique_id": "l", "width": 1280, "height": 1280 },
            ],
            "caption": "Look",
        }));

        match event_from_message(&msg).unwrap().payload {
            Payload::Photo {
                file_id, caption, ..
            } => {
                assert_eq!(file_id, "large");
                assert_eq!(caption, "Look");
            }
            other => panic!("expected photo, got {other:?}"),
        }
    }

    #[test]
    fn group_messages_are_not_events_except_setforum() {
        let chatter = message(serde_json::json!({
            "chat": forum_chat(),
            "from": user(42),
            "text": "/newpost",
        }));
        assert!(event_from_message(&chatter).is_none());

        let setforum = message(serde_json::json!({
            "chat": forum_chat(),
            "from": user(42),
            "text": "/setforum@herald_bot",
            "message_thread_id": 12,
            "is_topic_message": true,
        }));
        let event = event_from_message(&setforum).unwrap();
        assert_eq!(event.chat_id, -1001234567890);
        assert_eq!(event.thread_id, Some(12));
        assert_eq!(
            event.payload,
            Payload::Command(Command::SetForum(String::new()))
        );
    }

    #[test]
    fn out_of_range_user_ids_are_dropped() {
        let msg = message(serde_json::json!({
            "chat": private_chat(42),
            "from": user(u64::MAX),
            "text": "/newpost",
        }));
        assert!(event_from_message(&msg).is_none());

        let q: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "cb-3",
            "from": user(u64::MAX),
            "chat_instance": "ci",
            "data": "confirm",
            "message": {
                "message_id": 555,
                "date": 1700000000i64,
                "chat": private_chat(42),
                "text": "x",
            },
        }))
        .unwrap();
        assert!(event_from_callback(&q).is_none());
    }

    #[test]
    fn messages_without_sender_are_dropped() {
        let msg = message(serde_json::json!({
            "chat": private_chat(42),
            "text": "hello",
        }));
        assert!(event_from_message(&msg).is_none());
    }

    #[test]
    fn group_replies_are_detected() {
        let parent = serde_json::json!({
            "message_id": 1000,
            "date": 1700000000i64,
            "chat": forum_chat(),
            "text": "A post",
        });
        let msg = message(serde_json::json!({
            "chat": forum_chat(),
            "from": user(7),
            "text": "Nice post",
            "reply_to_message": parent,
        }));
        assert_eq!(
            reply_from_message(&msg),
            Some((1000, 7, "Nice post".to_string()))
        );

        let dm = message(serde_json::json!({
            "chat": private_chat(42),
            "from": user(42),
            "text": "hello",
        }));
        assert_eq!(reply_from_message(&dm), None);
    }

    #[test]
    fn callback_becomes_action_on_origin_message() {
        let q: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "cb-1",
            "from": user(42),
            "chat_instance": "ci",
            "data": "type:7",
            "message": {
                "message_id": 555,
                "date": 1700000000i64,
                "chat": private_chat(42),
                "text": "Choose the post type:",
            },
        }))
        .unwrap();

        let event = event_from_callback(&q).unwrap();
        assert_eq!(event.admin_id, AdminId(42));
        assert_eq!(event.chat_id, 42);
        assert_eq!(event.origin_message_id, Some(555));
        assert_eq!(event.payload, Payload::Action(Action::SelectType(7)));
    }

    #[test]
    fn unknown_callback_data_is_dropped() {
        let q: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "cb-2",
            "from": user(42),
            "chat_instance": "ci",
            "data": "launch:rockets",
            "message": {
                "message_id": 555,
                "date": 1700000000i64,
                "chat": private_chat(42),
                "text": "x",
            },
        }))
        .unwrap();
        assert!(event_from_callback(&q).is_none());
    }
}
