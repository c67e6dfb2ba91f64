// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.

use async_trait::async_trait;
use tokio::sync::Mutex;

use herald_core::{ForumTarget, HeraldError, Messenger, PublishedMessage, RenderedPost};

/// A captured `send_post` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentPost {
    pub target: ForumTarget,
    pub post: RenderedPost,
    pub message: PublishedMessage,
}

/// A captured `send_document` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentDocument {
    pub chat_id: i64,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Default)]
struct Recorded {
    next_message_id: i32,
    sent: Vec<SentPost>,
    edited: Vec<(PublishedMessage, RenderedPost)>,
    deleted: Vec<PublishedMessage>,
    documents: Vec<SentDocument>,
    fail_next: Option<String>,
}

/// In-memory [`Messenger`] that hands out sequential message ids from 1000.
pub struct MockMessenger {
    state: Mutex<Recorded>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Recorded {
                next_message_id: 1000,
                ..Recorded::default()
            }),
        }
    }

    /// Make the next transport call fail with `message`.
    pub async fn fail_next(&self, message: &str) {
        self.state.lock().await.fail_next = Some(message.to_string());
    }

    pub async fn sent_posts(&self) -> Vec<SentPost> {
        self.state.lock().await.sent.clone()
    }

    pub async fn edited_posts(&self) -> Vec<(PublishedMessage, RenderedPost)> {
        self.state.lock().await.edited.clone()
    }

    pub async fn deleted_messages(&self) -> Vec<PublishedMessage> {
        self.state.lock().await.deleted.clone()
    }

    pub async fn documents(&self) -> Vec<SentDocument> {
        self.state.lock().await.documents.clone()
    }

    fn check_failure(state: &mut Recorded) -> Result<(), HeraldError> {
        match state.fail_next.take() {
            Some(message) => Err(HeraldError::Transport {
                message,
                source: None,
            }),
            None => Ok(()),
        }
    }
}

impl Default for MockMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_post(
        &self,
        target: ForumTarget,
        post: &RenderedPost,
    ) -> Result<PublishedMessage, HeraldError> {
        let mut state = self.state.lock().await;
        Self::check_failure(&mut state)?;
        let message = PublishedMessage {
            chat_id: target.chat_id,
            message_id: state.next_message_id,
        };
        state.next_message_id += 1;
        state.sent.push(SentPost {
            target,
            post: post.clone(),
            message,
        });
        Ok(message)
    }

    async fn edit_post(
        &self,
        message: PublishedMessage,
        post: &RenderedPost,
    ) -> Result<(), HeraldError> {
        let mut state = self.state.lock().await;
        Self::check_failure(&mut state)?;
        state.edited.push((message, post.clone()));
        Ok(())
    }

    async fn delete_message(&self, message: PublishedMessage) -> Result<(), HeraldError> {
        let mut state = self.state.lock().await;
        Self::check_failure(&mut state)?;
        state.deleted.push(message);
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<(), HeraldError> {
        let mut state = self.state.lock().await;
        Self::check_failure(&mut state)?;
        state.documents.push(SentDocument {
            chat_id,
            file_name: file_name.to_string(),
            contents,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: ForumTarget = ForumTarget {
        chat_id: -100,
        topic_id: Some(4),
    };

    #[tokio::test]
    async fn send_assigns_sequential_ids() {
        let messenger = MockMessenger::new();
        let post = RenderedPost {
            text: "hi".into(),
            ..RenderedPost::default()
        };
        let first = messenger.send_post(TARGET, &post).await.unwrap();
        let second = messenger.send_post(TARGET, &post).await.unwrap();
        assert_eq!(first.message_id, 1000);
        assert_eq!(second.message_id, 1001);
        assert_eq!(messenger.sent_posts().await.len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let messenger = MockMessenger::new();
        messenger.fail_next("flood wait").await;
        let message = PublishedMessage {
            chat_id: -100,
            message_id: 1,
        };
        let err = messenger.delete_message(message).await.unwrap_err();
        assert!(matches!(err, HeraldError::Transport { .. }));
        messenger.delete_message(message).await.unwrap();
        assert_eq!(messenger.deleted_messages().await, vec![message]);
    }
}
