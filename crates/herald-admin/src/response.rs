// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! What the conversation engine asks the transport to show.

use herald_core::RenderedPost;

use crate::event::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn cancel() -> Self {
        Self::new("✖️ Cancel", Action::Cancel)
    }
}

/// A reply to one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    pub text: String,
    /// Inline keyboard rows.
    pub keyboard: Vec<Vec<Button>>,
    /// Shown as its own message before `text`.
    pub preview: Option<RenderedPost>,
    /// Earlier prompt whose keyboard is now stale.
    pub dismiss: Option<i32>,
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        self.keyboard.push(row);
        self
    }

    /// Appends a lone cancel button.
    pub fn cancellable(self) -> Self {
        self.with_row(vec![Button::cancel()])
    }

    pub fn with_preview(mut self, preview: RenderedPost) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Every action on the keyboard, row by row.
    pub fn actions(&self) -> Vec<Action> {
        self.keyboard
            .iter()
            .flatten()
            .map(|button| button.action)
            .collect()
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The sender is not an administrator; nothing is answered.
    Ignored,
    /// The input does not fit the current step; nothing was persisted.
    Rejected(Response),
    Respond(Response),
}

impl Outcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Ignored => None,
            Outcome::Rejected(response) | Outcome::Respond(response) => Some(response),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}
