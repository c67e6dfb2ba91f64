// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatch for the admin workflows.
//!
//! Every event passes the admin guard first. Commands and type-management
//! buttons may start a workflow from any state; everything else is routed to
//! the handler of the administrator's persisted step. A handler either saves
//! the next step, rejects the input with a [`HeraldError::Validation`] and
//! leaves the row untouched, or commits its side effect and clears the row.

use std::sync::Arc;

use tracing::{debug, warn};

use herald_core::{
    AdminId, Conversation, ConversationState, HeraldError, Messenger, StateStore, Step,
};
use herald_storage::Database;

use crate::directory::AdminDirectory;
use crate::event::{Action, AdminEvent, Command, Payload};
use crate::response::{Outcome, Response};

pub(crate) const HELP: &str = "Herald admin bot.\n\n\
/newpost - publish a new post\n\
/editpost - edit a published post\n\
/deletepost - delete a published post\n\
/newtype - create a post type\n\
/types - manage post types\n\
/setforum - publish into the current forum topic\n\
/export - download a database dump\n\
/admins, /addadmin <id>, /removeadmin <id> - manage administrators\n\
/cancel - cancel the current action";

/// The per-administrator conversation engine.
pub struct ConversationMachine {
    pub(crate) db: Arc<Database>,
    pub(crate) store: Arc<dyn StateStore>,
    pub(crate) directory: Arc<AdminDirectory>,
    pub(crate) messenger: Arc<dyn Messenger>,
}

impl ConversationMachine {
    pub fn new(
        db: Arc<Database>,
        store: Arc<dyn StateStore>,
        directory: Arc<AdminDirectory>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            db,
            store,
            directory,
            messenger,
        }
    }

    pub fn directory(&self) -> &Arc<AdminDirectory> {
        &self.directory
    }

    /// Handles one inbound event.
    ///
    /// Non-administrators get [`Outcome::Ignored`] without any state access.
    /// Validation failures become [`Outcome::Rejected`]; other errors, such as
    /// a missing referenced entity or a storage failure, are returned as-is
    /// and leave the persisted state as it was.
    pub async fn handle(&self, event: AdminEvent) -> Result<Outcome, HeraldError> {
        if !self.directory.is_admin(event.admin_id) {
            debug!(admin_id = %event.admin_id, "ignoring event from non-admin");
            return Ok(Outcome::Ignored);
        }

        match self.dispatch(&event).await {
            Ok(response) => Ok(Outcome::Respond(response)),
            Err(HeraldError::Validation(reason)) => {
                debug!(admin_id = %event.admin_id, %reason, "input rejected");
                Ok(Outcome::Rejected(Response::text(reason)))
            }
            Err(e) => Err(e),
        }
    }

    /// Records the message id of the prompt just shown to `admin`.
    pub async fn remember_prompt(&self, admin: AdminId, message_id: i32) -> Result<(), HeraldError> {
        self.store.remember_prompt(admin, message_id).await
    }

    async fn dispatch(&self, event: &AdminEvent) -> Result<Response, HeraldError> {
        if event.payload.is_cancel() {
            return self.cancel(event).await;
        }

        match &event.payload {
            Payload::Command(command) => return self.command(event, command).await,
            Payload::Action(Action::RenameType(id)) => {
                return self.start_type_edit(event, Step::EditTypeName, *id).await;
            }
            Payload::Action(Action::TypeImage(id)) => {
                return self.start_type_edit(event, Step::EditTypeImage, *id).await;
            }
            Payload::Action(Action::TypeTemplate(id)) => {
                return self.start_type_edit(event, Step::EditTypeTemplate, *id).await;
            }
            Payload::Action(Action::DeleteType(id)) => return self.delete_type(*id).await,
            _ => {}
        }

        let state = match self.store.lookup(event.admin_id).await? {
            Conversation::Idle => return Ok(Response::text(HELP)),
            Conversation::Active(state) => state,
        };
        let Some(step) = state.step else {
            return Ok(Response::text(HELP));
        };

        debug!(admin_id = %event.admin_id, %step, "handling step");
        let dismiss = stale_prompt(&state, event);
        let payload = &event.payload;
        let mut response = match step {
            Step::NewPostSelectType => self.select_type(state, payload).await?,
            Step::NewPostEnterText => self.enter_post_text(state, payload).await?,
            Step::NewPostConfirm => self.confirm_post(state, payload).await?,
            Step::EditPostEnterLink => self.enter_edit_link(state, payload).await?,
            Step::EditPostEnterText => self.enter_edit_text(state, payload).await?,
            Step::DeletePostEnterLink => self.enter_delete_link(state, payload).await?,
            Step::NewTypeEnterName => self.enter_type_name(state, payload).await?,
            Step::NewTypeEnterImage => self.enter_type_image(state, payload).await?,
            Step::NewTypeEnterTemplate => self.enter_type_template(state, payload).await?,
            Step::EditTypeName => self.edit_type_name(state, payload).await?,
            Step::EditTypeImage => self.edit_type_image(state, payload).await?,
            Step::EditTypeTemplate => self.edit_type_template(state, payload).await?,
        };
        response.dismiss = dismiss;
        Ok(response)
    }

    async fn command(&self, event: &AdminEvent, command: &Command) -> Result<Response, HeraldError> {
        match command {
            Command::Start | Command::Help => Ok(Response::text(HELP)),
            Command::NewPost => self.start_new_post(event).await,
            Command::EditPost => self.start_edit_post(event).await,
            Command::DeletePost => self.start_delete_post(event).await,
            Command::NewType => self.start_new_type(event).await,
            Command::Types => self.list_types().await,
            Command::Cancel => self.cancel(event).await,
            Command::Export => self.export(event).await,
            Command::SetForum(args) => self.set_forum(event, args).await,
            Command::AddAdmin(arg) => self.add_admin(arg).await,
            Command::RemoveAdmin(arg) => self.remove_admin(arg).await,
            Command::Admins => Ok(self.list_admins()),
        }
    }

    async fn cancel(&self, event: &AdminEvent) -> Result<Response, HeraldError> {
        let (dismiss, workflow) = match self.store.lookup(event.admin_id).await {
            Ok(Conversation::Idle) => return Ok(Response::text("Nothing to cancel.")),
            Ok(Conversation::Active(state)) => {
                (stale_prompt(&state, event), state.step.map(Step::workflow))
            }
            Err(HeraldError::Integrity(reason)) => {
                warn!(admin_id = %event.admin_id, %reason, "discarding unreadable conversation state");
                (None, None)
            }
            Err(e) => return Err(e),
        };

        self.store.clear(event.admin_id).await?;
        debug!(admin_id = %event.admin_id, ?workflow, "workflow cancelled");
        let text = match workflow {
            Some(workflow) => format!("Cancelled the {workflow}."),
            None => "Cancelled.".to_string(),
        };
        Ok(Response {
            dismiss,
            ..Response::text(text)
        })
    }

    /// Saves a fresh workflow state, replacing whatever was in flight.
    ///
    /// Returns the previous prompt to dismiss.
    pub(crate) async fn start(
        &self,
        event: &AdminEvent,
        state: ConversationState,
    ) -> Result<Option<i32>, HeraldError> {
        let dismiss = match self.store.lookup(event.admin_id).await {
            Ok(Conversation::Active(previous)) => {
                debug!(
                    admin_id = %event.admin_id,
                    workflow = ?previous.step.map(Step::workflow),
                    "discarding unfinished workflow"
                );
                stale_prompt(&previous, event)
            }
            Ok(Conversation::Idle) => None,
            Err(HeraldError::Integrity(reason)) => {
                warn!(admin_id = %event.admin_id, %reason, "overwriting unreadable conversation state");
                None
            }
            Err(e) => return Err(e),
        };
        self.save(&state).await?;
        Ok(dismiss)
    }

    pub(crate) async fn save(&self, state: &ConversationState) -> Result<(), HeraldError> {
        self.store.save(state).await?;
        debug!(admin_id = %state.admin_id, step = ?state.step, "conversation state saved");
        Ok(())
    }

    pub(crate) async fn finish(&self, admin: AdminId) -> Result<(), HeraldError> {
        self.store.clear(admin).await?;
        debug!(admin_id = %admin, "conversation state cleared");
        Ok(())
    }
}

/// The last prompt, unless the event came from pressing one of its buttons.
fn stale_prompt(state: &ConversationState, event: &AdminEvent) -> Option<i32> {
    state
        .last_bot_message_id
        .filter(|id| Some(*id) != event.origin_message_id)
}
