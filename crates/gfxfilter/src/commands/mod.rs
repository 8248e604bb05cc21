//! # Command Layer
//!
//! Commands are the operations a text or scripting front end performs on a
//! module. They take typed requests (parsing tokens is the front end's job)
//! and return a structured [`CmdResult`] instead of printing anything.
//!
//! ## Structured Returns
//!
//! [`CmdResult`] carries:
//! - `affected_filters`: descriptions of filters the command created or changed
//! - `listed_filters`: descriptions of filters to display
//! - `messages`: messages with levels (info, success)
//!
//! Descriptions render in command form through `Display`, so a front end can
//! echo a filter back in the same syntax it was defined with.
//!
//! ## Command Modules
//!
//! - [`define`]: Create or update a filter from a [`DefineRequest`]
//! - [`list`]: Describe one filter or all of them

use serde::Serialize;

use crate::filter::FilterDescription;

pub mod define;
pub mod list;

pub use define::DefineRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    pub affected_filters: Vec<FilterDescription>,
    pub listed_filters: Vec<FilterDescription>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_filters(mut self, filters: Vec<FilterDescription>) -> Self {
        self.affected_filters = filters;
        self
    }

    pub fn with_listed_filters(mut self, filters: Vec<FilterDescription>) -> Self {
        self.listed_filters = filters;
        self
    }
}
