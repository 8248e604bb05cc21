//! # Gfxfilter Architecture
//!
//! Gfxfilter decides which graphics of a scene are shown. A scene asks a
//! **graphics filter** about each of its graphics; the filter answers from the
//! graphic's name, visibility flags, region, graphic type or domain type, or by
//! combining other filters with AND/OR.
//!
//! The library owns no scene and draws nothing. It sees graphics only through
//! the [`model::Graphic`] trait.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - GraphicsFilterModule: factories, lookup, change brackets │
//! │  - Dispatches define/list to the command layer              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Typed define requests, listings                          │
//! │  - Returns CmdResult, never prints                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Filters (filter/)                                          │
//! │  - Shared handles, leaf criteria, AND/OR operand lists      │
//! │  - Evaluation, cycle checks, descriptions                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Registry (manager.rs)                                      │
//! │  - Unique names, temporary names, change batching           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Look
//!
//! ```
//! use gfxfilter::api::GraphicsFilterModule;
//! use gfxfilter::model::SceneGraphic;
//!
//! let module = GraphicsFilterModule::new();
//! let circles = module.create_graphic_name_filter("circle");
//! let visible = module.create_visibility_flags_filter();
//! let either = module.create_or_filter();
//! let or = either.as_operator().unwrap();
//! or.append_operand(&circles).unwrap();
//! or.append_operand(&visible).unwrap();
//!
//! let hidden_circle = SceneGraphic::new("circle").with_visibility(false);
//! assert!(either.evaluate(&hidden_circle));
//!
//! either.set_inverse(true);
//! assert!(!either.evaluate(&hidden_circle));
//! ```
//!
//! ## Single-Threaded
//!
//! Filters share ownership through `Rc` and mutate through `Cell`/`RefCell`.
//! A module and its filters belong to one thread; they are neither `Send` nor
//! `Sync`.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and installs no logger: `debug`
//! for filters added, removed and renamed and for delivered change messages,
//! `warn` for rejected cycles and unbalanced change brackets, `trace` per
//! listener call.
//!
//! ## Module Overview
//!
//! - [`api`]: The module facade, entry point for all operations
//! - [`commands`]: Define and list commands
//! - [`filter`]: Filter handles, criteria, operators, descriptions
//! - [`change`]: Change flags and messages delivered to listeners
//! - [`model`]: The graphic boundary (`Graphic`, `SceneGraphic`, `RegionPath`)
//! - [`attributes`]: Integer attributes (`IS_INVERSE`, `IS_MANAGED`)
//! - [`validation`]: Filter name rules
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod attributes;
pub mod change;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
mod manager;
pub mod model;
pub mod validation;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use api::GraphicsFilterModule;
pub use error::{FilterError, Result};
pub use filter::{GraphicsFilter, OperatorFilter};
