#![warn(missing_docs)]
//! Mention Core - headless mention suggestions for rich-text editors
//!
//! # Overview
//!
//! `mention-core` implements the logic behind "type `@` and pick a name": as the user types a
//! trigger separator followed by a query, it detects the trigger span around the caret,
//! filters a caller-supplied candidate list, drives a dropdown state machine (highlight,
//! wrap-around navigation, commit, cancel) and hands the chosen candidate to an insertion
//! operation supplied by the host editor.
//!
//! It renders nothing. Hosts draw from a [`SuggestionView`] and feed key and mouse events
//! back in.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Decorator (scan → mount/update/unmount)    │  ← Host entry point
//! ├─────────────────────────────────────────────┤
//! │  Popup Controller + View + Layout           │  ← UI state machine
//! ├─────────────────────────────────────────────┤
//! │  Services (keys, suggestion flag, modals)   │  ← Shared registrations
//! ├─────────────────────────────────────────────┤
//! │  Scanner + Filter                           │  ← Pure text logic
//! ├─────────────────────────────────────────────┤
//! │  Host model (blocks, selection)             │  ← Editor abstraction
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use mention_core::{
//!     BlockDocument, EditorState, Key, KeyEvent, MentionCandidate, MentionSuggestion,
//!     PopupServices, SuggestionConfig, SuggestionOptions,
//! };
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let doc = Rc::new(RefCell::new(BlockDocument::from_text("hello @al")));
//! let services = PopupServices::new();
//!
//! let config = SuggestionConfig::new(
//!     SuggestionOptions::default(),
//!     || vec![MentionCandidate::new("alice"), MentionCandidate::new("albert")],
//!     { let doc = Rc::clone(&doc); move || Some(doc.borrow().clone()) },
//!     { let doc = Rc::clone(&doc); move |state| *doc.borrow_mut() = state },
//!     |mut state: BlockDocument, on_change: &dyn Fn(BlockDocument), separator: &str, candidate: &MentionCandidate| {
//!         let key = state.selection().focus_key.clone();
//!         let caret = state.selection().focus_offset;
//!         state.replace_range(&key, 6..caret, &format!("{separator}{} ", candidate.text));
//!         on_change(state);
//!     },
//! )
//! .unwrap()
//! .with_services(services.clone());
//!
//! let mut mentions = MentionSuggestion::new(config);
//! mentions.refresh();
//! assert_eq!(mentions.popup().unwrap().filtered().len(), 2);
//!
//! services.keys.dispatch(&mut KeyEvent::new(Key::ArrowDown));
//! services.keys.dispatch(&mut KeyEvent::new(Key::Enter));
//! assert_eq!(doc.borrow().text(), "hello @alice ");
//! ```
//!
//! # Module Description
//!
//! - [`host`] - text blocks, selection, and the in-memory [`BlockDocument`]
//! - [`candidate`] - the [`Candidate`] capability and JSON-shaped [`MentionCandidate`]
//! - [`filter`] - case folding and the stable substring filter
//! - [`scanner`] - trigger-span detection
//! - [`services`] - key dispatch, suggestion flag and modal coordination
//! - [`config`] - options and caller-supplied accessors
//! - [`layout`] - once-at-mount dropdown positioning
//! - [`popup`] - the state machine and [`PopupController`]
//! - [`view`] - the render projection
//! - [`decorator`] - [`MentionSuggestion`], tying scanning to the popup lifecycle
//!
//! # Offsets
//!
//! All offsets are Unicode scalar values (`char`) from the start of a block.

pub mod candidate;
pub mod config;
pub mod decorator;
pub mod error;
pub mod filter;
pub mod host;
pub mod layout;
pub mod popup;
pub mod scanner;
pub mod services;
mod text;
pub mod view;

pub use candidate::{Candidate, MentionCandidate};
pub use config::{DEFAULT_SEPARATOR, SuggestionConfig, SuggestionOptions};
pub use decorator::{DecoratorEvent, MentionSuggestion};
pub use error::MentionError;
pub use filter::{CaseSensitivity, filter_candidates, suggestion_present};
pub use host::{BlockDocument, BlockKey, ContentBlock, EditorState, SelectionState};
pub use layout::{DROPDOWN_INSET, DropdownPosition, Rect, compute_dropdown_position};
pub use popup::{
    Key, KeyEvent, PopupController, PopupEffect, PopupState, Transition, handle_key, next_index,
    previous_index,
};
pub use scanner::{MatchRegion, find_match_region, probe_end};
pub use services::{
    KeyDispatcher, KeySubscription, ModalCallbackId, ModalHandler, PopupServices, SubscriptionId,
    SuggestionCallbackId, SuggestionFlag,
};
pub use view::{DropdownView, OptionView, SuggestionView};
