//! Decorator configuration.
//!
//! [`SuggestionOptions`] is the plain-data part (separator, case sensitivity, class names) and
//! can be loaded from JSON. [`SuggestionConfig`] adds the caller-supplied accessors and the
//! external insertion operation. A config is captured once when the decorator is built and is
//! read-only afterwards.

use crate::error::MentionError;
use crate::filter::CaseSensitivity;
use crate::layout::Rect;
use crate::services::PopupServices;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;

/// Default trigger separator.
pub const DEFAULT_SEPARATOR: &str = "@";

/// Plain-data options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionOptions {
    /// Marker that starts a mention query.
    pub separator: String,
    /// Match candidates case-sensitively in the dropdown filter.
    pub case_sensitive: bool,
    /// Extra class appended to the dropdown's class list.
    pub dropdown_class_name: Option<String>,
    /// Extra class appended to every option's class list.
    pub option_class_name: Option<String>,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            case_sensitive: false,
            dropdown_class_name: None,
            option_class_name: None,
        }
    }
}

impl SuggestionOptions {
    /// Options with the given separator and defaults elsewhere.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..Self::default()
        }
    }

    /// Check the options are usable.
    pub fn validate(&self) -> Result<(), MentionError> {
        if self.separator.is_empty() {
            return Err(MentionError::EmptySeparator);
        }
        Ok(())
    }

    /// Parse and validate options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, MentionError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Read, parse and validate options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MentionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Case handling for the dropdown filter.
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        CaseSensitivity::from_flag(self.case_sensitive)
    }
}

/// Returns the current candidate list.
pub type SuggestionSource<C> = Rc<dyn Fn() -> Vec<C>>;
/// Returns the live editor state, or `None` when no editor is attached.
pub type EditorStateAccessor<S> = Rc<dyn Fn() -> Option<S>>;
/// Receives the editor state produced by an insertion.
pub type ChangeCallback<S> = Rc<dyn Fn(S)>;
/// Returns the editor container's bounds, or `None` before layout.
pub type WrapperRectAccessor = Rc<dyn Fn() -> Option<Rect>>;
/// Replaces the trigger span with a mention: `(state, on_change, separator, candidate)`.
pub type InsertMention<S, C> = Rc<dyn Fn(S, &dyn Fn(S), &str, &C)>;

/// Full configuration of a mention decorator.
pub struct SuggestionConfig<S, C> {
    options: SuggestionOptions,
    get_suggestions: SuggestionSource<C>,
    get_editor_state: EditorStateAccessor<S>,
    on_change: ChangeCallback<S>,
    add_mention: InsertMention<S, C>,
    get_wrapper_rect: WrapperRectAccessor,
    services: PopupServices,
}

impl<S: 'static, C: 'static> SuggestionConfig<S, C> {
    /// Build a config. Fails if the options are invalid.
    ///
    /// The wrapper-rect accessor defaults to "not measurable" and the services to a fresh
    /// set; override them with [`with_wrapper_rect`](Self::with_wrapper_rect) and
    /// [`with_services`](Self::with_services).
    pub fn new(
        options: SuggestionOptions,
        get_suggestions: impl Fn() -> Vec<C> + 'static,
        get_editor_state: impl Fn() -> Option<S> + 'static,
        on_change: impl Fn(S) + 'static,
        add_mention: impl Fn(S, &dyn Fn(S), &str, &C) + 'static,
    ) -> Result<Self, MentionError> {
        options.validate()?;
        Ok(Self {
            options,
            get_suggestions: Rc::new(get_suggestions),
            get_editor_state: Rc::new(get_editor_state),
            on_change: Rc::new(on_change),
            add_mention: Rc::new(add_mention),
            get_wrapper_rect: Rc::new(|| None),
            services: PopupServices::default(),
        })
    }

    /// Use `get_wrapper_rect` to measure the editor container.
    pub fn with_wrapper_rect(
        mut self,
        get_wrapper_rect: impl Fn() -> Option<Rect> + 'static,
    ) -> Self {
        self.get_wrapper_rect = Rc::new(get_wrapper_rect);
        self
    }

    /// Share `services` with the rest of the editor.
    pub fn with_services(mut self, services: PopupServices) -> Self {
        self.services = services;
        self
    }
}

impl<S, C> SuggestionConfig<S, C> {
    /// Plain-data options.
    pub fn options(&self) -> &SuggestionOptions {
        &self.options
    }

    /// Trigger separator.
    pub fn separator(&self) -> &str {
        &self.options.separator
    }

    /// Shared services.
    pub fn services(&self) -> &PopupServices {
        &self.services
    }

    /// Current candidates.
    pub fn suggestions(&self) -> Vec<C> {
        (self.get_suggestions)()
    }

    /// Current editor state.
    pub fn editor_state(&self) -> Option<S> {
        (self.get_editor_state)()
    }

    /// Current editor container bounds.
    pub fn wrapper_rect(&self) -> Option<Rect> {
        (self.get_wrapper_rect)()
    }

    /// Run the insertion operation for `candidate` against `state`.
    pub fn insert_mention(&self, state: S, candidate: &C) {
        (self.add_mention)(state, &*self.on_change, &self.options.separator, candidate);
    }
}
