//! Suggestion popup state machine and controller.
//!
//! # Overview
//!
//! A popup has two states, open (with an optional active row) and closed. Keyboard input is
//! mapped by the pure [`handle_key`] function to a [`Transition`]: the next state plus an
//! optional side-effect request ([`PopupEffect`]). [`PopupController`] applies transitions
//! to live state and performs the side effects: releasing its hold on the shared "suggestion
//! open" flag and running the insertion operation on commit.
//!
//! # Lifecycle
//!
//! ```text
//! activate(query) ──► on_query_changed(query)* ──► deactivate() / drop
//!     │                                                   │
//!     ├ register key handler                              ├ deregister key handler
//!     ├ hold suggestion flag                              ├ release suggestion flag
//!     └ install modal close callback                      └ remove modal close callback
//! ```
//!
//! Release happens in `Drop`, so it also runs when a controller is dropped without an explicit
//! `deactivate` (the trigger span vanished mid-interaction, unwinding, ...).

use crate::candidate::Candidate;
use crate::config::SuggestionConfig;
use crate::filter::filter_candidates;
use crate::layout::{DropdownPosition, Rect, compute_dropdown_position};
use crate::services::{KeySubscription, PopupServices, SuggestionCallbackId, SuggestionFlag};
use crate::view::{SuggestionView, build_view};
use std::cell::RefCell;
use std::rc::Rc;

/// Keys the popup reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move the highlight down (wrapping).
    ArrowDown,
    /// Move the highlight up (wrapping).
    ArrowUp,
    /// Close without inserting.
    Escape,
    /// Commit the highlighted row.
    Enter,
    /// Anything else.
    Other,
}

/// A key-down delivered through the [`KeyDispatcher`](crate::services::KeyDispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    default_prevented: bool,
}

impl KeyEvent {
    /// Create an event.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            default_prevented: false,
        }
    }

    /// Ask the host editor to skip its own handling of this key.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler asked the host to skip its own handling.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// UI state of one popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupState {
    /// Whether the dropdown is showing.
    pub visible: bool,
    /// Highlighted row in the filtered list.
    pub active_index: Option<usize>,
    /// Anchoring.
    pub position: DropdownPosition,
}

impl Default for PopupState {
    fn default() -> Self {
        Self {
            visible: true,
            active_index: None,
            position: DropdownPosition::default(),
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEffect {
    /// Insert the row at `index` (if it resolves), then close.
    Commit {
        /// Row to insert.
        index: Option<usize>,
    },
    /// The dropdown was dismissed.
    Closed,
}

/// Result of feeding a key to [`handle_key`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Next state.
    pub state: PopupState,
    /// Requested side effect.
    pub effect: Option<PopupEffect>,
    /// Whether the host editor should skip its default handling of the key.
    pub prevent_default: bool,
}

impl Transition {
    fn unchanged(state: PopupState) -> Self {
        Self {
            state,
            effect: None,
            prevent_default: false,
        }
    }
}

/// Row after `active` when moving down through `count` rows, wrapping to the top.
pub fn next_index(active: Option<usize>, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(match active {
        Some(index) => (index + 1) % count,
        None => 0,
    })
}

/// Row before `active` when moving up through `count` rows, wrapping to the bottom.
pub fn previous_index(active: Option<usize>, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(match active {
        Some(index) if index > 0 => index.min(count) - 1,
        _ => count - 1,
    })
}

/// Map a key to the next popup state. Keys are ignored while the dropdown is closed.
pub fn handle_key(state: PopupState, key: Key, filtered_count: usize) -> Transition {
    if !state.visible {
        return Transition::unchanged(state);
    }

    match key {
        Key::ArrowDown => Transition {
            state: PopupState {
                active_index: next_index(state.active_index, filtered_count),
                ..state
            },
            effect: None,
            prevent_default: true,
        },
        Key::ArrowUp => Transition {
            state: PopupState {
                active_index: previous_index(state.active_index, filtered_count),
                ..state
            },
            effect: None,
            prevent_default: false,
        },
        Key::Escape => Transition {
            state: PopupState {
                visible: false,
                ..state
            },
            effect: Some(PopupEffect::Closed),
            prevent_default: false,
        },
        Key::Enter => Transition {
            state: PopupState {
                visible: false,
                ..state
            },
            effect: Some(PopupEffect::Commit {
                index: state.active_index,
            }),
            prevent_default: false,
        },
        Key::Other => Transition::unchanged(state),
    }
}

struct PopupInner<C> {
    query: String,
    state: PopupState,
    filtered: Vec<C>,
    positioned: bool,
    // Whether this popup currently counts towards the shared flag.
    holds_flag: bool,
}

impl<C: Candidate + Clone> PopupInner<C> {
    fn hide(&mut self) {
        self.state.visible = false;
    }

    fn hold_flag(&mut self, flag: &SuggestionFlag) {
        if !self.holds_flag {
            flag.open();
            self.holds_flag = true;
        }
    }

    fn release_flag(&mut self, flag: &SuggestionFlag) {
        if self.holds_flag {
            flag.close();
            self.holds_flag = false;
        }
    }

    fn resolve(&self, index: Option<usize>) -> Option<C> {
        index.and_then(|index| self.filtered.get(index).cloned())
    }
}

struct Registration {
    key_subscription: KeySubscription,
    suggestion_callback: SuggestionCallbackId,
}

/// A mounted suggestion popup.
///
/// Created by [`activate`](Self::activate) when a trigger span appears and released by
/// [`deactivate`](Self::deactivate) or by dropping it.
pub struct PopupController<S: 'static, C: Candidate + Clone + 'static> {
    config: Rc<SuggestionConfig<S, C>>,
    inner: Rc<RefCell<PopupInner<C>>>,
    registration: Option<Registration>,
}

impl<S: 'static, C: Candidate + Clone + 'static> PopupController<S, C> {
    /// Mount a popup for `initial_query`.
    ///
    /// Filters the candidates immediately, registers the key handler, takes a hold on the
    /// suggestion flag and installs the modal close callback.
    pub fn activate(config: Rc<SuggestionConfig<S, C>>, initial_query: &str) -> Self {
        let filtered = filter_candidates(
            &config.suggestions(),
            initial_query,
            config.options().case_sensitivity(),
        );
        let inner = Rc::new(RefCell::new(PopupInner {
            query: initial_query.to_string(),
            state: PopupState::default(),
            filtered,
            positioned: false,
            holds_flag: false,
        }));

        let services = config.services().clone();

        let key_subscription = services.keys.register_scoped({
            let config = Rc::downgrade(&config);
            let inner = Rc::downgrade(&inner);
            move |event| {
                if let (Some(config), Some(inner)) = (config.upgrade(), inner.upgrade()) {
                    on_key_event(&config, &inner, event);
                }
            }
        });

        inner.borrow_mut().hold_flag(&services.suggestions);

        let suggestion_callback = services.modal.set_suggestion_callback({
            let inner = Rc::downgrade(&inner);
            let flag = Rc::clone(&services.suggestions);
            move || {
                if let Some(inner) = inner.upgrade() {
                    close_dropdown(&inner, &flag);
                }
            }
        });

        tracing::debug!(
            target: "mention_core::popup",
            query = initial_query,
            matches = inner.borrow().filtered.len(),
            "suggestion popup mounted"
        );

        Self {
            config,
            inner,
            registration: Some(Registration {
                key_subscription,
                suggestion_callback,
            }),
        }
    }

    /// The query changed while the caret stayed in the trigger span.
    ///
    /// Re-filters; a dropdown closed by the user reopens with no active row. An active row
    /// past the end of the new list is clamped to the last row.
    pub fn on_query_changed(&self, query: &str) {
        let filtered = filter_candidates(
            &self.config.suggestions(),
            query,
            self.config.options().case_sensitivity(),
        );

        let flag = &self.config.services().suggestions;
        let reopened = {
            let mut inner = self.inner.borrow_mut();
            inner.query = query.to_string();
            let count = filtered.len();
            inner.filtered = filtered;

            if inner.state.visible {
                inner.state.active_index = inner
                    .state
                    .active_index
                    .and_then(|index| count.checked_sub(1).map(|last| index.min(last)));
                false
            } else {
                inner.state.visible = true;
                inner.state.active_index = None;
                inner.hold_flag(flag);
                true
            }
        };

        tracing::trace!(
            target: "mention_core::popup",
            query,
            reopened,
            matches = self.inner.borrow().filtered.len(),
            "suggestion query changed"
        );
    }

    /// Feed a key directly, bypassing the dispatcher.
    pub fn handle_key_event(&self, event: &mut KeyEvent) {
        on_key_event(&self.config, &self.inner, event);
    }

    /// Pointer entered row `index`.
    pub fn on_option_mouse_enter(&self, index: usize) {
        let mut inner = self.inner.borrow_mut();
        if index < inner.filtered.len() {
            inner.state.active_index = Some(index);
        }
    }

    /// Pointer left a row.
    pub fn on_option_mouse_leave(&self) {
        self.inner.borrow_mut().state.active_index = None;
    }

    /// Row `index` was clicked: commit it.
    pub fn on_option_click(&self, index: usize) {
        let candidate = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.visible {
                return;
            }
            inner.hide();
            inner.release_flag(&self.config.services().suggestions);
            inner.resolve(Some(index))
        };
        commit(&self.config, candidate);
    }

    /// A click landed on the dropdown; tell the modal handler it was not an outside click.
    pub fn on_dropdown_click(&self) {
        self.config.services().modal.on_suggestion_click();
    }

    /// Hide the dropdown without inserting anything.
    pub fn close(&self) {
        close_dropdown(&self.inner, &self.config.services().suggestions);
    }

    /// Apply the one-time positioning from the trigger span and dropdown measurements.
    ///
    /// Returns `true` if the position was computed by this call. Later calls, and calls made
    /// while the editor container cannot be measured, change nothing.
    pub fn apply_layout(&self, trigger: Rect, dropdown: Rect) -> bool {
        if self.inner.borrow().positioned {
            return false;
        }
        let Some(editor) = self.config.wrapper_rect() else {
            return false;
        };

        let position = compute_dropdown_position(editor, trigger, dropdown);
        let mut inner = self.inner.borrow_mut();
        inner.state.position = position;
        inner.positioned = true;
        true
    }

    /// Current state.
    pub fn state(&self) -> PopupState {
        self.inner.borrow().state
    }

    /// Whether the dropdown is showing.
    pub fn is_visible(&self) -> bool {
        self.inner.borrow().state.visible
    }

    /// Highlighted row.
    pub fn active_index(&self) -> Option<usize> {
        self.inner.borrow().state.active_index
    }

    /// Current query.
    pub fn query(&self) -> String {
        self.inner.borrow().query.clone()
    }

    /// Candidates matching the current query.
    pub fn filtered(&self) -> Vec<C> {
        self.inner.borrow().filtered.clone()
    }

    /// Candidate under the highlight, if it resolves.
    pub fn active_candidate(&self) -> Option<C> {
        let inner = self.inner.borrow();
        inner.resolve(inner.state.active_index)
    }

    /// Render projection.
    pub fn view(&self) -> SuggestionView {
        let inner = self.inner.borrow();
        let options = self.config.options();
        build_view(&inner.query, &inner.state, &inner.filtered, options)
    }

    /// Whether the popup still holds its registrations.
    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    /// Unmount: release every registration. Equivalent to dropping the controller.
    pub fn deactivate(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };
        let PopupServices {
            suggestions,
            modal,
            ..
        } = self.config.services();
        let Registration {
            key_subscription,
            suggestion_callback,
        } = registration;
        drop(key_subscription);
        self.inner.borrow_mut().release_flag(suggestions);
        modal.remove_suggestion_callback(suggestion_callback);

        tracing::debug!(target: "mention_core::popup", "suggestion popup unmounted");
    }
}

impl<S: 'static, C: Candidate + Clone + 'static> Drop for PopupController<S, C> {
    fn drop(&mut self) {
        self.release();
    }
}

fn close_dropdown<C: Candidate + Clone>(inner: &RefCell<PopupInner<C>>, flag: &SuggestionFlag) {
    let mut inner = inner.borrow_mut();
    inner.hide();
    inner.release_flag(flag);
    drop(inner);
    tracing::debug!(target: "mention_core::popup", "suggestion dropdown closed");
}

fn on_key_event<S, C: Candidate + Clone>(
    config: &SuggestionConfig<S, C>,
    inner: &RefCell<PopupInner<C>>,
    event: &mut KeyEvent,
) {
    // The borrow ends before any caller code runs: committing calls the insertion
    // operation, which may unmount this very popup.
    let (transition, candidate) = {
        let mut inner = inner.borrow_mut();
        let transition = handle_key(inner.state, event.key, inner.filtered.len());
        inner.state = transition.state;
        let candidate = match transition.effect {
            Some(PopupEffect::Commit { index }) => inner.resolve(index),
            _ => None,
        };
        if transition.effect.is_some() {
            inner.release_flag(&config.services().suggestions);
        }
        (transition, candidate)
    };

    tracing::trace!(
        target: "mention_core::popup",
        key = ?event.key,
        active = ?transition.state.active_index,
        visible = transition.state.visible,
        "suggestion key"
    );

    if transition.prevent_default {
        event.prevent_default();
    }

    match transition.effect {
        Some(PopupEffect::Closed) => {
            tracing::debug!(target: "mention_core::popup", "suggestion dropdown cancelled");
        }
        Some(PopupEffect::Commit { .. }) => commit(config, candidate),
        None => {}
    }
}

fn commit<S, C: Candidate + Clone>(config: &SuggestionConfig<S, C>, candidate: Option<C>) {
    let Some(candidate) = candidate else {
        tracing::debug!(target: "mention_core::popup", "commit resolved no candidate");
        return;
    };
    let Some(state) = config.editor_state() else {
        tracing::debug!(target: "mention_core::popup", "commit without editor state");
        return;
    };

    tracing::debug!(
        target: "mention_core::popup",
        text = candidate.text(),
        "committing mention"
    );
    config.insert_mention(state, &candidate);
}
