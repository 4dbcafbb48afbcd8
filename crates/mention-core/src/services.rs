//! Shared services a popup registers with while it is mounted.
//!
//! These are the process-wide coordination points of a rich-text editor, made explicit:
//!
//! - [`KeyDispatcher`] - fans editor key-downs out to registered handlers
//! - [`SuggestionFlag`] - "is a suggestion dropdown showing anywhere"
//! - [`ModalHandler`] - lets the editor force-close dropdowns and modals on outside clicks
//!
//! A host creates one [`PopupServices`] bundle per editor and hands clones of it to every
//! decorator. Each registration returns its own id, and removal is by that id, so any number
//! of popups can share the services without removing each other's callbacks.
//!
//! The services are single-threaded (`Rc`/`RefCell`): all calls happen on the UI thread,
//! one event at a time.

use crate::popup::KeyEvent;
use slotmap::{SlotMap, new_key_type};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

new_key_type! {
    /// Identifies one key handler registered with a [`KeyDispatcher`].
    pub struct SubscriptionId;

    /// Identifies one modal close callback registered with a [`ModalHandler`].
    pub struct ModalCallbackId;

    /// Identifies the suggestion close callback installed on a [`ModalHandler`].
    pub struct SuggestionCallbackId;
}

/// Key handler callback.
pub type KeyHandler = Rc<dyn Fn(&mut KeyEvent)>;

/// Parameterless callback used for close requests.
pub type CloseCallback = Rc<dyn Fn()>;

/// Registry of editor key-down handlers.
#[derive(Default)]
pub struct KeyDispatcher {
    handlers: RefCell<SlotMap<SubscriptionId, KeyHandler>>,
}

impl KeyDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; keep the id to deregister exactly this handler later.
    pub fn register<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&mut KeyEvent) + 'static,
    {
        let id = self.handlers.borrow_mut().insert(Rc::new(handler));
        tracing::trace!(target: "mention_core::services", ?id, "key handler registered");
        id
    }

    /// Register a handler that is deregistered when the returned guard drops.
    pub fn register_scoped<F>(self: &Rc<Self>, handler: F) -> KeySubscription
    where
        F: Fn(&mut KeyEvent) + 'static,
    {
        let id = self.register(handler);
        KeySubscription {
            dispatcher: Rc::downgrade(self),
            id,
        }
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn deregister(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.borrow_mut().remove(id).is_some();
        tracing::trace!(target: "mention_core::services", ?id, removed, "key handler deregistered");
        removed
    }

    /// Whether `id` is currently registered.
    pub fn is_registered(&self, id: SubscriptionId) -> bool {
        self.handlers.borrow().contains_key(id)
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Deliver `event` to every registered handler.
    ///
    /// Handlers may register or deregister (themselves or others) while the event is being
    /// delivered; a handler removed by an earlier one is skipped.
    pub fn dispatch(&self, event: &mut KeyEvent) {
        let snapshot: Vec<(SubscriptionId, KeyHandler)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, handler)| (id, Rc::clone(handler)))
            .collect();

        for (id, handler) in snapshot {
            if self.is_registered(id) {
                handler(event);
            }
        }
    }
}

/// RAII registration with a [`KeyDispatcher`].
///
/// Dropping the guard deregisters the handler, including during unwinding.
pub struct KeySubscription {
    dispatcher: Weak<KeyDispatcher>,
    id: SubscriptionId,
}

impl KeySubscription {
    /// The underlying subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher.deregister(self.id);
        }
    }
}

/// Whether a suggestion dropdown is currently showing.
///
/// Hosts consult this to hold back their own Enter / arrow-key handling while a dropdown is
/// open. Every showing dropdown holds one open; the flag reads open while any hold remains.
#[derive(Debug, Default)]
pub struct SuggestionFlag {
    open_count: Cell<usize>,
}

impl SuggestionFlag {
    /// Create a closed flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more dropdown as showing.
    pub fn open(&self) {
        self.open_count.set(self.open_count.get().saturating_add(1));
    }

    /// Record one dropdown as no longer showing.
    pub fn close(&self) {
        self.open_count.set(self.open_count.get().saturating_sub(1));
    }

    /// Whether any dropdown is showing.
    pub fn is_open(&self) -> bool {
        self.open_count.get() > 0
    }

    /// Number of dropdowns currently showing.
    pub fn open_count(&self) -> usize {
        self.open_count.get()
    }
}

/// Coordinates dropdowns and modals with clicks in the editor.
///
/// A click anywhere in the editor closes every registered modal and force-closes the
/// active suggestion dropdown, unless the click was first reported by the dropdown itself through
/// [`on_suggestion_click`](Self::on_suggestion_click).
#[derive(Default)]
pub struct ModalHandler {
    modal_callbacks: RefCell<SlotMap<ModalCallbackId, CloseCallback>>,
    suggestion_callbacks: RefCell<SlotMap<SuggestionCallbackId, CloseCallback>>,
    // Install order; the last entry is the active callback.
    suggestion_order: RefCell<Vec<SuggestionCallbackId>>,
    click_in_suggestion: Cell<bool>,
}

impl ModalHandler {
    /// Create a handler with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a modal close callback.
    pub fn register_modal_callback<F>(&self, callback: F) -> ModalCallbackId
    where
        F: Fn() + 'static,
    {
        self.modal_callbacks.borrow_mut().insert(Rc::new(callback))
    }

    /// Remove a modal close callback.
    pub fn deregister_modal_callback(&self, id: ModalCallbackId) -> bool {
        self.modal_callbacks.borrow_mut().remove(id).is_some()
    }

    /// Number of registered modal callbacks.
    pub fn modal_callback_count(&self) -> usize {
        self.modal_callbacks.borrow().len()
    }

    /// Invoke every modal close callback.
    pub fn close_modals(&self) {
        let snapshot: Vec<CloseCallback> =
            self.modal_callbacks.borrow().values().cloned().collect();
        for callback in snapshot {
            callback();
        }
    }

    /// Install the callback that force-closes the active suggestion dropdown.
    ///
    /// The most recently installed callback is the active one.
    pub fn set_suggestion_callback<F>(&self, callback: F) -> SuggestionCallbackId
    where
        F: Fn() + 'static,
    {
        let id = self
            .suggestion_callbacks
            .borrow_mut()
            .insert(Rc::new(callback));
        self.suggestion_order.borrow_mut().push(id);
        id
    }

    /// Remove the suggestion callback installed as `id`.
    ///
    /// Removing a callback that is not the active one leaves the active one in place. Removing
    /// the active one makes the most recently installed remaining callback active.
    pub fn remove_suggestion_callback(&self, id: SuggestionCallbackId) -> bool {
        let removed = self.suggestion_callbacks.borrow_mut().remove(id).is_some();
        let mut order = self.suggestion_order.borrow_mut();
        order.retain(|installed| *installed != id);
        removed
    }

    /// Number of installed suggestion callbacks.
    pub fn suggestion_callback_count(&self) -> usize {
        self.suggestion_callbacks.borrow().len()
    }

    /// Whether a suggestion callback is active.
    pub fn has_suggestion_callback(&self) -> bool {
        self.active_suggestion_callback().is_some()
    }

    /// Record that the current click started inside a suggestion dropdown.
    pub fn on_suggestion_click(&self) {
        self.click_in_suggestion.set(true);
    }

    /// Handle a click in the editor.
    pub fn on_editor_click(&self) {
        self.close_modals();
        if self.click_in_suggestion.replace(false) {
            return;
        }
        if let Some(callback) = self.active_suggestion_callback() {
            callback();
        }
    }

    fn active_suggestion_callback(&self) -> Option<CloseCallback> {
        let id = *self.suggestion_order.borrow().last()?;
        self.suggestion_callbacks.borrow().get(id).cloned()
    }
}

/// The services one editor shares among its mention popups.
#[derive(Clone, Default)]
pub struct PopupServices {
    /// Editor key-down fan-out.
    pub keys: Rc<KeyDispatcher>,
    /// "Suggestion showing" flag.
    pub suggestions: Rc<SuggestionFlag>,
    /// Outside-click coordination.
    pub modal: Rc<ModalHandler>,
}

impl PopupServices {
    /// Create a fresh set of services.
    pub fn new() -> Self {
        Self::default()
    }
}
