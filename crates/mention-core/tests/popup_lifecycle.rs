use mention_core::{
    BlockDocument, DecoratorEvent, DropdownPosition, EditorState, Key, KeyEvent, MatchRegion,
    MentionCandidate, MentionSuggestion, PopupController, PopupServices, Rect, SuggestionConfig,
    SuggestionOptions,
};
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Mentions = MentionSuggestion<BlockDocument, MentionCandidate>;

fn people() -> Vec<MentionCandidate> {
    ["alice", "albert", "bob"]
        .into_iter()
        .map(MentionCandidate::new)
        .collect()
}

/// Replace `separator + query` before the caret with `separator + text + " "`.
fn splice_mention(
    mut state: BlockDocument,
    on_change: &dyn Fn(BlockDocument),
    separator: &str,
    candidate: &MentionCandidate,
) {
    let key = state.selection().focus_key.clone();
    let caret = state.selection().focus_offset;
    let prefix: String = state
        .block_for_key(&key)
        .map(|block| block.text().chars().take(caret).collect())
        .unwrap_or_default();
    let start = prefix
        .rfind(separator)
        .map(|byte| prefix[..byte].chars().count())
        .unwrap_or(0);
    let mention = format!("{separator}{} ", candidate.text);
    state.replace_range(&key, start..caret, &mention);
    on_change(state);
}

struct Fixture {
    doc: Rc<RefCell<BlockDocument>>,
    services: PopupServices,
    inserted: Rc<RefCell<Vec<String>>>,
}

impl Fixture {
    fn new(text: &str) -> Self {
        Self {
            doc: Rc::new(RefCell::new(BlockDocument::from_text(text))),
            services: PopupServices::new(),
            inserted: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn config_with(
        &self,
        options: SuggestionOptions,
        candidates: Vec<MentionCandidate>,
    ) -> SuggestionConfig<BlockDocument, MentionCandidate> {
        let doc_read = Rc::clone(&self.doc);
        let doc_write = Rc::clone(&self.doc);
        let inserted = Rc::clone(&self.inserted);
        SuggestionConfig::new(
            options,
            move || candidates.clone(),
            move || Some(doc_read.borrow().clone()),
            move |state| *doc_write.borrow_mut() = state,
            move |state: BlockDocument,
                  on_change: &dyn Fn(BlockDocument),
                  separator: &str,
                  candidate: &MentionCandidate| {
                inserted.borrow_mut().push(candidate.text.clone());
                splice_mention(state, on_change, separator, candidate);
            },
        )
        .expect("valid options")
        .with_services(self.services.clone())
    }

    fn mentions(&self) -> Mentions {
        MentionSuggestion::new(self.config_with(SuggestionOptions::default(), people()))
    }

    fn type_text(&self, text: &str) {
        self.doc.borrow_mut().insert_text(text);
    }

    fn press(&self, key: Key) -> KeyEvent {
        let mut event = KeyEvent::new(key);
        self.services.keys.dispatch(&mut event);
        event
    }

    fn inserted(&self) -> Vec<String> {
        self.inserted.borrow().clone()
    }

    fn assert_released(&self) {
        assert_eq!(self.services.keys.handler_count(), 0);
        assert_eq!(self.services.modal.suggestion_callback_count(), 0);
        assert!(!self.services.modal.has_suggestion_callback());
        assert!(!self.services.suggestions.is_open());
    }
}

fn names(items: &[MentionCandidate]) -> Vec<&str> {
    items.iter().map(|c| c.text.as_str()).collect()
}

#[test]
fn test_mount_filters_and_registers() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();

    assert_eq!(
        mentions.refresh(),
        DecoratorEvent::Mounted {
            block_key: "b0".into(),
            region: MatchRegion::new(7, 9),
        }
    );

    let popup = mentions.popup().expect("mounted");
    assert_eq!(names(&popup.filtered()), vec!["alice", "albert"]);
    assert_eq!(popup.active_index(), None);
    assert_eq!(popup.query(), "al");
    assert!(popup.is_visible());
    assert!(popup.is_active());

    assert_eq!(fixture.services.keys.handler_count(), 1);
    assert!(fixture.services.modal.has_suggestion_callback());
    assert!(fixture.services.suggestions.is_open());
}

#[test]
fn test_arrow_navigation_then_enter_inserts_once() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    fixture.press(Key::ArrowDown);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(0));
    fixture.press(Key::ArrowDown);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(1));
    fixture.press(Key::ArrowUp);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(0));
    fixture.press(Key::ArrowDown);
    assert_eq!(
        mentions.popup().unwrap().active_candidate().map(|c| c.text),
        Some("albert".to_string())
    );

    fixture.press(Key::Enter);
    assert_eq!(fixture.inserted(), vec!["albert"]);
    assert_eq!(fixture.doc.borrow().text(), "hello @albert ");
    assert!(!mentions.popup().unwrap().is_visible());
    assert!(!fixture.services.suggestions.is_open());

    // A closed popup ignores further keys.
    fixture.press(Key::Enter);
    assert_eq!(fixture.inserted(), vec!["albert"]);

    assert_eq!(mentions.refresh(), DecoratorEvent::Unmounted);
    fixture.assert_released();
}

#[test]
fn test_navigation_wraps_in_both_directions() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    fixture.press(Key::ArrowUp);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(1));
    fixture.press(Key::ArrowDown);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(0));
    fixture.press(Key::ArrowUp);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(1));
}

#[test]
fn test_only_arrow_down_prevents_default() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    assert!(fixture.press(Key::ArrowDown).is_default_prevented());
    assert!(!fixture.press(Key::ArrowUp).is_default_prevented());
    assert!(!fixture.press(Key::Other).is_default_prevented());
}

#[test]
fn test_escape_closes_and_typing_reopens() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();
    fixture.press(Key::ArrowDown);

    fixture.press(Key::Escape);
    let popup = mentions.popup().unwrap();
    assert!(!popup.is_visible());
    assert!(!fixture.services.suggestions.is_open());
    assert!(fixture.inserted().is_empty());

    fixture.type_text("i");
    assert_eq!(
        mentions.refresh(),
        DecoratorEvent::Updated {
            region: MatchRegion::new(7, 10)
        }
    );
    let popup = mentions.popup().unwrap();
    assert!(popup.is_visible());
    assert_eq!(popup.active_index(), None);
    assert_eq!(names(&popup.filtered()), vec!["alice"]);
    assert!(fixture.services.suggestions.is_open());
}

#[test]
fn test_enter_without_highlight_inserts_nothing() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    fixture.press(Key::Enter);
    assert!(fixture.inserted().is_empty());
    assert_eq!(fixture.doc.borrow().text(), "hello @al");
    assert!(!mentions.popup().unwrap().is_visible());
    assert!(!fixture.services.suggestions.is_open());
}

#[test]
fn test_narrowing_query_clamps_highlight() {
    let fixture = Fixture::new("hey @a");
    let mut mentions = fixture.mentions();
    mentions.refresh();
    let filtered = mentions.popup().unwrap().filtered();
    assert_eq!(names(&filtered), vec!["alice", "albert"]);

    fixture.press(Key::ArrowDown);
    fixture.press(Key::ArrowDown);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(1));

    fixture.type_text("li");
    mentions.refresh();
    let popup = mentions.popup().unwrap();
    assert_eq!(names(&popup.filtered()), vec!["alice"]);
    assert_eq!(popup.active_index(), Some(0));
}

#[test]
fn test_unchanged_refresh_keeps_state() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();
    fixture.press(Key::ArrowDown);

    assert_eq!(mentions.refresh(), DecoratorEvent::Unchanged);
    assert_eq!(mentions.popup().unwrap().active_index(), Some(0));
}

#[test]
fn test_case_sensitive_filter_shows_disabled_dropdown() {
    let fixture = Fixture::new("hello @AL");
    let options = SuggestionOptions {
        case_sensitive: true,
        ..SuggestionOptions::default()
    };
    let mut mentions = MentionSuggestion::new(fixture.config_with(options, people()));

    // The scan gate ignores case, the dropdown filter does not.
    assert!(matches!(mentions.refresh(), DecoratorEvent::Mounted { .. }));
    let popup = mentions.popup().unwrap();
    assert!(popup.filtered().is_empty());

    let dropdown = popup.view().dropdown.expect("visible");
    assert!(dropdown.disabled);

    fixture.press(Key::ArrowDown);
    assert_eq!(popup.active_index(), None);
    fixture.press(Key::Enter);
    assert!(fixture.inserted().is_empty());
}

#[test]
fn test_repeated_mount_unmount_returns_to_baseline() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();

    for _ in 0..5 {
        assert!(matches!(mentions.refresh(), DecoratorEvent::Mounted { .. }));
        assert_eq!(fixture.services.keys.handler_count(), 1);
        assert_eq!(fixture.services.modal.suggestion_callback_count(), 1);
        assert!(mentions.unmount());
        fixture.assert_released();
    }
    assert!(!mentions.unmount());
}

#[test]
fn test_query_without_matches_unmounts() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();
    fixture.press(Key::ArrowDown);

    fixture.type_text(" zz");
    assert_eq!(mentions.refresh(), DecoratorEvent::Unmounted);
    fixture.assert_released();
    assert_eq!(mentions.refresh(), DecoratorEvent::Unchanged);
}

#[test]
fn test_new_span_replaces_old_popup() {
    let fixture = Fixture::new("hi @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    fixture.type_text(" and @bo");
    assert_eq!(
        mentions.refresh(),
        DecoratorEvent::Mounted {
            block_key: "b0".into(),
            region: MatchRegion::new(12, 14),
        }
    );
    assert_eq!(fixture.services.keys.handler_count(), 1);
    assert_eq!(fixture.services.modal.suggestion_callback_count(), 1);
    assert_eq!(names(&mentions.popup().unwrap().filtered()), vec!["bob"]);

    fixture.press(Key::ArrowDown);
    fixture.press(Key::Enter);
    assert_eq!(fixture.inserted(), vec!["bob"]);
    assert_eq!(fixture.doc.borrow().text(), "hi @al and @bob ");
}

#[test]
fn test_dropping_decorator_releases_registrations() {
    let fixture = Fixture::new("hello @al");
    {
        let mut mentions = fixture.mentions();
        mentions.refresh();
        assert!(fixture.services.suggestions.is_open());
    }
    fixture.assert_released();
}

#[test]
fn test_commit_that_unmounts_its_popup() {
    let fixture = Fixture::new("hello @al");
    let slot: Rc<RefCell<Option<Mentions>>> = Rc::new(RefCell::new(None));

    let config = {
        let doc_read = Rc::clone(&fixture.doc);
        let doc_write = Rc::clone(&fixture.doc);
        let inserted = Rc::clone(&fixture.inserted);
        let slot = Rc::downgrade(&slot);
        SuggestionConfig::new(
            SuggestionOptions::default(),
            people,
            move || Some(doc_read.borrow().clone()),
            move |state| *doc_write.borrow_mut() = state,
            move |state: BlockDocument,
                  on_change: &dyn Fn(BlockDocument),
                  separator: &str,
                  candidate: &MentionCandidate| {
                inserted.borrow_mut().push(candidate.text.clone());
                splice_mention(state, on_change, separator, candidate);
                // The host re-decorates right away, which drops the committing popup.
                if let Some(slot) = slot.upgrade() {
                    if let Some(mentions) = slot.borrow_mut().as_mut() {
                        mentions.refresh();
                    }
                }
            },
        )
        .unwrap()
        .with_services(fixture.services.clone())
    };

    let mut mentions = MentionSuggestion::new(config);
    mentions.refresh();
    *slot.borrow_mut() = Some(mentions);

    fixture.press(Key::ArrowDown);
    fixture.press(Key::Enter);

    assert_eq!(fixture.inserted(), vec!["alice"]);
    assert_eq!(fixture.doc.borrow().text(), "hello @alice ");
    assert!(slot.borrow().as_ref().unwrap().popup().is_none());
    fixture.assert_released();
}

#[test]
fn test_editor_click_force_closes() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    let modal_closed = Rc::new(Cell::new(0));
    {
        let modal_closed = Rc::clone(&modal_closed);
        fixture
            .services
            .modal
            .register_modal_callback(move || modal_closed.set(modal_closed.get() + 1));
    }

    fixture.services.modal.on_editor_click();
    assert_eq!(modal_closed.get(), 1);
    assert!(!mentions.popup().unwrap().is_visible());
    assert!(!fixture.services.suggestions.is_open());
}

#[test]
fn test_click_inside_dropdown_is_not_outside_click() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();

    mentions.popup().unwrap().on_dropdown_click();
    fixture.services.modal.on_editor_click();
    assert!(mentions.popup().unwrap().is_visible());

    fixture.services.modal.on_editor_click();
    assert!(!mentions.popup().unwrap().is_visible());
}

#[test]
fn test_popups_sharing_services_release_independently() {
    let fixture = Fixture::new("hello @al");
    let config = Rc::new(fixture.config_with(SuggestionOptions::default(), people()));
    let first = PopupController::activate(Rc::clone(&config), "al");
    let second = PopupController::activate(Rc::clone(&config), "al");
    assert_eq!(fixture.services.suggestions.open_count(), 2);

    second.deactivate();
    assert!(first.is_visible());
    assert!(fixture.services.suggestions.is_open());
    assert!(fixture.services.modal.has_suggestion_callback());

    fixture.services.modal.on_editor_click();
    assert!(!first.is_visible());
    assert!(!fixture.services.suggestions.is_open());

    // Closing twice, or closing then dropping, gives the hold back only once.
    let third = PopupController::activate(Rc::clone(&config), "al");
    first.on_query_changed("ali");
    assert_eq!(fixture.services.suggestions.open_count(), 2);
    third.handle_key_event(&mut KeyEvent::new(Key::Escape));
    third.close();
    assert_eq!(fixture.services.suggestions.open_count(), 1);
    drop(third);
    assert!(first.is_visible());
    assert!(fixture.services.suggestions.is_open());

    drop(first);
    fixture.assert_released();
}

#[test]
fn test_pointer_hover_and_click() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();
    let popup = mentions.popup().unwrap();

    popup.on_option_mouse_enter(1);
    assert_eq!(popup.active_index(), Some(1));
    popup.on_option_mouse_enter(7);
    assert_eq!(popup.active_index(), Some(1));
    popup.on_option_mouse_leave();
    assert_eq!(popup.active_index(), None);

    popup.on_option_click(0);
    assert_eq!(fixture.inserted(), vec!["alice"]);
    assert!(!popup.is_visible());
    assert!(!fixture.services.suggestions.is_open());

    popup.on_option_click(1);
    assert_eq!(fixture.inserted(), vec!["alice"]);
}

#[test]
fn test_layout_is_applied_once() {
    let fixture = Fixture::new("hello @al");
    let config = Rc::new(
        fixture
            .config_with(SuggestionOptions::default(), people())
            .with_wrapper_rect(|| Some(Rect::new(0.0, 0.0, 100.0, 50.0))),
    );
    let popup = PopupController::activate(config, "al");
    assert_eq!(popup.state().position, DropdownPosition::default());

    let trigger = Rect::new(90.0, 10.0, 10.0, 1.0);
    let dropdown = Rect::new(90.0, 11.0, 30.0, 60.0);
    assert!(popup.apply_layout(trigger, dropdown));
    assert_eq!(
        popup.state().position,
        DropdownPosition {
            left: None,
            right: Some(15.0),
            bottom: Some(0.0),
        }
    );

    assert!(!popup.apply_layout(Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(0.0, 1.0, 1.0, 1.0)));
    assert_eq!(popup.state().position.right, Some(15.0));
}

#[test]
fn test_layout_needs_measurable_editor() {
    let fixture = Fixture::new("hello @al");
    let config = Rc::new(fixture.config_with(SuggestionOptions::default(), people()));
    let popup = PopupController::activate(config, "al");

    let trigger = Rect::new(90.0, 10.0, 10.0, 1.0);
    let dropdown = Rect::new(90.0, 11.0, 30.0, 60.0);
    assert!(!popup.apply_layout(trigger, dropdown));
    assert_eq!(popup.state().position, DropdownPosition::default());
}

#[test]
fn test_commit_without_editor_state_skips_insert() {
    let services = PopupServices::new();
    let inserted = Rc::new(Cell::new(0));
    let config = {
        let inserted = Rc::clone(&inserted);
        SuggestionConfig::new(
            SuggestionOptions::default(),
            people,
            || None::<BlockDocument>,
            |_| {},
            move |_: BlockDocument, _: &dyn Fn(BlockDocument), _: &str, _: &MentionCandidate| {
                inserted.set(inserted.get() + 1)
            },
        )
        .unwrap()
        .with_services(services.clone())
    };

    let popup = PopupController::activate(Rc::new(config), "al");
    let mut down = KeyEvent::new(Key::ArrowDown);
    popup.handle_key_event(&mut down);
    let mut enter = KeyEvent::new(Key::Enter);
    popup.handle_key_event(&mut enter);

    assert_eq!(inserted.get(), 0);
    assert!(!popup.is_visible());
    assert!(!services.suggestions.is_open());

    popup.deactivate();
    assert_eq!(services.keys.handler_count(), 0);
}

#[test]
fn test_view_tracks_highlight() {
    let fixture = Fixture::new("hello @al");
    let mut mentions = fixture.mentions();
    mentions.refresh();
    fixture.press(Key::ArrowDown);

    let view = mentions.popup().unwrap().view();
    assert_eq!(view.query, "al");
    assert!(view.aria_haspopup);
    let dropdown = view.dropdown.expect("visible");
    assert!(!dropdown.disabled);
    assert_eq!(dropdown.options.len(), 2);
    assert_eq!(
        dropdown.active_option().map(|o| o.text.as_str()),
        Some("alice")
    );

    fixture.press(Key::Escape);
    assert_eq!(mentions.popup().unwrap().view().dropdown, None);
}

#[test]
fn test_insertion_receives_candidate_payload() {
    let fixture = Fixture::new("ping @bo");
    let seen = Rc::new(RefCell::new(None));
    let url = "https://example.org/bob";
    let candidates = vec![MentionCandidate::new("bob").with_field("url", url)];
    let config = {
        let doc = Rc::clone(&fixture.doc);
        let seen = Rc::clone(&seen);
        SuggestionConfig::new(
            SuggestionOptions::default(),
            move || candidates.clone(),
            move || Some(doc.borrow().clone()),
            |_| {},
            move |_: BlockDocument,
                  _: &dyn Fn(BlockDocument),
                  _: &str,
                  candidate: &MentionCandidate| {
                *seen.borrow_mut() = Some(candidate.clone());
            },
        )
        .unwrap()
        .with_services(fixture.services.clone())
    };

    let mut mentions = MentionSuggestion::new(config);
    mentions.refresh();
    fixture.press(Key::ArrowDown);
    fixture.press(Key::Enter);

    let seen = seen.borrow();
    let candidate = seen.as_ref().expect("inserted");
    assert_eq!(candidate.text, "bob");
    assert_eq!(
        candidate.field("url").and_then(|v| v.as_str()),
        Some("https://example.org/bob")
    );
}
