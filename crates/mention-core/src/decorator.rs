//! The mention decorator: trigger scanning bound to a popup lifecycle.
//!
//! A host editor calls [`MentionSuggestion::refresh`] after every text or selection change.
//! The decorator scans the focused block and keeps at most one [`PopupController`] mounted
//! for the detected trigger span:
//!
//! - a non-empty span appears: the popup is mounted with the span text as its query
//! - the span keeps its start but its text changes: the popup's query is updated
//! - the span moves to another start or block: the old popup is unmounted, a new one mounted
//! - the span disappears: the popup is unmounted
//!
//! Hosts that drive their own decoration pass can call
//! [`find_suggestion_entities`](MentionSuggestion::find_suggestion_entities) per block instead.

use crate::candidate::Candidate;
use crate::config::SuggestionConfig;
use crate::host::{BlockKey, ContentBlock, EditorState};
use crate::popup::PopupController;
use crate::scanner::{MatchRegion, find_match_region};
use std::rc::Rc;

/// What a [`refresh`](MentionSuggestion::refresh) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorEvent {
    /// A popup was mounted (possibly replacing one for a different span).
    Mounted {
        /// Block holding the span.
        block_key: BlockKey,
        /// The span.
        region: MatchRegion,
    },
    /// The mounted popup's query changed.
    Updated {
        /// The span.
        region: MatchRegion,
    },
    /// The popup was unmounted.
    Unmounted,
    /// Nothing changed.
    Unchanged,
}

struct MountedPopup<S: 'static, C: Candidate + Clone + 'static> {
    block_key: BlockKey,
    region: MatchRegion,
    query: String,
    controller: PopupController<S, C>,
}

/// Mention decorator for one editor.
pub struct MentionSuggestion<S: 'static, C: Candidate + Clone + 'static> {
    config: Rc<SuggestionConfig<S, C>>,
    mounted: Option<MountedPopup<S, C>>,
}

impl<S, C> MentionSuggestion<S, C>
where
    S: EditorState + 'static,
    C: Candidate + Clone + 'static,
{
    /// Capture `config` for the lifetime of the decorator.
    pub fn new(config: SuggestionConfig<S, C>) -> Self {
        Self {
            config: Rc::new(config),
            mounted: None,
        }
    }

    /// The captured configuration.
    pub fn config(&self) -> &SuggestionConfig<S, C> {
        &self.config
    }

    /// Decoration strategy for a single block.
    ///
    /// Returns the trigger span in `block`, or `None` when there is no live editor state, the
    /// caret is elsewhere, or no candidate could match.
    pub fn find_suggestion_entities(&self, block: &ContentBlock) -> Option<MatchRegion> {
        let state = self.config.editor_state()?;
        self.scan(&state, block)
    }

    /// Re-scan the live editor state and mount, update or unmount the popup.
    pub fn refresh(&mut self) -> DecoratorEvent {
        let found = self.config.editor_state().and_then(|state| {
            let block = state.focused_block()?;
            let region = self
                .scan(&state, block)
                .filter(|region| !region.is_empty())?;
            let query = region.text(block.text()).to_string();
            Some((block.key().clone(), region, query))
        });

        match (self.mounted.as_mut(), found) {
            (Some(mounted), Some((block_key, region, query)))
                if mounted.block_key == block_key && mounted.region.start == region.start =>
            {
                if mounted.region == region && mounted.query == query {
                    return DecoratorEvent::Unchanged;
                }
                mounted.region = region;
                mounted.controller.on_query_changed(&query);
                mounted.query = query;
                DecoratorEvent::Updated { region }
            }
            (_, Some((block_key, region, query))) => {
                // Release the old span's registrations before the new popup takes them.
                self.unmount();
                tracing::debug!(
                    target: "mention_core::decorator",
                    block = %block_key,
                    start = region.start,
                    end = region.end,
                    "trigger span detected"
                );
                let controller = PopupController::activate(Rc::clone(&self.config), &query);
                self.mounted = Some(MountedPopup {
                    block_key: block_key.clone(),
                    region,
                    query,
                    controller,
                });
                DecoratorEvent::Mounted { block_key, region }
            }
            (Some(_), None) => {
                self.unmount();
                DecoratorEvent::Unmounted
            }
            (None, None) => DecoratorEvent::Unchanged,
        }
    }

    /// Unmount the popup, if any. Returns whether one was mounted.
    pub fn unmount(&mut self) -> bool {
        match self.mounted.take() {
            Some(mounted) => {
                mounted.controller.deactivate();
                true
            }
            None => false,
        }
    }

    /// The mounted popup.
    pub fn popup(&self) -> Option<&PopupController<S, C>> {
        self.mounted.as_ref().map(|mounted| &mounted.controller)
    }

    /// Block and span of the mounted popup.
    pub fn mounted_region(&self) -> Option<(&BlockKey, MatchRegion)> {
        self.mounted
            .as_ref()
            .map(|mounted| (&mounted.block_key, mounted.region))
    }

    fn scan(&self, state: &S, block: &ContentBlock) -> Option<MatchRegion> {
        find_match_region(
            block,
            state.selection(),
            self.config.separator(),
            &self.config.suggestions(),
        )
    }
}
