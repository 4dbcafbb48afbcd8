//! Render projection of a popup.
//!
//! Hosts render from a [`SuggestionView`] instead of poking at controller state: it carries
//! the class lists, the active row, the disabled flag for an empty list, the computed position
//! and the ARIA attributes of the wrapper.

use crate::candidate::Candidate;
use crate::config::SuggestionOptions;
use crate::layout::DropdownPosition;
use crate::popup::PopupState;

/// Class of the span wrapping the decorated trigger text.
pub const WRAPPER_CLASS: &str = "mention-suggestion-wrapper";
/// Class of the dropdown.
pub const DROPDOWN_CLASS: &str = "mention-suggestion-dropdown";
/// Added to the dropdown when no candidate matches.
pub const DISABLED_CLASS: &str = "mention-suggestion-disabled";
/// Class of every option.
pub const OPTION_CLASS: &str = "mention-suggestion-option";
/// Added to the active option.
pub const OPTION_ACTIVE_CLASS: &str = "mention-suggestion-option-active";
/// `aria-label` of the wrapper.
pub const ARIA_LABEL: &str = "mention-suggestion-popup";

/// One dropdown row.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    /// Position in the filtered list.
    pub index: usize,
    /// Display text.
    pub text: String,
    /// Whether this row is highlighted.
    pub active: bool,
    /// Class list.
    pub class_names: Vec<String>,
}

/// The dropdown while it is showing.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownView {
    /// Class list.
    pub class_names: Vec<String>,
    /// No candidate matches the query.
    pub disabled: bool,
    /// Anchoring.
    pub position: DropdownPosition,
    /// Rows, in filtered order.
    pub options: Vec<OptionView>,
}

impl DropdownView {
    /// The highlighted row, if any.
    pub fn active_option(&self) -> Option<&OptionView> {
        self.options.iter().find(|option| option.active)
    }
}

/// Everything a host needs to draw one decorated trigger span.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionView {
    /// Class of the wrapping span.
    pub wrapper_class: &'static str,
    /// `aria-haspopup`.
    pub aria_haspopup: bool,
    /// `aria-label`.
    pub aria_label: &'static str,
    /// The decorated text (the query).
    pub query: String,
    /// The dropdown, `None` while closed.
    pub dropdown: Option<DropdownView>,
}

/// Join a class list into a single attribute value.
pub fn class_attr(class_names: &[String]) -> String {
    class_names.join(" ")
}

pub(crate) fn build_view<C: Candidate>(
    query: &str,
    state: &PopupState,
    filtered: &[C],
    options: &SuggestionOptions,
) -> SuggestionView {
    let dropdown = state.visible.then(|| {
        let disabled = filtered.is_empty();
        let mut class_names = vec![DROPDOWN_CLASS.to_string()];
        class_names.extend(options.dropdown_class_name.iter().cloned());
        if disabled {
            class_names.push(DISABLED_CLASS.to_string());
        }

        let rows = filtered
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let active = state.active_index == Some(index);
                let mut class_names = vec![OPTION_CLASS.to_string()];
                class_names.extend(options.option_class_name.iter().cloned());
                if active {
                    class_names.push(OPTION_ACTIVE_CLASS.to_string());
                }
                OptionView {
                    index,
                    text: candidate.text().to_string(),
                    active,
                    class_names,
                }
            })
            .collect();

        DropdownView {
            class_names,
            disabled,
            position: state.position,
            options: rows,
        }
    });

    SuggestionView {
        wrapper_class: WRAPPER_CLASS,
        aria_haspopup: true,
        aria_label: ARIA_LABEL,
        query: query.to_string(),
        dropdown,
    }
}
