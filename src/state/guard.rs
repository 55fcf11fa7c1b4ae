//! Submit-button guard state.
//!
//! One `ButtonGuard` per submit button. Engaging it on submit swaps the
//! label for a placeholder and disables the button; each submission arms
//! its own restore timer, and any restore puts the original label back.
//! The original label is captured once, so a second submission while the
//! placeholder is showing cannot make the placeholder permanent.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

/// What the DOM should display after a guard transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonFace {
    pub label: String,
    pub disabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonGuard {
    original: Option<String>,
}

impl ButtonGuard {
    /// Engage on submit. `current_label` is what the button shows now.
    pub fn engage(&mut self, current_label: &str, placeholder: &str) -> ButtonFace {
        if self.original.is_none() {
            self.original = Some(current_label.to_owned());
        }
        ButtonFace { label: placeholder.to_owned(), disabled: true }
    }

    /// Restore after the timeout. `None` if the button was already restored.
    pub fn release(&mut self) -> Option<ButtonFace> {
        self.original
            .take()
            .map(|label| ButtonFace { label, disabled: false })
    }
}
