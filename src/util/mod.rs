//! Pure helpers shared by the widgets.

pub mod clock;
pub mod markup;
