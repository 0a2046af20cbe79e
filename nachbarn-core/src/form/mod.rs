//! Add and Edit form controllers.
//!
//! Both follow the same shape: fields, validate, commit, then reset or keep.

pub mod add;
pub mod edit;

pub use add::{AddForm, AddOutcome, MISSING_ACTIVITY_WARNING};
pub use edit::{EditAction, EditForm, EditOutcome};
