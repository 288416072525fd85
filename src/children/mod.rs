//! Child selection for the parent portal.

use crate::models::Student;

/// Pick the child a parent is looking at.
///
/// The remembered choice wins while it still names one of the children;
/// otherwise the first child is used. No children, no selection.
pub fn resolve_selection<'a>(children: &'a [Student], remembered: Option<&str>) -> Option<&'a Student> {
    remembered
        .and_then(|id| children.iter().find(|c| c.id == id))
        .or_else(|| children.first())
}
