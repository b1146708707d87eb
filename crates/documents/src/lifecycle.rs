//! Document status machines.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Status machine of a document kind.
///
/// Each document kind (quote, delivery note, purchase order, goods receipt,
/// invoice) implements this on its status enum; the generic document
/// aggregate consults it before every mutation. One independent machine per
/// kind; there are no shared states.
pub trait Lifecycle:
    Copy + Eq + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The state a freshly opened document starts in (its draft state).
    fn initial() -> Self;

    /// Whether a direct transition between two states is allowed.
    ///
    /// Self-transitions are never allowed.
    fn can_transition(self, to: Self) -> bool;

    /// Whether lines and header fields may still be changed.
    fn is_editable(self) -> bool;

    /// Whether the document may still be deleted.
    fn is_deletable(self) -> bool;

    /// Whether this is a terminal state (no outgoing transitions).
    fn is_terminal(self) -> bool;

    /// Stable lowercase label, used in error messages and logs.
    fn label(self) -> &'static str;
}
