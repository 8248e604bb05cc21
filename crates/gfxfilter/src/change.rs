//! Change notification types.
//!
//! Every mutation of a registered filter is recorded as a set of [`ChangeFlags`]
//! on the filter itself. When the module is not caching, the change is
//! delivered to listeners straight away; inside a `begin_change`/`end_change`
//! bracket changes accumulate and are delivered as a single [`ChangeMessage`]
//! once the outermost bracket closes.

use serde::Serialize;

use crate::filter::FilterKind;

bitflags::bitflags! {
    /// Kinds of change a filter can go through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags: u8 {
        /// Filter was added to the module.
        const ADD = 0b0000_0001;
        /// Filter was removed from the module.
        const REMOVE = 0b0000_0010;
        /// Filter was renamed.
        const IDENTIFIER = 0b0000_0100;
        /// Filter changed in a way that cannot change evaluation (e.g. managed flag).
        const NOT_RESULT = 0b0000_1000;
        /// Filter may now evaluate differently.
        const RESULT = 0b0001_0000;
        /// An operand of this composite changed its result.
        const DEPENDENCY = 0b0010_0000;
    }
}

impl ChangeFlags {
    /// True if evaluation through this filter may differ after the change.
    pub fn affects_result(&self) -> bool {
        self.intersects(ChangeFlags::RESULT | ChangeFlags::DEPENDENCY)
    }
}

impl Serialize for ChangeFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

/// The change one filter went through since the last delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChange {
    /// Name of the filter at delivery time (or at removal, for removed filters).
    pub name: String,
    pub kind: FilterKind,
    pub flags: ChangeFlags,
}

/// One batch of changes, delivered to every listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeMessage {
    pub changes: Vec<FilterChange>,
    /// Union of all per-filter flags.
    pub summary: ChangeFlags,
}

impl ChangeMessage {
    pub(crate) fn push(&mut self, change: FilterChange) {
        self.summary |= change.flags;
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Flags recorded for the filter called `name`, if it changed.
    pub fn change_for(&self, name: &str) -> Option<ChangeFlags> {
        self.changes
            .iter()
            .find(|change| change.name == name)
            .map(|change| change.flags)
    }
}

/// Handle returned when registering a listener; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);
