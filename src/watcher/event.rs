use serde::Serialize;

/// Whether the changed path still exists once the debounce window closes.
///
/// notify-debouncer-mini does not distinguish creation from modification, so
/// both surface as `Modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Modified,
    Removed,
}

/// A filesystem change whose path matched the watch pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The matched portion of the root-relative path, e.g. `tests/test_foo.py`.
    pub path: String,
    pub kind: ChangeKind,
}
