/// A single game-state change as produced by the memory watcher.
///
/// The watcher streams `(address, value)` pairs: the address is the memory
/// location that changed (8 uppercase hex digits) and the value is the new
/// 32-bit word at that location, also as hex. Interpretation of the value
/// (integer, float bits, enum id) is up to [`StateManager`].
///
/// [`StateManager`]: crate::StateManager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub address: String,
    pub value: String,
}

impl RawEvent {
    #[must_use]
    pub fn new(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            value: value.into(),
        }
    }
}
