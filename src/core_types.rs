//! Core types used throughout the relay

/// Connection ID - unique within the process lifetime.
///
/// Allocated by the connection registry, starting at 1, never reused.
pub type ConnectionId = u64;

/// Sequence number stamped into every transaction id.
///
/// # Constraints:
/// - Starts at 0, first accepted transfer gets 1
/// - Incremented exactly once per accepted transfer
/// - Never reset while the process is running
pub type SeqNum = u64;
