use crate::fix::Fix;

/// Network path to the collector, as seen by the upload scheduler.
pub trait Transport {
    /// Whether the link is up right now. Called once per evaluation.
    fn is_available(&mut self) -> bool;

    /// Asks the link to re-establish itself. Must not block for long.
    fn reconnect(&mut self);

    /// Delivers one fix. Returns `true` only when the collector accepted it.
    ///
    /// Implementations must bound the time spent here, the control loop does not read
    /// serial data while a send is in flight.
    fn send(&mut self, fix: &Fix) -> bool;
}
