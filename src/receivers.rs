pub mod lip_sync;

use crate::model::MorphChannels;

/// A source of per-frame morph channel updates.
///
/// Ticks read-modify-write the channels, so a receiver must never be ticked from more
/// than one place at a time. Taking `&mut` for both the receiver and the channels
/// enforces that.
pub trait Receiver {
    /// What playback is started from.
    type Input;
    /// What a single tick produced.
    type Output;

    /// Start playing `input`, replacing anything already playing.
    ///
    /// # Return
    /// Whether playback started.
    fn start(&mut self, input: Self::Input) -> bool;

    /// Advance one animation frame.
    fn tick(&mut self, channels: &mut MorphChannels) -> Self::Output;

    /// Stop immediately and snap `channels` back to their neutral baseline.
    ///
    /// Must be safe to call repeatedly.
    fn stop(&mut self, channels: &mut MorphChannels);

    fn is_running(&self) -> bool;
}
