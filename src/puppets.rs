pub mod puppet_3d;

use std::fmt::Display;

use crate::{
    model::MorphChannels,
    receivers::{lip_sync::Tick, Receiver},
    Logger,
};

#[derive(Debug)]
pub enum Error {
    /// The model description could not be read.
    Io(std::io::Error),
    /// The model description was not valid JSON or had the wrong shape.
    Parse(serde_json::Error),
    /// A mesh lists the same blend shape more than once.
    DuplicateBlendShape { mesh: String, name: String },
    /// A blend shape baseline was NaN or infinite.
    InvalidBaseline { name: String, value: f32 },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Unable to read model: {e}"),
            Self::Parse(e) => write!(f, "Unable to parse model: {e}"),
            Self::DuplicateBlendShape { mesh, name } => {
                write!(f, "Mesh {mesh} lists blend shape {name} more than once")
            }
            Self::InvalidBaseline { name, value } => {
                write!(f, "Blend shape {name} has an invalid baseline: {value}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Something with morph channels that animation sources can drive.
///
/// NOTE: this isn't _really_ a visitor since the puppet just hands its channels to
/// the receiver, but it's close enough.
pub trait Puppet {
    fn logger(&self) -> &Logger;

    fn channels(&self) -> &MorphChannels;

    fn channels_mut(&mut self) -> &mut MorphChannels;

    /// Advance lip sync by one frame.
    fn visit_lip_sync<R>(&mut self, receiver: &mut R) -> Tick
    where
        R: Receiver<Output = Tick>,
    {
        receiver.tick(self.channels_mut())
    }

    /// Cancel lip sync, leaving the mouth neutral.
    fn stop_lip_sync<R>(&mut self, receiver: &mut R)
    where
        R: Receiver<Output = Tick>,
    {
        if receiver.is_running() {
            self.logger().debug("Cancelling lip sync");
        }
        receiver.stop(self.channels_mut());
    }
}
