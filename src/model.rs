pub mod channels;
pub mod phoneme;
pub mod timeline;
pub mod viseme;

pub use channels::*;
pub use phoneme::*;
pub use timeline::*;
pub use viseme::*;
