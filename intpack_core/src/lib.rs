pub mod bits;
pub mod codec;
pub mod delta;
pub mod error;

pub use bits::{BitReader, BitWriter};
pub use codec::{Codec, CodecStats, StatsSnapshot};
pub use delta::{atled, delta, DeltaDecoder, DeltaEncoder};
pub use error::{CodecError, Result};
