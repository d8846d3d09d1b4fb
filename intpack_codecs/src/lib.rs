mod bitstream;
mod block;
mod gamma;
mod identity;
mod pool;
mod pooled;
mod rice;

pub use bitstream::{BitCoder, BitStreamCodec};
pub use block::{BlockCompressor, Lz4BlockCompressor, ZstdBlockCompressor};
pub use gamma::{GammaCodec, GammaCoder};
pub use identity::IdentityCodec;
pub use pool::{CompressorPool, PoolConfig, PoolGuard};
pub use pooled::{FreshBlockCodec, PooledBlockCodec};
pub use rice::{RiceCodec, RiceCoder};
