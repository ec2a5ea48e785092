//! GPU side of the demo.
//!
//! One particle buffer is shared by two consumers: the compute pass writes it
//! as a storage array, then the billboard pass reads it as instance data. Both
//! passes are recorded into the same frame encoder, compute first, which
//! orders the writes before the reads.

mod billboard;
mod buffer;
mod compute;
mod texture;

pub use billboard::{BillboardRenderer, CameraUniform};
pub use buffer::ParticleBuffer;
pub use compute::{ComputePass, SimUniform};
pub use texture::SpriteTexture;
