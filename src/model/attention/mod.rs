//! Attention mechanisms
mod attention;
pub use attention::{build_attention, Attention, AttentionConfig};

mod additive;
pub use additive::{additive_attention, AdditiveAttention};

mod multiplicative;
pub use multiplicative::{multiplicative_attention, MultiplicativeAttention};
