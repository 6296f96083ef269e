//! Attention layers and their shared error type

mod attention;
mod error;

pub use attention::{
    additive_attention, build_attention, multiplicative_attention, AdditiveAttention, Attention,
    AttentionConfig, MultiplicativeAttention,
};
pub use error::ModelError;
