pub mod model;
pub use model::{
    additive_attention, build_attention, multiplicative_attention, AdditiveAttention, Attention,
    AttentionConfig, ModelError, MultiplicativeAttention,
};

pub mod utils;
pub use utils::{softmax, ScoreFunction};
