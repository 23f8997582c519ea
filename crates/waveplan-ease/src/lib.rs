//! waveplan ease scoring: how hard is a tenant to migrate?
//!
//! Combines a tenant's footprint and risk inputs into one 0–100 score
//! (lower = easier) using an explicit weight table. The score feeds the
//! cohort packer's ordering and any caller that ranks or colour-codes
//! tenants.
//!
//! # Components
//!
//! - **`score`**: Per-dimension normalization, totals, labels, ranking

pub mod score;

pub use score::{
    EASY_BELOW, EaseLabel, EaseScore, MEDIUM_BELOW, compute_ease_score, dimension_points,
    rank_tenants, score_tenants,
};
