//! Protocol-specific enrichment flags for cleaned observation tables.

pub mod landcover;
pub mod mosquito;
