//! Cross-module tests.
//!
//! - `scenarios.rs` - hand-built positions exercising selection, pins, checks,
//!   castling and en passant through `GameState`
//! - `properties.rs` - property-based tests over random playouts
