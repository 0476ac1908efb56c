//! URL handling module for Listing-Grep
//!
//! This module provides URL normalization (the dedup key for listing URLs)
//! and the filter that recognizes listing detail-page links.

mod listing;
mod normalize;

// Re-export main functions
pub use listing::ListingFilter;
pub use normalize::normalize_url;
