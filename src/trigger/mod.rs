/// Trigger resolution
///
/// Maps a semantic trigger name (`ambient_t20`, `ambient_busted`, ...) to
/// the sounds that should play for it.
///
/// ## Fallback cascade
///
/// ```text
/// trigger ──> exact match
///         ──> without "ambient_"
///         ──> structural fallback (m<n>, d<n>/t<n>, s<n>)
///         ──> "ambient_miss" -> outside
///         ──> nothing (logged, no playback)
/// ```
///
/// A resolution is an ordered list of tiers. Each tier becomes one queued
/// sound; the sound inside a tier is picked uniformly at random.
pub mod resolver;

pub use resolver::{catalog_responds_to, pick, resolve, CandidateTier, Resolution};
