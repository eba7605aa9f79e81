/// Trigger resolver
///
/// Pure lookup of trigger names against a catalog snapshot.
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{SoundAsset, SoundCatalog, AMBIENT_PREFIX};

const LOG_TARGET: &str = "darts_sound_fx::resolver";

/// Chain tried for `m<n>` triggers, in order
const MISS_CHAIN: [&str; 4] = ["ambient_miss", "ambient_outside", "miss", "outside"];
const OUTSIDE: [&str; 2] = ["ambient_outside", "outside"];

/// Sounds that matched one lookup step
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTier<'a> {
    /// The trigger name(s) that produced the match
    pub matched: String,
    pub candidates: Vec<&'a SoundAsset>,
}

impl<'a> CandidateTier<'a> {
    fn new(names: &[&str], candidates: Vec<&'a SoundAsset>) -> Self {
        Self {
            matched: names.join("|"),
            candidates,
        }
    }

    /// Candidate names, in catalog order
    pub fn names(&self) -> Vec<&'a str> {
        self.candidates.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Ordered tiers to enqueue for a trigger
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution<'a> {
    tiers: Vec<CandidateTier<'a>>,
}

impl<'a> Resolution<'a> {
    fn empty() -> Self {
        Self { tiers: Vec::new() }
    }

    fn single(names: &[&str], candidates: Vec<&'a SoundAsset>) -> Self {
        Self {
            tiers: vec![CandidateTier::new(names, candidates)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn tiers(&self) -> &[CandidateTier<'a>] {
        &self.tiers
    }

    pub fn into_tiers(self) -> Vec<CandidateTier<'a>> {
        self.tiers
    }
}

/// Enabled sounds responding to any of `names`, in catalog order
fn find<'a>(catalog: &'a SoundCatalog, names: &[&str]) -> Vec<&'a SoundAsset> {
    catalog
        .iter()
        .filter(|sound| names.iter().any(|name| sound.responds_to(name)))
        .collect()
}

fn is_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a trigger against the catalog
pub fn resolve<'a>(trigger: &str, catalog: &'a SoundCatalog) -> Resolution<'a> {
    let direct = find(catalog, &[trigger]);
    if !direct.is_empty() {
        return Resolution::single(&[trigger], direct);
    }

    let stripped = trigger.strip_prefix(AMBIENT_PREFIX);
    if let Some(bare) = stripped {
        tracing::debug!(target: LOG_TARGET, "Trying fallback sound for \"{}\" -> \"{}\"", trigger, bare);
        let matched = find(catalog, &[bare]);
        if !matched.is_empty() {
            return Resolution::single(&[bare], matched);
        }
    }

    if trigger.chars().count() > 1 {
        if let Some(resolution) = structural_fallback(trigger, stripped, catalog) {
            return resolution;
        }
    }

    if trigger.to_lowercase() == "ambient_miss" {
        let matched = find(catalog, &OUTSIDE);
        if !matched.is_empty() {
            tracing::debug!(target: LOG_TARGET, "Using fallback sound for \"ambient_miss\" -> outside");
            return Resolution::single(&OUTSIDE, matched);
        }
    }

    tracing::debug!(target: LOG_TARGET, "No sound found for trigger \"{}\"", trigger);
    Resolution::empty()
}

/// Fallbacks keyed on the first character of the unprefixed trigger
fn structural_fallback<'a>(
    trigger: &str,
    stripped: Option<&str>,
    catalog: &'a SoundCatalog,
) -> Option<Resolution<'a>> {
    let base = stripped.unwrap_or(trigger);
    let first = base.chars().next()?;
    let rest = &base[first.len_utf8()..];

    match first.to_ascii_lowercase() {
        // Combined throws ("m5_s20_t1") contain '_' and never fall back
        'm' if !base.contains('_') => {
            if is_number(rest) {
                MISS_CHAIN.iter().find_map(|&name| {
                    let matched = find(catalog, &[name]);
                    (!matched.is_empty()).then(|| Resolution::single(&[name], matched))
                })
            } else {
                let matched = find(catalog, &OUTSIDE);
                (!matched.is_empty()).then(|| Resolution::single(&OUTSIDE, matched))
            }
        }
        first @ ('d' | 't') if is_number(rest) => {
            let word = if first == 'd' { "double" } else { "triple" };
            let ambient_word = format!("{AMBIENT_PREFIX}{word}");
            let ambient_number = format!("{AMBIENT_PREFIX}{rest}");
            let word_names = [ambient_word.as_str(), word];
            let number_names = [ambient_number.as_str(), rest];

            let words = find(catalog, &word_names);
            let numbers = find(catalog, &number_names);

            if words.is_empty() {
                return (!numbers.is_empty()).then(|| Resolution::single(&number_names, numbers));
            }

            tracing::debug!(
                target: LOG_TARGET,
                "Using \"{}\" for \"{}\", number follows: {}",
                word,
                trigger,
                !numbers.is_empty()
            );
            let mut tiers = vec![CandidateTier::new(&word_names, words)];
            if !numbers.is_empty() {
                tiers.push(CandidateTier::new(&number_names, numbers));
            }
            Some(Resolution { tiers })
        }
        's' if is_number(rest) => {
            let literal = format!("s{rest}");
            let already_tried = literal == trigger || stripped == Some(literal.as_str());

            if !already_tried {
                let matched = find(catalog, &[literal.as_str()]);
                if !matched.is_empty() {
                    return Some(Resolution::single(&[literal.as_str()], matched));
                }
            }

            let ambient_number = format!("{AMBIENT_PREFIX}{rest}");
            let number_names = [ambient_number.as_str(), rest];
            let numbers = find(catalog, &number_names);
            (!numbers.is_empty()).then(|| Resolution::single(&number_names, numbers))
        }
        _ => None,
    }
}

/// Pick one candidate uniformly at random
pub fn pick<'a, R: Rng + ?Sized>(tier: &CandidateTier<'a>, rng: &mut R) -> Option<&'a SoundAsset> {
    tier.candidates.choose(rng).copied()
}

/// Whether some enabled sound lists the trigger, with or without prefix
pub fn catalog_responds_to(catalog: &SoundCatalog, trigger: &str) -> bool {
    let bare = trigger.strip_prefix(AMBIENT_PREFIX).unwrap_or(trigger);
    catalog
        .iter()
        .any(|sound| sound.responds_to(trigger) || sound.responds_to(bare))
}
