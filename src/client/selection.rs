//! Pure decisions behind shuffling: duplicate detection, random reselection,
//! the quote of the day and id assignment.

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::quote::Quote;

/// What to do with a freshly generated quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleDecision {
    /// The candidate is new and should be appended.
    Append,
    /// The candidate is already known; show this existing index instead.
    /// `None` means there is nothing else to show.
    Reselect(Option<usize>),
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True if `candidate` matches a known quote's Latin text, ignoring
/// surrounding whitespace and case.
pub fn is_duplicate(quotes: &[Quote], candidate: &str) -> bool {
    let candidate = normalize(candidate);
    quotes.iter().any(|quote| normalize(&quote.data.latin) == candidate)
}

/// Uniformly picks an index other than `current`. With a single quote there
/// is no other choice and `None` is returned.
pub fn pick_other_index<R: Rng + ?Sized>(len: usize, current: Option<usize>, rng: &mut R) -> Option<usize> {
    (0..len).filter(|&i| Some(i) != current).choose(rng)
}

pub fn decide<R: Rng + ?Sized>(
    quotes: &[Quote],
    current: Option<usize>,
    candidate: &str,
    rng: &mut R,
) -> ShuffleDecision {
    if is_duplicate(quotes, candidate) {
        ShuffleDecision::Reselect(pick_other_index(quotes.len(), current, rng))
    } else {
        ShuffleDecision::Append
    }
}

/// Index of the quote shown on first load. `day_of_year` is 1-based.
///
/// Always taken modulo the seed list length, never the live collection, so
/// the daily pick is stable and lands inside the seed set.
pub fn quote_of_the_day(day_of_year: u32, seed_len: usize) -> usize {
    if seed_len == 0 {
        return 0;
    }
    day_of_year as usize % seed_len
}

/// Timestamp-based id, bumped past any collision with a known id.
pub fn fresh_id(quotes: &[Quote], now_millis: u64) -> u64 {
    let mut id = now_millis;
    while quotes.iter().any(|quote| quote.id == id) {
        id += 1;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{seed_quotes, QuoteData};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn quote(id: u64, latin: &str) -> Quote {
        Quote::new(id, QuoteData { latin: latin.into(), ..Default::default() })
    }

    #[test]
    fn duplicates_ignore_case_and_whitespace() {
        let quotes = vec![quote(1, "Alea iacta est.")];
        assert!(is_duplicate(&quotes, "  alea IACTA est.\n"));
        assert!(!is_duplicate(&quotes, "Alea iacta est"));
        assert!(!is_duplicate(&[], "Alea iacta est."));
    }

    #[test]
    fn reselection_never_returns_the_current_quote() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let picked = pick_other_index(5, Some(2), &mut rng).unwrap();
            assert_ne!(picked, 2);
            assert!(picked < 5);
            seen.insert(picked);
        }
        assert_eq!(seen, HashSet::from([0, 1, 3, 4]));
    }

    #[test]
    fn single_quote_has_nothing_to_reselect() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_other_index(1, Some(0), &mut rng), None);
        assert_eq!(pick_other_index(0, None, &mut rng), None);
        assert_eq!(pick_other_index(1, None, &mut rng), Some(0));
    }

    #[test]
    fn duplicate_candidate_reselects_an_existing_quote() {
        let quotes = vec![quote(1, "Alea iacta est."), quote(2, "Veni, vidi, vici.")];
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(
            decide(&quotes, Some(0), "ALEA IACTA EST.", &mut rng),
            ShuffleDecision::Reselect(Some(1))
        );
        assert_eq!(decide(&quotes, Some(0), "Carpe diem.", &mut rng), ShuffleDecision::Append);
    }

    #[test]
    fn quote_of_the_day_is_day_modulo_seed_length() {
        let n = seed_quotes().len();
        for day in 1..=365 {
            assert_eq!(quote_of_the_day(day, n), day as usize % n);
        }
        assert_eq!(quote_of_the_day(1, 5), 1);
        assert_eq!(quote_of_the_day(365, 5), 0);
        assert_eq!(quote_of_the_day(12, 0), 0);
    }

    #[test]
    fn fresh_ids_skip_taken_values() {
        let quotes = vec![quote(1_000, "a"), quote(1_001, "b")];
        assert_eq!(fresh_id(&quotes, 1_000), 1_002);
        assert_eq!(fresh_id(&quotes, 5_000), 5_000);
    }
}
