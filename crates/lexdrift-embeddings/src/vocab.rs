//! Insertion-ordered vocabulary with min-count filtering and a
//! unigram-distribution negative sampler.

use std::collections::HashMap;

use rand::Rng;

/// Vocabulary over one token sequence.
///
/// Word ids follow first-occurrence order of the retained words, which is
/// the tie-break order for neighbor ranking.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    ids: HashMap<String, usize>,
    counts: Vec<u64>,
}

impl Vocabulary {
    /// Build a vocabulary from tokens, dropping words with fewer than
    /// `min_count` occurrences.
    #[must_use]
    pub fn build(tokens: &[String], min_count: usize) -> Self {
        let mut order: Vec<&String> = Vec::new();
        let mut counts: HashMap<&String, u64> = HashMap::new();
        for token in tokens {
            let entry = counts.entry(token).or_insert(0);
            if *entry == 0 {
                order.push(token);
            }
            *entry += 1;
        }

        let floor = u64::try_from(min_count).unwrap_or(u64::MAX);
        let mut vocab = Self::default();
        for word in order {
            let count = counts[word];
            if count >= floor {
                let id = vocab.words.len();
                vocab.words.push(word.clone());
                let _ = vocab.ids.insert(word.clone(), id);
                vocab.counts.push(count);
            }
        }
        vocab
    }

    /// Id of a word, if retained.
    #[must_use]
    pub fn get(&self, word: &str) -> Option<usize> {
        self.ids.get(word).copied()
    }

    /// Whether the word is in the vocabulary.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    /// Word at the given id.
    #[must_use]
    pub fn word(&self, id: usize) -> &str {
        &self.words[id]
    }

    /// Occurrence count of the word at the given id.
    #[must_use]
    pub fn count(&self, id: usize) -> u64 {
        self.counts[id]
    }

    /// All words in insertion order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of retained words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Map a token stream to retained word ids, skipping dropped words.
    #[must_use]
    pub fn encode(&self, tokens: &[String]) -> Vec<usize> {
        tokens.iter().filter_map(|t| self.get(t)).collect()
    }

    /// Negative sampler over the smoothed unigram distribution.
    #[must_use]
    pub fn sampler(&self) -> NegativeSampler {
        NegativeSampler::new(&self.counts)
    }
}

/// Draws word ids proportional to `count^0.75`, the standard word2vec
/// smoothing of the unigram distribution.
#[derive(Clone, Debug)]
pub struct NegativeSampler {
    cumulative: Vec<f64>,
}

impl NegativeSampler {
    fn new(counts: &[u64]) -> Self {
        let mut cumulative = Vec::with_capacity(counts.len());
        let mut total = 0.0;
        for &count in counts {
            #[allow(clippy::cast_precision_loss)]
            let weight = (count as f64).powf(0.75);
            total += weight;
            cumulative.push(total);
        }
        Self { cumulative }
    }

    /// Sample one word id.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let total = *self.cumulative.last().expect("sampler over empty vocab");
        let target = rng.random_range(0.0..total);
        self.cumulative.partition_point(|&c| c <= target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    #[test]
    fn build_preserves_first_seen_order() {
        let vocab = Vocabulary::build(&tokens(&["b", "a", "b", "c", "a", "c"]), 1);
        assert_eq!(vocab.words(), &["b", "a", "c"]);
        assert_eq!(vocab.get("b"), Some(0));
        assert_eq!(vocab.get("a"), Some(1));
        assert_eq!(vocab.get("c"), Some(2));
    }

    #[test]
    fn min_count_drops_rare_words() {
        let vocab = Vocabulary::build(&tokens(&["a", "a", "b", "a", "c", "c"]), 2);
        assert_eq!(vocab.words(), &["a", "c"]);
        assert!(!vocab.contains("b"));
    }

    #[test]
    fn counts_tracked() {
        let vocab = Vocabulary::build(&tokens(&["a", "a", "b", "a"]), 1);
        assert_eq!(vocab.count(vocab.get("a").unwrap()), 3);
        assert_eq!(vocab.count(vocab.get("b").unwrap()), 1);
    }

    #[test]
    fn empty_tokens() {
        let vocab = Vocabulary::build(&[], 1);
        assert!(vocab.is_empty());
        assert_eq!(vocab.len(), 0);
    }

    #[test]
    fn encode_skips_dropped_words() {
        let vocab = Vocabulary::build(&tokens(&["a", "a", "b"]), 2);
        let ids = vocab.encode(&tokens(&["a", "b", "a", "z"]));
        assert_eq!(ids, vec![0, 0]);
    }

    #[test]
    fn sampler_only_returns_valid_ids() {
        let vocab = Vocabulary::build(&tokens(&["a", "a", "b", "c", "c", "c"]), 1);
        let sampler = vocab.sampler();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let id = sampler.sample(&mut rng);
            assert!(id < vocab.len());
        }
    }

    #[test]
    fn sampler_favors_frequent_words() {
        // "a" appears 30x, "b" once; a should dominate the draw
        let mut stream = vec!["a"; 30];
        stream.push("b");
        let vocab = Vocabulary::build(&tokens(&stream), 1);
        let sampler = vocab.sampler();
        let mut rng = StdRng::seed_from_u64(42);
        let a_id = vocab.get("a").unwrap();
        let a_draws = (0..1000)
            .filter(|_| sampler.sample(&mut rng) == a_id)
            .count();
        assert!(a_draws > 700, "expected a to dominate, got {a_draws}/1000");
    }

    #[test]
    fn sampler_is_deterministic_for_fixed_seed() {
        let vocab = Vocabulary::build(&tokens(&["a", "b", "c", "a", "b", "a"]), 1);
        let sampler = vocab.sampler();
        let draws = |seed: u64| -> Vec<usize> {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50).map(|_| sampler.sample(&mut rng)).collect()
        };
        assert_eq!(draws(3), draws(3));
    }
}
