
// imports
use std::collections::{HashMap, HashSet};


/// Scores observed authors against a fixed set of known authors.
///
/// Every observation receives the total number of times it occurs in the
/// observation list, as long as it is part of the reference set. Observations
/// outside the reference set score zero.
pub struct PopularityScorer {
    reference: HashSet<String>,
}

impl PopularityScorer {

    pub fn new<T: AsRef<str>>(reference: &[T]) -> PopularityScorer {

        // duplicates in the reference list collapse into a single entry
        Self {
            reference: reference.iter().map(|author| author.as_ref().to_owned()).collect()
        }
    }

    pub fn reference_len(&self) -> usize {
        self.reference.len()
    }

    pub fn contains(&self, author: &str) -> bool {
        self.reference.contains(author)
    }

    pub fn score<T: AsRef<str>>(&self, observations: &[T]) -> Vec<f32> {

        // per-call counts keyed by borrowed names
        let mut counts: HashMap<&str, f32> = self.reference.iter().map(|k| (k.as_str(), 0.0)).collect();
        for author in observations {
            if let Some(count) = counts.get_mut(author.as_ref()) {
                *count += 1.0;
            }
        }

        // second pass reads the final totals, repeated authors all get the same value
        observations
        .iter()
        .map(|author| *counts.get(author.as_ref()).unwrap_or(&0.0))
        .collect()
    }

}


/// One-shot form of [`PopularityScorer::score`].
pub fn author_popularity<R: AsRef<str>, O: AsRef<str>>(reference: &[R], observations: &[O]) -> Vec<f32> {

    let mut counts: HashMap<&str, f32> = HashMap::with_capacity(reference.len());
    for author in reference {
        counts.entry(author.as_ref()).or_insert(0.0);
    }

    for author in observations {
        if let Some(count) = counts.get_mut(author.as_ref()) {
            *count += 1.0;
        }
    }

    observations
    .iter()
    .map(|author| *counts.get(author.as_ref()).unwrap_or(&0.0))
    .collect()
}
