//! Term-frequency text similarity index.
//!
//! A small TF-IDF vectorizer with English stop-word removal, used by the
//! candidate generator to rank registry events against the combined query
//! and evidence text. Documents and queries are projected into the same
//! vocabulary and compared by cosine similarity; vectors are L2-normalized
//! so the cosine is a plain dot product.

use std::collections::HashMap;

/// English stop words removed before vectorization.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "could", "did", "do", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if",
    "in", "into", "is", "it", "its", "just", "more", "most", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
    "out", "over", "own", "same", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "you", "your",
];

/// Splits text into lowercase alphanumeric tokens, dropping stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}

/// A fitted TF-IDF index over a fixed document set.
#[derive(Debug, Clone)]
pub struct TextIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    /// L2-normalized document vectors, one per input document.
    doc_vectors: Vec<Vec<f64>>,
}

impl TextIndex {
    /// Fits the index over the given documents.
    pub fn fit(documents: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();
        for tokens in &tokenized {
            let mut seen: Vec<&str> = Vec::new();
            for token in tokens {
                if !vocabulary.contains_key(token) {
                    vocabulary.insert(token.clone(), vocabulary.len());
                    document_frequency.push(0);
                }
                if !seen.contains(&token.as_str()) {
                    seen.push(token);
                    document_frequency[vocabulary[token]] += 1;
                }
            }
        }

        // Smoothed idf, so every term keeps a positive weight.
        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let doc_vectors = tokenized
            .iter()
            .map(|tokens| Self::vectorize_tokens(tokens, &vocabulary, &idf))
            .collect();

        Self {
            vocabulary,
            idf,
            doc_vectors,
        }
    }

    /// Cosine similarity of `query` against every fitted document.
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let query_vector = Self::vectorize_tokens(&tokenize(query), &self.vocabulary, &self.idf);
        self.doc_vectors
            .iter()
            .map(|doc| dot(&query_vector, doc))
            .collect()
    }

    /// Number of fitted documents.
    pub fn len(&self) -> usize {
        self.doc_vectors.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_vectors.is_empty()
    }

    fn vectorize_tokens(
        tokens: &[String],
        vocabulary: &HashMap<String, usize>,
        idf: &[f64],
    ) -> Vec<f64> {
        let mut vector = vec![0.0; vocabulary.len()];
        for token in tokens {
            if let Some(&idx) = vocabulary.get(token) {
                vector[idx] += 1.0;
            }
        }
        for (idx, value) in vector.iter_mut().enumerate() {
            *value *= idf[idx];
        }
        l2_normalize(&mut vector);
        vector
    }
}

fn l2_normalize(vector: &mut [f64]) {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stop_words_and_punctuation() {
        let tokens = tokenize("The war disrupted the cotton supply, worldwide!");
        assert_eq!(tokens, vec!["war", "disrupted", "cotton", "supply", "worldwide"]);
    }

    #[test]
    fn test_identical_text_scores_highest() {
        let docs = vec![
            "cotton supply disruption from war".to_string(),
            "railway construction and machinery".to_string(),
        ];
        let index = TextIndex::fit(&docs);
        let sims = index.similarities("cotton supply disruption from war");
        assert!(sims[0] > 0.99);
        assert!(sims[0] > sims[1]);
    }

    #[test]
    fn test_unrelated_query_scores_zero() {
        let docs = vec!["cotton supply disruption".to_string()];
        let index = TextIndex::fit(&docs);
        let sims = index.similarities("porcelain glazing techniques");
        assert_eq!(sims[0], 0.0);
    }

    #[test]
    fn test_partial_overlap_ranks_by_shared_terms() {
        let docs = vec![
            "coffee plantations devastated by leaf rust disease".to_string(),
            "colonial empire expansion and economic control".to_string(),
        ];
        let index = TextIndex::fit(&docs);
        let sims = index.similarities("coffee estates hit by rust disease");
        assert!(sims[0] > sims[1]);
        assert!(sims[0] > 0.0);
    }

    #[test]
    fn test_empty_documents_yield_empty_index() {
        let index = TextIndex::fit(&[]);
        assert!(index.is_empty());
        assert!(index.similarities("anything").is_empty());
    }
}
