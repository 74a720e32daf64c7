//! Validated views over a hypothesis/references/tags corpus.

use std::collections::BTreeSet;

use super::error::{Result, ScoreError};
use super::executor::Batch;

/// A borrowed corpus whose shapes have been checked.
#[derive(Debug, Clone, Copy)]
pub struct Corpus<'a> {
    hypothesis: &'a [String],
    references: &'a [Vec<String>],
    tags: Option<&'a [Vec<String>]>,
}

impl<'a> Corpus<'a> {
    /// Validates shapes and wraps the inputs.
    ///
    /// # Arguments
    /// * `hypothesis` - N system outputs
    /// * `references` - Reference sources, each holding N strings
    /// * `tags` - Optional N tag lists
    pub fn new(
        hypothesis: &'a [String],
        references: &'a [Vec<String>],
        tags: Option<&'a [Vec<String>]>,
    ) -> Result<Self> {
        let n = hypothesis.len();
        if n == 0 {
            return Err(ScoreError::InvalidInput("empty corpus".to_string()));
        }
        if references.is_empty() {
            return Err(ScoreError::InvalidInput(
                "at least one reference source is required".to_string(),
            ));
        }
        for (i, source) in references.iter().enumerate() {
            if source.len() != n {
                return Err(ScoreError::InvalidInput(format!(
                    "reference source {} has {} entries, expected {}",
                    i,
                    source.len(),
                    n
                )));
            }
        }
        if let Some(tags) = tags {
            if tags.len() != n {
                return Err(ScoreError::InvalidInput(format!(
                    "tags have {} entries, expected {}",
                    tags.len(),
                    n
                )));
            }
        }
        Ok(Self {
            hypothesis,
            references,
            tags,
        })
    }

    /// Rejects references that contain no tokens.
    pub fn require_nonempty_references(&self) -> Result<()> {
        for (s, source) in self.references.iter().enumerate() {
            if let Some(i) = source.iter().position(|r| r.split_whitespace().next().is_none()) {
                return Err(ScoreError::InvalidInput(format!(
                    "zero-length reference (source {}, example {})",
                    s, i
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hypothesis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypothesis.is_empty()
    }

    pub fn hypothesis(&self) -> &'a [String] {
        self.hypothesis
    }

    /// The examples covered by `batch`.
    pub fn slice(&self, batch: &Batch) -> CorpusSlice<'a> {
        CorpusSlice {
            offset: batch.start,
            hypothesis: &self.hypothesis[batch.start..batch.end],
            references: self
                .references
                .iter()
                .map(|r| &r[batch.start..batch.end])
                .collect(),
        }
    }

    /// Every example as a single slice.
    pub fn full(&self) -> CorpusSlice<'a> {
        self.slice(&Batch {
            index: 0,
            start: 0,
            end: self.len(),
        })
    }

    /// Distinct tags, sorted. `None` when the corpus is untagged.
    pub fn tag_set(&self) -> Option<BTreeSet<&'a str>> {
        self.tags.map(|tags| {
            tags.iter()
                .flat_map(|t| t.iter().map(String::as_str))
                .collect()
        })
    }

    /// Indices of the examples carrying `tag`, ascending.
    pub fn indices_with_tag(&self, tag: &str) -> Vec<usize> {
        match self.tags {
            Some(tags) => tags
                .iter()
                .enumerate()
                .filter(|(_, t)| t.iter().any(|x| x == tag))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Copies the selected examples into an owned, untagged corpus.
    pub fn select(&self, indices: &[usize]) -> OwnedCorpus {
        OwnedCorpus {
            hypothesis: indices.iter().map(|&i| self.hypothesis[i].clone()).collect(),
            references: self
                .references
                .iter()
                .map(|source| indices.iter().map(|&i| source[i].clone()).collect())
                .collect(),
        }
    }
}

/// An owned subset of a corpus, used to re-score a tag group.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedCorpus {
    pub hypothesis: Vec<String>,
    pub references: Vec<Vec<String>>,
}

impl OwnedCorpus {
    pub fn as_corpus(&self) -> Result<Corpus<'_>> {
        Corpus::new(&self.hypothesis, &self.references, None)
    }
}

/// The contiguous examples handed to one batch task.
#[derive(Debug, Clone)]
pub struct CorpusSlice<'a> {
    offset: usize,
    hypothesis: &'a [String],
    references: Vec<&'a [String]>,
}

impl<'a> CorpusSlice<'a> {
    /// Corpus index of the first example in this slice.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.hypothesis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypothesis.is_empty()
    }

    pub fn hypothesis(&self) -> &'a [String] {
        self.hypothesis
    }

    /// The first reference source.
    pub fn first_references(&self) -> &'a [String] {
        self.references.first().copied().unwrap_or(&[])
    }

    /// All references of example `i` (slice-relative), one per source.
    pub fn references_at(&self, i: usize) -> Vec<&'a str> {
        self.references.iter().map(|r| r[i].as_str()).collect()
    }

    /// Iterates `(hypothesis, references)` per example.
    pub fn examples(&self) -> impl Iterator<Item = (&'a str, Vec<&'a str>)> + '_ {
        self.hypothesis
            .iter()
            .enumerate()
            .map(move |(i, h)| (h.as_str(), self.references_at(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shape_validation() {
        let hyp = strings(&["a", "b"]);
        let good = vec![strings(&["a", "b"])];
        let short = vec![strings(&["a"])];
        let tags = vec![strings(&["x"])];

        assert!(Corpus::new(&hyp, &good, None).is_ok());
        assert!(matches!(
            Corpus::new(&hyp, &short, None),
            Err(ScoreError::InvalidInput(_))
        ));
        assert!(matches!(
            Corpus::new(&hyp, &good, Some(&tags)),
            Err(ScoreError::InvalidInput(_))
        ));
        assert!(Corpus::new(&hyp, &[], None).is_err());
        assert!(Corpus::new(&[], &[Vec::new()], None).is_err());
    }

    #[test]
    fn test_zero_length_reference() {
        let hyp = strings(&["a", "b"]);
        let refs = vec![strings(&["a", "   "])];
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();
        let err = corpus.require_nonempty_references().unwrap_err();
        assert!(format!("{}", err).contains("zero-length reference"));
    }

    #[test]
    fn test_slice_and_examples() {
        let hyp = strings(&["h0", "h1", "h2"]);
        let refs = vec![strings(&["a0", "a1", "a2"]), strings(&["b0", "b1", "b2"])];
        let corpus = Corpus::new(&hyp, &refs, None).unwrap();

        let slice = corpus.slice(&Batch {
            index: 1,
            start: 1,
            end: 3,
        });
        assert_eq!(slice.offset(), 1);
        assert_eq!(slice.len(), 2);
        let examples: Vec<_> = slice.examples().collect();
        assert_eq!(examples[0], ("h1", vec!["a1", "b1"]));
        assert_eq!(examples[1], ("h2", vec!["a2", "b2"]));
        assert_eq!(slice.first_references(), &refs[0][1..3]);
    }

    #[test]
    fn test_tags_and_select() {
        let hyp = strings(&["h0", "h1", "h2"]);
        let refs = vec![strings(&["r0", "r1", "r2"])];
        let tags = vec![strings(&["news"]), strings(&["web", "news"]), strings(&[])];
        let corpus = Corpus::new(&hyp, &refs, Some(&tags)).unwrap();

        let tag_set = corpus.tag_set().unwrap();
        assert_eq!(tag_set.into_iter().collect::<Vec<_>>(), vec!["news", "web"]);
        assert_eq!(corpus.indices_with_tag("news"), vec![0, 1]);

        let subset = corpus.select(&[1]);
        assert_eq!(subset.hypothesis, strings(&["h1"]));
        assert_eq!(subset.references, vec![strings(&["r1"])]);
        assert_eq!(subset.as_corpus().unwrap().len(), 1);
    }
}
