use std::{fmt::Write as _, num::ParseFloatError};

/// A candidate solution: a fixed-length real-valued parameter vector plus its
/// evaluation bookkeeping.
///
/// The parameter length is fixed for the genotype's whole lifetime and is
/// identical across every genotype in a population. The genotype itself is an
/// opaque bag of parameters; only the network topology gives positions meaning.
///
/// Two scores are tracked separately:
///
/// - `evaluation` - the raw task score (track completion in `[0, 1]`),
///   written by the evaluator once per generation
/// - `fitness` - the selection-pressure score derived from `evaluation` each
///   generation, consumed only by the selection operator
#[derive(Debug, Clone, PartialEq)]
pub struct Genotype {
    parameters: Vec<f32>,
    evaluation: f32,
    fitness: f32,
}

/// Error parsing a genotype from its text representation.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid parameter on line {line}: {source}")]
pub struct GenotypeParseError {
    /// 1-based line number of the offending token.
    pub line: usize,
    source: ParseFloatError,
}

impl Genotype {
    /// Wraps a parameter vector. Scores start at zero.
    #[must_use]
    pub fn new(parameters: Vec<f32>) -> Self {
        Self {
            parameters,
            evaluation: 0.0,
            fitness: 0.0,
        }
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn parameters(&self) -> &[f32] {
        &self.parameters
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut [f32] {
        &mut self.parameters
    }

    #[must_use]
    pub fn evaluation(&self) -> f32 {
        self.evaluation
    }

    /// Sets the raw task score. Evaluations are never negative.
    pub fn set_evaluation(&mut self, evaluation: f32) {
        debug_assert!(evaluation >= 0.0 && evaluation.is_finite());
        self.evaluation = evaluation;
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Produces a new genotype with a duplicated parameter buffer and both
    /// scores reset to zero.
    ///
    /// The copy never shares storage with its source, so mutating the copy
    /// cannot affect the parent.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self::new(self.parameters.clone())
    }

    /// Encodes the parameter vector as newline-delimited decimal text, one
    /// parameter per line in construction order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dronevo_genetics::Genotype;
    /// let genotype = Genotype::new(vec![0.5, -1.25]);
    /// let text = genotype.to_text();
    /// let restored = Genotype::from_text(&text).unwrap();
    /// assert_eq!(restored.parameters(), genotype.parameters());
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for p in &self.parameters {
            writeln!(&mut text, "{p}").expect("writing to a String cannot fail");
        }
        text
    }

    /// Decodes a genotype from the text format produced by [`to_text`].
    ///
    /// Blank lines are ignored. Scores start at zero; a reloaded genotype is a
    /// snapshot with no live identity.
    ///
    /// [`to_text`]: Self::to_text
    pub fn from_text(text: &str) -> Result<Self, GenotypeParseError> {
        let mut parameters = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            let value = token
                .parse::<f32>()
                .map_err(|source| GenotypeParseError {
                    line: index + 1,
                    source,
                })?;
            parameters.push(value);
        }
        Ok(Self::new(parameters))
    }
}
