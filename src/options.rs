/// Tunables for the readers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Gap, in seconds, left between an XML transcript entry and the start of
    /// the node that follows it.
    pub end_epsilon: f64,
    /// An SRT text line is kept only when it holds more letters than this.
    pub min_letters: usize,
}

impl ParseOptions {
    pub const DEFAULT_END_EPSILON: f64 = 0.01;
    pub const DEFAULT_MIN_LETTERS: usize = 2;
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            end_epsilon: Self::DEFAULT_END_EPSILON,
            min_letters: Self::DEFAULT_MIN_LETTERS,
        }
    }
}
