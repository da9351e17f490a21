use crate::api::ApiConfig;
use crate::colors;
use egui::Color32;

pub const ERROR_SENTINEL_TEXT: &str = "Error fetching response.";

#[derive(Clone, Debug)]
pub struct Alternative {
    pub token: String,
    pub logprob: f64,
}

#[derive(Clone, Debug)]
pub struct TokenRecord {
    pub token: String,
    pub display_text: String,
    pub logprob: f64,
    pub alternatives: Vec<Alternative>,
}

impl TokenRecord {
    pub fn new(token: String, logprob: f64, alternatives: Vec<Alternative>) -> Self {
        let display_text = token.replace('\n', "↵\n").replace('\t', "→");
        Self {
            token,
            display_text,
            logprob,
            alternatives,
        }
    }

    pub fn get_color(&self) -> Color32 {
        colors::logprob_color(self.logprob, colors::PRIMARY_CLAMP)
    }
}

#[derive(Clone, Debug)]
pub struct ResponseAnalysis {
    pub prompt: String,
    pub tokens: Vec<TokenRecord>,
    pub elapsed_ms: u64,
}

impl ResponseAnalysis {
    pub fn new(prompt: String, tokens: Vec<TokenRecord>, elapsed_ms: u64) -> Self {
        Self {
            prompt,
            tokens,
            elapsed_ms,
        }
    }

    // Shown in place of a real response when the request or parsing failed.
    // The -inf logprob lands on the yellow end of the gradient without any
    // special-casing in the renderer.
    pub fn error_sentinel(prompt: String) -> Self {
        let sentinel = TokenRecord::new(
            ERROR_SENTINEL_TEXT.to_string(),
            f64::NEG_INFINITY,
            Vec::new(),
        );
        Self {
            prompt,
            tokens: vec![sentinel],
            elapsed_ms: 0,
        }
    }

    // Perplexity is the exponential of the average negative log-likelihood
    // per token. Formula: exp( (1/N) * Σ -logprob_i )
    // Undefined for an empty response and for the error sentinel.
    pub fn perplexity(&self) -> Option<f64> {
        if self.tokens.is_empty() || self.tokens.iter().any(|t| !t.logprob.is_finite()) {
            return None;
        }

        let sum_neg_logprobs: f64 = self.tokens.iter().map(|t| -t.logprob).sum();

        Some((sum_neg_logprobs / self.tokens.len() as f64).exp())
    }
}

#[derive(Debug)]
pub enum WorkerMessage {
    Started,
    Completed(ResponseAnalysis),
    Error(String),
}

#[derive(Debug)]
pub enum WorkerCommand {
    Send { prompt: String, config: ApiConfig },
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(logprob: f64) -> TokenRecord {
        TokenRecord::new("a".to_string(), logprob, vec![])
    }

    #[test]
    fn test_perplexity() {
        let analysis = ResponseAnalysis::new(
            "hi".to_string(),
            vec![record(0.0), record(-1.0), record(-2.0)],
            100,
        );

        let ppl = analysis.perplexity().unwrap();
        assert!((ppl - std::f64::consts::E).abs() < 1e-9);
    }

    #[test]
    fn test_perplexity_is_at_least_one() {
        for logprobs in [vec![0.0], vec![-0.5, -3.0], vec![-10.0, 0.0, -0.01]] {
            let tokens = logprobs.into_iter().map(record).collect();
            let analysis = ResponseAnalysis::new(String::new(), tokens, 0);

            assert!(analysis.perplexity().unwrap() >= 1.0);
        }
    }

    #[test]
    fn test_perplexity_of_certain_sequence_is_one() {
        let analysis = ResponseAnalysis::new(String::new(), vec![record(0.0), record(0.0)], 0);

        assert!((analysis.perplexity().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perplexity_undefined_for_empty_response() {
        let analysis = ResponseAnalysis::new(String::new(), vec![], 0);

        assert!(analysis.perplexity().is_none());
    }

    #[test]
    fn test_error_sentinel_is_single_record_without_perplexity() {
        let analysis = ResponseAnalysis::error_sentinel("hi".to_string());

        assert_eq!(analysis.tokens.len(), 1);
        assert_eq!(analysis.tokens[0].token, ERROR_SENTINEL_TEXT);
        assert!(analysis.tokens[0].alternatives.is_empty());
        assert!(analysis.perplexity().is_none());
    }

    #[test]
    fn test_display_text_escapes_whitespace() {
        let token = TokenRecord::new("a\nb\tc".to_string(), -0.5, vec![]);

        assert_eq!(token.display_text, "a↵\nb→c");
    }
}
