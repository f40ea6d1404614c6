//! Shared test utilities for the polyglot-pages test suite.
//!
//! `ScriptedGenerator` is a `TextGenerator` fake: it records every prompt it
//! receives and replies from a fixed response or a scripted sequence, so
//! generator behavior can be tested without a network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::ScriptedGenerator;
//!
//! let client = ScriptedGenerator::always("explained");
//! // ... run generation against &client ...
//! assert_eq!(client.prompts().len(), 2);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::client::{ClientError, TextGenerator};

/// Scripted stand-in for the OpenAI client.
///
/// Responses are consumed front-to-back; once the script is exhausted,
/// the fallback response (if any) repeats indefinitely.
pub struct ScriptedGenerator {
    script: RefCell<VecDeque<Result<String, ClientError>>>,
    fallback: Option<String>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    /// Respond to every prompt with the same text.
    pub fn always(text: &str) -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            fallback: Some(text.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Respond with a fixed sequence of results, one per call.
    ///
    /// Panics if called after the script runs out — a test driving more
    /// requests than it scripted is a test bug.
    pub fn script<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ClientError>>,
    {
        Self {
            script: RefCell::new(results.into_iter().collect()),
            fallback: None,
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, ClientError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        if let Some(result) = self.script.borrow_mut().pop_front() {
            return result;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => panic!("ScriptedGenerator called after its script was exhausted"),
        }
    }
}
