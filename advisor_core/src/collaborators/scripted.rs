//! Prompter that replays canned answers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{PromptError, Prompter};

/// Everything a [`ScriptedPrompter`] was asked and told.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub prompts: Vec<String>,
    pub told: Vec<String>,
}

impl Transcript {
    /// Number of messages containing `needle`.
    pub fn told_count(&self, needle: &str) -> usize {
        self.told.iter().filter(|m| m.contains(needle)).count()
    }

    /// Number of times `needle` appeared in a prompt.
    pub fn prompt_count(&self, needle: &str) -> usize {
        self.prompts.iter().filter(|p| p.contains(needle)).count()
    }
}

/// Answers prompts from a fixed script, in order.
///
/// Running out of answers is an error, so a test fails instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Rc<RefCell<Transcript>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Rc::default(),
        }
    }

    /// Shared handle on the transcript, still readable after the prompter is boxed away.
    pub fn transcript(&self) -> Rc<RefCell<Transcript>> {
        Rc::clone(&self.transcript)
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.transcript.borrow_mut().prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| PromptError::Exhausted {
            prompt: prompt.to_string(),
        })
    }

    fn tell(&mut self, message: &str) {
        self.transcript.borrow_mut().told.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut prompter = ScriptedPrompter::new(["a", "b"]);
        let transcript = prompter.transcript();

        assert_eq!(prompter.read_line("first").unwrap(), "a");
        prompter.tell("hello");
        assert_eq!(prompter.read_line("second").unwrap(), "b");
        assert_eq!(prompter.remaining(), 0);
        assert!(prompter.read_line("third").is_err());

        let transcript = transcript.borrow();
        assert_eq!(transcript.prompts, vec!["first", "second", "third"]);
        assert_eq!(transcript.told_count("hell"), 1);
        assert_eq!(transcript.prompt_count("ir"), 2);
    }
}
