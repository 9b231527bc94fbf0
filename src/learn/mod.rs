//! Learning module
//!
//! Static quiz topics and a small run state machine. Passing a quiz
//! (3 of 5 correct) earns bonus XP, recorded locally and pushed to the
//! backend through the same increment call as quest claims.

mod topics;

pub use topics::{topics, Question, Topic};

/// Score needed (out of [`QUIZ_LEN`]) to pass a quiz.
pub const PASS_SCORE: u32 = 3;
pub const QUIZ_LEN: usize = 5;

/// Progress through one quiz attempt.
#[derive(Debug)]
pub struct QuizRun {
    topic: Topic,
    current: usize,
    score: u32,
    /// Index the user picked for the current question, once answered.
    selected: Option<usize>,
    finished: bool,
}

impl QuizRun {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            current: 0,
            score: 0,
            selected: None,
            finished: false,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn question(&self) -> &Question {
        &self.topic.questions[self.current]
    }

    pub fn question_number(&self) -> usize {
        self.current + 1
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn passed(&self) -> bool {
        self.finished && self.score >= PASS_SCORE
    }

    /// Lock in an answer for the current question. Ignored once answered.
    pub fn answer(&mut self, option: usize) {
        if self.finished || self.selected.is_some() {
            return;
        }
        if option >= self.question().options.len() {
            return;
        }
        self.selected = Some(option);
        if option == self.question().correct {
            self.score += 1;
        }
    }

    /// Advance past an answered question; finishes the run on the last one.
    pub fn next(&mut self) {
        if self.finished || self.selected.is_none() {
            return;
        }
        if self.current + 1 < self.topic.questions.len() {
            self.current += 1;
            self.selected = None;
        } else {
            self.finished = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_are_well_formed() {
        let all = topics();
        assert_eq!(all.len(), 5);
        for topic in &all {
            assert_eq!(topic.questions.len(), QUIZ_LEN);
            assert!(topic.xp_reward > 0);
            for q in &topic.questions {
                assert!(q.correct < q.options.len());
            }
        }
    }

    #[test]
    fn test_perfect_run_passes() {
        let topic = topics().remove(0);
        let answers: Vec<usize> = topic.questions.iter().map(|q| q.correct).collect();
        let mut run = QuizRun::new(topic);
        for a in answers {
            run.answer(a);
            run.next();
        }
        assert!(run.is_finished());
        assert_eq!(run.score(), 5);
        assert!(run.passed());
    }

    #[test]
    fn test_two_correct_fails() {
        let topic = topics().remove(0);
        let answers: Vec<usize> = topic
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                if i < 2 {
                    q.correct
                } else {
                    // Any wrong option
                    (q.correct + 1) % q.options.len()
                }
            })
            .collect();
        let mut run = QuizRun::new(topic);
        for a in answers {
            run.answer(a);
            run.next();
        }
        assert!(run.is_finished());
        assert_eq!(run.score(), 2);
        assert!(!run.passed());
    }

    #[test]
    fn test_double_answer_ignored() {
        let topic = topics().remove(0);
        let correct = topic.questions[0].correct;
        let mut run = QuizRun::new(topic);
        run.answer(correct);
        run.answer(correct);
        assert_eq!(run.score(), 1);
    }
}
