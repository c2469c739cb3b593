use crate::keys::OPERANDS;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::fmt;

/// Number of buttons offered in selection mode
pub const OPTION_COUNT: usize = 4;

/// Range the wrong options are drawn from
pub const DISTRACTOR_RANGE: std::ops::RangeInclusive<u32> = 2..=99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Question {
    pub number1: u32,
    pub number2: u32,
}

impl Question {
    pub fn new(number1: u32, number2: u32) -> Self {
        Question { number1, number2 }
    }

    /// Both factors uniform in 1..=9; repeats of earlier questions allowed
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Question::new(rng.gen_range(OPERANDS), rng.gen_range(OPERANDS))
    }

    pub fn product(&self) -> u32 {
        self.number1 * self.number2
    }

    pub fn check_answer(&self, answer: u32) -> bool {
        self.product() == answer
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {} = ?", self.number1, self.number2)
    }
}

/// Four distinct candidates: `product` plus three distractors from
/// [`DISTRACTOR_RANGE`], shuffled for display
pub fn answer_options<R: Rng>(product: u32, rng: &mut R) -> Vec<u32> {
    let mut options = BTreeSet::from([product]);
    while options.len() < OPTION_COUNT {
        let candidate = rng.gen_range(DISTRACTOR_RANGE);
        if candidate != product {
            options.insert(candidate);
        }
    }

    let mut options: Vec<u32> = options.into_iter().collect();
    options.shuffle(rng);
    options
}

/// Reads a typed answer. Empty or non-numeric text gives `None`, which the
/// quiz scores as a wrong answer.
pub fn parse_answer(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}
