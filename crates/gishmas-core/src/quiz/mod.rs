mod engine;
mod variant;

pub use engine::{QuizMachine, QuizStep};
pub use variant::{AnswerOption, LocalIdStyle, Question, QuizVariant};
