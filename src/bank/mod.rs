pub mod catalog;
pub mod models;

pub use catalog::{BankError, QuestionBank};
pub use models::{BankStats, Difficulty, Question};
