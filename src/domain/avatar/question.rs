//! Avatar Context - 问答条目

use serde::{Deserialize, Serialize};

/// 一个可点击的问题及其脚本化回答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub answer: String,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            answer: answer.into(),
        }
    }
}

/// 内置问答
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            "greeting",
            "Привет",
            "Привет! Рад вас видеть. Чем могу помочь?",
        ),
        Question::new(
            "how-are-you",
            "Как дела?",
            "Всё отлично! Я ведь программа, поэтому у меня всегда всё хорошо. А как ваши дела?",
        ),
        Question::new(
            "about",
            "Расскажи о себе",
            "Я цифровой аватар, созданный для общения и помощи. Я могу отвечать на ваши вопросы и поддерживать беседу.",
        ),
        Question::new(
            "capabilities",
            "Что ты умеешь?",
            "Я могу отвечать на ваши вопросы, давать советы и просто общаться. Попробуйте задать мне любой вопрос!",
        ),
        Question::new(
            "goodbye",
            "Пока!",
            "До свидания! Было приятно пообщаться. Возвращайтесь скорее!",
        ),
    ]
}
