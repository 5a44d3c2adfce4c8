//! Interactive questions for answers not given on the command line

use std::io::{BufRead, Write};

use shared::Language;

use crate::error::{AppError, AppResult};

/// A question in both supported languages
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub en: &'static str,
    pub sw: &'static str,
}

impl Question {
    pub const fn new(en: &'static str, sw: &'static str) -> Self {
        Self { en, sw }
    }

    fn text(&self, language: Language) -> &'static str {
        match language {
            Language::English => self.en,
            Language::Swahili => self.sw,
        }
    }
}

pub const LOCATION: Question = Question::new(
    "Enter your County and Sub-county (e.g., Nakuru, Bahati)",
    "Andika Kaunti na Kaunti ndogo yako (mfano: Nakuru, Bahati)",
);
pub const PREVIOUS_YIELD: Question = Question::new(
    "Enter your previous maize yield (bags per acre)",
    "Andika mavuno yako ya mahindi ya msimu uliopita (magunia kwa ekari)",
);
pub const SOIL_TEXTURE_FEEL: Question = Question::new(
    "How does your soil feel when wet?",
    "Udongo wako unahisije ukiwa na maji?",
);
pub const PREVIOUS_CROP: Question = Question::new(
    "Which crop did you grow last season?",
    "Ulipanda zao gani msimu uliopita?",
);
pub const FERTILIZER_USED: Question = Question::new(
    "Which fertilizer did you use last season?",
    "Ulitumia mbolea gani msimu uliopita?",
);

/// Line-oriented prompter over any reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
    language: Language,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, language: Language) -> Self {
        Self {
            input,
            output,
            language,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self, field: &str) -> AppResult<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::PromptClosed(field.to_string()));
        }
        Ok(line.trim().to_string())
    }

    /// Free-text answer, repeated until non-empty
    pub fn ask_text(&mut self, field: &str, question: Question) -> AppResult<String> {
        loop {
            write!(self.output, "{}: ", question.text(self.language))?;
            let answer = self.read_answer(field)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }

    /// Numeric answer, repeated until it parses
    pub fn ask_number(&mut self, field: &str, question: Question) -> AppResult<f64> {
        loop {
            write!(self.output, "{}: ", question.text(self.language))?;
            let answer = self.read_answer(field)?;
            match answer.parse::<f64>() {
                Ok(value) if value.is_finite() => return Ok(value),
                _ => {
                    let hint = match self.language {
                        Language::English => "Please enter a number",
                        Language::Swahili => "Tafadhali andika nambari",
                    };
                    writeln!(self.output, "{}", hint)?;
                }
            }
        }
    }

    /// Numbered menu. A menu number picks that option; any other text is
    /// returned as typed so the codec can report it.
    pub fn ask_choice(&mut self, field: &str, question: Question, options: &[String]) -> AppResult<String> {
        writeln!(self.output, "{}", question.text(self.language))?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, option)?;
        }
        let answer = loop {
            write!(self.output, "> ")?;
            let answer = self.read_answer(field)?;
            if !answer.is_empty() {
                break answer;
            }
        };

        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i));
        Ok(picked.cloned().unwrap_or(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), Language::English)
    }

    fn options() -> Vec<String> {
        vec!["maize".to_string(), "beans".to_string()]
    }

    #[test]
    fn test_choice_by_number() {
        let mut p = prompter("2\n");
        assert_eq!(p.ask_choice("previous_crop", PREVIOUS_CROP, &options()).unwrap(), "beans");
        let shown = String::from_utf8(p.into_output()).unwrap();
        assert!(shown.contains("1. maize"));
    }

    #[test]
    fn test_choice_free_text_passes_through() {
        let mut p = prompter("\nrice\n");
        assert_eq!(p.ask_choice("previous_crop", PREVIOUS_CROP, &options()).unwrap(), "rice");
    }

    #[test]
    fn test_choice_out_of_range_number_is_free_text() {
        let mut p = prompter("7\n");
        assert_eq!(p.ask_choice("previous_crop", PREVIOUS_CROP, &options()).unwrap(), "7");
    }

    #[test]
    fn test_number_reprompts() {
        let mut p = prompter("many\n12.5\n");
        assert_eq!(p.ask_number("previous_yield", PREVIOUS_YIELD).unwrap(), 12.5);
    }

    #[test]
    fn test_closed_input() {
        let mut p = prompter("");
        assert!(matches!(
            p.ask_text("location", LOCATION),
            Err(AppError::PromptClosed(field)) if field == "location"
        ));
    }

    #[test]
    fn test_swahili_question() {
        let mut p = Prompter::new(Cursor::new(b"Nakuru, Bahati\n".to_vec()), Vec::new(), Language::Swahili);
        assert_eq!(p.ask_text("location", LOCATION).unwrap(), "Nakuru, Bahati");
        assert!(String::from_utf8(p.into_output()).unwrap().starts_with("Andika Kaunti"));
    }
}
