//! Language negotiation and user-visible message catalog.
//!
//! Supported languages are English (default) and Bulgarian. A Bulgarian entry
//! that is missing falls back to English.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Bg,
}

impl Language {
    /// Parses `en`, `en-US`, `bg_BG.UTF-8` and similar locale codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(|c: char| c == '-' || c == '_' || c == '.' || c == ';')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::En),
            "bg" => Some(Language::Bg),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Bg => "bg",
        }
    }
}

/// Picks the UI language: an explicit supported code wins, then the first
/// supported entry of an `Accept-Language` style list, then English.
pub fn negotiate(explicit: Option<&str>, accept_language: Option<&str>) -> Language {
    if let Some(lang) = explicit.and_then(Language::from_code) {
        return lang;
    }
    if let Some(header) = accept_language {
        for entry in header.replace(' ', "").split(',') {
            if let Some(lang) = Language::from_code(entry) {
                return lang;
            }
        }
    }
    Language::default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    JobDescriptionRequired,
    CvIdRequired,
    CodeRequired,
    UnsupportedFileType,
    FileTooLarge,
    FileUnreadable,
    GenericError,
    BackendChecking,
    BackendStarting,
    BackendTooSlow,
    BackendUnavailable,
    InterviewComplete,
    NoStatistics,
}

pub fn translate(lang: Language, key: MessageKey) -> &'static str {
    match lang {
        Language::En => english(key),
        Language::Bg => bulgarian(key).unwrap_or_else(|| english(key)),
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::JobDescriptionRequired => "Job description required",
        MessageKey::CvIdRequired => "CV not found. Please upload your CV first.",
        MessageKey::CodeRequired => "No code provided.",
        MessageKey::UnsupportedFileType => {
            "Unsupported file type. Please upload a PDF or DOCX file."
        }
        MessageKey::FileTooLarge => "File size too large. Please upload a file smaller than 10MB.",
        MessageKey::FileUnreadable => "The selected file could not be read.",
        MessageKey::GenericError => "Something went wrong. Please try again.",
        MessageKey::BackendChecking => "Connecting to the server...",
        MessageKey::BackendStarting => "The server is starting up, this can take a minute...",
        MessageKey::BackendTooSlow => {
            "The server is taking too long to start. Please try again later."
        }
        MessageKey::BackendUnavailable => "The server is currently unavailable.",
        MessageKey::InterviewComplete => "Interview complete!",
        MessageKey::NoStatistics => "No interview statistics available yet.",
    }
}

fn bulgarian(key: MessageKey) -> Option<&'static str> {
    let text = match key {
        MessageKey::JobDescriptionRequired => "Необходимо е описание на позицията",
        MessageKey::CvIdRequired => "CV не е намерено. Моля, първо качете своето CV.",
        MessageKey::CodeRequired => "Не е предоставен код.",
        MessageKey::UnsupportedFileType => {
            "Неподдържан тип файл. Моля, качете PDF или DOCX файл."
        }
        MessageKey::FileTooLarge => "Файлът е твърде голям. Максималният размер е 10MB.",
        MessageKey::GenericError => "Нещо се обърка. Моля, опитайте отново.",
        MessageKey::BackendChecking => "Свързване със сървъра...",
        MessageKey::BackendStarting => "Сървърът се стартира, това може да отнеме минута...",
        MessageKey::BackendTooSlow => {
            "Стартирането на сървъра отнема твърде дълго. Моля, опитайте по-късно."
        }
        MessageKey::BackendUnavailable => "Сървърът в момента е недостъпен.",
        MessageKey::InterviewComplete => "Интервюто приключи!",
        MessageKey::NoStatistics => "Все още няма статистика за интервюта.",
        MessageKey::FileUnreadable => return None,
    };
    Some(text)
}
