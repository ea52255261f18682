use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const GENDER_KEY: &str = "userGender";
pub const BONUSES_KEY: &str = "unlockedBonuses";
pub const TOTAL_VALUE_KEY: &str = "totalValue";
pub const ANSWERS_KEY: &str = "quizAnswers";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bonus {
    pub id: u32,
    pub title: &'static str,
    pub value: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizQuestion {
    pub step: u8,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub bonus: Bonus,
}

pub const QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        step: 1,
        prompt: "¿Cuál es tu género?",
        options: &["MASCULINO", "FEMININO"],
        bonus: Bonus {
            id: 1,
            title: "Guía de los primeros mensajes",
            value: 47,
        },
    },
    QuizQuestion {
        step: 2,
        prompt: "¿Hace cuánto tiempo terminó la relación?",
        options: &["Menos de 1 mes", "De 1 a 6 meses", "Más de 6 meses"],
        bonus: Bonus {
            id: 2,
            title: "Plan de contacto cero",
            value: 37,
        },
    },
    QuizQuestion {
        step: 3,
        prompt: "¿Quién terminó la relación?",
        options: &["Fui yo", "Fue mi ex", "Fue una decisión mutua"],
        bonus: Bonus {
            id: 3,
            title: "Mapa de los celos",
            value: 27,
        },
    },
    QuizQuestion {
        step: 4,
        prompt: "¿Todavía tienen contacto?",
        options: &["Sí, hablamos a veces", "Me bloqueó", "No hablamos hace tiempo"],
        bonus: Bonus {
            id: 4,
            title: "Guion del reencuentro",
            value: 67,
        },
    },
];

pub const FIRST_STEP: u8 = 1;

pub fn question(step: u8) -> Option<&'static QuizQuestion> {
    QUESTIONS.iter().find(|q| q.step == step)
}

/// Step to send the visitor to instead of `step`, when `step` has no question.
pub fn redirect_step(step: u8) -> Option<u8> {
    match question(step) {
        Some(_) => None,
        None => Some(FIRST_STEP),
    }
}

pub fn question_path(step: u8) -> String {
    format!("/quiz/{step}")
}

/// Where answering `step` leads: the next question, or the result page after the last.
pub fn next_path(step: u8) -> String {
    match question(step.saturating_add(1)) {
        Some(next) => question_path(next.step),
        None => String::from("/resultado"),
    }
}

pub fn bonus(id: u32) -> Option<Bonus> {
    QUESTIONS.iter().map(|q| q.bonus).find(|b| b.id == id)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gender {
    Masculino,
    Feminino,
    #[default]
    Unspecified,
}

impl Gender {
    pub fn from_answer(answer: &str) -> Self {
        match answer {
            "MASCULINO" => Gender::Masculino,
            "FEMININO" => Gender::Feminino,
            _ => Gender::Unspecified,
        }
    }

    pub fn as_answer(&self) -> &'static str {
        match self {
            Gender::Masculino => "MASCULINO",
            Gender::Feminino => "FEMININO",
            Gender::Unspecified => "",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Gender::Masculino => "DE RECHAZADO A DESEADO",
            Gender::Feminino => "DE RECHAZADA A DESEADA",
            Gender::Unspecified => "DE RECHAZADO(A) A DESEADO(A)",
        }
    }

    pub fn call_to_action(&self) -> &'static str {
        match self {
            Gender::Masculino => "RECONQUISTAR A ELLA AHORA",
            Gender::Feminino => "RECONQUISTAR A ÉL AHORA",
            Gender::Unspecified => "RECONQUISTAR AHORA",
        }
    }

    /// Pronoun for the ex-partner.
    pub fn partner_pronoun(&self) -> &'static str {
        match self {
            Gender::Feminino => "él",
            _ => "ella",
        }
    }
}

/// Everything the visitor told us, as kept in local storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuizAnswers {
    pub answers: BTreeMap<u8, String>,
    pub gender: Gender,
    pub unlocked_bonuses: Vec<u32>,
    pub total_value: u32,
}

#[derive(Serialize, Deserialize)]
struct StoredAnswers(BTreeMap<u8, String>);

impl QuizAnswers {
    /// Record `option` for `step`. Returns the bonus unlocked by this answer, if new.
    pub fn answer(&mut self, step: u8, option: &str) -> Option<Bonus> {
        let question = question(step)?;
        self.answers.insert(step, option.to_string());
        if step == 1 {
            self.gender = Gender::from_answer(option);
        }
        if self.unlocked_bonuses.contains(&question.bonus.id) {
            return None;
        }
        self.unlocked_bonuses.push(question.bonus.id);
        self.total_value += question.bonus.value;
        Some(question.bonus)
    }

    pub fn bonuses(&self) -> Vec<Bonus> {
        self.unlocked_bonuses.iter().filter_map(|id| bonus(*id)).collect()
    }

    /// Read back from storage. Missing or garbled keys fall back to defaults.
    pub fn load(get: impl Fn(&str) -> Option<String>) -> Self {
        let answers = get(ANSWERS_KEY)
            .and_then(|raw| serde_json::from_str::<StoredAnswers>(&raw).ok())
            .map(|stored| stored.0)
            .unwrap_or_default();
        let gender = get(GENDER_KEY)
            .map(|raw| Gender::from_answer(&raw))
            .unwrap_or_default();
        let unlocked_bonuses = get(BONUSES_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<u32>>(&raw).ok())
            .unwrap_or_default();
        let total_value = get(TOTAL_VALUE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Self {
            answers,
            gender,
            unlocked_bonuses,
            total_value,
        }
    }

    pub fn to_storage(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        Ok(vec![
            (ANSWERS_KEY, serde_json::to_string(&StoredAnswers(self.answers.clone()))?),
            (GENDER_KEY, self.gender.as_answer().to_string()),
            (BONUSES_KEY, serde_json::to_string(&self.unlocked_bonuses)?),
            (TOTAL_VALUE_KEY, self.total_value.to_string()),
        ])
    }
}
