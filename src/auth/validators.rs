use std::sync::OnceLock;

use regex::Regex;

use super::models::RegisterRequest;
use crate::common::{ValidationResult, Validator};

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"))
}

impl Validator<RegisterRequest> for RegisterRequest {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Nome é obrigatório");
        }

        if data.name.len() > 100 {
            result.add_error("name", "Nome deve ter no máximo 100 caracteres");
        }

        if data.email.trim().is_empty() {
            result.add_error("email", "Email é obrigatório");
        } else if !email_regex().is_match(data.email.trim()) {
            result.add_error("email", "Email inválido");
        }

        if data.password.len() < 6 {
            result.add_error("password", "A senha deve ter no mínimo 6 caracteres");
        }

        result
    }
}
