//! Input validation for membership snapshots.
//!
//! Errors carry the offending field and a suggestion, formatted for the
//! operator who has to fix the record before approval can proceed.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use super::model::MemberRecord;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap();
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{label} ne doit pas être vide"))
            .with_suggestion(format!("Renseignez {} avant de continuer", label.to_lowercase()))
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("La date '{value}' est invalide"))
            .with_suggestion("Utilisez le format JJ-MM-AAAA, par exemple 03-11-1985")
    }

    pub fn invalid_phone(field: &str) -> Self {
        Self::new(field, "Le numéro de téléphone est invalide")
            .with_suggestion("Utilisez un numéro de 8 à 15 chiffres")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation échouée: {} erreur(s) trouvée(s)",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_message())
        }
    }
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Dates cross the wire as DD-MM-YYYY; only validate when a value is
/// present, an empty optional date is fine.
pub fn validate_date(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    if !DATE_RE.is_match(trimmed)
        || chrono::NaiveDate::parse_from_str(trimmed, "%d-%m-%Y").is_err()
    {
        errors.add(ValidationError::invalid_date(field, trimmed));
    }
}

pub fn validate_phone(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 8 || digits.len() > 15 {
        errors.add(ValidationError::invalid_phone(field));
    }
}

/// Sanity-check a snapshot before launching document generation.
pub fn validate_member_record(record: &MemberRecord) -> Result<(), String> {
    let mut errors = ValidationErrors::new();

    validate_required(&record.id, "id", "L'identifiant du dossier", &mut errors);
    validate_required(&record.last_name(), "nom", "Le nom", &mut errors);
    validate_required(&record.first_name(), "prenom", "Le prénom", &mut errors);
    validate_date(&record.birth_date(), "date_naissance", &mut errors);
    validate_date(&record.entry_date(), "date_entree", &mut errors);
    validate_phone(&record.phone(), "telephone", &mut errors);

    errors.into_result()
}
