use serde_json::json;

use super::model::MemberRecord;
use super::validation::{validate_member_record, validate_date, ValidationErrors};

fn record_from(value: serde_json::Value) -> MemberRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_localized_key_wins_over_canonical() {
    let record = record_from(json!({
        "id": "6543f2",
        "nom": "Diallo",
        "lastName": "Smith",
        "firstName": "Mariama"
    }));
    assert_eq!(record.last_name(), "Diallo");
    assert_eq!(record.first_name(), "Mariama");
}

#[test]
fn test_missing_fields_render_empty_never_null() {
    let record = record_from(json!({ "id": "6543f2" }));
    assert_eq!(record.spouse(), "");
    assert_eq!(record.comment(), "");
    assert_eq!(record.consular_id(), "");
    assert_eq!(record.membership_number_text(), "");
    assert_eq!(record.display_name(), "");
}

#[test]
fn test_null_value_falls_through_to_canonical() {
    let record = record_from(json!({
        "id": "6543f2",
        "conjoint": null,
        "spouse": "Aissatou"
    }));
    assert_eq!(record.spouse(), "Aissatou");
}

#[test]
fn test_numeric_fields_render_through_display_form() {
    let record = record_from(json!({
        "id": "6543f2",
        "nombre_enfants": 3
    }));
    assert_eq!(record.children_count(), "3");
}

#[test]
fn test_known_keys_are_promoted() {
    let record = record_from(json!({
        "_id": "6543f2",
        "numero_membre": "AGC-2024-001",
        "photo": "https://res.example.com/photos/6543f2.jpg",
        "motif_rejet": "incomplet"
    }));
    assert_eq!(record.id, "6543f2");
    assert_eq!(record.membership_number.as_deref(), Some("AGC-2024-001"));
    assert_eq!(
        record.photo_url.as_deref(),
        Some("https://res.example.com/photos/6543f2.jpg")
    );
    assert_eq!(record.rejection_reason.as_deref(), Some("incomplet"));
}

#[test]
fn test_snapshot_without_id_is_rejected() {
    let result: Result<MemberRecord, _> = serde_json::from_value(json!({ "nom": "Diallo" }));
    assert!(result.is_err());
}

#[test]
fn test_serialization_round_trip_preserves_fields() {
    let original = record_from(json!({
        "id": "6543f2",
        "nom": "Diallo",
        "ville_residence": "Brazzaville",
        "numero_membre": "AGC-2024-001"
    }));
    let value = serde_json::to_value(&original).unwrap();
    let reparsed = record_from(value);
    assert_eq!(reparsed, original);
    assert_eq!(reparsed.residency_city(), "Brazzaville");
}

#[test]
fn test_display_name_joins_first_and_last() {
    let record = record_from(json!({
        "id": "6543f2",
        "prenom": "Mariama",
        "nom": "Diallo"
    }));
    assert_eq!(record.display_name(), "Mariama Diallo");
}

#[test]
fn test_validate_member_record_accepts_complete_snapshot() {
    let record = record_from(json!({
        "id": "6543f2",
        "nom": "Diallo",
        "prenom": "Mariama",
        "date_naissance": "03-11-1985",
        "date_entree": "14-02-2023",
        "telephone": "+242 06 612 34 56"
    }));
    assert!(validate_member_record(&record).is_ok());
}

#[test]
fn test_validate_member_record_reports_every_problem() {
    let record = record_from(json!({
        "id": "6543f2",
        "nom": "Diallo",
        "prenom": "Mariama",
        "date_naissance": "1985/11/03",
        "telephone": "12"
    }));
    let message = validate_member_record(&record).unwrap_err();
    assert!(message.contains("date_naissance"));
    assert!(message.contains("telephone"));
    assert!(message.contains("2 erreur"));
}

#[test]
fn test_validate_date_checks_calendar_validity() {
    let mut errors = ValidationErrors::new();
    validate_date("31-02-2020", "date_naissance", &mut errors);
    assert_eq!(errors.len(), 1);

    let mut errors = ValidationErrors::new();
    validate_date("29-02-2020", "date_naissance", &mut errors);
    assert!(errors.is_empty());
}
