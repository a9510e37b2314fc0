//! Template renderer properties: determinism, escaping, empty-field and
//! missing-image behavior.

use serde_json::json;

use agc_adhesion_server::imaging::{EmbeddableImage, JPEG_MIME, PNG_MIME};
use agc_adhesion_server::member::model::MemberRecord;
use agc_adhesion_server::render::{
    CardBackTemplate, CardFrontTemplate, DocumentTemplate, FormTemplate, TemplateImages,
};

const ASSOCIATION: &str = "Association Générale Consulaire";

fn record(value: serde_json::Value) -> MemberRecord {
    serde_json::from_value(value).unwrap()
}

fn full_record() -> MemberRecord {
    record(json!({
        "id": "m-1",
        "nom": "Diallo",
        "prenom": "Mariama",
        "date_naissance": "03-11-1985",
        "lieu_naissance": "Conakry",
        "adresse": "12 avenue de la Paix",
        "ville_residence": "Brazzaville",
        "numero_consulaire": "GC-88412"
    }))
}

#[test]
fn test_form_render_is_deterministic() {
    let template = FormTemplate::new(ASSOCIATION.to_string());
    let mut images = TemplateImages::default();
    images.subject_photo = Some(EmbeddableImage::from_bytes(JPEG_MIME, &[9, 9, 9]));

    let a = template.render(&full_record(), &images);
    let b = template.render(&full_record(), &images);
    assert_eq!(a, b);
}

#[test]
fn test_form_renders_fields_and_dates_as_provided() {
    let template = FormTemplate::new(ASSOCIATION.to_string());
    let document = template.render(&full_record(), &TemplateImages::default());

    assert!(document.source.contains("FICHE D'ADHÉSION"));
    assert!(document.source.contains("Diallo"));
    assert!(document.source.contains("03-11-1985"));
    assert!(document.source.contains("width: 794pt"));
}

#[test]
fn test_empty_record_renders_empty_strings_not_null() {
    let template = FormTemplate::new(ASSOCIATION.to_string());
    let bare = record(json!({ "id": "m-2" }));
    let document = template.render(&bare, &TemplateImages::default());

    assert!(!document.source.contains("undefined"));
    assert!(!document.source.contains("null"));
    // All optional fields still produce their labels with empty values.
    assert!(document.source.contains("Conjoint(e)"));
    assert!(document.source.contains(r#"champ("Commentaire", "")"#));
}

#[test]
fn test_quotes_in_fields_are_escaped() {
    let template = FormTemplate::new(ASSOCIATION.to_string());
    let tricky = record(json!({ "id": "m-3", "nom": r#"D"Alo"# }));
    let document = template.render(&tricky, &TemplateImages::default());
    assert!(document.source.contains(r#"D\"Alo"#));
}

#[test]
fn test_missing_images_become_placeholder_boxes() {
    let template = FormTemplate::new(ASSOCIATION.to_string());
    let document = template.render(&full_record(), &TemplateImages::default());

    assert!(document.attachments.is_empty());
    assert!(document.source.contains("#rect"));
    assert!(document.source.contains("Photo"));
    assert!(document.source.contains("Signature du président"));
}

#[test]
fn test_provided_images_are_attached_with_matching_extensions() {
    let template = FormTemplate::new(ASSOCIATION.to_string());
    let mut images = TemplateImages::default();
    images.subject_photo = Some(EmbeddableImage::from_bytes(JPEG_MIME, &[1, 2]));
    images.signature = Some(EmbeddableImage::from_bytes(PNG_MIME, &[3, 4]));

    let document = template.render(&full_record(), &images);
    assert_eq!(document.attachments["photo.jpg"], vec![1, 2]);
    assert_eq!(document.attachments["signature.png"], vec![3, 4]);
    assert!(document.source.contains(r#"#image("photo.jpg""#));
}

#[test]
fn test_membership_number_only_after_assignment() {
    let template = FormTemplate::new(ASSOCIATION.to_string());

    let without = template.render(&full_record(), &TemplateImages::default());
    assert!(!without.source.contains("AGC-2024-001"));

    let mut approved = full_record();
    approved.set_membership_number("AGC-2024-001".to_string());
    let with = template.render(&approved, &TemplateImages::default());
    assert!(with.source.contains("AGC-2024-001"));
}

#[test]
fn test_card_front_shows_holder_identity() {
    let template = CardFrontTemplate::new(ASSOCIATION.to_string());
    let mut approved = full_record();
    approved.set_membership_number("AGC-2024-001".to_string());

    let document = template.render(&approved, &TemplateImages::default());
    assert!(document.source.contains("CARTE DE MEMBRE"));
    assert!(document.source.contains("Mariama Diallo"));
    assert!(document.source.contains("AGC-2024-001"));
    assert!(document.source.contains("width: 700pt"));
}

#[test]
fn test_card_back_embeds_the_qr_image() {
    let template = CardBackTemplate::new(ASSOCIATION.to_string());
    let mut images = TemplateImages::default();
    images.qr_code = Some(EmbeddableImage::from_bytes(PNG_MIME, b"qr-bytes"));

    let document = template.render(&full_record(), &images);
    assert_eq!(document.attachments["qr.png"], b"qr-bytes".to_vec());
    assert!(document.source.contains(r#"#image("qr.png""#));
    assert!(document.source.contains("GC-88412"));
}

#[test]
fn test_card_back_without_qr_still_renders() {
    let template = CardBackTemplate::new(ASSOCIATION.to_string());
    let document = template.render(&full_record(), &TemplateImages::default());
    assert!(document.source.contains("#rect"));
    assert!(document.attachments.is_empty());
}
