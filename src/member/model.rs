//! Membership application snapshot as served by the association backend.
//!
//! Snapshots reach us under two naming conventions depending on which
//! backend version produced them: localized French keys (`nom`,
//! `date_naissance`, ...) or canonical English keys (`lastName`,
//! `birthDate`, ...). The record keeps the raw map and resolves every
//! biographical field with a fixed precedence: localized key wins if
//! present, else canonical key, else empty string.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Lifecycle state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
}

/// A membership application record.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    /// Backend identifier, also the basis of every artifact publish key.
    pub id: String,
    /// Assigned by the backend at approval time.
    pub membership_number: Option<String>,
    pub rejection_reason: Option<String>,
    pub photo_url: Option<String>,
    pub signature_url: Option<String>,
    fields: Map<String, Value>,
}

fn take_string(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match fields.remove(*key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s),
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(_) | None => continue,
        }
    }
    None
}

impl MemberRecord {
    /// Build a record from a raw snapshot map. Used by tests and by the
    /// deserializer; callers normally obtain records from the backend.
    pub fn from_snapshot(mut fields: Map<String, Value>) -> Result<Self, String> {
        let id = take_string(&mut fields, &["_id", "id"])
            .ok_or_else(|| "snapshot has no id".to_string())?;
        let membership_number = take_string(&mut fields, &["numero_membre", "membershipNumber"]);
        let rejection_reason = take_string(&mut fields, &["motif_rejet", "rejectionReason"]);
        let photo_url = take_string(&mut fields, &["photo", "photoUrl"]);
        let signature_url = take_string(&mut fields, &["signature", "signatureUrl"]);
        Ok(Self {
            id,
            membership_number,
            rejection_reason,
            photo_url,
            signature_url,
            fields,
        })
    }

    /// Resolve a biographical field: localized key wins, else canonical,
    /// else empty. Non-string scalars render through their display form; a
    /// null or missing value is an empty string, never "null".
    pub fn text(&self, localized: &str, canonical: &str) -> String {
        for key in [localized, canonical] {
            match self.fields.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Number(n)) => return n.to_string(),
                Some(Value::Bool(b)) => return b.to_string(),
                Some(_) | None => continue,
            }
        }
        String::new()
    }

    pub fn last_name(&self) -> String {
        self.text("nom", "lastName")
    }

    pub fn first_name(&self) -> String {
        self.text("prenom", "firstName")
    }

    pub fn birth_date(&self) -> String {
        self.text("date_naissance", "birthDate")
    }

    pub fn birth_place(&self) -> String {
        self.text("lieu_naissance", "birthPlace")
    }

    pub fn address(&self) -> String {
        self.text("adresse", "address")
    }

    pub fn profession(&self) -> String {
        self.text("profession", "profession")
    }

    pub fn residency_city(&self) -> String {
        self.text("ville_residence", "residencyCity")
    }

    pub fn entry_date(&self) -> String {
        self.text("date_entree", "entryDate")
    }

    pub fn employer(&self) -> String {
        self.text("employeur", "employer")
    }

    pub fn phone(&self) -> String {
        self.text("telephone", "phone")
    }

    pub fn spouse(&self) -> String {
        self.text("conjoint", "spouse")
    }

    pub fn children_count(&self) -> String {
        self.text("nombre_enfants", "childrenCount")
    }

    pub fn comment(&self) -> String {
        self.text("commentaire", "comment")
    }

    pub fn consular_id(&self) -> String {
        self.text("numero_consulaire", "consularId")
    }

    /// Full name as printed on the documents.
    pub fn display_name(&self) -> String {
        let first = self.first_name();
        let last = self.last_name();
        match (first.is_empty(), last.is_empty()) {
            (true, true) => String::new(),
            (true, false) => last,
            (false, true) => first,
            (false, false) => format!("{first} {last}"),
        }
    }

    pub fn set_membership_number(&mut self, number: String) {
        self.membership_number = Some(number);
    }

    /// Membership number as rendered on documents; empty before the
    /// backend assigns one.
    pub fn membership_number_text(&self) -> String {
        self.membership_number.clone().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for MemberRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::deserialize(deserializer)?;
        MemberRecord::from_snapshot(fields).map_err(de::Error::custom)
    }
}

impl Serialize for MemberRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        if let Some(number) = &self.membership_number {
            map.serialize_entry("numero_membre", number)?;
        }
        if let Some(reason) = &self.rejection_reason {
            map.serialize_entry("motif_rejet", reason)?;
        }
        if let Some(url) = &self.photo_url {
            map.serialize_entry("photo", url)?;
        }
        if let Some(url) = &self.signature_url {
            map.serialize_entry("signature", url)?;
        }
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl utoipa::PartialSchema for MemberRecord {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::schema::ObjectBuilder::new()
            .description(Some(
                "Membership application snapshot; biographical fields may use \
                 localized (French) or canonical (English) keys",
            ))
            .into()
    }
}

impl utoipa::ToSchema for MemberRecord {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("MemberRecord")
    }
}
