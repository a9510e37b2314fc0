//! Adhesion form template, A4 portrait (794x1123 at ~96dpi).

use super::common::{embed_or_placeholder, escape_markup};
use super::traits::DocumentTemplate;
use super::{MarkupDocument, TemplateImages};
use crate::artifact::ArtifactKind;
use crate::member::model::MemberRecord;

pub struct FormTemplate {
    association_name: String,
}

impl FormTemplate {
    pub fn new(association_name: String) -> Self {
        Self { association_name }
    }
}

impl DocumentTemplate for FormTemplate {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::AdhesionForm
    }

    fn render(&self, record: &MemberRecord, images: &TemplateImages) -> MarkupDocument {
        let mut document = MarkupDocument::default();

        let logo =
            embed_or_placeholder(&mut document, images.logo.as_ref(), "logo", 70, 70, "Logo");
        let photo = embed_or_placeholder(
            &mut document,
            images.subject_photo.as_ref(),
            "photo",
            120,
            150,
            "Photo",
        );
        let signature = embed_or_placeholder(
            &mut document,
            images.signature.as_ref(),
            "signature",
            160,
            60,
            "Signature de l'adhérent",
        );
        let counter_signature = embed_or_placeholder(
            &mut document,
            images.counter_signature.as_ref(),
            "contresignature",
            160,
            60,
            "Signature du président",
        );

        document.source = format!(
            r#"#set page(width: 794pt, height: 1123pt, margin: 42pt)
#set text(size: 11pt)

#let champ(etiquette, valeur) = grid(
  columns: (210pt, 1fr),
  gutter: 8pt,
  text(weight: "bold")[#etiquette],
  [#valeur],
)

#grid(
  columns: (80pt, 1fr, 130pt),
  gutter: 12pt,
  [{logo}],
  align(center)[
    #text(size: 16pt, weight: "bold")[#"{association}"]
    #v(4pt)
    #text(size: 13pt)[FICHE D'ADHÉSION]
  ],
  [{photo}],
)

#v(10pt)
#line(length: 100%, stroke: 1pt)
#v(14pt)

#champ("Numéro de membre", "{membership_number}")
#champ("Nom", "{last_name}")
#champ("Prénom", "{first_name}")
#champ("Date de naissance", "{birth_date}")
#champ("Lieu de naissance", "{birth_place}")
#champ("Adresse", "{address}")
#champ("Profession", "{profession}")
#champ("Ville de résidence", "{residency_city}")
#champ("Date d'entrée", "{entry_date}")
#champ("Employeur", "{employer}")
#champ("Téléphone", "{phone}")
#champ("Conjoint(e)", "{spouse}")
#champ("Nombre d'enfants", "{children_count}")
#champ("Numéro consulaire", "{consular_id}")
#champ("Commentaire", "{comment}")

#v(1fr)

#grid(
  columns: (1fr, 1fr),
  gutter: 40pt,
  align(center)[
    #text(weight: "bold")[L'adhérent]
    #v(6pt)
    {signature}
  ],
  align(center)[
    #text(weight: "bold")[Le président]
    #v(6pt)
    {counter_signature}
  ],
)
"#,
            logo = logo,
            association = escape_markup(&self.association_name),
            photo = photo,
            membership_number = escape_markup(&record.membership_number_text()),
            last_name = escape_markup(&record.last_name()),
            first_name = escape_markup(&record.first_name()),
            birth_date = escape_markup(&record.birth_date()),
            birth_place = escape_markup(&record.birth_place()),
            address = escape_markup(&record.address()),
            profession = escape_markup(&record.profession()),
            residency_city = escape_markup(&record.residency_city()),
            entry_date = escape_markup(&record.entry_date()),
            employer = escape_markup(&record.employer()),
            phone = escape_markup(&record.phone()),
            spouse = escape_markup(&record.spouse()),
            children_count = escape_markup(&record.children_count()),
            consular_id = escape_markup(&record.consular_id()),
            comment = escape_markup(&record.comment()),
            signature = signature,
            counter_signature = counter_signature,
        );
        document
    }
}
