//! Membership card back template (700x490).
//!
//! Carries the QR code whose payload is the published adhesion form URL,
//! so holders can be checked against the original application.

use super::common::{embed_or_placeholder, escape_markup};
use super::traits::DocumentTemplate;
use super::{MarkupDocument, TemplateImages};
use crate::artifact::ArtifactKind;
use crate::member::model::MemberRecord;

pub struct CardBackTemplate {
    association_name: String,
}

impl CardBackTemplate {
    pub fn new(association_name: String) -> Self {
        Self { association_name }
    }
}

impl DocumentTemplate for CardBackTemplate {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::CardBack
    }

    fn render(&self, record: &MemberRecord, images: &TemplateImages) -> MarkupDocument {
        let mut document = MarkupDocument::default();

        let qr_code = embed_or_placeholder(
            &mut document,
            images.qr_code.as_ref(),
            "qr",
            140,
            140,
            "QR",
        );
        let counter_signature = embed_or_placeholder(
            &mut document,
            images.counter_signature.as_ref(),
            "contresignature",
            150,
            55,
            "Signature du président",
        );

        document.source = format!(
            r##"#set page(width: 700pt, height: 490pt, margin: 28pt, fill: rgb("#f5f7fa"))
#set text(size: 12pt)

#align(center)[
  #text(size: 14pt, weight: "bold")[#"{association}"]
]

#v(6pt)
#line(length: 100%, stroke: 1.5pt + rgb("#2c4a6e"))
#v(16pt)

#grid(
  columns: (1fr, 160pt),
  gutter: 20pt,
  [
    #text(weight: "bold")[N° consulaire: ] #"{consular_id}"

    #text(weight: "bold")[Téléphone: ] #"{phone}"

    #v(10pt)
    Cette carte est strictement personnelle. Scannez le code pour
    vérifier la fiche d'adhésion du titulaire.

    #v(1fr)
    #align(left)[
      #text(size: 10pt, weight: "bold")[Le président]
      #v(4pt)
      {counter_signature}
    ]
  ],
  align(right + top)[{qr_code}],
)
"##,
            association = escape_markup(&self.association_name),
            consular_id = escape_markup(&record.consular_id()),
            phone = escape_markup(&record.phone()),
            counter_signature = counter_signature,
            qr_code = qr_code,
        );
        document
    }
}
