//! Membership card front template (700x490).

use super::common::{embed_or_placeholder, escape_markup};
use super::traits::DocumentTemplate;
use super::{MarkupDocument, TemplateImages};
use crate::artifact::ArtifactKind;
use crate::member::model::MemberRecord;

pub struct CardFrontTemplate {
    association_name: String,
}

impl CardFrontTemplate {
    pub fn new(association_name: String) -> Self {
        Self { association_name }
    }
}

impl DocumentTemplate for CardFrontTemplate {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::CardFront
    }

    fn render(&self, record: &MemberRecord, images: &TemplateImages) -> MarkupDocument {
        let mut document = MarkupDocument::default();

        let logo =
            embed_or_placeholder(&mut document, images.logo.as_ref(), "logo", 60, 60, "Logo");
        let photo = embed_or_placeholder(
            &mut document,
            images.subject_photo.as_ref(),
            "photo",
            140,
            170,
            "Photo",
        );

        document.source = format!(
            r##"#set page(width: 700pt, height: 490pt, margin: 28pt, fill: rgb("#f5f7fa"))
#set text(size: 13pt)

#grid(
  columns: (70pt, 1fr),
  gutter: 14pt,
  [{logo}],
  align(left + horizon)[
    #text(size: 17pt, weight: "bold")[#"{association}"]
    #v(2pt)
    #text(size: 14pt, fill: rgb("#2c4a6e"))[CARTE DE MEMBRE]
  ],
)

#v(8pt)
#line(length: 100%, stroke: 1.5pt + rgb("#2c4a6e"))
#v(16pt)

#grid(
  columns: (1fr, 160pt),
  gutter: 20pt,
  [
    #text(size: 18pt, weight: "bold")[#"{name}"]
    #v(10pt)
    #text(weight: "bold")[N° de membre: ] #"{membership_number}"

    #text(weight: "bold")[Ville de résidence: ] #"{residency_city}"

    #text(weight: "bold")[Membre depuis: ] #"{entry_date}"
  ],
  align(right)[{photo}],
)
"##,
            logo = logo,
            association = escape_markup(&self.association_name),
            name = escape_markup(&record.display_name()),
            membership_number = escape_markup(&record.membership_number_text()),
            residency_city = escape_markup(&record.residency_city()),
            entry_date = escape_markup(&record.entry_date()),
            photo = photo,
        );
        document
    }
}
