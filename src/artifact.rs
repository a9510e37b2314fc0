//! Published document artifacts and their stable storage identity.
//!
//! Every member owns up to three artifacts: the adhesion form and the two
//! card faces. Each is stored in the content store under a publish key that
//! is a pure function of the member's backend id and the artifact kind, so
//! republishing a new revision overwrites the previous image in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// The three printable documents issued for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    AdhesionForm,
    CardFront,
    CardBack,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::AdhesionForm,
        ArtifactKind::CardFront,
        ArtifactKind::CardBack,
    ];

    /// Stable store identifier for this artifact of the given member.
    ///
    /// The key never changes between the provisional and final revision:
    /// the second publish overwrites the first asset instead of creating a
    /// sibling.
    pub fn publish_key(&self, member_id: &str) -> String {
        match self {
            ArtifactKind::AdhesionForm => format!("adhesions/{member_id}"),
            ArtifactKind::CardFront => format!("cartes_membres/{member_id}_recto"),
            ArtifactKind::CardBack => format!("cartes_membres/{member_id}_verso"),
        }
    }

    /// Store folder used when requesting an upload authorization.
    pub fn folder(&self) -> &'static str {
        match self {
            ArtifactKind::AdhesionForm => "adhesions",
            ArtifactKind::CardFront | ArtifactKind::CardBack => "cartes_membres",
        }
    }

    /// Virtual canvas size in pixels: A4 at ~96dpi for the form, card
    /// format for the two faces.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ArtifactKind::AdhesionForm => (794, 1123),
            ArtifactKind::CardFront | ArtifactKind::CardBack => (700, 490),
        }
    }

    /// Short route segment used by the operator-facing regeneration
    /// endpoint.
    pub fn route_name(&self) -> &'static str {
        match self {
            ArtifactKind::AdhesionForm => "formulaire",
            ArtifactKind::CardFront => "recto",
            ArtifactKind::CardBack => "verso",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formulaire" => Ok(ArtifactKind::AdhesionForm),
            "recto" => Ok(ArtifactKind::CardFront),
            "verso" => Ok(ArtifactKind::CardBack),
            other => Err(format!("unknown artifact kind '{other}'")),
        }
    }
}

/// Pipeline phase of an artifact: before or after the membership number is
/// known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    Provisional,
    Final,
}

/// URL and identifier returned by the content store after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublishResult {
    #[schema(example = "https://res.cloudinary.com/agc/image/upload/v1/adhesions/6543f2.png")]
    pub url: String,
    #[schema(example = "adhesions/6543f2")]
    pub public_id: String,
}

/// A rendered, published document image.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentArtifact {
    pub kind: ArtifactKind,
    /// Stable publish key, identical across revisions.
    pub public_id: String,
    pub url: String,
    pub revision: Revision,
}

impl DocumentArtifact {
    pub fn new(kind: ArtifactKind, result: PublishResult, revision: Revision) -> Self {
        Self {
            kind,
            public_id: result.public_id,
            url: result.url,
            revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_key_is_stable_and_pure() {
        for kind in ArtifactKind::ALL {
            let a = kind.publish_key("6543f2");
            let b = kind.publish_key("6543f2");
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_publish_key_shapes() {
        assert_eq!(
            ArtifactKind::AdhesionForm.publish_key("6543f2"),
            "adhesions/6543f2"
        );
        assert_eq!(
            ArtifactKind::CardFront.publish_key("6543f2"),
            "cartes_membres/6543f2_recto"
        );
        assert_eq!(
            ArtifactKind::CardBack.publish_key("6543f2"),
            "cartes_membres/6543f2_verso"
        );
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(ArtifactKind::AdhesionForm.dimensions(), (794, 1123));
        assert_eq!(ArtifactKind::CardFront.dimensions(), (700, 490));
        assert_eq!(ArtifactKind::CardBack.dimensions(), (700, 490));
    }

    #[test]
    fn test_route_name_round_trip() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.route_name().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert!("autre".parse::<ArtifactKind>().is_err());
    }
}
