//! Card assembly: one member in, four artifacts out.
//!
//! `CardAssembler` orchestrates the encoder, the compositor and the
//! single-card PDF builder. It holds only read-only configuration, so
//! repeated or concurrent assemblies never share mutable state; every
//! call builds fresh images. Persisting the returned bundle is the
//! caller's job.

use crate::compose;
use crate::error::CardError;
use crate::geometry::{CardGeometry, PageGeometry};
use crate::pdf;
use crate::qr;
use chrono::{DateTime, Utc};
use common::model::card::BatchSelection;
use common::model::member::Member;
use common::model::template::CardTemplate;
use image::RgbImage;
use log::{info, warn};
use std::path::PathBuf;
use uuid::Uuid;

/// Default location of the club logo embedded into QR codes.
const DEFAULT_LOGO_PATH: &str = "static/images/log7.png";

/// The artifact bundle for one card-issuance event, plus the metadata
/// an artifact store needs to file it.
pub struct CardBundle {
    pub id: Uuid,
    pub member: Member,
    /// Template the faces were rendered from, if any.
    pub template_id: Option<i64>,
    pub qr: RgbImage,
    pub front: RgbImage,
    pub back: RgbImage,
    pub pdf: Vec<u8>,
    pub generated_at: DateTime<Utc>,
}

/// Artifact kinds within a bundle, used for file naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Qr,
    Front,
    Back,
    Pdf,
}

impl ArtifactKind {
    fn tag(self) -> &'static str {
        match self {
            ArtifactKind::Qr => "qr",
            ArtifactKind::Front => "recto",
            ArtifactKind::Back => "verso",
            ArtifactKind::Pdf => "carte",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            _ => "png",
        }
    }
}

impl CardBundle {
    /// File name for one artifact, following the
    /// `<first>_<last>_<kind>_<uuid8>.<ext>` convention.
    pub fn artifact_file_name(&self, kind: ArtifactKind) -> String {
        let id = self.id.simple().to_string();
        format!(
            "{}_{}_{}_{}.{}",
            self.member.first_name,
            self.member.last_name,
            kind.tag(),
            &id[..8],
            kind.extension()
        )
    }
}

/// Orchestrates one card generation end to end.
pub struct CardAssembler {
    geometry: CardGeometry,
    page: PageGeometry,
    logo_path: Option<PathBuf>,
}

impl Default for CardAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl CardAssembler {
    pub fn new() -> Self {
        Self {
            geometry: CardGeometry::default(),
            page: PageGeometry::default(),
            logo_path: Some(PathBuf::from(DEFAULT_LOGO_PATH)),
        }
    }

    /// Overrides the logo asset; `None` disables embedding.
    pub fn with_logo(mut self, logo_path: Option<PathBuf>) -> Self {
        self.logo_path = logo_path;
        self
    }

    pub fn with_geometry(mut self, geometry: CardGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_page_geometry(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }

    /// Produces the artifact bundle for one member: QR code, front and
    /// back faces, and the single-card PDF.
    pub fn assemble(
        &self,
        member: &Member,
        template: Option<&CardTemplate>,
    ) -> Result<CardBundle, CardError> {
        let qr_image = qr::encode(member, self.logo_path.as_deref(), &self.geometry)?;
        let front = compose::render_front(member, template, &qr_image, &self.geometry);
        let back = compose::render_back(template, &self.geometry);
        let pdf = pdf::single_card_pdf(&front, &back, member, &self.page)?;

        info!("assembled card bundle for {}", member.email);
        Ok(CardBundle {
            id: Uuid::new_v4(),
            member: member.clone(),
            template_id: template.map(|t| t.id),
            qr: qr_image,
            front,
            back,
            pdf,
            generated_at: Utc::now(),
        })
    }
}

/// Resolves batch selections into concrete members, once, at the batch
/// boundary. References that the lookup cannot satisfy are skipped with
/// a warning; inline records pass through unchanged.
pub fn resolve_selections<F>(selections: Vec<BatchSelection>, mut lookup: F) -> Vec<Member>
where
    F: FnMut(i64) -> Option<Member>,
{
    let mut members = Vec::with_capacity(selections.len());
    for selection in selections {
        match selection {
            BatchSelection::ByReference(id) => match lookup(id) {
                Some(member) => members.push(member),
                None => warn!("batch selection references unknown member {id}; skipped"),
            },
            BatchSelection::ByInlineData(member) => members.push(member),
        }
    }
    members
}
