//! PDF documents: training certificates and presencial attendance sheets.

mod canvas;

mod certificate;
pub use certificate::{CertificateDocument, certificate_pdf};

mod error;
pub use error::{DocumentError, DocumentResult};

mod planilla;
pub use planilla::{DEFAULT_ROWS, MAX_ROWS, PlanillaDocument, planilla_pdf};
