//! Campaign list preparation: turn raw prospect exports into CRM-importable
//! rows, split them into randomized A/B wings, and diff prospects against
//! the people who must not be messaged again.

pub mod diff;
pub mod io;
pub mod prospects;
pub mod wings;

pub use diff::{Blacklist, DiffSummary};
pub use prospects::{CrmProspect, SladerRecord};
pub use wings::{shuffle_and_split, split_into_wings, WingFile};
