//! Release notes: the record of a release and its markdown rendering.
//!
//! A release is described by [ReleaseNotesData]: who committed what
//! ([ContributionSet]), who those people are ([ContributorSet]) and which
//! user facing changes went in ([Improvement]). [DefaultFormatter] turns it
//! into a markdown section, grouping improvements under the captions of
//! their labels.

pub mod format;
pub mod model;

pub use self::format::{DefaultFormatter, LabelCaption, LabelCaptions, NO_IMPROVEMENTS};
pub use self::model::{
    Contribution, ContributionSet, Contributor, ContributorSet, Improvement, ReleaseNotesData,
};
