use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};

use super::FixtureError;
use crate::config::StagingSettings;
use crate::registry::entities::Submission;
use crate::registry::value_objects::{Acronym, SubmissionId};

/// Copies versioned fixture files into place and parses staged submissions.
///
/// The supported version bound is a configuration constant: construction
/// fails unless a source file exists for every version up to the bound, so a
/// request past the bound can never silently stage the wrong data.
#[derive(Clone, Debug)]
pub struct FileStagingPipeline {
    settings: StagingSettings,
}

impl FileStagingPipeline {
    /// Validates the configured fixture sources and builds the pipeline.
    pub fn new(settings: StagingSettings) -> Result<Self, FixtureError> {
        if settings.supported_versions == 0 {
            return Err(FixtureError::Config(
                "staging requires at least one supported version".to_string(),
            ));
        }
        for version in 1..=settings.supported_versions {
            let path = settings.source_path(version);
            if !path.is_file() {
                return Err(FixtureError::MissingSource { version, path });
            }
        }
        Ok(Self { settings })
    }

    /// Returns the highest submission version the pipeline can stage.
    #[must_use]
    pub fn supported_versions(&self) -> u32 {
        self.settings.supported_versions
    }

    /// Resolves the fixture source file for a submission identifier.
    ///
    /// Fails fast when the identifier lies beyond the supported bound.
    pub fn source_for(&self, id: SubmissionId) -> Result<PathBuf, FixtureError> {
        if id.value() > self.settings.supported_versions {
            return Err(FixtureError::UnsupportedVersion {
                requested: id,
                supported: self.settings.supported_versions,
            });
        }
        Ok(self.settings.source_path(id.value()))
    }

    /// Copies the fixture source for a submission into its staged location.
    ///
    /// Staged copies live under `<staged_root>/<acronym>/<id>/` so repeated
    /// provisioning overwrites rather than accumulates.
    pub async fn stage(
        &self,
        acronym: &Acronym,
        id: SubmissionId,
    ) -> Result<PathBuf, FixtureError> {
        let source = self.source_for(id)?;
        let target_dir = self
            .settings
            .staged_root
            .join(acronym.as_str())
            .join(id.to_string());
        fs::create_dir_all(&target_dir)
            .await
            .map_err(|err| FixtureError::StagingIo {
                path: target_dir.clone(),
                source: err,
            })?;
        let target = target_dir.join(self.settings.source_file_name(id.value()));
        fs::copy(&source, &target)
            .await
            .map_err(|err| FixtureError::StagingIo {
                path: target.clone(),
                source: err,
            })?;
        debug!(acronym = %acronym, submission = %id, staged = %target.display(), "staged fixture file");
        Ok(target)
    }

    /// Parses the staged file and moves the submission to the parsed state.
    ///
    /// The caller must hold the freshly loaded owning aggregate and
    /// submission. On any failure the submission state is left untouched.
    pub async fn process(
        &self,
        acronym: &Acronym,
        submission: &mut Submission,
    ) -> Result<(), FixtureError> {
        let Some(path) = submission.staged_file() else {
            return Err(FixtureError::NothingStaged {
                acronym: acronym.clone(),
                id: submission.id(),
            });
        };
        let path = path.to_path_buf();
        let contents = fs::read_to_string(&path)
            .await
            .map_err(|err| FixtureError::StagedRead {
                path: path.clone(),
                source: err,
            })?;
        if contents.trim().is_empty() {
            return Err(FixtureError::Parse {
                path,
                reason: "staged file is empty".to_string(),
            });
        }
        submission.mark_parsed()?;
        info!(acronym = %acronym, submission = %submission.id(), "parsed staged submission");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use chrono::Utc;

    use super::FileStagingPipeline;
    use crate::config::StagingSettings;
    use crate::fixtures::FixtureError;
    use crate::registry::entities::{Contact, Submission};
    use crate::registry::value_objects::{Acronym, SubmissionId};

    fn unique_root(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock")
            .as_nanos();
        std::env::temp_dir().join(format!("ontology-fixtures-{tag}-{nanos}"))
    }

    fn settings_with_sources(root: &Path, versions: u32) -> StagingSettings {
        let settings = StagingSettings {
            source_dir: root.join("sources"),
            staged_root: root.join("staged"),
            file_stem: "tst_ontology".to_string(),
            supported_versions: versions,
        };
        fs::create_dir_all(&settings.source_dir).expect("source dir");
        for version in 1..=versions {
            fs::write(
                settings.source_path(version),
                format!("<Ontology version=\"{version}\"/>\n"),
            )
            .expect("source file");
        }
        settings
    }

    fn submission(id: u32) -> Submission {
        let contact = Contact::new("Sheila", "sheila@example.org").expect("valid contact");
        let mut submission = Submission::new(
            SubmissionId::new(id).expect("valid identifier"),
            "OWL",
            contact,
            Utc::now(),
        );
        submission.mark_uploaded().expect("upload");
        submission
    }

    #[test]
    fn construction_requires_every_supported_source() {
        let root = unique_root("missing-source");
        let mut settings = settings_with_sources(&root, 2);
        settings.supported_versions = 3;
        let err = FileStagingPipeline::new(settings).expect_err("version 3 has no file");
        assert!(matches!(err, FixtureError::MissingSource { version: 3, .. }));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn resolution_beyond_the_bound_fails() {
        let root = unique_root("bound");
        let pipeline =
            FileStagingPipeline::new(settings_with_sources(&root, 2)).expect("pipeline");
        let id = SubmissionId::new(3).expect("valid identifier");
        let err = pipeline.source_for(id).expect_err("beyond the bound");
        assert!(matches!(
            err,
            FixtureError::UnsupportedVersion { supported: 2, .. }
        ));
        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn staging_copies_the_versioned_source() {
        let root = unique_root("stage");
        let pipeline =
            FileStagingPipeline::new(settings_with_sources(&root, 2)).expect("pipeline");
        let acronym = Acronym::new("TST-ONT-0").expect("valid acronym");
        let id = SubmissionId::new(2).expect("valid identifier");

        let staged = pipeline.stage(&acronym, id).await.expect("staged");
        let contents = fs::read_to_string(&staged).expect("staged contents");
        assert!(contents.contains("version=\"2\""));
        assert!(staged.starts_with(root.join("staged").join("TST-ONT-0")));
        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn processing_parses_and_transitions() {
        let root = unique_root("process");
        let pipeline =
            FileStagingPipeline::new(settings_with_sources(&root, 2)).expect("pipeline");
        let acronym = Acronym::new("TST-ONT-0").expect("valid acronym");
        let id = SubmissionId::new(2).expect("valid identifier");

        let mut submission = submission(2);
        let staged = pipeline.stage(&acronym, id).await.expect("staged");
        submission.set_staged_file(staged);
        pipeline
            .process(&acronym, &mut submission)
            .await
            .expect("processed");
        assert_eq!(
            submission.state(),
            crate::registry::entities::SubmissionState::Parsed
        );
        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn processing_an_empty_file_leaves_the_submission_uploaded() {
        let root = unique_root("empty");
        let pipeline =
            FileStagingPipeline::new(settings_with_sources(&root, 1)).expect("pipeline");
        let acronym = Acronym::new("TST-ONT-0").expect("valid acronym");

        let empty = root.join("staged-empty.owl");
        fs::write(&empty, "").expect("empty file");
        let mut submission = submission(1);
        submission.set_staged_file(&empty);

        let err = pipeline
            .process(&acronym, &mut submission)
            .await
            .expect_err("empty file cannot parse");
        assert!(matches!(err, FixtureError::Parse { .. }));
        assert_eq!(
            submission.state(),
            crate::registry::entities::SubmissionState::Uploaded
        );
        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn processing_without_a_staged_file_is_rejected() {
        let root = unique_root("nothing-staged");
        let pipeline =
            FileStagingPipeline::new(settings_with_sources(&root, 1)).expect("pipeline");
        let acronym = Acronym::new("TST-ONT-0").expect("valid acronym");
        let mut submission = submission(1);

        let err = pipeline
            .process(&acronym, &mut submission)
            .await
            .expect_err("nothing staged");
        assert!(matches!(err, FixtureError::NothingStaged { .. }));
        let _ = fs::remove_dir_all(root);
    }
}
