//! Cache lookup orchestration
//!
//! Drives the ordered fallback search: resolve each key template, probe
//! the store, and restore from the first hit. Exactly one candidate is
//! ever acted upon per run; what happens when that candidate fails to
//! download or extract is governed by [`HitFailurePolicy`].

use crate::context::EvaluationContext;
use crate::error::CachePullResult;
use crate::extract::{self, ArchiveFormat};
use crate::store::{ObjectId, ObjectStore};
use crate::template::KeyParser;
use crate::workspace;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do when the first matched cache fails to download or extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitFailurePolicy {
    /// Fail the run. A failure after a hit points at an environmental
    /// problem, and falling back would silently restore a staler cache.
    #[default]
    Stop,
    /// Keep probing lower-priority keys.
    Continue,
}

/// Terminal outcome of a restore run.
///
/// Failures travel on the error channel; a miss is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A cache was downloaded and extracted into the destination.
    Restored(PathBuf),
    /// No key matched any stored object.
    NotFound,
}

/// Orchestrates one restore run against an object store.
pub struct CacheRestorer<'a, S> {
    store: &'a S,
    parser: KeyParser<'a>,
    format: ArchiveFormat,
    policy: HitFailurePolicy,
}

impl<'a, S: ObjectStore> CacheRestorer<'a, S> {
    pub fn new(
        store: &'a S,
        context: &'a EvaluationContext,
        format: ArchiveFormat,
        policy: HitFailurePolicy,
    ) -> Self {
        Self {
            store,
            parser: KeyParser::new(context),
            format,
            policy,
        }
    }

    /// Restore the highest-priority matching cache into `dest`.
    ///
    /// Templates are evaluated lazily, in order; a template error
    /// anywhere in the chain fails the run rather than being skipped,
    /// since a typo would otherwise silently miss the intended entry
    /// forever.
    pub fn restore(&self, templates: &[String], dest: &Path) -> CachePullResult<RestoreOutcome> {
        workspace::with_scoped_temp_dir(|workdir| self.search(templates, dest, workdir))?
    }

    fn search(
        &self,
        templates: &[String],
        dest: &Path,
        workdir: &Path,
    ) -> CachePullResult<RestoreOutcome> {
        for template in templates {
            let key = self.parser.parse(template)?;
            info!("Checking if cache exists for key '{}'", key);

            let Some(object) = self.store.exists(&key)? else {
                debug!("No cache for key '{}'", key);
                continue;
            };

            info!("Cache found for key '{}' (object '{}'). Downloading...", key, object);
            match self.fetch_and_extract(&object, dest, workdir) {
                Ok(()) => return Ok(RestoreOutcome::Restored(dest.to_path_buf())),
                Err(e) => match self.policy {
                    HitFailurePolicy::Stop => return Err(e),
                    HitFailurePolicy::Continue => {
                        warn!("Restore from '{}' failed: {}. Trying next key.", object, e);
                    }
                },
            }
        }

        Ok(RestoreOutcome::NotFound)
    }

    fn fetch_and_extract(
        &self,
        object: &ObjectId,
        dest: &Path,
        workdir: &Path,
    ) -> CachePullResult<()> {
        let archive = workdir.join(archive_file_name(object, self.format));
        let size = self.store.download(object, &archive)?;
        info!("Download was successful, file size: {} bytes. Uncompressing...", size);

        extract::unarchive(self.format, &archive, dest)
    }
}

/// Deterministic local file name for a downloaded object.
///
/// Object keys may contain `/` and other separator bytes; everything
/// outside `[A-Za-z0-9._-]` maps to `-` so the name stays inside the
/// workspace directory.
fn archive_file_name(object: &ObjectId, format: ArchiveFormat) -> String {
    let stem: String = object
        .as_str()
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '-',
        })
        .collect();

    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CachePullError;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// In-memory store that records every probed key.
    struct MockStore {
        objects: HashMap<String, Vec<u8>>,
        fail_downloads: bool,
        probes: RefCell<Vec<String>>,
        downloads: RefCell<Vec<String>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                objects: HashMap::new(),
                fail_downloads: false,
                probes: RefCell::new(Vec::new()),
                downloads: RefCell::new(Vec::new()),
            }
        }

        fn with_object(mut self, key: &str, payload: Vec<u8>) -> Self {
            self.objects.insert(key.to_string(), payload);
            self
        }

        fn failing_downloads(mut self) -> Self {
            self.fail_downloads = true;
            self
        }

        fn probes(&self) -> Vec<String> {
            self.probes.borrow().clone()
        }

        fn downloads(&self) -> Vec<String> {
            self.downloads.borrow().clone()
        }
    }

    impl ObjectStore for MockStore {
        fn exists(&self, key: &str) -> CachePullResult<Option<ObjectId>> {
            self.probes.borrow_mut().push(key.to_string());
            let mut matches: Vec<&String> = self
                .objects
                .keys()
                .filter(|stored| stored.starts_with(key))
                .collect();
            matches.sort();
            Ok(matches.first().map(|stored| ObjectId::new(stored.as_str())))
        }

        fn download(&self, id: &ObjectId, dest: &Path) -> CachePullResult<u64> {
            self.downloads.borrow_mut().push(id.as_str().to_string());
            if self.fail_downloads {
                return Err(CachePullError::StoreStatus {
                    context: format!("downloading object '{}'", id),
                    status: 500,
                });
            }
            let payload = &self.objects[id.as_str()];
            std::fs::write(dest, payload).map_err(|e| CachePullError::io("writing object", e))?;
            Ok(payload.len() as u64)
        }
    }

    /// A tar.gz archive holding one `cached.txt` file.
    fn archive_payload() -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let contents = b"cached contents";
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "cached.txt", contents.as_slice())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn templates(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn restorer<'a>(
        store: &'a MockStore,
        context: &'a EvaluationContext,
        policy: HitFailurePolicy,
    ) -> CacheRestorer<'a, MockStore> {
        CacheRestorer::new(store, context, ArchiveFormat::TarGz, policy)
    }

    #[test]
    fn first_hit_wins_and_is_extracted() {
        let store = MockStore::new().with_object("release-v0", archive_payload());
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let outcome = restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["release-v1", "release-v0"]), dest.path())
            .unwrap();

        assert_eq!(outcome, RestoreOutcome::Restored(dest.path().to_path_buf()));
        assert_eq!(store.probes(), vec!["release-v1", "release-v0"]);
        assert_eq!(store.downloads(), vec!["release-v0"]);
        assert!(dest.path().join("cached.txt").is_file());
    }

    #[test]
    fn miss_on_all_keys_is_not_found() {
        let store = MockStore::new();
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let outcome = restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["only-key"]), dest.path())
            .unwrap();

        assert_eq!(outcome, RestoreOutcome::NotFound);
        assert!(store.downloads().is_empty());
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn prefix_match_reports_full_object_key() {
        let store = MockStore::new().with_object("deps-main-20240105", archive_payload());
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let outcome = restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["deps-main"]), dest.path())
            .unwrap();

        assert!(matches!(outcome, RestoreOutcome::Restored(_)));
        assert_eq!(store.downloads(), vec!["deps-main-20240105"]);
    }

    #[test]
    fn templates_resolve_before_probing() {
        let store = MockStore::new().with_object("deps-main", archive_payload());
        let context = EvaluationContext::new(Some("main".to_string()), None);
        let dest = TempDir::new().unwrap();

        restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["deps-{{ branch }}"]), dest.path())
            .unwrap();

        assert_eq!(store.probes(), vec!["deps-main"]);
    }

    #[test]
    fn template_error_fails_the_run_even_after_misses() {
        let store = MockStore::new();
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let err = restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["good-key", "bad-{{ nope }}"]), dest.path())
            .unwrap_err();

        assert!(matches!(err, CachePullError::UnknownFunction { .. }));
        assert_eq!(store.probes(), vec!["good-key"]);
    }

    #[test]
    fn download_failure_stops_without_further_probes() {
        let store = MockStore::new()
            .with_object("release-v1", archive_payload())
            .with_object("release-v0", archive_payload())
            .failing_downloads();
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let err = restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["release-v1", "release-v0"]), dest.path())
            .unwrap_err();

        assert!(matches!(err, CachePullError::StoreStatus { .. }));
        // release-v0 would also hit, but must never be probed.
        assert_eq!(store.probes(), vec!["release-v1"]);
        assert_eq!(store.downloads(), vec!["release-v1"]);
    }

    #[test]
    fn continue_policy_falls_back_after_download_failure() {
        let store = MockStore::new()
            .with_object("release-v1", archive_payload())
            .failing_downloads();
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let outcome = restorer(&store, &context, HitFailurePolicy::Continue)
            .restore(&templates(&["release-v1", "release-v0"]), dest.path())
            .unwrap();

        assert_eq!(outcome, RestoreOutcome::NotFound);
        assert_eq!(store.probes(), vec!["release-v1", "release-v0"]);
    }

    #[test]
    fn extraction_failure_stops_the_run() {
        let store = MockStore::new().with_object("release-v1", b"not an archive".to_vec());
        let context = EvaluationContext::default();
        let dest = TempDir::new().unwrap();

        let err = restorer(&store, &context, HitFailurePolicy::Stop)
            .restore(&templates(&["release-v1"]), dest.path())
            .unwrap_err();

        assert!(matches!(err, CachePullError::Extract { .. }));
    }

    #[test]
    fn outcome_classification_is_idempotent() {
        let store = MockStore::new().with_object("release-v0", archive_payload());
        let context = EvaluationContext::default();
        let keys = templates(&["release-v1", "release-v0"]);

        let first = {
            let dest = TempDir::new().unwrap();
            restorer(&store, &context, HitFailurePolicy::Stop)
                .restore(&keys, dest.path())
                .unwrap()
        };
        let second = {
            let dest = TempDir::new().unwrap();
            restorer(&store, &context, HitFailurePolicy::Stop)
                .restore(&keys, dest.path())
                .unwrap()
        };

        assert!(matches!(first, RestoreOutcome::Restored(_)));
        assert!(matches!(second, RestoreOutcome::Restored(_)));
    }

    #[test]
    fn archive_names_contain_no_separators() {
        let name = archive_file_name(&ObjectId::new("team/app deps:v1"), ArchiveFormat::Zip);
        assert_eq!(name, "team-app-deps-v1.zip");
    }
}
