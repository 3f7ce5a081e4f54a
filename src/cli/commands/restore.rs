//! Restore command - pull the first matching cache archive

use crate::cli::args::RestoreArgs;
use crate::error::CachePullResult;
use crate::extract::ArchiveFormat;
use crate::keys::parse_restore_keys;
use crate::restore::{CacheRestorer, RestoreOutcome};
use crate::store::s3::S3Store;
use crate::ui::{context::UiContext, output};
use tracing::debug;

/// Execute the restore command
pub fn execute(args: RestoreArgs) -> CachePullResult<()> {
    let ctx = UiContext::detect();
    let context = args.context.to_context();
    let templates = parse_restore_keys(&args.restore_keys);
    let format = ArchiveFormat::from_extension(&args.archive_ext)?;
    debug!("Restoring with {} candidate key(s)", templates.len());

    let store = S3Store::new(args.store.to_config());
    let restorer = CacheRestorer::new(&store, &context, format, args.on_hit_failure.into());

    match restorer.restore(&templates, &args.path)? {
        RestoreOutcome::Restored(path) => {
            output::outro_success(&ctx, &format!("Cache restored to {}", path.display()));
        }
        RestoreOutcome::NotFound => {
            // A miss is a normal outcome; the step exits cleanly.
            output::outro_warn(&ctx, "Cache not found.");
        }
    }

    Ok(())
}
