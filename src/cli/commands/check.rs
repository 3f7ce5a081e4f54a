//! Check command - probe every restore key, download nothing

use crate::cli::args::CheckArgs;
use crate::error::CachePullResult;
use crate::keys::parse_restore_keys;
use crate::store::s3::S3Store;
use crate::store::ObjectStore;
use crate::template::KeyParser;
use crate::ui::{context::UiContext, output, progress::TaskSpinner};
use serde::Serialize;

#[derive(Serialize)]
struct ProbeResult {
    template: String,
    key: String,
    hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> CachePullResult<()> {
    let ctx = UiContext::detect();
    let context = args.context.to_context();
    let parser = KeyParser::new(&context);
    let store = S3Store::new(args.store.to_config());

    let mut results = Vec::new();
    for template in parse_restore_keys(&args.restore_keys) {
        let key = parser.parse(&template)?;

        // Keep stdout clean for --json; probe lines are presentation only.
        let mut spinner = (!args.json).then(|| TaskSpinner::new(&ctx));
        if let Some(spinner) = spinner.as_mut() {
            spinner.start(&format!("Probing '{}'", key));
        }
        let object = store.exists(&key)?;
        if let Some(spinner) = spinner.as_mut() {
            match &object {
                Some(id) => spinner.stop(&format!("{} -> {}", key, id)),
                None => spinner.stop_dim(&format!("{} (miss)", key)),
            }
        }

        results.push(ProbeResult {
            template,
            hit: object.is_some(),
            object: object.map(|id| id.as_str().to_string()),
            key,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let hits = results.iter().filter(|r| r.hit).count();
    if hits > 0 {
        output::outro_success(&ctx, &format!("{} of {} key(s) hit", hits, results.len()));
    } else {
        output::outro_warn(&ctx, "No key matched a stored cache.");
    }

    Ok(())
}
