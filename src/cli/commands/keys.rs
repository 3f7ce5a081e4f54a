//! Keys command - resolve templates without touching the store

use crate::cli::args::KeysArgs;
use crate::error::CachePullResult;
use crate::keys::parse_restore_keys;
use crate::template::KeyParser;
use serde::Serialize;

#[derive(Serialize)]
struct ResolvedKey {
    template: String,
    key: String,
}

/// Execute the keys command
pub fn execute(args: KeysArgs) -> CachePullResult<()> {
    let context = args.context.to_context();
    let parser = KeyParser::new(&context);

    let resolved = parse_restore_keys(&args.restore_keys)
        .into_iter()
        .map(|template| {
            let key = parser.parse(&template)?;
            Ok(ResolvedKey { template, key })
        })
        .collect::<CachePullResult<Vec<_>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        for entry in &resolved {
            println!("{}", entry.key);
        }
    }

    Ok(())
}
