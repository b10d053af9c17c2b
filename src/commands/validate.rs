//! `wasctl validate` - build every declaration without contacting WebSphere

use anyhow::{Result, bail};
use declarative::Resource;
use serde::Serialize;
use wskit::JdbcProvider;

use super::{RejectedJson, Session, print_json, rejected_json};
use crate::Context;
use crate::cli::ValidateArgs;
use crate::ui;

#[derive(Serialize)]
struct ValidateJson<'a> {
    source: String,
    providers: &'a [JdbcProvider],
    rejected: Vec<RejectedJson>,
}

pub fn run(ctx: &Context, args: &ValidateArgs) -> Result<()> {
    let session = Session::load(ctx)?;
    let batch = &session.batch;

    if args.json {
        print_json(&ValidateJson {
            source: session.source_display(),
            providers: &batch.providers,
            rejected: rejected_json(batch),
        })?;
    } else {
        ui::header(&format!("Declarations in {}", session.source_display()));
        for provider in &batch.providers {
            ui::success(&format!("{} ({})", provider.description(), provider.ensure));
            if ctx.verbose > 0 {
                for (key, value) in provider.display_attributes() {
                    ui::kv(key, &value);
                }
            }
        }
        session.report_rejected();
        if batch.is_empty() {
            ui::info("No declarations");
        }
    }

    if !batch.is_valid() {
        bail!("{} invalid", ui::count(batch.rejected.len(), "declaration"));
    }
    Ok(())
}
