#![cfg_attr(test, allow(unused_crate_dependencies))]

use std::sync::Arc;

use args::Command;
use clap::crate_version;
use crud_schema::{Engine, MemoryStorage, Registry};
use tokio::runtime;

mod args;

const THREAD_NAME: &str = "crud-schema";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    args.init_logging();

    let crate_version = crate_version!();
    tracing::debug!("crud-schema {crate_version}");

    let schema = args.schema();
    let registry = Registry::from_source(&schema.source(), schema.config()?)?;

    match &args.command {
        Command::Print(_) => print!("{}", registry.sdl()),
        Command::Execute(execute) => {
            let request = execute.request()?;

            let runtime = runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name(THREAD_NAME)
                .build()?;

            let response = runtime.block_on(async move {
                let storage = MemoryStorage::new(Arc::clone(registry.graph()), registry.config().naming.id_field.clone());
                let engine = Engine::new(Arc::new(registry), Arc::new(storage));

                engine.execute(request).await
            });

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
