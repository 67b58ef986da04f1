//! # quotecard
//!
//! Renders Trenstand quote cards from editor scripts.

use card_cli::{run_render, CliArgs, Command};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,card_core=debug,card_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // Use JSON format when piping into log collectors (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Render(render) => {
            tracing::info!(
                "Rendering {} into {}",
                render.script.display(),
                render.out_dir.display()
            );
            let exports = run_render(&render).await?;
            for export in &exports {
                println!("{}", render.out_dir.join(&export.file_name).display());
            }
            tracing::info!("Wrote {} card(s)", exports.len());
        }
    }

    Ok(())
}
