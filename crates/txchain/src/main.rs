use clap::Parser;

#[tokio::main]
async fn main() {
    let args = txchain::arguments::Arguments::parse();
    observe::tracing::initialize(&args.observe_config());
    tracing::info!("running txchain with validated arguments:\n{}", args);
    if let Err(err) = txchain::run(args).await {
        tracing::error!(?err, "chain failed");
        std::process::exit(1);
    }
}
