use clap::Parser;
use std::process;

use toolcall::cli::Args;
use toolcall::config::Config;
use toolcall::controller::{self, AppContext};
use toolcall::ui::{display_error, display_response, display_tools_used, display_trace_url};

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already be set.
    dotenv::dotenv().ok();

    let args = Args::parse();
    let question = args.question();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            display_error(&e);
            process::exit(1);
        }
    };

    let ctx = match AppContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            display_error(&e);
            process::exit(1);
        }
    };

    let outcome = controller::run(&ctx, &question).await;

    // Traces go out whether or not the run produced an answer.
    ctx.langfuse.flush().await;

    match outcome {
        Ok(outcome) => {
            display_response(&outcome.answer);
            if !outcome.tools_used.is_empty() {
                display_tools_used(&outcome.tools_used);
            }
            if let Some(url) = ctx.langfuse.trace_url(&outcome.trace) {
                display_trace_url(&url);
            }
        }
        Err(e) => {
            display_error(&e);
            process::exit(1);
        }
    }
}
