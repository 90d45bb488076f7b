use clap::Parser;

pub const DEFAULT_QUESTION: &str = "Calculates 357 * 3?";

#[derive(Parser, Debug)]
#[command(name = "toolcall")]
#[command(
    about = "Ask a chat model a question, letting it call a calculator and a USD/BRL rate lookup",
    long_about = None
)]
pub struct Args {
    #[arg(short = 'm', long = "model", help = "Model to use (default: llama3.2)")]
    pub model: Option<String>,

    #[arg(
        long = "api-endpoint",
        help = "Model API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(
        long = "max-rounds",
        help = "Maximum number of tool-calling rounds before the model must answer"
    )]
    pub max_rounds: Option<u32>,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic output to stderr")]
    pub verbose: bool,

    #[arg(long = "no-trace", help = "Do not send traces to Langfuse")]
    pub no_trace: bool,

    #[arg(help = "Question to send to the model")]
    pub question: Vec<String>,
}

impl Args {
    pub fn question(&self) -> String {
        let joined = self.question.join(" ");
        if joined.trim().is_empty() {
            DEFAULT_QUESTION.to_string()
        } else {
            joined
        }
    }
}
