use colored::*;
use serde_json::Value;

/// Announce a tool call before it runs.
pub fn display_tool_call(name: &str, arguments: &Value) {
    println!("{} {}, {} {}", "Tool:".cyan(), name, "Args:".cyan(), arguments);
}

/// Show an `Error: ` tool result so failures are visible even though the
/// run continues.
pub fn display_tool_error(name: &str, error: &str) {
    eprintln!("{}", format!("[{}] {}", name, error).yellow());
}

pub fn display_response(answer: &str) {
    println!("{} {}", "Response:".green().bold(), answer);
}

pub fn display_tools_used(names: &[String]) {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    println!("{} [{}]", "Tools used:".cyan(), quoted.join(", "));
}

pub fn display_trace_url(url: &str) {
    println!("{} {}", "Trace URL:".dimmed(), url);
}

pub fn display_error(error: &dyn std::fmt::Display) {
    eprintln!("{} {}", "Error:".red(), error);
}
