mod output;

pub use output::{
    display_error, display_response, display_tool_call, display_tool_error, display_tools_used,
    display_trace_url,
};
