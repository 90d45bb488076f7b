mod langfuse;

pub use langfuse::{Langfuse, Observation, TraceHandle};
