use crate::cli::OutputFormat;

pub fn default_format() -> OutputFormat {
    OutputFormat::Text
}
