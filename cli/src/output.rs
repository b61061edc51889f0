use anyhow::Result;
use imds_core::Node;
use imds_core::docs::render_paths;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;

/// Pretty JSON with four-space indentation, followed by a newline.
pub(crate) fn write_json<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    writeln!(writer)?;
    Ok(())
}

pub(crate) fn print_json<T>(value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, value)?;
    stdout.flush()?;
    Ok(())
}

/// Raw body as text, newline terminated.
pub(crate) fn print_text(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}

pub(crate) fn print_paths(docs: &Node) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "Possible Paths: \n{}", render_paths(docs, 2))?;
    Ok(())
}

pub(crate) fn print_suggestions(suggestions: &[String]) {
    if suggestions.is_empty() {
        return;
    }
    let styled = supports_color::on_cached(supports_color::Stream::Stderr).is_some();
    if styled {
        eprintln!("{}", "Did you mean:".bold());
    } else {
        eprintln!("Did you mean:");
    }
    for suggestion in suggestions {
        if styled {
            eprintln!("  {}", suggestion.cyan());
        } else {
            eprintln!("  {suggestion}");
        }
    }
}
