//! `encoding` command: look up an encoding name.

use crate::encoding::Charset;

/// Print the canonical name of the encoding `name` refers to.
///
/// # Errors
///
/// Returns an error if the encoding is not supported.
pub fn run(name: &str) -> Result<(), String> {
    println!("{}", canonical_name(name)?);
    Ok(())
}

fn canonical_name(name: &str) -> Result<&'static str, String> {
    Charset::resolve(name).map(Charset::name).map_err(|e| e.to_string())
}
