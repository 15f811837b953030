use crate::error::{MiphyError, Result};
use niffler::get_reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a whole text file, decompressing gzip, bzip2 or xz input.
pub fn read_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let (inner_reader, _compression) = get_reader(Box::new(file))
        .map_err(|e| MiphyError::runtime(format!("could not open {}: {}", path.display(), e)))?;
    let mut text = String::new();
    BufReader::new(inner_reader).read_to_string(&mut text)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_plain_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "((a,b),c);").unwrap();
        assert_eq!(read_text(file.path()).unwrap(), "((a,b),c);");
    }
}
