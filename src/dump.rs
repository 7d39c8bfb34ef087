use byte_slice_cast::AsByteSlice;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Writes a raw packed feature vector to `path`: no header, no length
/// prefix, just the bytes of `values` back to back. `append` controls
/// whether the write opens in truncate-and-create mode or append mode, the
/// same choice the original per-feature dump files made so that successive
/// computations accumulate into one file per feature kind.
pub fn dump_values<T: AsByteSlice>(path: impl AsRef<Path>, values: &[T], append: bool) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    file.write_all(values.as_byte_slice())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_replaces_prior_contents() {
        let file = tempfile::NamedTempFile::new().unwrap();
        dump_values(file.path(), &[1u32, 2, 3], false).unwrap();
        dump_values(file.path(), &[9u32], false).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(bytes, 9u32.to_ne_bytes());
    }

    #[test]
    fn append_accumulates_across_calls() {
        let file = tempfile::NamedTempFile::new().unwrap();
        dump_values(file.path(), &[1.0f32, 2.0], true).unwrap();
        dump_values(file.path(), &[3.0f32], true).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(bytes.len(), 3 * std::mem::size_of::<f32>());
    }
}
