use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::Result;

/// Maps a group signature (see [`crate::motif`]) to a motif class id, or
/// leaves it unassigned.
///
/// Content-addressed by `(level, directed)` externally: a table only ever
/// describes one combination, and the caller picks the right file for the
/// graph and the enumeration level in use.
#[derive(Debug, Default, Clone)]
pub struct VariationTable {
    classes: HashMap<u32, u32>,
}

impl VariationTable {
    /// Parses a two-column whitespace-separated text file: signature, then
    /// either a motif class id or any token that doesn't parse as one
    /// (recorded as unassigned for that signature). A line that fails to
    /// yield two tokens ends the scan — mirroring a `stream >> a >> b` read
    /// loop, which stops at the first failed extraction rather than skipping
    /// ahead to the next line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);

        let mut classes = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_ascii_whitespace();
            let (Some(signature), Some(class)) = (tokens.next(), tokens.next()) else {
                break;
            };

            let Ok(signature) = signature.parse::<u32>() else {
                break;
            };

            if let Ok(class) = class.parse::<u32>() {
                classes.insert(signature, class);
            }
        }

        Ok(VariationTable { classes })
    }

    /// Builds a table directly from `(signature, class)` pairs, for tests and
    /// for callers that already have the mapping in memory.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, u32)>) -> Self {
        VariationTable {
            classes: entries.into_iter().collect(),
        }
    }

    /// The motif class assigned to `signature`, or `None` if unassigned.
    pub fn classify(&self, signature: u32) -> Option<u32> {
        self.classes.get(&signature).copied()
    }

    /// Every distinct motif class id that appears in the table.
    pub fn all_motifs(&self) -> Vec<u32> {
        let mut motifs: Vec<u32> = self.classes.values().copied().collect();
        motifs.sort_unstable();
        motifs.dedup();
        motifs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classifies_numeric_entries() {
        let table = VariationTable::from_entries([(0, 1), (3, 2)]);
        assert_eq!(table.classify(0), Some(1));
        assert_eq!(table.classify(3), Some(2));
        assert_eq!(table.classify(7), None);
    }

    #[test]
    fn all_motifs_is_sorted_and_deduplicated() {
        let table = VariationTable::from_entries([(0, 2), (1, 1), (2, 2)]);
        assert_eq!(table.all_motifs(), vec![1, 2]);
    }

    #[test]
    fn load_treats_non_numeric_class_as_unassigned() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 1").unwrap();
        writeln!(file, "1 unassigned").unwrap();
        writeln!(file, "2 2").unwrap();

        let table = VariationTable::load(file.path()).unwrap();
        assert_eq!(table.classify(0), Some(1));
        assert_eq!(table.classify(1), None);
        assert_eq!(table.classify(2), Some(2));
    }

    #[test]
    fn load_stops_at_first_short_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 1").unwrap();
        writeln!(file, "oops").unwrap();
        writeln!(file, "2 2").unwrap();

        let table = VariationTable::load(file.path()).unwrap();
        assert_eq!(table.classify(0), Some(1));
        assert_eq!(table.classify(2), None);
    }
}
