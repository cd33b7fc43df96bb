//! Collision-free names within one archive.

use std::collections::HashSet;

/// Inserts ` (n)` before the extension: `report.pdf` → `report (2).pdf`.
/// The extension starts at the last dot; a name without a dot (or only a
/// leading dot) gets the suffix appended.
pub fn disambiguate(file_name: &str, n: usize) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &file_name[..dot], n, &file_name[dot..]),
        _ => format!("{} ({})", file_name, n),
    }
}

/// Entry paths already claimed in one archive, files and directories alike.
///
/// Owned by the single collector that assembles the archive, so each
/// check-and-claim is atomic with respect to every other claim. A file never
/// takes a path that is already a directory, and a directory segment that
/// clashes with an earlier file is renamed `name (n)`, so the archive always
/// extracts.
#[derive(Debug, Default)]
pub struct NameRegistry {
    files: HashSet<String>,
    dirs: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `path`, or the first free `name (n).ext` variant in the same directory.
    pub fn claim(&mut self, path: &str) -> String {
        let (dir, file) = match path.rfind('/') {
            Some(i) => (&path[..i], &path[i + 1..]),
            None => ("", path),
        };
        let dir = self.claim_dir(dir);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut candidate = format!("{}{}", prefix, file);
        let mut n = 0;
        while self.files.contains(&candidate) || self.dirs.contains(&candidate) {
            n += 1;
            candidate = format!("{}{}", prefix, disambiguate(file, n));
        }
        self.files.insert(candidate.clone());
        candidate
    }

    /// Registers every prefix of `dir`, renaming segments that are taken by files.
    fn claim_dir(&mut self, dir: &str) -> String {
        let mut out = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            let parent = if out.is_empty() {
                String::new()
            } else {
                format!("{}/", out)
            };
            let mut candidate = format!("{}{}", parent, segment);
            let mut n = 0;
            while self.files.contains(&candidate) {
                n += 1;
                candidate = format!("{}{} ({})", parent, segment, n);
            }
            self.dirs.insert(candidate.clone());
            out = candidate;
        }
        out
    }
}
