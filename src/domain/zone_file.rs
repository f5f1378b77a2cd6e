//! # Zone text files
//!
//! A zone file holds a flat list of `lon,lat` vertices separated by commas and/or
//! newlines, for example
//!
//! ```text
//! -41,60,-41,61
//! -40,61,-40,60
//! ```
//!
//! The zone name is the file stem (`Z1.txt` → `Z1`). Empty tokens are ignored, so
//! trailing separators and blank lines are accepted.
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::{constants::Degree, domain::zone::Zone, AisGraphError};

/// Parse the vertex list of a zone file.
///
/// Return
/// ----------
/// * `(lon, lat)` vertex columns, or [`AisGraphError::ZoneFileParse`] for a token
///   that is not a number or an odd number of values.
pub fn parse_vertices(
    content: &str,
    path: &Utf8Path,
) -> Result<(Vec<Degree>, Vec<Degree>), AisGraphError> {
    let parse_error = |reason: String| AisGraphError::ZoneFileParse {
        path: path.to_string(),
        reason,
    };

    let values = content
        .split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|e| parse_error(format!("'{tok}': {e}")))
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if values.len() % 2 != 0 {
        return Err(parse_error(format!(
            "odd number of coordinate values ({})",
            values.len()
        )));
    }

    Ok(values.chunks_exact(2).map(|c| (c[0], c[1])).unzip())
}

impl Zone {
    /// Load a zone from a text file, named after the file stem.
    pub fn from_txt(path: &Utf8Path) -> Result<Zone, AisGraphError> {
        let name = path.file_stem().ok_or_else(|| AisGraphError::ZoneFileParse {
            path: path.to_string(),
            reason: "no file name".into(),
        })?;
        let content = std::fs::read_to_string(path)?;
        let (x, y) = parse_vertices(&content, path)?;
        Zone::from_coords(name, &x, &y)
    }
}

/// Load every `*.txt` zone file of `dir`, in file name order.
pub fn load_zones_dir(dir: &Utf8Path) -> Result<Vec<Zone>, AisGraphError> {
    let mut paths = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.path().extension() == Some("txt") && entry.file_type()?.is_file() {
            paths.push(entry.path().to_path_buf());
        }
    }
    paths.sort();

    debug!("loading {} zone file(s) from {dir}", paths.len());
    paths.iter().map(|p: &Utf8PathBuf| Zone::from_txt(p)).collect()
}

#[cfg(test)]
mod zone_file_test {
    use super::*;
    use crate::domain::Domain;
    use std::fs;

    #[test]
    fn test_parse_vertices() {
        let path = Utf8Path::new("Z1.txt");
        let (x, y) = parse_vertices("-41,60,-41,61\n-40,61,\n-40,60\n\n", path).unwrap();
        assert_eq!(x, vec![-41.0, -41.0, -40.0, -40.0]);
        assert_eq!(y, vec![60.0, 61.0, 61.0, 60.0]);

        assert!(matches!(
            parse_vertices("1,2,3", path),
            Err(AisGraphError::ZoneFileParse { .. })
        ));
        assert!(matches!(
            parse_vertices("1,north", path),
            Err(AisGraphError::ZoneFileParse { .. })
        ));
    }

    #[test]
    fn test_load_zones_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("harbour.txt"), "-41,60,-41,61,-40,61,-40,60").unwrap();
        fs::write(root.join("approach.txt"), "0,0\n0,1\n1,1\n1,0\n").unwrap();
        fs::write(root.join("notes.md"), "not a zone").unwrap();

        let zones = load_zones_dir(root).unwrap();
        let names: Vec<&str> = zones.iter().map(Zone::name).collect();
        assert_eq!(names, vec!["approach", "harbour"]);
        assert!(zones[1].contains(-40.5, 60.5));
    }

    #[test]
    fn test_domain_from_txt_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("harbour.txt"), "-41,60,-41,61,-40,61,-40,60").unwrap();
        fs::write(root.join("approach.txt"), "0,0\n0,1\n1,1\n1,0\n").unwrap();

        let domain = Domain::from_txt_dir("coast", root).unwrap();
        assert_eq!(domain.name(), "coast");
        assert_eq!(domain.len(), 2);
        assert_eq!(domain.point_in_polygon(-40.5, 60.5), "harbour");
        assert_eq!(domain.point_in_polygon(0.5, 0.5), "approach");

        fs::write(root.join("drift.txt"), "170,0,170,1,190,1,190,0").unwrap();
        assert!(matches!(
            Domain::from_txt_dir("coast", root),
            Err(AisGraphError::AntimeridianSpan { .. })
        ));
    }
}
