//! ASCII mesh file reader.
//!
//! Line-oriented format; `%` starts a comment and blank lines are skipped:
//!
//! ```text
//! dimension = 2
//! mode = ASCII
//! points = 4
//! 0.0 0.0 0.0
//! 1.0 0.0 0.0
//! 1.0 1.0 0.0
//! 0.0 1.0 0.0
//! elements = 1
//! 9 0 1 2 3            % <vtk code> <node>...
//! boundaries = 1
//! name = wall
//! faces = 4
//! 3 0 1
//! 3 1 2
//! 3 2 3
//! 3 3 0
//! ```
//!
//! ## Example
//! ```no_run
//! use fvm_rs::mesh::read_mesh;
//! use std::path::Path;
//!
//! let mesh = read_mesh(Path::new("channel.mesh")).expect("Failed to read mesh");
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use glam::DVec3;

use super::{Connectivity, Mesh, MeshBuilder, MeshError};
use crate::geometry::VtkCellType;

/// Read and build a mesh from a file.
pub fn read_mesh(path: &Path) -> Result<Mesh, MeshError> {
    let text = fs::read_to_string(path)?;
    parse_mesh(&text)
}

/// Parse and build a mesh from text.
pub fn parse_mesh(text: &str) -> Result<Mesh, MeshError> {
    let mut lines = ContentLines::new(text);

    let (line, dimension) = lines.keyed::<usize>("dimension")?;
    if !(1..=3).contains(&dimension) {
        return Err(parse_error(line, format!("invalid dimension {}", dimension)));
    }
    let (line, mode) = lines.keyed::<String>("mode")?;
    if !mode.eq_ignore_ascii_case("ascii") {
        return Err(parse_error(line, format!("unsupported mode '{}'", mode)));
    }

    let mut builder = MeshBuilder::new(dimension);

    let (_, n_points) = lines.keyed::<usize>("points")?;
    for _ in 0..n_points {
        let (line, content) = lines.next_required("point coordinates")?;
        let coords = parse_numbers::<f64>(line, content)?;
        if coords.is_empty() || coords.len() > 3 {
            return Err(parse_error(
                line,
                format!("expected 1 to 3 coordinates, found {}", coords.len()),
            ));
        }
        let mut p = [0.0; 3];
        p[..coords.len()].copy_from_slice(&coords);
        builder.add_node(DVec3::from_array(p));
    }

    let (_, n_elements) = lines.keyed::<usize>("elements")?;
    for _ in 0..n_elements {
        let element = lines.connectivity("element")?;
        builder.add_cell(element.vtk_type, element.nodes);
    }

    let (_, n_boundaries) = lines.keyed::<usize>("boundaries")?;
    for _ in 0..n_boundaries {
        let (_, name) = lines.keyed::<String>("name")?;
        let (_, n_faces) = lines.keyed::<usize>("faces")?;
        let faces = (0..n_faces)
            .map(|_| lines.connectivity("boundary face"))
            .collect::<Result<Vec<_>, _>>()?;
        builder.add_boundary(name, faces);
    }

    if let Some((line, content)) = lines.next() {
        return Err(parse_error(line, format!("unexpected trailing content '{}'", content)));
    }

    builder.build()
}

fn parse_error(line: usize, message: impl Into<String>) -> MeshError {
    MeshError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_numbers<T: FromStr>(line: usize, content: &str) -> Result<Vec<T>, MeshError> {
    content
        .split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| parse_error(line, format!("invalid number '{}'", token)))
        })
        .collect()
}

/// Non-empty, comment-stripped lines with 1-based line numbers.
struct ContentLines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> ContentLines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
            last_line: 0,
        }
    }

    fn next_required(&mut self, what: &str) -> Result<(usize, &'a str), MeshError> {
        let last = self.last_line;
        self.next()
            .ok_or_else(|| parse_error(last + 1, format!("unexpected end of file, expected {}", what)))
    }

    /// `key = value` line with the given key.
    fn keyed<T: FromStr>(&mut self, key: &str) -> Result<(usize, T), MeshError> {
        let (line, content) = self.next_required(key)?;
        let (found, value) = content
            .split_once('=')
            .ok_or_else(|| parse_error(line, format!("expected '{} = ...'", key)))?;
        if found.trim() != key {
            return Err(parse_error(
                line,
                format!("expected '{}', found '{}'", key, found.trim()),
            ));
        }
        let value = value.trim();
        let parsed = value
            .parse::<T>()
            .map_err(|_| parse_error(line, format!("invalid value '{}' for '{}'", value, key)))?;
        Ok((line, parsed))
    }

    /// `<vtk code> <node>...` line.
    fn connectivity(&mut self, what: &str) -> Result<Connectivity, MeshError> {
        let (line, content) = self.next_required(what)?;
        let values = parse_numbers::<i64>(line, content)?;
        let (&code, nodes) = values
            .split_first()
            .ok_or_else(|| parse_error(line, format!("empty {}", what)))?;
        let vtk_type = i32::try_from(code)
            .ok()
            .and_then(|c| VtkCellType::try_from(c).ok())
            .ok_or_else(|| parse_error(line, format!("unsupported shape code {}", code)))?;
        let nodes = nodes
            .iter()
            .map(|&n| {
                usize::try_from(n).map_err(|_| parse_error(line, format!("negative node {}", n)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        vtk_type
            .validate_node_count(nodes.len())
            .map_err(|e| parse_error(line, e.to_string()))?;
        Ok(Connectivity::new(vtk_type, nodes))
    }
}

impl<'a> Iterator for ContentLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for (i, raw) in self.inner.by_ref() {
            self.last_line = i + 1;
            let content = raw.split('%').next().unwrap_or("").trim();
            if !content.is_empty() {
                return Some((i + 1, content));
            }
        }
        None
    }
}
