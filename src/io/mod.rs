//! Edge-list I/O for the CLI frontend.
//!
//! One element per line:
//!
//! ```text
//! # from  to  forward  [reverse]
//! 1 2 5
//! 2, 3, 10, 1000
//! ```
//!
//! Fields are separated by whitespace and/or commas; `#` starts a comment. A
//! missing reverse resistance means a direction-independent element. Output
//! is one `from,to,forward,reverse` line per edge.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::circuit::{Edge, NodeId};
use crate::error::{NetReduceError, Result};

/// Parse an edge list.
pub fn read_edge_list(reader: impl BufRead) -> Result<Vec<Edge>> {
    let mut edges = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| NetReduceError::parse(line_no, e.to_string()))?;
        if let Some(edge) = parse_line(&line, line_no)? {
            edges.push(edge);
        }
    }
    Ok(edges)
}

/// Read an edge list from a file, or from stdin when `path` is `-`.
pub fn read_edge_file(path: &Path) -> Result<Vec<Edge>> {
    if path.as_os_str() == "-" {
        return read_edge_list(io::stdin().lock());
    }
    let file = std::fs::File::open(path).map_err(|e| NetReduceError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    read_edge_list(io::BufReader::new(file))
}

fn parse_line(line: &str, line_no: usize) -> Result<Option<Edge>> {
    let content = line.split('#').next().unwrap_or("");
    let fields: Vec<&str> = content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();

    match fields.len() {
        0 => return Ok(None),
        3 | 4 => {}
        n => {
            return Err(NetReduceError::parse(
                line_no,
                format!("expected 3 or 4 fields, found {n}"),
            ))
        }
    }

    let node = |s: &str| {
        s.parse::<i64>()
            .map(NodeId)
            .map_err(|_| NetReduceError::parse(line_no, format!("invalid node '{s}'")))
    };
    let value = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| NetReduceError::parse(line_no, format!("invalid resistance '{s}'")))
    };

    let from = node(fields[0])?;
    let to = node(fields[1])?;
    let forward = value(fields[2])?;
    let reverse = match fields.get(3) {
        Some(s) => value(*s)?,
        None => forward,
    };

    Edge::new(from, to, forward, reverse)
        .map(Some)
        .map_err(|e| NetReduceError::parse(line_no, e.to_string()))
}

/// Write edges as `from,to,forward,reverse` lines.
pub fn write_edge_list(mut writer: impl Write, edges: &[Edge]) -> Result<()> {
    for edge in edges {
        writeln!(
            writer,
            "{},{},{},{}",
            edge.from.0, edge.to.0, edge.forward, edge.reverse
        )
        .map_err(|e| NetReduceError::OutputError {
            message: e.to_string(),
        })?;
    }
    writer.flush().map_err(|e| NetReduceError::OutputError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mixed_separators() {
        let input = "# header\n1 2 5\n2, 3, 10, 1000  # diode\n\n";
        let edges = read_edge_list(input.as_bytes()).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to_tuple(), (1, 2, 5.0, 5.0));
        assert_eq!(edges[1].to_tuple(), (2, 3, 10.0, 1000.0));
    }

    #[test]
    fn test_read_reports_line() {
        let err = read_edge_list("1 2 5\n1 x 5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, NetReduceError::ParseError { line: 2, .. }));

        let err = read_edge_list("1 2 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, NetReduceError::ParseError { line: 1, .. }));

        let err = read_edge_list("1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, NetReduceError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_write() {
        let edges = [Edge::diode(NodeId(1), NodeId(3), 0.5, 2.0).unwrap()];
        let mut out = Vec::new();
        write_edge_list(&mut out, &edges).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1,3,0.5,2\n");
    }
}
