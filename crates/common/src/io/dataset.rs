use super::literal::Literal;
use crate::instances::Instance;
use kpartite_matching::{Edge, Vertex};
use std::fs::File;
use std::io::{BufRead, Write};
use std::num::ParseIntError;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseInstanceError {
    #[error("expected 2 fields (got {0})")]
    WrongFieldCount(usize),
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("unexpected '{found}' at position {position}")]
    UnexpectedChar { position: usize, found: char },
    #[error("unexpected end of field")]
    UnexpectedEnd,
    #[error("expected a list of partitions")]
    NotPartitions,
    #[error("expected a list of edges with two endpoints each")]
    NotEdges,
    #[error("vertex out of range (got {0})")]
    VertexOutOfRange(i64),
    #[error("parse int error")]
    ParseInt(#[from] ParseIntError),
}

#[derive(Error, Debug)]
pub enum ReadDatasetError {
    #[error("invalid line {line}")]
    InvalidLine {
        line: usize,
        #[source]
        source: ParseInstanceError,
    },
    #[error("io error")]
    IoError(#[from] std::io::Error),
}

/// Reads one graph per line.
///
/// Every line holds two comma separated fields, quoted when they contain
/// commas themselves. The first field is a list of partitions, the second a
/// list of edges, both written as nested list or tuple literals:
///
/// ```text
/// "[[0, 1], [2, 3]]","[(0, 2), (1, 3)]"
/// ```
///
/// Empty lines are skipped.
pub fn read_dataset<P>(path: P) -> Result<Vec<Instance>, ReadDatasetError>
where
    P: AsRef<Path>,
{
    let file = File::open(path)?;

    let mut instances = vec![];
    for (i, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let instance = parse_instance(line).map_err(|source| ReadDatasetError::InvalidLine { line: i + 1, source })?;
        instances.push(instance);
    }
    Ok(instances)
}

/// Parses a single dataset row. See [read_dataset].
pub fn parse_instance(line: &str) -> Result<Instance, ParseInstanceError> {
    let fields = split_fields(line)?;
    let [partitions, edges] = fields.as_slice() else {
        return Err(ParseInstanceError::WrongFieldCount(fields.len()));
    };

    let Literal::Seq(partitions) = Literal::parse(partitions)? else {
        return Err(ParseInstanceError::NotPartitions);
    };
    let partitions = partitions
        .into_iter()
        .map(|partition| match partition {
            Literal::Seq(vertices) => vertices.into_iter().map(|v| vertex(&v, ParseInstanceError::NotPartitions)).collect(),
            Literal::Int(_) => Err(ParseInstanceError::NotPartitions),
        })
        .collect::<Result<Vec<Vec<Vertex>>, _>>()?;

    let Literal::Seq(edges) = Literal::parse(edges)? else {
        return Err(ParseInstanceError::NotEdges);
    };
    let edges = edges
        .into_iter()
        .map(|edge| match edge.as_seq() {
            Some([u, v]) => Ok((vertex(u, ParseInstanceError::NotEdges)?, vertex(v, ParseInstanceError::NotEdges)?)),
            _ => Err(ParseInstanceError::NotEdges),
        })
        .collect::<Result<Vec<Edge>, _>>()?;

    Ok(Instance { partitions, edges })
}

impl Literal {
    fn as_seq(&self) -> Option<&[Literal]> {
        match self {
            Literal::Seq(items) => Some(items),
            Literal::Int(_) => None,
        }
    }
}

fn vertex(literal: &Literal, err: ParseInstanceError) -> Result<Vertex, ParseInstanceError> {
    match *literal {
        Literal::Int(v) => Vertex::try_from(v).map_err(|_| ParseInstanceError::VertexOutOfRange(v)),
        Literal::Seq(_) => Err(err),
    }
}

fn split_fields(line: &str) -> Result<Vec<String>, ParseInstanceError> {
    let mut fields = vec![];
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    if quoted {
        return Err(ParseInstanceError::UnterminatedQuote);
    }
    fields.push(field);
    Ok(fields)
}

/// Writes one dataset row. See [read_dataset].
pub fn write_instance<W: Write>(out: &mut W, instance: &Instance) -> std::io::Result<()> {
    let partitions: Vec<String> = instance
        .partitions
        .iter()
        .map(|p| format!("[{}]", p.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")))
        .collect();
    let partitions = format!("[{}]", partitions.join(", "));
    let edges: Vec<String> = instance.edges.iter().map(|(u, v)| format!("({u}, {v})")).collect();
    let edges = format!("[{}]", edges.join(", "));

    write_field(out, &partitions)?;
    write!(out, ",")?;
    write_field(out, &edges)?;
    writeln!(out)
}

fn write_field<W: Write>(out: &mut W, field: &str) -> std::io::Result<()> {
    if field.contains(',') {
        write!(out, "\"{field}\"")
    } else {
        write!(out, "{field}")
    }
}

/// Writes one row per instance.
pub fn write_dataset<W: Write>(out: &mut W, instances: &[Instance]) -> std::io::Result<()> {
    for instance in instances {
        write_instance(out, instance)?;
    }
    out.flush()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_row() {
        let instance = parse_instance(r#""[[0, 1], [2, 3]]","[(0, 2), (1, 3)]""#).unwrap();
        assert_eq!(instance.partitions, [vec![0, 1], vec![2, 3]]);
        assert_eq!(instance.edges, [(0, 2), (1, 3)]);
    }

    #[test]
    fn parse_unquoted_fields() {
        let instance = parse_instance("[[0]],[]").unwrap();
        assert_eq!(instance, Instance { partitions: vec![vec![0]], edges: vec![] });
    }

    #[test]
    fn parse_windows_line_ending() {
        let instance = parse_instance("\"[[0], [1]]\",[(0, 1)]\r").unwrap();
        assert_eq!(instance.edges, [(0, 1)]);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_instance("[[0]]"), Err(ParseInstanceError::WrongFieldCount(1)));
        assert_eq!(parse_instance(r#""[[0, 1]],[]"#), Err(ParseInstanceError::UnterminatedQuote));
        assert_eq!(parse_instance("[0],[]"), Err(ParseInstanceError::NotPartitions));
        assert_eq!(parse_instance("7,[]"), Err(ParseInstanceError::NotPartitions));
        assert_eq!(parse_instance(r#"[[0]],"[(0, 1, 2)]""#), Err(ParseInstanceError::NotEdges));
        assert_eq!(parse_instance("[[-1]],[]"), Err(ParseInstanceError::VertexOutOfRange(-1)));
    }

    #[test]
    fn write_rows() {
        let instances = [
            Instance { partitions: vec![vec![0, 1], vec![2, 3]], edges: vec![(0, 2), (1, 3)] },
            Instance { partitions: vec![vec![0]], edges: vec![] },
        ];
        let mut out = Vec::new();
        write_dataset(&mut out, &instances).unwrap();
        let out = String::from_utf8(out).unwrap();
        let expected = "\"[[0, 1], [2, 3]]\",\"[(0, 2), (1, 3)]\"\n[[0]],[]\n";
        assert_eq!(out, expected);

        let parsed: Vec<_> = out.lines().map(|line| parse_instance(line).unwrap()).collect();
        assert_eq!(parsed, instances);
    }

    #[test]
    fn read_file() {
        let path = std::env::temp_dir().join(format!("kpm-dataset-{}.csv", std::process::id()));
        std::fs::write(&path, "\"[[0, 1], [2, 3]]\",\"[(0, 2), (1, 3)]\"\r\n\r\n[[0]],[]\r\n").unwrap();
        let instances = read_dataset(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[1].partitions, [vec![0]]);
    }

    #[test]
    fn read_reports_line_number() {
        let path = std::env::temp_dir().join(format!("kpm-dataset-bad-{}.csv", std::process::id()));
        std::fs::write(&path, "[[0]],[]\n[[0]]\n").unwrap();
        let err = read_dataset(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ReadDatasetError::InvalidLine { line: 2, source: ParseInstanceError::WrongFieldCount(1) }));
    }
}
