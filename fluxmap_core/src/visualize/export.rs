//! Graphviz and tabular output of a graph, and rendering through the `dot` program
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::visualize::graph::{Edge, Graph, Node};

pub const DOT_FILE: &str = "reactions.dot";
pub const NODES_FILE: &str = "reactions.nodes.tsv";
pub const EDGES_FILE: &str = "reactions.edges.tsv";

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn format_attributes(attributes: &[(&str, String)]) -> String {
    let mut sorted = attributes.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let parts: Vec<String> = sorted
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, escape(value)))
        .collect();
    format!("[{}]", parts.join(","))
}

fn node_attributes(node: &Node) -> Vec<(&'static str, String)> {
    vec![
        ("fillcolor", node.fillcolor.clone()),
        ("id", node.id.clone()),
        ("label", node.label.clone()),
        ("shape", node.shape.as_str().to_string()),
        ("style", node.style.clone()),
    ]
}

fn edge_attributes(edge: &Edge) -> Vec<(&'static str, String)> {
    let mut attributes = vec![("dir", edge.attributes.dir.as_str().to_string())];
    if let Some(width) = edge.attributes.penwidth {
        attributes.push(("penwidth", width.to_string()));
    }
    if edge.attributes.dotted {
        attributes.push(("style", "dotted".to_string()));
    }
    if let Some(ref reaction) = edge.reaction {
        attributes.push(("reaction", reaction.clone()));
    }
    attributes
}

/// Write the graph in the Graphviz dot language
///
/// Nodes are written sorted by id and edges in insertion order, so equal graphs give
/// identical files.
pub fn write_graphviz<W: Write>(graph: &Graph, mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "digraph {{")?;
    for node in graph.sorted_nodes() {
        writeln!(
            writer,
            " \"{}\"{};",
            escape(&node.id),
            format_attributes(&node_attributes(node))
        )?;
    }
    for edge in graph.edges() {
        writeln!(
            writer,
            " \"{}\" -> \"{}\"{};",
            escape(&edge.source),
            escape(&edge.target),
            format_attributes(&edge_attributes(edge))
        )?;
    }
    writeln!(writer, "}}")?;
    writer.flush()?;
    Ok(())
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Write one row per node, sorted by id
pub fn write_nodes_tsv<W: Write>(graph: &Graph, writer: W) -> Result<(), ExportError> {
    let mut wtr = tsv_writer(writer);
    wtr.write_record(["id", "label", "shape", "style", "fillcolor", "edge_id"])?;
    for node in graph.sorted_nodes() {
        wtr.write_record([
            node.id.as_str(),
            node.label.as_str(),
            node.shape.as_str(),
            node.style.as_str(),
            node.fillcolor.as_str(),
            node.edge_id.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one row per edge, in insertion order
pub fn write_edges_tsv<W: Write>(graph: &Graph, writer: W) -> Result<(), ExportError> {
    let mut wtr = tsv_writer(writer);
    wtr.write_record(["source", "target", "dir", "penwidth", "style", "reaction"])?;
    for edge in graph.edges() {
        let penwidth = edge
            .attributes
            .penwidth
            .map(|w| w.to_string())
            .unwrap_or_default();
        let style = if edge.attributes.dotted { "dotted" } else { "" };
        wtr.write_record([
            edge.source.as_str(),
            edge.target.as_str(),
            edge.attributes.dir.as_str(),
            penwidth.as_str(),
            style,
            edge.reaction.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Paths written by [`write_outputs`]
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFiles {
    pub dot: PathBuf,
    pub nodes: PathBuf,
    pub edges: PathBuf,
}

/// Write the dot file and both tables into `dir`
pub fn write_outputs<P: AsRef<Path>>(graph: &Graph, dir: P) -> Result<OutputFiles, ExportError> {
    let dir = dir.as_ref();
    let files = OutputFiles {
        dot: dir.join(DOT_FILE),
        nodes: dir.join(NODES_FILE),
        edges: dir.join(EDGES_FILE),
    };
    write_graphviz(graph, BufWriter::new(File::create(&files.dot)?))?;
    write_nodes_tsv(graph, BufWriter::new(File::create(&files.nodes)?))?;
    write_edges_tsv(graph, BufWriter::new(File::create(&files.edges)?))?;
    debug!(dir = %dir.display(), "Wrote graph outputs");
    Ok(files)
}

/// Path of the image rendered from `dot_path`, the format appended as an extension
pub fn image_path(dot_path: &Path, format: &str) -> PathBuf {
    let mut path: OsString = dot_path.as_os_str().to_owned();
    path.push(".");
    path.push(format);
    PathBuf::from(path)
}

/// Render the dot file to an image with `dot -T<format>`
pub fn render_image(dot_path: &Path, format: &str) -> Result<PathBuf, RenderError> {
    let output_path = image_path(dot_path, format);
    let output = Command::new("dot")
        .arg(format!("-T{}", format))
        .arg(dot_path)
        .arg("-o")
        .arg(&output_path)
        .output()
        .map_err(RenderError::Spawn)?;
    if !output.status.success() {
        return Err(RenderError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output_path)
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unable to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to write table: {0}")]
    Table(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unable to run dot: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("dot exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualize::graph::{EdgeAttributes, EdgeDirection, NodeShape};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn small_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(
            Node::new("R1".to_string(), "R1\n2.0".to_string(), NodeShape::Box, "#ccebc5")
                .with_edge_id("R1"),
        );
        graph.add_node(
            Node::new("A[c]".to_string(), "A \"acid\"".to_string(), NodeShape::Ellipse, "#fbb4ae")
                .with_edge_id("A[c]"),
        );
        graph
            .add_edge(Edge::new(
                "A[c]",
                "R1",
                EdgeAttributes {
                    dir: EdgeDirection::Forward,
                    penwidth: Some(1.5),
                    dotted: false,
                },
            ))
            .unwrap();
        graph
            .add_edge(Edge::new(
                "R1",
                "A[c]",
                EdgeAttributes {
                    dir: EdgeDirection::Both,
                    penwidth: None,
                    dotted: true,
                },
            ))
            .unwrap();
        graph
    }

    #[test]
    fn graphviz_output() {
        let mut out = Vec::new();
        write_graphviz(&small_graph(), &mut out).unwrap();
        let expected = concat!(
            "digraph {\n",
            " \"A[c]\"[fillcolor=\"#fbb4ae\",id=\"A[c]\",label=\"A \\\"acid\\\"\",shape=\"ellipse\",style=\"filled\"];\n",
            " \"R1\"[fillcolor=\"#ccebc5\",id=\"R1\",label=\"R1\\n2.0\",shape=\"box\",style=\"filled\"];\n",
            " \"A[c]\" -> \"R1\"[dir=\"forward\",penwidth=\"1.5\"];\n",
            " \"R1\" -> \"A[c]\"[dir=\"both\",style=\"dotted\"];\n",
            "}\n",
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn edge_table() {
        let mut out = Vec::new();
        write_edges_tsv(&small_graph(), &mut out).unwrap();
        let expected = concat!(
            "source\ttarget\tdir\tpenwidth\tstyle\treaction\n",
            "A[c]\tR1\tforward\t1.5\t\t\n",
            "R1\tA[c]\tboth\t\tdotted\t\n",
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn node_table() {
        let mut graph = Graph::new();
        graph.add_node(Node::new("B".to_string(), "B".to_string(), NodeShape::Ellipse, "#fbb4ae"));
        graph.add_node(Node::new("A".to_string(), "A".to_string(), NodeShape::Box, "#ccebc5").with_edge_id("A"));
        let mut out = Vec::new();
        write_nodes_tsv(&graph, &mut out).unwrap();
        let expected = concat!(
            "id\tlabel\tshape\tstyle\tfillcolor\tedge_id\n",
            "A\tA\tbox\tfilled\t#ccebc5\tA\n",
            "B\tB\tellipse\tfilled\t#fbb4ae\t\n",
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn outputs_are_written_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_outputs(&small_graph(), dir.path()).unwrap();
        assert_eq!(files.dot, dir.path().join("reactions.dot"));
        let dot = fs::read_to_string(&files.dot).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(fs::read_to_string(&files.nodes).unwrap().starts_with("id\tlabel\t"));
        assert_eq!(fs::read_to_string(&files.edges).unwrap().lines().count(), 3);
    }

    #[test]
    fn image_path_appends_format() {
        assert_eq!(
            image_path(Path::new("out/reactions.dot"), "png"),
            PathBuf::from("out/reactions.dot.png")
        );
    }
}
