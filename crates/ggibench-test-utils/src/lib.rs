//! Shared fixtures for ggibench tests: toy cohorts, small networks and an
//! on-disk data directory in the layout the file provider reads.

use std::fs;
use std::path::Path;

use ggibench_common::{ConditionSelector, ExpressionMatrix, GgiNetworkSelector, Phenotype, PhenotypeVector};
use ggibench_network::GgiNetwork;

/// Sample `i` (0-based) of a cohort whose first `cases` samples are cases.
fn labels(n: usize, cases: usize) -> Vec<Phenotype> {
    (0..n).map(|i| if i < cases { Phenotype::Case } else { Phenotype::Control }).collect()
}

fn sample_ids(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("S{i}")).collect()
}

/// Expression rows of the 5 case / 5 control cohort, genes G1..G5.
///
/// G1 separates the groups perfectly, G2 has identical case and control
/// distributions, G3..G5 are mixed.
pub const TOY_ROWS: [[f64; 5]; 10] = [
    [10.0, 1.0, 3.0, 2.0, 7.5],
    [11.0, 2.0, 9.0, 8.0, 1.5],
    [12.0, 3.0, 4.0, 3.0, 6.5],
    [13.0, 4.0, 8.0, 7.0, 2.5],
    [14.0, 5.0, 5.0, 4.0, 5.5],
    [1.0, 1.0, 6.0, 6.0, 3.5],
    [2.0, 2.0, 2.0, 9.0, 4.5],
    [3.0, 3.0, 7.0, 1.0, 8.5],
    [4.0, 4.0, 1.0, 5.0, 0.5],
    [5.0, 5.0, 10.0, 10.0, 9.5],
];

/// 10 samples (S1..S5 cases, S6..S10 controls) × genes G1..G5, phenotypes aligned.
pub fn toy_cohort() -> (ExpressionMatrix, PhenotypeVector) {
    let genes: Vec<String> = (1..=5).map(|i| format!("G{i}")).collect();
    let rows = TOY_ROWS.iter().map(|r| r.to_vec()).collect();
    let matrix = ExpressionMatrix::from_rows(sample_ids(10), genes, rows).expect("toy matrix");
    let phenotypes = PhenotypeVector::positional(labels(10, 5)).align(&matrix).expect("toy phenotypes");
    (matrix, phenotypes)
}

/// `per_group` cases then `per_group` controls over genes G1..G5; G1
/// separates the groups, G2..G5 follow the same pattern in both groups.
pub fn separated_cohort(per_group: usize) -> (ExpressionMatrix, PhenotypeVector) {
    let n = 2 * per_group;
    let genes: Vec<String> = (1..=5).map(|i| format!("G{i}")).collect();
    let rows = (0..n)
        .map(|i| {
            let k = (i % per_group) as f64;
            let g1 = if i < per_group { 1000.0 + i as f64 } else { i as f64 };
            vec![g1, k, 2.0 * k, (k * 7.0) % per_group as f64, (k * 3.0) % per_group as f64]
        })
        .collect();
    let matrix = ExpressionMatrix::from_rows(sample_ids(n), genes, rows).expect("cohort matrix");
    let phenotypes = PhenotypeVector::positional(labels(n, per_group)).align(&matrix).expect("cohort phenotypes");
    (matrix, phenotypes)
}

/// Interactions over G1..G5 plus X1, a gene missing from the toy cohort:
/// triangle G1-G2-G3, tail G3-G4-G5, and G5-X1.
pub const FIXTURE_EDGES: [(&str, &str); 6] = [
    ("G1", "G2"),
    ("G2", "G3"),
    ("G3", "G1"),
    ("G3", "G4"),
    ("G4", "G5"),
    ("G5", "X1"),
];

pub fn fixture_network() -> GgiNetwork {
    GgiNetwork::from_gene_pairs(FIXTURE_EDGES)
}

pub fn triangle_network() -> GgiNetwork {
    GgiNetwork::from_gene_pairs([("A", "B"), ("B", "C"), ("C", "A")])
}

/// `A - B - C - ... ` over `n` genes named `P0..`.
pub fn path_network(n: usize) -> GgiNetwork {
    let genes: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
    GgiNetwork::from_edges(genes, (1..n).map(|i| (i - 1, i))).expect("path network")
}

/// GraphML document for `edges`, gene ids stored under `GeneID`.
pub fn graphml_document(edges: &[(&str, &str)]) -> String {
    let mut genes: Vec<&str> = Vec::new();
    for &(a, b) in edges {
        for g in [a, b] {
            if !genes.contains(&g) {
                genes.push(g);
            }
        }
    }
    let node_id = |g: &str| genes.iter().position(|x| *x == g).map(|i| format!("n{i}")).unwrap_or_default();

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n\
         <key id=\"d0\" for=\"node\" attr.name=\"GeneID\" attr.type=\"string\"/>\n\
         <graph edgedefault=\"undirected\">\n",
    );
    for (i, g) in genes.iter().enumerate() {
        xml.push_str(&format!("<node id=\"n{i}\"><data key=\"d0\">{g}</data></node>\n"));
    }
    for &(a, b) in edges {
        xml.push_str(&format!("<edge source=\"{}\" target=\"{}\"/>\n", node_id(a), node_id(b)));
    }
    xml.push_str("</graph>\n</graphml>\n");
    xml
}

/// Write the toy cohort and the fixture network into `root` using the
/// `conditions/{accession}/` and `networks/{NAME}.graphml` layout.
pub fn write_data_dir(root: &Path, condition: ConditionSelector, network: GgiNetworkSelector) -> std::io::Result<()> {
    let condition_dir = root.join("conditions").join(condition.accession());
    fs::create_dir_all(&condition_dir)?;

    let mut expression = String::from("sample,G1,G2,G3,G4,G5\n");
    for (i, row) in TOY_ROWS.iter().enumerate() {
        let values: Vec<String> = row.iter().map(f64::to_string).collect();
        expression.push_str(&format!("S{},{}\n", i + 1, values.join(",")));
    }
    fs::write(condition_dir.join("expression_data.csv"), expression)?;

    // reversed sample order, so loading has to align by id
    let mut phenotypes = String::from("sample,phenotype\n");
    for i in (0..10).rev() {
        phenotypes.push_str(&format!("S{},{}\n", i + 1, u8::from(labels(10, 5)[i])));
    }
    fs::write(condition_dir.join("phenotypes.csv"), phenotypes)?;

    let network_dir = root.join("networks");
    fs::create_dir_all(&network_dir)?;
    fs::write(network_dir.join(format!("{network}.graphml")), graphml_document(&FIXTURE_EDGES))?;
    Ok(())
}

/// Temporary data directory populated by [`write_data_dir`].
pub fn temp_data_dir(condition: ConditionSelector, network: GgiNetworkSelector) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write_data_dir(dir.path(), condition, network).expect("write fixture data");
    dir
}
