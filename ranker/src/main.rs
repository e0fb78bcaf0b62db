use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use okapi_core::parse::{load_corpus, load_queries};
use okapi_core::{build_parallel, rank, Bm25Params, QueryProcessor, RankedHit, DEFAULT_TOP_N};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

const RUN_TAG: &str = "NH-BM25";

#[derive(Parser)]
#[command(name = "ranker")]
#[command(about = "Rank corpus documents against a batch of queries with BM25", long_about = None)]
struct Cli {
    /// Corpus file: `# <doc-id>` lines followed by the document's terms
    #[arg(long)]
    corpus: PathBuf,
    /// Query file: one whitespace-separated query per line
    #[arg(long)]
    queries: PathBuf,
    /// Results kept per query
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
    #[arg(long, default_value_t = 1.2)]
    k1: f64,
    #[arg(long, default_value_t = 100.0)]
    k2: f64,
    #[arg(long, default_value_t = 0.75)]
    b: f64,
    /// Worker threads for indexing and querying (0 = rayon's default pool)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Tab-separated rows with header
    Table,
    /// One JSON object per query
    Json,
}

#[derive(Serialize)]
struct QueryLine<'a> {
    query_id: usize,
    results: &'a [RankedHit],
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let params = Bm25Params { k1: cli.k1, k2: cli.k2, b: cli.b };
    params.validate()?;
    if cli.top == 0 {
        bail!("--top must be at least 1");
    }
    let workers = cli.workers;

    let corpus = load_corpus(&cli.corpus)?;
    let queries = load_queries(&cli.queries)?;
    let (index, lengths) = build_parallel(&corpus, workers);
    drop(corpus);

    let qp = QueryProcessor::new(&index, &lengths, params);
    let results = qp.run_parallel(&queries, workers);
    tracing::info!(queries = queries.len(), workers, "queries evaluated");

    let mut out = BufWriter::new(io::stdout().lock());
    if matches!(cli.format, Format::Table) {
        write_header(&mut out)?;
    }
    for (qid, result) in results.iter().enumerate() {
        let scores = match result {
            Ok(scores) => scores,
            Err(err) => {
                tracing::warn!(qid, %err, "skipping query");
                continue;
            }
        };
        let hits = rank(scores, cli.top);
        match cli.format {
            Format::Table => write_rows(&mut out, qid, &hits)?,
            Format::Json => {
                serde_json::to_writer(&mut out, &QueryLine { query_id: qid, results: &hits })?;
                writeln!(out)?;
            }
        }
    }
    if matches!(cli.format, Format::Table) {
        writeln!(out, "{}", "---".repeat(25))?;
    }
    out.flush()?;
    Ok(())
}

fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:>1}\tQ0\t{:>4}\t{:>2}\t{:>12}\t{RUN_TAG}", "QueryId", "DocumentId", "Rank", "Score")?;
    writeln!(out, "{}", "---".repeat(25))
}

fn write_rows<W: Write>(out: &mut W, qid: usize, hits: &[RankedHit]) -> io::Result<()> {
    for hit in hits {
        writeln!(out, "{:>1}\tQ0\t{:>4}\t{:>2}\t{:>12}\t{RUN_TAG}", qid, hit.doc_id, hit.rank, hit.score)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_tab_separated_and_tagged() {
        let hits = vec![
            RankedHit { rank: 0, doc_id: "12".into(), score: 1.5 },
            RankedHit { rank: 1, doc_id: "7".into(), score: 0.25 },
        ];
        let mut buf = Vec::new();
        write_rows(&mut buf, 3, &hits).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let cols: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(cols[0], "3");
        assert_eq!(cols[1], "Q0");
        assert_eq!(cols[2].trim(), "12");
        assert_eq!(cols[3].trim(), "0");
        assert_eq!(cols[4].trim(), "1.5");
        assert_eq!(cols[5], RUN_TAG);
    }

    #[test]
    fn header_has_rule() {
        let mut buf = Vec::new();
        write_header(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("QueryId\tQ0\tDocumentId"));
        assert!(text.lines().nth(1).unwrap().chars().all(|c| c == '-'));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["ranker", "--corpus", "c.txt", "--queries", "q.txt"]);
        assert_eq!(cli.top, DEFAULT_TOP_N);
        assert_eq!(cli.k1, 1.2);
        assert_eq!(cli.b, 0.75);
        assert!(matches!(cli.format, Format::Table));
    }
}
