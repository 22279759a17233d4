//! # Corpus Statistics
//!
//! Per-field min/max/mean summaries over a realized corpus or a raw JSONL
//! file, written to a text sink. String and array fields report lengths;
//! numeric fields report values. The field set is taken from the first
//! record.

use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::corpus::Corpus;
use crate::errors::CorpusResult;
use crate::types::Record;

/// Write per-field statistics for a realized eager corpus.
pub fn stat_corpus<W: Write>(
    corpus: &Corpus,
    out: &mut W,
) -> CorpusResult<()> {
    let rows: Vec<Record> = corpus
        .instances()
        .iter()
        .map(|instance| {
            let value = serde_json::to_value(instance)?;
            match value {
                Value::Object(map) => Ok(map),
                _ => unreachable!("instances serialize to objects"),
            }
        })
        .collect::<CorpusResult<_>>()?;

    stat_rows(&rows, out)
}

/// Write per-field statistics for a raw JSONL file.
pub fn stat_jsonl_file<P, W>(
    path: P,
    out: &mut W,
) -> CorpusResult<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let rows: Vec<Record> = crate::corpus::record_lines(path)?.collect::<CorpusResult<_>>()?;
    stat_rows(&rows, out)
}

fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::String(text) => Some(text.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Number(_) => "number",
        Value::Bool(_) => "bool",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

fn stat_rows<W: Write>(
    rows: &[Record],
    out: &mut W,
) -> CorpusResult<()> {
    writeln!(out, "num_instance: {}", rows.len())?;

    let Some(first) = rows.first() else {
        return Ok(());
    };

    for (key, probe) in first {
        let samples: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.get(key).and_then(measure))
            .collect();

        writeln!(out, "{}", "-".repeat(40))?;
        writeln!(out, "{key}:")?;
        writeln!(out, "\ttype: {}", type_name(probe))?;

        if samples.is_empty() {
            continue;
        }
        let max = samples.iter().cloned().fold(f64::MIN, f64::max);
        let min = samples.iter().cloned().fold(f64::MAX, f64::min);
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;

        let label = match probe {
            Value::Number(_) => "",
            _ => "_length",
        };
        writeln!(out, "\tmax{label}: {max}")?;
        writeln!(out, "\tmin{label}: {min}")?;
        writeln!(out, "\tavg{label}: {avg}")?;
    }

    Ok(())
}
